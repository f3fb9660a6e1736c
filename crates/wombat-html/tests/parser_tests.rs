//! Integration tests for the HTML tree builder.

use std::time::{Duration, Instant};

use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use wombat_dom::{DomTree, NodeId, NodeType, QuirksMode};
use wombat_html::{Parser, parse, parse_with};

/// Helper to get the markup inside `<body>`
fn body_html(html: &str) -> String {
    let tree = parse(html, "");
    let body = tree.body().expect("body");
    tree.html(body)
}

/// Helper to find the first element named `tag` (document order)
fn find_element(tree: &DomTree, tag: &str) -> Option<NodeId> {
    tree.descendants(NodeId::ROOT)
        .find(|&id| tree.tag_name(id) == Some(tag))
}

#[test]
fn test_document_structure_is_synthesized() {
    let tree = parse("Hello", "");
    assert_eq!(
        tree.outer_html(NodeId::ROOT),
        "<html><head></head><body>Hello</body></html>"
    );
    assert!(tree.head().is_some());
    assert_eq!(tree.document_element(), find_element(&tree, "html"));
}

#[test]
fn test_doctype_is_kept() {
    let tree = parse("<!DOCTYPE html><p>x", "");
    let first = tree.children(NodeId::ROOT)[0];
    match tree.get(first).map(|node| &node.node_type) {
        Some(NodeType::Doctype(doctype)) => assert_eq!(doctype.name, "html"),
        other => panic!("Expected doctype, got {other:?}"),
    }
    assert_eq!(tree.quirks_mode(), QuirksMode::NoQuirks);
}

#[test]
fn test_head_elements() {
    let tree = parse("<title>A &amp; B</title><meta charset=utf-8><p>x", "");
    let head = tree.head().expect("head");
    assert_eq!(
        tree.html(head),
        "<title>A &amp; B</title><meta charset=\"utf-8\">"
    );
}

#[test]
fn test_misnested_formatting_is_adopted() {
    assert_eq!(
        body_html("<p>1<b>2<i>3</b>4</i>5</p>"),
        "<p>1<b>2<i>3</i></b><i>4</i>5</p>"
    );
}

#[test]
fn test_formatting_carried_into_block() {
    assert_eq!(
        body_html("<b>1<p>2</b>3</p>"),
        "<b>1</b><p><b>2</b>3</p>"
    );
}

#[test]
fn test_noahs_ark_limits_reconstruction() {
    assert_eq!(
        body_html("<p><b><b><b><b>x</p>y"),
        "<p><b><b><b><b>x</b></b></b></b></p><b><b><b>y</b></b></b>"
    );
}

#[test]
fn test_foster_parenting() {
    assert_eq!(
        body_html("<table><b><tr><td>aaa</td></tr>bbb</table>ccc"),
        "<b></b><b>bbb</b><table><tbody><tr><td>aaa</td></tr></tbody></table><b>ccc</b>"
    );
}

#[test]
fn test_active_anchor_in_table_is_fostered() {
    assert_eq!(
        body_html("<table><a>1<col><a>2</table>"),
        "<a>1</a><a>2</a><table><colgroup><col></colgroup></table>"
    );
    assert_eq!(
        body_html("<table><a>1<tr><a>2</table>"),
        "<a>1</a><a>2</a><table><tbody><tr></tr></tbody></table>"
    );
}

#[test]
fn test_table_text_is_fostered() {
    assert_eq!(
        body_html("<table>text<tr><td>cell</td></tr></table>"),
        "text<table><tbody><tr><td>cell</td></tr></tbody></table>"
    );
}

#[test]
fn test_implied_tbody_and_row() {
    assert_eq!(
        body_html("<table><td>1<td>2</table>"),
        "<table><tbody><tr><td>1</td><td>2</td></tr></tbody></table>"
    );
}

#[test]
fn test_bare_cell_is_ignored() {
    assert_eq!(body_html("<td>cell</td>"), "cell");
}

#[test]
fn test_list_items_close_each_other() {
    assert_eq!(
        body_html("<ul><li>one<li>two</ul>"),
        "<ul><li>one</li><li>two</li></ul>"
    );
    assert_eq!(body_html("<li>one<li>two"), "<li>one</li><li>two</li>");
}

#[test]
fn test_paragraph_closed_by_block() {
    assert_eq!(body_html("<p>one<div>two</div>"), "<p>one</p><div>two</div>");
}

#[test]
fn test_stray_end_p_creates_paragraph() {
    assert_eq!(body_html("</p>"), "<p></p>");
}

#[test]
fn test_raw_text_elements() {
    let tree = parse("<script>if (a < b) { x = \"</p>\"; }</script>", "");
    let head = tree.head().expect("head");
    assert_eq!(
        tree.html(head),
        "<script>if (a < b) { x = \"</p>\"; }</script>"
    );
    let script = find_element(&tree, "script").expect("script");
    assert_eq!(tree.data(script), "if (a < b) { x = \"</p>\"; }");

    assert_eq!(
        body_html("<textarea><b>&amp;</b></textarea>"),
        "<textarea>&lt;b&gt;&amp;&lt;/b&gt;</textarea>"
    );
}

#[test]
fn test_raw_text_survives_reserialization() {
    for html in [
        "<xmp><a>&amp;</xmp>",
        "<iframe><b>x</b></iframe>",
        "<noembed>a < b</noembed>",
        "<noframes><p>&lt;</noframes>",
    ] {
        assert_eq!(body_html(html), html);
        assert_eq!(body_html(&body_html(html)), html);
    }

    let tree = parse("<plaintext>a</b>&amp;", "");
    let first = tree.outer_html(NodeId::ROOT);
    assert_eq!(first, "<html><head></head><body><plaintext>a</b>&amp;");
    assert_eq!(parse(&first, "").outer_html(NodeId::ROOT), first);
}

#[test]
fn test_only_a_lone_nul_is_dropped() {
    assert_eq!(
        body_html("<p id=\0>Blah \0</p>"),
        "<p id=\"\u{FFFD}\">Blah \0</p>"
    );
    assert_eq!(body_html("<p>\0</p>"), "<p></p>");
    assert_eq!(
        body_html("<table>\0<tr><td>x</td></tr></table>"),
        "<table><tbody><tr><td>x</td></tr></tbody></table>"
    );
    assert_eq!(body_html("<select>a\0b</select>"), "<select>a\0b</select>");
}

#[test]
fn test_leading_newline_dropped_after_pre() {
    let tree = parse("<pre>\n\nfoo</pre>", "");
    let pre = find_element(&tree, "pre").expect("pre");
    let text = tree.first_child(pre).and_then(|t| tree.as_text(t));
    assert_eq!(text, Some("\nfoo"));
    assert_eq!(tree.outer_html(pre), "<pre>\n\nfoo</pre>");
}

#[test]
fn test_attribute_order_is_kept() {
    let tree = parse("<a id=\"123\" class=\"baz\" qux zim foo=12 mux=18 />", "");
    let a = find_element(&tree, "a").expect("a");
    let attrs = &tree.as_element(a).expect("element").attrs;
    assert_eq!(attrs.len(), 6);
    assert_eq!(
        attrs.keys().collect::<Vec<_>>(),
        vec!["id", "class", "qux", "zim", "foo", "mux"]
    );
}

#[test]
fn test_boolean_and_empty_attributes() {
    let tree = parse("<a boolean empty=\"\">", "");
    let a = find_element(&tree, "a").expect("a");
    let attrs = &tree.as_element(a).expect("element").attrs;
    let boolean = attrs.attribute("boolean").expect("boolean");
    let empty = attrs.attribute("empty").expect("empty");
    assert!(boolean.is_boolean());
    assert!(!empty.is_boolean());
    assert_eq!(boolean.value(), "");
    assert_eq!(empty.value(), "");
    assert_eq!(tree.outer_html(a), "<a boolean empty=\"\"></a>");
}

#[test]
fn test_names_are_lowercased() {
    assert_eq!(
        body_html("<DIV ID=Main>x</DIV>"),
        "<div id=\"Main\">x</div>"
    );
}

#[test]
fn test_self_closing_non_void_is_closed() {
    assert_eq!(body_html("<div/>text"), "<div></div>text");
    assert_eq!(body_html("<foo/>bar"), "<foo />bar");
    assert_eq!(body_html("<br/>x"), "<br>x");
}

#[test]
fn test_html_and_body_attributes_merge() {
    let tree = parse("<body class=a><body id=b class=c>", "");
    let body = tree.body().expect("body");
    assert_eq!(tree.attr(body, "class"), Some("a"));
    assert_eq!(tree.attr(body, "id"), Some("b"));
}

#[test]
fn test_image_becomes_img() {
    assert_eq!(body_html("<image src=x.png>"), "<img src=\"x.png\">");
}

#[test]
fn test_select_options() {
    assert_eq!(
        body_html("<select><option>1<option>2</select>"),
        "<select><option>1</option><option>2</option></select>"
    );
}

#[test]
fn test_frameset_discards_trailing_content() {
    let tree = parse(
        "<html><head></head><frameset><frame src=foo></frameset><p>ignored</p></html>",
        "",
    );
    assert_eq!(
        tree.outer_html(NodeId::ROOT),
        "<html><head></head><frameset><frame src=\"foo\"></frameset></html>"
    );
    assert!(tree.body().is_none());
}

#[test]
fn test_comments_after_body() {
    let tree = parse("<p>x</p></body><!-- a --></html><!-- b -->", "");
    assert_eq!(
        tree.outer_html(NodeId::ROOT),
        "<html><head></head><body><p>x</p></body><!-- a --></html><!-- b -->"
    );
}

#[test]
fn test_quirks_mode_keeps_table_in_paragraph() {
    let quirks = parse(
        "<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01 Transitional//EN\"><p><table></table>",
        "",
    );
    assert_eq!(quirks.quirks_mode(), QuirksMode::Quirks);
    let body = quirks.body().expect("body");
    assert_eq!(quirks.html(body), "<p><table></table></p>");

    let standards = parse("<!DOCTYPE html><p><table></table>", "");
    let body = standards.body().expect("body");
    assert_eq!(standards.html(body), "<p></p><table></table>");
}

#[test]
fn test_limited_quirks_doctype() {
    let tree = parse(
        "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Transitional//EN\" \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd\">",
        "",
    );
    assert_eq!(tree.quirks_mode(), QuirksMode::LimitedQuirks);
}

#[test]
fn test_base_href_sets_base_uri() {
    let tree = parse(
        "<base href=\"http://example.com/dir/\"><a href=\"page.html\">x</a>",
        "http://other.org/",
    );
    let a = find_element(&tree, "a").expect("a");
    assert_eq!(tree.base_uri(), "http://example.com/dir/");
    assert_eq!(
        tree.abs_url(a, "href").as_deref(),
        Some("http://example.com/dir/page.html")
    );
}

#[test]
fn test_form_controls_outside_form_subtree() {
    let tree = parse(
        "<table><form id=f><tr><td><input name=q></td></tr></form></table>",
        "",
    );
    let form = find_element(&tree, "form").expect("form");
    let input = find_element(&tree, "input").expect("input");
    assert!(!tree.is_descendant_of(input, form));
    assert_eq!(tree.form_controls(form), &[input]);
}

#[test]
fn test_nested_form_is_ignored() {
    assert_eq!(
        body_html("<form><form><input></form>"),
        "<form><input></form>"
    );
}

#[test]
fn test_template_contents_are_children() {
    let tree = parse("<template><td>x</td></template>", "");
    let head = tree.head().expect("head");
    assert_eq!(tree.html(head), "<template><td>x</td></template>");
}

#[test]
fn test_errors_are_tracked() {
    let mut parser = Parser::html_parser().track_errors(10);
    let _ = parse_with("<div></span></div>", "", &mut parser);
    let first = parser.errors().first().expect("an error");
    assert_eq!(first.message, "Unexpected token [EndTag] when in state [InBody]");
    assert_eq!(first.to_string(), format!("{}: {}", first.position, first.message));
    assert!(first.position > 0);
}

#[test]
fn test_errors_not_tracked_by_default() {
    let mut parser = Parser::html_parser();
    assert!(!parser.is_track_errors());
    let _ = parse_with("<div></span></div>", "", &mut parser);
    assert!(parser.errors().is_empty());
}

#[test]
fn test_error_capacity() {
    let mut parser = Parser::html_parser().track_errors(2);
    let _ = parse_with("</a></b></c></d></e>", "", &mut parser);
    assert_eq!(parser.errors().len(), 2);
}

#[test]
fn test_unacknowledged_self_closing_is_an_error() {
    let mut parser = Parser::html_parser().track_errors(10);
    let _ = parse_with("<div/>x", "", &mut parser);
    assert!(
        parser
            .errors()
            .iter()
            .any(|e| e.message == "Self closing flag not acknowledged")
    );
}

#[test]
fn test_deep_nesting_is_linear() {
    let depth = 25_000;
    let html = format!("{}{}", "<div>".repeat(depth), "</div>".repeat(depth));
    let start = Instant::now();
    let tree = parse(&html, "");
    let output = tree.html(tree.body().expect("body"));
    assert!(start.elapsed() < Duration::from_secs(20));
    assert_eq!(output.len(), html.len());
}

#[test]
fn test_unescape_entities() {
    assert_eq!(
        Parser::unescape_entities("&lt;p&gt; &amp;amp; &copy", false),
        "<p> &amp; \u{a9}"
    );
}

/// Markup assembled from a fixed vocabulary of tags, text and entities.
#[derive(Debug, Clone)]
struct Markup(String);

impl Arbitrary for Markup {
    fn arbitrary(g: &mut Gen) -> Self {
        const PIECES: &[&str] = &[
            "<p>", "</p>", "<b>", "</b>", "<i>", "</i>", "<div>", "</div>", "<span class=x>",
            "</span>", "<ul>", "<li>", "</ul>", "<br>", "<a href='/x'>", "</a>", "text", " ",
            "&amp;", "&lt;", "<!-- c -->", "<h1>", "</h1>", "<em>", "</em>", "<xmp>", "</xmp>",
            "<textarea>", "</textarea>", "<title>", "</title>", "<select>", "<option>",
            "</select>", "<form>", "<input>", "\0",
        ];
        Self(assemble(g, PIECES))
    }
}

/// Table-heavy markup. Paragraphs, list items, headings and links are left
/// out: foster-parenting can nest those inside themselves, which no parse of
/// the serialized form reproduces.
#[derive(Debug, Clone)]
struct TableMarkup(String);

impl Arbitrary for TableMarkup {
    fn arbitrary(g: &mut Gen) -> Self {
        const PIECES: &[&str] = &[
            "<table>", "</table>", "<tr>", "</tr>", "<td>", "</td>", "<caption>", "<col>",
            "<b>", "</b>", "<i>", "<div>", "</div>", "<span>", "</span>", "text", " ", "\0",
            "<xmp>", "</xmp>", "<textarea>", "</textarea>", "<title>", "</title>", "<select>",
            "<option>", "</select>", "<form>", "<input>", "<!-- c -->",
        ];
        Self(assemble(g, PIECES))
    }
}

fn assemble(g: &mut Gen, pieces: &[&str]) -> String {
    let count = usize::arbitrary(g) % 24;
    let mut markup = String::new();
    for _ in 0..count {
        markup.push_str(g.choose(pieces).copied().unwrap_or_default());
    }
    markup
}

fn reserializes_unchanged(markup: &str) -> bool {
    let once = parse(markup, "");
    let first = once.outer_html(NodeId::ROOT);
    let twice = parse(&first, "");
    twice.outer_html(NodeId::ROOT) == first
}

#[quickcheck]
fn prop_reserialization_is_a_fixed_point(markup: Markup) -> bool {
    reserializes_unchanged(&markup.0)
}

#[quickcheck]
fn prop_table_reserialization_is_a_fixed_point(markup: TableMarkup) -> bool {
    reserializes_unchanged(&markup.0)
}
