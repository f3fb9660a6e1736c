//! Integration tests for selecting elements from parsed documents.

use wombat_dom::{DomTree, NodeId};
use wombat_html::{Parser, parse};
use wombat_select::{Elements, QueryParser, Select, collect};

/// Helper to select from the document root
fn select(tree: &DomTree, query: &str) -> Elements {
    tree.select(NodeId::ROOT, query)
        .unwrap_or_else(|e| panic!("{query:?} failed: {e}"))
}

/// Helper to collect the text of each selected element
fn texts(tree: &DomTree, query: &str) -> Vec<String> {
    select(tree, query).iter().map(|id| tree.text(id)).collect()
}

/// Helper to collect the id attribute of each selected element
fn ids(tree: &DomTree, query: &str) -> Vec<String> {
    select(tree, query)
        .iter()
        .map(|id| tree.attr(id, "id").unwrap_or_default().to_string())
        .collect()
}

fn ten_items() -> DomTree {
    let items: String = (1..=10).map(|n| format!("<li>{n}</li>")).collect();
    parse(&format!("<ul>{items}</ul>"), "")
}

#[test]
fn test_select_by_tag_id_and_class() {
    let tree = parse(
        "<div id=main class='box Wide'><p class=a>One</p><P class='b a'>Two</P></div>",
        "",
    );
    assert_eq!(texts(&tree, "p"), vec!["One", "Two"]);
    assert_eq!(texts(&tree, "#main").len(), 1);
    assert_eq!(texts(&tree, ".a"), vec!["One", "Two"]);
    assert_eq!(texts(&tree, "p.b"), vec!["Two"]);
    assert_eq!(select(&tree, "div.wide").len(), 1);
    assert!(select(&tree, "#MAIN").is_empty());
}

#[test]
fn test_universal_selector_includes_root() {
    let tree = parse("<p>x</p>", "");
    let all = select(&tree, "*");
    assert_eq!(all.len(), 4);
    assert_eq!(tree.tag_name(all.first().unwrap()), Some("html"));

    let body = tree.body().unwrap();
    let from_body = tree.select(body, "*").unwrap();
    assert_eq!(from_body.first(), Some(body));
}

#[test]
fn test_results_are_in_document_order() {
    let tree = parse("<div id=1><p id=2></p></div><p id=3><span id=4></span></p>", "");
    assert_eq!(ids(&tree, "p, div, span"), vec!["1", "2", "3", "4"]);
}

#[test]
fn test_combinators() {
    let tree = parse(
        "<div id=d><p id=p1><b id=b1></b></p><span id=s1></span><p id=p2></p><p id=p3></p></div>",
        "",
    );
    assert_eq!(ids(&tree, "div b"), vec!["b1"]);
    assert_eq!(ids(&tree, "div > b"), Vec::<String>::new());
    assert_eq!(ids(&tree, "div > p"), vec!["p1", "p2", "p3"]);
    assert_eq!(ids(&tree, "span + p"), vec!["p2"]);
    assert_eq!(ids(&tree, "p ~ p"), vec!["p2", "p3"]);
    assert_eq!(ids(&tree, "span ~ p"), vec!["p2", "p3"]);
    assert_eq!(ids(&tree, "body div p > b"), vec!["b1"]);
}

#[test]
fn test_mixed_list_and_combinators() {
    let tree = parse(
        "<div class=foo><ol id=a><li id=x></li></ol></div><ol id=b><li id=y></li><li id=z></li></ol>",
        "",
    );
    assert_eq!(ids(&tree, ".foo > ol, ol > li + li"), vec!["a", "z"]);
}

#[test]
fn test_relative_select_from_element() {
    let tree = parse(
        "<div id=outer><p id=a><span id=in></span></p><div id=inner><p id=b></p></div></div>",
        "",
    );
    let outer = select(&tree, "#outer").first().unwrap();
    let children = tree.select(outer, "> p").unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(tree.attr(children.first().unwrap(), "id"), Some("a"));

    // Ancestors above the selection root are not considered.
    let inner = select(&tree, "#inner").first().unwrap();
    assert!(tree.select(inner, "body p").unwrap().is_empty());
    assert_eq!(tree.select(inner, "div p").unwrap().len(), 1);
}

#[test]
fn test_attribute_selectors() {
    let tree = parse(
        "<a id=1 href='HTTP://example.com/a.PDF' title='One Two'></a>\
         <a id=2 href='/local.html' data-role=nav data-x=1></a>\
         <a id=3 title='  spaced  '></a>",
        "",
    );
    assert_eq!(ids(&tree, "[href]"), vec!["1", "2"]);
    assert_eq!(ids(&tree, "[HREF^=http]"), vec!["1"]);
    assert_eq!(ids(&tree, "[href$=.pdf]"), vec!["1"]);
    assert_eq!(ids(&tree, "[title*=\"one t\"]"), vec!["1"]);
    assert_eq!(ids(&tree, "[title=spaced]"), vec!["3"]);
    assert_eq!(ids(&tree, "a[title!='one two']"), vec!["2", "3"]);
    assert_eq!(ids(&tree, "[^data-]"), vec!["2"]);
    assert_eq!(ids(&tree, "[href~=\\.(html|htm)$]"), vec!["2"]);
}

#[test]
fn test_nth_child_family() {
    let tree = ten_items();
    assert_eq!(texts(&tree, "li:nth-child(3n-1)"), vec!["2", "5", "8"]);
    assert_eq!(
        texts(&tree, "li:nth-child(even)"),
        vec!["2", "4", "6", "8", "10"]
    );
    assert_eq!(texts(&tree, "li:nth-child(-2n+5)"), vec!["1", "3", "5"]);
    assert_eq!(texts(&tree, "li:nth-child(4)"), vec!["4"]);
    assert_eq!(texts(&tree, "li:nth-last-child(-n+2)"), vec!["9", "10"]);
    assert_eq!(texts(&tree, "li:nth-child(odd)").len(), 5);
}

#[test]
fn test_of_type_pseudo_classes() {
    let tree = parse(
        "<div><h1>h</h1><p>1</p><span>s</span><p>2</p><p>3</p><em>only</em></div>",
        "",
    );
    assert_eq!(texts(&tree, "p:first-of-type"), vec!["1"]);
    assert_eq!(texts(&tree, "p:last-of-type"), vec!["3"]);
    assert_eq!(texts(&tree, "p:nth-of-type(2)"), vec!["2"]);
    assert_eq!(texts(&tree, "p:nth-last-of-type(3)"), vec!["1"]);
    assert_eq!(texts(&tree, "div > :only-of-type"), vec!["h", "s", "only"]);
}

#[test]
fn test_child_position_pseudo_classes() {
    let tree = parse("<div><p>a</p><p>b</p></div><section><p>c</p></section>", "");
    assert_eq!(texts(&tree, "p:first-child"), vec!["a", "c"]);
    assert_eq!(texts(&tree, "p:last-child"), vec!["b", "c"]);
    assert_eq!(texts(&tree, "p:only-child"), vec!["c"]);
}

#[test]
fn test_children_of_the_document_have_no_position() {
    let tree = parse("<p>x</p>", "");
    assert!(select(&tree, "html:first-child").is_empty());
    assert!(select(&tree, "html:nth-child(1)").is_empty());
}

#[test]
fn test_empty_and_root() {
    let tree = parse("<p></p><p><!-- c --></p><p> </p><p>t</p>", "");
    assert_eq!(select(&tree, "p:empty").len(), 2);
    let root = select(&tree, ":root");
    assert_eq!(root.len(), 1);
    assert_eq!(tree.tag_name(root.first().unwrap()), Some("html"));

    let body = tree.body().unwrap();
    assert_eq!(tree.select(body, ":root").unwrap().first(), Some(body));
}

#[test]
fn test_index_pseudo_classes() {
    let tree = ten_items();
    assert_eq!(texts(&tree, "li:lt(2)"), vec!["1", "2"]);
    assert_eq!(texts(&tree, "li:gt(7)"), vec!["9", "10"]);
    assert_eq!(texts(&tree, "li:eq(4)"), vec!["5"]);
}

#[test]
fn test_has_and_not() {
    let tree = parse(
        "<div id=a><p><b>x</b></p></div><div id=b><p>y</p></div><div id=c></div>",
        "",
    );
    assert_eq!(ids(&tree, "div:has(b)"), vec!["a"]);
    assert_eq!(ids(&tree, "div:has(> p)"), vec!["a", "b"]);
    assert_eq!(ids(&tree, "div:not(#a)"), vec!["b", "c"]);
    assert_eq!(ids(&tree, "div:not(:has(p))"), vec!["c"]);
}

#[test]
fn test_contains_pseudo_classes() {
    let tree = parse(
        "<p id=1>Hello <b>World</b></p><p id=2>hello there</p>\
         <script id=3>var Answer = 42;</script><p id=4>(parens)</p>",
        "",
    );
    assert_eq!(ids(&tree, "p:contains(hello world)"), vec!["1"]);
    assert_eq!(ids(&tree, "p:containsOwn(world)"), Vec::<String>::new());
    assert_eq!(ids(&tree, "p:containsOwn(THERE)"), vec!["2"]);
    assert_eq!(ids(&tree, "script:containsData(answer)"), vec!["3"]);
    assert_eq!(ids(&tree, "p:contains(\\(parens\\))"), vec!["4"]);
}

#[test]
fn test_matches_pseudo_classes() {
    let tree = parse("<p id=1>Order 123</p><p id=2>No number <b>7</b></p>", "");
    assert_eq!(ids(&tree, "p:matches(\\d+)"), vec!["1", "2"]);
    assert_eq!(ids(&tree, "p:matchesOwn(\\d+)"), vec!["1"]);
    assert_eq!(ids(&tree, "p:matches(^Order)"), vec!["1"]);
}

#[test]
fn test_namespaced_tags() {
    let mut parser = Parser::xml_parser();
    let tree = parser.parse_input(
        "<feed><atom:link href='a'/><link href='b'/><x:link href='c'/></feed>",
        "",
    );
    assert_eq!(select(&tree, "atom|link").len(), 1);
    assert_eq!(select(&tree, "*|link").len(), 3);
    assert_eq!(select(&tree, "feed > *|link").len(), 3);
}

#[test]
fn test_select_first_and_is() {
    let tree = parse("<div><p class=x>1</p><p class=x>2</p></div>", "");
    let first = tree.select_first(NodeId::ROOT, "p.x").unwrap().unwrap();
    assert_eq!(tree.text(first), "1");
    assert!(tree.select_first(NodeId::ROOT, "table").unwrap().is_none());

    assert!(tree.is(first, "div > p:first-child").unwrap());
    assert!(!tree.is(first, "p:last-child").unwrap());
    assert!(tree.is(first, "p[").is_err());
}

#[test]
fn test_elements_helpers() {
    let tree = parse("<p>One</p><p></p><p>Three <a href=/x>link</a></p>", "http://example.com/");
    let paragraphs = select(&tree, "p");
    assert_eq!(paragraphs.len(), 3);
    assert_eq!(paragraphs.text(&tree), "One Three link");
    assert_eq!(paragraphs.get(1), paragraphs.iter().nth(1));
    assert_eq!(paragraphs.last(), paragraphs.get(2));
    assert!(paragraphs.contains(paragraphs.first().unwrap()));
    assert_eq!(select(&tree, "a").attr(&tree, "href"), Some("/x"));
    assert_eq!(
        select(&tree, "a").outer_html(&tree),
        "<a href=\"/x\">link</a>"
    );
}

#[test]
fn test_collect_with_prebuilt_evaluator() {
    let tree = ten_items();
    let evaluator = QueryParser::parse("li:nth-child(2n)").unwrap();
    let ul = select(&tree, "ul").first().unwrap();
    assert_eq!(collect(&evaluator, &tree, ul).len(), 5);
}

#[test]
fn test_invalid_query_is_an_error() {
    let tree = parse("<p>x</p>", "");
    assert!(tree.select(NodeId::ROOT, "p:contains(it's)").is_err());
    assert!(tree.select(NodeId::ROOT, "").is_err());
}
