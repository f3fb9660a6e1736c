//! Tests for serialization, text extraction and URL resolution over
//! hand-built trees.

use wombat_dom::{
    Attribute, Attributes, DoctypeData, DomTree, NodeId, NodeType, ParseSettings, Syntax, Tag,
};

fn element(tree: &mut DomTree, parent: NodeId, name: &str, attrs: &[(&str, &str)]) -> NodeId {
    let attributes: Attributes = attrs.iter().map(|(k, v)| Attribute::new(*k, *v)).collect();
    let id = tree.create_element(Tag::value_of(name, ParseSettings::HTML_DEFAULT), attributes);
    tree.append_child(parent, id);
    id
}

fn text(tree: &mut DomTree, parent: NodeId, content: &str) -> NodeId {
    let id = tree.alloc(NodeType::Text(content.to_string()));
    tree.append_child(parent, id);
    id
}

#[test]
fn test_void_and_boolean_rendering() {
    let mut tree = DomTree::new();
    let p = element(&mut tree, NodeId::ROOT, "p", &[]);
    let input = element(&mut tree, p, "input", &[("type", "checkbox")]);
    if let Some(data) = tree.as_element_mut(input) {
        data.attrs.put(Attribute::boolean("checked"));
    }
    let _ = element(&mut tree, p, "br", &[]);

    assert_eq!(
        tree.outer_html(p),
        "<p><input type=\"checkbox\" checked><br></p>"
    );

    tree.document_mut().syntax = Syntax::Xml;
    assert_eq!(
        tree.outer_html(p),
        "<p><input type=\"checkbox\" checked=\"\" /><br /></p>"
    );
}

#[test]
fn test_text_and_data_escaping() {
    let mut tree = DomTree::new();
    let div = element(&mut tree, NodeId::ROOT, "div", &[("title", "a \"q\" & b")]);
    let _ = text(&mut tree, div, "1 < 2 & 3 > 2");
    let script = element(&mut tree, div, "script", &[]);
    let data = tree.alloc(NodeType::Data("if (a < b) {}".to_string()));
    tree.append_child(script, data);

    assert_eq!(
        tree.outer_html(div),
        "<div title=\"a &quot;q&quot; &amp; b\">1 &lt; 2 &amp; 3 &gt; 2<script>if (a < b) {}</script></div>"
    );
    assert_eq!(tree.data(div), "if (a < b) {}");
}

#[test]
fn test_doctype_and_comment() {
    let mut tree = DomTree::new();
    let doctype = tree.alloc(NodeType::Doctype(DoctypeData {
        name: "html".to_string(),
        public_id: "-//W3C//DTD HTML 4.01//EN".to_string(),
        system_id: "http://www.w3.org/TR/html4/strict.dtd".to_string(),
    }));
    tree.append_child(NodeId::ROOT, doctype);
    let comment = tree.alloc(NodeType::Comment(" hi ".to_string()));
    tree.append_child(NodeId::ROOT, comment);

    assert_eq!(
        tree.html(NodeId::ROOT),
        "<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01//EN\" \"http://www.w3.org/TR/html4/strict.dtd\"><!-- hi -->"
    );
}

#[test]
fn test_pre_leading_newline_doubled() {
    let mut tree = DomTree::new();
    let pre = element(&mut tree, NodeId::ROOT, "pre", &[]);
    let _ = text(&mut tree, pre, "\ncode");
    assert_eq!(tree.outer_html(pre), "<pre>\n\ncode</pre>");
}

#[test]
fn test_text_block_spacing() {
    let mut tree = DomTree::new();
    let body = element(&mut tree, NodeId::ROOT, "body", &[]);
    let div = element(&mut tree, body, "div", &[]);
    let _ = text(&mut tree, div, "One");
    let _ = text(&mut tree, body, "Two");
    let p = element(&mut tree, body, "p", &[]);
    let _ = text(&mut tree, p, "Hello  ");
    let b = element(&mut tree, p, "b", &[]);
    let _ = text(&mut tree, b, "there");
    let _ = text(&mut tree, p, "\n now!");
    let _ = element(&mut tree, p, "br", &[]);
    let _ = text(&mut tree, p, "end");

    assert_eq!(tree.text(body), "One Two Hello there now! end");
    assert_eq!(tree.own_text(p), "Hello now! end");
}

#[test]
fn test_preformatted_text_kept() {
    let mut tree = DomTree::new();
    let pre = element(&mut tree, NodeId::ROOT, "pre", &[]);
    let _ = text(&mut tree, pre, "  a\n  b");
    assert_eq!(tree.text(pre), "a\n  b");
}

#[test]
fn test_abs_url() {
    let mut tree = DomTree::with_base_uri("http://example.com/dir/index.html");
    let a = element(&mut tree, NodeId::ROOT, "a", &[("href", "../next.html")]);
    assert_eq!(tree.abs_url(a, "href").as_deref(), Some("http://example.com/next.html"));
    assert_eq!(tree.abs_url(a, "src"), None);

    tree.set_base_uri("");
    assert_eq!(tree.abs_url(a, "href"), None);
}
