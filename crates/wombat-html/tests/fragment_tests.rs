//! Integration tests for fragment and XML parsing.

use wombat_dom::{NodeId, NodeType};
use wombat_html::{Parser, parse, parse_with};

#[test]
fn test_fragment_in_body_context() {
    let document = parse("<div id=ctx></div>", "");
    let context = document.body().expect("body");
    let fragment = Parser::parse_fragment("<p>one</p>two", Some((&document, context)), "");
    assert_eq!(fragment.nodes.len(), 2);
    assert_eq!(fragment.tree.outer_html(fragment.nodes[0]), "<p>one</p>");
    assert_eq!(fragment.tree.as_text(fragment.nodes[1]), Some("two"));
}

#[test]
fn test_fragment_in_table_context() {
    let document = parse("<table></table>", "");
    let table = document
        .descendants(NodeId::ROOT)
        .find(|&id| document.tag_name(id) == Some("table"))
        .expect("table");
    let fragment = Parser::parse_fragment("<tr><td>x</td></tr>", Some((&document, table)), "");
    let html: String = fragment
        .nodes
        .iter()
        .map(|&id| fragment.tree.outer_html(id))
        .collect();
    assert_eq!(html, "<tbody><tr><td>x</td></tr></tbody>");
}

#[test]
fn test_fragment_in_raw_text_context() {
    let document = parse("<script></script>", "");
    let script = document
        .descendants(NodeId::ROOT)
        .find(|&id| document.tag_name(id) == Some("script"))
        .expect("script");
    let fragment = Parser::parse_fragment("a < b && <p>", Some((&document, script)), "");
    assert_eq!(fragment.nodes.len(), 1);
    assert!(matches!(
        fragment.tree.get(fragment.nodes[0]).map(|n| &n.node_type),
        Some(NodeType::Data(data)) if data == "a < b && <p>"
    ));
}

#[test]
fn test_textarea_fragment_without_context_has_no_form() {
    let fragment = Parser::parse_fragment("<textarea>One</textarea>", None, "");
    let tree = &fragment.tree;
    assert!(tree.descendants(NodeId::ROOT).all(|id| tree.tag_name(id) != Some("form")));
    let textarea = tree
        .descendants(NodeId::ROOT)
        .find(|&id| tree.tag_name(id) == Some("textarea"))
        .expect("textarea");
    assert_eq!(tree.text(textarea), "One");
}

#[test]
fn test_body_fragment() {
    let tree = Parser::parse_body_fragment("<p>one<p>two", "http://example.com/");
    let body = tree.body().expect("body");
    assert_eq!(tree.html(body), "<p>one</p><p>two</p>");
    assert_eq!(tree.base_uri(), "http://example.com/");
}

#[test]
fn test_xml_keeps_structure_and_case() {
    let mut parser = Parser::xml_parser();
    let tree = parse_with(
        "<?xml version=\"1.0\"?><Feed><Title>A</Title><br><link href=\"x\"/></Feed>",
        "",
        &mut parser,
    );
    assert_eq!(
        tree.outer_html(NodeId::ROOT),
        "<?xml version=\"1.0\"?><Feed><Title>A</Title><br><link href=\"x\" /></br></Feed>"
    );
}

#[test]
fn test_xml_bang_declaration() {
    let fragment = Parser::parse_xml_fragment("<!ENTITY name \"value\"><a/>", "");
    match fragment.tree.get(fragment.nodes[0]).map(|n| &n.node_type) {
        Some(NodeType::XmlDeclaration(declaration)) => {
            assert_eq!(declaration.name, "ENTITY");
            assert!(declaration.is_processing_instruction);
        }
        other => panic!("Expected declaration, got {other:?}"),
    }
}

#[test]
fn test_xml_doctype_and_comment_pass_through() {
    let fragment = Parser::parse_xml_fragment("<!DOCTYPE note><!-- hi --><note/>", "");
    let html: String = fragment
        .nodes
        .iter()
        .map(|&id| fragment.tree.outer_html(id))
        .collect();
    assert_eq!(html, "<!DOCTYPE note><!-- hi --><note />");
}
