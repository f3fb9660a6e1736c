//! Renderers for parsed trees: an indented outline and a JSON form.

use std::io::{self, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use wombat_dom::{DomTree, NodeId, NodeType};

/// Write an indented outline of the subtree at `id`.
///
/// Text is shown with newlines escaped and spaces as `·` so whitespace-only
/// nodes stay visible. With `color`, tags and comments are highlighted.
pub fn write_tree(
    tree: &DomTree,
    id: NodeId,
    out: &mut impl Write,
    color: bool,
) -> io::Result<()> {
    // Explicit stack so deeply nested documents don't exhaust the call stack.
    let mut stack = vec![(id, 0_usize)];
    while let Some((current, depth)) = stack.pop() {
        let Some(node) = tree.get(current) else {
            continue;
        };
        let prefix = "  ".repeat(depth);
        let line = describe(&node.node_type);
        if color {
            match &node.node_type {
                NodeType::Element(_) => writeln!(out, "{prefix}{}", line.cyan())?,
                NodeType::Comment(_) => writeln!(out, "{prefix}{}", line.dimmed())?,
                NodeType::Doctype(_) | NodeType::XmlDeclaration(_) => {
                    writeln!(out, "{prefix}{}", line.magenta())?;
                }
                _ => writeln!(out, "{prefix}{line}")?,
            }
        } else {
            writeln!(out, "{prefix}{line}")?;
        }

        for &child in tree.children(current).iter().rev() {
            stack.push((child, depth + 1));
        }
    }
    Ok(())
}

fn describe(node_type: &NodeType) -> String {
    match node_type {
        NodeType::Document(_) => "#document".to_string(),
        NodeType::Doctype(doctype) => format!("<!DOCTYPE {}>", doctype.name),
        NodeType::XmlDeclaration(decl) => format!("<?{}?>", decl.name),
        NodeType::Element(data) => {
            let mut line = format!("<{}", data.tag_name());
            for attr in data.attrs.iter() {
                if attr.is_boolean() {
                    line.push_str(&format!(" {}", attr.key()));
                } else {
                    line.push_str(&format!(" {}=\"{}\"", attr.key(), attr.value()));
                }
            }
            line.push('>');
            line
        }
        NodeType::Text(text) => {
            format!("\"{}\"", text.replace('\n', "\\n").replace(' ', "\u{00B7}"))
        }
        NodeType::Data(data) => format!("#data \"{}\"", data.replace('\n', "\\n")),
        NodeType::Comment(comment) => format!("<!-- {comment} -->"),
    }
}

/// A node in the JSON dump.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum JsonNode<'a> {
    /// The document root.
    Document {
        /// Child nodes.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        children: Vec<JsonNode<'a>>,
    },
    /// A doctype.
    #[serde(rename_all = "camelCase")]
    Doctype {
        /// Doctype name.
        name: &'a str,
        /// Public identifier.
        public_id: &'a str,
        /// System identifier.
        system_id: &'a str,
    },
    /// An XML declaration or processing instruction.
    Declaration {
        /// Target name.
        name: &'a str,
    },
    /// An element.
    #[serde(rename_all = "camelCase")]
    Element {
        /// Tag name as parsed.
        tag_name: &'a str,
        /// Attributes in source order.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        attributes: Vec<JsonAttribute<'a>>,
        /// Child nodes.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        children: Vec<JsonNode<'a>>,
    },
    /// Text content.
    Text {
        /// The text.
        content: &'a str,
    },
    /// Script or style data.
    Data {
        /// The raw data.
        content: &'a str,
    },
    /// A comment.
    Comment {
        /// The comment text.
        content: &'a str,
    },
}

/// A name/value pair in the JSON dump.
#[derive(Debug, Serialize)]
pub struct JsonAttribute<'a> {
    /// Attribute name.
    pub name: &'a str,
    /// Attribute value.
    pub value: &'a str,
}

/// Convert the subtree at `id` into its JSON form.
#[must_use]
pub fn to_json(tree: &DomTree, id: NodeId) -> Option<JsonNode<'_>> {
    let node = tree.get(id)?;
    let children = || -> Vec<JsonNode<'_>> {
        tree.children(id)
            .iter()
            .filter_map(|&child| to_json(tree, child))
            .collect()
    };
    Some(match &node.node_type {
        NodeType::Document(_) => JsonNode::Document {
            children: children(),
        },
        NodeType::Doctype(doctype) => JsonNode::Doctype {
            name: &doctype.name,
            public_id: &doctype.public_id,
            system_id: &doctype.system_id,
        },
        NodeType::XmlDeclaration(decl) => JsonNode::Declaration { name: &decl.name },
        NodeType::Element(data) => JsonNode::Element {
            tag_name: data.tag_name(),
            attributes: data
                .attrs
                .iter()
                .map(|attr| JsonAttribute {
                    name: attr.key(),
                    value: attr.value(),
                })
                .collect(),
            children: children(),
        },
        NodeType::Text(text) => JsonNode::Text { content: text },
        NodeType::Data(data) => JsonNode::Data { content: data },
        NodeType::Comment(comment) => JsonNode::Comment { content: comment },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outline(html: &str) -> String {
        let tree = wombat_html::parse(html, "");
        let mut out = Vec::new();
        write_tree(&tree, tree.root(), &mut out, false).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_tree_outline() {
        assert_eq!(
            outline("<p class=a>Hi there</p><!-- c -->"),
            "#document\n  <html>\n    <head>\n    <body>\n      <p class=\"a\">\n        \"Hi\u{00B7}there\"\n      <!--  c  -->\n"
        );
    }

    #[test]
    fn test_json_shape() {
        let tree = wombat_html::parse("<!DOCTYPE html><a href=/x>link</a>", "");
        let json = serde_json::to_value(to_json(&tree, tree.root()).unwrap()).unwrap();
        assert_eq!(json["type"], "document");
        assert_eq!(json["children"][0]["type"], "doctype");
        assert_eq!(json["children"][0]["name"], "html");

        let body = &json["children"][1]["children"][1];
        assert_eq!(body["tagName"], "body");
        let link = &body["children"][0];
        assert_eq!(link["attributes"][0]["name"], "href");
        assert_eq!(link["attributes"][0]["value"], "/x");
        assert_eq!(link["children"][0]["content"], "link");
        assert!(json["children"][1]["children"][0].get("children").is_none());
    }
}
