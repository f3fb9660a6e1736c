//! Compact HTML and XML serialization.
//!
//! [§ 13.3 Serializing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments)
//!
//! Output is not pretty printed: the serialized form of a parsed document
//! reparses to the same tree. The walk is iterative so very deep trees do
//! not exhaust the call stack.

use crate::{DoctypeData, DomTree, NodeId, NodeType, Syntax, XmlDeclarationData};

/// [§ 13.3](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments)
///
/// "If the parent of current node is a style, script, xmp, iframe, noembed,
/// noframes, or plaintext element ... then append the value of current
/// node's data literally."
const RAW_TEXT_PARENTS: &[&str] = &[
    "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

/// One unit of work for the serializer's explicit stack.
enum Step {
    Open(NodeId),
    Close(NodeId),
}

/// Escape `text` for output.
///
/// [§ 13.3](https://html.spec.whatwg.org/multipage/parsing.html#escapingString)
///
/// "Replace any occurrence of the "&" character by the string "&amp;".
/// Replace any occurrences of the U+00A0 NO-BREAK SPACE character by the
/// string "&nbsp;". If the algorithm was invoked in the attribute mode,
/// replace any occurrences of the """ character by the string "&quot;". If
/// the algorithm was not invoked in the attribute mode, replace any
/// occurrences of the "<" character by the string "&lt;", and any
/// occurrences of the ">" character by the string "&gt;"."
#[must_use]
pub fn escape(text: &str, in_attribute: bool, syntax: Syntax) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str(match syntax {
                Syntax::Html => "&nbsp;",
                Syntax::Xml => "&#xa0;",
            }),
            '"' if in_attribute => out.push_str("&quot;"),
            '<' if !in_attribute => out.push_str("&lt;"),
            '>' if !in_attribute => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

impl DomTree {
    /// The node and its descendants as markup.
    ///
    /// For the document node this is the same as [`DomTree::html`].
    #[must_use]
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.serialize_into(id, &mut out);
        out
    }

    /// The node's children as markup.
    #[must_use]
    pub fn html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.serialize_into(child, &mut out);
        }
        out
    }

    fn serialize_into(&self, id: NodeId, out: &mut String) {
        let syntax = self.document().syntax;
        let mut stack = vec![Step::Open(id)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Open(node) => {
                    if self.open_node(node, syntax, out) {
                        stack.push(Step::Close(node));
                        stack.extend(self.children(node).iter().rev().map(|&c| Step::Open(c)));
                    }
                }
                Step::Close(node) => {
                    if let Some(element) = self.as_element(node) {
                        // Nothing closes <plaintext>: any end tag written
                        // after it would reparse as more of its text.
                        if syntax == Syntax::Html && element.normal_name() == "plaintext" {
                            return;
                        }
                        out.push_str("</");
                        out.push_str(element.tag_name());
                        out.push('>');
                    }
                }
            }
        }
    }

    /// Writes the opening part of `id`. Returns true when the node needs
    /// its children and a closing part written.
    fn open_node(&self, id: NodeId, syntax: Syntax, out: &mut String) -> bool {
        let Some(node) = self.get(id) else {
            return false;
        };
        match &node.node_type {
            NodeType::Document(_) => {
                for &child in node.children.iter() {
                    self.serialize_into(child, out);
                }
                false
            }
            NodeType::Doctype(doctype) => {
                write_doctype(doctype, out);
                false
            }
            NodeType::Text(text) => {
                let raw_parent = syntax == Syntax::Html
                    && node
                        .parent
                        .and_then(|parent| self.as_element(parent))
                        .is_some_and(|parent| RAW_TEXT_PARENTS.contains(&parent.normal_name()));
                if raw_parent {
                    out.push_str(text);
                } else {
                    out.push_str(&escape(text, false, syntax));
                }
                false
            }
            NodeType::Data(data) => {
                out.push_str(data);
                false
            }
            NodeType::Comment(data) => {
                out.push_str("<!--");
                out.push_str(data);
                out.push_str("-->");
                false
            }
            NodeType::XmlDeclaration(declaration) => {
                write_declaration(declaration, syntax, out);
                false
            }
            NodeType::Element(element) => {
                out.push('<');
                out.push_str(element.tag_name());
                for attribute in &element.attrs {
                    out.push(' ');
                    out.push_str(attribute.key());
                    // Boolean attributes collapse to the bare key in HTML only.
                    if !(attribute.is_boolean() && syntax == Syntax::Html) {
                        out.push_str("=\"");
                        out.push_str(&escape(attribute.value(), true, syntax));
                        out.push('"');
                    }
                }

                if node.children.is_empty() && element.tag.is_self_closing() {
                    if syntax == Syntax::Html && element.tag.is_empty() {
                        out.push('>');
                    } else {
                        out.push_str(" />");
                    }
                    return false;
                }
                out.push('>');

                // [§ 13.3](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments)
                // "If current node is a pre, textarea, or listing element, and
                // the first child node of the element, if any, is a Text node
                // whose character data has as its first character a U+000A
                // LINE FEED (LF) character, then append a U+000A LINE FEED
                // (LF) character."
                if syntax == Syntax::Html
                    && matches!(element.normal_name(), "pre" | "textarea" | "listing")
                    && node
                        .children
                        .first()
                        .and_then(|&c| self.as_text(c))
                        .is_some_and(|t| t.starts_with('\n'))
                {
                    out.push('\n');
                }
                true
            }
        }
    }
}

fn write_doctype(doctype: &DoctypeData, out: &mut String) {
    out.push_str("<!DOCTYPE");
    if !doctype.name.is_empty() {
        out.push(' ');
        out.push_str(&doctype.name);
    }
    if !doctype.public_id.is_empty() {
        out.push_str(" PUBLIC \"");
        out.push_str(&doctype.public_id);
        out.push('"');
    }
    if !doctype.system_id.is_empty() {
        if doctype.public_id.is_empty() {
            out.push_str(" SYSTEM");
        }
        out.push_str(" \"");
        out.push_str(&doctype.system_id);
        out.push('"');
    }
    out.push('>');
}

fn write_declaration(declaration: &XmlDeclarationData, syntax: Syntax, out: &mut String) {
    let marker = if declaration.is_processing_instruction {
        '!'
    } else {
        '?'
    };
    out.push('<');
    out.push(marker);
    out.push_str(&declaration.name);
    for attribute in &declaration.attrs {
        out.push(' ');
        out.push_str(attribute.key());
        if !attribute.is_boolean() {
            out.push_str("=\"");
            out.push_str(&escape(attribute.value(), true, syntax));
            out.push('"');
        }
    }
    out.push(marker);
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text_and_attribute() {
        assert_eq!(
            escape("a < b & \"c\" > d\u{a0}", false, Syntax::Html),
            "a &lt; b &amp; \"c\" &gt; d&nbsp;"
        );
        assert_eq!(
            escape("a < b & \"c\"", true, Syntax::Html),
            "a < b &amp; &quot;c&quot;"
        );
        assert_eq!(escape("\u{a0}", false, Syntax::Xml), "&#xa0;");
    }
}
