//! Text extraction.
//!
//! [§ 3.2.5 Element.innerText](https://html.spec.whatwg.org/multipage/dom.html#the-innertext-idl-attribute)
//!
//! A layout-free approximation of rendered text: whitespace runs collapse
//! to one space, block boundaries and `<br>` separate words, and text in
//! whitespace-preserving elements (`pre`, `textarea`, ...) is kept as is.

use crate::{DomTree, NodeId, NodeType};

/// Whitespace for normalization: ASCII whitespace plus U+00A0.
const fn is_actually_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0c' | '\r' | '\u{a0}')
}

/// Zero-width and soft-hyphen characters dropped from normalized text.
const fn is_invisible(c: char) -> bool {
    matches!(c, '\u{200b}' | '\u{ad}')
}

fn last_char_is_whitespace(accum: &str) -> bool {
    accum.ends_with(' ')
}

/// Append `text` with each whitespace run replaced by a single space.
/// Leading whitespace is dropped when `strip_leading` is set.
fn append_normalised_whitespace(accum: &mut String, text: &str, strip_leading: bool) {
    let mut last_was_white = false;
    let mut reached_non_white = false;
    for c in text.chars() {
        if is_actually_whitespace(c) {
            if (strip_leading && !reached_non_white) || last_was_white {
                continue;
            }
            accum.push(' ');
            last_was_white = true;
        } else if !is_invisible(c) {
            accum.push(c);
            last_was_white = false;
            reached_non_white = true;
        }
    }
}

/// Trim control characters and spaces. U+00A0 is kept.
fn trim_control(text: &str) -> &str {
    text.trim_matches(|c: char| c <= ' ')
}

/// Collapse whitespace in `text` and trim it.
#[must_use]
pub fn normalise_whitespace(text: &str) -> String {
    let mut accum = String::with_capacity(text.len());
    append_normalised_whitespace(&mut accum, text, false);
    trim_control(&accum).to_string()
}

impl DomTree {
    /// True if text under `id` keeps its whitespace: the element, or its
    /// parent, has a whitespace-preserving tag.
    fn preserves_whitespace(&self, id: NodeId) -> bool {
        let preserving = |node: NodeId| {
            self.as_element(node)
                .is_some_and(|e| e.tag.preserve_whitespace())
        };
        preserving(id) || self.parent(id).is_some_and(preserving)
    }

    fn append_normalised_text(&self, accum: &mut String, text_node: NodeId, text: &str) {
        if self.parent(text_node).is_some_and(|p| self.preserves_whitespace(p)) {
            accum.push_str(text);
        } else {
            let strip = last_char_is_whitespace(accum);
            append_normalised_whitespace(accum, text, strip);
        }
    }

    /// The combined, whitespace-normalized text of the node and all its
    /// descendants.
    ///
    /// `<p>Hello <b>there</b> now!</p>` gives `"Hello there now!"`.
    #[must_use]
    pub fn text(&self, id: NodeId) -> String {
        enum Visit {
            Head(NodeId),
            Tail(NodeId),
        }

        let mut accum = String::new();
        let mut stack = vec![Visit::Head(id)];
        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Head(node) => {
                    match self.get(node).map(|n| &n.node_type) {
                        Some(NodeType::Text(text)) => {
                            self.append_normalised_text(&mut accum, node, text);
                        }
                        Some(NodeType::Element(element)) => {
                            if !accum.is_empty()
                                && (element.tag.is_block() || element.normal_name() == "br")
                                && !last_char_is_whitespace(&accum)
                            {
                                accum.push(' ');
                            }
                        }
                        _ => {}
                    }
                    stack.push(Visit::Tail(node));
                    stack.extend(self.children(node).iter().rev().map(|&c| Visit::Head(c)));
                }
                Visit::Tail(node) => {
                    // <div>One</div>Two reads "One Two".
                    let block = self.as_element(node).is_some_and(|e| e.tag.is_block());
                    if block
                        && self
                            .next_sibling(node)
                            .is_some_and(|s| self.as_text(s).is_some())
                        && !last_char_is_whitespace(&accum)
                    {
                        accum.push(' ');
                    }
                }
            }
        }
        trim_control(&accum).to_string()
    }

    /// The text directly owned by the element, ignoring descendants'
    /// text.
    ///
    /// `<p>Hello <b>there</b> now!</p>` gives `"Hello now!"`.
    #[must_use]
    pub fn own_text(&self, id: NodeId) -> String {
        let mut accum = String::new();
        for &child in self.children(id) {
            match self.get(child).map(|n| &n.node_type) {
                Some(NodeType::Text(text)) => self.append_normalised_text(&mut accum, child, text),
                Some(NodeType::Element(element))
                    if element.normal_name() == "br" && !last_char_is_whitespace(&accum) =>
                {
                    accum.push(' ');
                }
                _ => {}
            }
        }
        trim_control(&accum).to_string()
    }

    /// True if any text node under the element has non-whitespace content.
    #[must_use]
    pub fn has_text(&self, id: NodeId) -> bool {
        self.descendants(id).any(|node| {
            self.as_text(node)
                .is_some_and(|t| !t.chars().all(is_actually_whitespace))
        })
    }

    /// The combined data of the node: script and style contents plus
    /// comment text, in document order. Ordinary text is not included.
    #[must_use]
    pub fn data(&self, id: NodeId) -> String {
        let mut accum = String::new();
        for node in self.descendants(id) {
            if let Some(NodeType::Data(data) | NodeType::Comment(data)) =
                self.get(node).map(|n| &n.node_type)
            {
                accum.push_str(data);
            }
        }
        accum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalise_whitespace() {
        assert_eq!(normalise_whitespace("  a \n\t b  "), "a b");
        assert_eq!(normalise_whitespace("a\u{200b}b"), "ab");
        assert_eq!(normalise_whitespace(""), "");
    }
}
