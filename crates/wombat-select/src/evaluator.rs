//! Element predicates built by the query parser.
//!
//! This module implements matching per
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/) for the simple
//! selectors and pseudo-classes the query parser understands, plus the
//! text and index pseudo-classes that have no standard counterpart.
//!
//! Every predicate is evaluated against a candidate element relative to a
//! `root`: the node the selection started from.

use regex::Regex;
use wombat_dom::{DomTree, ElementData, NodeId, NodeType};

use crate::structural::Structural;

/// A parsed selector: a predicate over elements.
///
/// The variant set is closed. Leaves test one element; [`Structural`]
/// variants test the element's relatives; [`Evaluator::And`] and
/// [`Evaluator::Or`] combine other evaluators.
#[derive(Debug, Clone)]
pub enum Evaluator {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    /// "A type selector ... represents an element in the document tree with
    /// the same qualified name as the identifier."
    ///
    /// Holds the lowercased name; `ns|tag` is stored as `ns:tag`.
    Tag(String),

    /// Tag name ending with the given suffix. Built for `*|tag`, which
    /// matches `tag` in any namespace prefix.
    TagEndsWith(String),

    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    /// "An ID selector represents an element instance that has an identifier
    /// that matches the identifier in the ID selector."
    Id(String),

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    ///
    /// Class names compare ASCII case-insensitively.
    Class(String),

    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    Attribute(AttributeMatch),

    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    /// `*`: any element.
    AllElements,

    /// `:lt(n)`: element sibling index (from zero) below `n`. The root
    /// never matches.
    IndexLessThan(usize),

    /// `:gt(n)`: element sibling index above `n`.
    IndexGreaterThan(usize),

    /// `:eq(n)`: element sibling index equal to `n`.
    IndexEquals(usize),

    /// [§ 14.4 Child-indexed pseudo-classes](https://www.w3.org/TR/selectors-4/#child-index)
    /// The `:nth-*()` family, plus `:first-of-type` and `:last-of-type`
    /// which are `an+b` with `a = 0, b = 1`.
    Nth(Nth),

    /// [§ 14.4.3 :first-child](https://www.w3.org/TR/selectors-4/#the-first-child-pseudo)
    /// "The :first-child pseudo-class represents an element that is first
    /// among its inclusive siblings."
    IsFirstChild,

    /// [§ 14.4.4 :last-child](https://www.w3.org/TR/selectors-4/#the-last-child-pseudo)
    IsLastChild,

    /// [§ 14.4.5 :only-child](https://www.w3.org/TR/selectors-4/#the-only-child-pseudo)
    /// "The :only-child pseudo-class represents an element that has no
    /// siblings."
    IsOnlyChild,

    /// [§ 14.5.5 :only-of-type](https://www.w3.org/TR/selectors-4/#the-only-of-type-pseudo)
    IsOnlyOfType,

    /// [§ 14.2 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
    ///
    /// Comments, declarations and doctypes do not count as content; any text
    /// does, including whitespace.
    IsEmpty,

    /// [§ 14.1 :root](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
    ///
    /// The root of the selection; when selecting from the document, its
    /// first element child.
    IsRoot,

    /// `:contains(text)`: the element's normalized text contains the
    /// (lowercased) search text, ignoring case.
    ContainsText(String),

    /// `:containsOwn(text)`: as [`Evaluator::ContainsText`], but only the
    /// element's own text nodes.
    ContainsOwnText(String),

    /// `:containsData(text)`: script, style and comment data contains the
    /// search text, ignoring case.
    ContainsData(String),

    /// `:matches(regex)`: the element's text matches the pattern.
    Matches(Regex),

    /// `:matchesOwn(regex)`: the element's own text matches the pattern.
    MatchesOwn(Regex),

    /// Selectors relating the element to its ancestors and siblings.
    Structural(Structural),

    /// Every evaluator matches. Built for compound selectors and for the
    /// right-hand side of a combinator.
    And(Vec<Evaluator>),

    /// Any evaluator matches. Built for selector lists (`a, b`).
    Or(Vec<Evaluator>),
}

/// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// Keys are lowercased and looked up ignoring case. Values (except regex
/// patterns) are lowercased and compared ignoring case.
#[derive(Debug, Clone)]
pub enum AttributeMatch {
    /// `[attr]`: "Represents an element with the att attribute"
    Has(String),

    /// `[^prefix]`: an attribute whose name starts with `prefix`, e.g.
    /// `[^data-]`.
    KeyStarting(String),

    /// `[attr=value]`: the trimmed value equals `value`.
    Equals {
        /// Attribute name.
        key: String,
        /// Expected value.
        value: String,
    },

    /// `[attr!=value]`: the value (empty when absent) differs from `value`.
    NotEquals {
        /// Attribute name.
        key: String,
        /// Rejected value.
        value: String,
    },

    /// `[attr^=value]`: "whose value begins with the prefix 'val'"
    Starting {
        /// Attribute name.
        key: String,
        /// Expected prefix.
        value: String,
    },

    /// `[attr$=value]`: "whose value ends with the suffix 'val'"
    Ending {
        /// Attribute name.
        key: String,
        /// Expected suffix.
        value: String,
    },

    /// `[attr*=value]`: "whose value contains at least one instance of the
    /// substring 'val'"
    Containing {
        /// Attribute name.
        key: String,
        /// Expected substring.
        value: String,
    },

    /// `[attr~=regex]`: the value matches the pattern somewhere.
    Matching {
        /// Attribute name.
        key: String,
        /// Pattern searched for in the value.
        pattern: Regex,
    },
}

/// Which siblings an `an+b` position counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NthKind {
    /// `:nth-child()`: element siblings, from the first.
    Child,
    /// `:nth-last-child()`: element siblings, from the last.
    LastChild,
    /// `:nth-of-type()`: siblings with the same tag, from the first.
    OfType,
    /// `:nth-last-of-type()`: siblings with the same tag, from the last.
    LastOfType,
}

/// [§ 14.4 Child-indexed pseudo-classes](https://www.w3.org/TR/selectors-4/#child-index)
///
/// "The :nth-child(An+B) pseudo-class notation represents elements that
/// are among An+Bth elements from the list composed of their inclusive
/// siblings ... for any positive integer or zero value of n"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nth {
    /// Which siblings are counted.
    pub kind: NthKind,
    /// Step.
    pub a: i32,
    /// Offset.
    pub b: i32,
}

impl Nth {
    /// True if a 1-based `position` is `a*n + b` for some `n >= 0`.
    #[must_use]
    pub fn matches_position(&self, position: usize) -> bool {
        let Ok(position) = i64::try_from(position) else {
            return false;
        };
        let (a, b) = (i64::from(self.a), i64::from(self.b));
        if a == 0 {
            return position == b;
        }
        (position - b) * a >= 0 && (position - b) % a == 0
    }

    fn position(&self, tree: &DomTree, parent: NodeId, element: NodeId) -> usize {
        let name = tree.as_element(element).map_or("", ElementData::normal_name);
        let siblings = tree.element_children(parent);
        let index = siblings.iter().position(|&s| s == element).unwrap_or(0);
        let same_type = |&&sibling: &&NodeId| {
            tree.as_element(sibling)
                .is_some_and(|e| e.normal_name() == name)
        };
        match self.kind {
            NthKind::Child => index + 1,
            NthKind::LastChild => siblings.len() - index,
            NthKind::OfType => siblings[..index].iter().filter(same_type).count() + 1,
            NthKind::LastOfType => siblings[index + 1..].iter().filter(same_type).count() + 1,
        }
    }
}

impl Evaluator {
    /// Test `element` against this evaluator, relative to `root`.
    ///
    /// Simple selectors never match non-element nodes; [`Structural::Root`]
    /// matches the root whatever its kind.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, root: NodeId, element: NodeId) -> bool {
        match self {
            Self::Structural(structural) => structural.matches(tree, root, element),
            Self::And(evaluators) => evaluators.iter().all(|e| e.matches(tree, root, element)),
            Self::Or(evaluators) => evaluators.iter().any(|e| e.matches(tree, root, element)),
            simple => tree
                .as_element(element)
                .is_some_and(|data| simple.matches_element(tree, root, element, data)),
        }
    }

    fn matches_element(
        &self,
        tree: &DomTree,
        root: NodeId,
        element: NodeId,
        data: &ElementData,
    ) -> bool {
        match self {
            Self::Tag(name) => data.normal_name() == name,
            Self::TagEndsWith(suffix) => data.normal_name().ends_with(suffix.as_str()),
            Self::Id(id) => data.id() == Some(id.as_str()),
            Self::Class(class_name) => data.has_class(class_name),
            Self::Attribute(attribute) => attribute.matches(data),
            Self::AllElements => true,

            Self::IndexLessThan(index) => {
                root != element && tree.element_sibling_index(element) < *index
            }
            Self::IndexGreaterThan(index) => tree.element_sibling_index(element) > *index,
            Self::IndexEquals(index) => tree.element_sibling_index(element) == *index,

            Self::Nth(nth) => element_parent(tree, element)
                .is_some_and(|parent| nth.matches_position(nth.position(tree, parent, element))),

            Self::IsFirstChild => element_parent(tree, element)
                .is_some_and(|_| tree.element_sibling_index(element) == 0),
            Self::IsLastChild => element_parent(tree, element)
                .is_some_and(|_| tree.next_element_sibling(element).is_none()),
            Self::IsOnlyChild => element_parent(tree, element)
                .is_some_and(|_| tree.sibling_elements(element).is_empty()),
            Self::IsOnlyOfType => element_parent(tree, element).is_some_and(|_| {
                !tree.sibling_elements(element).into_iter().any(|sibling| {
                    tree.as_element(sibling)
                        .is_some_and(|e| e.normal_name() == data.normal_name())
                })
            }),

            // Whitespace text makes an element non-empty, as in Selectors 3.
            Self::IsEmpty => tree.children(element).iter().all(|&child| {
                matches!(
                    tree.get(child).map(|n| &n.node_type),
                    Some(
                        NodeType::Comment(_)
                            | NodeType::XmlDeclaration(_)
                            | NodeType::Doctype(_)
                    )
                )
            }),

            Self::IsRoot => {
                let selection_root = if tree.is_element(root) {
                    Some(root)
                } else {
                    tree.element_children(root).first().copied()
                };
                selection_root == Some(element)
            }

            Self::ContainsText(text) => tree.text(element).to_lowercase().contains(text.as_str()),
            Self::ContainsOwnText(text) => {
                tree.own_text(element).to_lowercase().contains(text.as_str())
            }
            Self::ContainsData(data) => tree.data(element).to_lowercase().contains(data.as_str()),
            Self::Matches(pattern) => pattern.is_match(&tree.text(element)),
            Self::MatchesOwn(pattern) => pattern.is_match(&tree.own_text(element)),

            Self::Structural(_) | Self::And(_) | Self::Or(_) => {
                self.matches(tree, root, element)
            }
        }
    }
}

impl AttributeMatch {
    fn matches(&self, element: &ElementData) -> bool {
        let attrs = &element.attrs;
        match self {
            Self::Has(key) => attrs.has_key_ignore_case(key),
            Self::KeyStarting(prefix) => attrs
                .keys()
                .any(|key| key.to_lowercase().starts_with(prefix.as_str())),
            Self::Equals { key, value } => attrs
                .get_ignore_case(key)
                .is_some_and(|actual| actual.trim().to_lowercase() == *value),
            Self::NotEquals { key, value } => {
                attrs.get_ignore_case(key).unwrap_or("").to_lowercase() != *value
            }
            Self::Starting { key, value } => attrs
                .get_ignore_case(key)
                .is_some_and(|actual| actual.to_lowercase().starts_with(value.as_str())),
            Self::Ending { key, value } => attrs
                .get_ignore_case(key)
                .is_some_and(|actual| actual.to_lowercase().ends_with(value.as_str())),
            Self::Containing { key, value } => attrs
                .get_ignore_case(key)
                .is_some_and(|actual| actual.to_lowercase().contains(value.as_str())),
            Self::Matching { key, pattern } => attrs
                .get_ignore_case(key)
                .is_some_and(|actual| pattern.is_match(actual)),
        }
    }
}

/// The element's parent when that parent is itself an element. Children of
/// the document have no siblings to count against.
fn element_parent(tree: &DomTree, element: NodeId) -> Option<NodeId> {
    tree.parent(element).filter(|&parent| tree.is_element(parent))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(a: i32, b: i32) -> Vec<usize> {
        let nth = Nth {
            kind: NthKind::Child,
            a,
            b,
        };
        (1..=10).filter(|&p| nth.matches_position(p)).collect()
    }

    #[test]
    fn test_nth_positions() {
        assert_eq!(positions(3, -1), vec![2, 5, 8]);
        assert_eq!(positions(2, 0), vec![2, 4, 6, 8, 10]);
        assert_eq!(positions(2, 1), vec![1, 3, 5, 7, 9]);
        assert_eq!(positions(-2, 5), vec![1, 3, 5]);
        assert_eq!(positions(0, 4), vec![4]);
        assert_eq!(positions(-1, 3), vec![1, 2, 3]);
    }
}
