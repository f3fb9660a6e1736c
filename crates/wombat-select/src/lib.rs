//! CSS selector engine for the Wombat DOM
//!
//! This crate parses CSS selector queries into evaluator trees and runs
//! them over a [`DomTree`], following
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/) where it has a
//! counterpart.
//!
//! # Scope
//!
//! - Type, universal, id, class and attribute selectors, including
//!   `[^prefix]`, `[attr!=value]` and regex `[attr~=pattern]`
//! - Descendant, child, next-sibling and subsequent-sibling combinators and
//!   selector lists
//! - Structural pseudo-classes (`:nth-child()` and family, `:first-child`,
//!   `:only-of-type`, `:empty`, `:root`, ...), `:has()` and `:not()`
//! - Text pseudo-classes: `:contains()`, `:containsOwn()`,
//!   `:containsData()`, `:matches()`, `:matchesOwn()`
//! - Index pseudo-classes: `:lt()`, `:gt()`, `:eq()`
//! - Unique selector generation ([`css_selector`])
//!
//! # Not Implemented
//!
//! - Interactive pseudo-classes (`:hover`, `:focus`) and pseudo-elements
//! - Specificity and cascade
//! - Index shortcuts: every selection walks the whole subtree
//!
//! # Example
//!
//! ```
//! use wombat_select::Select;
//!
//! let tree = wombat_html::parse("<ul><li>One<li class=hot>Two</ul>", "");
//! let hot = tree.select(tree.root(), "ul > li.hot").unwrap();
//! assert_eq!(hot.text(&tree), "Two");
//! ```

pub mod collector;
pub mod css_path;
pub mod error;
pub mod evaluator;
pub mod query_parser;
pub mod structural;
pub mod token_queue;

pub use collector::collect;
pub use css_path::css_selector;
pub use error::SelectorParseError;
pub use evaluator::{AttributeMatch, Evaluator, Nth, NthKind};
pub use query_parser::QueryParser;
pub use structural::Structural;
pub use token_queue::TokenQueue;

use wombat_dom::{DomTree, NodeId};

/// Elements found by a selection, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Elements {
    nodes: Vec<NodeId>,
}

impl Elements {
    /// The first element, if any.
    #[must_use]
    pub fn first(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    /// The last element, if any.
    #[must_use]
    pub fn last(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    /// The element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.nodes.get(index).copied()
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if nothing was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True if `id` was selected.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    /// Iterate over the selected elements.
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, NodeId>> {
        self.nodes.iter().copied()
    }

    /// The selected elements as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[NodeId] {
        &self.nodes
    }

    /// The combined text of every element, joined by single spaces.
    #[must_use]
    pub fn text(&self, tree: &DomTree) -> String {
        let mut text = String::new();
        for id in self.iter() {
            let own = tree.text(id);
            if !text.is_empty() && !own.is_empty() {
                text.push(' ');
            }
            text.push_str(&own);
        }
        text
    }

    /// The value of `key` on the first element that has it.
    #[must_use]
    pub fn attr<'a>(&self, tree: &'a DomTree, key: &str) -> Option<&'a str> {
        self.iter().find_map(|id| tree.attr(id, key))
    }

    /// The outer HTML of every element, joined by newlines.
    #[must_use]
    pub fn outer_html(&self, tree: &DomTree) -> String {
        self.iter()
            .map(|id| tree.outer_html(id))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl FromIterator<NodeId> for Elements {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Elements {
    type Item = NodeId;
    type IntoIter = std::vec::IntoIter<NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'a> IntoIterator for &'a Elements {
    type Item = NodeId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, NodeId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Selector queries over a tree.
pub trait Select {
    /// Every element under `root` (inclusive) matching `query`.
    ///
    /// # Errors
    /// Returns the parse error if `query` is not a valid selector.
    fn select(&self, root: NodeId, query: &str) -> Result<Elements, SelectorParseError>;

    /// The first element under `root` (inclusive) matching `query`.
    ///
    /// # Errors
    /// Returns the parse error if `query` is not a valid selector.
    fn select_first(&self, root: NodeId, query: &str)
    -> Result<Option<NodeId>, SelectorParseError>;

    /// True if `element` matches `query`, evaluated from the top of its
    /// tree.
    ///
    /// # Errors
    /// Returns the parse error if `query` is not a valid selector.
    fn is(&self, element: NodeId, query: &str) -> Result<bool, SelectorParseError>;

    /// A selector that selects exactly `element`. See [`css_selector`].
    fn css_selector(&self, element: NodeId) -> String;
}

impl Select for DomTree {
    fn select(&self, root: NodeId, query: &str) -> Result<Elements, SelectorParseError> {
        let evaluator = QueryParser::parse(query)?;
        Ok(collect(&evaluator, self, root))
    }

    fn select_first(
        &self,
        root: NodeId,
        query: &str,
    ) -> Result<Option<NodeId>, SelectorParseError> {
        let evaluator = QueryParser::parse(query)?;
        Ok(self
            .traverse(root)
            .find(|&node| self.is_element(node) && evaluator.matches(self, root, node)))
    }

    fn is(&self, element: NodeId, query: &str) -> Result<bool, SelectorParseError> {
        let evaluator = QueryParser::parse(query)?;
        let top = self.ancestors(element).last().unwrap_or(element);
        Ok(evaluator.matches(self, top, element))
    }

    fn css_selector(&self, element: NodeId) -> String {
        css_selector(self, element)
    }
}
