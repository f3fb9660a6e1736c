//! Evaluators that look beyond the candidate element.
//!
//! [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
//!
//! Combinators are evaluated right to left: the right-hand compound is
//! tested against the candidate, and the wrapped left-hand evaluator is
//! tested against the candidate's relatives. Relatives never extend past
//! the selection root.

use wombat_dom::{DomTree, NodeId};

use crate::evaluator::Evaluator;

/// Relationship tests wrapping another evaluator.
#[derive(Debug, Clone)]
pub enum Structural {
    /// The selection root itself. A query that starts with a combinator
    /// (`> p`) is anchored here.
    Root,

    /// [§ 14.3.1 :has()](https://www.w3.org/TR/selectors-4/#relational)
    /// Some descendant matches, evaluated with the candidate as root.
    Has(Box<Evaluator>),

    /// [§ 4.3 :not()](https://www.w3.org/TR/selectors-4/#negation)
    /// "The negation pseudo-class, :not(), is a functional pseudo-class
    /// taking a selector list as an argument. It represents an element that
    /// is not represented by its argument."
    Not(Box<Evaluator>),

    /// [§ 16.1 Descendant combinator](https://www.w3.org/TR/selectors-4/#descendant-combinators)
    /// "A selector of the form 'A B' represents an element B that is an
    /// arbitrary descendant of some ancestor element A."
    Parent(Box<Evaluator>),

    /// [§ 16.2 Child combinator](https://www.w3.org/TR/selectors-4/#child-combinators)
    /// "A selector of the form 'A > B' represents an element B that is a
    /// direct child of element A."
    ImmediateParent(Box<Evaluator>),

    /// [§ 16.4 Subsequent-sibling combinator](https://www.w3.org/TR/selectors-4/#general-sibling-combinators)
    /// "A selector of the form 'A ~ B' represents an element B that follows
    /// element A (not necessarily immediately)"
    PreviousSibling(Box<Evaluator>),

    /// [§ 16.3 Next-sibling combinator](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators)
    /// "A selector of the form 'A + B' represents an element B that
    /// immediately follows element A"
    ImmediatePreviousSibling(Box<Evaluator>),
}

impl Structural {
    pub(crate) fn matches(&self, tree: &DomTree, root: NodeId, element: NodeId) -> bool {
        match self {
            Self::Root => root == element,

            Self::Has(evaluator) => tree
                .descendants(element)
                .any(|descendant| evaluator.matches(tree, element, descendant)),

            Self::Not(evaluator) => !evaluator.matches(tree, root, element),

            Self::Parent(evaluator) => {
                if root == element {
                    return false;
                }
                for ancestor in tree.ancestors(element) {
                    if evaluator.matches(tree, root, ancestor) {
                        return true;
                    }
                    if ancestor == root {
                        break;
                    }
                }
                false
            }

            Self::ImmediateParent(evaluator) => {
                root != element
                    && tree
                        .parent(element)
                        .is_some_and(|parent| evaluator.matches(tree, root, parent))
            }

            Self::PreviousSibling(evaluator) => {
                root != element
                    && tree
                        .preceding_siblings(element)
                        .filter(|&sibling| tree.is_element(sibling))
                        .any(|sibling| evaluator.matches(tree, root, sibling))
            }

            Self::ImmediatePreviousSibling(evaluator) => {
                root != element
                    && tree
                        .previous_element_sibling(element)
                        .is_some_and(|sibling| evaluator.matches(tree, root, sibling))
            }
        }
    }
}

impl From<Structural> for Evaluator {
    fn from(structural: Structural) -> Self {
        Self::Structural(structural)
    }
}
