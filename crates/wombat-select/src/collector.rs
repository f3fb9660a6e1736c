//! Runs an evaluator over a subtree.

use log::debug;
use wombat_dom::{DomTree, NodeId};

use crate::Elements;
use crate::evaluator::Evaluator;

/// Every element in the subtree of `root` (including `root`) that
/// `evaluator` matches, in document order.
///
/// The walk is a pre-order traversal of all nodes; only elements are tested.
#[must_use]
pub fn collect(evaluator: &Evaluator, tree: &DomTree, root: NodeId) -> Elements {
    let elements: Elements = tree
        .traverse(root)
        .filter(|&node| tree.is_element(node) && evaluator.matches(tree, root, node))
        .collect();
    debug!(
        target: "wombat::select",
        "collected {} elements under {root:?}",
        elements.len()
    );
    elements
}
