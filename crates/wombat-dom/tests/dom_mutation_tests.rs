//! Tests for DOM tree mutation methods: remove_child, insert_before,
//! insert_child_at, move_children, import_subtree. Every mutation must keep
//! `sibling_index` in step with the parent's child list.

use quickcheck_macros::quickcheck;
use wombat_dom::{Attributes, DomTree, NodeId, NodeType, ParseSettings, Tag};

/// Helper to create an element node and return its NodeId.
fn alloc_element(tree: &mut DomTree, tag: &str) -> NodeId {
    tree.create_element(
        Tag::value_of(tag, ParseSettings::HTML_DEFAULT),
        Attributes::new(),
    )
}

/// Asserts every child of `parent` knows its own position.
fn assert_indices_consistent(tree: &DomTree, parent: NodeId) {
    for (index, &child) in tree.children(parent).iter().enumerate() {
        assert_eq!(tree.sibling_index(child), index);
        assert_eq!(tree.parent(child), Some(parent));
    }
}

// ========== remove_child ==========

#[test]
fn test_remove_child_single_child() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let child = alloc_element(&mut tree, "p");
    tree.append_child(parent, child);

    assert_eq!(tree.children(parent).len(), 1);

    tree.remove_child(parent, child);

    assert_eq!(tree.children(parent).len(), 0);
    assert_eq!(tree.parent(child), None);
    assert_eq!(tree.prev_sibling(child), None);
    assert_eq!(tree.next_sibling(child), None);
}

#[test]
fn test_remove_child_first_of_three() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    let c = alloc_element(&mut tree, "c");
    tree.append_child(parent, a);
    tree.append_child(parent, b);
    tree.append_child(parent, c);

    tree.remove_child(parent, a);

    // b is now first child, c is second
    assert_eq!(tree.children(parent), &[b, c]);
    assert_eq!(tree.prev_sibling(b), None);
    assert_eq!(tree.next_sibling(b), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(b));
    assert_indices_consistent(&tree, parent);
}

#[test]
fn test_remove_child_middle_of_three() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    let c = alloc_element(&mut tree, "c");
    tree.append_child(parent, a);
    tree.append_child(parent, b);
    tree.append_child(parent, c);

    tree.remove_child(parent, b);

    // a and c are siblings now
    assert_eq!(tree.children(parent), &[a, c]);
    assert_eq!(tree.next_sibling(a), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(a));
}

#[test]
fn test_remove_child_last_of_three() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    let c = alloc_element(&mut tree, "c");
    tree.append_child(parent, a);
    tree.append_child(parent, b);
    tree.append_child(parent, c);

    tree.remove_child(parent, c);

    assert_eq!(tree.children(parent), &[a, b]);
    assert_eq!(tree.next_sibling(b), None);
    assert_indices_consistent(&tree, parent);
}

#[test]
fn test_remove_child_of_other_parent_is_noop() {
    let mut tree = DomTree::new();
    let first = alloc_element(&mut tree, "div");
    let second = alloc_element(&mut tree, "div");
    let child = alloc_element(&mut tree, "p");
    tree.append_child(first, child);

    tree.remove_child(second, child);

    assert_eq!(tree.parent(child), Some(first));
    assert_eq!(tree.children(first), &[child]);
}

// ========== append_child ==========

#[test]
fn test_append_child_reparents() {
    let mut tree = DomTree::new();
    let old_parent = alloc_element(&mut tree, "div");
    let new_parent = alloc_element(&mut tree, "section");
    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    tree.append_child(old_parent, a);
    tree.append_child(old_parent, b);

    tree.append_child(new_parent, a);

    assert_eq!(tree.children(old_parent), &[b]);
    assert_eq!(tree.children(new_parent), &[a]);
    assert_indices_consistent(&tree, old_parent);
    assert_indices_consistent(&tree, new_parent);
}

// ========== insert_before ==========

#[test]
fn test_insert_before_first_child() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let existing = alloc_element(&mut tree, "b");
    tree.append_child(parent, existing);

    let new_child = alloc_element(&mut tree, "a");
    tree.insert_before(parent, new_child, existing);

    // new_child should be first, existing second
    assert_eq!(tree.children(parent), &[new_child, existing]);
    assert_eq!(tree.parent(new_child), Some(parent));
    assert_eq!(tree.next_sibling(new_child), Some(existing));
    assert_eq!(tree.prev_sibling(new_child), None);
    assert_eq!(tree.prev_sibling(existing), Some(new_child));
}

#[test]
fn test_insert_before_middle() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let a = alloc_element(&mut tree, "a");
    let c = alloc_element(&mut tree, "c");
    tree.append_child(parent, a);
    tree.append_child(parent, c);

    let b = alloc_element(&mut tree, "b");
    tree.insert_before(parent, b, c);

    assert_eq!(tree.children(parent), &[a, b, c]);
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.prev_sibling(b), Some(a));
    assert_eq!(tree.next_sibling(b), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(b));
    assert_indices_consistent(&tree, parent);
}

#[test]
fn test_insert_before_foreign_reference_appends() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    let elsewhere = alloc_element(&mut tree, "div");
    let a = alloc_element(&mut tree, "a");
    let stranger = alloc_element(&mut tree, "s");
    tree.append_child(parent, a);
    tree.append_child(elsewhere, stranger);

    let b = alloc_element(&mut tree, "b");
    tree.insert_before(parent, b, stranger);

    assert_eq!(tree.children(parent), &[a, b]);
}

// ========== insert_child_at ==========

#[test]
fn test_insert_child_at_positions() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "ul");
    let a = alloc_element(&mut tree, "li");
    let b = alloc_element(&mut tree, "li");
    let c = alloc_element(&mut tree, "li");
    tree.insert_child_at(parent, 0, c);
    tree.insert_child_at(parent, 0, a);
    tree.insert_child_at(parent, 1, b);

    assert_eq!(tree.children(parent), &[a, b, c]);
    assert_indices_consistent(&tree, parent);

    // Out-of-range index clamps to the end.
    let d = alloc_element(&mut tree, "li");
    tree.insert_child_at(parent, 99, d);
    assert_eq!(tree.last_child(parent), Some(d));
    assert_eq!(tree.sibling_index(d), 3);
}

// ========== move_children ==========

#[test]
fn test_move_children_basic() {
    let mut tree = DomTree::new();
    let from = alloc_element(&mut tree, "div");
    let to = alloc_element(&mut tree, "span");
    tree.append_child(NodeId::ROOT, from);
    tree.append_child(NodeId::ROOT, to);

    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    tree.append_child(from, a);
    tree.append_child(from, b);

    tree.move_children(from, to);

    // from should be empty
    assert_eq!(tree.children(from).len(), 0);
    // to should have both children
    assert_eq!(tree.children(to), &[a, b]);
    assert_eq!(tree.parent(a), Some(to));
    assert_eq!(tree.parent(b), Some(to));
}

#[test]
fn test_move_children_appends_to_existing() {
    let mut tree = DomTree::new();
    let from = alloc_element(&mut tree, "div");
    let to = alloc_element(&mut tree, "span");
    tree.append_child(NodeId::ROOT, from);
    tree.append_child(NodeId::ROOT, to);

    let existing = alloc_element(&mut tree, "x");
    tree.append_child(to, existing);

    let moved = alloc_element(&mut tree, "y");
    tree.append_child(from, moved);

    tree.move_children(from, to);

    assert_eq!(tree.children(to), &[existing, moved]);
    // Sibling links between existing and moved
    assert_eq!(tree.next_sibling(existing), Some(moved));
    assert_eq!(tree.prev_sibling(moved), Some(existing));
    assert_indices_consistent(&tree, to);
}

#[test]
fn test_move_children_empty_source() {
    let mut tree = DomTree::new();
    let from = alloc_element(&mut tree, "div");
    let to = alloc_element(&mut tree, "span");
    tree.append_child(NodeId::ROOT, from);
    tree.append_child(NodeId::ROOT, to);

    // Moving no children should be a no-op
    tree.move_children(from, to);

    assert_eq!(tree.children(from).len(), 0);
    assert_eq!(tree.children(to).len(), 0);
}

// ========== import_subtree ==========

#[test]
fn test_import_subtree_deep_copies() {
    let mut source = DomTree::new();
    let div = alloc_element(&mut source, "div");
    source.append_child(NodeId::ROOT, div);
    if let Some(data) = source.as_element_mut(div) {
        data.attrs.set("id", "origin");
    }
    let text = source.alloc(NodeType::Text("hello".to_string()));
    source.append_child(div, text);
    let span = alloc_element(&mut source, "span");
    source.append_child(div, span);

    let mut target = DomTree::new();
    let copy = target.import_subtree(&source, div);
    target.append_child(NodeId::ROOT, copy);

    assert_eq!(target.attr(copy, "id"), Some("origin"));
    assert_eq!(target.children(copy).len(), 2);
    assert_eq!(target.as_text(target.children(copy)[0]), Some("hello"));
    assert_eq!(target.tag_name(target.children(copy)[1]), Some("span"));
    assert_indices_consistent(&target, copy);
    // The source is untouched.
    assert_eq!(source.children(div), &[text, span]);
}

// ========== element navigation ==========

#[test]
fn test_element_siblings_skip_text() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    let a = alloc_element(&mut tree, "a");
    let text = tree.alloc(NodeType::Text(" ".to_string()));
    let b = alloc_element(&mut tree, "b");
    tree.append_child(parent, a);
    tree.append_child(parent, text);
    tree.append_child(parent, b);

    assert_eq!(tree.element_sibling_index(b), 1);
    assert_eq!(tree.previous_element_sibling(b), Some(a));
    assert_eq!(tree.next_element_sibling(a), Some(b));
    assert_eq!(tree.element_children(parent), vec![a, b]);
    assert_eq!(tree.sibling_elements(a), vec![b]);
}

#[test]
fn test_traversal_is_preorder() {
    let mut tree = DomTree::new();
    let html = alloc_element(&mut tree, "html");
    let head = alloc_element(&mut tree, "head");
    let body = alloc_element(&mut tree, "body");
    let p = alloc_element(&mut tree, "p");
    tree.append_child(NodeId::ROOT, html);
    tree.append_child(html, head);
    tree.append_child(html, body);
    tree.append_child(body, p);

    let order: Vec<NodeId> = tree.traverse(NodeId::ROOT).collect();
    assert_eq!(order, vec![NodeId::ROOT, html, head, body, p]);
    assert_eq!(tree.document_element(), Some(html));
    assert_eq!(tree.head(), Some(head));
    assert_eq!(tree.body(), Some(body));
    assert!(tree.is_descendant_of(p, html));
    assert_eq!(tree.ancestors(p).collect::<Vec<_>>(), vec![body, html, NodeId::ROOT]);
}

/// Random sequences of inserts and removals keep sibling indices valid.
#[quickcheck]
fn prop_sibling_indices_stay_consistent(ops: Vec<(bool, u8)>) -> bool {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    for (insert, position) in ops {
        let count = tree.children(parent).len();
        if insert || count == 0 {
            let child = alloc_element(&mut tree, "span");
            tree.insert_child_at(parent, usize::from(position), child);
        } else {
            let child = tree.children(parent)[usize::from(position) % count];
            tree.remove_child(parent, child);
        }
    }
    tree.children(parent)
        .iter()
        .enumerate()
        .all(|(index, &child)| tree.sibling_index(child) == index)
}
