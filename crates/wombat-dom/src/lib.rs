//! DOM tree implementation for the Wombat parser.
//!
//! This crate provides an arena-based DOM tree structure following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/).
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues. Each node
//! caches its position among its parent's children (`sibling_index`); every
//! structural mutation keeps that cache consistent.

pub mod attributes;
pub mod resolve;
pub mod serialize;
pub mod settings;
pub mod tag;
pub mod text;

pub use attributes::{Attribute, Attributes};
pub use settings::ParseSettings;
pub use tag::Tag;

/// A type-safe index into the DOM tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
/// "Each node has an associated node document..."
///
/// NodeId provides O(1) access to any node in the tree without borrowing issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
#[derive(Debug, Clone)]
pub struct Node {
    /// "Each node has an associated node type"
    pub node_type: NodeType,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    pub parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children"
    pub children: Vec<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-index)
    /// "The index of an object is its number of preceding siblings, or 0 if
    /// it has none."
    pub sibling_index: usize,
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Each node has an associated node type"
#[derive(Debug, Clone)]
pub enum NodeType {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document(DocumentData),
    /// [§ 4.6 Interface DocumentType](https://dom.spec.whatwg.org/#interface-documenttype)
    Doctype(DoctypeData),
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    /// "Element nodes are simply known as elements."
    Element(ElementData),
    /// [§ 4.10 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    /// "Text nodes are known as text."
    Text(String),
    /// Raw character data inside `<script>`, `<style>` and other raw text
    /// elements. Serialized without escaping.
    Data(String),
    /// [§ 4.7 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    /// "Comment nodes are known as comments."
    Comment(String),
    /// An XML declaration or processing instruction (`<?xml version="1.0"?>`).
    XmlDeclaration(XmlDeclarationData),
}

/// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
#[derive(Debug, Clone, Default)]
pub struct DocumentData {
    /// "Each document has an associated ... URL". Relative URLs resolve
    /// against it.
    pub base_uri: String,
    /// "Each document has an associated mode"
    pub quirks_mode: QuirksMode,
    /// Output syntax used by the serializer.
    pub syntax: Syntax,
}

/// [§ 4.5](https://dom.spec.whatwg.org/#concept-document-mode)
///
/// "Each document has an associated mode: "no-quirks", "quirks", or
/// "limited-quirks"."
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuirksMode {
    /// Standards mode.
    #[default]
    NoQuirks,
    /// Quirks mode, set by a DOCTYPE with the force-quirks flag.
    Quirks,
    /// Limited quirks mode.
    LimitedQuirks,
}

/// Serialization syntax.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Syntax {
    /// HTML: void elements as `<br>`, boolean attributes collapsed.
    #[default]
    Html,
    /// XML: void and empty elements as `<br />`, every attribute valued.
    Xml,
}

/// [§ 4.6 Interface DocumentType](https://dom.spec.whatwg.org/#interface-documenttype)
///
/// "Doctypes have an associated name, public ID, and system ID."
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctypeData {
    /// "name"
    pub name: String,
    /// "public ID"
    pub public_id: String,
    /// "system ID"
    pub system_id: String,
}

/// An XML declaration or processing instruction with its pseudo-attributes
/// in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDeclarationData {
    /// Target name, e.g. `xml`.
    pub name: String,
    /// Pseudo-attributes (`version`, `encoding`, `standalone`, ...).
    pub attrs: Attributes,
    /// Written as `<!...!>` rather than `<?...?>`.
    pub is_processing_instruction: bool,
}

/// Element-specific data.
///
/// Per [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element):
/// - "Elements have an associated namespace, namespace prefix, local name, ..."
/// - "When an element is created, its local name is always given."
///
/// NOTE: Namespaces are not modelled. Form elements additionally record
/// their associated controls, which can live outside the form's subtree
/// after table foster parenting.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// The element's tag.
    pub tag: Tag,
    /// "An element has an associated attribute list"
    pub attrs: Attributes,
    /// [§ 4.10.17.3 Association of controls and forms](https://html.spec.whatwg.org/multipage/form-control-infrastructure.html#association-of-controls-and-forms)
    ///
    /// Controls whose form owner is this element. Empty for non-forms.
    pub form_controls: Vec<NodeId>,
}

impl ElementData {
    /// Create element data with no form controls.
    #[must_use]
    pub const fn new(tag: Tag, attrs: Attributes) -> Self {
        Self {
            tag,
            attrs,
            form_controls: Vec::new(),
        }
    }

    /// The tag name as written (case depends on parse settings).
    #[must_use]
    pub fn tag_name(&self) -> &str {
        self.tag.name()
    }

    /// The lowercased tag name.
    #[must_use]
    pub fn normal_name(&self) -> &str {
        self.tag.normal_name()
    }

    /// The attribute value for `key`, or `""` when absent.
    #[must_use]
    pub fn attr(&self, key: &str) -> &str {
        self.attrs.get(key).unwrap_or("")
    }

    /// True if the attribute exists.
    #[must_use]
    pub fn has_attr(&self, key: &str) -> bool {
        self.attrs.has_key(key)
    }

    /// Returns the element's id attribute value if present.
    ///
    /// Per [§ 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes):
    /// "The id attribute specifies its element's unique identifier (ID)."
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attrs.get("id")
    }

    /// Returns the class names from the class attribute, in order.
    ///
    /// Per [§ 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes):
    /// "The class attribute, if specified, must have a value that is a set of
    /// space-separated tokens representing the various classes that the element belongs to."
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.attrs
            .get_ignore_case("class")
            .unwrap_or("")
            .split_ascii_whitespace()
    }

    /// Case-insensitive class membership test.
    #[must_use]
    pub fn has_class(&self, class_name: &str) -> bool {
        self.class_names()
            .any(|name| name.eq_ignore_ascii_case(class_name))
    }
}

/// Arena-based DOM tree with O(1) node access and traversal.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// "The DOM represents a document as a tree."
///
/// The Document node is always at [`NodeId::ROOT`]. Nodes are never freed;
/// a removed node stays in the arena, detached.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a new DOM tree with just the Document node.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_uri("")
    }

    /// Create a tree whose document resolves relative URLs against `base_uri`.
    #[must_use]
    pub fn with_base_uri(base_uri: &str) -> Self {
        let document = Node {
            node_type: NodeType::Document(DocumentData {
                base_uri: base_uri.to_string(),
                ..DocumentData::default()
            }),
            parent: None,
            children: Vec::new(),
            sibling_index: 0,
        };
        Self {
            nodes: vec![document],
        }
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Get the number of nodes in the arena (attached or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (should always have at least the Document).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type,
            parent: None,
            children: Vec::new(),
            sibling_index: 0,
        });
        id
    }

    /// Allocate a detached element.
    pub fn create_element(&mut self, tag: Tag, attrs: Attributes) -> NodeId {
        self.alloc(NodeType::Element(ElementData::new(tag, attrs)))
    }

    /// Allocate a detached element with the same tag and attributes as `id`.
    /// Returns `None` if `id` is not an element.
    pub fn shallow_clone_element(&mut self, id: NodeId) -> Option<NodeId> {
        let data = self.as_element(id)?;
        let (tag, attrs) = (data.tag.clone(), data.attrs.clone());
        Some(self.create_element(tag, attrs))
    }

    // ===== Mutation =====

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before null."
    ///
    /// Appends `child` as the last child of `parent`, first detaching it from
    /// any previous parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let index = self.nodes[parent.0].children.len();
        self.nodes[parent.0].children.push(child);
        let node = &mut self.nodes[child.0];
        node.parent = Some(parent);
        node.sibling_index = index;
    }

    /// [§ 4.2.3 Pre-insert](https://dom.spec.whatwg.org/#concept-node-pre-insert)
    ///
    /// Inserts `child` into `parent` immediately before `reference`. Falls
    /// back to appending when `reference` is not a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        self.detach(child);
        if self.parent(reference) == Some(parent) {
            let index = self.nodes[reference.0].sibling_index;
            self.insert_child_at(parent, index, child);
        } else {
            self.append_child(parent, child);
        }
    }

    /// Inserts `child` at position `index` among `parent`'s children
    /// (clamped to the end).
    pub fn insert_child_at(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        let index = index.min(self.nodes[parent.0].children.len());
        self.nodes[parent.0].children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
        self.reindex_children(parent, index);
    }

    /// [§ 4.2.3 Remove](https://dom.spec.whatwg.org/#concept-node-remove)
    ///
    /// Removes `child` from `parent`. Does nothing if `child` is not a child
    /// of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if self.nodes[child.0].parent != Some(parent) {
            return;
        }
        let index = self.nodes[child.0].sibling_index;
        let _ = self.nodes[parent.0].children.remove(index);
        let node = &mut self.nodes[child.0];
        node.parent = None;
        node.sibling_index = 0;
        self.reindex_children(parent, index);
    }

    /// Removes `child` from whatever parent it has.
    pub fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.nodes[child.0].parent {
            self.remove_child(parent, child);
        }
    }

    /// Moves all children of `from` to the end of `to`'s children, in order.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        let moved = std::mem::take(&mut self.nodes[from.0].children);
        let base = self.nodes[to.0].children.len();
        for (offset, &child) in moved.iter().enumerate() {
            let node = &mut self.nodes[child.0];
            node.parent = Some(to);
            node.sibling_index = base + offset;
        }
        self.nodes[to.0].children.extend(moved);
    }

    fn reindex_children(&mut self, parent: NodeId, from: usize) {
        let count = self.nodes[parent.0].children.len();
        for index in from..count {
            let child = self.nodes[parent.0].children[index];
            self.nodes[child.0].sibling_index = index;
        }
    }

    /// Deep-copies the subtree rooted at `id` in `other` into this tree and
    /// returns the detached copy. Form control associations are not copied.
    pub fn import_subtree(&mut self, other: &Self, id: NodeId) -> NodeId {
        let copy_root = self.alloc(other.copy_node_type(id));
        let mut pending: Vec<(NodeId, NodeId)> = vec![(id, copy_root)];
        while let Some((source, target)) = pending.pop() {
            for &child in other.children(source) {
                let copy = self.alloc(other.copy_node_type(child));
                self.append_child(target, copy);
                pending.push((child, copy));
            }
        }
        copy_root
    }

    fn copy_node_type(&self, id: NodeId) -> NodeType {
        match &self.nodes[id.0].node_type {
            NodeType::Element(data) => {
                NodeType::Element(ElementData::new(data.tag.clone(), data.attrs.clone()))
            }
            other => other.clone(),
        }
    }

    /// Record `control` as associated with the form element `form`.
    pub fn add_form_control(&mut self, form: NodeId, control: NodeId) {
        if let Some(NodeType::Element(data)) = self.get_mut(form).map(|n| &mut n.node_type) {
            data.form_controls.push(control);
        }
    }

    /// Controls associated with `form`, in insertion order.
    #[must_use]
    pub fn form_controls(&self, form: NodeId) -> &[NodeId] {
        self.as_element(form)
            .map_or(&[], |data| data.form_controls.as_slice())
    }

    // ===== Navigation =====

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// Position of a node among its parent's children.
    #[must_use]
    pub fn sibling_index(&self, id: NodeId) -> usize {
        self.get(id).map_or(0, |n| n.sibling_index)
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        self.children(parent)
            .get(self.sibling_index(id) + 1)
            .copied()
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.sibling_index(id).checked_sub(1)?;
        self.children(parent).get(index).copied()
    }

    /// [§ 4.2.6 Descendant](https://dom.spec.whatwg.org/#concept-tree-descendant)
    ///
    /// "An object A is called a descendant of an object B, if either A is a
    /// child of B or A is a child of an object C that is a descendant of B."
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over preceding siblings (from immediately before to first child).
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> PrecedingSiblingIterator<'_> {
        PrecedingSiblingIterator {
            tree: self,
            current: self.prev_sibling(id),
        }
    }

    /// Pre-order traversal of the subtree rooted at `id`, starting with `id`.
    ///
    /// Iterative, so arbitrarily deep trees are safe to walk.
    #[must_use]
    pub fn traverse(&self, id: NodeId) -> Traverse<'_> {
        Traverse {
            tree: self,
            stack: vec![id],
        }
    }

    /// Pre-order traversal of the descendants of `id` (excluding `id`).
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.traverse(id).skip(1)
    }

    // ===== Node data =====

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get mutable element data if this node is an element.
    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(|n| match &mut n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// True if the node is an element.
    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.as_element(id).is_some()
    }

    /// The element's tag name, or `None` for other nodes.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.as_element(id).map(ElementData::tag_name)
    }

    /// The element's attribute value, or `None`.
    #[must_use]
    pub fn attr(&self, id: NodeId, key: &str) -> Option<&str> {
        self.as_element(id).and_then(|e| e.attrs.get(key))
    }

    // ===== Element navigation =====

    /// Element children of `id`, in order.
    #[must_use]
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.is_element(child))
            .collect()
    }

    /// Position of the element among its parent's element children.
    #[must_use]
    pub fn element_sibling_index(&self, id: NodeId) -> usize {
        self.parent(id).map_or(0, |parent| {
            self.children(parent)[..self.sibling_index(id)]
                .iter()
                .filter(|&&sibling| self.is_element(sibling))
                .count()
        })
    }

    /// The nearest preceding sibling that is an element.
    #[must_use]
    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.preceding_siblings(id).find(|&s| self.is_element(s))
    }

    /// The nearest following sibling that is an element.
    #[must_use]
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        self.children(parent)[self.sibling_index(id) + 1..]
            .iter()
            .copied()
            .find(|&s| self.is_element(s))
    }

    /// Element siblings of `id`, excluding `id` itself.
    #[must_use]
    pub fn sibling_elements(&self, id: NodeId) -> Vec<NodeId> {
        self.parent(id).map_or_else(Vec::new, |parent| {
            self.children(parent)
                .iter()
                .copied()
                .filter(|&s| s != id && self.is_element(s))
                .collect()
        })
    }

    // ===== Document =====

    /// The document data stored on the root node.
    ///
    /// # Panics
    /// Panics if the root node is not a document, which the constructors
    /// never allow.
    #[must_use]
    pub fn document(&self) -> &DocumentData {
        match &self.nodes[NodeId::ROOT.0].node_type {
            NodeType::Document(data) => data,
            _ => unreachable!("root node is always a document"),
        }
    }

    /// Mutable document data.
    ///
    /// # Panics
    /// Panics if the root node is not a document, which the constructors
    /// never allow.
    pub fn document_mut(&mut self) -> &mut DocumentData {
        match &mut self.nodes[NodeId::ROOT.0].node_type {
            NodeType::Document(data) => data,
            _ => unreachable!("root node is always a document"),
        }
    }

    /// The document base URI.
    #[must_use]
    pub fn base_uri(&self) -> &str {
        &self.document().base_uri
    }

    /// Replace the document base URI.
    pub fn set_base_uri(&mut self, base_uri: &str) {
        base_uri.clone_into(&mut self.document_mut().base_uri);
    }

    /// The document mode.
    #[must_use]
    pub fn quirks_mode(&self) -> QuirksMode {
        self.document().quirks_mode
    }

    /// [§ 3.1.1 The document element](https://html.spec.whatwg.org/multipage/dom.html#the-html-element-2)
    ///
    /// "The document element of a document is the element whose parent is that
    /// document, if it exists; otherwise null."
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .copied()
            .find(|&id| self.is_element(id))
    }

    /// [§ 3.1.4 The head element](https://html.spec.whatwg.org/multipage/dom.html#the-head-element-2)
    ///
    /// "The head element of a document is the first head element that is a
    /// child of the html element, if there is one, or null otherwise."
    #[must_use]
    pub fn head(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .iter()
            .copied()
            .find(|&id| self.as_element(id).is_some_and(|e| e.normal_name() == "head"))
    }

    /// [§ 3.1.3 The body element](https://html.spec.whatwg.org/multipage/dom.html#the-body-element-2)
    ///
    /// "The body element of a document is the first of the html element's children
    /// that is either a body element or a frameset element, or null if there is
    /// no such element."
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .iter()
            .copied()
            .find(|&id| {
                self.as_element(id)
                    .is_some_and(|e| matches!(e.normal_name(), "body" | "frameset"))
            })
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Iterator over preceding siblings of a node.
pub struct PrecedingSiblingIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for PrecedingSiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.prev_sibling(id);
        Some(id)
    }
}

/// Pre-order subtree iterator backed by an explicit stack.
pub struct Traverse<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for Traverse<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
