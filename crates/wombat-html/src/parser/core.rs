//! HTML tree construction: the tree builder's state and the algorithms that
//! its insertion modes share.
//!
//! [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
//!
//! The per-mode token handlers live in `modes.rs`; this module holds the
//! stack of open elements, the list of active formatting elements, node
//! insertion (including foster parenting), scope checks, and the adoption
//! agency algorithm.

use log::{debug, trace};
use strum_macros::Display;
use wombat_dom::{Attributes, DomTree, NodeId, NodeType, ParseSettings, Tag};

use crate::errors::ParseErrorList;
use crate::tokenizer::{TagToken, Token, Tokeniser, TokeniserState};

/// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
///
/// "The insertion mode is a state variable that controls the primary operation
/// of the tree construction stage."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum InsertionMode {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    Initial,
    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    BeforeHtml,
    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    BeforeHead,
    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    InHead,
    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    InHeadNoscript,
    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    AfterHead,
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    InBody,
    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    Text,
    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    InTable,
    /// [§ 13.2.6.4.10 The "in table text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intabletext)
    InTableText,
    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    InCaption,
    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolumngroup)
    InColumnGroup,
    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intablebody)
    InTableBody,
    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inrow)
    InRow,
    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incell)
    InCell,
    /// [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    InSelect,
    /// [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    InSelectInTable,
    /// [§ 13.2.6.4.18 The "in template" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intemplate)
    InTemplate,
    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    AfterBody,
    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    InFrameset,
    /// [§ 13.2.6.4.21 The "after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    AfterFrameset,
    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    AfterAfterBody,
    /// [§ 13.2.6.4.23 The "after after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    AfterAfterFrameset,
}

// =============================================================================
// Limits and tag categories
// =============================================================================

/// Scope checks look at no more than this many entries from the top of the
/// stack of open elements.
const MAX_SCOPE_SEARCH_DEPTH: usize = 100;

/// Walks over the stack and the list of active formatting elements look at
/// no more than this many entries from the end.
const MAX_QUEUE_DEPTH: usize = 256;

/// The adoption agency looks for a furthest block among this many entries.
const MAX_FURTHEST_BLOCK_SEARCH: usize = 64;

/// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#push-onto-the-list-of-active-formatting-elements)
///
/// "If there are already three elements in the list of active formatting
/// elements after the last marker, if any, ... that have the same tag name,
/// namespace, and attributes ... then remove the earliest such element"
const NOAHS_ARK_LIMIT: usize = 3;

/// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-scope)
///
/// "The stack of open elements is said to have a particular element in scope
/// when it has that element in the specific scope consisting of the following
/// element types"
const DEFAULT_SCOPE: &[&str] = &[
    "applet", "caption", "html", "marquee", "object", "table", "td", "template", "th",
];

/// "in list item scope": the default scope plus `ol` and `ul`.
const LIST_ITEM_SCOPE_EXTRA: &[&str] = &["ol", "ul"];

/// "in button scope": the default scope plus `button`.
const BUTTON_SCOPE_EXTRA: &[&str] = &["button"];

/// "in table scope": html, table, template.
const TABLE_SCOPE: &[&str] = &["html", "table", "template"];

/// "in select scope" consists of all element types except `optgroup` and
/// `option`.
const SELECT_SCOPE_TRANSPARENT: &[&str] = &["optgroup", "option"];

/// [§ 13.2.6.3 Closing elements that have implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
const IMPLIED_END_TAGS: &[&str] = &[
    "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc",
];

/// [§ 13.2.6.3](https://html.spec.whatwg.org/multipage/parsing.html#generate-all-implied-end-tags-thoroughly)
const THOROUGH_IMPLIED_END_TAGS: &[&str] = &[
    "caption", "colgroup", "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc",
    "tbody", "td", "tfoot", "th", "thead", "tr",
];

/// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#special)
///
/// "The following elements have varying levels of special parsing rules"
const SPECIAL_TAGS: &[&str] = &[
    "address", "applet", "area", "article", "aside", "base", "basefont", "bgsound",
    "blockquote", "body", "br", "button", "caption", "center", "col", "colgroup", "dd",
    "details", "dir", "div", "dl", "dt", "embed", "fieldset", "figcaption", "figure", "footer",
    "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header", "hgroup",
    "hr", "html", "iframe", "img", "input", "keygen", "li", "link", "listing", "main",
    "marquee", "menu", "meta", "nav", "noembed", "noframes", "noscript", "object", "ol", "p",
    "param", "plaintext", "pre", "script", "search", "section", "select", "source", "style",
    "summary", "table", "tbody", "td", "template", "textarea", "tfoot", "th", "thead", "title",
    "tr", "track", "ul", "wbr", "xmp",
];

/// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#appropriate-place-for-inserting-a-node)
///
/// "If foster parenting is enabled and target is a table, tbody, tfoot,
/// thead, or tr element"
pub(super) const FOSTER_PARENT_TARGETS: &[&str] = &["table", "tbody", "tfoot", "thead", "tr"];

/// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
///
/// An entry in the list of active formatting elements.
///
/// Elements are recreated from the node itself (tag and attributes) when
/// they have to be reconstructed, so no token is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ActiveFormattingElement {
    /// A formatting element entry.
    Element(NodeId),
    /// "A marker is an entry in the list of active formatting elements that
    /// is distinct from any element." Pushed when entering applet, object,
    /// marquee, template, td, th and caption.
    Marker,
}

/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
///
/// Builds a document tree from the tokens of one [`Tokeniser`]. A builder
/// parses exactly one input; use [`HtmlTreeBuilder::build`] for documents
/// and [`HtmlTreeBuilder::build_fragment`] for fragments.
pub struct HtmlTreeBuilder {
    pub(super) tokeniser: Tokeniser,

    /// `NodeId::ROOT` is the Document node.
    pub(super) tree: DomTree,

    pub(super) settings: ParseSettings,

    /// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
    pub(super) state: InsertionMode,

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#original-insertion-mode)
    /// "the original insertion mode", saved on entering the text and in
    /// table text modes.
    pub(super) original_state: Option<InsertionMode>,

    /// [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    pub(super) stack: Vec<NodeId>,

    /// [§ 13.2.4.3 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
    pub(super) formatting_elements: Vec<ActiveFormattingElement>,

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#stack-of-template-insertion-modes)
    pub(super) template_modes: Vec<InsertionMode>,

    /// [§ 13.2.4.4 The element pointers](https://html.spec.whatwg.org/multipage/parsing.html#the-element-pointers)
    pub(super) head_element: Option<NodeId>,
    pub(super) form_element: Option<NodeId>,

    /// [§ 13.2.4.5](https://html.spec.whatwg.org/multipage/parsing.html#concept-frag-parse-context)
    /// A detached copy of the fragment's context element.
    pub(super) context_element: Option<NodeId>,
    pub(super) fragment_parsing: bool,

    /// "pending table character tokens"
    pub(super) pending_table_characters: Vec<String>,

    /// The end tag that closes a non-void element written self-closing.
    /// Processed before the next token is read.
    pub(super) pending_end_tag: Option<Token>,

    /// [§ 13.2.4.5 Other parsing state flags](https://html.spec.whatwg.org/multipage/parsing.html#frameset-ok-flag)
    pub(super) frameset_ok: bool,

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
    pub(super) foster_inserts: bool,

    base_uri_set_from_document: bool,
}

impl HtmlTreeBuilder {
    /// Prepare to parse `input`, resolving URLs against `base_uri` and
    /// recording problems into `errors`.
    #[must_use]
    pub fn new(
        input: &str,
        base_uri: &str,
        errors: ParseErrorList,
        settings: ParseSettings,
    ) -> Self {
        Self {
            tokeniser: Tokeniser::new(input, errors),
            tree: DomTree::with_base_uri(base_uri),
            settings,
            state: InsertionMode::Initial,
            original_state: None,
            stack: Vec::new(),
            formatting_elements: Vec::new(),
            template_modes: Vec::new(),
            head_element: None,
            form_element: None,
            context_element: None,
            fragment_parsing: false,
            pending_table_characters: Vec::new(),
            pending_end_tag: None,
            frameset_ok: true,
            foster_inserts: false,
            base_uri_set_from_document: false,
        }
    }

    /// Parse the whole input as a document.
    #[must_use]
    pub fn build(mut self) -> (DomTree, ParseErrorList) {
        self.run();
        self.finish()
    }

    /// [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
    ///
    /// Parse the input as the contents of `context` (an element in another
    /// tree). Returns the tree the nodes were built in and the top-level
    /// fragment nodes, in order. Without a context the input is parsed as a
    /// document and its top-level nodes are returned.
    #[must_use]
    pub fn build_fragment(
        mut self,
        context: Option<(&DomTree, NodeId)>,
    ) -> (DomTree, Vec<NodeId>, ParseErrorList) {
        let root = context.and_then(|(source, element)| self.init_fragment(source, element));
        self.run();
        let nodes = self.tree.children(root.unwrap_or(NodeId::ROOT)).to_vec();
        let (tree, errors) = self.finish();
        (tree, nodes, errors)
    }

    /// [§ 13.4](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
    /// STEP 4 through STEP 11: set up the tokeniser state, the root `html`
    /// element, the insertion mode and the form element pointer from the
    /// context element.
    fn init_fragment(&mut self, source: &DomTree, context: NodeId) -> Option<NodeId> {
        let data = source.as_element(context)?;
        self.fragment_parsing = true;
        self.tree.document_mut().quirks_mode = source.quirks_mode();

        // STEP 4: "Set the state of the HTML parser's tokenization stage as
        // follows, switching on the context element"
        let state = match data.normal_name() {
            "title" | "textarea" => TokeniserState::Rcdata,
            "iframe" | "noembed" | "noframes" | "style" | "xmp" => TokeniserState::Rawtext,
            "script" => TokeniserState::ScriptData,
            "plaintext" => TokeniserState::Plaintext,
            _ => TokeniserState::Data,
        };
        self.tokeniser.transition(state);

        // STEP 9: "If the context element is a template element, then push
        // "in template" onto the stack of template insertion modes"
        if data.normal_name() == "template" {
            self.template_modes.push(InsertionMode::InTemplate);
        }
        self.context_element = Some(self.tree.create_element(data.tag.clone(), data.attrs.clone()));

        // STEP 5-7: "Let root be a new html element with no attributes ...
        // Push root onto the stack of open elements"
        let root = self
            .tree
            .create_element(Tag::value_of("html", self.settings), Attributes::new());
        self.tree.append_child(NodeId::ROOT, root);
        self.stack.push(root);

        // STEP 10: "Reset the parser's insertion mode appropriately."
        self.reset_insertion_mode();

        // STEP 11: "Set the parser's form element pointer to the nearest node
        // to the context element that is a form element"
        let form = std::iter::once(context)
            .chain(source.ancestors(context))
            .filter_map(|id| source.as_element(id))
            .find(|element| element.normal_name() == "form");
        if let Some(form) = form {
            self.form_element = Some(self.tree.create_element(form.tag.clone(), form.attrs.clone()));
        }
        Some(root)
    }

    /// Feed tokens to the current insertion mode until end of file.
    fn run(&mut self) {
        loop {
            let token = match self.pending_end_tag.take() {
                Some(token) => token,
                None => self.tokeniser.read(),
            };
            let _ = self.process(&token);
            if matches!(token, Token::EndOfFile) {
                break;
            }
        }
    }

    fn finish(self) -> (DomTree, ParseErrorList) {
        let errors = self.tokeniser.into_errors();
        debug!(
            target: "wombat::parser",
            "built tree of {} nodes, {} errors recorded",
            self.tree.len(),
            errors.len()
        );
        (self.tree, errors)
    }

    // =========================================================================
    // Insertion mode bookkeeping
    // =========================================================================

    /// Switch the insertion mode.
    pub(super) fn transition(&mut self, mode: InsertionMode) {
        trace!(target: "wombat::tree_builder", "{} -> {mode}", self.state);
        self.state = mode;
    }

    /// "Let the original insertion mode be the current insertion mode."
    pub(super) fn mark_insertion_mode(&mut self) {
        self.original_state = Some(self.state);
    }

    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    ///
    /// Record that `token` was not expected in `mode`.
    pub(super) fn error(&mut self, mode: InsertionMode, token: &Token) {
        if self.tokeniser.errors().can_add_error() {
            self.tokeniser.error_message(&format!(
                "Unexpected token [{}] when in state [{mode}]",
                token.kind()
            ));
        }
    }

    /// Process a synthetic start tag named `name` in the current mode.
    pub(super) fn process_start_tag(&mut self, name: &str) -> bool {
        self.process(&Token::start_tag(name))
    }

    /// Process a synthetic end tag named `name` in the current mode.
    pub(super) fn process_end_tag(&mut self, name: &str) -> bool {
        self.process(&Token::end_tag(name))
    }

    pub(super) fn push_template_mode(&mut self, mode: InsertionMode) {
        self.template_modes.push(mode);
    }

    pub(super) fn pop_template_mode(&mut self) {
        let _ = self.template_modes.pop();
    }

    pub(super) fn current_template_mode(&self) -> Option<InsertionMode> {
        self.template_modes.last().copied()
    }

    /// [§ 13.2.4.1 Reset the insertion mode appropriately](https://html.spec.whatwg.org/multipage/parsing.html#reset-the-insertion-mode-appropriately)
    pub(super) fn reset_insertion_mode(&mut self) {
        let mode = self.appropriate_insertion_mode();
        self.transition(mode);
    }

    fn appropriate_insertion_mode(&self) -> InsertionMode {
        let upper = self.stack.len().saturating_sub(MAX_QUEUE_DEPTH + 1);

        // STEP 1-2: "Let last be false. Let node be the last node in the
        // stack of open elements."
        for (position, &open) in self.stack.iter().enumerate().rev() {
            // STEP 3: "If node is the first node in the stack of open
            // elements, then set last to true, and, if the parser was created
            // as part of the HTML fragment parsing algorithm, set node to the
            // context element"
            let last = position <= upper;
            let node = if last && self.fragment_parsing {
                self.context_element.unwrap_or(open)
            } else {
                open
            };

            let mode = match self.name_of(node) {
                // STEP 4: "If node is a select element, run these substeps"
                "select" => Some(self.select_mode(position)),
                // STEP 5: "If node is a td or th element and last is false"
                "td" | "th" if !last => Some(InsertionMode::InCell),
                "tr" => Some(InsertionMode::InRow),
                "tbody" | "thead" | "tfoot" => Some(InsertionMode::InTableBody),
                "caption" => Some(InsertionMode::InCaption),
                "colgroup" => Some(InsertionMode::InColumnGroup),
                "table" => Some(InsertionMode::InTable),
                // STEP 11: "If node is a template element, then switch the
                // insertion mode to the current template insertion mode"
                "template" => Some(
                    self.current_template_mode()
                        .unwrap_or(InsertionMode::InTemplate),
                ),
                "head" if !last => Some(InsertionMode::InHead),
                "body" => Some(InsertionMode::InBody),
                "frameset" => Some(InsertionMode::InFrameset),
                // STEP 15: "If node is an html element ... If the head
                // element pointer is null, switch the insertion mode to
                // "before head"."
                "html" => Some(if self.head_element.is_none() {
                    InsertionMode::BeforeHead
                } else {
                    InsertionMode::AfterHead
                }),
                _ => None,
            };
            if let Some(mode) = mode {
                return mode;
            }
            // STEP 16: "If last is true, then switch the insertion mode to
            // "in body" and return."
            if last {
                break;
            }
        }
        InsertionMode::InBody
    }

    /// STEP 4 of resetting the insertion mode: a `select` inside a table
    /// (with no template in between) is "in select in table".
    fn select_mode(&self, position: usize) -> InsertionMode {
        for &ancestor in self.stack[..position].iter().rev() {
            match self.name_of(ancestor) {
                "template" => break,
                "table" => return InsertionMode::InSelectInTable,
                _ => {}
            }
        }
        InsertionMode::InSelect
    }

    // =========================================================================
    // Element names and categories
    // =========================================================================

    /// The lowercased tag name of `id`, or `""` for non-elements.
    pub(super) fn name_of(&self, id: NodeId) -> &str {
        self.tree.as_element(id).map_or("", |element| element.normal_name())
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#current-node)
    ///
    /// "The current node is the bottommost node in this stack of open
    /// elements."
    pub(super) fn current_element(&self) -> Option<NodeId> {
        self.stack.last().copied()
    }

    pub(super) fn current_is(&self, name: &str) -> bool {
        self.current_element()
            .is_some_and(|id| self.name_of(id) == name)
    }

    pub(super) fn current_is_one_of(&self, names: &[&str]) -> bool {
        self.current_element()
            .is_some_and(|id| names.contains(&self.name_of(id)))
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#special)
    pub(super) fn is_special(&self, id: NodeId) -> bool {
        SPECIAL_TAGS.contains(&self.name_of(id))
    }

    // =========================================================================
    // Stack of open elements
    // =========================================================================

    pub(super) fn push(&mut self, id: NodeId) {
        self.stack.push(id);
    }

    pub(super) fn pop(&mut self) -> Option<NodeId> {
        self.stack.pop()
    }

    /// True if `id` is one of the top entries of the stack.
    pub(super) fn on_stack(&self, id: NodeId) -> bool {
        self.stack.iter().rev().take(MAX_QUEUE_DEPTH).any(|&open| open == id)
    }

    /// True if an element named `name` is open.
    pub(super) fn on_stack_named(&self, name: &str) -> bool {
        self.get_from_stack(name).is_some()
    }

    /// The bottommost open element named `name`.
    pub(super) fn get_from_stack(&self, name: &str) -> Option<NodeId> {
        self.stack
            .iter()
            .rev()
            .take(MAX_QUEUE_DEPTH)
            .copied()
            .find(|&id| self.name_of(id) == name)
    }

    pub(super) fn remove_from_stack(&mut self, id: NodeId) {
        if let Some(position) = self.stack.iter().rposition(|&open| open == id) {
            let _ = self.stack.remove(position);
        }
    }

    /// The entry immediately above `id` in the stack.
    pub(super) fn above_on_stack(&self, id: NodeId) -> Option<NodeId> {
        let position = self.stack.iter().rposition(|&open| open == id)?;
        position.checked_sub(1).map(|above| self.stack[above])
    }

    fn insert_on_stack_after(&mut self, after: NodeId, id: NodeId) {
        match self.stack.iter().rposition(|&open| open == after) {
            Some(position) => self.stack.insert(position + 1, id),
            None => self.stack.push(id),
        }
    }

    /// Pop elements until one named `name` has been popped.
    pub(super) fn pop_stack_to_close(&mut self, name: &str) {
        while let Some(id) = self.stack.pop() {
            if self.name_of(id) == name {
                break;
            }
        }
    }

    /// Pop elements until one whose name is in `names` has been popped.
    pub(super) fn pop_stack_to_close_any(&mut self, names: &[&str]) {
        while let Some(id) = self.stack.pop() {
            if names.contains(&self.name_of(id)) {
                break;
            }
        }
    }

    /// [§ 13.2.6.4.9](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-stack-back-to-a-table-context)
    ///
    /// "pop elements from the stack of open elements until the current node
    /// is a table, template, or html element."
    pub(super) fn clear_stack_to_table_context(&mut self) {
        self.clear_stack_to_context(&["table", "template"]);
    }

    /// [§ 13.2.6.4.13](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-stack-back-to-a-table-body-context)
    pub(super) fn clear_stack_to_table_body_context(&mut self) {
        self.clear_stack_to_context(&["tbody", "tfoot", "thead", "template"]);
    }

    /// [§ 13.2.6.4.14](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-stack-back-to-a-table-row-context)
    pub(super) fn clear_stack_to_table_row_context(&mut self) {
        self.clear_stack_to_context(&["tr", "template"]);
    }

    fn clear_stack_to_context(&mut self, names: &[&str]) {
        while let Some(&id) = self.stack.last() {
            let name = self.name_of(id);
            if name == "html" || names.contains(&name) {
                break;
            }
            let _ = self.stack.pop();
        }
    }

    // =========================================================================
    // Scope
    // =========================================================================

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
    ///
    /// STEP 1: "Initialize node to be the current node"
    /// STEP 2: "If node is the target node, terminate in a match state."
    /// STEP 3: "Otherwise, if node is one of the element types in list,
    ///          terminate in a failure state."
    /// STEP 4: "Otherwise, set node to the previous entry in the stack of
    ///          open elements and return to step 2."
    fn in_specific_scope(&self, targets: &[&str], base: &[&str], extra: &[&str]) -> bool {
        for &id in self.stack.iter().rev().take(MAX_SCOPE_SEARCH_DEPTH) {
            let name = self.name_of(id);
            // STEP 2: If node is the target, match.
            if targets.contains(&name) {
                return true;
            }
            // STEP 3: If node is a scope marker, failure.
            if base.contains(&name) || extra.contains(&name) {
                return false;
            }
        }
        false
    }

    /// "has an element in scope"
    pub(super) fn in_scope(&self, name: &str) -> bool {
        self.in_specific_scope(&[name], DEFAULT_SCOPE, &[])
    }

    /// "has an element in scope" for any of `names`.
    pub(super) fn in_scope_any(&self, names: &[&str]) -> bool {
        self.in_specific_scope(names, DEFAULT_SCOPE, &[])
    }

    /// "has an element in list item scope"
    pub(super) fn in_list_item_scope(&self, name: &str) -> bool {
        self.in_specific_scope(&[name], DEFAULT_SCOPE, LIST_ITEM_SCOPE_EXTRA)
    }

    /// "has an element in button scope"
    pub(super) fn in_button_scope(&self, name: &str) -> bool {
        self.in_specific_scope(&[name], DEFAULT_SCOPE, BUTTON_SCOPE_EXTRA)
    }

    /// "has an element in table scope"
    pub(super) fn in_table_scope(&self, name: &str) -> bool {
        self.in_specific_scope(&[name], TABLE_SCOPE, &[])
    }

    /// "has an element in select scope"
    pub(super) fn in_select_scope(&self, name: &str) -> bool {
        for &id in self.stack.iter().rev().take(MAX_SCOPE_SEARCH_DEPTH) {
            let current = self.name_of(id);
            if current == name {
                return true;
            }
            if !SELECT_SCOPE_TRANSPARENT.contains(&current) {
                return false;
            }
        }
        false
    }

    /// "has an element in scope", for a particular element rather than a
    /// tag name.
    fn element_in_scope(&self, target: NodeId) -> bool {
        for &id in self.stack.iter().rev().take(MAX_SCOPE_SEARCH_DEPTH) {
            if id == target {
                return true;
            }
            if DEFAULT_SCOPE.contains(&self.name_of(id)) {
                return false;
            }
        }
        false
    }

    /// [§ 13.2.6.3 Generate implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
    ///
    /// "while the current node is a dd element, a dt element, an li element,
    /// an optgroup element, an option element, a p element, an rb element,
    /// an rp element, an rt element, or an rtc element, the UA must pop the
    /// current node off the stack of open elements."
    pub(super) fn generate_implied_end_tags(&mut self, exclude: Option<&str>) {
        while let Some(id) = self.current_element() {
            let name = self.name_of(id);
            if exclude == Some(name) || !IMPLIED_END_TAGS.contains(&name) {
                break;
            }
            let _ = self.stack.pop();
        }
    }

    /// [§ 13.2.6.3](https://html.spec.whatwg.org/multipage/parsing.html#generate-all-implied-end-tags-thoroughly)
    pub(super) fn generate_implied_end_tags_thoroughly(&mut self) {
        while self.current_is_one_of(THOROUGH_IMPLIED_END_TAGS) {
            let _ = self.stack.pop();
        }
    }

    // =========================================================================
    // Node insertion
    // =========================================================================

    /// [§ 13.2.6.1 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#appropriate-place-for-inserting-a-node)
    ///
    /// The appropriate place for inserting a node: a parent, and the child
    /// to insert before (`None` to append).
    pub(super) fn insertion_location(&self) -> (NodeId, Option<NodeId>) {
        // STEP 1: "If there was an override target specified, then let target
        // be the override target. Otherwise, let target be the current node."
        let target = self.current_element().unwrap_or(NodeId::ROOT);

        // STEP 2: "If foster parenting is enabled and target is a table,
        // tbody, tfoot, thead, or tr element"
        if self.foster_inserts && FOSTER_PARENT_TARGETS.contains(&self.name_of(target)) {
            return self.foster_parent_location();
        }

        // "Otherwise: Let adjusted insertion location be inside target,
        // after its last child (if any)."
        (target, None)
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
    fn foster_parent_location(&self) -> (NodeId, Option<NodeId>) {
        // STEP 1: "Let last table be the last table element in the stack of
        // open elements, if any."
        let Some(last_table) = self.get_from_stack("table") else {
            // STEP 3: "If there is no last table, then let adjusted insertion
            // location be inside the first element in the stack of open
            // elements (the html element), after its last child (if any)"
            return (self.stack.first().copied().unwrap_or(NodeId::ROOT), None);
        };

        // STEP 2: "If last table has a parent node, then let adjusted
        // insertion location be inside last table's parent node, immediately
        // before last table"
        if let Some(parent) = self.tree.parent(last_table) {
            return (parent, Some(last_table));
        }

        // STEP 4: "Let previous element be the element immediately above
        // last table in the stack of open elements. Let adjusted insertion
        // location be inside previous element, after its last child"
        (
            self.above_on_stack(last_table).unwrap_or(NodeId::ROOT),
            None,
        )
    }

    fn attach(&mut self, parent: NodeId, before: Option<NodeId>, node: NodeId) {
        match before {
            Some(reference) => self.tree.insert_before(parent, node, reference),
            None => self.tree.append_child(parent, node),
        }
    }

    /// Insert `node` at the appropriate place, and associate listed form
    /// controls with the form element pointer.
    pub(super) fn insert_node(&mut self, node: NodeId) {
        let (parent, before) = self.insertion_location();
        self.attach(parent, before, node);

        // [§ 4.10.17.3](https://html.spec.whatwg.org/multipage/form-control-infrastructure.html#reset-the-form-owner)
        if let Some(form) = self.form_element
            && self
                .tree
                .as_element(node)
                .is_some_and(|element| element.tag.is_form_listed())
        {
            self.tree.add_form_control(form, node);
        }
    }

    /// Insert `node` and push it onto the stack of open elements.
    pub(super) fn insert_element(&mut self, node: NodeId) {
        self.insert_node(node);
        self.push(node);
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#create-an-element-for-the-token)
    ///
    /// "Create an element for the token". Names and attribute keys are
    /// normalized according to the parse settings.
    pub(super) fn create_element_for(&mut self, tag: &TagToken) -> NodeId {
        let name = self.settings.normalize_tag(&tag.name);
        let mut attributes = tag.attributes.clone();
        let count = attributes.len();
        self.settings.normalize_attributes(&mut attributes);
        if attributes.len() < count {
            self.tokeniser
                .error_message(&format!("Dropped duplicate attribute(s) in tag [{name}]"));
        }
        self.tree
            .create_element(Tag::value_of(&name, self.settings), attributes)
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
    ///
    /// "Insert an HTML element for the token."
    ///
    /// A non-void element written self-closing (`<div/>`) is inserted and
    /// then closed straight away by a synthetic end tag.
    pub(super) fn insert_start_tag(&mut self, tag: &TagToken) -> NodeId {
        if tag.self_closing {
            let element = self.insert_empty(tag);
            self.push(element);
            self.tokeniser.transition(TokeniserState::Data);
            self.pending_end_tag = Some(Token::end_tag(&tag.name));
            return element;
        }
        self.insert_open(tag)
    }

    /// Insert and push an element for `tag`, ignoring its self-closing flag.
    /// Used for elements whose content is read in a raw text state.
    pub(super) fn insert_open(&mut self, tag: &TagToken) -> NodeId {
        let element = self.create_element_for(tag);
        self.insert_element(element);
        element
    }

    /// Insert an element that is not pushed onto the stack (void elements,
    /// and self-closing elements that are closed immediately).
    ///
    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#acknowledge-self-closing-flag)
    /// "Acknowledge the token's self-closing flag, if it is set." That is
    /// done here for void elements and for unknown tags, which remember that
    /// they were written self-closing.
    pub(super) fn insert_empty(&mut self, tag: &TagToken) -> NodeId {
        let element = self.create_element_for(tag);
        self.insert_node(element);
        if tag.self_closing {
            let acknowledged = self.tree.as_element_mut(element).is_some_and(|data| {
                if data.tag.is_known() {
                    data.tag.is_empty()
                } else {
                    data.tag.set_self_closing();
                    true
                }
            });
            if acknowledged {
                self.tokeniser.acknowledge_self_closing_flag();
            }
        }
        element
    }

    /// [§ 4.10.3 The form element](https://html.spec.whatwg.org/multipage/forms.html#the-form-element)
    ///
    /// Insert a form and point the form element pointer at it. A form inside
    /// a table is not pushed.
    pub(super) fn insert_form(&mut self, tag: &TagToken, on_stack: bool) -> NodeId {
        let element = self.create_element_for(tag);
        self.form_element = Some(element);
        self.insert_node(element);
        if on_stack {
            self.push(element);
        }
        element
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-comment)
    ///
    /// "Insert a comment" at the appropriate place.
    pub(super) fn insert_comment(&mut self, data: &str) {
        let comment = self.tree.alloc(NodeType::Comment(data.to_string()));
        self.insert_node(comment);
    }

    /// Insert a comment as the last child of `parent`.
    pub(super) fn append_comment(&mut self, parent: NodeId, data: &str) {
        let comment = self.tree.alloc(NodeType::Comment(data.to_string()));
        self.tree.append_child(parent, comment);
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    ///
    /// "Insert a character". Inside script and style the characters become
    /// a data node.
    pub(super) fn insert_characters(&mut self, data: &str) {
        // STEP 1: "Let the adjusted insertion location be the appropriate place
        // for inserting a node."
        let (parent, before) = self.insertion_location();

        // STEP 2: "If the adjusted insertion location is in a Document node,
        // then return."
        if parent == NodeId::ROOT {
            return;
        }
        let as_data = self.is_data_parent(parent);

        // STEP 3: "If there is a Text node immediately before the adjusted
        // insertion location, then append data to that Text node's data."
        let previous = match before {
            Some(reference) => self.tree.prev_sibling(reference),
            None => self.tree.last_child(parent),
        };
        if let Some(node) = previous.and_then(|id| self.tree.get_mut(id)) {
            match &mut node.node_type {
                NodeType::Text(text) if !as_data => {
                    text.push_str(data);
                    return;
                }
                NodeType::Data(text) if as_data => {
                    text.push_str(data);
                    return;
                }
                _ => {}
            }
        }

        // STEP 4: "Otherwise, create a new Text node whose data is data ...
        // and insert the newly created node at the adjusted insertion
        // location."
        let node = self.tree.alloc(if as_data {
            NodeType::Data(data.to_string())
        } else {
            NodeType::Text(data.to_string())
        });
        self.attach(parent, before, node);
    }

    /// Whether text inserted into `parent` is raw data. The fragment root
    /// stands in for the context element.
    fn is_data_parent(&self, parent: NodeId) -> bool {
        let element = if self.fragment_parsing && self.stack.first() == Some(&parent) {
            self.context_element.unwrap_or(parent)
        } else {
            parent
        };
        self.tree
            .as_element(element)
            .is_some_and(|data| data.tag.is_data())
    }

    /// [§ 4.2.3 The base element](https://html.spec.whatwg.org/multipage/semantics.html#the-base-element)
    ///
    /// "The document base URL ... is the frozen base URL of the first base
    /// element in the Document that has an href attribute"
    pub(super) fn maybe_set_base_uri(&mut self, base: NodeId) {
        if self.base_uri_set_from_document {
            return;
        }
        if let Some(href) = self.tree.abs_url(base, "href")
            && !href.is_empty()
        {
            self.base_uri_set_from_document = true;
            self.tree.set_base_uri(&href);
        }
    }

    // =========================================================================
    // List of active formatting elements
    // =========================================================================

    /// The last element entry, ignoring markers.
    fn last_formatting_element(&self) -> Option<NodeId> {
        match self.formatting_elements.last() {
            Some(ActiveFormattingElement::Element(id)) => Some(*id),
            _ => None,
        }
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#push-onto-the-list-of-active-formatting-elements)
    ///
    /// "Push onto the list of active formatting elements", applying the
    /// Noah's Ark clause.
    pub(super) fn push_active_formatting_element(&mut self, element: NodeId) {
        let mut seen = 0;
        let mut earliest = None;
        for (position, &entry) in self
            .formatting_elements
            .iter()
            .enumerate()
            .rev()
            .take(MAX_QUEUE_DEPTH)
        {
            let ActiveFormattingElement::Element(existing) = entry else {
                break;
            };
            if self.is_same_formatting_element(existing, element) {
                seen += 1;
                earliest = Some(position);
            }
        }
        if seen >= NOAHS_ARK_LIMIT
            && let Some(position) = earliest
        {
            let _ = self.formatting_elements.remove(position);
        }
        self.formatting_elements
            .push(ActiveFormattingElement::Element(element));
    }

    /// "the same tag name, namespace, and attributes as element"
    fn is_same_formatting_element(&self, a: NodeId, b: NodeId) -> bool {
        match (self.tree.as_element(a), self.tree.as_element(b)) {
            (Some(a), Some(b)) => a.normal_name() == b.normal_name() && a.attrs == b.attrs,
            _ => false,
        }
    }

    /// "Insert a marker at the end of the list of active formatting elements."
    pub(super) fn insert_marker(&mut self) {
        self.formatting_elements.push(ActiveFormattingElement::Marker);
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-list-of-active-formatting-elements-up-to-the-last-marker)
    pub(super) fn clear_formatting_elements_to_last_marker(&mut self) {
        while let Some(entry) = self.formatting_elements.pop() {
            if entry == ActiveFormattingElement::Marker {
                break;
            }
        }
    }

    pub(super) fn remove_from_active_formatting_elements(&mut self, element: NodeId) {
        if let Some(position) = self
            .formatting_elements
            .iter()
            .rposition(|&entry| entry == ActiveFormattingElement::Element(element))
        {
            let _ = self.formatting_elements.remove(position);
        }
    }

    pub(super) fn is_in_active_formatting_elements(&self, element: NodeId) -> bool {
        self.formatting_elements
            .contains(&ActiveFormattingElement::Element(element))
    }

    /// The last element named `name` between the end of the list and the
    /// last marker.
    pub(super) fn active_formatting_element(&self, name: &str) -> Option<NodeId> {
        for &entry in self.formatting_elements.iter().rev().take(MAX_QUEUE_DEPTH) {
            match entry {
                ActiveFormattingElement::Marker => break,
                ActiveFormattingElement::Element(id) if self.name_of(id) == name => {
                    return Some(id);
                }
                ActiveFormattingElement::Element(_) => {}
            }
        }
        None
    }

    /// [§ 13.2.4.3 Reconstruct the active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#reconstruct-the-active-formatting-elements)
    pub(super) fn reconstruct_formatting_elements(&mut self) {
        // STEP 1: "If there are no entries in the list of active formatting
        // elements, then there is nothing to reconstruct; stop this algorithm."
        // STEP 2: "If the last (most recently added) entry in the list of
        // active formatting elements is a marker, or if it is an element that
        // is in the stack of open elements, then there is nothing to
        // reconstruct; stop this algorithm."
        let Some(last) = self.last_formatting_element() else {
            return;
        };
        if self.on_stack(last) {
            return;
        }

        // STEP 3-6: "Rewind: If there are no entries before entry in the
        // list of active formatting elements, then jump to the step labeled
        // create. Let entry be the entry one earlier than entry ... If entry
        // is neither a marker nor an element that is also in the stack of
        // open elements, go to the step labeled rewind."
        let len = self.formatting_elements.len();
        let floor = len.saturating_sub(MAX_QUEUE_DEPTH);
        let mut position = len - 1;
        while position > floor {
            match self.formatting_elements[position - 1] {
                ActiveFormattingElement::Marker => break,
                ActiveFormattingElement::Element(id) if self.on_stack(id) => break,
                ActiveFormattingElement::Element(_) => position -= 1,
            }
        }

        // STEP 7-10: "Advance ... Create: Insert an HTML element for the
        // token for which the element entry was created ... Replace the entry
        // for entry in the list with an entry for new element. If the entry
        // for new element in the list of active formatting elements is not
        // the last entry in the list, return to the step labeled advance."
        while position < len {
            if let ActiveFormattingElement::Element(entry) = self.formatting_elements[position]
                && let Some(element) = self.tree.shallow_clone_element(entry)
            {
                self.insert_element(element);
                self.formatting_elements[position] = ActiveFormattingElement::Element(element);
            }
            position += 1;
        }
    }

    // =========================================================================
    // End tag algorithms
    // =========================================================================

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    ///
    /// "Any other end tag"
    pub(super) fn any_other_end_tag(&mut self, token: &Token, name: &str) -> bool {
        // STEP 1: "Initialize node to be the current node (the bottommost
        // node of the stack)."
        // STEP 2: "Loop: If node is an HTML element with the same tag name as
        // the token" ...
        // STEP 3: "Otherwise, if node is in the special category, then this
        // is a parse error; ignore the token, and return."
        // STEP 4: "Set node to the previous entry in the stack of open
        // elements. Return to the step labeled loop."
        let found = self
            .stack
            .iter()
            .enumerate()
            .rev()
            .find(|&(_, &node)| self.name_of(node) == name || self.is_special(node))
            .map(|(position, &node)| (position, node));

        match found {
            Some((position, node)) if self.name_of(node) == name => {
                // STEP 2.1: "Generate implied end tags, except for HTML
                // elements with the same tag name as the token."
                self.generate_implied_end_tags(Some(name));
                // STEP 2.2: "If node is not the current node, then this is a
                // parse error."
                if !self.current_is(name) {
                    self.error(InsertionMode::InBody, token);
                }
                // STEP 2.3: "Pop all the nodes from the current node up to
                // node, including node, then stop these steps."
                self.stack.truncate(position);
                true
            }
            _ => {
                self.error(InsertionMode::InBody, token);
                false
            }
        }
    }

    /// [§ 13.2.6.4.7 Adoption agency algorithm](https://html.spec.whatwg.org/multipage/parsing.html#adoption-agency-algorithm)
    ///
    /// Repairs mis-nested formatting elements such as
    /// `<b>1<i>2</b>3</i>`.
    pub(super) fn run_adoption_agency(&mut self, token: &Token, subject: &str) -> bool {
        // STEP 2: "If the current node is an HTML element whose tag name is
        // subject, and the current node is not in the list of active
        // formatting elements, then pop the current node off the stack of
        // open elements and return."
        if let Some(current) = self.current_element()
            && self.name_of(current) == subject
            && !self.is_in_active_formatting_elements(current)
        {
            let _ = self.stack.pop();
            return true;
        }

        // STEP 3-6: "Let outer loop counter be 0 ... If outer loop counter is
        // greater than or equal to 8, then return."
        for _ in 0..8 {
            // STEP 7: "Let formatting element be the last element in the list
            // of active formatting elements that: is between the end of the
            // list and the last marker in the list, if any, ... and has the
            // tag name subject."
            // STEP 8: "If there is no such element, then return and instead
            // act as described in the "any other end tag" entry above."
            let Some(formatting_element) = self.active_formatting_element(subject) else {
                return self.any_other_end_tag(token, subject);
            };

            // STEP 9: "If formatting element is not in the stack of open
            // elements, then this is a parse error; remove the element from
            // the list, and return."
            let Some(formatting_index) = self
                .stack
                .iter()
                .rposition(|&open| open == formatting_element)
            else {
                self.error(InsertionMode::InBody, token);
                self.remove_from_active_formatting_elements(formatting_element);
                return true;
            };

            // STEP 10: "If formatting element is in the stack of open
            // elements, but the element is not in scope, then this is a parse
            // error; return."
            if !self.element_in_scope(formatting_element) {
                self.error(InsertionMode::InBody, token);
                return false;
            }

            // STEP 11: "If formatting element is not the current node, this
            // is a parse error."
            if self.current_element() != Some(formatting_element) {
                self.error(InsertionMode::InBody, token);
            }

            // STEP 12: "Let furthest block be the topmost node in the stack
            // of open elements that is lower in the stack than formatting
            // element, and is an element in the special category."
            let furthest_block = self
                .stack
                .iter()
                .enumerate()
                .skip(formatting_index + 1)
                .take(MAX_FURTHEST_BLOCK_SEARCH)
                .find(|&(_, &id)| self.is_special(id))
                .map(|(index, &id)| (index, id));

            // STEP 13: "If there is no furthest block, then the UA must first
            // pop all the nodes from the bottom of the stack of open elements,
            // from the current node up to and including formatting element,
            // then remove formatting element from the list of active
            // formatting elements, and finally return."
            let Some((furthest_index, furthest_block)) = furthest_block else {
                self.stack.truncate(formatting_index);
                self.remove_from_active_formatting_elements(formatting_element);
                return true;
            };

            // STEP 14: "Let common ancestor be the element immediately above
            // formatting element in the stack of open elements."
            let common_ancestor = formatting_index
                .checked_sub(1)
                .map(|above| self.stack[above]);

            // STEP 15: "Let a bookmark note the position of formatting
            // element in the list of active formatting elements relative to
            // the elements on either side of it in the list."
            let mut bookmark = self
                .formatting_elements
                .iter()
                .rposition(|&entry| entry == ActiveFormattingElement::Element(formatting_element))
                .unwrap_or(self.formatting_elements.len());

            // STEP 16: "Let node and last node be furthest block."
            let mut node_index = furthest_index;
            let mut last_node = furthest_block;

            // STEP 17-18: "Let inner loop counter be 0. Inner loop:"
            let mut inner_loop_counter = 0;
            loop {
                // STEP 18.1: "Increment inner loop counter by 1."
                inner_loop_counter += 1;

                // STEP 18.2: "Let node be the element immediately above node
                // in the stack of open elements, or if node is no longer in
                // the stack of open elements ..., the element that was
                // immediately above node in the stack of open elements before
                // node was removed."
                node_index -= 1;
                let node = self.stack[node_index];

                // STEP 18.3: "If node is formatting element, then break."
                if node == formatting_element {
                    break;
                }

                // STEP 18.4: "If inner loop counter is greater than 3 and node
                // is in the list of active formatting elements, then remove
                // node from the list of active formatting elements."
                let mut node_entry = self
                    .formatting_elements
                    .iter()
                    .position(|&entry| entry == ActiveFormattingElement::Element(node));
                if inner_loop_counter > 3
                    && let Some(entry) = node_entry.take()
                {
                    let _ = self.formatting_elements.remove(entry);
                    if bookmark > entry {
                        bookmark -= 1;
                    }
                }

                // STEP 18.5: "If node is not in the list of active formatting
                // elements, then remove node from the stack of open elements
                // and continue."
                let Some(node_entry) = node_entry else {
                    let _ = self.stack.remove(node_index);
                    continue;
                };

                // STEP 18.6: "Create an element for the token for which the
                // element node was created ... replace the entry for node in
                // the list of active formatting elements with an entry for
                // the new element, replace the entry for node in the stack of
                // open elements with an entry for the new element, and let
                // node be the new element."
                let Some(replacement) = self.tree.shallow_clone_element(node) else {
                    break;
                };
                self.formatting_elements[node_entry] = ActiveFormattingElement::Element(replacement);
                self.stack[node_index] = replacement;

                // STEP 18.7: "If last node is furthest block, then move the
                // aforementioned bookmark to be immediately after the new node
                // in the list of active formatting elements."
                if last_node == furthest_block {
                    bookmark = node_entry + 1;
                }

                // STEP 18.8: "Append last node to node."
                self.tree.append_child(replacement, last_node);

                // STEP 18.9: "Set last node to node."
                last_node = replacement;
            }

            // STEP 19: "Insert whatever last node ended up being in the
            // previous step at the appropriate place for inserting a node,
            // but using common ancestor as the override target."
            if let Some(common_ancestor) = common_ancestor {
                if FOSTER_PARENT_TARGETS.contains(&self.name_of(common_ancestor)) {
                    self.tree.detach(last_node);
                    let (parent, before) = self.foster_parent_location();
                    self.attach(parent, before, last_node);
                } else {
                    self.tree.append_child(common_ancestor, last_node);
                }
            }

            // STEP 20: "Create an element for the token for which formatting
            // element was created, with furthest block as the intended
            // parent."
            let Some(adopter) = self.tree.shallow_clone_element(formatting_element) else {
                return true;
            };

            // STEP 21: "Take all of the child nodes of furthest block and
            // append them to the element created in the last step."
            self.tree.move_children(furthest_block, adopter);

            // STEP 22: "Append that new element to furthest block."
            self.tree.append_child(furthest_block, adopter);

            // STEP 23: "Remove formatting element from the list of active
            // formatting elements, and insert the new element into the list
            // of active formatting elements at the position of the
            // aforementioned bookmark."
            if let Some(entry) = self
                .formatting_elements
                .iter()
                .rposition(|&e| e == ActiveFormattingElement::Element(formatting_element))
            {
                let _ = self.formatting_elements.remove(entry);
                if bookmark > entry {
                    bookmark -= 1;
                }
            }
            let bookmark = bookmark.min(self.formatting_elements.len());
            self.formatting_elements
                .insert(bookmark, ActiveFormattingElement::Element(adopter));

            // STEP 24: "Remove formatting element from the stack of open
            // elements, and insert the new element into the stack of open
            // elements immediately below the position of furthest block in
            // that stack."
            self.remove_from_stack(formatting_element);
            self.insert_on_stack_after(furthest_block, adopter);
        }
        true
    }
}
