//! The parser front end: picks a tree builder, carries settings and the
//! error tracking limit, and keeps the errors of the last parse.

use wombat_dom::{DomTree, NodeId, ParseSettings};

use super::core::HtmlTreeBuilder;
use super::xml::XmlTreeBuilder;
use crate::errors::ParseErrorList;
use crate::tokenizer::unescape;

/// Which tree builder a [`Parser`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeBuilderKind {
    /// [§ 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
    /// HTML tree construction with insertion modes.
    Html,
    /// Plain XML nesting.
    Xml,
}

/// Nodes parsed as a fragment and the tree that owns them.
///
/// The nodes are the fragment's top-level nodes in source order. For HTML
/// fragments they are children of a synthetic `html` root in `tree`.
#[derive(Debug)]
pub struct Fragment {
    /// Tree holding the parsed nodes.
    pub tree: DomTree,
    /// Top-level nodes of the fragment.
    pub nodes: Vec<NodeId>,
}

/// Configured parser.
///
/// ```
/// use wombat_html::Parser;
///
/// let mut parser = Parser::html_parser().track_errors(10);
/// let tree = parser.parse_input("<p>One<p>Two</b>", "");
/// assert_eq!(tree.text(tree.root()), "One Two");
/// assert!(!parser.errors().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Parser {
    kind: TreeBuilderKind,
    settings: ParseSettings,
    max_errors: usize,
    errors: ParseErrorList,
}

impl Parser {
    /// A parser running the HTML tree builder, lowercasing names.
    #[must_use]
    pub const fn html_parser() -> Self {
        Self {
            kind: TreeBuilderKind::Html,
            settings: ParseSettings::HTML_DEFAULT,
            max_errors: 0,
            errors: ParseErrorList::no_tracking(),
        }
    }

    /// A parser running the XML tree builder, keeping name case.
    #[must_use]
    pub const fn xml_parser() -> Self {
        Self {
            kind: TreeBuilderKind::Xml,
            settings: ParseSettings::PRESERVE_CASE,
            max_errors: 0,
            errors: ParseErrorList::no_tracking(),
        }
    }

    /// Use `settings` for tag and attribute name normalization.
    #[must_use]
    pub const fn settings(mut self, settings: ParseSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Record up to `max_errors` parse errors per parse. Zero turns tracking
    /// off.
    #[must_use]
    pub const fn track_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }

    /// True when errors are being recorded.
    #[must_use]
    pub const fn is_track_errors(&self) -> bool {
        self.max_errors > 0
    }

    /// The tree builder this parser runs.
    #[must_use]
    pub const fn kind(&self) -> TreeBuilderKind {
        self.kind
    }

    /// The settings in use.
    #[must_use]
    pub const fn parse_settings(&self) -> ParseSettings {
        self.settings
    }

    /// Errors recorded during the last parse.
    #[must_use]
    pub const fn errors(&self) -> &ParseErrorList {
        &self.errors
    }

    fn new_error_list(&self) -> ParseErrorList {
        if self.is_track_errors() {
            ParseErrorList::tracking(self.max_errors)
        } else {
            ParseErrorList::no_tracking()
        }
    }

    /// Parse `input` as a complete document.
    pub fn parse_input(&mut self, input: &str, base_uri: &str) -> DomTree {
        let errors = self.new_error_list();
        let (tree, errors) = match self.kind {
            TreeBuilderKind::Html => {
                HtmlTreeBuilder::new(input, base_uri, errors, self.settings).build()
            }
            TreeBuilderKind::Xml => {
                XmlTreeBuilder::new(input, base_uri, errors, self.settings).build()
            }
        };
        self.errors = errors;
        tree
    }

    /// Parse `input` as the contents of the element `context`. XML parsers
    /// ignore the context.
    pub fn parse_fragment_input(
        &mut self,
        input: &str,
        context: Option<(&DomTree, NodeId)>,
        base_uri: &str,
    ) -> Fragment {
        let errors = self.new_error_list();
        let (tree, nodes, errors) = match self.kind {
            TreeBuilderKind::Html => HtmlTreeBuilder::new(input, base_uri, errors, self.settings)
                .build_fragment(context),
            TreeBuilderKind::Xml => {
                XmlTreeBuilder::new(input, base_uri, errors, self.settings).build_fragment()
            }
        };
        self.errors = errors;
        Fragment { tree, nodes }
    }

    /// [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
    ///
    /// Parse `html` as the contents of `context` with default settings.
    /// Without a context the input is parsed as a full document and its
    /// top-level nodes are returned.
    #[must_use]
    pub fn parse_fragment(
        html: &str,
        context: Option<(&DomTree, NodeId)>,
        base_uri: &str,
    ) -> Fragment {
        Self::html_parser().parse_fragment_input(html, context, base_uri)
    }

    /// Parse `xml` as a list of top-level nodes.
    #[must_use]
    pub fn parse_xml_fragment(xml: &str, base_uri: &str) -> Fragment {
        Self::xml_parser().parse_fragment_input(xml, None, base_uri)
    }

    /// Parse `body_html` into the `<body>` of an otherwise empty document.
    #[must_use]
    pub fn parse_body_fragment(body_html: &str, base_uri: &str) -> DomTree {
        let mut document = Self::html_parser().parse_input("", base_uri);
        let Some(body) = document.body() else {
            return document;
        };
        let fragment = Self::parse_fragment(body_html, Some((&document, body)), base_uri);
        for &node in &fragment.nodes {
            let copy = document.import_subtree(&fragment.tree, node);
            document.append_child(body, copy);
        }
        document
    }

    /// Decode the character references in `text`.
    #[must_use]
    pub fn unescape_entities(text: &str, in_attribute: bool) -> String {
        unescape(text, in_attribute)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::html_parser()
    }
}
