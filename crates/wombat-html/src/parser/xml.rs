//! A tree builder for XML input.
//!
//! There are no insertion modes, implied tags, or foster parenting: start
//! tags open elements, end tags close the nearest open element of the same
//! name, and unmatched end tags are dropped. Tag and attribute case is kept.

use log::{debug, trace};
use wombat_dom::{
    Attributes, DoctypeData, DomTree, NodeId, NodeType, ParseSettings, Syntax, Tag,
    XmlDeclarationData,
};

use crate::errors::ParseErrorList;
use crate::tokenizer::{TagToken, Token, Tokeniser};

/// End tags close an element found among this many entries from the top of
/// the stack.
const MAX_QUEUE_DEPTH: usize = 256;

/// Builds a tree from XML tokens.
pub struct XmlTreeBuilder {
    tokeniser: Tokeniser,
    tree: DomTree,
    settings: ParseSettings,
    /// Open elements; the document sits at the bottom.
    stack: Vec<NodeId>,
}

impl XmlTreeBuilder {
    /// Prepare to parse `input` as XML.
    #[must_use]
    pub fn new(
        input: &str,
        base_uri: &str,
        errors: ParseErrorList,
        settings: ParseSettings,
    ) -> Self {
        let mut tree = DomTree::with_base_uri(base_uri);
        tree.document_mut().syntax = Syntax::Xml;
        Self {
            tokeniser: Tokeniser::new(input, errors),
            tree,
            settings,
            stack: vec![NodeId::ROOT],
        }
    }

    /// Parse the whole input as a document.
    #[must_use]
    pub fn build(mut self) -> (DomTree, ParseErrorList) {
        self.run();
        self.finish()
    }

    /// Parse the input and return the top-level nodes it produced. The
    /// context element plays no part in XML parsing.
    #[must_use]
    pub fn build_fragment(mut self) -> (DomTree, Vec<NodeId>, ParseErrorList) {
        self.run();
        let nodes = self.tree.children(NodeId::ROOT).to_vec();
        let (tree, errors) = self.finish();
        (tree, nodes, errors)
    }

    fn run(&mut self) {
        loop {
            let token = self.tokeniser.read();
            if matches!(token, Token::EndOfFile) {
                break;
            }
            self.process(token);
        }
    }

    fn finish(self) -> (DomTree, ParseErrorList) {
        let errors = self.tokeniser.into_errors();
        debug!(
            target: "wombat::parser",
            "built XML tree of {} nodes, {} errors recorded",
            self.tree.len(),
            errors.len()
        );
        (self.tree, errors)
    }

    fn process(&mut self, token: Token) {
        match token {
            Token::StartTag(tag) => self.insert_start_tag(&tag),
            Token::EndTag(tag) => self.pop_stack_to_close(&tag),
            Token::Comment { data, bogus } => self.insert_comment(data, bogus),
            Token::Character { data } => self.insert_characters(data),
            Token::Doctype {
                name,
                public_identifier,
                system_identifier,
                ..
            } => {
                let doctype = self.tree.alloc(NodeType::Doctype(DoctypeData {
                    name: self.settings.normalize_tag(name.as_deref().unwrap_or("")),
                    public_id: public_identifier.unwrap_or_default(),
                    system_id: system_identifier.unwrap_or_default(),
                }));
                self.insert_node(doctype);
            }
            Token::EndOfFile => {}
        }
    }

    fn current(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(NodeId::ROOT)
    }

    fn insert_node(&mut self, node: NodeId) {
        let parent = self.current();
        self.tree.append_child(parent, node);
    }

    /// Elements written self-closing stay empty and are not opened.
    fn insert_start_tag(&mut self, token: &TagToken) {
        let name = self.settings.normalize_tag(&token.name);
        let mut attributes = token.attributes.clone();
        self.settings.normalize_attributes(&mut attributes);
        let mut tag = Tag::value_of(&name, self.settings);
        if token.self_closing {
            self.tokeniser.acknowledge_self_closing_flag();
            if !tag.is_known() {
                tag.set_self_closing();
            }
        }
        let element = self.tree.create_element(tag, attributes);
        self.insert_node(element);
        if !token.self_closing {
            self.stack.push(element);
        }
    }

    /// Comments that the tokeniser found to be bogus may be XML
    /// declarations (`<?xml version="1.0"?>`) or declarations written with
    /// `<!`; those become declaration nodes.
    fn insert_comment(&mut self, data: String, bogus: bool) {
        let node = if bogus && let Some(declaration) = parse_declaration(&data, self.settings) {
            NodeType::XmlDeclaration(declaration)
        } else {
            NodeType::Comment(data)
        };
        let node = self.tree.alloc(node);
        self.insert_node(node);
    }

    fn insert_characters(&mut self, data: String) {
        let parent = self.current();
        if let Some(last) = self.tree.last_child(parent)
            && let Some(node) = self.tree.get_mut(last)
            && let NodeType::Text(text) = &mut node.node_type
        {
            text.push_str(&data);
            return;
        }
        let node = self.tree.alloc(NodeType::Text(data));
        self.insert_node(node);
    }

    /// Close the nearest open element named like `token`. An end tag with no
    /// matching open element is ignored.
    fn pop_stack_to_close(&mut self, token: &TagToken) {
        let name = self.settings.normalize_tag(&token.name);
        let found = self
            .stack
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .take(MAX_QUEUE_DEPTH)
            .find(|&(_, &id)| self.tree.tag_name(id) == Some(name.as_str()))
            .map(|(position, _)| position);
        match found {
            Some(position) => self.stack.truncate(position),
            None => trace!(target: "wombat::tree_builder", "dropped unmatched end tag {name}"),
        }
    }
}

/// Read a declaration out of bogus comment data: `?name attrs?` (from
/// `<?...?>`) or `name attrs` (from `<!...>`). The pseudo-attributes are
/// read with the tokeniser's attribute rules.
fn parse_declaration(data: &str, settings: ParseSettings) -> Option<XmlDeclarationData> {
    let (inner, is_processing_instruction) = if let Some(rest) = data.strip_prefix('?') {
        (rest.strip_suffix('?').unwrap_or(rest), false)
    } else if data.starts_with(|c: char| c.is_ascii_alphabetic()) {
        (data.strip_suffix('!').unwrap_or(data), true)
    } else {
        return None;
    };

    let mut tokeniser = Tokeniser::new(&format!("<{inner}>"), ParseErrorList::no_tracking());
    let Token::StartTag(tag) = tokeniser.read() else {
        return None;
    };
    let mut attrs: Attributes = tag.attributes;
    settings.normalize_attributes(&mut attrs);
    Some(XmlDeclarationData {
        name: settings.normalize_tag(&tag.name),
        attrs,
        is_processing_instruction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> DomTree {
        XmlTreeBuilder::new(
            input,
            "",
            ParseErrorList::no_tracking(),
            ParseSettings::PRESERVE_CASE,
        )
        .build()
        .0
    }

    #[test]
    fn test_declaration_is_kept() {
        let tree = parse("<?xml version=\"1.0\" encoding=\"UTF-8\"?><Root/>");
        let first = tree.children(NodeId::ROOT)[0];
        let Some(NodeType::XmlDeclaration(declaration)) = tree.get(first).map(|n| &n.node_type)
        else {
            panic!("expected a declaration");
        };
        assert_eq!(declaration.name, "xml");
        assert_eq!(declaration.attrs.get("encoding"), Some("UTF-8"));
        assert!(!declaration.is_processing_instruction);
    }

    #[test]
    fn test_unmatched_end_tag_is_dropped() {
        let tree = parse("<a><b>one</c>two</b></a>");
        assert_eq!(tree.outer_html(NodeId::ROOT), "<a><b>onetwo</b></a>");
    }

    #[test]
    fn test_case_is_preserved() {
        let tree = parse("<Feed Lang=\"en\"><Entry/></Feed>");
        assert_eq!(
            tree.outer_html(NodeId::ROOT),
            "<Feed Lang=\"en\"><Entry /></Feed>"
        );
    }
}
