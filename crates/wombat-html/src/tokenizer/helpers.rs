//! Helper functions for the HTML tokenizer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! This module contains the pieces the state handlers share:
//! - Builders for the token under construction ("the current tag token")
//! - Token emission ("Emit the current token")
//! - Parse error reporting

use log::trace;
use wombat_dom::{Attribute, Attributes};

use super::core::Tokeniser;
use super::token::{TagToken, Token};
use crate::errors::ParseError;

// =============================================================================
// Pending tokens
// =============================================================================

/// The start or end tag currently being tokenized.
///
/// Attributes are accumulated one at a time: the name and value of the
/// attribute in progress live in the `attribute_*` fields until the next
/// attribute starts or the tag is emitted.
#[derive(Debug, Default)]
pub(super) struct TagBuilder {
    pub(super) is_start: bool,
    pub(super) name: String,
    pub(super) attributes: Attributes,
    pub(super) self_closing: bool,
    attribute_name: Option<String>,
    attribute_value: String,
    has_attribute_value: bool,
    has_empty_attribute_value: bool,
    /// Attributes dropped because an earlier one had the same name.
    duplicates: usize,
}

impl TagBuilder {
    pub(super) fn new(is_start: bool) -> Self {
        Self {
            is_start,
            ..Self::default()
        }
    }

    pub(super) fn append_tag_name(&mut self, s: &str) {
        self.name.push_str(s);
    }

    pub(super) fn append_tag_name_char(&mut self, c: char) {
        self.name.push(c);
    }

    pub(super) fn append_attribute_name(&mut self, s: &str) {
        self.attribute_name.get_or_insert_with(String::new).push_str(s);
    }

    pub(super) fn append_attribute_name_char(&mut self, c: char) {
        self.attribute_name.get_or_insert_with(String::new).push(c);
    }

    pub(super) fn append_attribute_value(&mut self, s: &str) {
        self.attribute_value.push_str(s);
        self.has_attribute_value = true;
    }

    pub(super) fn append_attribute_value_char(&mut self, c: char) {
        self.attribute_value.push(c);
        self.has_attribute_value = true;
    }

    /// `name=""`: present but empty, as opposed to a bare `name`.
    pub(super) const fn set_empty_attribute_value(&mut self) {
        self.has_empty_attribute_value = true;
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    ///
    /// Finish the attribute in progress and start a fresh one.
    ///
    /// "When the user agent leaves the attribute name state (and before
    /// emitting the tag token, if appropriate), the complete attribute's name
    /// must be compared to the other attributes on the same token; if there is
    /// already an attribute on the token with the exact same name, then this
    /// is a duplicate-attribute parse error and the new attribute must be
    /// removed from the token."
    pub(super) fn new_attribute(&mut self) {
        if let Some(name) = self.attribute_name.take() {
            let name = name.trim();
            if !name.is_empty() {
                let attribute = if self.has_attribute_value {
                    Attribute::new(name, std::mem::take(&mut self.attribute_value))
                } else if self.has_empty_attribute_value {
                    Attribute::new(name, "")
                } else {
                    Attribute::boolean(name)
                };
                if !self.attributes.put_if_absent(attribute) {
                    self.duplicates += 1;
                }
            }
        }
        self.attribute_value.clear();
        self.has_attribute_value = false;
        self.has_empty_attribute_value = false;
    }

    /// Finish any attribute in progress and turn the builder into a token,
    /// along with the number of duplicate attributes dropped.
    fn finalise(&mut self) -> (Token, usize) {
        if self.attribute_name.is_some() {
            self.new_attribute();
        }
        let name = std::mem::take(&mut self.name);
        let tag = TagToken {
            normal_name: name.to_ascii_lowercase(),
            name,
            self_closing: self.self_closing,
            attributes: std::mem::take(&mut self.attributes),
        };
        let token = if self.is_start {
            Token::StartTag(tag)
        } else {
            Token::EndTag(tag)
        };
        (token, std::mem::take(&mut self.duplicates))
    }
}

/// The comment currently being tokenized.
#[derive(Debug, Default)]
pub(super) struct CommentBuilder {
    pub(super) data: String,
    pub(super) bogus: bool,
}

/// The DOCTYPE currently being tokenized.
///
/// "When a DOCTYPE token is created, its name, public identifier, and system
/// identifier must be marked as missing (which is a distinct state from the
/// empty string), and the force-quirks flag must be set to off."
#[derive(Debug, Default)]
pub(super) struct DoctypeBuilder {
    pub(super) name: Option<String>,
    pub(super) public_identifier: Option<String>,
    pub(super) system_identifier: Option<String>,
    pub(super) force_quirks: bool,
}

impl DoctypeBuilder {
    pub(super) fn append_name(&mut self, c: char) {
        self.name.get_or_insert_with(String::new).push(c);
    }

    pub(super) fn append_name_str(&mut self, s: &str) {
        self.name.get_or_insert_with(String::new).push_str(s);
    }

    pub(super) fn append_identifier(&mut self, public: bool, c: char) {
        let identifier = if public {
            &mut self.public_identifier
        } else {
            &mut self.system_identifier
        };
        identifier.get_or_insert_with(String::new).push(c);
    }
}

// =============================================================================
// Token creation and emission
// =============================================================================

impl Tokeniser {
    /// "Create a new start tag token" / "Create a new end tag token"
    pub(super) fn create_tag_pending(&mut self, is_start: bool) {
        self.tag_pending = TagBuilder::new(is_start);
    }

    /// "Create a comment token whose data is the empty string."
    pub(super) fn create_comment_pending(&mut self) {
        self.comment_pending = CommentBuilder::default();
    }

    /// As [`Self::create_comment_pending`], for markup that only looks like a
    /// comment (`<?xml ...?>`, `<!x>`).
    pub(super) fn create_bogus_comment_pending(&mut self) {
        self.comment_pending = CommentBuilder {
            data: String::new(),
            bogus: true,
        };
    }

    /// "Create a new DOCTYPE token."
    pub(super) fn create_doctype_pending(&mut self) {
        self.doctype_pending = DoctypeBuilder::default();
    }

    /// "Emit the current token". Only one token may be pending at a time.
    pub(super) fn emit(&mut self, token: Token) {
        match &token {
            Token::StartTag(tag) => self.last_start_tag = Some(tag.normal_name.clone()),
            // "When an end tag token is emitted with attributes, that is an
            // end-tag-with-attributes parse error."
            Token::EndTag(tag) if !tag.attributes.is_empty() => {
                self.error_message("Attributes incorrectly present on end tag");
            }
            _ => {}
        }
        trace!(target: "wombat::tokeniser", "emit {token:?}");
        self.emit_pending = Some(token);
    }

    /// Emit a run of character data.
    pub(super) fn emit_str(&mut self, data: &str) {
        self.chars_buffer.push_str(data);
    }

    /// Emit one character.
    pub(super) fn emit_char(&mut self, c: char) {
        self.chars_buffer.push(c);
    }

    /// "Emit the current tag token."
    pub(super) fn emit_tag_pending(&mut self) {
        let (token, duplicates) = self.tag_pending.finalise();
        for _ in 0..duplicates {
            self.error_message("Dropped duplicate attribute");
        }
        self.emit(token);
    }

    /// "Emit the current comment token."
    pub(super) fn emit_comment_pending(&mut self) {
        let CommentBuilder { data, bogus } = std::mem::take(&mut self.comment_pending);
        self.emit(Token::Comment { data, bogus });
    }

    /// "Emit the current DOCTYPE token."
    pub(super) fn emit_doctype_pending(&mut self) {
        let DoctypeBuilder {
            name,
            public_identifier,
            system_identifier,
            force_quirks,
        } = std::mem::take(&mut self.doctype_pending);
        self.emit(Token::Doctype {
            name,
            public_identifier,
            system_identifier,
            force_quirks,
        });
    }

    /// The lowercased name of the last start tag emitted, if any.
    pub(super) fn appropriate_end_tag_name(&self) -> Option<String> {
        self.last_start_tag.clone()
    }

    /// [§ 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#appropriate-end-tag-token)
    ///
    /// "An appropriate end tag token is an end tag token whose tag name
    /// matches the tag name of the last start tag to have been emitted from
    /// this tokenizer, if any. If no start tag has been emitted from this
    /// tokenizer, then no end tag token is appropriate."
    pub(super) fn is_appropriate_end_tag_token(&self) -> bool {
        self.last_start_tag
            .as_deref()
            .is_some_and(|last| self.tag_pending.name.eq_ignore_ascii_case(last))
    }
}

// =============================================================================
// Error Handling
// =============================================================================

impl Tokeniser {
    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    ///
    /// Record an unexpected character in the current state.
    pub(super) fn error(&mut self, c: char) {
        if self.errors.can_add_error() {
            let message = format!(
                "Unexpected character '{}' in input state [{}]",
                c.escape_debug(),
                self.state
            );
            self.error_message(&message);
        }
    }

    /// Record that the input ended inside the current state.
    pub(super) fn eof_error(&mut self) {
        if self.errors.can_add_error() {
            let message = format!(
                "Unexpectedly reached end of file (EOF) in input state [{}]",
                self.state
            );
            self.error_message(&message);
        }
    }

    /// Record a malformed character reference.
    pub(super) fn character_reference_error(&mut self, reason: &str) {
        if self.errors.can_add_error() {
            self.error_message(&format!("Invalid character reference: {reason}"));
        }
    }

    /// Record `message` at the current input position.
    pub(crate) fn error_message(&mut self, message: &str) {
        if self.errors.can_add_error() {
            trace!(target: "wombat::tokeniser", "parse error: {message}");
            self.errors.push(ParseError::new(self.reader.pos(), message));
        }
    }
}
