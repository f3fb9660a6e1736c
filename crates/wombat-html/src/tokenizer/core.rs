use std::mem;

use strum_macros::Display;

use super::helpers::{CommentBuilder, DoctypeBuilder, TagBuilder};
use super::token::Token;
use crate::errors::ParseErrorList;
use crate::reader::{CharacterReader, EOF};

/// U+FFFD REPLACEMENT CHARACTER, substituted for NULs outside data.
pub(super) const REPLACEMENT: char = '\u{FFFD}';

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// The tokenizer state machine. Each state corresponds to a section in § 13.2.5.
/// The comment less-than-sign states are folded into [`TokeniserState::Comment`]
/// since they only ever report errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokeniserState {
    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    Data,
    /// [§ 13.2.5.72](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    /// entered from the data state.
    CharacterReferenceInData,
    /// [§ 13.2.5.2 RCDATA state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state)
    Rcdata,
    /// [§ 13.2.5.72](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    /// entered from the RCDATA state.
    CharacterReferenceInRcdata,
    /// [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    Rawtext,
    /// [§ 13.2.5.4 Script data state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-state)
    ScriptData,
    /// [§ 13.2.5.5 PLAINTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#plaintext-state)
    Plaintext,
    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    TagOpen,
    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    EndTagOpen,
    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    TagName,
    /// [§ 13.2.5.9 RCDATA less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-less-than-sign-state)
    RcdataLessthanSign,
    /// [§ 13.2.5.10 RCDATA end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-open-state)
    RcdataEndTagOpen,
    /// [§ 13.2.5.11 RCDATA end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state)
    RcdataEndTagName,
    /// [§ 13.2.5.12 RAWTEXT less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-less-than-sign-state)
    RawtextLessthanSign,
    /// [§ 13.2.5.13 RAWTEXT end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-open-state)
    RawtextEndTagOpen,
    /// [§ 13.2.5.14 RAWTEXT end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-name-state)
    RawtextEndTagName,
    /// [§ 13.2.5.15 Script data less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-less-than-sign-state)
    ScriptDataLessthanSign,
    /// [§ 13.2.5.16 Script data end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-end-tag-open-state)
    ScriptDataEndTagOpen,
    /// [§ 13.2.5.17 Script data end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-end-tag-name-state)
    ScriptDataEndTagName,
    /// [§ 13.2.5.18 Script data escape start state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escape-start-state)
    ScriptDataEscapeStart,
    /// [§ 13.2.5.19 Script data escape start dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escape-start-dash-state)
    ScriptDataEscapeStartDash,
    /// [§ 13.2.5.20 Script data escaped state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-state)
    ScriptDataEscaped,
    /// [§ 13.2.5.21 Script data escaped dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-dash-state)
    ScriptDataEscapedDash,
    /// [§ 13.2.5.22 Script data escaped dash dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-dash-dash-state)
    ScriptDataEscapedDashDash,
    /// [§ 13.2.5.23 Script data escaped less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-less-than-sign-state)
    ScriptDataEscapedLessthanSign,
    /// [§ 13.2.5.24 Script data escaped end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-end-tag-open-state)
    ScriptDataEscapedEndTagOpen,
    /// [§ 13.2.5.25 Script data escaped end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-end-tag-name-state)
    ScriptDataEscapedEndTagName,
    /// [§ 13.2.5.26 Script data double escape start state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escape-start-state)
    ScriptDataDoubleEscapeStart,
    /// [§ 13.2.5.27 Script data double escaped state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-state)
    ScriptDataDoubleEscaped,
    /// [§ 13.2.5.28 Script data double escaped dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-dash-state)
    ScriptDataDoubleEscapedDash,
    /// [§ 13.2.5.29 Script data double escaped dash dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-dash-dash-state)
    ScriptDataDoubleEscapedDashDash,
    /// [§ 13.2.5.30 Script data double escaped less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-less-than-sign-state)
    ScriptDataDoubleEscapedLessthanSign,
    /// [§ 13.2.5.31 Script data double escape end state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escape-end-state)
    ScriptDataDoubleEscapeEnd,
    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    BeforeAttributeName,
    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    AttributeName,
    /// [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    AfterAttributeName,
    /// [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    BeforeAttributeValue,
    /// [§ 13.2.5.36 Attribute value (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    AttributeValueDoubleQuoted,
    /// [§ 13.2.5.37 Attribute value (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state)
    AttributeValueSingleQuoted,
    /// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    AttributeValueUnquoted,
    /// [§ 13.2.5.39 After attribute value (quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state)
    AfterAttributeValueQuoted,
    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    SelfClosingStartTag,
    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    BogusComment,
    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    MarkupDeclarationOpen,
    /// [§ 13.2.5.43 Comment start state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state)
    CommentStart,
    /// [§ 13.2.5.44 Comment start dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-dash-state)
    CommentStartDash,
    /// [§ 13.2.5.45 Comment state](https://html.spec.whatwg.org/multipage/parsing.html#comment-state)
    Comment,
    /// [§ 13.2.5.50 Comment end dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-dash-state)
    CommentEndDash,
    /// [§ 13.2.5.51 Comment end state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-state)
    CommentEnd,
    /// [§ 13.2.5.52 Comment end bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-bang-state)
    CommentEndBang,
    /// [§ 13.2.5.53 DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state)
    Doctype,
    /// [§ 13.2.5.54 Before DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-name-state)
    BeforeDoctypeName,
    /// [§ 13.2.5.55 DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-name-state)
    DoctypeName,
    /// [§ 13.2.5.56 After DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-name-state)
    AfterDoctypeName,
    /// [§ 13.2.5.57 After DOCTYPE public keyword state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-keyword-state)
    AfterDoctypePublicKeyword,
    /// [§ 13.2.5.58 Before DOCTYPE public identifier state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-public-identifier-state)
    BeforeDoctypePublicIdentifier,
    /// [§ 13.2.5.59 DOCTYPE public identifier (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(double-quoted)-state)
    DoctypePublicIdentifierDoubleQuoted,
    /// [§ 13.2.5.60 DOCTYPE public identifier (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(single-quoted)-state)
    DoctypePublicIdentifierSingleQuoted,
    /// [§ 13.2.5.61 After DOCTYPE public identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-identifier-state)
    AfterDoctypePublicIdentifier,
    /// [§ 13.2.5.62 Between DOCTYPE public and system identifiers state](https://html.spec.whatwg.org/multipage/parsing.html#between-doctype-public-and-system-identifiers-state)
    BetweenDoctypePublicAndSystemIdentifiers,
    /// [§ 13.2.5.63 After DOCTYPE system keyword state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-keyword-state)
    AfterDoctypeSystemKeyword,
    /// [§ 13.2.5.64 Before DOCTYPE system identifier state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-system-identifier-state)
    BeforeDoctypeSystemIdentifier,
    /// [§ 13.2.5.65 DOCTYPE system identifier (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(double-quoted)-state)
    DoctypeSystemIdentifierDoubleQuoted,
    /// [§ 13.2.5.66 DOCTYPE system identifier (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(single-quoted)-state)
    DoctypeSystemIdentifierSingleQuoted,
    /// [§ 13.2.5.67 After DOCTYPE system identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-identifier-state)
    AfterDoctypeSystemIdentifier,
    /// [§ 13.2.5.68 Bogus DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-doctype-state)
    BogusDoctype,
    /// [§ 13.2.5.69 CDATA section state](https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-state)
    CdataSection,
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "Implementations must act as if they used the following state machine to
/// tokenize HTML."
///
/// The tokeniser is pulled: each [`Tokeniser::read`] runs the state machine
/// until one token is ready. Character data is buffered and handed out as a
/// single run ahead of the next non-character token, so the tree builder sees
/// `Character("one two")` rather than one token per scalar.
pub struct Tokeniser {
    pub(super) reader: CharacterReader,
    pub(super) errors: ParseErrorList,
    pub(super) state: TokeniserState,

    /// The token waiting to be handed out by `read`.
    pub(super) emit_pending: Option<Token>,
    /// Character data emitted since the last token.
    pub(super) chars_buffer: String,

    /// [§ 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#temporary-buffer)
    /// "The temporary buffer is used to temporarily store characters during
    /// certain tokenization operations."
    pub(super) data_buffer: String,

    pub(super) tag_pending: TagBuilder,
    pub(super) comment_pending: CommentBuilder,
    pub(super) doctype_pending: DoctypeBuilder,

    /// [§ 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#appropriate-end-tag-token)
    /// "An appropriate end tag token is an end tag token whose tag name
    /// matches the tag name of the last start tag to have been emitted from
    /// this tokenizer, if any."
    pub(super) last_start_tag: Option<String>,

    pub(super) self_closing_flag_acknowledged: bool,
}

impl Tokeniser {
    /// Create a tokeniser over `input` that records into `errors`.
    ///
    /// "The initial state is the data state."
    #[must_use]
    pub fn new(input: &str, errors: ParseErrorList) -> Self {
        Self {
            reader: CharacterReader::new(input),
            errors,
            state: TokeniserState::Data,
            emit_pending: None,
            chars_buffer: String::new(),
            data_buffer: String::new(),
            tag_pending: TagBuilder::new(true),
            comment_pending: CommentBuilder::default(),
            doctype_pending: DoctypeBuilder::default(),
            last_start_tag: None,
            self_closing_flag_acknowledged: true,
        }
    }

    /// The current state.
    #[must_use]
    pub const fn state(&self) -> TokeniserState {
        self.state
    }

    /// Errors recorded so far (including those added by the tree builder).
    #[must_use]
    pub const fn errors(&self) -> &ParseErrorList {
        &self.errors
    }

    /// Give up the error list once tokenizing is finished.
    #[must_use]
    pub fn into_errors(self) -> ParseErrorList {
        self.errors
    }

    /// Current offset into the input, in characters.
    #[must_use]
    pub const fn pos(&self) -> usize {
        self.reader.pos()
    }

    /// Run the state machine until a token is available and return it.
    ///
    /// Once the input is exhausted every call returns [`Token::EndOfFile`].
    pub fn read(&mut self) -> Token {
        // [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#acknowledge-self-closing-flag)
        // "When a start tag token is emitted with its self-closing flag set,
        // if the flag is not acknowledged when it is processed by the tree
        // construction stage, that is a non-void-html-element-start-tag-
        // with-trailing-solidus parse error."
        if !self.self_closing_flag_acknowledged {
            self.error_message("Self closing flag not acknowledged");
            self.self_closing_flag_acknowledged = true;
        }

        while self.emit_pending.is_none() {
            self.step();
        }

        if !self.chars_buffer.is_empty() {
            return Token::characters(mem::take(&mut self.chars_buffer));
        }

        let token = self.emit_pending.take().unwrap_or(Token::EndOfFile);
        if let Token::StartTag(tag) = &token
            && tag.self_closing
        {
            self.self_closing_flag_acknowledged = false;
        }
        token
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#acknowledge-self-closing-flag)
    ///
    /// "Acknowledge the token's self-closing flag"
    pub const fn acknowledge_self_closing_flag(&mut self) {
        self.self_closing_flag_acknowledged = true;
    }

    /// "Switch to the X state". Used by the tree builder to put the
    /// tokeniser into RCDATA, RAWTEXT, script data or PLAINTEXT.
    pub const fn transition(&mut self, state: TokeniserState) {
        self.state = state;
    }

    /// Skip the current character, then switch state.
    pub(super) fn advance_transition(&mut self, state: TokeniserState) {
        self.reader.advance();
        self.state = state;
    }

    /// Consume and discard `seq` if the input continues with it. Used to drop
    /// the newline that follows `<pre>` and `<textarea>`.
    pub fn match_consume(&mut self, seq: &str) -> bool {
        self.reader.match_consume(seq)
    }

    /// Run one step of the current state.
    fn step(&mut self) {
        match self.state {
            TokeniserState::Data => self.handle_data_state(),
            TokeniserState::CharacterReferenceInData => {
                self.handle_character_reference_in_text_state(TokeniserState::Data);
            }
            TokeniserState::Rcdata => self.handle_rcdata_state(),
            TokeniserState::CharacterReferenceInRcdata => {
                self.handle_character_reference_in_text_state(TokeniserState::Rcdata);
            }
            TokeniserState::Rawtext => {
                self.handle_raw_data_state(TokeniserState::RawtextLessthanSign);
            }
            TokeniserState::ScriptData => {
                self.handle_raw_data_state(TokeniserState::ScriptDataLessthanSign);
            }
            TokeniserState::Plaintext => self.handle_plaintext_state(),
            TokeniserState::TagOpen => self.handle_tag_open_state(),
            TokeniserState::EndTagOpen => self.handle_end_tag_open_state(),
            TokeniserState::TagName => self.handle_tag_name_state(),
            TokeniserState::RcdataLessthanSign => self.handle_rcdata_less_than_sign_state(),
            TokeniserState::RcdataEndTagOpen => self.handle_end_tag_open_in_text_state(
                TokeniserState::RcdataEndTagName,
                TokeniserState::Rcdata,
            ),
            TokeniserState::RcdataEndTagName => self.handle_data_end_tag(TokeniserState::Rcdata),
            TokeniserState::RawtextLessthanSign => {
                self.handle_less_than_sign_in_text_state(
                    TokeniserState::RawtextEndTagOpen,
                    TokeniserState::Rawtext,
                );
            }
            TokeniserState::RawtextEndTagOpen => self.handle_end_tag_open_in_text_state(
                TokeniserState::RawtextEndTagName,
                TokeniserState::Rawtext,
            ),
            TokeniserState::RawtextEndTagName => self.handle_data_end_tag(TokeniserState::Rawtext),
            TokeniserState::ScriptDataLessthanSign => {
                self.handle_script_data_less_than_sign_state();
            }
            TokeniserState::ScriptDataEndTagOpen => self.handle_end_tag_open_in_text_state(
                TokeniserState::ScriptDataEndTagName,
                TokeniserState::ScriptData,
            ),
            TokeniserState::ScriptDataEndTagName => {
                self.handle_data_end_tag(TokeniserState::ScriptData);
            }
            TokeniserState::ScriptDataEscapeStart => self.handle_script_data_escape_start_state(
                TokeniserState::ScriptDataEscapeStartDash,
            ),
            TokeniserState::ScriptDataEscapeStartDash => self
                .handle_script_data_escape_start_state(TokeniserState::ScriptDataEscapedDashDash),
            TokeniserState::ScriptDataEscaped => self.handle_script_data_escaped_state(),
            TokeniserState::ScriptDataEscapedDash => self.handle_script_data_escaped_dash_state(),
            TokeniserState::ScriptDataEscapedDashDash => {
                self.handle_script_data_escaped_dash_dash_state();
            }
            TokeniserState::ScriptDataEscapedLessthanSign => {
                self.handle_script_data_escaped_less_than_sign_state();
            }
            TokeniserState::ScriptDataEscapedEndTagOpen => {
                self.handle_script_data_escaped_end_tag_open_state();
            }
            TokeniserState::ScriptDataEscapedEndTagName => {
                self.handle_data_end_tag(TokeniserState::ScriptDataEscaped);
            }
            TokeniserState::ScriptDataDoubleEscapeStart => self.handle_data_double_escape_tag(
                TokeniserState::ScriptDataDoubleEscaped,
                TokeniserState::ScriptDataEscaped,
            ),
            TokeniserState::ScriptDataDoubleEscaped => {
                self.handle_script_data_double_escaped_state();
            }
            TokeniserState::ScriptDataDoubleEscapedDash => {
                self.handle_script_data_double_escaped_dash_state();
            }
            TokeniserState::ScriptDataDoubleEscapedDashDash => {
                self.handle_script_data_double_escaped_dash_dash_state();
            }
            TokeniserState::ScriptDataDoubleEscapedLessthanSign => {
                self.handle_script_data_double_escaped_less_than_sign_state();
            }
            TokeniserState::ScriptDataDoubleEscapeEnd => self.handle_data_double_escape_tag(
                TokeniserState::ScriptDataEscaped,
                TokeniserState::ScriptDataDoubleEscaped,
            ),
            TokeniserState::BeforeAttributeName => self.handle_before_attribute_name_state(),
            TokeniserState::AttributeName => self.handle_attribute_name_state(),
            TokeniserState::AfterAttributeName => self.handle_after_attribute_name_state(),
            TokeniserState::BeforeAttributeValue => self.handle_before_attribute_value_state(),
            TokeniserState::AttributeValueDoubleQuoted => {
                self.handle_attribute_value_quoted_state('"');
            }
            TokeniserState::AttributeValueSingleQuoted => {
                self.handle_attribute_value_quoted_state('\'');
            }
            TokeniserState::AttributeValueUnquoted => self.handle_attribute_value_unquoted_state(),
            TokeniserState::AfterAttributeValueQuoted => {
                self.handle_after_attribute_value_quoted_state();
            }
            TokeniserState::SelfClosingStartTag => self.handle_self_closing_start_tag_state(),
            TokeniserState::BogusComment => self.handle_bogus_comment_state(),
            TokeniserState::MarkupDeclarationOpen => self.handle_markup_declaration_open_state(),
            TokeniserState::CommentStart => self.handle_comment_start_state(),
            TokeniserState::CommentStartDash => self.handle_comment_start_dash_state(),
            TokeniserState::Comment => self.handle_comment_state(),
            TokeniserState::CommentEndDash => self.handle_comment_end_dash_state(),
            TokeniserState::CommentEnd => self.handle_comment_end_state(),
            TokeniserState::CommentEndBang => self.handle_comment_end_bang_state(),
            TokeniserState::Doctype => self.handle_doctype_state(),
            TokeniserState::BeforeDoctypeName => self.handle_before_doctype_name_state(),
            TokeniserState::DoctypeName => self.handle_doctype_name_state(),
            TokeniserState::AfterDoctypeName => self.handle_after_doctype_name_state(),
            TokeniserState::AfterDoctypePublicKeyword => {
                self.handle_after_doctype_keyword_state(true);
            }
            TokeniserState::BeforeDoctypePublicIdentifier => {
                self.handle_before_doctype_identifier_state(true);
            }
            TokeniserState::DoctypePublicIdentifierDoubleQuoted => {
                self.handle_doctype_identifier_quoted_state(true, '"');
            }
            TokeniserState::DoctypePublicIdentifierSingleQuoted => {
                self.handle_doctype_identifier_quoted_state(true, '\'');
            }
            TokeniserState::AfterDoctypePublicIdentifier => {
                self.handle_after_doctype_public_identifier_state();
            }
            TokeniserState::BetweenDoctypePublicAndSystemIdentifiers => {
                self.handle_between_doctype_public_and_system_identifiers_state();
            }
            TokeniserState::AfterDoctypeSystemKeyword => {
                self.handle_after_doctype_keyword_state(false);
            }
            TokeniserState::BeforeDoctypeSystemIdentifier => {
                self.handle_before_doctype_identifier_state(false);
            }
            TokeniserState::DoctypeSystemIdentifierDoubleQuoted => {
                self.handle_doctype_identifier_quoted_state(false, '"');
            }
            TokeniserState::DoctypeSystemIdentifierSingleQuoted => {
                self.handle_doctype_identifier_quoted_state(false, '\'');
            }
            TokeniserState::AfterDoctypeSystemIdentifier => {
                self.handle_after_doctype_system_identifier_state();
            }
            TokeniserState::BogusDoctype => self.handle_bogus_doctype_state(),
            TokeniserState::CdataSection => self.handle_cdata_section_state(),
        }
    }
}

/// [§ 13.1.1](https://infra.spec.whatwg.org/#ascii-whitespace) plus CR.
const fn is_whitespace_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\x0C' | ' ')
}

// =============================================================================
// Data states
// =============================================================================

impl Tokeniser {
    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    fn handle_data_state(&mut self) {
        match self.reader.current() {
            // "U+0026 AMPERSAND (&) - Set the return state to the data state.
            // Switch to the character reference state."
            '&' => self.advance_transition(TokeniserState::CharacterReferenceInData),
            // "U+003C LESS-THAN SIGN (<) - Switch to the tag open state."
            '<' => self.advance_transition(TokeniserState::TagOpen),
            // "U+0000 NULL - This is an unexpected-null-character parse error.
            // Emit the current input character as a character token."
            '\0' => {
                self.error('\0');
                let c = self.reader.consume();
                self.emit_char(c);
            }
            // "EOF - Emit an end-of-file token."
            EOF if self.reader.is_empty() => self.emit(Token::EndOfFile),
            // "Anything else - Emit the current input character as a character token."
            _ => {
                let data = self.reader.consume_data();
                self.emit_str(&data);
            }
        }
    }

    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    ///
    /// Shared by data and RCDATA: a reference that does not decode is
    /// emitted as a literal `&`.
    fn handle_character_reference_in_text_state(&mut self, return_state: TokeniserState) {
        match self.consume_character_reference(None, false) {
            Some(decoded) => self.emit_str(&decoded),
            None => self.emit_char('&'),
        }
        self.transition(return_state);
    }

    /// [§ 13.2.5.2 RCDATA state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state)
    fn handle_rcdata_state(&mut self) {
        match self.reader.current() {
            // "U+0026 AMPERSAND (&)"
            // "Set the return state to the RCDATA state. Switch to the character reference state."
            '&' => self.advance_transition(TokeniserState::CharacterReferenceInRcdata),
            // "U+003C LESS-THAN SIGN (<)"
            // "Switch to the RCDATA less-than sign state."
            '<' => self.advance_transition(TokeniserState::RcdataLessthanSign),
            // "U+0000 NULL"
            // "This is an unexpected-null-character parse error. Emit a U+FFFD REPLACEMENT
            // CHARACTER character token."
            '\0' => {
                self.error('\0');
                self.reader.advance();
                self.emit_char(REPLACEMENT);
            }
            // "EOF"
            // "Emit an end-of-file token."
            EOF if self.reader.is_empty() => self.emit(Token::EndOfFile),
            // "Anything else"
            // "Emit the current input character as a character token."
            _ => {
                let data = self.reader.consume_data();
                self.emit_str(&data);
            }
        }
    }

    /// [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    /// and [§ 13.2.5.4 Script data state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-state)
    ///
    /// The two differ only in which less-than sign state follows `<`.
    fn handle_raw_data_state(&mut self, less_than_sign_state: TokeniserState) {
        match self.reader.current() {
            // "U+003C LESS-THAN SIGN (<)"
            '<' => self.advance_transition(less_than_sign_state),
            // "U+0000 NULL"
            // "This is an unexpected-null-character parse error. Emit a U+FFFD
            // REPLACEMENT CHARACTER character token."
            '\0' => {
                self.error('\0');
                self.reader.advance();
                self.emit_char(REPLACEMENT);
            }
            // "EOF"
            // "Emit an end-of-file token."
            EOF if self.reader.is_empty() => self.emit(Token::EndOfFile),
            // "Anything else"
            // "Emit the current input character as a character token."
            _ => {
                let data = self.reader.consume_raw_data();
                self.emit_str(&data);
            }
        }
    }

    /// [§ 13.2.5.5 PLAINTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#plaintext-state)
    fn handle_plaintext_state(&mut self) {
        match self.reader.current() {
            // "U+0000 NULL"
            //   "This is an unexpected-null-character parse error. Emit a U+FFFD
            //    REPLACEMENT CHARACTER character token."
            '\0' => {
                self.error('\0');
                self.reader.advance();
                self.emit_char(REPLACEMENT);
            }
            // "EOF"
            //   "Emit an end-of-file token."
            EOF if self.reader.is_empty() => self.emit(Token::EndOfFile),
            // "Anything else"
            //   "Emit the current input character as a character token."
            _ => {
                let data = self.reader.consume_to('\0');
                self.emit_str(&data);
            }
        }
    }

    /// [§ 13.2.5.69 CDATA section state](https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-state)
    ///
    /// The section content is emitted as character data.
    fn handle_cdata_section_state(&mut self) {
        let data = self.reader.consume_to_str("]]>");
        self.data_buffer.push_str(&data);
        // "U+005D RIGHT SQUARE BRACKET (]) ... U+003E GREATER-THAN SIGN character"
        // "EOF - This is an eof-in-cdata parse error. Emit an end-of-file token."
        if self.reader.match_consume("]]>") || self.reader.is_empty() {
            let data = mem::take(&mut self.data_buffer);
            self.emit_str(&data);
            self.transition(TokeniserState::Data);
        }
    }
}

// =============================================================================
// Tag states
// =============================================================================

impl Tokeniser {
    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    fn handle_tag_open_state(&mut self) {
        match self.reader.current() {
            // "U+0021 EXCLAMATION MARK (!)"
            // "Switch to the markup declaration open state."
            '!' => self.advance_transition(TokeniserState::MarkupDeclarationOpen),
            // "U+002F SOLIDUS (/)"
            // "Switch to the end tag open state."
            '/' => self.advance_transition(TokeniserState::EndTagOpen),
            // "U+003F QUESTION MARK (?)"
            // "This is an unexpected-question-mark-instead-of-tag-name parse
            // error. Create a comment token whose data is the empty string.
            // Reconsume in the bogus comment state."
            '?' => {
                self.create_bogus_comment_pending();
                self.transition(TokeniserState::BogusComment);
            }
            // "ASCII alpha"
            // "Create a new start tag token, set its tag name to the empty
            // string. Reconsume in the tag name state."
            c if c.is_ascii_alphabetic() => {
                self.create_tag_pending(true);
                self.transition(TokeniserState::TagName);
            }
            // "Anything else"
            // "This is an invalid-first-character-of-tag-name parse error.
            // Emit a U+003C LESS-THAN SIGN character token. Reconsume in the
            // data state."
            c => {
                self.error(c);
                self.emit_char('<');
                self.transition(TokeniserState::Data);
            }
        }
    }

    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    fn handle_end_tag_open_state(&mut self) {
        if self.reader.is_empty() {
            // "EOF"
            // "This is an eof-before-tag-name parse error. Emit a U+003C
            // LESS-THAN SIGN character token, a U+002F SOLIDUS character token
            // and an end-of-file token."
            self.eof_error();
            self.emit_str("</");
            self.transition(TokeniserState::Data);
        } else if self.reader.current().is_ascii_alphabetic() {
            // "ASCII alpha"
            // "Create a new end tag token, set its tag name to the empty
            // string. Reconsume in the tag name state."
            self.create_tag_pending(false);
            self.transition(TokeniserState::TagName);
        } else if self.reader.matches('>') {
            // "U+003E GREATER-THAN SIGN (>)"
            // "This is a missing-end-tag-name parse error. Switch to the data state."
            self.error('>');
            self.advance_transition(TokeniserState::Data);
        } else {
            // "Anything else"
            // "This is an invalid-first-character-of-tag-name parse error.
            // Create a comment token whose data is the empty string. Reconsume
            // in the bogus comment state."
            let c = self.reader.current();
            self.error(c);
            self.create_bogus_comment_pending();
            self.transition(TokeniserState::BogusComment);
        }
    }

    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    fn handle_tag_name_state(&mut self) {
        let name = self.reader.consume_tag_name();
        self.tag_pending.append_tag_name(&name);

        match self.reader.consume() {
            // "U+0009 CHARACTER TABULATION (tab)"
            // "U+000A LINE FEED (LF)"
            // "U+000C FORM FEED (FF)"
            // "U+0020 SPACE"
            // "Switch to the before attribute name state."
            c if is_whitespace_char(c) => self.transition(TokeniserState::BeforeAttributeName),
            // "U+002F SOLIDUS (/)"
            // "Switch to the self-closing start tag state."
            '/' => self.transition(TokeniserState::SelfClosingStartTag),
            // A `<` ends the tag; it is reprocessed as the start of the next one.
            '<' => {
                self.reader.unconsume();
                self.error('<');
                self.emit_tag_pending();
                self.transition(TokeniserState::Data);
            }
            // "U+003E GREATER-THAN SIGN (>)"
            // "Switch to the data state. Emit the current tag token."
            '>' => {
                self.emit_tag_pending();
                self.transition(TokeniserState::Data);
            }
            // "U+0000 NULL"
            // "This is an unexpected-null-character parse error. Append a
            // U+FFFD REPLACEMENT CHARACTER character to the current tag
            // token's tag name."
            '\0' => {
                self.error('\0');
                self.tag_pending.append_tag_name_char(REPLACEMENT);
            }
            // "EOF"
            // "This is an eof-in-tag parse error. Emit an end-of-file token."
            // The unfinished tag is dropped.
            EOF if self.reader.consumed_eof() => {
                self.eof_error();
                self.transition(TokeniserState::Data);
            }
            // "Anything else"
            // "Append the current input character to the current tag token's tag name."
            c => self.tag_pending.append_tag_name_char(c),
        }
    }

    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    fn handle_before_attribute_name_state(&mut self) {
        match self.reader.consume() {
            // "U+0009 CHARACTER TABULATION (tab)" ... "U+0020 SPACE"
            // "Ignore the character."
            c if is_whitespace_char(c) => {}
            // "U+002F SOLIDUS (/)"
            '/' => self.transition(TokeniserState::SelfClosingStartTag),
            '<' => {
                self.reader.unconsume();
                self.error('<');
                self.emit_tag_pending();
                self.transition(TokeniserState::Data);
            }
            // "U+003E GREATER-THAN SIGN (>)"
            '>' => {
                self.emit_tag_pending();
                self.transition(TokeniserState::Data);
            }
            '\0' => {
                self.reader.unconsume();
                self.error('\0');
                self.tag_pending.new_attribute();
                self.transition(TokeniserState::AttributeName);
            }
            EOF if self.reader.consumed_eof() => {
                self.eof_error();
                self.transition(TokeniserState::Data);
            }
            // "U+003D EQUALS SIGN (=)"
            // "This is an unexpected-equals-sign-before-attribute-name parse
            // error. Start a new attribute in the current tag token. Set that
            // attribute's name to the current input character, and its value
            // to the empty string. Switch to the attribute name state."
            c @ ('"' | '\'' | '=') => {
                self.error(c);
                self.tag_pending.new_attribute();
                self.tag_pending.append_attribute_name_char(c);
                self.transition(TokeniserState::AttributeName);
            }
            // "Anything else"
            // "Start a new attribute in the current tag token. Set that
            // attribute name and value to the empty string. Reconsume in the
            // attribute name state."
            _ => {
                self.tag_pending.new_attribute();
                self.reader.unconsume();
                self.transition(TokeniserState::AttributeName);
            }
        }
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    fn handle_attribute_name_state(&mut self) {
        let name = self.reader.consume_to_any(&[
            '\t', '\n', '\r', '\x0C', ' ', '"', '\'', '/', '<', '=', '>', '\0',
        ]);
        self.tag_pending.append_attribute_name(&name);

        match self.reader.consume() {
            c if is_whitespace_char(c) => self.transition(TokeniserState::AfterAttributeName),
            '/' => self.transition(TokeniserState::SelfClosingStartTag),
            // "U+003D EQUALS SIGN (=)"
            // "Switch to the before attribute value state."
            '=' => self.transition(TokeniserState::BeforeAttributeValue),
            '>' => {
                self.emit_tag_pending();
                self.transition(TokeniserState::Data);
            }
            '\0' => {
                self.error('\0');
                self.tag_pending.append_attribute_name_char(REPLACEMENT);
            }
            EOF if self.reader.consumed_eof() => {
                self.eof_error();
                self.transition(TokeniserState::Data);
            }
            // "U+0022 QUOTATION MARK ("), U+0027 APOSTROPHE ('), U+003C
            // LESS-THAN SIGN (<)"
            // "This is an unexpected-character-in-attribute-name parse error.
            // Treat it as per the "anything else" entry below."
            c @ ('"' | '\'' | '<') => {
                self.error(c);
                self.tag_pending.append_attribute_name_char(c);
            }
            c => self.tag_pending.append_attribute_name_char(c),
        }
    }

    /// [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    fn handle_after_attribute_name_state(&mut self) {
        match self.reader.consume() {
            c if is_whitespace_char(c) => {}
            '/' => self.transition(TokeniserState::SelfClosingStartTag),
            '=' => self.transition(TokeniserState::BeforeAttributeValue),
            '>' => {
                self.emit_tag_pending();
                self.transition(TokeniserState::Data);
            }
            '\0' => {
                self.error('\0');
                self.tag_pending.append_attribute_name_char(REPLACEMENT);
                self.transition(TokeniserState::AttributeName);
            }
            EOF if self.reader.consumed_eof() => {
                self.eof_error();
                self.transition(TokeniserState::Data);
            }
            c @ ('"' | '\'' | '<') => {
                self.error(c);
                self.tag_pending.new_attribute();
                self.tag_pending.append_attribute_name_char(c);
                self.transition(TokeniserState::AttributeName);
            }
            // "Anything else"
            // "Start a new attribute in the current tag token. Set that
            // attribute name and value to the empty string. Reconsume in the
            // attribute name state."
            _ => {
                self.tag_pending.new_attribute();
                self.reader.unconsume();
                self.transition(TokeniserState::AttributeName);
            }
        }
    }

    /// [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    fn handle_before_attribute_value_state(&mut self) {
        match self.reader.consume() {
            c if is_whitespace_char(c) => {}
            // "U+0022 QUOTATION MARK (")"
            // "Switch to the attribute value (double-quoted) state."
            '"' => self.transition(TokeniserState::AttributeValueDoubleQuoted),
            '&' => {
                self.reader.unconsume();
                self.transition(TokeniserState::AttributeValueUnquoted);
            }
            // "U+0027 APOSTROPHE (')"
            // "Switch to the attribute value (single-quoted) state."
            '\'' => self.transition(TokeniserState::AttributeValueSingleQuoted),
            '\0' => {
                self.error('\0');
                self.tag_pending.append_attribute_value_char(REPLACEMENT);
                self.transition(TokeniserState::AttributeValueUnquoted);
            }
            EOF if self.reader.consumed_eof() => {
                self.eof_error();
                self.emit_tag_pending();
                self.transition(TokeniserState::Data);
            }
            // "U+003E GREATER-THAN SIGN (>)"
            // "This is a missing-attribute-value parse error. Switch to the
            // data state. Emit the current tag token."
            '>' => {
                self.error('>');
                self.emit_tag_pending();
                self.transition(TokeniserState::Data);
            }
            c @ ('<' | '=' | '`') => {
                self.error(c);
                self.tag_pending.append_attribute_value_char(c);
                self.transition(TokeniserState::AttributeValueUnquoted);
            }
            // "Anything else"
            // "Reconsume in the attribute value (unquoted) state."
            _ => {
                self.reader.unconsume();
                self.transition(TokeniserState::AttributeValueUnquoted);
            }
        }
    }

    /// [§ 13.2.5.36](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    /// and [§ 13.2.5.37](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state)
    fn handle_attribute_value_quoted_state(&mut self, quote: char) {
        let value = self.reader.consume_to_any(&[quote, '&', '\0']);
        if value.is_empty() {
            self.tag_pending.set_empty_attribute_value();
        } else {
            self.tag_pending.append_attribute_value(&value);
        }

        match self.reader.consume() {
            // "Switch to the after attribute value (quoted) state."
            c if c == quote => self.transition(TokeniserState::AfterAttributeValueQuoted),
            // "U+0026 AMPERSAND (&)"
            // "Set the return state to the attribute value (double-quoted)
            // state. Switch to the character reference state."
            '&' => match self.consume_character_reference(Some(quote), true) {
                Some(decoded) => self.tag_pending.append_attribute_value(&decoded),
                None => self.tag_pending.append_attribute_value_char('&'),
            },
            '\0' => {
                self.error('\0');
                self.tag_pending.append_attribute_value_char(REPLACEMENT);
            }
            // "EOF"
            // "This is an eof-in-tag parse error. Emit an end-of-file token."
            // The unterminated tag is dropped.
            EOF if self.reader.consumed_eof() => {
                self.eof_error();
                self.transition(TokeniserState::Data);
            }
            c => self.tag_pending.append_attribute_value_char(c),
        }
    }

    /// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    fn handle_attribute_value_unquoted_state(&mut self) {
        let value = self.reader.consume_to_any(&[
            '\t', '\n', '\r', '\x0C', ' ', '&', '>', '\0', '"', '\'', '<', '=', '`',
        ]);
        if !value.is_empty() {
            self.tag_pending.append_attribute_value(&value);
        }

        match self.reader.consume() {
            c if is_whitespace_char(c) => self.transition(TokeniserState::BeforeAttributeName),
            '&' => match self.consume_character_reference(Some('>'), true) {
                Some(decoded) => self.tag_pending.append_attribute_value(&decoded),
                None => self.tag_pending.append_attribute_value_char('&'),
            },
            '>' => {
                self.emit_tag_pending();
                self.transition(TokeniserState::Data);
            }
            '\0' => {
                self.error('\0');
                self.tag_pending.append_attribute_value_char(REPLACEMENT);
            }
            EOF if self.reader.consumed_eof() => {
                self.eof_error();
                self.transition(TokeniserState::Data);
            }
            c @ ('"' | '\'' | '<' | '=' | '`') => {
                self.error(c);
                self.tag_pending.append_attribute_value_char(c);
            }
            c => self.tag_pending.append_attribute_value_char(c),
        }
    }

    /// [§ 13.2.5.39 After attribute value (quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state)
    fn handle_after_attribute_value_quoted_state(&mut self) {
        match self.reader.consume() {
            c if is_whitespace_char(c) => self.transition(TokeniserState::BeforeAttributeName),
            '/' => self.transition(TokeniserState::SelfClosingStartTag),
            '>' => {
                self.emit_tag_pending();
                self.transition(TokeniserState::Data);
            }
            EOF if self.reader.consumed_eof() => {
                self.eof_error();
                self.transition(TokeniserState::Data);
            }
            // "Anything else"
            // "This is a missing-whitespace-between-attributes parse error.
            // Reconsume in the before attribute name state."
            c => {
                self.reader.unconsume();
                self.error(c);
                self.transition(TokeniserState::BeforeAttributeName);
            }
        }
    }

    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    fn handle_self_closing_start_tag_state(&mut self) {
        match self.reader.consume() {
            // "U+003E GREATER-THAN SIGN (>)"
            // "Set the self-closing flag of the current tag token. Switch to
            // the data state. Emit the current tag token."
            '>' => {
                self.tag_pending.self_closing = true;
                self.emit_tag_pending();
                self.transition(TokeniserState::Data);
            }
            EOF if self.reader.consumed_eof() => {
                self.eof_error();
                self.transition(TokeniserState::Data);
            }
            // "Anything else"
            // "This is an unexpected-solidus-in-tag parse error. Reconsume in
            // the before attribute name state."
            c => {
                self.reader.unconsume();
                self.error(c);
                self.transition(TokeniserState::BeforeAttributeName);
            }
        }
    }
}

// =============================================================================
// RCDATA / RAWTEXT / script data end tag detection
// =============================================================================

impl Tokeniser {
    /// [§ 13.2.5.9 RCDATA less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-less-than-sign-state)
    fn handle_rcdata_less_than_sign_state(&mut self) {
        if self.reader.matches('/') {
            // "U+002F SOLIDUS (/)"
            // "Set the temporary buffer to the empty string. Switch to the
            // RCDATA end tag open state."
            self.data_buffer.clear();
            self.advance_transition(TokeniserState::RcdataEndTagOpen);
        } else if self.reader.current().is_ascii_alphabetic()
            && let Some(end_tag) = self.appropriate_end_tag_name()
            && !self.reader.contains_ignore_case(&format!("</{end_tag}"))
        {
            // A start tag with no closing `</title>` anywhere ahead: close the
            // RCDATA element here instead of swallowing the rest of the
            // document.
            self.create_tag_pending(false);
            self.tag_pending.append_tag_name(&end_tag);
            self.emit_tag_pending();
            self.transition(TokeniserState::TagOpen);
        } else {
            // "Anything else"
            // "Emit a U+003C LESS-THAN SIGN character token. Reconsume in the
            // RCDATA state."
            self.emit_char('<');
            self.transition(TokeniserState::Rcdata);
        }
    }

    /// [§ 13.2.5.12 RAWTEXT less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-less-than-sign-state)
    fn handle_less_than_sign_in_text_state(
        &mut self,
        end_tag_open: TokeniserState,
        text_state: TokeniserState,
    ) {
        if self.reader.matches('/') {
            self.data_buffer.clear();
            self.advance_transition(end_tag_open);
        } else {
            self.emit_char('<');
            self.transition(text_state);
        }
    }

    /// [§ 13.2.5.10 RCDATA end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-open-state)
    /// (and the RAWTEXT and script data equivalents)
    fn handle_end_tag_open_in_text_state(
        &mut self,
        end_tag_name: TokeniserState,
        text_state: TokeniserState,
    ) {
        if self.reader.current().is_ascii_alphabetic() {
            // "ASCII alpha"
            // "Create a new end tag token, set its tag name to the empty
            // string. Reconsume in the RCDATA end tag name state."
            self.create_tag_pending(false);
            self.transition(end_tag_name);
        } else {
            // "Anything else"
            // "Emit a U+003C LESS-THAN SIGN character token and a U+002F
            // SOLIDUS character token. Reconsume in the RCDATA state."
            self.emit_str("</");
            self.transition(text_state);
        }
    }

    /// [§ 13.2.5.11 RCDATA end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state)
    /// (and the RAWTEXT, script data and script data escaped equivalents)
    fn handle_data_end_tag(&mut self, text_state: TokeniserState) {
        // "ASCII alpha"
        // "Append the current input character to the current tag token's tag
        // name. Append the current input character to the temporary buffer."
        if self.reader.matches_letter() {
            let name = self.reader.consume_letter_sequence();
            self.tag_pending.append_tag_name(&name);
            self.data_buffer.push_str(&name);
            return;
        }

        let mut anything_else = true;
        if self.is_appropriate_end_tag_token() && !self.reader.is_empty() {
            let c = self.reader.consume();
            anything_else = false;
            match c {
                // "If the current end tag token is an appropriate end tag
                // token, then switch to the before attribute name state."
                c if is_whitespace_char(c) => self.transition(TokeniserState::BeforeAttributeName),
                '/' => self.transition(TokeniserState::SelfClosingStartTag),
                '>' => {
                    self.emit_tag_pending();
                    self.transition(TokeniserState::Data);
                }
                c => {
                    self.data_buffer.push(c);
                    anything_else = true;
                }
            }
        }

        // "Anything else"
        // "Emit a U+003C LESS-THAN SIGN character token, a U+002F SOLIDUS
        // character token, and a character token for each of the characters
        // in the temporary buffer (in the order they were added to the
        // buffer). Reconsume in the RCDATA state."
        if anything_else {
            let buffered = mem::take(&mut self.data_buffer);
            self.emit_str("</");
            self.emit_str(&buffered);
            self.transition(text_state);
        }
    }

    /// [§ 13.2.5.15 Script data less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-less-than-sign-state)
    fn handle_script_data_less_than_sign_state(&mut self) {
        match self.reader.consume() {
            // "U+002F SOLIDUS (/)"
            // "Set the temporary buffer to the empty string. Switch to the
            // script data end tag open state."
            '/' => {
                self.data_buffer.clear();
                self.transition(TokeniserState::ScriptDataEndTagOpen);
            }
            // "U+0021 EXCLAMATION MARK (!)"
            // "Switch to the script data escape start state. Emit a U+003C
            // LESS-THAN SIGN character token and a U+0021 EXCLAMATION MARK
            // character token."
            '!' => {
                self.emit_str("<!");
                self.transition(TokeniserState::ScriptDataEscapeStart);
            }
            // "Anything else"
            // "Emit a U+003C LESS-THAN SIGN character token. Reconsume in the
            // script data state."
            _ => {
                self.emit_char('<');
                self.reader.unconsume();
                self.transition(TokeniserState::ScriptData);
            }
        }
    }

    /// [§ 13.2.5.18 Script data escape start state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escape-start-state)
    /// and [§ 13.2.5.19 Script data escape start dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escape-start-dash-state)
    fn handle_script_data_escape_start_state(&mut self, on_dash: TokeniserState) {
        // "U+002D HYPHEN-MINUS (-)"
        // "Switch to the script data escape start dash state. Emit a U+002D
        // HYPHEN-MINUS character token."
        if self.reader.matches('-') {
            self.emit_char('-');
            self.advance_transition(on_dash);
        } else {
            // "Anything else"
            // "Reconsume in the script data state."
            self.transition(TokeniserState::ScriptData);
        }
    }

    /// [§ 13.2.5.20 Script data escaped state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-state)
    fn handle_script_data_escaped_state(&mut self) {
        if self.reader.is_empty() {
            // "EOF"
            // "This is an eof-in-script-html-comment-like-text parse error.
            // Emit an end-of-file token."
            self.eof_error();
            self.transition(TokeniserState::Data);
            return;
        }
        match self.reader.current() {
            '-' => {
                self.emit_char('-');
                self.advance_transition(TokeniserState::ScriptDataEscapedDash);
            }
            '<' => self.advance_transition(TokeniserState::ScriptDataEscapedLessthanSign),
            '\0' => {
                self.error('\0');
                self.reader.advance();
                self.emit_char(REPLACEMENT);
            }
            _ => {
                let data = self.reader.consume_to_any(&['-', '<', '\0']);
                self.emit_str(&data);
            }
        }
    }

    /// [§ 13.2.5.21 Script data escaped dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-dash-state)
    fn handle_script_data_escaped_dash_state(&mut self) {
        if self.reader.is_empty() {
            self.eof_error();
            self.transition(TokeniserState::Data);
            return;
        }
        match self.reader.consume() {
            '-' => {
                self.emit_char('-');
                self.transition(TokeniserState::ScriptDataEscapedDashDash);
            }
            '<' => self.transition(TokeniserState::ScriptDataEscapedLessthanSign),
            '\0' => {
                self.error('\0');
                self.emit_char(REPLACEMENT);
                self.transition(TokeniserState::ScriptDataEscaped);
            }
            c => {
                self.emit_char(c);
                self.transition(TokeniserState::ScriptDataEscaped);
            }
        }
    }

    /// [§ 13.2.5.22 Script data escaped dash dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-dash-dash-state)
    fn handle_script_data_escaped_dash_dash_state(&mut self) {
        if self.reader.is_empty() {
            self.eof_error();
            self.transition(TokeniserState::Data);
            return;
        }
        match self.reader.consume() {
            '-' => self.emit_char('-'),
            '<' => self.transition(TokeniserState::ScriptDataEscapedLessthanSign),
            // "U+003E GREATER-THAN SIGN (>)"
            // "Switch to the script data state. Emit a U+003E GREATER-THAN
            // SIGN character token."
            '>' => {
                self.emit_char('>');
                self.transition(TokeniserState::ScriptData);
            }
            '\0' => {
                self.error('\0');
                self.emit_char(REPLACEMENT);
                self.transition(TokeniserState::ScriptDataEscaped);
            }
            c => {
                self.emit_char(c);
                self.transition(TokeniserState::ScriptDataEscaped);
            }
        }
    }

    /// [§ 13.2.5.23 Script data escaped less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-less-than-sign-state)
    fn handle_script_data_escaped_less_than_sign_state(&mut self) {
        let c = self.reader.current();
        if c.is_ascii_alphabetic() {
            // "ASCII alpha"
            // "Set the temporary buffer to the empty string. Emit a U+003C
            // LESS-THAN SIGN character token. Reconsume in the script data
            // double escape start state."
            self.data_buffer.clear();
            self.emit_char('<');
            self.transition(TokeniserState::ScriptDataDoubleEscapeStart);
        } else if c == '/' {
            self.data_buffer.clear();
            self.advance_transition(TokeniserState::ScriptDataEscapedEndTagOpen);
        } else {
            self.emit_char('<');
            self.transition(TokeniserState::ScriptDataEscaped);
        }
    }

    /// [§ 13.2.5.24 Script data escaped end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-end-tag-open-state)
    fn handle_script_data_escaped_end_tag_open_state(&mut self) {
        if self.reader.current().is_ascii_alphabetic() {
            self.create_tag_pending(false);
            self.transition(TokeniserState::ScriptDataEscapedEndTagName);
        } else {
            self.emit_str("</");
            self.transition(TokeniserState::ScriptDataEscaped);
        }
    }

    /// [§ 13.2.5.26 Script data double escape start state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escape-start-state)
    /// and [§ 13.2.5.31 Script data double escape end state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escape-end-state)
    fn handle_data_double_escape_tag(&mut self, on_script: TokeniserState, otherwise: TokeniserState) {
        if self.reader.matches_letter() {
            let name = self.reader.consume_letter_sequence();
            self.data_buffer.push_str(&name.to_ascii_lowercase());
            self.emit_str(&name);
            return;
        }

        match self.reader.consume() {
            // "If the temporary buffer is the string "script", then switch to
            // the script data double escaped state. Otherwise, switch to the
            // script data escaped state. Emit the current input character as
            // a character token."
            c if is_whitespace_char(c) || c == '/' || c == '>' => {
                if self.data_buffer == "script" {
                    self.transition(on_script);
                } else {
                    self.transition(otherwise);
                }
                self.emit_char(c);
            }
            _ => {
                self.reader.unconsume();
                self.transition(otherwise);
            }
        }
    }

    /// [§ 13.2.5.27 Script data double escaped state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-state)
    fn handle_script_data_double_escaped_state(&mut self) {
        match self.reader.current() {
            '-' => {
                self.emit_char('-');
                self.advance_transition(TokeniserState::ScriptDataDoubleEscapedDash);
            }
            '<' => {
                self.emit_char('<');
                self.advance_transition(TokeniserState::ScriptDataDoubleEscapedLessthanSign);
            }
            '\0' => {
                self.error('\0');
                self.reader.advance();
                self.emit_char(REPLACEMENT);
            }
            EOF if self.reader.is_empty() => {
                self.eof_error();
                self.transition(TokeniserState::Data);
            }
            _ => {
                let data = self.reader.consume_to_any(&['-', '<', '\0']);
                self.emit_str(&data);
            }
        }
    }

    /// [§ 13.2.5.28 Script data double escaped dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-dash-state)
    fn handle_script_data_double_escaped_dash_state(&mut self) {
        match self.reader.consume() {
            '-' => {
                self.emit_char('-');
                self.transition(TokeniserState::ScriptDataDoubleEscapedDashDash);
            }
            '<' => {
                self.emit_char('<');
                self.transition(TokeniserState::ScriptDataDoubleEscapedLessthanSign);
            }
            '\0' => {
                self.error('\0');
                self.emit_char(REPLACEMENT);
                self.transition(TokeniserState::ScriptDataDoubleEscaped);
            }
            EOF if self.reader.consumed_eof() => {
                self.eof_error();
                self.transition(TokeniserState::Data);
            }
            c => {
                self.emit_char(c);
                self.transition(TokeniserState::ScriptDataDoubleEscaped);
            }
        }
    }

    /// [§ 13.2.5.29 Script data double escaped dash dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-dash-dash-state)
    fn handle_script_data_double_escaped_dash_dash_state(&mut self) {
        match self.reader.consume() {
            '-' => self.emit_char('-'),
            '<' => {
                self.emit_char('<');
                self.transition(TokeniserState::ScriptDataDoubleEscapedLessthanSign);
            }
            '>' => {
                self.emit_char('>');
                self.transition(TokeniserState::ScriptData);
            }
            '\0' => {
                self.error('\0');
                self.emit_char(REPLACEMENT);
                self.transition(TokeniserState::ScriptDataDoubleEscaped);
            }
            EOF if self.reader.consumed_eof() => {
                self.eof_error();
                self.transition(TokeniserState::Data);
            }
            c => {
                self.emit_char(c);
                self.transition(TokeniserState::ScriptDataDoubleEscaped);
            }
        }
    }

    /// [§ 13.2.5.30 Script data double escaped less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-less-than-sign-state)
    fn handle_script_data_double_escaped_less_than_sign_state(&mut self) {
        // "U+002F SOLIDUS (/)"
        // "Set the temporary buffer to the empty string. Switch to the script
        // data double escape end state. Emit a U+002F SOLIDUS character token."
        if self.reader.matches('/') {
            self.emit_char('/');
            self.data_buffer.clear();
            self.advance_transition(TokeniserState::ScriptDataDoubleEscapeEnd);
        } else {
            self.transition(TokeniserState::ScriptDataDoubleEscaped);
        }
    }
}

// =============================================================================
// Comment states
// =============================================================================

impl Tokeniser {
    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    fn handle_bogus_comment_state(&mut self) {
        let data = self.reader.consume_to_any(&['>', '\0']);
        self.comment_pending.data.push_str(&data);
        if self.reader.matches('\0') {
            // "U+0000 NULL"
            // "This is an unexpected-null-character parse error. Append a
            // U+FFFD REPLACEMENT CHARACTER character to the comment token's data."
            self.error('\0');
            self.reader.advance();
            self.comment_pending.data.push(REPLACEMENT);
            return;
        }
        // "U+003E GREATER-THAN SIGN (>)"
        // "Switch to the data state. Emit the current comment token."
        // "EOF"
        // "Emit the comment. Emit an end-of-file token."
        self.reader.advance();
        self.emit_comment_pending();
        self.transition(TokeniserState::Data);
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    fn handle_markup_declaration_open_state(&mut self) {
        if self.reader.match_consume("--") {
            // "Two U+002D HYPHEN-MINUS characters (-)"
            // "Consume those two characters, create a comment token whose data
            // is the empty string, and switch to the comment start state."
            self.create_comment_pending();
            self.transition(TokeniserState::CommentStart);
        } else if self.reader.match_consume_ignore_case("DOCTYPE") {
            // "ASCII case-insensitive match for the word "DOCTYPE""
            // "Consume those characters and switch to the DOCTYPE state."
            self.transition(TokeniserState::Doctype);
        } else if self.reader.match_consume("[CDATA[") {
            // "The string "[CDATA[" (the five uppercase letters "CDATA" with a
            // U+005B LEFT SQUARE BRACKET character before and after)"
            self.data_buffer.clear();
            self.transition(TokeniserState::CdataSection);
        } else {
            // "Anything else"
            // "This is an incorrectly-opened-comment parse error. Create a
            // comment token whose data is the empty string. Switch to the
            // bogus comment state (don't consume anything in the current state)."
            let c = self.reader.current();
            self.error(c);
            self.create_bogus_comment_pending();
            self.transition(TokeniserState::BogusComment);
        }
    }

    /// [§ 13.2.5.43 Comment start state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state)
    fn handle_comment_start_state(&mut self) {
        match self.reader.consume() {
            // "U+002D HYPHEN-MINUS (-)"
            // "Switch to the comment start dash state."
            '-' => self.transition(TokeniserState::CommentStartDash),
            '\0' => {
                self.error('\0');
                self.comment_pending.data.push(REPLACEMENT);
                self.transition(TokeniserState::Comment);
            }
            // "U+003E GREATER-THAN SIGN (>)"
            // "This is an abrupt-closing-of-empty-comment parse error. Switch
            // to the data state. Emit the current comment token."
            '>' => {
                self.error('>');
                self.emit_comment_pending();
                self.transition(TokeniserState::Data);
            }
            EOF if self.reader.consumed_eof() => {
                self.eof_error();
                self.emit_comment_pending();
                self.transition(TokeniserState::Data);
            }
            // "Anything else"
            // "Reconsume in the comment state."
            _ => {
                self.reader.unconsume();
                self.transition(TokeniserState::Comment);
            }
        }
    }

    /// [§ 13.2.5.44 Comment start dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-dash-state)
    fn handle_comment_start_dash_state(&mut self) {
        match self.reader.consume() {
            // "U+002D HYPHEN-MINUS (-)"
            // "Switch to the comment end state."
            '-' => self.transition(TokeniserState::CommentEnd),
            '\0' => {
                self.error('\0');
                self.comment_pending.data.push('-');
                self.comment_pending.data.push(REPLACEMENT);
                self.transition(TokeniserState::Comment);
            }
            '>' => {
                self.error('>');
                self.emit_comment_pending();
                self.transition(TokeniserState::Data);
            }
            EOF if self.reader.consumed_eof() => {
                self.eof_error();
                self.emit_comment_pending();
                self.transition(TokeniserState::Data);
            }
            // "Anything else"
            // "Append a U+002D HYPHEN-MINUS character (-) to the comment
            // token's data. Reconsume in the comment state."
            _ => {
                self.comment_pending.data.push('-');
                self.reader.unconsume();
                self.transition(TokeniserState::Comment);
            }
        }
    }

    /// [§ 13.2.5.45 Comment state](https://html.spec.whatwg.org/multipage/parsing.html#comment-state)
    fn handle_comment_state(&mut self) {
        match self.reader.current() {
            // "U+002D HYPHEN-MINUS (-)"
            // "Switch to the comment end dash state."
            '-' => self.advance_transition(TokeniserState::CommentEndDash),
            '\0' => {
                self.error('\0');
                self.reader.advance();
                self.comment_pending.data.push(REPLACEMENT);
            }
            // "EOF"
            // "This is an eof-in-comment parse error. Emit the current comment
            // token. Emit an end-of-file token."
            EOF if self.reader.is_empty() => {
                self.eof_error();
                self.emit_comment_pending();
                self.transition(TokeniserState::Data);
            }
            _ => {
                let data = self.reader.consume_to_any(&['-', '\0']);
                self.comment_pending.data.push_str(&data);
            }
        }
    }

    /// [§ 13.2.5.50 Comment end dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-dash-state)
    fn handle_comment_end_dash_state(&mut self) {
        match self.reader.consume() {
            '-' => self.transition(TokeniserState::CommentEnd),
            '\0' => {
                self.error('\0');
                self.comment_pending.data.push('-');
                self.comment_pending.data.push(REPLACEMENT);
                self.transition(TokeniserState::Comment);
            }
            EOF if self.reader.consumed_eof() => {
                self.eof_error();
                self.emit_comment_pending();
                self.transition(TokeniserState::Data);
            }
            // "Anything else"
            // "Append a U+002D HYPHEN-MINUS character (-) to the comment
            // token's data. Reconsume in the comment state."
            _ => {
                self.comment_pending.data.push('-');
                self.reader.unconsume();
                self.transition(TokeniserState::Comment);
            }
        }
    }

    /// [§ 13.2.5.51 Comment end state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-state)
    fn handle_comment_end_state(&mut self) {
        match self.reader.consume() {
            // "U+003E GREATER-THAN SIGN (>)"
            // "Switch to the data state. Emit the current comment token."
            '>' => {
                self.emit_comment_pending();
                self.transition(TokeniserState::Data);
            }
            '\0' => {
                self.error('\0');
                self.comment_pending.data.push_str("--");
                self.comment_pending.data.push(REPLACEMENT);
                self.transition(TokeniserState::Comment);
            }
            // "U+0021 EXCLAMATION MARK (!)"
            // "Switch to the comment end bang state."
            '!' => self.transition(TokeniserState::CommentEndBang),
            // "U+002D HYPHEN-MINUS (-)"
            // "Append a U+002D HYPHEN-MINUS character (-) to the comment token's data."
            '-' => self.comment_pending.data.push('-'),
            EOF if self.reader.consumed_eof() => {
                self.eof_error();
                self.emit_comment_pending();
                self.transition(TokeniserState::Data);
            }
            // "Anything else"
            // "Append two U+002D HYPHEN-MINUS characters (-) to the comment
            // token's data. Reconsume in the comment state."
            _ => {
                self.comment_pending.data.push_str("--");
                self.reader.unconsume();
                self.transition(TokeniserState::Comment);
            }
        }
    }

    /// [§ 13.2.5.52 Comment end bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-bang-state)
    fn handle_comment_end_bang_state(&mut self) {
        match self.reader.consume() {
            '-' => {
                self.comment_pending.data.push_str("--!");
                self.transition(TokeniserState::CommentEndDash);
            }
            // "U+003E GREATER-THAN SIGN (>)"
            // "This is an incorrectly-closed-comment parse error. Switch to
            // the data state. Emit the current comment token."
            '>' => {
                self.error('>');
                self.emit_comment_pending();
                self.transition(TokeniserState::Data);
            }
            '\0' => {
                self.error('\0');
                self.comment_pending.data.push_str("--!");
                self.comment_pending.data.push(REPLACEMENT);
                self.transition(TokeniserState::Comment);
            }
            EOF if self.reader.consumed_eof() => {
                self.eof_error();
                self.emit_comment_pending();
                self.transition(TokeniserState::Data);
            }
            _ => {
                self.comment_pending.data.push_str("--!");
                self.reader.unconsume();
                self.transition(TokeniserState::Comment);
            }
        }
    }
}

// =============================================================================
// DOCTYPE states
// =============================================================================

impl Tokeniser {
    /// Shared "EOF" / malformed-end branch of the DOCTYPE states: turn on the
    /// force-quirks flag, emit the DOCTYPE and return to data.
    fn emit_quirky_doctype(&mut self) {
        self.doctype_pending.force_quirks = true;
        self.emit_doctype_pending();
        self.transition(TokeniserState::Data);
    }

    /// [§ 13.2.5.53 DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state)
    fn handle_doctype_state(&mut self) {
        match self.reader.consume() {
            // "Switch to the before DOCTYPE name state."
            c if is_whitespace_char(c) => self.transition(TokeniserState::BeforeDoctypeName),
            // "EOF"
            // "This is an eof-in-doctype parse error. Create a new DOCTYPE
            // token. Set its force-quirks flag to on. Emit the current token.
            // Emit an end-of-file token."
            EOF if self.reader.consumed_eof() => {
                self.eof_error();
                self.create_doctype_pending();
                self.emit_quirky_doctype();
            }
            // "Anything else"
            // "This is a missing-whitespace-before-doctype-name parse error.
            // Reconsume in the before DOCTYPE name state."
            c => {
                self.error(c);
                self.reader.unconsume();
                self.transition(TokeniserState::BeforeDoctypeName);
            }
        }
    }

    /// [§ 13.2.5.54 Before DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-name-state)
    fn handle_before_doctype_name_state(&mut self) {
        if self.reader.current().is_ascii_alphabetic() {
            self.create_doctype_pending();
            self.transition(TokeniserState::DoctypeName);
            return;
        }
        match self.reader.consume() {
            c if is_whitespace_char(c) => {}
            '\0' => {
                self.error('\0');
                self.create_doctype_pending();
                self.doctype_pending.append_name(REPLACEMENT);
                self.transition(TokeniserState::DoctypeName);
            }
            // "U+003E GREATER-THAN SIGN (>)"
            // "This is a missing-doctype-name parse error. Create a new
            // DOCTYPE token. Set its force-quirks flag to on. Switch to the
            // data state. Emit the current token."
            '>' => {
                self.error('>');
                self.create_doctype_pending();
                self.emit_quirky_doctype();
            }
            EOF if self.reader.consumed_eof() => {
                self.eof_error();
                self.create_doctype_pending();
                self.emit_quirky_doctype();
            }
            c => {
                self.create_doctype_pending();
                self.doctype_pending.append_name(c);
                self.transition(TokeniserState::DoctypeName);
            }
        }
    }

    /// [§ 13.2.5.55 DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-name-state)
    fn handle_doctype_name_state(&mut self) {
        if self.reader.matches_letter() {
            let name = self.reader.consume_letter_sequence();
            self.doctype_pending.append_name_str(&name);
            return;
        }
        match self.reader.consume() {
            '>' => {
                self.emit_doctype_pending();
                self.transition(TokeniserState::Data);
            }
            c if is_whitespace_char(c) => self.transition(TokeniserState::AfterDoctypeName),
            '\0' => {
                self.error('\0');
                self.doctype_pending.append_name(REPLACEMENT);
            }
            EOF if self.reader.consumed_eof() => {
                self.eof_error();
                self.emit_quirky_doctype();
            }
            c => self.doctype_pending.append_name(c),
        }
    }

    /// [§ 13.2.5.56 After DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-name-state)
    fn handle_after_doctype_name_state(&mut self) {
        if self.reader.is_empty() {
            self.eof_error();
            self.emit_quirky_doctype();
            return;
        }
        if self.reader.matches_any(&['\t', '\n', '\r', '\x0C', ' ']) {
            self.reader.advance();
        } else if self.reader.matches('>') {
            self.emit_doctype_pending();
            self.advance_transition(TokeniserState::Data);
        } else if self.reader.match_consume_ignore_case("PUBLIC") {
            // "If the six characters starting from the current input character
            // are an ASCII case-insensitive match for the word "PUBLIC", then
            // consume those characters and switch to the after DOCTYPE public
            // keyword state."
            self.transition(TokeniserState::AfterDoctypePublicKeyword);
        } else if self.reader.match_consume_ignore_case("SYSTEM") {
            self.transition(TokeniserState::AfterDoctypeSystemKeyword);
        } else {
            // "Otherwise, this is an invalid-character-sequence-after-doctype-
            // name parse error. Set the current DOCTYPE token's force-quirks
            // flag to on. Reconsume in the bogus DOCTYPE state."
            let c = self.reader.current();
            self.error(c);
            self.doctype_pending.force_quirks = true;
            self.advance_transition(TokeniserState::BogusDoctype);
        }
    }

    /// Start a quoted public or system identifier as the empty string (not
    /// missing).
    fn begin_doctype_identifier(&mut self, public: bool, quote: char) {
        let state = match (public, quote) {
            (true, '"') => {
                self.doctype_pending.public_identifier = Some(String::new());
                TokeniserState::DoctypePublicIdentifierDoubleQuoted
            }
            (true, _) => {
                self.doctype_pending.public_identifier = Some(String::new());
                TokeniserState::DoctypePublicIdentifierSingleQuoted
            }
            (false, '"') => {
                self.doctype_pending.system_identifier = Some(String::new());
                TokeniserState::DoctypeSystemIdentifierDoubleQuoted
            }
            (false, _) => {
                self.doctype_pending.system_identifier = Some(String::new());
                TokeniserState::DoctypeSystemIdentifierSingleQuoted
            }
        };
        self.transition(state);
    }

    /// [§ 13.2.5.57 After DOCTYPE public keyword state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-keyword-state)
    /// and [§ 13.2.5.63 After DOCTYPE system keyword state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-keyword-state)
    fn handle_after_doctype_keyword_state(&mut self, public: bool) {
        match self.reader.consume() {
            c if is_whitespace_char(c) => self.transition(if public {
                TokeniserState::BeforeDoctypePublicIdentifier
            } else {
                TokeniserState::BeforeDoctypeSystemIdentifier
            }),
            // "U+0022 QUOTATION MARK (")"
            // "This is a missing-whitespace-after-doctype-public-keyword parse
            // error. Set the current DOCTYPE token's public identifier to the
            // empty string (not missing), then switch to the DOCTYPE public
            // identifier (double-quoted) state."
            c @ ('"' | '\'') => {
                self.error(c);
                self.begin_doctype_identifier(public, c);
            }
            '>' => {
                self.error('>');
                self.emit_quirky_doctype();
            }
            EOF if self.reader.consumed_eof() => {
                self.eof_error();
                self.emit_quirky_doctype();
            }
            c => {
                self.error(c);
                self.doctype_pending.force_quirks = true;
                self.transition(TokeniserState::BogusDoctype);
            }
        }
    }

    /// [§ 13.2.5.58 Before DOCTYPE public identifier state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-public-identifier-state)
    /// and [§ 13.2.5.64 Before DOCTYPE system identifier state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-system-identifier-state)
    fn handle_before_doctype_identifier_state(&mut self, public: bool) {
        match self.reader.consume() {
            c if is_whitespace_char(c) => {}
            c @ ('"' | '\'') => self.begin_doctype_identifier(public, c),
            // "U+003E GREATER-THAN SIGN (>)"
            // "This is a missing-doctype-public-identifier parse error. Set the
            // current DOCTYPE token's force-quirks flag to on. Switch to the
            // data state. Emit the current DOCTYPE token."
            '>' => {
                self.error('>');
                self.emit_quirky_doctype();
            }
            EOF if self.reader.consumed_eof() => {
                self.eof_error();
                self.emit_quirky_doctype();
            }
            c => {
                self.error(c);
                self.doctype_pending.force_quirks = true;
                self.transition(TokeniserState::BogusDoctype);
            }
        }
    }

    /// [§ 13.2.5.59](https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(double-quoted)-state)
    /// through [§ 13.2.5.66](https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(single-quoted)-state)
    fn handle_doctype_identifier_quoted_state(&mut self, public: bool, quote: char) {
        match self.reader.consume() {
            c if c == quote => self.transition(if public {
                TokeniserState::AfterDoctypePublicIdentifier
            } else {
                TokeniserState::AfterDoctypeSystemIdentifier
            }),
            '\0' => {
                self.error('\0');
                self.doctype_pending.append_identifier(public, REPLACEMENT);
            }
            // "U+003E GREATER-THAN SIGN (>)"
            // "This is an abrupt-doctype-public-identifier parse error. Set the
            // current DOCTYPE token's force-quirks flag to on. Switch to the
            // data state. Emit the current DOCTYPE token."
            '>' => {
                self.error('>');
                self.emit_quirky_doctype();
            }
            EOF if self.reader.consumed_eof() => {
                self.eof_error();
                self.emit_quirky_doctype();
            }
            c => self.doctype_pending.append_identifier(public, c),
        }
    }

    /// [§ 13.2.5.61 After DOCTYPE public identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-identifier-state)
    fn handle_after_doctype_public_identifier_state(&mut self) {
        match self.reader.consume() {
            c if is_whitespace_char(c) => {
                self.transition(TokeniserState::BetweenDoctypePublicAndSystemIdentifiers);
            }
            '>' => {
                self.emit_doctype_pending();
                self.transition(TokeniserState::Data);
            }
            c @ ('"' | '\'') => {
                self.error(c);
                self.begin_doctype_identifier(false, c);
            }
            EOF if self.reader.consumed_eof() => {
                self.eof_error();
                self.emit_quirky_doctype();
            }
            c => {
                self.error(c);
                self.doctype_pending.force_quirks = true;
                self.transition(TokeniserState::BogusDoctype);
            }
        }
    }

    /// [§ 13.2.5.62 Between DOCTYPE public and system identifiers state](https://html.spec.whatwg.org/multipage/parsing.html#between-doctype-public-and-system-identifiers-state)
    fn handle_between_doctype_public_and_system_identifiers_state(&mut self) {
        match self.reader.consume() {
            c if is_whitespace_char(c) => {}
            '>' => {
                self.emit_doctype_pending();
                self.transition(TokeniserState::Data);
            }
            c @ ('"' | '\'') => self.begin_doctype_identifier(false, c),
            EOF if self.reader.consumed_eof() => {
                self.eof_error();
                self.emit_quirky_doctype();
            }
            c => {
                self.error(c);
                self.doctype_pending.force_quirks = true;
                self.transition(TokeniserState::BogusDoctype);
            }
        }
    }

    /// [§ 13.2.5.67 After DOCTYPE system identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-identifier-state)
    fn handle_after_doctype_system_identifier_state(&mut self) {
        match self.reader.consume() {
            c if is_whitespace_char(c) => {}
            '>' => {
                self.emit_doctype_pending();
                self.transition(TokeniserState::Data);
            }
            EOF if self.reader.consumed_eof() => {
                self.eof_error();
                self.emit_quirky_doctype();
            }
            // "Anything else"
            // "This is an unexpected-character-after-doctype-system-identifier
            // parse error. Reconsume in the bogus DOCTYPE state. (This does not
            // set the current DOCTYPE token's force-quirks flag to on.)"
            c => {
                self.error(c);
                self.transition(TokeniserState::BogusDoctype);
            }
        }
    }

    /// [§ 13.2.5.68 Bogus DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-doctype-state)
    fn handle_bogus_doctype_state(&mut self) {
        match self.reader.consume() {
            '>' => {
                self.emit_doctype_pending();
                self.transition(TokeniserState::Data);
            }
            // "EOF"
            // "Emit the DOCTYPE token. Emit an end-of-file token."
            EOF if self.reader.consumed_eof() => {
                self.emit_doctype_pending();
                self.transition(TokeniserState::Data);
            }
            // "Anything else"
            // "Ignore the character."
            _ => {}
        }
    }
}
