//! Token handlers for each insertion mode.
//!
//! [§ 13.2.6.4 The rules for parsing tokens in HTML content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhtml)
//!
//! Every handler returns `false` when the token was ignored, which callers
//! use to decide whether to reprocess a token after a synthetic end tag.

use wombat_common::warning::warn_once;
use wombat_dom::{Attribute, DoctypeData, NodeId, NodeType, QuirksMode};

use super::core::{FOSTER_PARENT_TARGETS, HtmlTreeBuilder, InsertionMode};
use crate::tokenizer::{TagToken, Token, TokeniserState};

/// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
/// Start tags that close an open `<p>` in button scope.
const P_CLOSERS: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "details", "dialog", "dir", "div",
    "dl", "fieldset", "figcaption", "figure", "footer", "header", "hgroup", "main", "menu", "nav",
    "ol", "p", "search", "section", "summary", "ul",
];

/// A character token holding only U+0000, which several modes ignore.
const NULL_CHARACTER: &str = "\0";

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// "A start tag whose tag name is one of: "b", "big", "code", "em", "font",
/// "i", "s", "small", "strike", "strong", "tt", "u""
const FORMATTERS: &[&str] = &[
    "b", "big", "code", "em", "font", "i", "s", "small", "strike", "strong", "tt", "u",
];

/// End tags handled by the adoption agency.
const ADOPTION_FORMATTERS: &[&str] = &[
    "a", "b", "big", "code", "em", "font", "i", "nobr", "s", "small", "strike", "strong", "tt",
    "u",
];

/// End tags that close a block element in scope.
const BLOCK_CLOSERS: &[&str] = &[
    "address", "article", "aside", "blockquote", "button", "center", "details", "dialog", "dir",
    "div", "dl", "fieldset", "figcaption", "figure", "footer", "header", "hgroup", "listing",
    "main", "menu", "nav", "ol", "pre", "search", "section", "summary", "ul",
];

/// Start tags in body that are handled as if in head.
const HEAD_IN_BODY: &[&str] = &[
    "base", "basefont", "bgsound", "command", "link", "meta", "noframes", "script", "style",
    "template", "title",
];

/// Table structure start tags that are ignored in body.
const TABLE_PARTS_IN_BODY: &[&str] = &[
    "caption", "col", "colgroup", "frame", "head", "tbody", "td", "tfoot", "th", "thead", "tr",
];

/// `<li>`, `<dd>` and `<dt>` stop looking for an element to close at a
/// special element, except these.
const LIST_ITEM_BREAKERS_EXCEPT: &[&str] = &["address", "div", "p"];

const TABLE_SECTIONS: &[&str] = &["tbody", "tfoot", "thead"];

/// Start tags that end a caption, cell, or row.
const TABLE_STRUCTURE: &[&str] = &[
    "caption", "col", "colgroup", "tbody", "td", "tfoot", "th", "thead", "tr",
];

/// [§ 13.2.6.2](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
/// Public identifiers that put the document in quirks mode, lowercased.
const QUIRKY_PUBLIC_PREFIXES: &[&str] = &[
    "+//silmaril//dtd html pro v0r11 19970101//",
    "-//as//dtd html 3.0 aswedit + extensions//",
    "-//advasoft ltd//dtd html 3.0 aswedit + extensions//",
    "-//ietf//dtd html 2.0",
    "-//ietf//dtd html 3",
    "-//ietf//dtd html level",
    "-//ietf//dtd html strict",
    "-//ietf//dtd html//",
    "-//metrius//dtd metrius presentational//",
    "-//microsoft//dtd internet explorer",
    "-//netscape comm. corp.//dtd",
    "-//o'reilly and associates//dtd html",
    "-//softquad",
    "-//spyglass//dtd html 2.0 extended//",
    "-//sq//dtd html 2.0 hotmetal + extensions//",
    "-//sun microsystems corp.//dtd hotjava",
    "-//w3c//dtd html 3",
    "-//w3c//dtd html 4.0 frameset//",
    "-//w3c//dtd html 4.0 transitional//",
    "-//w3c//dtd html experimental",
    "-//w3c//dtd w3 html//",
    "-//w3o//dtd w3 html 3.0//",
    "-//webtechs//dtd mozilla html",
];

/// Whether a character token is made of ASCII whitespace only.
///
/// "A character token that is one of U+0009 CHARACTER TABULATION, U+000A LINE
/// FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE RETURN (CR), or U+0020
/// SPACE"
fn is_whitespace(token: &Token) -> bool {
    match token {
        Token::Character { data } => data
            .chars()
            .all(|c| matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' ')),
        _ => false,
    }
}

/// [§ 13.2.6.4.1](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
///
/// The document mode implied by a DOCTYPE token.
fn quirks_mode_for(
    name: &str,
    public_id: Option<&str>,
    system_id: Option<&str>,
    force_quirks: bool,
) -> QuirksMode {
    let public = public_id.unwrap_or("").to_ascii_lowercase();
    let system = system_id.unwrap_or("").to_ascii_lowercase();
    let html4_loose = public.starts_with("-//w3c//dtd html 4.01 frameset//")
        || public.starts_with("-//w3c//dtd html 4.01 transitional//");

    if force_quirks
        || name != "html"
        || public == "-//w3o//dtd w3 html strict 3.0//en//"
        || public == "-/w3c/dtd html 4.0 transitional/en"
        || public == "html"
        || system == "http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd"
        || QUIRKY_PUBLIC_PREFIXES
            .iter()
            .any(|prefix| public.starts_with(prefix))
        || (system_id.is_none() && html4_loose)
    {
        return QuirksMode::Quirks;
    }
    if public.starts_with("-//w3c//dtd xhtml 1.0 frameset//")
        || public.starts_with("-//w3c//dtd xhtml 1.0 transitional//")
        || (system_id.is_some() && html4_loose)
    {
        return QuirksMode::LimitedQuirks;
    }
    QuirksMode::NoQuirks
}

impl HtmlTreeBuilder {
    /// Process `token` in the current insertion mode.
    pub(super) fn process(&mut self, token: &Token) -> bool {
        self.process_in(self.state, token)
    }

    /// "Process the token using the rules for the X insertion mode"
    pub(super) fn process_in(&mut self, mode: InsertionMode, token: &Token) -> bool {
        match mode {
            InsertionMode::Initial => self.initial(token),
            InsertionMode::BeforeHtml => self.before_html(token),
            InsertionMode::BeforeHead => self.before_head(token),
            InsertionMode::InHead => self.in_head(token),
            InsertionMode::InHeadNoscript => self.in_head_noscript(token),
            InsertionMode::AfterHead => self.after_head(token),
            InsertionMode::InBody => self.in_body(token),
            InsertionMode::Text => self.text(token),
            InsertionMode::InTable => self.in_table(token),
            InsertionMode::InTableText => self.in_table_text(token),
            InsertionMode::InCaption => self.in_caption(token),
            InsertionMode::InColumnGroup => self.in_column_group(token),
            InsertionMode::InTableBody => self.in_table_body(token),
            InsertionMode::InRow => self.in_row(token),
            InsertionMode::InCell => self.in_cell(token),
            InsertionMode::InSelect => self.in_select(token),
            InsertionMode::InSelectInTable => self.in_select_in_table(token),
            InsertionMode::InTemplate => self.in_template(token),
            InsertionMode::AfterBody => self.after_body(token),
            InsertionMode::InFrameset => self.in_frameset(token),
            InsertionMode::AfterFrameset => self.after_frameset(token),
            InsertionMode::AfterAfterBody => self.after_after_body(token),
            InsertionMode::AfterAfterFrameset => self.after_after_frameset(token),
        }
    }

    // =========================================================================
    // Document start
    // =========================================================================

    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    fn initial(&mut self, token: &Token) -> bool {
        match token {
            // "Ignore the token."
            _ if is_whitespace(token) => true,
            // "Insert a comment as the last child of the Document object."
            Token::Comment { data, .. } => {
                self.append_comment(NodeId::ROOT, data);
                true
            }
            // "If the DOCTYPE token's name is not "html", or the token's
            // public identifier is not missing, ... then there is a parse
            // error. Append a DocumentType node to the Document node"
            Token::Doctype {
                name,
                public_identifier,
                system_identifier,
                force_quirks,
            } => {
                let name = self.settings.normalize_tag(name.as_deref().unwrap_or(""));
                let quirks_mode = quirks_mode_for(
                    &name.to_ascii_lowercase(),
                    public_identifier.as_deref(),
                    system_identifier.as_deref(),
                    *force_quirks,
                );
                let doctype = self.tree.alloc(NodeType::Doctype(DoctypeData {
                    name,
                    public_id: public_identifier.clone().unwrap_or_default(),
                    system_id: system_identifier.clone().unwrap_or_default(),
                }));
                self.tree.append_child(NodeId::ROOT, doctype);
                self.tree.document_mut().quirks_mode = quirks_mode;
                self.transition(InsertionMode::BeforeHtml);
                true
            }
            // "Anything else: ... switch the insertion mode to "before html",
            // then reprocess the token."
            _ => {
                self.transition(InsertionMode::BeforeHtml);
                self.process(token)
            }
        }
    }

    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    fn before_html(&mut self, token: &Token) -> bool {
        match token {
            Token::Doctype { .. } => {
                self.error(InsertionMode::BeforeHtml, token);
                false
            }
            Token::Comment { data, .. } => {
                self.append_comment(NodeId::ROOT, data);
                true
            }
            _ if is_whitespace(token) => true,
            // "Create an element for the token in the HTML namespace, with
            // the Document as the intended parent. Append it to the Document
            // object. Put this element in the stack of open elements."
            Token::StartTag(tag) if tag.normal_name == "html" => {
                let _ = self.insert_open(tag);
                self.transition(InsertionMode::BeforeHead);
                true
            }
            Token::EndTag(tag) if !matches!(tag.normal_name.as_str(), "head" | "body" | "html" | "br") => {
                self.error(InsertionMode::BeforeHtml, token);
                false
            }
            // "Anything else: Create an html element whose node document is
            // the Document object. Append it to the Document object. Put this
            // element in the stack of open elements. Switch the insertion
            // mode to "before head", then reprocess the token."
            _ => {
                let _ = self.insert_open(&TagToken::named("html"));
                self.transition(InsertionMode::BeforeHead);
                self.process(token)
            }
        }
    }

    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    fn before_head(&mut self, token: &Token) -> bool {
        match token {
            _ if is_whitespace(token) => true,
            Token::Comment { data, .. } => {
                self.insert_comment(data);
                true
            }
            Token::Doctype { .. } => {
                self.error(InsertionMode::BeforeHead, token);
                false
            }
            Token::StartTag(tag) if tag.normal_name == "html" => {
                self.process_in(InsertionMode::InBody, token)
            }
            // "Insert an HTML element for the token. Set the head element
            // pointer to the newly created head element."
            Token::StartTag(tag) if tag.normal_name == "head" => {
                let head = self.insert_open(tag);
                self.head_element = Some(head);
                self.transition(InsertionMode::InHead);
                true
            }
            Token::EndTag(tag) if !matches!(tag.normal_name.as_str(), "head" | "body" | "html" | "br") => {
                self.error(InsertionMode::BeforeHead, token);
                false
            }
            // "Insert an HTML element for a "head" start tag token with no
            // attributes. ... Reprocess the current token."
            _ => {
                let _ = self.process_start_tag("head");
                self.process(token)
            }
        }
    }

    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    fn in_head(&mut self, token: &Token) -> bool {
        match token {
            _ if is_whitespace(token) => {
                self.insert_characters_of(token);
                true
            }
            Token::Comment { data, .. } => {
                self.insert_comment(data);
                true
            }
            Token::Doctype { .. } => {
                self.error(InsertionMode::InHead, token);
                false
            }
            Token::StartTag(tag) => match tag.normal_name.as_str() {
                "html" => self.process_in(InsertionMode::InBody, token),
                "base" | "basefont" | "bgsound" | "command" | "link" => {
                    let element = self.insert_empty(tag);
                    // [§ 4.2.3](https://html.spec.whatwg.org/multipage/semantics.html#the-base-element)
                    if tag.normal_name == "base" {
                        self.maybe_set_base_uri(element);
                    }
                    true
                }
                "meta" => {
                    let _ = self.insert_empty(tag);
                    true
                }
                "title" => {
                    self.insert_raw_text(tag, TokeniserState::Rcdata);
                    true
                }
                "noframes" | "style" => {
                    self.insert_raw_text(tag, TokeniserState::Rawtext);
                    true
                }
                // Scripting is disabled: <noscript> content is parsed.
                "noscript" => {
                    let _ = self.insert_open(tag);
                    self.transition(InsertionMode::InHeadNoscript);
                    true
                }
                "script" => {
                    self.insert_raw_text(tag, TokeniserState::ScriptData);
                    true
                }
                "template" => {
                    let _ = warn_once(
                        "HTML Parser",
                        "<template> contents are stored as ordinary children",
                    );
                    let _ = self.insert_open(tag);
                    self.insert_marker();
                    self.frameset_ok = false;
                    self.transition(InsertionMode::InTemplate);
                    self.push_template_mode(InsertionMode::InTemplate);
                    true
                }
                "head" => {
                    self.error(InsertionMode::InHead, token);
                    false
                }
                _ => self.in_head_anything_else(token),
            },
            Token::EndTag(tag) => match tag.normal_name.as_str() {
                "head" => {
                    let _ = self.pop();
                    self.transition(InsertionMode::AfterHead);
                    true
                }
                "body" | "html" | "br" => self.in_head_anything_else(token),
                "template" => self.close_template(token),
                _ => {
                    self.error(InsertionMode::InHead, token);
                    false
                }
            },
            _ => self.in_head_anything_else(token),
        }
    }

    /// "Pop the current node (which will be the head element) off the stack
    /// of open elements. Switch the insertion mode to "after head".
    /// Reprocess the token."
    fn in_head_anything_else(&mut self, token: &Token) -> bool {
        let _ = self.process_end_tag("head");
        self.process(token)
    }

    /// [§ 13.2.6.4.4](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    ///
    /// "An end tag whose tag name is "template""
    fn close_template(&mut self, token: &Token) -> bool {
        if !self.on_stack_named("template") {
            self.error(InsertionMode::InHead, token);
            return false;
        }
        self.generate_implied_end_tags_thoroughly();
        if !self.current_is("template") {
            self.error(InsertionMode::InHead, token);
        }
        self.pop_stack_to_close("template");
        self.clear_formatting_elements_to_last_marker();
        self.pop_template_mode();
        self.reset_insertion_mode();
        true
    }

    /// [§ 13.2.6.2 Parsing elements that contain only text](https://html.spec.whatwg.org/multipage/parsing.html#generic-raw-text-element-parsing-algorithm)
    ///
    /// "Insert an HTML element for the token. ... switch the tokenizer to the
    /// RAWTEXT state (or RCDATA). Let the original insertion mode be the
    /// current insertion mode. Then, switch the insertion mode to "text"."
    fn insert_raw_text(&mut self, tag: &TagToken, state: TokeniserState) {
        let _ = self.insert_open(tag);
        self.tokeniser.transition(state);
        self.mark_insertion_mode();
        self.transition(InsertionMode::Text);
    }

    fn insert_characters_of(&mut self, token: &Token) {
        if let Token::Character { data } = token {
            self.insert_characters(data);
        }
    }

    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    fn in_head_noscript(&mut self, token: &Token) -> bool {
        match token {
            Token::Doctype { .. } => {
                self.error(InsertionMode::InHeadNoscript, token);
                false
            }
            Token::StartTag(tag) if tag.normal_name == "html" => {
                self.process_in(InsertionMode::InBody, token)
            }
            Token::EndTag(tag) if tag.normal_name == "noscript" => {
                let _ = self.pop();
                self.transition(InsertionMode::InHead);
                true
            }
            Token::Comment { .. } => self.process_in(InsertionMode::InHead, token),
            _ if is_whitespace(token) => self.process_in(InsertionMode::InHead, token),
            Token::StartTag(tag)
                if matches!(
                    tag.normal_name.as_str(),
                    "basefont" | "bgsound" | "link" | "meta" | "noframes" | "style"
                ) =>
            {
                self.process_in(InsertionMode::InHead, token)
            }
            Token::StartTag(tag) if matches!(tag.normal_name.as_str(), "head" | "noscript") => {
                self.error(InsertionMode::InHeadNoscript, token);
                false
            }
            Token::EndTag(tag) if tag.normal_name != "br" => {
                self.error(InsertionMode::InHeadNoscript, token);
                false
            }
            // "Parse error. Pop the current node (which will be a noscript
            // element) from the stack of open elements; the new current node
            // will be a head element. Switch the insertion mode to "in head".
            // Reprocess the token."
            _ => {
                self.error(InsertionMode::InHeadNoscript, token);
                let _ = self.pop();
                self.transition(InsertionMode::InHead);
                self.process(token)
            }
        }
    }

    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    fn after_head(&mut self, token: &Token) -> bool {
        match token {
            _ if is_whitespace(token) => {
                self.insert_characters_of(token);
                true
            }
            Token::Comment { data, .. } => {
                self.insert_comment(data);
                true
            }
            Token::Doctype { .. } => {
                self.error(InsertionMode::AfterHead, token);
                false
            }
            Token::StartTag(tag) => match tag.normal_name.as_str() {
                "html" => self.process_in(InsertionMode::InBody, token),
                "body" => {
                    let _ = self.insert_open(tag);
                    self.frameset_ok = false;
                    self.transition(InsertionMode::InBody);
                    true
                }
                "frameset" => {
                    let _ = self.insert_open(tag);
                    self.transition(InsertionMode::InFrameset);
                    true
                }
                // "Parse error. Push the node pointed to by the head element
                // pointer onto the stack of open elements. Process the token
                // using the rules for the "in head" insertion mode. Remove the
                // node pointed to by the head element pointer from the stack
                // of open elements."
                "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script"
                | "style" | "template" | "title" => {
                    self.error(InsertionMode::AfterHead, token);
                    let Some(head) = self.head_element else {
                        return self.after_head_anything_else(token);
                    };
                    self.push(head);
                    let _ = self.process_in(InsertionMode::InHead, token);
                    self.remove_from_stack(head);
                    true
                }
                "head" => {
                    self.error(InsertionMode::AfterHead, token);
                    false
                }
                _ => self.after_head_anything_else(token),
            },
            Token::EndTag(tag) => match tag.normal_name.as_str() {
                "body" | "html" | "br" => self.after_head_anything_else(token),
                "template" => self.process_in(InsertionMode::InHead, token),
                _ => {
                    self.error(InsertionMode::AfterHead, token);
                    false
                }
            },
            _ => self.after_head_anything_else(token),
        }
    }

    /// "Insert an HTML element for a "body" start tag token with no
    /// attributes. Switch the insertion mode to "in body". Reprocess the
    /// current token."
    fn after_head_anything_else(&mut self, token: &Token) -> bool {
        let _ = self.process_start_tag("body");
        self.frameset_ok = true;
        self.process(token)
    }

    // =========================================================================
    // In body
    // =========================================================================

    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    fn in_body(&mut self, token: &Token) -> bool {
        match token {
            Token::Character { data } => {
                // "A character token that is U+0000 NULL: Parse error.
                // Ignore the token." A NUL inside a longer run is kept.
                if data == NULL_CHARACTER {
                    self.error(InsertionMode::InBody, token);
                    return false;
                }
                self.reconstruct_formatting_elements();
                self.insert_characters(data);
                // "Any other character token: ... Set the frameset-ok flag to
                // "not ok"."
                if !is_whitespace(token) {
                    self.frameset_ok = false;
                }
                true
            }
            Token::Comment { data, .. } => {
                self.insert_comment(data);
                true
            }
            Token::Doctype { .. } => {
                self.error(InsertionMode::InBody, token);
                false
            }
            Token::StartTag(tag) => self.in_body_start_tag(token, tag),
            Token::EndTag(tag) => self.in_body_end_tag(token, tag),
            // "If the stack of template insertion modes is not empty, then
            // process the token using the rules for the "in template"
            // insertion mode. Otherwise ... Stop parsing."
            Token::EndOfFile => {
                if self.template_modes.is_empty() {
                    true
                } else {
                    self.process_in(InsertionMode::InTemplate, token)
                }
            }
        }
    }

    /// Close an open `<p>` in button scope, as most block start tags do.
    fn close_p_in_button_scope(&mut self) {
        if self.in_button_scope("p") {
            let _ = self.process_end_tag("p");
        }
    }

    fn in_body_start_tag(&mut self, token: &Token, tag: &TagToken) -> bool {
        let name = tag.normal_name.as_str();
        match name {
            "a" => {
                // "If the list of active formatting elements contains an a
                // element between the end of the list and the last marker on
                // the list ... then this is a parse error; run the adoption
                // agency algorithm for the token, then remove that element
                // from the list of active formatting elements and the stack
                // of open elements if the adoption agency algorithm didn't
                // already remove it"
                if self.active_formatting_element("a").is_some() {
                    self.error(InsertionMode::InBody, token);
                    // Foster parenting stays as the caller set it.
                    let _ = self.run_adoption_agency(&Token::end_tag("a"), "a");
                    if let Some(remaining) = self.get_from_stack("a") {
                        self.remove_from_active_formatting_elements(remaining);
                        self.remove_from_stack(remaining);
                    }
                }
                self.reconstruct_formatting_elements();
                let element = self.insert_start_tag(tag);
                self.push_active_formatting_element(element);
            }
            "span" => {
                self.reconstruct_formatting_elements();
                let _ = self.insert_start_tag(tag);
            }
            "li" => {
                self.frameset_ok = false;
                self.close_list_item(&["li"]);
                self.close_p_in_button_scope();
                let _ = self.insert_start_tag(tag);
            }
            "dd" | "dt" => {
                self.frameset_ok = false;
                self.close_list_item(&["dd", "dt"]);
                self.close_p_in_button_scope();
                let _ = self.insert_start_tag(tag);
            }
            // "Parse error. If there is a template element on the stack of
            // open elements, then ignore the token. Otherwise, for each
            // attribute on the token, check to see if the attribute is
            // already present on the top element of the stack of open
            // elements. If it is not, add the attribute"
            "html" => {
                self.error(InsertionMode::InBody, token);
                if self.on_stack_named("template") {
                    return false;
                }
                if let Some(&html) = self.stack.first() {
                    self.merge_attributes(html, tag);
                }
            }
            "body" => {
                self.error(InsertionMode::InBody, token);
                if self.stack.len() == 1
                    || (self.stack.len() > 2 && self.name_of(self.stack[1]) != "body")
                    || self.on_stack_named("template")
                {
                    return false;
                }
                self.frameset_ok = false;
                if let Some(body) = self.get_from_stack("body") {
                    self.merge_attributes(body, tag);
                }
            }
            "frameset" => {
                self.error(InsertionMode::InBody, token);
                if self.stack.len() == 1
                    || (self.stack.len() > 2 && self.name_of(self.stack[1]) != "body")
                    || !self.frameset_ok
                {
                    return false;
                }
                // "Remove the second element on the stack of open elements
                // from its parent node, if it has one. Pop all the nodes from
                // the bottom of the stack of open elements, from the current
                // node up to, but not including, the root html element."
                let second = self.stack[1];
                self.tree.detach(second);
                self.stack.truncate(1);
                let _ = self.insert_open(tag);
                self.transition(InsertionMode::InFrameset);
            }
            _ if HEADINGS.contains(&name) => {
                self.close_p_in_button_scope();
                if self.current_is_one_of(HEADINGS) {
                    self.error(InsertionMode::InBody, token);
                    let _ = self.pop();
                }
                let _ = self.insert_start_tag(tag);
            }
            "form" => {
                if self.form_element.is_some() && !self.on_stack_named("template") {
                    self.error(InsertionMode::InBody, token);
                    return false;
                }
                self.close_p_in_button_scope();
                let _ = self.insert_form(tag, true);
            }
            "plaintext" => {
                self.close_p_in_button_scope();
                let _ = self.insert_open(tag);
                self.tokeniser.transition(TokeniserState::Plaintext);
            }
            "button" => {
                if self.in_button_scope("button") {
                    self.error(InsertionMode::InBody, token);
                    let _ = self.process_end_tag("button");
                    return self.process(token);
                }
                self.reconstruct_formatting_elements();
                let _ = self.insert_start_tag(tag);
                self.frameset_ok = false;
            }
            "nobr" => {
                self.reconstruct_formatting_elements();
                if self.in_scope("nobr") {
                    self.error(InsertionMode::InBody, token);
                    let _ = self.process_end_tag("nobr");
                    self.reconstruct_formatting_elements();
                }
                let element = self.insert_start_tag(tag);
                self.push_active_formatting_element(element);
            }
            _ if FORMATTERS.contains(&name) => {
                self.reconstruct_formatting_elements();
                let element = self.insert_start_tag(tag);
                self.push_active_formatting_element(element);
            }
            "table" => {
                // "If the Document is not set to quirks mode, and the stack
                // of open elements has a p element in button scope, then
                // close a p element."
                if self.tree.quirks_mode() != QuirksMode::Quirks {
                    self.close_p_in_button_scope();
                }
                let _ = self.insert_start_tag(tag);
                self.frameset_ok = false;
                self.transition(InsertionMode::InTable);
            }
            "input" => {
                self.reconstruct_formatting_elements();
                let element = self.insert_empty(tag);
                let hidden = self
                    .tree
                    .attr(element, "type")
                    .is_some_and(|kind| kind.eq_ignore_ascii_case("hidden"));
                if !hidden {
                    self.frameset_ok = false;
                }
            }
            "area" | "br" | "embed" | "img" | "keygen" | "wbr" => {
                self.reconstruct_formatting_elements();
                let _ = self.insert_empty(tag);
                self.frameset_ok = false;
            }
            "param" | "source" | "track" => {
                let _ = self.insert_empty(tag);
            }
            "hr" => {
                self.close_p_in_button_scope();
                let _ = self.insert_empty(tag);
                self.frameset_ok = false;
            }
            // "Parse error. Change the token's tag name to "img" and
            // reprocess it. (Don't ask.)"
            "image" => {
                if self.get_from_stack("svg").is_some() {
                    let _ = self.insert_start_tag(tag);
                } else {
                    self.error(InsertionMode::InBody, token);
                    let mut img = tag.clone();
                    img.name = String::from("img");
                    img.normal_name = String::from("img");
                    return self.process(&Token::StartTag(img));
                }
            }
            "isindex" => return self.isindex(token, tag),
            "pre" | "listing" => {
                self.close_p_in_button_scope();
                let _ = self.insert_start_tag(tag);
                // "If the next token is a U+000A LINE FEED (LF) character
                // token, then ignore that token and move on to the next one."
                let _ = self.tokeniser.match_consume("\n");
                self.frameset_ok = false;
            }
            "textarea" => {
                self.insert_raw_text(tag, TokeniserState::Rcdata);
                let _ = self.tokeniser.match_consume("\n");
                self.frameset_ok = false;
            }
            "xmp" => {
                self.close_p_in_button_scope();
                self.reconstruct_formatting_elements();
                self.frameset_ok = false;
                self.insert_raw_text(tag, TokeniserState::Rawtext);
            }
            "iframe" => {
                self.frameset_ok = false;
                self.insert_raw_text(tag, TokeniserState::Rawtext);
            }
            "noembed" => self.insert_raw_text(tag, TokeniserState::Rawtext),
            "select" => {
                self.reconstruct_formatting_elements();
                let _ = self.insert_start_tag(tag);
                self.frameset_ok = false;
                if !tag.self_closing {
                    let mode = match self.state {
                        InsertionMode::InTable
                        | InsertionMode::InCaption
                        | InsertionMode::InTableBody
                        | InsertionMode::InRow
                        | InsertionMode::InCell => InsertionMode::InSelectInTable,
                        _ => InsertionMode::InSelect,
                    };
                    self.transition(mode);
                }
            }
            "applet" | "marquee" | "object" => {
                self.reconstruct_formatting_elements();
                let _ = self.insert_start_tag(tag);
                self.insert_marker();
                self.frameset_ok = false;
            }
            "optgroup" | "option" => {
                if self.current_is("option") {
                    let _ = self.process_end_tag("option");
                }
                self.reconstruct_formatting_elements();
                let _ = self.insert_start_tag(tag);
            }
            "rb" | "rtc" | "rp" | "rt" => {
                if self.in_scope("ruby") {
                    let exclude = if matches!(name, "rp" | "rt") {
                        Some("rtc")
                    } else {
                        None
                    };
                    self.generate_implied_end_tags(exclude);
                    if !self.current_is_one_of(&["ruby", "rtc"]) {
                        self.error(InsertionMode::InBody, token);
                    }
                }
                let _ = self.insert_start_tag(tag);
            }
            "math" | "svg" => {
                let _ = warn_once(
                    "HTML Parser",
                    "<svg> and <math> content is parsed without namespace adjustment",
                );
                self.reconstruct_formatting_elements();
                let _ = self.insert_start_tag(tag);
            }
            _ if P_CLOSERS.contains(&name) => {
                self.close_p_in_button_scope();
                let _ = self.insert_start_tag(tag);
            }
            _ if HEAD_IN_BODY.contains(&name) => {
                return self.process_in(InsertionMode::InHead, token);
            }
            // "Parse error. Ignore the token."
            _ if TABLE_PARTS_IN_BODY.contains(&name) => {
                self.error(InsertionMode::InBody, token);
                return false;
            }
            // "Any other start tag: Reconstruct the active formatting
            // elements, if any. Insert an HTML element for the token."
            _ => {
                self.reconstruct_formatting_elements();
                let _ = self.insert_start_tag(tag);
            }
        }
        true
    }

    /// Shared steps of `<li>`, `<dd>` and `<dt>`: close the nearest open
    /// list item of a matching kind, stopping at special elements other than
    /// address, div and p.
    fn close_list_item(&mut self, names: &[&str]) {
        let mut close = None;
        for &node in self.stack.iter().rev() {
            let node_name = self.name_of(node);
            if names.contains(&node_name) {
                close = Some(node_name.to_string());
                break;
            }
            if self.is_special(node) && !LIST_ITEM_BREAKERS_EXCEPT.contains(&node_name) {
                break;
            }
        }
        if let Some(name) = close {
            let _ = self.process_end_tag(&name);
        }
    }

    /// Copy attributes from `tag` onto `element` where the element does not
    /// already have them.
    fn merge_attributes(&mut self, element: NodeId, tag: &TagToken) {
        let mut attributes = tag.attributes.clone();
        self.settings.normalize_attributes(&mut attributes);
        if let Some(data) = self.tree.as_element_mut(element) {
            for attribute in attributes.iter() {
                let _ = data.attrs.put_if_absent(attribute.clone());
            }
        }
    }

    /// `<isindex>`: expanded into a form with a labelled text input.
    fn isindex(&mut self, token: &Token, tag: &TagToken) -> bool {
        self.error(InsertionMode::InBody, token);
        if self.form_element.is_some() {
            return false;
        }
        let _ = self.process_start_tag("form");
        if let Some(action) = tag.attributes.get("action")
            && let Some(form) = self.form_element
            && let Some(data) = self.tree.as_element_mut(form)
        {
            data.attrs.put(Attribute::new("action", action));
        }
        let _ = self.process_start_tag("hr");
        let _ = self.process_start_tag("label");
        let prompt = tag.attributes.get("prompt").map_or_else(
            || String::from("This is a searchable index. Enter search keywords: "),
            str::to_string,
        );
        let _ = self.process(&Token::characters(prompt));

        let mut input = TagToken::named("input");
        for attribute in tag.attributes.iter() {
            if !matches!(attribute.key(), "name" | "action" | "prompt") {
                input.attributes.put(attribute.clone());
            }
        }
        input.attributes.put(Attribute::new("name", "isindex"));
        let _ = self.process(&Token::StartTag(input));
        let _ = self.process_end_tag("label");
        let _ = self.process_start_tag("hr");
        let _ = self.process_end_tag("form");
        true
    }

    fn in_body_end_tag(&mut self, token: &Token, tag: &TagToken) -> bool {
        let name = tag.normal_name.as_str();
        match name {
            "template" => return self.process_in(InsertionMode::InHead, token),
            "li" => {
                if !self.in_list_item_scope("li") {
                    self.error(InsertionMode::InBody, token);
                    return false;
                }
                self.close_in_scope(token, "li");
            }
            // "If the stack of open elements does not have a body element in
            // scope, this is a parse error; ignore the token. ... Switch the
            // insertion mode to "after body"."
            "body" => {
                if !self.in_scope("body") {
                    self.error(InsertionMode::InBody, token);
                    return false;
                }
                self.transition(InsertionMode::AfterBody);
            }
            "html" => {
                if self.process_end_tag("body") {
                    return self.process(token);
                }
                return false;
            }
            "form" => return self.close_form(token),
            "p" => {
                // "If the stack of open elements does not have a p element
                // in button scope, then this is a parse error; insert an HTML
                // element for a "p" start tag token with no attributes."
                if !self.in_button_scope("p") {
                    self.error(InsertionMode::InBody, token);
                    let _ = self.process_start_tag("p");
                    return self.process(token);
                }
                self.close_in_scope(token, "p");
            }
            "dd" | "dt" => {
                if !self.in_scope(name) {
                    self.error(InsertionMode::InBody, token);
                    return false;
                }
                self.close_in_scope(token, name);
            }
            _ if HEADINGS.contains(&name) => {
                if !self.in_scope_any(HEADINGS) {
                    self.error(InsertionMode::InBody, token);
                    return false;
                }
                self.generate_implied_end_tags(Some(name));
                if !self.current_is(name) {
                    self.error(InsertionMode::InBody, token);
                }
                self.pop_stack_to_close_any(HEADINGS);
            }
            // "Parse error. Drop the attributes from the token, and act as
            // described in the next entry; i.e. act as if this was a "br"
            // start tag token with no attributes"
            "br" => {
                self.error(InsertionMode::InBody, token);
                let _ = self.process_start_tag("br");
                return false;
            }
            _ if ADOPTION_FORMATTERS.contains(&name) => {
                return self.run_adoption_agency(token, name);
            }
            _ if BLOCK_CLOSERS.contains(&name) => {
                if !self.in_scope(name) {
                    self.error(InsertionMode::InBody, token);
                    return false;
                }
                self.generate_implied_end_tags(None);
                if !self.current_is(name) {
                    self.error(InsertionMode::InBody, token);
                }
                self.pop_stack_to_close(name);
            }
            "applet" | "marquee" | "object" => {
                if !self.in_scope(name) {
                    self.error(InsertionMode::InBody, token);
                    return false;
                }
                self.generate_implied_end_tags(None);
                if !self.current_is(name) {
                    self.error(InsertionMode::InBody, token);
                }
                self.pop_stack_to_close(name);
                self.clear_formatting_elements_to_last_marker();
            }
            _ => return self.any_other_end_tag(token, name),
        }
        true
    }

    /// "Generate implied end tags, except for X elements. If the current
    /// node is not an X element, then this is a parse error. Pop elements
    /// from the stack of open elements until an X element has been popped."
    fn close_in_scope(&mut self, token: &Token, name: &str) {
        self.generate_implied_end_tags(Some(name));
        if !self.current_is(name) {
            self.error(InsertionMode::InBody, token);
        }
        self.pop_stack_to_close(name);
    }

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    ///
    /// "An end tag whose tag name is "form""
    fn close_form(&mut self, token: &Token) -> bool {
        if self.on_stack_named("template") {
            if !self.in_scope("form") {
                self.error(InsertionMode::InBody, token);
                return false;
            }
            self.generate_implied_end_tags(None);
            if !self.current_is("form") {
                self.error(InsertionMode::InBody, token);
            }
            self.pop_stack_to_close("form");
            return true;
        }

        // "Let node be the element that the form element pointer is set to,
        // or null if it is not set to an element. Set the form element
        // pointer to null."
        let Some(form) = self.form_element.take() else {
            self.error(InsertionMode::InBody, token);
            return false;
        };
        if !self.on_stack(form) || !self.in_scope("form") {
            self.error(InsertionMode::InBody, token);
            return false;
        }
        self.generate_implied_end_tags(None);
        if self.current_element() != Some(form) {
            self.error(InsertionMode::InBody, token);
        }
        // "Remove node from the stack of open elements."
        self.remove_from_stack(form);
        true
    }

    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    fn text(&mut self, token: &Token) -> bool {
        match token {
            Token::Character { data } => {
                self.insert_characters(data);
                true
            }
            // "Parse error. ... Pop the current node off the stack of open
            // elements. Switch the insertion mode to the original insertion
            // mode and reprocess the token."
            Token::EndOfFile => {
                self.error(InsertionMode::Text, token);
                let _ = self.pop();
                self.transition(self.original_state.unwrap_or(InsertionMode::InBody));
                self.process(token)
            }
            Token::EndTag(_) => {
                let _ = self.pop();
                self.transition(self.original_state.unwrap_or(InsertionMode::InBody));
                true
            }
            _ => true,
        }
    }

    // =========================================================================
    // Tables
    // =========================================================================

    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    fn in_table(&mut self, token: &Token) -> bool {
        match token {
            // "A character token, if the current node is table, tbody,
            // template, tfoot, thead, or tr element"
            Token::Character { .. } if self.current_is_one_of(FOSTER_PARENT_TARGETS) => {
                self.pending_table_characters.clear();
                self.mark_insertion_mode();
                self.transition(InsertionMode::InTableText);
                self.process(token)
            }
            Token::Comment { data, .. } => {
                self.insert_comment(data);
                true
            }
            Token::Doctype { .. } => {
                self.error(InsertionMode::InTable, token);
                false
            }
            Token::StartTag(tag) => match tag.normal_name.as_str() {
                "caption" => {
                    self.clear_stack_to_table_context();
                    self.insert_marker();
                    let _ = self.insert_start_tag(tag);
                    self.transition(InsertionMode::InCaption);
                    true
                }
                "colgroup" => {
                    self.clear_stack_to_table_context();
                    let _ = self.insert_start_tag(tag);
                    self.transition(InsertionMode::InColumnGroup);
                    true
                }
                "col" => {
                    self.clear_stack_to_table_context();
                    let _ = self.process_start_tag("colgroup");
                    self.process(token)
                }
                "tbody" | "tfoot" | "thead" => {
                    self.clear_stack_to_table_context();
                    let _ = self.insert_start_tag(tag);
                    self.transition(InsertionMode::InTableBody);
                    true
                }
                "td" | "th" | "tr" => {
                    self.clear_stack_to_table_context();
                    let _ = self.process_start_tag("tbody");
                    self.process(token)
                }
                // "Parse error. If the stack of open elements does not have a
                // table element in table scope, ignore the token. Otherwise:
                // Pop elements from this stack until a table element has been
                // popped. Reset the insertion mode appropriately. Reprocess
                // the token."
                "table" => {
                    self.error(InsertionMode::InTable, token);
                    if !self.in_table_scope("table") {
                        return false;
                    }
                    self.pop_stack_to_close("table");
                    self.reset_insertion_mode();
                    self.process(token)
                }
                "style" | "script" | "template" => self.process_in(InsertionMode::InHead, token),
                "input" => {
                    let hidden = tag
                        .attributes
                        .get_ignore_case("type")
                        .is_some_and(|kind| kind.eq_ignore_ascii_case("hidden"));
                    if !hidden {
                        return self.in_table_anything_else(token);
                    }
                    self.error(InsertionMode::InTable, token);
                    let _ = self.insert_empty(tag);
                    true
                }
                "form" => {
                    self.error(InsertionMode::InTable, token);
                    if self.form_element.is_some() || self.on_stack_named("template") {
                        return false;
                    }
                    let _ = self.insert_form(tag, false);
                    true
                }
                _ => self.in_table_anything_else(token),
            },
            Token::EndTag(tag) => match tag.normal_name.as_str() {
                "table" => {
                    if !self.in_table_scope("table") {
                        self.error(InsertionMode::InTable, token);
                        return false;
                    }
                    self.pop_stack_to_close("table");
                    self.reset_insertion_mode();
                    true
                }
                "body" | "caption" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot"
                | "th" | "thead" | "tr" => {
                    self.error(InsertionMode::InTable, token);
                    false
                }
                "template" => self.process_in(InsertionMode::InHead, token),
                _ => self.in_table_anything_else(token),
            },
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::EndOfFile => self.process_in(InsertionMode::InBody, token),
            Token::Character { .. } => self.in_table_anything_else(token),
        }
    }

    /// "Parse error. Enable foster parenting, process the token using the
    /// rules for the "in body" insertion mode, and then disable foster
    /// parenting."
    fn in_table_anything_else(&mut self, token: &Token) -> bool {
        self.error(InsertionMode::InTable, token);
        self.foster_inserts = true;
        let processed = self.process_in(InsertionMode::InBody, token);
        self.foster_inserts = false;
        processed
    }

    /// [§ 13.2.6.4.10 The "in table text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intabletext)
    fn in_table_text(&mut self, token: &Token) -> bool {
        if let Token::Character { data } = token {
            // "A character token that is U+0000 NULL: Parse error. Ignore
            // the token."
            if data == NULL_CHARACTER {
                self.error(InsertionMode::InTableText, token);
            } else {
                self.pending_table_characters.push(data.clone());
            }
            return true;
        }

        // "If any of the tokens in the pending table character tokens list
        // are character tokens that are not ASCII whitespace, then this is a
        // parse error: reprocess the character tokens in the pending table
        // character tokens list using the rules given in the "anything else"
        // entry in the "in table" insertion mode. Otherwise, insert the
        // characters given by the pending table character tokens list."
        let pending = std::mem::take(&mut self.pending_table_characters);
        for data in pending {
            let characters = Token::characters(data);
            if is_whitespace(&characters) {
                self.insert_characters_of(&characters);
            } else {
                self.error(InsertionMode::InTableText, &characters);
                if self.current_is_one_of(FOSTER_PARENT_TARGETS) {
                    self.foster_inserts = true;
                    let _ = self.process_in(InsertionMode::InBody, &characters);
                    self.foster_inserts = false;
                } else {
                    let _ = self.process_in(InsertionMode::InBody, &characters);
                }
            }
        }

        // "Switch the insertion mode to the original insertion mode and
        // reprocess the token."
        self.transition(self.original_state.unwrap_or(InsertionMode::InTable));
        self.process(token)
    }

    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    fn in_caption(&mut self, token: &Token) -> bool {
        match token {
            Token::EndTag(tag) if tag.normal_name == "caption" => {
                if !self.in_table_scope("caption") {
                    self.error(InsertionMode::InCaption, token);
                    return false;
                }
                self.generate_implied_end_tags(None);
                if !self.current_is("caption") {
                    self.error(InsertionMode::InCaption, token);
                }
                self.pop_stack_to_close("caption");
                self.clear_formatting_elements_to_last_marker();
                self.transition(InsertionMode::InTable);
                true
            }
            Token::StartTag(tag) if TABLE_STRUCTURE.contains(&tag.normal_name.as_str()) => {
                self.end_caption_and_reprocess(token)
            }
            Token::EndTag(tag) if tag.normal_name == "table" => {
                self.end_caption_and_reprocess(token)
            }
            Token::EndTag(tag)
                if matches!(
                    tag.normal_name.as_str(),
                    "body" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot" | "th"
                        | "thead" | "tr"
                ) =>
            {
                self.error(InsertionMode::InCaption, token);
                false
            }
            _ => self.process_in(InsertionMode::InBody, token),
        }
    }

    fn end_caption_and_reprocess(&mut self, token: &Token) -> bool {
        self.error(InsertionMode::InCaption, token);
        if self.process_end_tag("caption") {
            self.process(token)
        } else {
            false
        }
    }

    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolumngroup)
    fn in_column_group(&mut self, token: &Token) -> bool {
        match token {
            _ if is_whitespace(token) => {
                self.insert_characters_of(token);
                true
            }
            Token::Comment { data, .. } => {
                self.insert_comment(data);
                true
            }
            Token::Doctype { .. } => {
                self.error(InsertionMode::InColumnGroup, token);
                false
            }
            Token::StartTag(tag) => match tag.normal_name.as_str() {
                "html" => self.process_in(InsertionMode::InBody, token),
                "col" => {
                    let _ = self.insert_empty(tag);
                    true
                }
                "template" => self.process_in(InsertionMode::InHead, token),
                _ => self.column_group_anything_else(token),
            },
            Token::EndTag(tag) => match tag.normal_name.as_str() {
                "colgroup" => {
                    if !self.current_is("colgroup") {
                        self.error(InsertionMode::InColumnGroup, token);
                        return false;
                    }
                    let _ = self.pop();
                    self.transition(InsertionMode::InTable);
                    true
                }
                "col" => {
                    self.error(InsertionMode::InColumnGroup, token);
                    false
                }
                "template" => self.process_in(InsertionMode::InHead, token),
                _ => self.column_group_anything_else(token),
            },
            Token::EndOfFile => self.process_in(InsertionMode::InBody, token),
            Token::Character { .. } => self.column_group_anything_else(token),
        }
    }

    /// "If the current node is not a colgroup element, then this is a parse
    /// error; ignore the token. Otherwise, pop the current node from the
    /// stack of open elements. Switch the insertion mode to "in table".
    /// Reprocess the token."
    fn column_group_anything_else(&mut self, token: &Token) -> bool {
        if !self.current_is("colgroup") {
            self.error(InsertionMode::InColumnGroup, token);
            return false;
        }
        let _ = self.pop();
        self.transition(InsertionMode::InTable);
        self.process(token)
    }

    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intablebody)
    fn in_table_body(&mut self, token: &Token) -> bool {
        match token {
            Token::StartTag(tag) => match tag.normal_name.as_str() {
                "tr" => {
                    self.clear_stack_to_table_body_context();
                    let _ = self.insert_start_tag(tag);
                    self.transition(InsertionMode::InRow);
                    true
                }
                "th" | "td" => {
                    self.error(InsertionMode::InTableBody, token);
                    let _ = self.process_start_tag("tr");
                    self.process(token)
                }
                "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead" => {
                    self.exit_table_body(token)
                }
                _ => self.process_in(InsertionMode::InTable, token),
            },
            Token::EndTag(tag) => match tag.normal_name.as_str() {
                name @ ("tbody" | "tfoot" | "thead") => {
                    if !self.in_table_scope(name) {
                        self.error(InsertionMode::InTableBody, token);
                        return false;
                    }
                    self.clear_stack_to_table_body_context();
                    let _ = self.pop();
                    self.transition(InsertionMode::InTable);
                    true
                }
                "table" => self.exit_table_body(token),
                "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th" | "tr" => {
                    self.error(InsertionMode::InTableBody, token);
                    false
                }
                _ => self.process_in(InsertionMode::InTable, token),
            },
            _ => self.process_in(InsertionMode::InTable, token),
        }
    }

    /// "If the stack of open elements does not have a tbody, thead, or tfoot
    /// element in table scope, this is a parse error; ignore the token.
    /// Otherwise: Clear the stack back to a table body context. Pop the
    /// current node from the stack of open elements. Switch the insertion
    /// mode to "in table". Reprocess the token."
    fn exit_table_body(&mut self, token: &Token) -> bool {
        if !TABLE_SECTIONS.iter().any(|name| self.in_table_scope(name)) {
            self.error(InsertionMode::InTableBody, token);
            return false;
        }
        self.clear_stack_to_table_body_context();
        let _ = self.pop();
        self.transition(InsertionMode::InTable);
        self.process(token)
    }

    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inrow)
    fn in_row(&mut self, token: &Token) -> bool {
        match token {
            Token::StartTag(tag) => match tag.normal_name.as_str() {
                "th" | "td" => {
                    self.clear_stack_to_table_row_context();
                    let _ = self.insert_start_tag(tag);
                    self.transition(InsertionMode::InCell);
                    self.insert_marker();
                    true
                }
                "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead" | "tr" => {
                    self.end_row_and_reprocess(token)
                }
                _ => self.process_in(InsertionMode::InTable, token),
            },
            Token::EndTag(tag) => match tag.normal_name.as_str() {
                "tr" => {
                    if !self.in_table_scope("tr") {
                        self.error(InsertionMode::InRow, token);
                        return false;
                    }
                    self.clear_stack_to_table_row_context();
                    let _ = self.pop();
                    self.transition(InsertionMode::InTableBody);
                    true
                }
                "table" => self.end_row_and_reprocess(token),
                name @ ("tbody" | "tfoot" | "thead") => {
                    if !self.in_table_scope(name) {
                        self.error(InsertionMode::InRow, token);
                        return false;
                    }
                    self.end_row_and_reprocess(token)
                }
                "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th" => {
                    self.error(InsertionMode::InRow, token);
                    false
                }
                _ => self.process_in(InsertionMode::InTable, token),
            },
            _ => self.process_in(InsertionMode::InTable, token),
        }
    }

    /// "If the stack of open elements does not have a tr element in table
    /// scope, this is a parse error; ignore the token. Otherwise: ... Pop the
    /// current node (which will be a tr element) from the stack of open
    /// elements. Switch the insertion mode to "in table body". Reprocess the
    /// token."
    fn end_row_and_reprocess(&mut self, token: &Token) -> bool {
        if self.process_end_tag("tr") {
            self.process(token)
        } else {
            false
        }
    }

    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incell)
    fn in_cell(&mut self, token: &Token) -> bool {
        match token {
            Token::EndTag(tag) => match tag.normal_name.as_str() {
                name @ ("td" | "th") => {
                    if !self.in_table_scope(name) {
                        self.error(InsertionMode::InCell, token);
                        self.transition(InsertionMode::InRow);
                        return false;
                    }
                    self.generate_implied_end_tags(None);
                    if !self.current_is(name) {
                        self.error(InsertionMode::InCell, token);
                    }
                    self.pop_stack_to_close(name);
                    self.clear_formatting_elements_to_last_marker();
                    self.transition(InsertionMode::InRow);
                    true
                }
                "body" | "caption" | "col" | "colgroup" | "html" => {
                    self.error(InsertionMode::InCell, token);
                    false
                }
                name @ ("table" | "tbody" | "tfoot" | "thead" | "tr") => {
                    if !self.in_table_scope(name) {
                        self.error(InsertionMode::InCell, token);
                        return false;
                    }
                    self.close_cell();
                    self.process(token)
                }
                _ => self.process_in(InsertionMode::InBody, token),
            },
            Token::StartTag(tag) if TABLE_STRUCTURE.contains(&tag.normal_name.as_str()) => {
                if !self.in_table_scope("td") && !self.in_table_scope("th") {
                    self.error(InsertionMode::InCell, token);
                    return false;
                }
                self.close_cell();
                self.process(token)
            }
            _ => self.process_in(InsertionMode::InBody, token),
        }
    }

    /// [§ 13.2.6.4.15](https://html.spec.whatwg.org/multipage/parsing.html#close-the-cell)
    ///
    /// "Close the cell"
    fn close_cell(&mut self) {
        if self.in_table_scope("td") {
            let _ = self.process_end_tag("td");
        } else {
            let _ = self.process_end_tag("th");
        }
    }

    // =========================================================================
    // Select
    // =========================================================================

    /// [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    fn in_select(&mut self, token: &Token) -> bool {
        match token {
            Token::Character { data } => {
                if data == NULL_CHARACTER {
                    self.error(InsertionMode::InSelect, token);
                    return false;
                }
                self.insert_characters(data);
                true
            }
            Token::Comment { data, .. } => {
                self.insert_comment(data);
                true
            }
            Token::Doctype { .. } => {
                self.error(InsertionMode::InSelect, token);
                false
            }
            Token::StartTag(tag) => match tag.normal_name.as_str() {
                "html" => self.process_in(InsertionMode::InBody, token),
                "option" => {
                    if self.current_is("option") {
                        let _ = self.process_end_tag("option");
                    }
                    let _ = self.insert_start_tag(tag);
                    true
                }
                "optgroup" => {
                    if self.current_is("option") {
                        let _ = self.process_end_tag("option");
                    }
                    if self.current_is("optgroup") {
                        let _ = self.process_end_tag("optgroup");
                    }
                    let _ = self.insert_start_tag(tag);
                    true
                }
                // "Parse error. If the stack of open elements does not have a
                // select element in select scope, ignore the token. Otherwise
                // ... Pop elements from the stack of open elements until a
                // select element has been popped from the stack."
                "select" => {
                    self.error(InsertionMode::InSelect, token);
                    self.process_end_tag("select")
                }
                "input" | "keygen" | "textarea" => {
                    self.error(InsertionMode::InSelect, token);
                    if !self.in_select_scope("select") {
                        return false;
                    }
                    let _ = self.process_end_tag("select");
                    self.process(token)
                }
                "script" | "template" => self.process_in(InsertionMode::InHead, token),
                _ => {
                    self.error(InsertionMode::InSelect, token);
                    false
                }
            },
            Token::EndTag(tag) => match tag.normal_name.as_str() {
                "optgroup" => {
                    if self.current_is("option")
                        && let Some(current) = self.current_element()
                        && self
                            .above_on_stack(current)
                            .is_some_and(|above| self.name_of(above) == "optgroup")
                    {
                        let _ = self.process_end_tag("option");
                    }
                    if self.current_is("optgroup") {
                        let _ = self.pop();
                        true
                    } else {
                        self.error(InsertionMode::InSelect, token);
                        false
                    }
                }
                "option" => {
                    if self.current_is("option") {
                        let _ = self.pop();
                        true
                    } else {
                        self.error(InsertionMode::InSelect, token);
                        false
                    }
                }
                "select" => {
                    if !self.in_select_scope("select") {
                        self.error(InsertionMode::InSelect, token);
                        return false;
                    }
                    self.pop_stack_to_close("select");
                    self.reset_insertion_mode();
                    true
                }
                "template" => self.process_in(InsertionMode::InHead, token),
                _ => {
                    self.error(InsertionMode::InSelect, token);
                    false
                }
            },
            Token::EndOfFile => self.process_in(InsertionMode::InBody, token),
        }
    }

    /// [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    fn in_select_in_table(&mut self, token: &Token) -> bool {
        const TABLE_TAGS: &[&str] = &[
            "caption", "table", "tbody", "td", "tfoot", "th", "thead", "tr",
        ];
        match token {
            Token::StartTag(tag) if TABLE_TAGS.contains(&tag.normal_name.as_str()) => {
                self.error(InsertionMode::InSelectInTable, token);
                self.pop_stack_to_close("select");
                self.reset_insertion_mode();
                self.process(token)
            }
            Token::EndTag(tag) if TABLE_TAGS.contains(&tag.normal_name.as_str()) => {
                self.error(InsertionMode::InSelectInTable, token);
                if !self.in_table_scope(&tag.normal_name) {
                    return false;
                }
                self.pop_stack_to_close("select");
                self.reset_insertion_mode();
                self.process(token)
            }
            _ => self.process_in(InsertionMode::InSelect, token),
        }
    }

    // =========================================================================
    // Template
    // =========================================================================

    /// [§ 13.2.6.4.18 The "in template" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intemplate)
    ///
    /// Template contents are kept as ordinary children of the `template`
    /// element; there is no separate document fragment.
    fn in_template(&mut self, token: &Token) -> bool {
        match token {
            Token::Character { .. } | Token::Comment { .. } | Token::Doctype { .. } => {
                self.process_in(InsertionMode::InBody, token)
            }
            Token::StartTag(tag) => {
                let mode = match tag.normal_name.as_str() {
                    "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script"
                    | "style" | "template" | "title" => {
                        return self.process_in(InsertionMode::InHead, token);
                    }
                    "caption" | "colgroup" | "tbody" | "tfoot" | "thead" => InsertionMode::InTable,
                    "col" => InsertionMode::InColumnGroup,
                    "tr" => InsertionMode::InTableBody,
                    "td" | "th" => InsertionMode::InRow,
                    _ => InsertionMode::InBody,
                };
                // "Pop the current template insertion mode off the stack of
                // template insertion modes. Push X onto the stack of template
                // insertion modes so that it is the new current template
                // insertion mode. Switch the insertion mode to X, and
                // reprocess the token."
                self.pop_template_mode();
                self.push_template_mode(mode);
                self.transition(mode);
                self.process(token)
            }
            Token::EndTag(tag) if tag.normal_name == "template" => {
                self.process_in(InsertionMode::InHead, token)
            }
            Token::EndTag(_) => {
                self.error(InsertionMode::InTemplate, token);
                false
            }
            Token::EndOfFile => {
                // "If there is no template element on the stack of open
                // elements, then stop parsing."
                if !self.on_stack_named("template") {
                    return true;
                }
                // "Otherwise, this is a parse error. Pop elements from the
                // stack of open elements until a template element has been
                // popped ... Reset the insertion mode appropriately.
                // Reprocess the token."
                self.error(InsertionMode::InTemplate, token);
                self.pop_stack_to_close("template");
                self.clear_formatting_elements_to_last_marker();
                self.pop_template_mode();
                self.reset_insertion_mode();
                self.process(token)
            }
        }
    }

    // =========================================================================
    // After body and framesets
    // =========================================================================

    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    fn after_body(&mut self, token: &Token) -> bool {
        match token {
            _ if is_whitespace(token) => self.process_in(InsertionMode::InBody, token),
            // "Insert a comment as the last child of the first element in
            // the stack of open elements (the html element)."
            Token::Comment { data, .. } => {
                let html = self.stack.first().copied().unwrap_or(NodeId::ROOT);
                self.append_comment(html, data);
                true
            }
            Token::Doctype { .. } => {
                self.error(InsertionMode::AfterBody, token);
                false
            }
            Token::StartTag(tag) if tag.normal_name == "html" => {
                self.process_in(InsertionMode::InBody, token)
            }
            // "If the parser was created as part of the HTML fragment parsing
            // algorithm, this is a parse error; ignore the token. Otherwise,
            // switch the insertion mode to "after after body"."
            Token::EndTag(tag) if tag.normal_name == "html" => {
                if self.fragment_parsing {
                    self.error(InsertionMode::AfterBody, token);
                    return false;
                }
                self.transition(InsertionMode::AfterAfterBody);
                true
            }
            Token::EndOfFile => true,
            // "Parse error. Switch the insertion mode to "in body" and
            // reprocess the token."
            _ => {
                self.error(InsertionMode::AfterBody, token);
                self.transition(InsertionMode::InBody);
                self.process(token)
            }
        }
    }

    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    fn in_frameset(&mut self, token: &Token) -> bool {
        match token {
            _ if is_whitespace(token) => {
                self.insert_characters_of(token);
                true
            }
            Token::Comment { data, .. } => {
                self.insert_comment(data);
                true
            }
            Token::StartTag(tag) => match tag.normal_name.as_str() {
                "html" => self.process_in(InsertionMode::InBody, token),
                "frameset" => {
                    let _ = self.insert_start_tag(tag);
                    true
                }
                "frame" => {
                    let _ = self.insert_empty(tag);
                    true
                }
                "noframes" => self.process_in(InsertionMode::InHead, token),
                _ => {
                    self.error(InsertionMode::InFrameset, token);
                    false
                }
            },
            // "If the current node is the root html element, then this is a
            // parse error; ignore the token. ... Otherwise, pop the current
            // node from the stack of open elements. If the parser was not
            // created as part of the HTML fragment parsing algorithm, and
            // the current node is no longer a frameset element, then switch
            // the insertion mode to "after frameset"."
            Token::EndTag(tag) if tag.normal_name == "frameset" => {
                if self.current_is("html") {
                    self.error(InsertionMode::InFrameset, token);
                    return false;
                }
                let _ = self.pop();
                if !self.fragment_parsing && !self.current_is("frameset") {
                    self.transition(InsertionMode::AfterFrameset);
                }
                true
            }
            Token::EndOfFile => {
                if !self.current_is("html") {
                    self.error(InsertionMode::InFrameset, token);
                }
                true
            }
            _ => {
                self.error(InsertionMode::InFrameset, token);
                false
            }
        }
    }

    /// [§ 13.2.6.4.21 The "after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    fn after_frameset(&mut self, token: &Token) -> bool {
        match token {
            _ if is_whitespace(token) => {
                self.insert_characters_of(token);
                true
            }
            Token::Comment { data, .. } => {
                self.insert_comment(data);
                true
            }
            Token::StartTag(tag) if tag.normal_name == "html" => {
                self.process_in(InsertionMode::InBody, token)
            }
            Token::StartTag(tag) if tag.normal_name == "noframes" => {
                self.process_in(InsertionMode::InHead, token)
            }
            Token::EndTag(tag) if tag.normal_name == "html" => {
                self.transition(InsertionMode::AfterAfterFrameset);
                true
            }
            Token::EndOfFile => true,
            _ => {
                self.error(InsertionMode::AfterFrameset, token);
                false
            }
        }
    }

    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    fn after_after_body(&mut self, token: &Token) -> bool {
        match token {
            // "Insert a comment as the last child of the Document object."
            Token::Comment { data, .. } => {
                self.append_comment(NodeId::ROOT, data);
                true
            }
            Token::Doctype { .. } => self.process_in(InsertionMode::InBody, token),
            _ if is_whitespace(token) => self.process_in(InsertionMode::InBody, token),
            Token::StartTag(tag) if tag.normal_name == "html" => {
                self.process_in(InsertionMode::InBody, token)
            }
            Token::EndOfFile => true,
            _ => {
                self.error(InsertionMode::AfterAfterBody, token);
                self.transition(InsertionMode::InBody);
                self.process(token)
            }
        }
    }

    /// [§ 13.2.6.4.23 The "after after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    ///
    /// Content after the frameset is discarded.
    fn after_after_frameset(&mut self, token: &Token) -> bool {
        match token {
            Token::Comment { data, .. } => {
                self.append_comment(NodeId::ROOT, data);
                true
            }
            Token::Doctype { .. } => self.process_in(InsertionMode::InBody, token),
            _ if is_whitespace(token) => self.process_in(InsertionMode::InBody, token),
            Token::StartTag(tag) if tag.normal_name == "html" => {
                self.process_in(InsertionMode::InBody, token)
            }
            Token::StartTag(tag) if tag.normal_name == "noframes" => {
                self.process_in(InsertionMode::InHead, token)
            }
            Token::EndOfFile => true,
            _ => {
                self.error(InsertionMode::AfterAfterFrameset, token);
                false
            }
        }
    }
}
