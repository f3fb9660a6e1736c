//! The tag registry.
//!
//! Every element carries a [`Tag`] describing how the parser and serializer
//! treat it: block or inline, void, whitespace-preserving, form-associated.
//! Known HTML tags live in a process-wide registry that is built on first
//! use and only changes through [`Tag::register`].

use std::collections::HashMap;
use std::sync::{LazyLock, PoisonError, RwLock};

use crate::settings::ParseSettings;

/// Tags rendered as blocks.
const BLOCK_TAGS: &[&str] = &[
    "html", "head", "body", "frameset", "script", "noscript", "style", "meta", "link", "title",
    "frame", "noframes", "section", "nav", "aside", "hgroup", "header", "footer", "p", "h1", "h2",
    "h3", "h4", "h5", "h6", "ul", "ol", "pre", "div", "blockquote", "hr", "address", "figure",
    "figcaption", "form", "fieldset", "ins", "del", "dl", "dt", "dd", "li", "table", "caption",
    "thead", "tfoot", "tbody", "colgroup", "col", "tr", "th", "td", "video", "audio", "canvas",
    "details", "menu", "plaintext", "template", "article", "main", "svg", "math", "center",
    "dir", "listing", "summary", "xmp",
];

/// Tags rendered inline.
const INLINE_TAGS: &[&str] = &[
    "object", "base", "font", "tt", "i", "b", "u", "big", "small", "em", "strong", "dfn", "code",
    "samp", "kbd", "var", "cite", "abbr", "time", "acronym", "mark", "ruby", "rt", "rp", "a",
    "img", "br", "wbr", "map", "q", "sub", "sup", "bdo", "iframe", "embed", "span", "input",
    "select", "textarea", "label", "button", "optgroup", "option", "legend", "datalist",
    "keygen", "output", "progress", "meter", "area", "param", "source", "track", "command",
    "device", "basefont", "bgsound", "menuitem", "data", "bdi", "s", "strike", "nobr", "applet",
    "marquee", "image", "isindex", "noembed",
];

/// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
///
/// Void elements: no content, no end tag.
const EMPTY_TAGS: &[&str] = &[
    "meta", "link", "base", "frame", "img", "br", "wbr", "embed", "hr", "input", "keygen", "col",
    "command", "device", "area", "basefont", "bgsound", "menuitem", "param", "source", "track",
];

/// Block tags that serialize with inline formatting.
const FORMAT_AS_INLINE_TAGS: &[&str] = &[
    "title", "a", "p", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "address", "li", "th", "td",
    "script", "style", "ins", "del", "s",
];

/// Tags whose text content keeps its whitespace.
const PRESERVE_WHITESPACE_TAGS: &[&str] = &["pre", "plaintext", "title", "textarea", "listing"];

/// Tags whose content is kept as raw data rather than text.
const DATA_TAGS: &[&str] = &["script", "style"];

/// [§ 4.10.2 Categories](https://html.spec.whatwg.org/multipage/forms.html#category-listed)
///
/// "Listed elements": associated with a form owner.
const FORM_LISTED_TAGS: &[&str] = &[
    "button", "fieldset", "input", "keygen", "object", "output", "select", "textarea",
];

/// [§ 4.10.2 Categories](https://html.spec.whatwg.org/multipage/forms.html#category-submit)
///
/// "Submittable elements".
const FORM_SUBMIT_TAGS: &[&str] = &["input", "keygen", "object", "select", "textarea"];

static REGISTRY: LazyLock<RwLock<HashMap<String, Tag>>> =
    LazyLock::new(|| RwLock::new(build_registry()));

fn build_registry() -> HashMap<String, Tag> {
    let mut tags: HashMap<String, Tag> = HashMap::new();
    for name in BLOCK_TAGS {
        let _ = tags.insert((*name).to_string(), Tag::known(name));
    }
    for name in INLINE_TAGS {
        let mut tag = Tag::known(name);
        tag.is_block = false;
        tag.format_as_block = false;
        let _ = tags.insert((*name).to_string(), tag);
    }
    for name in EMPTY_TAGS {
        if let Some(tag) = tags.get_mut(*name) {
            tag.can_contain_inline = false;
            tag.empty = true;
        }
    }
    for name in FORMAT_AS_INLINE_TAGS {
        if let Some(tag) = tags.get_mut(*name) {
            tag.format_as_block = false;
        }
    }
    for name in PRESERVE_WHITESPACE_TAGS {
        if let Some(tag) = tags.get_mut(*name) {
            tag.preserve_whitespace = true;
        }
    }
    for name in DATA_TAGS {
        if let Some(tag) = tags.get_mut(*name) {
            tag.data = true;
        }
    }
    for name in FORM_LISTED_TAGS {
        if let Some(tag) = tags.get_mut(*name) {
            tag.form_listed = true;
        }
    }
    for name in FORM_SUBMIT_TAGS {
        if let Some(tag) = tags.get_mut(*name) {
            tag.form_submittable = true;
        }
    }
    tags
}

/// An element's tag: its name plus the properties the parser and serializer
/// consult.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    name: String,
    normal_name: String,
    is_block: bool,
    format_as_block: bool,
    can_contain_inline: bool,
    empty: bool,
    self_closing: bool,
    preserve_whitespace: bool,
    data: bool,
    form_listed: bool,
    form_submittable: bool,
    known: bool,
}

impl Tag {
    fn known(name: &str) -> Self {
        Self {
            known: true,
            ..Self::new(name)
        }
    }

    /// A new, unregistered block tag with default properties.
    ///
    /// Use the setters to describe it, then [`Tag::register`] it to make
    /// [`Tag::value_of`] return it.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            normal_name: name.to_ascii_lowercase(),
            is_block: true,
            format_as_block: true,
            can_contain_inline: true,
            empty: false,
            self_closing: false,
            preserve_whitespace: false,
            data: false,
            form_listed: false,
            form_submittable: false,
            known: false,
        }
    }

    /// Look up a tag by name.
    ///
    /// The name is tried verbatim first, then normalized with `settings`.
    /// Names not in the registry produce an unknown inline tag that may go
    /// anywhere, including inside `<p>`.
    #[must_use]
    pub fn value_of(name: &str, settings: ParseSettings) -> Self {
        let registry = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(tag) = registry.get(name) {
            return tag.clone();
        }
        let normalized = settings.normalize_tag(name);
        if let Some(tag) = registry.get(&normalized) {
            return tag.clone();
        }
        // A known tag written in another case keeps its properties but
        // serializes with the preserved name.
        if let Some(tag) = registry.get(&normalized.to_ascii_lowercase()) {
            let mut tag = tag.clone();
            tag.name = normalized;
            return tag;
        }
        let mut tag = Self::new(&normalized);
        tag.is_block = false;
        tag
    }

    /// Add or replace a tag definition in the process-wide registry.
    ///
    /// Registered tags count as known from then on.
    pub fn register(mut tag: Self) {
        tag.known = true;
        let mut registry = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
        let _ = registry.insert(tag.name.clone(), tag);
    }

    /// True if `name` is in the registry.
    #[must_use]
    pub fn is_known_tag(name: &str) -> bool {
        REGISTRY
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// The tag name as it will be serialized.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The lowercased tag name, used for all HTML comparisons.
    #[must_use]
    pub fn normal_name(&self) -> &str {
        &self.normal_name
    }

    /// Block-level tag.
    #[must_use]
    pub const fn is_block(&self) -> bool {
        self.is_block
    }

    /// Inline tag (not block).
    #[must_use]
    pub const fn is_inline(&self) -> bool {
        !self.is_block
    }

    /// Block tag whose children are laid out as blocks when pretty printing.
    #[must_use]
    pub const fn format_as_block(&self) -> bool {
        self.format_as_block
    }

    /// Whether the tag may hold inline content.
    #[must_use]
    pub const fn can_contain_inline(&self) -> bool {
        self.can_contain_inline
    }

    /// Void element such as `<br>` or `<img>`.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.empty
    }

    /// Void, or an unknown tag that was written self-closing (`<foo />`).
    #[must_use]
    pub const fn is_self_closing(&self) -> bool {
        self.empty || self.self_closing
    }

    /// Holds data (script/style-like content) rather than markup.
    #[must_use]
    pub const fn is_data(&self) -> bool {
        self.data
    }

    /// Text inside keeps its whitespace.
    #[must_use]
    pub const fn preserve_whitespace(&self) -> bool {
        self.preserve_whitespace
    }

    /// Listed form control (associated with a form owner).
    #[must_use]
    pub const fn is_form_listed(&self) -> bool {
        self.form_listed
    }

    /// Submittable form control.
    #[must_use]
    pub const fn is_form_submittable(&self) -> bool {
        self.form_submittable
    }

    /// True for tags from the registry.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        self.known
    }

    /// Remember that this (unknown) tag was written self-closing, so it
    /// serializes back as `<name />`.
    pub fn set_self_closing(&mut self) {
        self.self_closing = true;
    }

    /// Mark as block or inline.
    #[must_use]
    pub fn with_block(mut self, is_block: bool) -> Self {
        self.is_block = is_block;
        self.format_as_block = is_block;
        self
    }

    /// Mark as a void element.
    #[must_use]
    pub fn with_empty(mut self) -> Self {
        self.empty = true;
        self.can_contain_inline = false;
        self
    }

    /// Mark as whitespace preserving.
    #[must_use]
    pub fn with_preserve_whitespace(mut self, preserve: bool) -> Self {
        self.preserve_whitespace = preserve;
        self
    }

    /// Mark as a listed form control.
    #[must_use]
    pub fn with_form_listed(mut self, listed: bool) -> Self {
        self.form_listed = listed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags() {
        let div = Tag::value_of("div", ParseSettings::HTML_DEFAULT);
        assert!(div.is_known());
        assert!(div.is_block());
        let br = Tag::value_of("BR", ParseSettings::HTML_DEFAULT);
        assert_eq!(br.name(), "br");
        assert!(br.is_empty());
        assert!(br.is_self_closing());
    }

    #[test]
    fn test_unknown_tag_is_inline() {
        let tag = Tag::value_of("Wombat-Burrow", ParseSettings::PRESERVE_CASE);
        assert_eq!(tag.name(), "Wombat-Burrow");
        assert_eq!(tag.normal_name(), "wombat-burrow");
        assert!(!tag.is_known());
        assert!(tag.is_inline());
    }

    #[test]
    fn test_form_categories() {
        let input = Tag::value_of("input", ParseSettings::HTML_DEFAULT);
        assert!(input.is_form_listed());
        assert!(input.is_form_submittable());
        let fieldset = Tag::value_of("fieldset", ParseSettings::HTML_DEFAULT);
        assert!(fieldset.is_form_listed());
        assert!(!fieldset.is_form_submittable());
    }
}
