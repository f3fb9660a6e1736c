use std::fmt;

use strum_macros::IntoStaticStr;
use wombat_dom::Attributes;

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "Start and end tag tokens have a tag name, a self-closing flag, and a
/// list of attributes, each of which has a name and a value."
///
/// `name` keeps the case it had in the source; `normal_name` is its ASCII
/// lowercase form, which the tree builder dispatches on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagToken {
    /// The tag name as written.
    pub name: String,
    /// Lowercased name.
    pub normal_name: String,
    /// "a self-closing flag"
    pub self_closing: bool,
    /// "a list of attributes"
    pub attributes: Attributes,
}

impl TagToken {
    /// A tag token named `name` with no attributes.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            normal_name: name.to_ascii_lowercase(),
            self_closing: false,
            attributes: Attributes::new(),
        }
    }

    /// A tag token named `name` carrying `attributes`.
    #[must_use]
    pub fn with_attributes(name: &str, attributes: Attributes) -> Self {
        Self {
            attributes,
            ..Self::named(name)
        }
    }
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "The output of the tokenization step is a series of zero or more of the
/// following tokens: DOCTYPE, start tag, end tag, comment, character,
/// end-of-file."
///
/// Adjacent characters are coalesced into one [`Token::Character`] run.
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr)]
pub enum Token {
    /// "DOCTYPE tokens have a name, a public identifier, a system identifier,
    /// and a force-quirks flag. When a DOCTYPE token is created, its name,
    /// public identifier, and system identifier must be marked as missing
    /// (which is a distinct state from the empty string)"
    Doctype {
        /// "a name"
        name: Option<String>,
        /// "a public identifier"
        public_identifier: Option<String>,
        /// "a system identifier"
        system_identifier: Option<String>,
        /// "a force-quirks flag"
        force_quirks: bool,
    },

    /// Start tag token.
    StartTag(TagToken),

    /// End tag token. Same structure as a start tag.
    EndTag(TagToken),

    /// "Comment and character tokens have data."
    Comment {
        /// "data"
        data: String,
        /// Produced by the bogus comment state (`<?...>`, `<!...>`).
        bogus: bool,
    },

    /// A run of character data.
    Character {
        /// "data"
        data: String,
    },

    /// End-of-file token signals the end of input.
    EndOfFile,
}

impl Token {
    /// A start tag token named `name`.
    #[must_use]
    pub fn start_tag(name: &str) -> Self {
        Self::StartTag(TagToken::named(name))
    }

    /// An end tag token named `name`.
    #[must_use]
    pub fn end_tag(name: &str) -> Self {
        Self::EndTag(TagToken::named(name))
    }

    /// A character token holding `data`.
    #[must_use]
    pub fn characters(data: impl Into<String>) -> Self {
        Self::Character { data: data.into() }
    }

    /// The token's type name, as used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// True for a start tag whose lowercased name is one of `names`.
    #[must_use]
    pub fn is_start_tag_of(&self, names: &[&str]) -> bool {
        matches!(self, Self::StartTag(tag) if names.contains(&tag.normal_name.as_str()))
    }

    /// True for an end tag whose lowercased name is one of `names`.
    #[must_use]
    pub fn is_end_tag_of(&self, names: &[&str]) -> bool {
        matches!(self, Self::EndTag(tag) if names.contains(&tag.normal_name.as_str()))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doctype { name, .. } => {
                write!(f, "<!doctype {}>", name.as_deref().unwrap_or_default())
            }
            Self::StartTag(tag) => {
                write!(f, "<{}", tag.name)?;
                for attribute in &tag.attributes {
                    write!(f, " {}", attribute.key())?;
                    if !attribute.is_boolean() {
                        write!(f, "=\"{}\"", attribute.value())?;
                    }
                }
                if tag.self_closing {
                    f.write_str(" /")?;
                }
                f.write_str(">")
            }
            Self::EndTag(tag) => write!(f, "</{}>", tag.name),
            Self::Comment { data, .. } => write!(f, "<!--{data}-->"),
            Self::Character { data } => f.write_str(data),
            Self::EndOfFile => Ok(()),
        }
    }
}
