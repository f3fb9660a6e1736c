//! HTML and XML parsing for the Wombat DOM.
//!
//! # Scope
//!
//! This crate implements:
//! - **Input reader** ([WHATWG § 13.2.3.5](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream))
//!   - Newline normalization, mark/rewind, bounds-checked lookahead
//!
//! - **HTML Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Data, RCDATA, RAWTEXT, script data and PLAINTEXT states
//!   - Tags and attributes, comments, CDATA sections, DOCTYPE
//!   - Named and numeric character references
//!
//! - **HTML Tree Builder** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - All insertion modes, from "initial" to "after after frameset"
//!   - Implied tags, the adoption agency algorithm, foster parenting
//!   - Form owner association, quirks mode from the DOCTYPE
//!   - Fragment parsing with a context element
//!
//! - **XML Tree Builder**: case-preserving nesting with declarations
//!
//! # Not Implemented
//!
//! - Namespaces for foreign content (`<svg>`, `<math>`)
//! - Template contents as a separate document fragment
//! - Scripting: `<noscript>` content is always parsed
//!
//! # Example
//!
//! ```
//! let tree = wombat_html::parse("<title>Hi</title><p class=intro>Hello", "");
//! let body = tree.body().expect("body is always created");
//! assert_eq!(tree.html(body), "<p class=\"intro\">Hello</p>");
//! ```

/// Parse error collection.
pub mod errors;
/// HTML parser and tree construction.
pub mod parser;
/// Character-level input cursor.
pub mod reader;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;

pub use errors::{ParseError, ParseErrorList};
pub use parser::{Fragment, HtmlTreeBuilder, InsertionMode, Parser, TreeBuilderKind, XmlTreeBuilder};
pub use tokenizer::{Token, Tokeniser, TokeniserState};
pub use wombat_dom::{DomTree, NodeId, ParseSettings};

/// Parse `html` into a document, resolving relative URLs against
/// `base_uri`.
#[must_use]
pub fn parse(html: &str, base_uri: &str) -> DomTree {
    Parser::html_parser().parse_input(html, base_uri)
}

/// Parse `input` with a configured `parser`. Errors recorded during the
/// parse are available from [`Parser::errors`] afterwards.
pub fn parse_with(input: &str, base_uri: &str, parser: &mut Parser) -> DomTree {
    parser.parse_input(input, base_uri)
}
