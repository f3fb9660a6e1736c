//! Tree construction.
//!
//! [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)

/// Tree builder state and shared algorithms.
mod core;
/// The [`Parser`] front end.
mod driver;
/// Token handlers for each insertion mode.
mod modes;
/// Tree construction for XML input.
mod xml;

pub use self::core::{HtmlTreeBuilder, InsertionMode};
pub use self::driver::{Fragment, Parser, TreeBuilderKind};
pub use self::xml::XmlTreeBuilder;
