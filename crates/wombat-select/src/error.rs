//! Selector parse errors.

use thiserror::Error;

/// A query that could not be parsed into an [`crate::Evaluator`].
///
/// Errors carry the part of the query that was left unconsumed so callers
/// can point at the offending position.
#[derive(Debug, Error)]
pub enum SelectorParseError {
    /// The query was empty or only whitespace.
    #[error("String must not be empty")]
    EmptyQuery,

    /// Nothing at the current position starts a selector.
    #[error("Could not parse query '{query}': unexpected token at '{remainder}'")]
    UnexpectedToken {
        /// The query being parsed.
        query: String,
        /// The unconsumed input.
        remainder: String,
    },

    /// A bracket, parenthesis or quote was never closed.
    #[error("Did not find balanced marker at '{content}'")]
    UnbalancedMarker {
        /// What was read before the input ran out.
        content: String,
    },

    /// An attribute selector with an operator this parser does not know.
    #[error("Could not parse attribute query '{query}': unexpected token at '{remainder}'")]
    InvalidAttribute {
        /// The bracket contents.
        query: String,
        /// The unconsumed bracket contents.
        remainder: String,
    },

    /// `[]` or `[=value]`.
    #[error("Attribute key must not be empty")]
    EmptyAttributeKey,

    /// `#`, `.` or a tag selector with no name after it.
    #[error("Identifier must not be empty")]
    EmptyIdentifier,

    /// A pseudo-class that needs an argument was given none.
    #[error("{pseudo}(...) argument must not be empty")]
    EmptySubQuery {
        /// The pseudo-class, e.g. `:has`.
        pseudo: &'static str,
    },

    /// An `an+b` argument that is not `odd`, `even`, `an+b` or an integer.
    #[error("Could not parse nth-index '{argument}': unexpected format")]
    InvalidNth {
        /// The argument as written.
        argument: String,
    },

    /// `:lt()`, `:gt()` or `:eq()` with a non-numeric argument.
    #[error("Index must be numeric, got '{argument}'")]
    InvalidIndex {
        /// The argument as written.
        argument: String,
    },

    /// A `[attr~=regex]` or `:matches()` pattern that does not compile.
    #[error("Invalid regular expression '{pattern}'")]
    InvalidRegex {
        /// The pattern as written.
        pattern: String,
        /// Why it failed to compile.
        #[source]
        source: regex::Error,
    },

    /// A combinator character outside `>`, `+`, `~`, `,` and whitespace.
    #[error("Unknown combinator '{combinator}'")]
    UnknownCombinator {
        /// The character found.
        combinator: char,
    },

    /// The queue did not start with a sequence the parser had already
    /// matched on.
    #[error("Queue did not match expected sequence")]
    UnexpectedSequence,
}
