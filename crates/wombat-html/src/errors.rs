//! Parse error tracking.
//!
//! [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
//!
//! "Certain points in the parsing algorithm are said to be parse errors. The
//! error handling for parse errors is well-defined"
//!
//! Parse errors never abort parsing. They are only collected when the caller
//! opts in with a non-zero capacity, and collection stops once the list is
//! full.

use std::fmt;

/// A single recorded deviation from well-formed markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// 1-indexed offset (in characters) into the input where the error was
    /// detected.
    pub position: usize,
    /// Human-readable description.
    pub message: String,
}

impl ParseError {
    /// Create an error at `position`.
    #[must_use]
    pub fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.message)
    }
}

/// A capacity-bounded list of parse errors.
///
/// A list with capacity zero never records anything.
#[derive(Debug, Clone, Default)]
pub struct ParseErrorList {
    errors: Vec<ParseError>,
    max_size: usize,
}

impl ParseErrorList {
    /// A list that records nothing.
    #[must_use]
    pub const fn no_tracking() -> Self {
        Self {
            errors: Vec::new(),
            max_size: 0,
        }
    }

    /// A list that keeps at most `max_size` errors.
    #[must_use]
    pub const fn tracking(max_size: usize) -> Self {
        Self {
            errors: Vec::new(),
            max_size,
        }
    }

    /// True while another error may be recorded.
    #[must_use]
    pub fn can_add_error(&self) -> bool {
        self.errors.len() < self.max_size
    }

    /// True once the list holds `max_size` errors.
    #[must_use]
    pub fn is_full(&self) -> bool {
        !self.can_add_error()
    }

    /// The configured capacity.
    #[must_use]
    pub const fn max_size(&self) -> usize {
        self.max_size
    }

    /// Record `error` if there is room; otherwise drop it.
    pub fn push(&mut self, error: ParseError) {
        if self.can_add_error() {
            self.errors.push(error);
        }
    }

    /// Number of recorded errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// True when nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Recorded errors in the order they occurred.
    pub fn iter(&self) -> std::slice::Iter<'_, ParseError> {
        self.errors.iter()
    }

    /// The first recorded error.
    #[must_use]
    pub fn first(&self) -> Option<&ParseError> {
        self.errors.first()
    }
}

impl<'a> IntoIterator for &'a ParseErrorList {
    type Item = &'a ParseError;
    type IntoIter = std::slice::Iter<'a, ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_is_respected() {
        let mut list = ParseErrorList::tracking(2);
        list.push(ParseError::new(1, "one"));
        list.push(ParseError::new(2, "two"));
        assert!(list.is_full());
        list.push(ParseError::new(3, "three"));
        assert_eq!(list.len(), 2);
        assert_eq!(list.iter().last().map(|e| e.position), Some(2));
    }

    #[test]
    fn test_no_tracking_records_nothing() {
        let mut list = ParseErrorList::no_tracking();
        assert!(!list.can_add_error());
        list.push(ParseError::new(1, "ignored"));
        assert!(list.is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ParseError::new(7, "Self closing flag not acknowledged").to_string(),
            "7: Self closing flag not acknowledged"
        );
    }
}
