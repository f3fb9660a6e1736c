//! A character cursor over a selector query.
//!
//! The queue only moves forward. Matching helpers compare ASCII
//! case-insensitively, so `:NTH-CHILD(` matches `:nth-child(`.

use crate::error::SelectorParseError;

/// Escape character for selector syntax.
const ESC: char = '\\';

/// Cursor over the characters of a query.
#[derive(Debug, Clone)]
pub struct TokenQueue {
    queue: Vec<char>,
    pos: usize,
}

impl TokenQueue {
    /// Start a queue at the beginning of `data`.
    #[must_use]
    pub fn new(data: &str) -> Self {
        Self {
            queue: data.chars().collect(),
            pos: 0,
        }
    }

    /// True when every character has been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining_length() == 0
    }

    fn remaining_length(&self) -> usize {
        self.queue.len().saturating_sub(self.pos)
    }

    fn rest(&self) -> &[char] {
        self.queue.get(self.pos..).unwrap_or_default()
    }

    /// The next character, without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.rest().first().copied()
    }

    /// Put `seq` back at the front of the queue.
    pub fn add_first(&mut self, seq: &str) {
        let mut queue: Vec<char> = seq.chars().collect();
        queue.extend_from_slice(self.rest());
        self.queue = queue;
        self.pos = 0;
    }

    /// True if the queue starts with `seq`, ignoring ASCII case.
    #[must_use]
    pub fn matches(&self, seq: &str) -> bool {
        let rest = self.rest();
        let mut count = 0;
        for (index, expected) in seq.chars().enumerate() {
            match rest.get(index) {
                Some(actual) if actual.eq_ignore_ascii_case(&expected) => count += 1,
                _ => return false,
            }
        }
        count == seq.chars().count()
    }

    /// True if the queue starts with any of `seqs`.
    #[must_use]
    pub fn matches_any(&self, seqs: &[&str]) -> bool {
        seqs.iter().any(|seq| self.matches(seq))
    }

    /// True if the next character is one of `chars`.
    #[must_use]
    pub fn matches_any_char(&self, chars: &[char]) -> bool {
        self.peek().is_some_and(|c| chars.contains(&c))
    }

    /// True if the next character is whitespace.
    #[must_use]
    pub fn matches_whitespace(&self) -> bool {
        self.peek().is_some_and(char::is_whitespace)
    }

    /// True if the next character is a letter or digit.
    #[must_use]
    pub fn matches_word(&self) -> bool {
        self.peek().is_some_and(char::is_alphanumeric)
    }

    /// Consume `seq` if the queue starts with it.
    pub fn match_chomp(&mut self, seq: &str) -> bool {
        if self.matches(seq) {
            self.pos += seq.chars().count();
            true
        } else {
            false
        }
    }

    /// Drop the next character.
    pub fn advance(&mut self) {
        if !self.is_empty() {
            self.pos += 1;
        }
    }

    /// Consume and return the next character.
    pub fn consume(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Consume `seq`, which the caller has already matched.
    ///
    /// # Errors
    /// Returns [`SelectorParseError::UnexpectedSequence`] if the queue does
    /// not start with `seq`.
    pub fn consume_seq(&mut self, seq: &str) -> Result<(), SelectorParseError> {
        if self.match_chomp(seq) {
            Ok(())
        } else {
            Err(SelectorParseError::UnexpectedSequence)
        }
    }

    /// Consume up to (not including) the first occurrence of `seq`, or to
    /// the end of the queue.
    pub fn consume_to(&mut self, seq: &str) -> String {
        self.consume_to_any(&[seq])
    }

    /// Consume up to the first of `seqs` found, or to the end.
    pub fn consume_to_any(&mut self, seqs: &[&str]) -> String {
        let start = self.pos;
        while !self.is_empty() && !self.matches_any(seqs) {
            self.pos += 1;
        }
        self.queue[start..self.pos].iter().collect()
    }

    /// Consume up to `seq`, then consume `seq` and drop it.
    pub fn chomp_to(&mut self, seq: &str) -> String {
        let data = self.consume_to(seq);
        let _ = self.match_chomp(seq);
        data
    }

    /// Consume a balanced group starting at `open` and return its contents
    /// without the outer markers.
    ///
    /// Nested groups, quoted strings and backslash escapes are skipped over,
    /// as is regex quoting between `\Q` and `\E`, so
    /// `(a(b)c)` yields `a(b)c` and `(\))` yields `\)`.
    ///
    /// # Errors
    /// Returns [`SelectorParseError::UnbalancedMarker`] if the input ends
    /// before the group closes.
    pub fn chomp_balanced(&mut self, open: char, close: char) -> Result<String, SelectorParseError> {
        let mut start = None;
        let mut end = None;
        let mut depth = 0_i32;
        let mut seen_any = false;
        let mut escape_next = false;
        let mut in_single_quote = false;
        let mut in_double_quote = false;
        let mut in_regex_quote = false;

        while let Some(c) = self.consume() {
            if escape_next {
                escape_next = false;
                if c == 'Q' {
                    in_regex_quote = true;
                } else if c == 'E' {
                    in_regex_quote = false;
                }
            } else {
                if c == ESC {
                    escape_next = true;
                } else if c == '\'' && c != open && !in_double_quote {
                    in_single_quote = !in_single_quote;
                } else if c == '"' && c != open && !in_single_quote {
                    in_double_quote = !in_double_quote;
                }

                let quoted = in_single_quote || in_double_quote || in_regex_quote;
                if !quoted && c == open {
                    depth += 1;
                    if start.is_none() {
                        start = Some(self.pos);
                    }
                } else if !quoted && c == close {
                    depth -= 1;
                }
            }

            if depth > 0 && seen_any {
                end = Some(self.pos);
            }
            seen_any = true;
            if depth <= 0 {
                break;
            }
        }

        let content: String = match (start, end) {
            (Some(start), Some(end)) => self.queue[start..end].iter().collect(),
            _ => String::new(),
        };
        if depth > 0 {
            return Err(SelectorParseError::UnbalancedMarker { content });
        }
        Ok(content)
    }

    /// Remove backslash escapes: `\(` becomes `(`, `\\` becomes `\`.
    #[must_use]
    pub fn unescape(input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        let mut escaped = false;
        for c in input.chars() {
            if escaped {
                out.push(c);
                escaped = false;
            } else if c == ESC {
                escaped = true;
            } else {
                out.push(c);
            }
        }
        out
    }

    /// Consume whitespace; true if any was consumed.
    pub fn consume_whitespace(&mut self) -> bool {
        let mut seen = false;
        while self.matches_whitespace() {
            self.pos += 1;
            seen = true;
        }
        seen
    }

    /// Consume a run of letters and digits.
    pub fn consume_word(&mut self) -> String {
        let start = self.pos;
        while self.matches_word() {
            self.pos += 1;
        }
        self.queue[start..self.pos].iter().collect()
    }

    /// Consume a tag name for a type selector: letters, digits, `-`, `_`,
    /// namespace bars (`ns|tag`, `*|tag`) and backslash escapes, which are
    /// resolved.
    pub fn consume_element_selector(&mut self) -> String {
        self.consume_escaped_while(|c| c.is_alphanumeric() || matches!(c, '*' | '|' | '_' | '-'))
    }

    /// Consume an id or class name: letters, digits, `-`, `_` and backslash
    /// escapes, which are resolved.
    pub fn consume_css_identifier(&mut self) -> String {
        self.consume_escaped_while(|c| c.is_alphanumeric() || matches!(c, '_' | '-'))
    }

    fn consume_escaped_while(&mut self, accept: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c == ESC {
                let Some(&escaped) = self.rest().get(1) else {
                    break;
                };
                out.push(escaped);
                self.pos += 2;
            } else if accept(c) {
                out.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        out
    }

    /// Consume and return everything left.
    pub fn consume_to_end(&mut self) -> String {
        let rest: String = self.rest().iter().collect();
        self.pos = self.queue.len();
        rest
    }

    /// Everything left, without consuming it.
    #[must_use]
    pub fn remainder(&self) -> String {
        self.rest().iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chomp_balanced_nested() {
        let mut tq = TokenQueue::new(":has(p:not(.a)) > b");
        assert!(tq.match_chomp(":has"));
        assert_eq!(tq.chomp_balanced('(', ')').unwrap(), "p:not(.a)");
        assert_eq!(tq.remainder(), " > b");
    }

    #[test]
    fn test_chomp_balanced_skips_quotes_and_escapes() {
        let mut tq = TokenQueue::new("(one ')' two \\) three)x");
        assert_eq!(
            tq.chomp_balanced('(', ')').unwrap(),
            "one ')' two \\) three"
        );
        assert_eq!(tq.remainder(), "x");
    }

    #[test]
    fn test_chomp_balanced_regex_quote() {
        let mut tq = TokenQueue::new("(\\Q)(\\E)");
        assert_eq!(tq.chomp_balanced('(', ')').unwrap(), "\\Q)(\\E");
    }

    #[test]
    fn test_chomp_balanced_unterminated() {
        let mut tq = TokenQueue::new("[href");
        assert!(matches!(
            tq.chomp_balanced('[', ']'),
            Err(SelectorParseError::UnbalancedMarker { .. })
        ));
    }

    #[test]
    fn test_chomp_balanced_empty_group() {
        let mut tq = TokenQueue::new("()rest");
        assert_eq!(tq.chomp_balanced('(', ')').unwrap(), "");
        assert_eq!(tq.remainder(), "rest");
    }

    #[test]
    fn test_matches_ignores_case() {
        let mut tq = TokenQueue::new(":NTH-Child(2)");
        assert!(tq.matches(":nth-child("));
        assert!(tq.match_chomp(":nth-child("));
        assert_eq!(tq.chomp_to(")"), "2");
        assert!(tq.is_empty());
    }

    #[test]
    fn test_identifier_escapes() {
        let mut tq = TokenQueue::new("a\\.b\\:c.d");
        assert_eq!(tq.consume_css_identifier(), "a.b:c");
        assert_eq!(tq.peek(), Some('.'));
    }

    #[test]
    fn test_element_selector_with_namespace() {
        let mut tq = TokenQueue::new("svg|rect > b");
        assert_eq!(tq.consume_element_selector(), "svg|rect");
        assert!(tq.consume_whitespace());
        assert_eq!(tq.consume(), Some('>'));
    }

    #[test]
    fn test_unescape() {
        assert_eq!(TokenQueue::unescape("one \\(two\\) \\\\"), "one (two) \\");
    }

    #[test]
    fn test_consume_to_any() {
        let mut tq = TokenQueue::new("data-name^=x");
        assert_eq!(tq.consume_to_any(&["=", "^=", "$="]), "data-name");
        assert!(tq.match_chomp("^="));
        assert_eq!(tq.consume_to_end(), "x");
    }

    #[test]
    fn test_add_first() {
        let mut tq = TokenQueue::new("one two");
        let word = tq.consume_word();
        tq.add_first(&word);
        assert_eq!(tq.remainder(), "one two");
    }
}
