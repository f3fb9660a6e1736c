//! Character-level input cursor for the tokenizer.
//!
//! [§ 13.2.3.5 Preprocessing the input stream](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream)
//!
//! "The input stream consists of the characters pushed into it as the input
//! byte stream is decoded or from the various APIs that directly manipulate
//! the input stream."
//!
//! The whole document is held in memory as a `Vec<char>`, so every lookahead
//! and bulk consumption is a bounds-checked index walk. Nothing here fails:
//! past the end every read returns [`EOF`].

/// Sentinel returned by reads at or past the end of input.
///
/// U+FFFF is a noncharacter, but it may still appear in the input; after a
/// [`CharacterReader::consume`] only [`CharacterReader::consumed_eof`] says
/// which one was read.
pub const EOF: char = '\u{FFFF}';

/// A cursor over the input's scalar values with single-slot mark/rewind.
///
/// Invariant: `0 <= pos <= input.len()`. Consuming at the end returns
/// [`EOF`] and leaves `pos` unchanged, so repeated reads are idempotent.
#[derive(Debug, Clone)]
pub struct CharacterReader {
    input: Vec<char>,
    pos: usize,
    mark: usize,
    /// The last `consume` hit the end; `unconsume` must not step back.
    consumed_eof: bool,
}

impl CharacterReader {
    /// Create a reader positioned at the start of `input`.
    ///
    /// [§ 13.2.3.5](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream)
    /// "Before the tokenization stage, the input stream must be preprocessed
    /// by normalizing newlines." CRLF pairs and lone CRs become LF.
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self {
            input: input.replace("\r\n", "\n").replace('\r', "\n").chars().collect(),
            pos: 0,
            mark: 0,
            consumed_eof: false,
        }
    }

    /// Number of scalars consumed so far.
    #[must_use]
    pub const fn pos(&self) -> usize {
        self.pos
    }

    /// True once every scalar has been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// True if the last [`Self::consume`] ran past the end.
    ///
    /// A U+FFFF read from the input leaves this false, so callers match on
    /// [`EOF`] only together with this check.
    #[must_use]
    pub const fn consumed_eof(&self) -> bool {
        self.consumed_eof
    }

    /// The next scalar without consuming it, or [`EOF`].
    #[must_use]
    pub fn current(&self) -> char {
        self.input.get(self.pos).copied().unwrap_or(EOF)
    }

    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Consume the next input character"
    pub fn consume(&mut self) -> char {
        match self.input.get(self.pos) {
            Some(&c) => {
                self.pos += 1;
                self.consumed_eof = false;
                c
            }
            None => {
                self.consumed_eof = true;
                EOF
            }
        }
    }

    /// Step back over the last consumed scalar ("reconsume").
    ///
    /// Undoing a consume that returned [`EOF`] leaves the position alone.
    pub fn unconsume(&mut self) {
        if self.consumed_eof {
            self.consumed_eof = false;
        } else {
            self.pos = self.pos.saturating_sub(1);
        }
    }

    /// Skip one scalar (no-op at the end).
    pub fn advance(&mut self) {
        if self.pos < self.input.len() {
            self.pos += 1;
        }
        self.consumed_eof = false;
    }

    /// Remember the current position for a later [`Self::rewind_to_mark`].
    pub const fn mark(&mut self) {
        self.mark = self.pos;
    }

    /// Return to the last marked position.
    pub const fn rewind_to_mark(&mut self) {
        self.pos = self.mark;
        self.consumed_eof = false;
    }

    /// Consume one scalar and return it as a string (empty at EOF).
    pub fn consume_as_string(&mut self) -> String {
        if self.is_empty() {
            return String::new();
        }
        self.consume().to_string()
    }

    /// Offset from the current position to the next `c`, if any.
    #[must_use]
    pub fn next_index_of(&self, c: char) -> Option<usize> {
        self.input[self.pos..].iter().position(|&x| x == c)
    }

    /// Offset from the current position to the next occurrence of `seq`.
    #[must_use]
    pub fn next_index_of_str(&self, seq: &str) -> Option<usize> {
        let needle: Vec<char> = seq.chars().collect();
        if needle.is_empty() {
            return Some(0);
        }
        self.input[self.pos..]
            .windows(needle.len())
            .position(|window| window == needle.as_slice())
    }

    fn take(&mut self, count: usize) -> String {
        let end = (self.pos + count).min(self.input.len());
        let out: String = self.input[self.pos..end].iter().collect();
        self.pos = end;
        self.consumed_eof = false;
        out
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let count = self.input[self.pos..]
            .iter()
            .take_while(|&&c| pred(c))
            .count();
        self.take(count)
    }

    /// Consume up to (not including) `c`, or to the end when absent.
    pub fn consume_to(&mut self, c: char) -> String {
        let count = self.next_index_of(c).unwrap_or(self.input.len() - self.pos);
        self.take(count)
    }

    /// Consume up to (not including) `seq`, or to the end when absent.
    pub fn consume_to_str(&mut self, seq: &str) -> String {
        let count = self
            .next_index_of_str(seq)
            .unwrap_or(self.input.len() - self.pos);
        self.take(count)
    }

    /// Consume until any of `chars` is next, or to the end.
    pub fn consume_to_any(&mut self, chars: &[char]) -> String {
        self.take_while(|c| !chars.contains(&c))
    }

    /// Data state bulk read: up to `&`, `<` or NUL.
    pub fn consume_data(&mut self) -> String {
        self.take_while(|c| !matches!(c, '&' | '<' | '\0'))
    }

    /// Raw text bulk read: up to `<` or NUL.
    pub fn consume_raw_data(&mut self) -> String {
        self.take_while(|c| !matches!(c, '<' | '\0'))
    }

    /// Tag name bulk read: up to whitespace, `/`, `>`, `<` or NUL.
    pub fn consume_tag_name(&mut self) -> String {
        self.take_while(|c| !matches!(c, '\t' | '\n' | '\r' | '\x0c' | ' ' | '/' | '>' | '<' | '\0'))
    }

    /// Consume everything that is left.
    pub fn consume_to_end(&mut self) -> String {
        let count = self.input.len() - self.pos;
        self.take(count)
    }

    /// Consume a run of letters.
    pub fn consume_letter_sequence(&mut self) -> String {
        self.take_while(char::is_alphabetic)
    }

    /// Consume letters followed by digits (the shape of entity names such as
    /// `frac12` or `sup2`).
    pub fn consume_letter_then_digit_sequence(&mut self) -> String {
        let letters = self.input[self.pos..]
            .iter()
            .take_while(|c| c.is_alphabetic())
            .count();
        let digits = self.input[self.pos + letters..]
            .iter()
            .take_while(|c| c.is_ascii_digit())
            .count();
        self.take(letters + digits)
    }

    /// Consume ASCII hex digits.
    pub fn consume_hex_sequence(&mut self) -> String {
        self.take_while(|c| c.is_ascii_hexdigit())
    }

    /// Consume ASCII decimal digits.
    pub fn consume_digit_sequence(&mut self) -> String {
        self.take_while(|c| c.is_ascii_digit())
    }

    /// True if the next scalar is `c`.
    #[must_use]
    pub fn matches(&self, c: char) -> bool {
        !self.is_empty() && self.current() == c
    }

    /// True if the input continues with `seq`.
    #[must_use]
    pub fn matches_str(&self, seq: &str) -> bool {
        let mut rest = self.input[self.pos..].iter();
        seq.chars().all(|c| rest.next() == Some(&c))
    }

    /// True if the input continues with `seq`, ignoring ASCII case.
    #[must_use]
    pub fn matches_ignore_case(&self, seq: &str) -> bool {
        let mut rest = self.input[self.pos..].iter();
        seq.chars()
            .all(|c| rest.next().is_some_and(|x| x.eq_ignore_ascii_case(&c)))
    }

    /// True if the next scalar is one of `chars`.
    #[must_use]
    pub fn matches_any(&self, chars: &[char]) -> bool {
        !self.is_empty() && chars.contains(&self.current())
    }

    /// True if the next scalar is a letter.
    #[must_use]
    pub fn matches_letter(&self) -> bool {
        !self.is_empty() && self.current().is_alphabetic()
    }

    /// True if the next scalar is an ASCII digit.
    #[must_use]
    pub fn matches_digit(&self) -> bool {
        !self.is_empty() && self.current().is_ascii_digit()
    }

    /// Consume `seq` if the input continues with it.
    pub fn match_consume(&mut self, seq: &str) -> bool {
        if self.matches_str(seq) {
            let _ = self.take(seq.chars().count());
            true
        } else {
            false
        }
    }

    /// Consume `seq` (ASCII case-insensitively) if the input continues with it.
    pub fn match_consume_ignore_case(&mut self, seq: &str) -> bool {
        if self.matches_ignore_case(seq) {
            let _ = self.take(seq.chars().count());
            true
        } else {
            false
        }
    }

    /// True if `seq` occurs anywhere ahead, ignoring ASCII case.
    #[must_use]
    pub fn contains_ignore_case(&self, seq: &str) -> bool {
        let needle: Vec<char> = seq.chars().collect();
        if needle.is_empty() {
            return true;
        }
        self.input[self.pos..].windows(needle.len()).any(|window| {
            window
                .iter()
                .zip(&needle)
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_past_end_is_idempotent() {
        let mut r = CharacterReader::new("ab");
        assert_eq!(r.consume(), 'a');
        assert_eq!(r.consume(), 'b');
        assert_eq!(r.consume(), EOF);
        assert_eq!(r.consume(), EOF);
        assert_eq!(r.pos(), 2);
        assert!(r.is_empty());
    }

    #[test]
    fn test_unconsume_after_eof_keeps_position() {
        let mut r = CharacterReader::new("a");
        assert_eq!(r.consume(), 'a');
        assert_eq!(r.consume(), EOF);
        r.unconsume();
        assert_eq!(r.pos(), 1);
        r.unconsume();
        assert_eq!(r.current(), 'a');
    }

    #[test]
    fn test_noncharacter_at_end_is_not_eof() {
        let mut r = CharacterReader::new("a\u{FFFF}");
        assert_eq!(r.consume(), 'a');
        assert_eq!(r.consume(), EOF);
        assert!(!r.consumed_eof());
        assert!(r.is_empty());
        assert_eq!(r.consume(), EOF);
        assert!(r.consumed_eof());
        r.unconsume();
        r.unconsume();
        assert_eq!(r.current(), '\u{FFFF}');
    }

    #[test]
    fn test_mark_and_rewind() {
        let mut r = CharacterReader::new("one two");
        r.mark();
        assert_eq!(r.consume_letter_sequence(), "one");
        r.rewind_to_mark();
        assert_eq!(r.consume_to(' '), "one");
        assert_eq!(r.current(), ' ');
    }

    #[test]
    fn test_consume_to_variants() {
        let mut r = CharacterReader::new("abc<!-- x -->rest");
        assert_eq!(r.consume_to_str("<!--"), "abc");
        assert!(r.match_consume("<!--"));
        assert_eq!(r.consume_to_str("-->"), " x ");
        assert!(r.match_consume("-->"));
        assert_eq!(r.consume_to('z'), "rest");
        assert!(r.is_empty());
    }

    #[test]
    fn test_consume_to_any_and_data() {
        let mut r = CharacterReader::new("one &amp; two<b>");
        assert_eq!(r.consume_data(), "one ");
        assert_eq!(r.consume(), '&');
        assert_eq!(r.consume_to_any(&[';', '<']), "amp");
        r.advance();
        assert_eq!(r.consume_raw_data(), " two");
    }

    #[test]
    fn test_tag_name_stops_at_delimiters() {
        let mut r = CharacterReader::new("div class=x");
        assert_eq!(r.consume_tag_name(), "div");
        let mut r = CharacterReader::new("br/>");
        assert_eq!(r.consume_tag_name(), "br");
        let mut r = CharacterReader::new("a<b");
        assert_eq!(r.consume_tag_name(), "a");
    }

    #[test]
    fn test_sequences() {
        let mut r = CharacterReader::new("frac12;x1F;99a");
        assert_eq!(r.consume_letter_then_digit_sequence(), "frac12");
        r.advance();
        r.advance();
        assert_eq!(r.consume_hex_sequence(), "1F");
        r.advance();
        assert_eq!(r.consume_digit_sequence(), "99");
        assert!(r.matches_letter());
        assert!(!r.matches_digit());
    }

    #[test]
    fn test_newlines_are_normalized() {
        let mut r = CharacterReader::new("a\r\nb\rc");
        assert_eq!(r.consume_to_end(), "a\nb\nc");
    }

    #[test]
    fn test_matching() {
        let mut r = CharacterReader::new("<!DocType html>");
        assert!(r.matches('<'));
        assert!(r.matches_any(&['>', '<']));
        r.advance();
        r.advance();
        assert!(!r.matches_str("DOCTYPE"));
        assert!(r.matches_ignore_case("DOCTYPE"));
        assert!(r.match_consume_ignore_case("doctype"));
        assert!(r.contains_ignore_case("HTML>"));
        assert!(!r.contains_ignore_case("body"));
        assert_eq!(r.next_index_of('>'), Some(5));
        assert_eq!(r.next_index_of_str("ml"), Some(3));
    }
}
