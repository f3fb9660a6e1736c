//! Character reference decoding for the HTML tokenizer.
//!
//! [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)

use super::core::{REPLACEMENT, Tokeniser};
use super::named_character_references::{
    codepoints_for_name, is_base_named_entity, is_named_entity,
};
use crate::errors::ParseErrorList;

/// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
///
/// "If the number is one of the numbers in the first column of the following
/// table, then find the row with that number in the first column, and set
/// the character reference code to the number in the second column of that
/// row." Indexed from 0x80.
const WIN1252_EXTENSIONS: [u32; 32] = [
    0x20AC, 0x0081, 0x201A, 0x0192, 0x201E, 0x2026, 0x2020, 0x2021, 0x02C6, 0x2030, 0x0160,
    0x2039, 0x0152, 0x008D, 0x017D, 0x008F, 0x0090, 0x2018, 0x2019, 0x201C, 0x201D, 0x2022,
    0x2013, 0x2014, 0x02DC, 0x2122, 0x0161, 0x203A, 0x0153, 0x009D, 0x017E, 0x0178,
];

impl Tokeniser {
    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    ///
    /// Called with the reader positioned just after the `&`. Returns the
    /// decoded text, or `None` when the input is not a character reference,
    /// in which case nothing has been consumed and the caller emits a
    /// literal `&`.
    ///
    /// `additional_allowed` is the quote (or `>`) that ends the surrounding
    /// attribute value; `&` immediately followed by it is not a reference.
    pub(super) fn consume_character_reference(
        &mut self,
        additional_allowed: Option<char>,
        in_attribute: bool,
    ) -> Option<String> {
        if self.reader.is_empty() {
            return None;
        }
        let current = self.reader.current();
        if additional_allowed == Some(current)
            || matches!(current, '\t' | '\n' | '\r' | '\x0C' | ' ' | '<' | '&')
        {
            return None;
        }

        self.reader.mark();
        if self.reader.match_consume("#") {
            self.consume_numeric_character_reference()
        } else {
            self.consume_named_character_reference(in_attribute)
        }
    }

    /// [§ 13.2.5.75 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
    /// through [§ 13.2.5.80](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
    fn consume_numeric_character_reference(&mut self) -> Option<String> {
        // STEP 1: "U+0078 LATIN SMALL LETTER X, U+0058 LATIN CAPITAL LETTER X"
        let is_hex = self.reader.match_consume_ignore_case("x");
        let digits = if is_hex {
            self.reader.consume_hex_sequence()
        } else {
            self.reader.consume_digit_sequence()
        };

        // STEP 2: "This is an absence-of-digits-in-numeric-character-reference
        // parse error. Flush code points consumed as a character reference."
        if digits.is_empty() {
            self.character_reference_error("numeric reference with no numerals");
            self.reader.rewind_to_mark();
            return None;
        }

        // STEP 3: "This is a missing-semicolon-after-character-reference parse error."
        if !self.reader.match_consume(";") {
            self.character_reference_error(&format!("missing semicolon on [&#{digits}]"));
        }

        // STEP 4: range checks on the character reference code.
        let code = u32::from_str_radix(&digits, if is_hex { 16 } else { 10 }).ok();
        let decoded = match code {
            // "If the number is 0x00, then this is a null-character-reference parse error."
            Some(0) => {
                self.character_reference_error("character [0] is a null character");
                REPLACEMENT
            }
            // "If the number is 0x80 to 0x9F ... find the row with that number"
            Some(code @ 0x80..=0x9F) => {
                self.character_reference_error(&format!(
                    "character [{code}] is not a valid unicode code point"
                ));
                let index = (code - 0x80) as usize;
                char::from_u32(WIN1252_EXTENSIONS[index]).unwrap_or(REPLACEMENT)
            }
            // "If the number is a surrogate ... greater than 0x10FFFF"
            Some(code) => char::from_u32(code).unwrap_or_else(|| {
                self.character_reference_error(&format!(
                    "character [{code}] outside of valid range"
                ));
                REPLACEMENT
            }),
            None => {
                self.character_reference_error(&format!(
                    "character [{digits}] outside of valid range"
                ));
                REPLACEMENT
            }
        };
        Some(decoded.to_string())
    }

    /// [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
    fn consume_named_character_reference(&mut self, in_attribute: bool) -> Option<String> {
        let name = self.reader.consume_letter_then_digit_sequence();
        let looks_legit = self.reader.matches(';');

        // Legacy names are recognized without the semicolon; everything else
        // must be terminated.
        let found = is_base_named_entity(&name) || (is_named_entity(&name) && looks_legit);

        if !found {
            self.reader.rewind_to_mark();
            // "If the markup contains ... &notit; ... the character reference
            // is parsed as "not" followed by "it;"". Outside attributes the
            // longest legacy prefix still decodes.
            if !in_attribute && let Some(prefix) = longest_base_prefix(&name) {
                let _ = self.reader.match_consume(prefix);
                self.character_reference_error(&format!("missing semicolon on [&{prefix}]"));
                return Some(codepoints_for_name(prefix).into_iter().collect());
            }
            if looks_legit {
                self.character_reference_error(&format!("invalid named reference [{name}]"));
            }
            return None;
        }

        // "If the character reference was consumed as part of an attribute,
        // and the last character matched is not a U+003B SEMICOLON character
        // (;), and the next input character is either a U+003D EQUALS SIGN
        // character (=) or an ASCII alphanumeric, then, for historical
        // reasons, flush code points consumed as a character reference and
        // switch to the return state."
        if in_attribute
            && (self.reader.matches_letter()
                || self.reader.matches_digit()
                || self.reader.matches_any(&['=', '-', '_']))
        {
            self.reader.rewind_to_mark();
            return None;
        }

        if !self.reader.match_consume(";") {
            self.character_reference_error(&format!("missing semicolon on [&{name}]"));
        }
        Some(codepoints_for_name(&name).into_iter().collect())
    }

    /// Decode every character reference in the remaining input and return the
    /// result. Text that is not a reference is copied as is.
    pub fn unescape_entities(&mut self, in_attribute: bool) -> String {
        let mut builder = String::new();
        while !self.reader.is_empty() {
            builder.push_str(&self.reader.consume_to('&'));
            if self.reader.match_consume("&") {
                match self.consume_character_reference(None, in_attribute) {
                    Some(decoded) => builder.push_str(&decoded),
                    None => builder.push('&'),
                }
            }
        }
        builder
    }
}

/// The longest legacy entity name that `name` starts with.
fn longest_base_prefix(name: &str) -> Option<&str> {
    (2..name.len())
        .rev()
        .filter(|&end| name.is_char_boundary(end))
        .map(|end| &name[..end])
        .find(|prefix| is_base_named_entity(prefix))
}

/// Decode the character references in `text`.
///
/// `&amp;lt;` gives `&lt;`; `&bogus;` is left alone.
#[must_use]
pub fn unescape(text: &str, in_attribute: bool) -> String {
    let mut tokeniser = Tokeniser::new(text, ParseErrorList::no_tracking());
    tokeniser.unescape_entities(in_attribute)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_and_numeric() {
        assert_eq!(unescape("&lt;p&gt; &amp;amp; &#65;&#x42;", false), "<p> &amp; AB");
        assert_eq!(unescape("&hellip;", false), "\u{2026}");
    }

    #[test]
    fn test_legacy_name_without_semicolon() {
        assert_eq!(unescape("&copy 2024", false), "\u{a9} 2024");
        assert_eq!(unescape("&notit;", false), "\u{ac}it;");
    }

    #[test]
    fn test_attribute_rules_keep_literal() {
        assert_eq!(unescape("?a=1&copy=2", true), "?a=1&copy=2");
        assert_eq!(unescape("&notit;", true), "&notit;");
    }

    #[test]
    fn test_unknown_reference_is_literal() {
        assert_eq!(unescape("&bogus; & &#;", false), "&bogus; & &#;");
    }

    #[test]
    fn test_numeric_edge_cases() {
        assert_eq!(unescape("&#0;", false), "\u{fffd}");
        assert_eq!(unescape("&#x80;", false), "\u{20ac}");
        assert_eq!(unescape("&#xD800;", false), "\u{fffd}");
        assert_eq!(unescape("&#99999999999;", false), "\u{fffd}");
    }
}
