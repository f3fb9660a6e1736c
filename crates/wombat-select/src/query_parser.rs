//! Recursive-descent parser from CSS selector text to an [`Evaluator`].
//!
//! [§ 3 Selector syntax](https://www.w3.org/TR/selectors-4/#syntax)
//!
//! ```text
//! selector           := combinator_selector (',' combinator_selector)*
//! combinator_selector := simple_selector (combinator simple_selector)*
//! combinator         := '>' | '+' | '~' | whitespace
//! simple_selector    := tag | '#' id | '.' class | '[' attribute ']'
//!                     | pseudo | '*'
//! ```
//!
//! Everything to the right of a combinator, up to the next combinator, is
//! parsed as its own query and combined with what was parsed so far.

use log::trace;
use regex::Regex;

use crate::error::SelectorParseError;
use crate::evaluator::{AttributeMatch, Evaluator, Nth, NthKind};
use crate::structural::Structural;
use crate::token_queue::TokenQueue;

/// Characters that end a compound selector.
const COMBINATORS: &[char] = &[',', '>', '+', '~', ' '];

/// Attribute selector operators.
const ATTRIBUTE_EVALS: &[&str] = &["=", "!=", "^=", "$=", "*=", "~="];

/// Parses one selector query.
///
/// ```
/// use wombat_select::{Evaluator, QueryParser};
///
/// let evaluator = QueryParser::parse("div.note > p").unwrap();
/// assert!(matches!(evaluator, Evaluator::And(_)));
/// assert!(QueryParser::parse("div[").is_err());
/// ```
pub struct QueryParser {
    tq: TokenQueue,
    query: String,
    evals: Vec<Evaluator>,
}

impl QueryParser {
    fn new(query: &str) -> Self {
        let query = query.trim();
        Self {
            tq: TokenQueue::new(query),
            query: query.to_string(),
            evals: Vec::new(),
        }
    }

    /// Parse a CSS selector query into an evaluator.
    ///
    /// # Errors
    /// Returns a [`SelectorParseError`] describing the first part of the
    /// query that could not be parsed.
    pub fn parse(query: &str) -> Result<Evaluator, SelectorParseError> {
        if query.trim().is_empty() {
            return Err(SelectorParseError::EmptyQuery);
        }
        let evaluator = Self::new(query).parse_query()?;
        trace!(target: "wombat::select", "parsed {query:?} into {evaluator:?}");
        Ok(evaluator)
    }

    fn parse_query(mut self) -> Result<Evaluator, SelectorParseError> {
        let _ = self.tq.consume_whitespace();

        // A leading combinator relates to the selection root: `> p` selects
        // the root's `p` children.
        if self.tq.matches_any_char(COMBINATORS) {
            self.evals.push(Structural::Root.into());
            if let Some(combinator) = self.tq.consume() {
                self.combinator(combinator)?;
            }
        } else {
            self.find_elements()?;
        }

        while !self.tq.is_empty() {
            let seen_whitespace = self.tq.consume_whitespace();
            if self.tq.matches_any_char(COMBINATORS) {
                if let Some(combinator) = self.tq.consume() {
                    self.combinator(combinator)?;
                }
            } else if seen_whitespace {
                self.combinator(' ')?;
            } else {
                self.find_elements()?;
            }
        }

        Ok(if self.evals.len() == 1 {
            self.evals.remove(0)
        } else {
            Evaluator::And(self.evals)
        })
    }

    /// Combine what has been parsed so far with the compound selector after
    /// `combinator`.
    ///
    /// When the left-hand side is a selector list, a relational combinator
    /// applies only to its last branch: `a, b > c` is `a, (b > c)`.
    fn combinator(&mut self, combinator: char) -> Result<(), SelectorParseError> {
        let _ = self.tq.consume_whitespace();
        let sub_query = self.consume_sub_query()?;
        let new_eval = Self::new(&sub_query).parse_query()?;

        let mut evals = std::mem::take(&mut self.evals);
        let root_eval = if evals.len() == 1 {
            evals.remove(0)
        } else {
            Evaluator::And(evals)
        };

        let (branches, current) = match root_eval {
            Evaluator::Or(mut branches) if combinator != ',' => match branches.pop() {
                Some(last) => (Some(branches), last),
                None => (None, Evaluator::Or(branches)),
            },
            other => (None, other),
        };

        let combined = match combinator {
            '>' => Evaluator::And(vec![
                new_eval,
                Structural::ImmediateParent(Box::new(current)).into(),
            ]),
            ' ' => Evaluator::And(vec![new_eval, Structural::Parent(Box::new(current)).into()]),
            '+' => Evaluator::And(vec![
                new_eval,
                Structural::ImmediatePreviousSibling(Box::new(current)).into(),
            ]),
            '~' => Evaluator::And(vec![
                new_eval,
                Structural::PreviousSibling(Box::new(current)).into(),
            ]),
            ',' => match current {
                Evaluator::Or(mut list) => {
                    list.push(new_eval);
                    Evaluator::Or(list)
                }
                other => Evaluator::Or(vec![other, new_eval]),
            },
            other => return Err(SelectorParseError::UnknownCombinator { combinator: other }),
        };

        self.evals.push(match branches {
            Some(mut branches) => {
                branches.push(combined);
                Evaluator::Or(branches)
            }
            None => combined,
        });
        Ok(())
    }

    /// Read up to the next combinator, keeping bracketed and parenthesized
    /// groups whole.
    fn consume_sub_query(&mut self) -> Result<String, SelectorParseError> {
        let mut sub_query = String::new();
        while !self.tq.is_empty() {
            if self.tq.matches("(") {
                sub_query.push('(');
                sub_query.push_str(&self.tq.chomp_balanced('(', ')')?);
                sub_query.push(')');
            } else if self.tq.matches("[") {
                sub_query.push('[');
                sub_query.push_str(&self.tq.chomp_balanced('[', ']')?);
                sub_query.push(']');
            } else if self.tq.matches("\\") {
                for _ in 0..2 {
                    if let Some(c) = self.tq.consume() {
                        sub_query.push(c);
                    }
                }
            } else if self.tq.matches_any_char(COMBINATORS) {
                break;
            } else if let Some(c) = self.tq.consume() {
                sub_query.push(c);
            }
        }
        Ok(sub_query)
    }

    fn find_elements(&mut self) -> Result<(), SelectorParseError> {
        let evaluator = if self.tq.match_chomp("#") {
            self.by_id()?
        } else if self.tq.match_chomp(".") {
            self.by_class()?
        } else if self.tq.matches_word() || self.tq.matches("*|") || self.tq.matches("\\") {
            self.by_tag()?
        } else if self.tq.matches("[") {
            self.by_attribute()?
        } else if self.tq.match_chomp("*") {
            Evaluator::AllElements
        } else if self.tq.match_chomp(":lt(") {
            Evaluator::IndexLessThan(self.consume_index()?)
        } else if self.tq.match_chomp(":gt(") {
            Evaluator::IndexGreaterThan(self.consume_index()?)
        } else if self.tq.match_chomp(":eq(") {
            Evaluator::IndexEquals(self.consume_index()?)
        } else if self.tq.matches(":has(") {
            self.has()?
        } else if self.tq.matches(":contains(") {
            self.contains(false)?
        } else if self.tq.matches(":containsOwn(") {
            self.contains(true)?
        } else if self.tq.matches(":containsData(") {
            self.contains_data()?
        } else if self.tq.matches(":matches(") {
            self.matches(false)?
        } else if self.tq.matches(":matchesOwn(") {
            self.matches(true)?
        } else if self.tq.matches(":not(") {
            self.not()?
        } else if self.tq.match_chomp(":nth-child(") {
            self.css_nth_child(NthKind::Child)?
        } else if self.tq.match_chomp(":nth-last-child(") {
            self.css_nth_child(NthKind::LastChild)?
        } else if self.tq.match_chomp(":nth-of-type(") {
            self.css_nth_child(NthKind::OfType)?
        } else if self.tq.match_chomp(":nth-last-of-type(") {
            self.css_nth_child(NthKind::LastOfType)?
        } else if self.tq.match_chomp(":first-child") {
            Evaluator::IsFirstChild
        } else if self.tq.match_chomp(":last-child") {
            Evaluator::IsLastChild
        } else if self.tq.match_chomp(":first-of-type") {
            Evaluator::Nth(Nth {
                kind: NthKind::OfType,
                a: 0,
                b: 1,
            })
        } else if self.tq.match_chomp(":last-of-type") {
            Evaluator::Nth(Nth {
                kind: NthKind::LastOfType,
                a: 0,
                b: 1,
            })
        } else if self.tq.match_chomp(":only-child") {
            Evaluator::IsOnlyChild
        } else if self.tq.match_chomp(":only-of-type") {
            Evaluator::IsOnlyOfType
        } else if self.tq.match_chomp(":empty") {
            Evaluator::IsEmpty
        } else if self.tq.match_chomp(":root") {
            Evaluator::IsRoot
        } else {
            return Err(SelectorParseError::UnexpectedToken {
                query: self.query.clone(),
                remainder: self.tq.remainder(),
            });
        };
        self.evals.push(evaluator);
        Ok(())
    }

    fn by_id(&mut self) -> Result<Evaluator, SelectorParseError> {
        let id = self.tq.consume_css_identifier();
        if id.is_empty() {
            return Err(SelectorParseError::EmptyIdentifier);
        }
        Ok(Evaluator::Id(id))
    }

    fn by_class(&mut self) -> Result<Evaluator, SelectorParseError> {
        let class_name = self.tq.consume_css_identifier();
        if class_name.is_empty() {
            return Err(SelectorParseError::EmptyIdentifier);
        }
        Ok(Evaluator::Class(class_name))
    }

    /// `tag`, `ns|tag` or `*|tag`.
    fn by_tag(&mut self) -> Result<Evaluator, SelectorParseError> {
        let tag_name = self.tq.consume_element_selector();
        if tag_name.trim().is_empty() {
            return Err(SelectorParseError::EmptyIdentifier);
        }
        if let Some(local_name) = tag_name.strip_prefix("*|") {
            let local_name = local_name.trim().to_lowercase();
            // Wrapped so a following combinator cannot mistake the pair for
            // a selector list.
            return Ok(Evaluator::And(vec![Evaluator::Or(vec![
                Evaluator::TagEndsWith(format!(":{local_name}")),
                Evaluator::Tag(local_name),
            ])]));
        }
        Ok(Evaluator::Tag(
            tag_name.replace('|', ":").trim().to_lowercase(),
        ))
    }

    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    fn by_attribute(&mut self) -> Result<Evaluator, SelectorParseError> {
        let content = self.tq.chomp_balanced('[', ']')?;
        let mut cq = TokenQueue::new(&content);
        let key = cq.consume_to_any(ATTRIBUTE_EVALS).trim().to_lowercase();
        if key.is_empty() {
            return Err(SelectorParseError::EmptyAttributeKey);
        }
        let _ = cq.consume_whitespace();

        if cq.is_empty() {
            return match key.strip_prefix('^') {
                Some("") => Err(SelectorParseError::EmptyAttributeKey),
                Some(prefix) => Ok(Evaluator::Attribute(AttributeMatch::KeyStarting(
                    prefix.to_string(),
                ))),
                None => Ok(Evaluator::Attribute(AttributeMatch::Has(key))),
            };
        }

        let attribute = if cq.match_chomp("=") {
            AttributeMatch::Equals {
                key,
                value: attribute_value(&cq.consume_to_end()),
            }
        } else if cq.match_chomp("!=") {
            AttributeMatch::NotEquals {
                key,
                value: attribute_value(&cq.consume_to_end()),
            }
        } else if cq.match_chomp("^=") {
            AttributeMatch::Starting {
                key,
                value: attribute_value(&cq.consume_to_end()),
            }
        } else if cq.match_chomp("$=") {
            AttributeMatch::Ending {
                key,
                value: attribute_value(&cq.consume_to_end()),
            }
        } else if cq.match_chomp("*=") {
            AttributeMatch::Containing {
                key,
                value: attribute_value(&cq.consume_to_end()),
            }
        } else if cq.match_chomp("~=") {
            AttributeMatch::Matching {
                key,
                pattern: compile(cq.consume_to_end().trim())?,
            }
        } else {
            return Err(SelectorParseError::InvalidAttribute {
                remainder: cq.remainder(),
                query: content,
            });
        };
        Ok(Evaluator::Attribute(attribute))
    }

    fn consume_index(&mut self) -> Result<usize, SelectorParseError> {
        let argument = self.tq.chomp_to(")");
        let index = argument.trim();
        if index.is_empty() || !index.chars().all(|c| c.is_ascii_digit()) {
            return Err(SelectorParseError::InvalidIndex { argument });
        }
        index
            .parse()
            .map_err(|_| SelectorParseError::InvalidIndex { argument: argument.clone() })
    }

    /// `:has(selector)`
    fn has(&mut self) -> Result<Evaluator, SelectorParseError> {
        self.tq.consume_seq(":has")?;
        let sub_query = self.tq.chomp_balanced('(', ')')?;
        if sub_query.trim().is_empty() {
            return Err(SelectorParseError::EmptySubQuery { pseudo: ":has" });
        }
        let evaluator = Self::new(&sub_query).parse_query()?;
        Ok(Structural::Has(Box::new(evaluator)).into())
    }

    /// `:not(selector)`
    fn not(&mut self) -> Result<Evaluator, SelectorParseError> {
        self.tq.consume_seq(":not")?;
        let sub_query = self.tq.chomp_balanced('(', ')')?;
        if sub_query.trim().is_empty() {
            return Err(SelectorParseError::EmptySubQuery { pseudo: ":not" });
        }
        let evaluator = Self::new(&sub_query).parse_query()?;
        Ok(Structural::Not(Box::new(evaluator)).into())
    }

    /// `:contains(text)` and `:containsOwn(text)`. An unescaped quote
    /// that is not closed makes the argument unbalanced.
    fn contains(&mut self, own: bool) -> Result<Evaluator, SelectorParseError> {
        let pseudo = if own { ":containsOwn" } else { ":contains" };
        self.tq.consume_seq(pseudo)?;
        let search_text = search_text(&self.tq.chomp_balanced('(', ')')?);
        if search_text.is_empty() {
            return Err(SelectorParseError::EmptySubQuery { pseudo });
        }
        Ok(if own {
            Evaluator::ContainsOwnText(search_text)
        } else {
            Evaluator::ContainsText(search_text)
        })
    }

    /// `:containsData(text)`
    fn contains_data(&mut self) -> Result<Evaluator, SelectorParseError> {
        self.tq.consume_seq(":containsData")?;
        let search_text = search_text(&self.tq.chomp_balanced('(', ')')?);
        if search_text.is_empty() {
            return Err(SelectorParseError::EmptySubQuery {
                pseudo: ":containsData",
            });
        }
        Ok(Evaluator::ContainsData(search_text))
    }

    /// `:matches(regex)` and `:matchesOwn(regex)`
    fn matches(&mut self, own: bool) -> Result<Evaluator, SelectorParseError> {
        let pseudo = if own { ":matchesOwn" } else { ":matches" };
        self.tq.consume_seq(pseudo)?;
        let pattern = self.tq.chomp_balanced('(', ')')?;
        if pattern.is_empty() {
            return Err(SelectorParseError::EmptySubQuery { pseudo });
        }
        let pattern = compile(&pattern)?;
        Ok(if own {
            Evaluator::MatchesOwn(pattern)
        } else {
            Evaluator::Matches(pattern)
        })
    }

    /// [§ 14.4 Child-indexed pseudo-classes](https://www.w3.org/TR/selectors-4/#child-index)
    fn css_nth_child(&mut self, kind: NthKind) -> Result<Evaluator, SelectorParseError> {
        let argument = self.tq.chomp_to(")").trim().to_lowercase();
        let (a, b) = parse_nth(&argument)?;
        Ok(Evaluator::Nth(Nth { kind, a, b }))
    }
}

/// [§ 6.1 The An+B microsyntax](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax)
///
/// Accepts `odd`, `even`, `an+b` (with optional signs, optional `a`, and
/// whitespace around the sign of `b`) and a bare integer `b`.
fn parse_nth(argument: &str) -> Result<(i32, i32), SelectorParseError> {
    let invalid = || SelectorParseError::InvalidNth {
        argument: argument.to_string(),
    };

    match argument {
        // "odd: Represents elements whose numeric index in a series is
        // odd: 1, 3, 5, etc. This is equivalent to 2n+1."
        "odd" => return Ok((2, 1)),
        // "even: ... This is equivalent to 2n."
        "even" => return Ok((2, 0)),
        _ => {}
    }

    let Some((step, offset)) = argument.split_once('n') else {
        let b = parse_integer(argument).ok_or_else(invalid)?;
        return Ok((0, b));
    };

    let a = match step {
        "" | "+" => 1,
        "-" => -1,
        step => parse_integer(step).ok_or_else(invalid)?,
    };
    let offset: String = offset.chars().filter(|c| !c.is_whitespace()).collect();
    let b = if offset.is_empty() {
        0
    } else {
        parse_integer(&offset).ok_or_else(invalid)?
    };
    Ok((a, b))
}

/// An optionally signed run of ASCII digits.
fn parse_integer(text: &str) -> Option<i32> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Trim, drop one pair of matching surrounding quotes, and lowercase.
fn attribute_value(raw: &str) -> String {
    strip_quotes(raw.trim()).to_lowercase()
}

/// The argument of a text pseudo-class: surrounding quotes dropped, escapes
/// resolved, lowercased.
fn search_text(raw: &str) -> String {
    TokenQueue::unescape(strip_quotes(raw.trim())).to_lowercase()
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2
            && let Some(inner) = value
                .strip_prefix(quote)
                .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

fn compile(pattern: &str) -> Result<Regex, SelectorParseError> {
    Regex::new(pattern).map_err(|source| SelectorParseError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nth_forms() {
        assert_eq!(parse_nth("odd").unwrap(), (2, 1));
        assert_eq!(parse_nth("even").unwrap(), (2, 0));
        assert_eq!(parse_nth("3n-1").unwrap(), (3, -1));
        assert_eq!(parse_nth("-2n+5").unwrap(), (-2, 5));
        assert_eq!(parse_nth("+3n").unwrap(), (3, 0));
        assert_eq!(parse_nth("n").unwrap(), (1, 0));
        assert_eq!(parse_nth("-n+3").unwrap(), (-1, 3));
        assert_eq!(parse_nth("2n + 1").unwrap(), (2, 1));
        assert_eq!(parse_nth("4").unwrap(), (0, 4));
        assert_eq!(parse_nth("-4").unwrap(), (0, -4));
    }

    #[test]
    fn test_parse_nth_rejects_garbage() {
        for argument in ["", "x", "2n+", "n-", "3x+1", "2 n", "++2"] {
            assert!(
                matches!(parse_nth(argument), Err(SelectorParseError::InvalidNth { .. })),
                "{argument:?} should not parse"
            );
        }
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("\"a b\""), "a b");
        assert_eq!(strip_quotes("'x'"), "x");
        assert_eq!(strip_quotes("'"), "'");
        assert_eq!(strip_quotes("'mixed\""), "'mixed\"");
    }
}
