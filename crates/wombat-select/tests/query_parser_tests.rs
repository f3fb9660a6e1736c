//! Integration tests for selector query parsing.

use wombat_select::{
    AttributeMatch, Evaluator, Nth, NthKind, QueryParser, SelectorParseError, Structural,
};

fn parse(query: &str) -> Evaluator {
    QueryParser::parse(query).unwrap_or_else(|e| panic!("{query:?} failed to parse: {e}"))
}

fn parse_err(query: &str) -> SelectorParseError {
    match QueryParser::parse(query) {
        Ok(evaluator) => panic!("{query:?} parsed unexpectedly into {evaluator:?}"),
        Err(error) => error,
    }
}

#[test]
fn test_parse_type_selector() {
    assert!(matches!(parse("DIV"), Evaluator::Tag(name) if name == "div"));
}

#[test]
fn test_parse_namespaced_type_selector() {
    assert!(matches!(parse("svg|rect"), Evaluator::Tag(name) if name == "svg:rect"));
    let Evaluator::And(wrapped) = parse("*|rect") else {
        panic!("expected a wrapped alternative");
    };
    assert!(matches!(&wrapped[..], [Evaluator::Or(options)] if options.len() == 2));
}

#[test]
fn test_parse_compound_selector() {
    let Evaluator::And(parts) = parse("p.note#intro") else {
        panic!("expected a compound");
    };
    assert_eq!(parts.len(), 3);
    assert!(matches!(&parts[0], Evaluator::Tag(name) if name == "p"));
    assert!(matches!(&parts[1], Evaluator::Class(name) if name == "note"));
    assert!(matches!(&parts[2], Evaluator::Id(id) if id == "intro"));
}

#[test]
fn test_or_of_and_precedence() {
    let Evaluator::Or(branches) = parse("a b, c d, e f") else {
        panic!("expected a selector list");
    };
    assert_eq!(branches.len(), 3);
    for branch in &branches {
        let Evaluator::And(parts) = branch else {
            panic!("expected each branch to be a descendant pair, got {branch:?}");
        };
        assert_eq!(parts.len(), 2);
        assert!(matches!(parts[0], Evaluator::Tag(_)));
        assert!(matches!(
            parts[1],
            Evaluator::Structural(Structural::Parent(_))
        ));
    }
}

#[test]
fn test_combinator_after_list_binds_to_last_branch() {
    let Evaluator::Or(branches) = parse(".foo > ol, ol > li + li") else {
        panic!("expected a selector list");
    };
    assert_eq!(branches.len(), 2);
    let Evaluator::And(last) = &branches[1] else {
        panic!("expected the last branch to be a sibling pair");
    };
    assert!(matches!(&last[0], Evaluator::Tag(name) if name == "li"));
    assert!(matches!(
        &last[1],
        Evaluator::Structural(Structural::ImmediatePreviousSibling(_))
    ));
}

#[test]
fn test_leading_combinator_anchors_to_root() {
    let Evaluator::And(parts) = parse("> p") else {
        panic!("expected a child pair");
    };
    let Evaluator::Structural(Structural::ImmediateParent(parent)) = &parts[1] else {
        panic!("expected a child combinator");
    };
    assert!(matches!(
        parent.as_ref(),
        Evaluator::Structural(Structural::Root)
    ));
}

#[test]
fn test_parse_attribute_operators() {
    let cases = [
        ("[href]", "has"),
        ("[^data-]", "key-starting"),
        ("[type=Text]", "equals"),
        ("[type!=text]", "not-equals"),
        ("[href^=http]", "starting"),
        ("[src$=.png]", "ending"),
        ("[title*=x]", "containing"),
        ("[id~=^n[0-9]+$]", "matching"),
    ];
    for (query, expected) in cases {
        let Evaluator::Attribute(attribute) = parse(query) else {
            panic!("{query:?} is not an attribute selector");
        };
        let kind = match attribute {
            AttributeMatch::Has(_) => "has",
            AttributeMatch::KeyStarting(_) => "key-starting",
            AttributeMatch::Equals { .. } => "equals",
            AttributeMatch::NotEquals { .. } => "not-equals",
            AttributeMatch::Starting { .. } => "starting",
            AttributeMatch::Ending { .. } => "ending",
            AttributeMatch::Containing { .. } => "containing",
            AttributeMatch::Matching { .. } => "matching",
        };
        assert_eq!(kind, expected, "{query}");
    }
}

#[test]
fn test_attribute_value_is_unquoted_and_lowercased() {
    let Evaluator::Attribute(AttributeMatch::Equals { key, value }) = parse("[Title = \"Hello World\"]")
    else {
        panic!("expected an equality test");
    };
    assert_eq!(key, "title");
    assert_eq!(value, "hello world");
}

#[test]
fn test_parse_nth_pseudo_classes() {
    assert!(matches!(
        parse(":nth-child(3n-1)"),
        Evaluator::Nth(Nth { kind: NthKind::Child, a: 3, b: -1 })
    ));
    assert!(matches!(
        parse(":nth-last-child(odd)"),
        Evaluator::Nth(Nth { kind: NthKind::LastChild, a: 2, b: 1 })
    ));
    assert!(matches!(
        parse(":NTH-OF-TYPE(Even)"),
        Evaluator::Nth(Nth { kind: NthKind::OfType, a: 2, b: 0 })
    ));
    assert!(matches!(
        parse(":first-of-type"),
        Evaluator::Nth(Nth { kind: NthKind::OfType, a: 0, b: 1 })
    ));
}

#[test]
fn test_parse_has_and_not() {
    assert!(matches!(
        parse("div:has(p > b)"),
        Evaluator::And(ref parts) if matches!(parts[1], Evaluator::Structural(Structural::Has(_)))
    ));
    assert!(matches!(
        parse(":not(.a, .b)"),
        Evaluator::Structural(Structural::Not(ref inner)) if matches!(inner.as_ref(), Evaluator::Or(_))
    ));
}

#[test]
fn test_parse_text_pseudo_classes() {
    assert!(matches!(parse(":contains(Hello \\(World\\))"), Evaluator::ContainsText(text) if text == "hello (world)"));
    assert!(matches!(parse(":containsOwn('quoted')"), Evaluator::ContainsOwnText(text) if text == "quoted"));
    assert!(matches!(parse(":containsData(var x)"), Evaluator::ContainsData(text) if text == "var x"));
    assert!(matches!(parse(":matches(\\d+)"), Evaluator::Matches(_)));
    assert!(matches!(parse(":matchesOwn(^a)"), Evaluator::MatchesOwn(_)));
}

#[test]
fn test_parse_index_pseudo_classes() {
    assert!(matches!(parse("td:lt(3)"), Evaluator::And(ref parts) if matches!(parts[1], Evaluator::IndexLessThan(3))));
    assert!(matches!(parse(":gt( 1 )"), Evaluator::IndexGreaterThan(1)));
    assert!(matches!(parse(":eq(0)"), Evaluator::IndexEquals(0)));
}

// Errors

#[test]
fn test_empty_query() {
    assert!(matches!(parse_err(""), SelectorParseError::EmptyQuery));
    assert!(matches!(parse_err("   "), SelectorParseError::EmptyQuery));
}

#[test]
fn test_unexpected_token_reports_remainder() {
    let error = parse_err("div @ span");
    match &error {
        SelectorParseError::UnexpectedToken { query, remainder } => {
            assert_eq!(query, "@");
            assert_eq!(remainder, "@");
        }
        other => panic!("unexpected error {other:?}"),
    }

    let error = parse_err("p:hover");
    assert_eq!(
        error.to_string(),
        "Could not parse query 'p:hover': unexpected token at ':hover'"
    );
}

#[test]
fn test_unbalanced_markers() {
    assert!(matches!(
        parse_err("a[href"),
        SelectorParseError::UnbalancedMarker { .. }
    ));
    assert!(matches!(
        parse_err("div:has(p"),
        SelectorParseError::UnbalancedMarker { .. }
    ));
}

#[test]
fn test_single_quote_in_contains_is_rejected() {
    assert!(matches!(
        parse_err("p:contains(one's)"),
        SelectorParseError::UnbalancedMarker { .. }
    ));
    // Escaped, the quote is literal text.
    assert!(matches!(
        parse("p:contains(one\\'s)"),
        Evaluator::And(ref parts) if matches!(&parts[1], Evaluator::ContainsText(text) if text == "one's")
    ));
}

#[test]
fn test_attribute_errors() {
    assert!(matches!(parse_err("[]"), SelectorParseError::EmptyAttributeKey));
    assert!(matches!(parse_err("[=x]"), SelectorParseError::EmptyAttributeKey));
    assert!(matches!(
        parse_err("[id~=(]"),
        SelectorParseError::InvalidRegex { .. }
    ));
}

#[test]
fn test_empty_identifier() {
    assert!(matches!(parse_err("#"), SelectorParseError::EmptyIdentifier));
    assert!(matches!(parse_err("p."), SelectorParseError::EmptyIdentifier));
}

#[test]
fn test_empty_sub_queries() {
    assert!(matches!(
        parse_err("div:has()"),
        SelectorParseError::EmptySubQuery { pseudo: ":has" }
    ));
    assert!(matches!(
        parse_err(":not( )"),
        SelectorParseError::EmptySubQuery { pseudo: ":not" }
    ));
    assert!(matches!(
        parse_err(":contains()"),
        SelectorParseError::EmptySubQuery { pseudo: ":contains" }
    ));
    assert!(matches!(
        parse_err(":matches()"),
        SelectorParseError::EmptySubQuery { pseudo: ":matches" }
    ));
}

#[test]
fn test_bad_pseudo_arguments() {
    assert!(matches!(
        parse_err(":nth-child(3x)"),
        SelectorParseError::InvalidNth { argument } if argument == "3x"
    ));
    assert!(matches!(
        parse_err(":eq(first)"),
        SelectorParseError::InvalidIndex { .. }
    ));
    assert!(matches!(
        parse_err(":matches([)"),
        SelectorParseError::InvalidRegex { .. }
    ));
}

#[test]
fn test_trailing_combinator_is_an_error() {
    assert!(matches!(
        parse_err("div >"),
        SelectorParseError::UnexpectedToken { .. }
    ));
}
