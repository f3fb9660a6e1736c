//! Integration tests for the HTML tokenizer.

use quickcheck_macros::quickcheck;
use wombat_html::errors::ParseErrorList;
use wombat_html::tokenizer::named_character_references::{is_base_named_entity, lookup_entity};
use wombat_html::tokenizer::{TagToken, Token, Tokeniser};

/// Helper to tokenize a string and return the tokens, ending with EOF
fn tokenize(input: &str) -> Vec<Token> {
    tokenize_tracking(input, 0).0
}

/// Helper to tokenize with error tracking enabled
fn tokenize_tracking(input: &str, max_errors: usize) -> (Vec<Token>, ParseErrorList) {
    let errors = if max_errors == 0 {
        ParseErrorList::no_tracking()
    } else {
        ParseErrorList::tracking(max_errors)
    };
    let mut tokeniser = Tokeniser::new(input, errors);
    let mut tokens = Vec::new();
    loop {
        let token = tokeniser.read();
        let done = token == Token::EndOfFile;
        tokens.push(token);
        if done {
            break;
        }
    }
    (tokens, tokeniser.into_errors())
}

fn start_tag(token: &Token) -> &TagToken {
    match token {
        Token::StartTag(tag) => tag,
        other => panic!("Expected start tag, got {other:?}"),
    }
}

#[test]
fn test_plain_text_is_one_run() {
    let tokens = tokenize("Hello");
    assert_eq!(tokens, vec![Token::characters("Hello"), Token::EndOfFile]);
}

#[test]
fn test_doctype() {
    let tokens = tokenize("<!DOCTYPE html>");
    assert_eq!(tokens.len(), 2);
    match &tokens[0] {
        Token::Doctype {
            name,
            public_identifier,
            force_quirks,
            ..
        } => {
            assert_eq!(name.as_deref(), Some("html"));
            assert!(public_identifier.is_none());
            assert!(!force_quirks);
        }
        other => panic!("Expected DOCTYPE token, got {other:?}"),
    }
}

#[test]
fn test_doctype_identifiers() {
    let tokens =
        tokenize("<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01//EN\" \"http://www.w3.org/TR/html4/strict.dtd\">");
    match &tokens[0] {
        Token::Doctype {
            public_identifier,
            system_identifier,
            ..
        } => {
            assert_eq!(public_identifier.as_deref(), Some("-//W3C//DTD HTML 4.01//EN"));
            assert_eq!(
                system_identifier.as_deref(),
                Some("http://www.w3.org/TR/html4/strict.dtd")
            );
        }
        other => panic!("Expected DOCTYPE token, got {other:?}"),
    }
}

#[test]
fn test_start_tag_with_attributes() {
    let tokens = tokenize("<DIV Class=\"a\" id=b data-x='y'>");
    let tag = start_tag(&tokens[0]);
    assert_eq!(tag.name, "DIV");
    assert_eq!(tag.normal_name, "div");
    assert_eq!(tag.attributes.get("Class"), Some("a"));
    assert_eq!(tag.attributes.get("id"), Some("b"));
    assert_eq!(tag.attributes.get("data-x"), Some("y"));
    assert!(!tag.self_closing);
}

#[test]
fn test_self_closing_flag() {
    let tokens = tokenize("<br/><img src=x />");
    assert!(start_tag(&tokens[0]).self_closing);
    let img = start_tag(&tokens[1]);
    assert!(img.self_closing);
    assert_eq!(img.attributes.get("src"), Some("x"));
}

#[test]
fn test_end_tag() {
    let tokens = tokenize("</P>");
    assert_eq!(tokens[0], Token::EndTag(TagToken {
        name: String::from("P"),
        normal_name: String::from("p"),
        self_closing: false,
        attributes: wombat_dom::Attributes::new(),
    }));
}

#[test]
fn test_comment() {
    let tokens = tokenize("<!-- hi -->");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: String::from(" hi "),
            bogus: false
        }
    );
}

#[test]
fn test_question_mark_makes_bogus_comment() {
    let tokens = tokenize("<?xml version=\"1.0\"?>");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: String::from("?xml version=\"1.0\"?"),
            bogus: true
        }
    );
}

#[test]
fn test_cdata_section_is_character_data() {
    let tokens = tokenize("<![CDATA[<b>x</b>]]>");
    assert_eq!(tokens[0], Token::characters("<b>x</b>"));
}

#[test]
fn test_character_references_in_data() {
    let tokens = tokenize("&lt;&amp;&#65;&#x42;");
    assert_eq!(tokens[0], Token::characters("<&AB"));
}

#[test]
fn test_attribute_reference_exception() {
    let tokens = tokenize("<a href=\"?a=1&copy=2&amp;b\">");
    assert_eq!(start_tag(&tokens[0]).attributes.get("href"), Some("?a=1&copy=2&b"));
}

#[test]
fn test_boolean_and_empty_attributes_differ() {
    let tokens = tokenize("<input checked value=\"\">");
    let tag = start_tag(&tokens[0]);
    let checked = tag.attributes.attribute("checked").expect("checked");
    let value = tag.attributes.attribute("value").expect("value");
    assert!(checked.is_boolean());
    assert!(!value.is_boolean());
    assert_eq!(checked.value(), "");
    assert_eq!(value.value(), "");
}

#[test]
fn test_attribute_may_start_with_equals() {
    let tokens = tokenize("<a =b>");
    assert_eq!(start_tag(&tokens[0]).attributes.get("=b"), Some(""));
}

#[test]
fn test_duplicate_attribute_keeps_first() {
    let (tokens, errors) = tokenize_tracking("<a x=1 x=2>", 10);
    let tag = start_tag(&tokens[0]);
    assert_eq!(tag.attributes.len(), 1);
    assert_eq!(tag.attributes.get("x"), Some("1"));
    assert!(errors.iter().any(|e| e.message == "Dropped duplicate attribute"));
}

#[test]
fn test_unterminated_tag_is_dropped() {
    assert_eq!(tokenize("<div"), vec![Token::EndOfFile]);
    assert_eq!(tokenize("<a href=\"x"), vec![Token::EndOfFile]);
}

#[test]
fn test_nul_in_data_is_kept() {
    let tokens = tokenize("a\0b");
    assert_eq!(tokens[0], Token::characters("a\0b"));
}

#[test]
fn test_nul_in_attribute_is_replaced() {
    let tokens = tokenize("<a title=\"x\0y\">");
    assert_eq!(start_tag(&tokens[0]).attributes.get("title"), Some("x\u{fffd}y"));
}

#[test]
fn test_end_tag_attributes_are_reported() {
    let (_, errors) = tokenize_tracking("</p class=x>", 10);
    assert!(
        errors
            .iter()
            .any(|e| e.message == "Attributes incorrectly present on end tag")
    );
}

#[test]
fn test_eof_error_names_state() {
    let (_, errors) = tokenize_tracking("<!--", 10);
    assert!(
        errors
            .iter()
            .any(|e| e.message.starts_with("Unexpectedly reached end of file (EOF) in input state"))
    );
}

#[test]
fn test_error_capacity_is_respected() {
    let (_, errors) = tokenize_tracking("</a x=1></b y=2></c z=3>", 2);
    assert_eq!(errors.len(), 2);
    assert!(errors.is_full());
}

#[test]
fn test_entity_tables() {
    assert_eq!(lookup_entity("amp"), Some("&"));
    assert_eq!(lookup_entity("hellip"), Some("\u{2026}"));
    assert_eq!(lookup_entity("nosuchthing"), None);
    assert!(is_base_named_entity("copy"));
    assert!(!is_base_named_entity("hellip"));
}

#[quickcheck]
fn prop_tokenizing_terminates(input: String) -> bool {
    let limit = 2 * input.chars().count() + 2;
    let mut tokeniser = Tokeniser::new(&input, ParseErrorList::no_tracking());
    for _ in 0..limit {
        if tokeniser.read() == Token::EndOfFile {
            return tokeniser.read() == Token::EndOfFile;
        }
    }
    false
}

#[test]
fn test_trailing_noncharacter_is_input_not_eof() {
    let tokens = tokenize("<!DOCTYPE html\u{FFFF}");
    match &tokens[0] {
        Token::Doctype {
            name, force_quirks, ..
        } => {
            assert_eq!(name.as_deref(), Some("html\u{FFFF}"));
            assert!(force_quirks);
        }
        other => panic!("Expected doctype, got {other:?}"),
    }
    assert_eq!(tokens.len(), 2);

    let tokens = tokenize("a\u{FFFF}");
    assert_eq!(tokens, vec![Token::characters("a\u{FFFF}"), Token::EndOfFile]);
}
