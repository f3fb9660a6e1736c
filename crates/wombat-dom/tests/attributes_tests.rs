//! Tests for ordered attributes, parse settings and the tag registry.

use wombat_dom::{Attribute, Attributes, ParseSettings, Tag};

fn attrs(pairs: &[(&str, &str)]) -> Attributes {
    pairs.iter().map(|(k, v)| Attribute::new(*k, *v)).collect()
}

#[test]
fn test_put_replaces_in_place() {
    let mut attributes = attrs(&[("id", "1"), ("class", "a"), ("title", "t")]);
    attributes.set("class", "b");

    assert_eq!(attributes.keys().collect::<Vec<_>>(), vec!["id", "class", "title"]);
    assert_eq!(attributes.get("class"), Some("b"));
}

#[test]
fn test_put_if_absent_keeps_first() {
    let mut attributes = Attributes::new();
    assert!(attributes.put_if_absent(Attribute::new("id", "first")));
    assert!(!attributes.put_if_absent(Attribute::new("id", "second")));

    assert_eq!(attributes.len(), 1);
    assert_eq!(attributes.get("id"), Some("first"));
}

#[test]
fn test_boolean_and_empty_values_are_distinct() {
    let mut attributes = Attributes::new();
    attributes.put(Attribute::boolean("checked"));
    attributes.put(Attribute::new("value", ""));

    let checked = attributes.attribute("checked");
    let value = attributes.attribute("value");
    assert!(checked.is_some_and(Attribute::is_boolean));
    assert!(value.is_some_and(|a| !a.is_boolean()));
    assert_eq!(attributes.get("checked"), Some(""));
    assert_eq!(attributes.get("value"), Some(""));
}

#[test]
fn test_case_insensitive_lookup() {
    let attributes = attrs(&[("Data-Name", "x")]);

    assert_eq!(attributes.get("data-name"), None);
    assert_eq!(attributes.get_ignore_case("data-name"), Some("x"));
    assert!(attributes.has_key_ignore_case("DATA-NAME"));
    assert!(!attributes.has_key("DATA-NAME"));
}

#[test]
fn test_normalize_lowercases_and_dedupes() {
    let mut attributes = attrs(&[("ID", "1"), ("Class", "c"), ("id", "2")]);
    attributes.normalize();

    assert_eq!(attributes.keys().collect::<Vec<_>>(), vec!["id", "class"]);
    assert_eq!(attributes.get("id"), Some("1"));
}

#[test]
fn test_settings_normalization() {
    let mut attributes = attrs(&[("HREF", "x")]);
    ParseSettings::PRESERVE_CASE.normalize_attributes(&mut attributes);
    assert_eq!(attributes.get("HREF"), Some("x"));

    ParseSettings::HTML_DEFAULT.normalize_attributes(&mut attributes);
    assert_eq!(attributes.get("href"), Some("x"));

    assert_eq!(ParseSettings::HTML_DEFAULT.normalize_tag(" DIV "), "div");
    assert_eq!(ParseSettings::PRESERVE_CASE.normalize_tag(" DIV "), "DIV");
}

#[test]
fn test_dataset() {
    let attributes = attrs(&[("data-name", "wombat"), ("class", "x"), ("data-", "skip"), ("data-id", "4")]);
    assert_eq!(attributes.dataset(), vec![("name", "wombat"), ("id", "4")]);
}

#[test]
fn test_equality_ignores_order() {
    let left = attrs(&[("a", "1"), ("b", "2")]);
    let right = attrs(&[("b", "2"), ("a", "1")]);
    let different = attrs(&[("a", "1"), ("b", "3")]);

    assert_eq!(left, right);
    assert_ne!(left, different);
}

#[test]
fn test_remove_and_add_all() {
    let mut attributes = attrs(&[("a", "1"), ("b", "2")]);
    let removed = attributes.remove("a");
    assert_eq!(removed.as_ref().map(Attribute::value), Some("1"));

    attributes.add_all(&attrs(&[("b", "9"), ("c", "3")]));
    assert_eq!(attributes.keys().collect::<Vec<_>>(), vec!["b", "c"]);
    assert_eq!(attributes.get("b"), Some("9"));
}

#[test]
fn test_register_custom_tag() {
    Tag::register(Tag::new("wombat-widget").with_block(true).with_preserve_whitespace(true));

    let tag = Tag::value_of("wombat-widget", ParseSettings::HTML_DEFAULT);
    assert!(tag.is_known());
    assert!(tag.is_block());
    assert!(tag.preserve_whitespace());
    assert!(Tag::is_known_tag("wombat-widget"));
}
