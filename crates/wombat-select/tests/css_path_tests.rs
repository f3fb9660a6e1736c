//! Integration tests for unique selector generation.

use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use wombat_dom::{DomTree, NodeId};
use wombat_html::parse;
use wombat_select::{Select, css_selector};

/// Helper to check that every element's generated selector finds it again
fn round_trips(tree: &DomTree) -> bool {
    tree.descendants(NodeId::ROOT)
        .filter(|&id| tree.is_element(id))
        .all(|id| {
            let selector = tree.css_selector(id);
            tree.select(NodeId::ROOT, &selector)
                .is_ok_and(|found| found.len() == 1 && found.first() == Some(id))
        })
}

fn find(tree: &DomTree, query: &str) -> NodeId {
    tree.select_first(NodeId::ROOT, query)
        .ok()
        .flatten()
        .unwrap_or_else(|| panic!("nothing matched {query:?}"))
}

#[test]
fn test_unique_id_is_used_directly() {
    let tree = parse("<div><p id=intro>Hi</p></div>", "");
    assert_eq!(css_selector(&tree, find(&tree, "p")), "#intro");
}

#[test]
fn test_duplicate_id_falls_back_to_path() {
    let tree = parse("<div><p id=dup>1</p><p id=dup>2</p></div>", "");
    let second = tree.select(NodeId::ROOT, "p").unwrap().get(1).unwrap();
    assert_eq!(
        css_selector(&tree, second),
        "html > body > div > p:nth-child(2)"
    );
    assert!(round_trips(&tree));
}

#[test]
fn test_path_stops_at_ancestor_with_unique_id() {
    let tree = parse("<div id=main><ul><li>a</li><li>b</li></ul></div>", "");
    let last = tree.select(NodeId::ROOT, "li").unwrap().last().unwrap();
    assert_eq!(css_selector(&tree, last), "#main > ul > li:nth-child(2)");
}

#[test]
fn test_classes_are_included() {
    let tree = parse("<section><p class='lead big'>x</p><p>y</p></section>", "");
    assert_eq!(
        css_selector(&tree, find(&tree, "p.lead")),
        "html > body > section > p.lead.big"
    );
}

#[test]
fn test_special_characters_are_escaped() {
    let tree = parse("<div id='a.b'>x</div><p class='c:d'>y</p><p class='c:d'>z</p>", "");
    assert_eq!(css_selector(&tree, find(&tree, "div")), "#a\\.b");
    assert!(round_trips(&tree));
}

#[test]
fn test_non_element_has_no_selector() {
    let tree = parse("<p>text</p>", "");
    let p = find(&tree, "p");
    let text = tree.children(p)[0];
    assert_eq!(css_selector(&tree, text), "");
    assert_eq!(css_selector(&tree, NodeId::ROOT), "");
}

#[test]
fn test_nested_repeated_structure_round_trips() {
    let tree = parse(
        "<table><tr><td>1</td><td>2</td></tr><tr><td>3</td><td>4</td></tr></table>\
         <div><div><span>a</span></div><div><span>b</span><span>c</span></div></div>",
        "",
    );
    assert!(round_trips(&tree));
}

#[derive(Clone, Debug)]
struct Markup(String);

impl Arbitrary for Markup {
    fn arbitrary(g: &mut Gen) -> Self {
        const PIECES: &[&str] = &[
            "<p>", "</p>", "<div>", "</div>", "<span class=x>", "</span>", "<ul>", "<li>",
            "</ul>", "<b id=k>", "</b>", "<i class='x y'>", "</i>", "<a href='/x'>", "</a>",
            "<section id=s>", "</section>", "text", "<br>", "<!-- c -->",
        ];
        let count = usize::arbitrary(g) % 24;
        let mut markup = String::new();
        for _ in 0..count {
            markup.push_str(g.choose(PIECES).copied().unwrap_or_default());
        }
        Self(markup)
    }
}

#[quickcheck]
fn prop_generated_selector_selects_only_its_element(markup: Markup) -> bool {
    round_trips(&parse(&markup.0, ""))
}
