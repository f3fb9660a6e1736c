//! Unique CSS selectors for elements.

use wombat_dom::{DomTree, NodeId};

use crate::collector::collect;
use crate::query_parser::QueryParser;

/// A selector that selects exactly `element` when run from the top of its
/// tree.
///
/// Uses `#id` when the element's id selects only this element. Otherwise
/// builds `tag.class1.class2` and adds `:nth-child(n)` when that alone
/// matches more than one sibling, then prefixes the parent's path with
/// `>`. Identifiers are backslash-escaped where needed. Returns an empty
/// string for non-elements.
///
/// ```
/// use wombat_select::css_selector;
///
/// let tree = wombat_html::parse("<div><p>One</p><p>Two</p></div>", "");
/// let p = tree.descendants(tree.root())
///     .filter(|&id| tree.tag_name(id) == Some("p"))
///     .last()
///     .unwrap();
/// assert_eq!(css_selector(&tree, p), "html > body > div > p:nth-child(2)");
/// ```
#[must_use]
pub fn css_selector(tree: &DomTree, element: NodeId) -> String {
    let top = tree.ancestors(element).last().unwrap_or(element);
    let mut segments = Vec::new();
    let mut current = element;

    while let Some(data) = tree.as_element(current) {
        if let Some(id) = data.id().filter(|id| !id.is_empty()) {
            let id_selector = format!("#{}", escape_css_identifier(id));
            if selects_only(tree, top, &id_selector, current) {
                segments.push(id_selector);
                break;
            }
        }

        let mut selector = escape_css_identifier(data.normal_name());
        for class_name in data.class_names() {
            selector.push('.');
            selector.push_str(&escape_css_identifier(class_name));
        }

        let Some(parent) = tree.parent(current).filter(|&p| tree.is_element(p)) else {
            segments.push(selector);
            break;
        };
        if !selects_only(tree, parent, &format!("> {selector}"), current) {
            selector.push_str(&format!(
                ":nth-child({})",
                tree.element_sibling_index(current) + 1
            ));
        }
        segments.push(selector);
        current = parent;
    }

    segments.reverse();
    segments.join(" > ")
}

/// True if `query`, run from `root`, selects `element` and nothing else.
fn selects_only(tree: &DomTree, root: NodeId, query: &str, element: NodeId) -> bool {
    QueryParser::parse(query).is_ok_and(|evaluator| {
        let found = collect(&evaluator, tree, root);
        found.len() == 1 && found.first() == Some(element)
    })
}

/// Backslash-escape every character that cannot appear unescaped in an
/// identifier.
#[must_use]
pub fn escape_css_identifier(identifier: &str) -> String {
    let mut escaped = String::with_capacity(identifier.len());
    for c in identifier.chars() {
        if !(c.is_alphanumeric() || c == '-' || c == '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_css_identifier() {
        assert_eq!(escape_css_identifier("main-nav_2"), "main-nav_2");
        assert_eq!(escape_css_identifier("a.b"), "a\\.b");
        assert_eq!(escape_css_identifier("x:y z"), "x\\:y\\ z");
    }
}
