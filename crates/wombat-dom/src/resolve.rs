//! URL resolution against the document base URI.
//!
//! [§ 4.2.3 The base element](https://html.spec.whatwg.org/multipage/semantics.html#the-base-element)
//! [URL Standard](https://url.spec.whatwg.org/)

use url::Url;

use crate::{DomTree, NodeId};

/// [§ 2.5 URLs](https://html.spec.whatwg.org/multipage/urls-and-fetching.html#resolving-urls)
///
/// Resolve a potentially relative URL against a base URL.
///
/// # Algorithm
///
/// STEP 1: "If url is an absolute URL, return url."
///
/// STEP 2: "Otherwise, resolve url relative to base."
///
/// Returns `None` when neither step yields a valid URL (for example a
/// relative href with an empty or malformed base).
#[must_use]
pub fn resolve_url(base: &str, href: &str) -> Option<String> {
    let href = href.trim();

    // STEP 1: Already absolute.
    if let Ok(absolute) = Url::parse(href) {
        return Some(absolute.into());
    }

    // STEP 2: Join against the base. A query-only href ("?x") replaces the
    // query of the base and keeps its path, which `Url::join` already does.
    let base = Url::parse(base).ok()?;
    base.join(href).ok().map(Into::into)
}

impl DomTree {
    /// The absolute URL for the attribute `key` on element `id`.
    ///
    /// `None` if the node is not an element, the attribute is missing, or
    /// resolution fails.
    #[must_use]
    pub fn abs_url(&self, id: NodeId, key: &str) -> Option<String> {
        let value = self.as_element(id)?.attrs.get_ignore_case(key)?;
        resolve_url(self.base_uri(), value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_href_ignores_base() {
        assert_eq!(
            resolve_url("http://example.com/a/", "https://other.org/x").as_deref(),
            Some("https://other.org/x")
        );
    }

    #[test]
    fn test_relative_paths() {
        let base = "http://example.com/dir/page.html";
        assert_eq!(
            resolve_url(base, "img.png").as_deref(),
            Some("http://example.com/dir/img.png")
        );
        assert_eq!(
            resolve_url(base, "/root.png").as_deref(),
            Some("http://example.com/root.png")
        );
        assert_eq!(
            resolve_url(base, "../up.png").as_deref(),
            Some("http://example.com/up.png")
        );
        assert_eq!(
            resolve_url(base, "//cdn.example.com/x.js").as_deref(),
            Some("http://cdn.example.com/x.js")
        );
    }

    #[test]
    fn test_unresolvable() {
        assert_eq!(resolve_url("", "relative.html"), None);
        assert_eq!(resolve_url("not a url", "relative.html"), None);
    }
}
