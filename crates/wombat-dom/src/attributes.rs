//! Ordered element attributes.
//!
//! [§ 4.9.2 Interface Attr](https://dom.spec.whatwg.org/#interface-attr)
//!
//! "An element has an associated ordered attribute list." Source order is
//! observable (serialization, iteration), so attributes live in a `Vec`
//! rather than a hash map.

use std::fmt;
use std::slice;

/// A single attribute.
///
/// A boolean attribute (`<input checked>`) is a distinct variant from an
/// attribute with an explicit empty value (`<input checked="">`). Both read
/// back as `""`, but they serialize differently.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    key: String,
    value: Option<String>,
}

impl Attribute {
    /// Create an attribute with an explicit value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    /// Create a boolean attribute (no `=value` in the source).
    pub fn boolean(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }

    /// The attribute name.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The attribute value; `""` for boolean attributes.
    #[must_use]
    pub fn value(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    /// True for attributes written without a value.
    #[must_use]
    pub const fn is_boolean(&self) -> bool {
        self.value.is_none()
    }

    /// Replace the value. A boolean attribute becomes a valued one.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = Some(value.into());
    }

    pub(crate) fn set_key(&mut self, key: String) {
        self.key = key;
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}=\"{}\"", self.key, value),
            None => write!(f, "{}", self.key),
        }
    }
}

/// An ordered attribute list with unique keys.
#[derive(Debug, Clone, Default, Eq)]
pub struct Attributes {
    entries: Vec<Attribute>,
}

impl Attributes {
    /// An empty attribute list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The value for `key` (case-sensitive), if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attribute(key).map(Attribute::value)
    }

    /// The attribute for `key` (case-sensitive), if present.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&Attribute> {
        self.entries.iter().find(|a| a.key == key)
    }

    /// The value for `key`, comparing keys ASCII case-insensitively.
    #[must_use]
    pub fn get_ignore_case(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|a| a.key.eq_ignore_ascii_case(key))
            .map(Attribute::value)
    }

    /// True if an attribute named exactly `key` exists.
    #[must_use]
    pub fn has_key(&self, key: &str) -> bool {
        self.attribute(key).is_some()
    }

    /// True if an attribute named `key` exists, ignoring ASCII case.
    #[must_use]
    pub fn has_key_ignore_case(&self, key: &str) -> bool {
        self.entries.iter().any(|a| a.key.eq_ignore_ascii_case(key))
    }

    /// Insert or replace. A replaced attribute keeps its position.
    pub fn put(&mut self, attribute: Attribute) {
        if let Some(existing) = self.entries.iter_mut().find(|a| a.key == attribute.key) {
            *existing = attribute;
        } else {
            self.entries.push(attribute);
        }
    }

    /// Insert or replace a valued attribute.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.put(Attribute::new(key, value));
    }

    /// Insert only if no attribute with the same key exists yet.
    ///
    /// Returns `false` when the key was already present; the first
    /// occurrence wins.
    pub fn put_if_absent(&mut self, attribute: Attribute) -> bool {
        if self.has_key(&attribute.key) {
            return false;
        }
        self.entries.push(attribute);
        true
    }

    /// Remove the attribute named `key`, returning it.
    pub fn remove(&mut self, key: &str) -> Option<Attribute> {
        let index = self.entries.iter().position(|a| a.key == key)?;
        Some(self.entries.remove(index))
    }

    /// Copy every attribute of `other` into this list (replacing on key clash).
    pub fn add_all(&mut self, other: &Self) {
        for attribute in &other.entries {
            self.put(attribute.clone());
        }
    }

    /// Keys in source order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|a| a.key.as_str())
    }

    /// Attributes in source order.
    pub fn iter(&self) -> slice::Iter<'_, Attribute> {
        self.entries.iter()
    }

    /// Lowercase every key. When two keys collapse to the same name the
    /// earlier attribute is kept.
    pub fn normalize(&mut self) {
        let mut normalized: Vec<Attribute> = Vec::with_capacity(self.entries.len());
        for mut attribute in self.entries.drain(..) {
            let key = attribute.key.to_ascii_lowercase();
            if normalized.iter().any(|a| a.key == key) {
                continue;
            }
            attribute.set_key(key);
            normalized.push(attribute);
        }
        self.entries = normalized;
    }

    /// [§ 3.2.6.6 Embedding custom non-visible data](https://html.spec.whatwg.org/multipage/dom.html#embedding-custom-non-visible-data-with-the-data-*-attributes)
    ///
    /// `data-*` attributes with the prefix stripped, in source order.
    #[must_use]
    pub fn dataset(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .filter_map(|a| {
                a.key
                    .strip_prefix("data-")
                    .filter(|rest| !rest.is_empty())
                    .map(|rest| (rest, a.value()))
            })
            .collect()
    }
}

/// Equality ignores order and the boolean/empty distinction, matching how
/// formatting elements are compared for the Noah's Ark clause.
impl PartialEq for Attributes {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|a| other.get(&a.key) == Some(a.value()))
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<Attribute> for Attributes {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        let mut attributes = Self::new();
        for attribute in iter {
            attributes.put(attribute);
        }
        attributes
    }
}
