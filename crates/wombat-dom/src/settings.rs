//! Name normalization settings shared by the tree builders.
//!
//! HTML is case-insensitive for tag and attribute names, so the HTML tree
//! builder lowercases both. XML keeps names exactly as written.

use crate::attributes::Attributes;

/// Controls whether tag and attribute names are lowercased during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseSettings {
    preserve_tag_case: bool,
    preserve_attribute_case: bool,
}

impl ParseSettings {
    /// HTML defaults: tag and attribute names are lowercased.
    pub const HTML_DEFAULT: Self = Self::new(false, false);

    /// XML defaults: tag and attribute names keep their case.
    pub const PRESERVE_CASE: Self = Self::new(true, true);

    /// Create settings with explicit case preservation for tags and attributes.
    #[must_use]
    pub const fn new(preserve_tag_case: bool, preserve_attribute_case: bool) -> Self {
        Self {
            preserve_tag_case,
            preserve_attribute_case,
        }
    }

    /// Whether tag names keep their original case.
    #[must_use]
    pub const fn preserve_tag_case(&self) -> bool {
        self.preserve_tag_case
    }

    /// Whether attribute names keep their original case.
    #[must_use]
    pub const fn preserve_attribute_case(&self) -> bool {
        self.preserve_attribute_case
    }

    /// Trim the tag name and lowercase it unless tag case is preserved.
    #[must_use]
    pub fn normalize_tag(&self, name: &str) -> String {
        let name = name.trim();
        if self.preserve_tag_case {
            name.to_string()
        } else {
            name.to_ascii_lowercase()
        }
    }

    /// Trim the attribute name and lowercase it unless attribute case is preserved.
    #[must_use]
    pub fn normalize_attribute(&self, name: &str) -> String {
        let name = name.trim();
        if self.preserve_attribute_case {
            name.to_string()
        } else {
            name.to_ascii_lowercase()
        }
    }

    /// Lowercase every attribute key in place unless attribute case is preserved.
    pub fn normalize_attributes(&self, attributes: &mut Attributes) {
        if !self.preserve_attribute_case {
            attributes.normalize();
        }
    }
}

impl Default for ParseSettings {
    fn default() -> Self {
        Self::HTML_DEFAULT
    }
}
