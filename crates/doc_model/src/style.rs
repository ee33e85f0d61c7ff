//! Character formatting carried by runs

use serde::{Deserialize, Serialize};

/// Direct character formatting of a run.
///
/// Every field is optional: `None` means "inherit from the paragraph style",
/// which is how the container format expresses undeclared attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterProperties {
    /// Font family name
    pub font_family: Option<String>,
    /// Font size in points
    pub font_size: Option<f32>,
    /// Bold formatting
    pub bold: Option<bool>,
    /// Italic formatting
    pub italic: Option<bool>,
    /// Underline formatting
    pub underline: Option<bool>,
    /// Text color (`#RRGGBB`)
    pub color: Option<String>,
}

impl CharacterProperties {
    /// Create new empty character properties
    pub fn new() -> Self {
        Self::default()
    }

    /// Properties declaring only a font family and optional size
    pub fn with_font(family: impl Into<String>, size: Option<f32>) -> Self {
        Self {
            font_family: Some(family.into()),
            font_size: size,
            ..Default::default()
        }
    }

    /// Merge another set of properties on top of this one
    /// Properties from `other` override properties from `self` when present
    pub fn merge(&self, other: &CharacterProperties) -> CharacterProperties {
        CharacterProperties {
            font_family: other.font_family.clone().or_else(|| self.font_family.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            italic: other.italic.or(self.italic),
            underline: other.underline.or(self.underline),
            color: other.color.clone().or_else(|| self.color.clone()),
        }
    }

    /// The declared font family, ignoring empty names
    pub fn declared_font(&self) -> Option<&str> {
        self.font_family
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Check if all properties are None
    pub fn is_empty(&self) -> bool {
        self.font_family.is_none()
            && self.font_size.is_none()
            && self.bold.is_none()
            && self.italic.is_none()
            && self.underline.is_none()
            && self.color.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_other() {
        let base = CharacterProperties::with_font("Times New Roman", Some(12.0));
        let overlay = CharacterProperties {
            font_size: Some(10.0),
            bold: Some(true),
            ..Default::default()
        };

        let merged = base.merge(&overlay);
        assert_eq!(merged.font_family.as_deref(), Some("Times New Roman"));
        assert_eq!(merged.font_size, Some(10.0));
        assert_eq!(merged.bold, Some(true));
    }

    #[test]
    fn test_declared_font_ignores_blank() {
        let props = CharacterProperties::with_font("   ", None);
        assert_eq!(props.declared_font(), None);
        assert!(CharacterProperties::new().is_empty());
        assert!(!props.is_empty());
    }
}
