//! Linker configuration
//!
//! Every field has a default, so a partial JSON file only overrides what it
//! names. A missing file means "use defaults"; an unreadable one is logged and
//! also falls back to defaults.

use crate::{CiteError, Result};
use doc_model::{validate_bookmark_name, MAX_BOOKMARK_NAME_LENGTH};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Room left in a bookmark name for at least one key character and a counter
const MIN_ANCHOR_BODY: usize = 8;

/// Options controlling how references are found and how links look
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkerConfig {
    /// Literal text that marks the reference-section heading
    pub heading_marker: String,
    /// A heading paragraph must be shorter than this many characters
    pub heading_max_len: usize,
    /// Font used for rewritten runs when the paragraph declares none
    pub default_font: String,
    /// Link text color as `RRGGBB`
    pub link_color: String,
    /// Underline link text
    pub link_underline: bool,
    /// Prefix of every generated reference anchor
    pub anchor_prefix: String,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            heading_marker: "References".to_string(),
            heading_max_len: 50,
            default_font: "Calibri".to_string(),
            link_color: "0000FF".to_string(),
            link_underline: true,
            anchor_prefix: "REF_".to_string(),
        }
    }
}

impl LinkerConfig {
    /// Load configuration from a JSON file.
    ///
    /// Returns defaults when the file does not exist or cannot be parsed.
    /// Read failures on an existing file are errors.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str::<LinkerConfig>(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse config file {}, using defaults: {}",
                    path.display(),
                    e
                );
                Ok(Self::default())
            }
        }
    }

    /// Check that the options can produce a valid document
    pub fn validate(&self) -> Result<()> {
        if self.heading_marker.trim().is_empty() {
            return Err(CiteError::InvalidConfig("heading marker cannot be empty".to_string()));
        }
        if self.heading_max_len == 0 {
            return Err(CiteError::InvalidConfig("heading length limit must be positive".to_string()));
        }
        if self.anchor_prefix.len() + MIN_ANCHOR_BODY > MAX_BOOKMARK_NAME_LENGTH {
            return Err(CiteError::InvalidConfig(format!(
                "anchor prefix '{}' leaves no room for reference keys",
                self.anchor_prefix
            )));
        }
        validate_bookmark_name(&format!("{}A_0", self.anchor_prefix)).map_err(|e| {
            CiteError::InvalidConfig(format!("anchor prefix '{}': {}", self.anchor_prefix, e))
        })?;
        if self.link_color.len() != 6 || !self.link_color.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CiteError::InvalidConfig(format!(
                "link color '{}' is not an RRGGBB value",
                self.link_color
            )));
        }
        Ok(())
    }
}
