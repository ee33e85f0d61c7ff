//! Text run node - a contiguous span of text with consistent formatting

use crate::{CharacterProperties, Node, NodeId, NodeType};
use serde::{Deserialize, Serialize};

/// A text run - contiguous text with consistent formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    id: NodeId,
    parent: Option<NodeId>,
    /// The text content of this run
    pub text: String,
    /// Character style ID reference (e.g. "Hyperlink")
    #[serde(default)]
    pub character_style_id: Option<String>,
    /// Direct formatting declared on this run
    #[serde(default)]
    pub direct_formatting: CharacterProperties,
    /// Run properties exactly as loaded, kept so untouched runs are saved
    /// with attributes the model does not interpret
    #[serde(default)]
    pub raw_properties: Option<String>,
}

impl Run {
    /// Create a new run with text content
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            text: text.into(),
            character_style_id: None,
            direct_formatting: CharacterProperties::default(),
            raw_properties: None,
        }
    }

    /// Create a new run with direct formatting
    pub fn with_direct_formatting(text: impl Into<String>, formatting: CharacterProperties) -> Self {
        Self {
            direct_formatting: formatting,
            ..Self::new(text)
        }
    }

    /// Copy of this run under a fresh id, not attached to any parent
    pub fn detached(&self) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            ..self.clone()
        }
    }

    /// Apply direct formatting to this run
    ///
    /// Any verbatim properties are dropped since they no longer describe the run.
    pub fn apply_direct_formatting(&mut self, formatting: CharacterProperties) {
        self.direct_formatting = self.direct_formatting.merge(&formatting);
        self.raw_properties = None;
    }

    /// Set the character style ID
    pub fn set_character_style(&mut self, style_id: Option<String>) {
        self.character_style_id = style_id;
    }

    /// Get the length of the text in this run (in UTF-8 bytes)
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if this run is empty
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Get the number of grapheme clusters in this run
    pub fn grapheme_count(&self) -> usize {
        use unicode_segmentation::UnicodeSegmentation;
        self.text.graphemes(true).count()
    }
}

impl Node for Run {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::Run
    }

    fn children(&self) -> &[NodeId] {
        // Runs have no children
        &[]
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    fn text_content(&self) -> Option<&str> {
        Some(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grapheme_count() {
        let run = Run::new("Cantón-López");
        assert_eq!(run.grapheme_count(), 12);
        assert!(run.len() > 12);
    }

    #[test]
    fn test_detached_copy_gets_new_id() {
        let mut run = Run::new("Lee");
        run.set_parent(Some(NodeId::new()));

        let copy = run.detached();
        assert_ne!(copy.id(), run.id());
        assert!(copy.parent().is_none());
        assert_eq!(copy.text, "Lee");
    }

    #[test]
    fn test_apply_formatting_drops_raw_properties() {
        let mut run = Run::new("Smith");
        run.raw_properties = Some("<w:rPr><w:i/></w:rPr>".to_string());

        run.apply_direct_formatting(CharacterProperties::with_font("Calibri", Some(11.0)));
        assert!(run.raw_properties.is_none());
        assert_eq!(run.direct_formatting.declared_font(), Some("Calibri"));
    }
}
