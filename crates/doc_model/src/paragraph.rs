//! Paragraph node - a block of content containing runs and hyperlinks

use crate::{Node, NodeId, NodeType};
use serde::{Deserialize, Serialize};

/// A paragraph containing inline runs and hyperlinks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paragraph {
    id: NodeId,
    parent: Option<NodeId>,
    /// IDs of inline children (runs and hyperlinks) in reading order
    children: Vec<NodeId>,
    /// Paragraph style ID reference (e.g. "Heading1")
    #[serde(default)]
    pub style_id: Option<String>,
    /// Paragraph properties exactly as loaded (indents, spacing, numbering)
    #[serde(default)]
    pub raw_properties: Option<String>,
}

impl Paragraph {
    /// Create a new empty paragraph
    pub fn new() -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            children: Vec::new(),
            style_id: None,
            raw_properties: None,
        }
    }

    /// Create a paragraph with a paragraph style ID
    pub fn with_style(style_id: impl Into<String>) -> Self {
        Self {
            style_id: Some(style_id.into()),
            ..Self::new()
        }
    }

    /// Add a child ID
    pub fn add_child(&mut self, child_id: NodeId) {
        self.children.push(child_id);
    }

    /// Insert a child at a specific index
    pub fn insert_child(&mut self, index: usize, child_id: NodeId) {
        self.children.insert(index, child_id);
    }

    /// Detach all children, returning their IDs in order
    pub(crate) fn take_children(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.children)
    }
}

impl Default for Paragraph {
    fn default() -> Self {
        Self::new()
    }
}

impl Node for Paragraph {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::Paragraph
    }

    fn children(&self) -> &[NodeId] {
        &self.children
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }
}
