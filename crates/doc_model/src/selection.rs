//! Positions inside paragraphs

use crate::NodeId;
use serde::{Deserialize, Serialize};

/// A position in the document tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// The paragraph containing this position
    pub node_id: NodeId,
    /// Character offset within the paragraph (in grapheme clusters)
    pub offset: usize,
}

impl Position {
    /// Create a new position
    pub fn new(node_id: NodeId, offset: usize) -> Self {
        Self { node_id, offset }
    }

    /// Create a position at the start of a node
    pub fn start_of(node_id: NodeId) -> Self {
        Self { node_id, offset: 0 }
    }
}
