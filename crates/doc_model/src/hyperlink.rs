//! Hyperlink node - wraps text runs with link functionality

use crate::{Node, NodeId, NodeType};
use serde::{Deserialize, Serialize};

/// Target type for a hyperlink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HyperlinkTarget {
    /// External URL (web links)
    External(String),
    /// Internal document bookmark
    Internal(String),
}

impl HyperlinkTarget {
    /// Create an external URL target
    pub fn external(url: impl Into<String>) -> Self {
        HyperlinkTarget::External(url.into())
    }

    /// Create an internal bookmark target
    pub fn internal(bookmark: impl Into<String>) -> Self {
        HyperlinkTarget::Internal(bookmark.into())
    }

    /// Get the URL representation of this target
    pub fn to_url(&self) -> String {
        match self {
            HyperlinkTarget::External(url) => url.clone(),
            HyperlinkTarget::Internal(bookmark) => format!("#{}", bookmark),
        }
    }

    /// The bookmark name, if this target points inside the document
    pub fn anchor(&self) -> Option<&str> {
        match self {
            HyperlinkTarget::Internal(bookmark) => Some(bookmark),
            HyperlinkTarget::External(_) => None,
        }
    }

    /// Validate the target
    pub fn validate(&self) -> Result<(), HyperlinkValidationError> {
        match self {
            HyperlinkTarget::External(url) => {
                if url.is_empty() {
                    return Err(HyperlinkValidationError::EmptyUrl);
                }
                let lower_url = url.to_lowercase();
                if lower_url.starts_with("javascript:") ||
                   lower_url.starts_with("data:") ||
                   lower_url.starts_with("vbscript:") {
                    return Err(HyperlinkValidationError::UnsafeProtocol);
                }
                Ok(())
            }
            HyperlinkTarget::Internal(bookmark) => {
                if bookmark.is_empty() {
                    return Err(HyperlinkValidationError::EmptyBookmark);
                }
                Ok(())
            }
        }
    }
}

/// Errors that can occur during hyperlink validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HyperlinkValidationError {
    EmptyUrl,
    UnsafeProtocol,
    EmptyBookmark,
}

impl std::fmt::Display for HyperlinkValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HyperlinkValidationError::EmptyUrl => write!(f, "URL cannot be empty"),
            HyperlinkValidationError::UnsafeProtocol => write!(f, "Unsafe protocol detected"),
            HyperlinkValidationError::EmptyBookmark => write!(f, "Bookmark name cannot be empty"),
        }
    }
}

impl std::error::Error for HyperlinkValidationError {}

/// A hyperlink that wraps one or more runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hyperlink {
    id: NodeId,
    parent: Option<NodeId>,
    /// IDs of child runs (the text content of the hyperlink)
    children: Vec<NodeId>,
    /// The link target
    pub target: HyperlinkTarget,
    /// Optional tooltip text shown on hover
    pub tooltip: Option<String>,
    /// Whether following the link is added to the viewer's history
    #[serde(default)]
    pub history: bool,
}

impl Hyperlink {
    /// Create a new hyperlink with the given target
    pub fn new(target: HyperlinkTarget) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            children: Vec::new(),
            target,
            tooltip: None,
            history: false,
        }
    }

    /// Create a link to an internal bookmark that records history,
    /// the way cross-reference jumps are written
    pub fn to_bookmark(name: impl Into<String>) -> Self {
        Self {
            history: true,
            ..Self::new(HyperlinkTarget::internal(name))
        }
    }

    /// Copy of the link settings under a fresh id, without runs or parent
    pub fn detached(&self) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            children: Vec::new(),
            ..self.clone()
        }
    }

    /// Add a child run ID
    pub fn add_child(&mut self, child_id: NodeId) {
        self.children.push(child_id);
    }

    /// Validate this hyperlink
    pub fn validate(&self) -> Result<(), HyperlinkValidationError> {
        self.target.validate()
    }
}

impl Node for Hyperlink {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::Hyperlink
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
