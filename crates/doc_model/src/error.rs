//! Error types for document model operations

use crate::BookmarkValidationError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DocModelError {
    #[error("Node not found: {0}")]
    NodeNotFound(Uuid),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Bookmark error: {0}")]
    Bookmark(#[from] BookmarkValidationError),
}

pub type Result<T> = std::result::Result<T, DocModelError>;
