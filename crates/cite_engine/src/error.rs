//! Error types for citation processing

use doc_model::DocModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CiteError {
    #[error("Document error: {0}")]
    Document(#[from] DocModelError),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CiteError>;
