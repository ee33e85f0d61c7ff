//! Errors raised while reading or writing a DOCX package

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Malformed XML: {0}")]
    XmlParse(String),

    /// The package opened but its parts don't describe a Word document
    #[error("Not a Word document: {0}")]
    InvalidStructure(String),

    #[error("Package part not found: {0}")]
    MissingPart(String),

    #[error("Could not build document tree: {0}")]
    DocModel(#[from] doc_model::DocModelError),

    #[error("Part is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl From<quick_xml::Error> for DocxError {
    fn from(err: quick_xml::Error) -> Self {
        DocxError::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for DocxError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        DocxError::XmlParse(format!("bad attribute: {}", err))
    }
}

pub type DocxResult<T> = std::result::Result<T, DocxError>;
