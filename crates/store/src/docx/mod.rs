//! DOCX Import/Export Module
//!
//! DOCX is based on the Office Open XML (OOXML) format defined in ECMA-376.
//! A DOCX file is a ZIP archive containing XML files:
//! - `[Content_Types].xml` - Content type definitions
//! - `_rels/.rels` - Root relationships
//! - `word/document.xml` - Main document content
//! - `word/_rels/document.xml.rels` - Document relationships
//! - styles, settings, fonts, theme, media and everything else
//!
//! Only `word/document.xml` (and its relationships, when links are added)
//! is regenerated on export. Every other part is copied through byte for
//! byte, and paragraphs whose content did not change are written back from
//! their original XML.

mod error;
mod reader;
mod content_types;
mod relationships;
mod package;
mod parser;
mod document;
mod writer;
mod document_writer;
mod api;

pub use error::{DocxError, DocxResult};
pub use api::{import_docx, export_docx, import_docx_bytes, export_docx_bytes};
pub use package::{
    BodyBlock, DocumentLayout, DocxPackage, ParagraphChange, ParagraphFingerprint, ParagraphSource,
};
pub use relationships::{Relationship, Relationships, TargetMode};
pub use content_types::ContentTypes;

/// XML namespaces used in DOCX files
pub mod namespaces {
    /// Main WordprocessingML namespace
    pub const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
    /// Relationships namespace
    pub const R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
    /// Package relationships namespace
    pub const PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
    /// Content types namespace
    pub const CT: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
}

/// Relationship types used in DOCX
pub mod relationship_types {
    pub const DOCUMENT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const HYPERLINK: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
}

/// Content types for DOCX parts
pub mod content_type_values {
    pub const DOCUMENT: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
    pub const RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
    pub const XML: &str = "application/xml";
}

/// Well-known part names
pub mod part_names {
    pub const CONTENT_TYPES: &str = "[Content_Types].xml";
    pub const ROOT_RELS: &str = "_rels/.rels";
    pub const DOCUMENT: &str = "word/document.xml";
}

/// Path of the relationships part belonging to `part`
/// (`word/document.xml` -> `word/_rels/document.xml.rels`)
pub(crate) fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rels_path_for() {
        assert_eq!(rels_path_for("word/document.xml"), "word/_rels/document.xml.rels");
        assert_eq!(rels_path_for("document.xml"), "_rels/document.xml.rels");
    }
}
