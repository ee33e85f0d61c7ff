//! Main DOCX parsing logic
//!
//! Reads the package, resolves the main document part and builds the
//! DocumentTree from it.

use crate::docx::content_types::ContentTypes;
use crate::docx::document::DocumentParser;
use crate::docx::error::{DocxError, DocxResult};
use crate::docx::package::DocxPackage;
use crate::docx::reader::DocxReader;
use crate::docx::relationships::Relationships;
use crate::docx::{content_type_values, part_names, rels_path_for, relationship_types};
use doc_model::DocumentTree;
use std::io::{Read, Seek};
use tracing::{debug, warn};

/// Main parser for DOCX files
pub struct DocxParser;

impl DocxParser {
    /// Parse a DOCX file from a reader
    pub fn parse<R: Read + Seek>(reader: R) -> DocxResult<DocxPackage> {
        let mut docx = DocxReader::new(reader)?;

        // Validate it's a proper DOCX
        if !docx.is_valid_docx() {
            return Err(DocxError::InvalidStructure(
                "Missing [Content_Types].xml".to_string()
            ));
        }

        let content_types = ContentTypes::parse(&docx.read_file_as_string(part_names::CONTENT_TYPES)?)?;

        let root_rels = if docx.file_exists(part_names::ROOT_RELS) {
            Relationships::parse(&docx.read_file_as_string(part_names::ROOT_RELS)?)?
        } else {
            Relationships::new()
        };

        // Find the main document part
        let document_part = root_rels
            .get_by_type(relationship_types::DOCUMENT)
            .map(|rel| rel.target.trim_start_matches('/').to_string())
            .or_else(|| content_types.main_document_part().map(str::to_string))
            .unwrap_or_else(|| part_names::DOCUMENT.to_string());

        if !docx.file_exists(&document_part) {
            return Err(DocxError::MissingPart(document_part));
        }
        if content_types.get_content_type(&document_part).map(String::as_str) != Some(content_type_values::DOCUMENT) {
            warn!(part = %document_part, "Main document part has an unexpected content type");
        }

        let rels_path = rels_path_for(&document_part);
        let relationships = if docx.file_exists(&rels_path) {
            Relationships::parse(&docx.read_file_as_string(&rels_path)?)?
        } else {
            Relationships::new()
        };

        let document_xml = docx.read_file_as_string(&document_part)?;
        let mut tree = DocumentTree::new();
        let layout = DocumentParser::new(&relationships).parse(&document_xml, &mut tree)?;

        let parts = docx.read_all()?;
        debug!(
            part = %document_part,
            parts = parts.len(),
            relationships = relationships.len(),
            "DOCX package read"
        );

        Ok(DocxPackage {
            tree,
            parts,
            document_part,
            relationships,
            layout,
        })
    }
}
