//! DOCX Writer Infrastructure
//!
//! Creates ZIP archives with correct DOCX structure.

use crate::docx::content_types::create_default_content_types;
use crate::docx::document_writer::DocumentWriter;
use crate::docx::error::DocxResult;
use crate::docx::package::DocxPackage;
use crate::docx::relationships::create_root_rels;
use crate::docx::{part_names, rels_path_for};
use std::io::{Seek, Write};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Main DOCX writer
pub struct DocxWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
}

impl<W: Write + Seek> DocxWriter<W> {
    /// Create a new DOCX writer
    pub fn new(writer: W) -> Self {
        Self {
            zip: ZipWriter::new(writer),
        }
    }

    /// Write a complete DOCX file and return the underlying writer
    pub fn write(mut self, package: &DocxPackage) -> DocxResult<W> {
        let mut rels = package.relationships.clone();
        let (document_xml, added) = {
            let mut document_writer = DocumentWriter::new(&mut rels, &package.layout);
            let xml = document_writer.write(&package.tree, &package.layout)?;
            (xml, document_writer.added_relationships())
        };
        let rels_path = rels_path_for(&package.document_part);

        if package.has_source() {
            let mut wrote_rels = false;
            for (name, data) in &package.parts {
                if *name == package.document_part {
                    self.write_file(name, &document_xml)?;
                } else if *name == rels_path && added > 0 {
                    self.write_file(name, &rels.to_xml())?;
                    wrote_rels = true;
                } else {
                    self.write_binary(name, data)?;
                }
            }
            if added > 0 && !wrote_rels {
                self.write_file(&rels_path, &rels.to_xml())?;
            }
        } else {
            self.write_file(part_names::CONTENT_TYPES, &create_default_content_types().to_xml())?;
            self.write_file(part_names::ROOT_RELS, &create_root_rels().to_xml())?;
            self.write_file(&package.document_part, &document_xml)?;
            if !rels.is_empty() {
                self.write_file(&rels_path, &rels.to_xml())?;
            }
        }

        debug!(
            parts = package.parts.len(),
            new_relationships = added,
            "DOCX package written"
        );

        // Finish the ZIP archive
        Ok(self.zip.finish()?)
    }

    /// Write an XML part to the ZIP archive
    pub fn write_file(&mut self, path: &str, content: &str) -> DocxResult<()> {
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        self.zip.start_file(path, options)?;
        self.zip.write_all(content.as_bytes())?;

        Ok(())
    }

    /// Copy a part through; XML is compressed, media is stored as is
    pub fn write_binary(&mut self, path: &str, data: &[u8]) -> DocxResult<()> {
        let method = if path.ends_with(".xml") || path.ends_with(".rels") {
            zip::CompressionMethod::Deflated
        } else {
            zip::CompressionMethod::Stored
        };
        let options = SimpleFileOptions::default().compression_method(method);

        self.zip.start_file(path, options)?;
        self.zip.write_all(data)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::reader::DocxReader;
    use doc_model::{DocumentTree, Paragraph, Run};
    use std::io::Cursor;

    #[test]
    fn test_new_package_gets_minimal_parts() {
        let mut tree = DocumentTree::new();
        tree.append_paragraph(Paragraph::new(), vec![Run::new("Hello")]).unwrap();

        let cursor = DocxWriter::new(Cursor::new(Vec::new()))
            .write(&DocxPackage::new(tree))
            .unwrap();

        let mut reader = DocxReader::new(Cursor::new(cursor.into_inner())).unwrap();
        assert!(reader.is_valid_docx());
        assert!(reader.file_exists("_rels/.rels"));
        assert!(!reader.file_exists("word/_rels/document.xml.rels"));
        let document = reader.read_file_as_string("word/document.xml").unwrap();
        assert!(document.contains("<w:t>Hello</w:t>"));
    }
}
