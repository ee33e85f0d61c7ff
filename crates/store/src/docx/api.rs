//! Public API for DOCX import/export
//!
//! This module provides the main entry points for working with DOCX files.

use crate::docx::error::{DocxError, DocxResult};
use crate::docx::package::DocxPackage;
use crate::docx::parser::DocxParser;
use crate::docx::writer::DocxWriter;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Write};
use std::path::Path;

/// Import a DOCX file from disk
///
/// # Example
///
/// ```ignore
/// use store::docx::import_docx;
/// use std::path::Path;
///
/// let package = import_docx(Path::new("paper.docx"))?;
/// println!("{}", package.tree.text_content());
/// ```
pub fn import_docx(path: &Path) -> DocxResult<DocxPackage> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DocxError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path.display()),
            ))
        } else {
            DocxError::Io(e)
        }
    })?;

    DocxParser::parse(BufReader::new(file))
}

/// Export a package to a DOCX file on disk, creating parent directories
pub fn export_docx(package: &DocxPackage, path: &Path) -> DocxResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(path)?;
    let mut writer = DocxWriter::new(BufWriter::new(file)).write(package)?;
    writer.flush()?;
    Ok(())
}

/// Import a DOCX from an in-memory byte slice
pub fn import_docx_bytes(bytes: &[u8]) -> DocxResult<DocxPackage> {
    DocxParser::parse(Cursor::new(bytes))
}

/// Export a package to an in-memory byte vector
pub fn export_docx_bytes(package: &DocxPackage) -> DocxResult<Vec<u8>> {
    let cursor = DocxWriter::new(Cursor::new(Vec::new())).write(package)?;
    Ok(cursor.into_inner())
}
