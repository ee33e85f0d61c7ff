//! Store - DOCX packages and report files
//!
//! This crate loads a manuscript from a DOCX package into a
//! [`doc_model::DocumentTree`], writes the tree back into the same package
//! (all parts the model does not interpret are carried through untouched),
//! and writes the plain-text validation report next to it.

mod error;
mod file_io;
pub mod docx;

pub use error::*;
pub use file_io::*;

// Re-export DOCX functionality
pub use docx::{
    import_docx, export_docx, import_docx_bytes, export_docx_bytes,
    DocxError, DocxPackage, DocxResult,
};
