//! Plain file output

use crate::{Result, StoreError};
use std::path::Path;

/// Create the parent directory of `path` when it does not exist yet
pub fn ensure_parent_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Write the validation report as UTF-8 text
pub fn write_report(path: impl AsRef<Path>, text: &str) -> Result<()> {
    let path = path.as_ref();

    if path.file_name().is_none() {
        return Err(StoreError::InvalidPath(path.display().to_string()));
    }

    ensure_parent_dir(path)?;
    std::fs::write(path, text)?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "Report written");
    Ok(())
}
