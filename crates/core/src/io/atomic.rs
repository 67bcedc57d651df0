//! Write-then-rename for output artifacts.

use crate::error::{ExportError, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `contents` to `path` through a temporary file in the same directory.
///
/// The destination only changes once the temporary file is fully written and
/// flushed. On any error the temporary file is removed when it drops.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    std::fs::create_dir_all(dir).map_err(|e| ExportError::io(dir, e))?;

    let mut file = NamedTempFile::new_in(dir).map_err(|e| ExportError::io(dir, e))?;
    let temp_path = file.path().to_path_buf();
    file.write_all(contents)
        .map_err(|e| ExportError::io(&temp_path, e))?;
    file.flush().map_err(|e| ExportError::io(&temp_path, e))?;
    file.as_file()
        .sync_all()
        .map_err(|e| ExportError::io(&temp_path, e))?;

    file.persist(path)
        .map_err(|e| ExportError::io(path, e.error))?;

    Ok(())
}
