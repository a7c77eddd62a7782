//! Atomic file replacement
//!
//! Data files are rewritten whole: the new content goes to a temporary file
//! in the same directory, is flushed to disk, and is then renamed over the
//! target. A crash leaves either the old or the new file, never a mix.

use std::io::Write;
use std::path::Path;

use crate::error::DatabaseError;

/// Replaces `path` with `contents`, creating parent directories as needed
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), DatabaseError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut file = tempfile::Builder::new()
        .prefix(".tmp-")
        .suffix(".json")
        .tempfile_in(dir)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| DatabaseError::Io(e.error))?;
    Ok(())
}

/// Reads `path`, returning `None` when it does not exist
pub fn read_optional(path: &Path) -> Result<Option<String>, DatabaseError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
