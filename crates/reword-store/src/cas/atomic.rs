//! Atomic write primitives
//!
//! Writes go to a uniquely named temp file in the target directory, which
//! is then renamed over the target. Readers never see a partial blob.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::errors::{io_error, Result};

/// Atomically write bytes to a file
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    let parent = target_path
        .parent()
        .ok_or_else(|| io_error("create_cas_dir", std::io::ErrorKind::InvalidInput.into()))?;
    fs::create_dir_all(parent).map_err(|e| io_error("create_cas_dir", e))?;

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| io_error("create_cas_temp", e))?;
    temp.write_all(content)
        .map_err(|e| io_error("write_cas_temp", e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| io_error("sync_cas_temp", e))?;

    temp.persist(target_path)
        .map_err(|e| io_error("rename_cas_temp", e.error))?;

    Ok(())
}
