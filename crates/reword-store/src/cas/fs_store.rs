//! Filesystem-based Content-Addressable Storage

use std::fs;
use std::path::{Path, PathBuf};

use reword_core::model::digest::hash_bytes;

use crate::cas::atomic::atomic_write;
use crate::cas::sharding::shard_path;
use crate::errors::{cas_collision, cas_missing, io_error, Result};

/// Filesystem-based CAS store
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Create a new CAS store at the given root directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write content and return its SHA-256 digest
    ///
    /// Writing the same content twice is a no-op. Finding different bytes
    /// under the same digest is reported as a collision.
    pub fn write(&self, content: &[u8], extension: &str) -> Result<String> {
        let digest = hash_bytes(content);
        let target_path = shard_path(&self.root, &digest, extension);

        if target_path.exists() {
            let existing = fs::read(&target_path).map_err(|e| io_error("read_cas", e))?;
            if existing == content {
                return Ok(digest);
            }
            return Err(cas_collision(&digest));
        }

        atomic_write(&target_path, content)?;
        tracing::trace!(digest = %digest, size_bytes = content.len(), "Wrote CAS blob");

        Ok(digest)
    }

    /// Read content by digest
    pub fn read(&self, digest: &str, extension: &str) -> Result<Vec<u8>> {
        let path = shard_path(&self.root, digest, extension);
        match fs::read(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(cas_missing(digest)),
            Err(e) => Err(io_error("read_cas", e)),
        }
    }

    pub fn contains(&self, digest: &str, extension: &str) -> bool {
        shard_path(&self.root, digest, extension).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reword_core::errors::ExErrorKind;
    use tempfile::TempDir;

    fn setup_test_cas() -> (FsStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let cas = FsStore::new(temp_dir.path());
        (cas, temp_dir)
    }

    #[test]
    fn test_write_read_roundtrip() {
        let (cas, _dir) = setup_test_cas();

        let digest = cas.write(b"Hello, CAS!", "json").unwrap();

        assert_eq!(cas.read(&digest, "json").unwrap(), b"Hello, CAS!");
        assert_eq!(digest.len(), 64);
    }

    #[test]
    fn test_idempotent_write() {
        let (cas, _dir) = setup_test_cas();

        let digest1 = cas.write(b"Idempotent", "json").unwrap();
        let digest2 = cas.write(b"Idempotent", "json").unwrap();

        assert_eq!(digest1, digest2);
    }

    #[test]
    fn test_collision_detected() {
        let (cas, dir) = setup_test_cas();
        let digest = cas.write(b"original", "json").unwrap();
        fs::write(shard_path(dir.path(), &digest, "json"), b"tampered").unwrap();

        let err = cas.write(b"original", "json").unwrap_err();

        assert_eq!(err.kind(), ExErrorKind::CorruptObject);
    }

    #[test]
    fn test_read_missing() {
        let (cas, _dir) = setup_test_cas();

        let err = cas.read(&"0".repeat(64), "json").unwrap_err();

        assert_eq!(err.kind(), ExErrorKind::NotFound);
    }
}
