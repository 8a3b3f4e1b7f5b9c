//! Error handling for reword-store
//!
//! Wraps reword-core ExError with store-specific helpers

use std::path::Path;

use reword_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a CAS collision error
pub fn cas_collision(digest: &str) -> ExError {
    ExError::new(ExErrorKind::CorruptObject)
        .with_op("cas_write")
        .with_snapshot_id(digest)
        .with_message(format!("CAS collision for digest {}", digest))
}

/// Create a CAS missing blob error
pub fn cas_missing(digest: &str) -> ExError {
    ExError::new(ExErrorKind::NotFound)
        .with_op("cas_read")
        .with_snapshot_id(digest)
        .with_message(format!("CAS blob not found for digest {}", digest))
}

/// Create a "no repository here" error
pub fn not_a_repository(path: &Path) -> ExError {
    ExError::new(ExErrorKind::NotFound)
        .with_op("open_repository")
        .with_message(format!(
            "Not a reword repository (or any parent): {}",
            path.display()
        ))
}

/// Reclassify any failure while creating a snapshot
pub fn store_write(err: ExError) -> ExError {
    let message = err.to_string();
    ExError::new(ExErrorKind::StoreWrite)
        .with_op("create_snapshot")
        .with_message(message)
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
