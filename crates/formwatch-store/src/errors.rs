//! Error handling for formwatch-store
//!
//! Wraps formwatch-core ExError with store-specific helpers

use formwatch_core::errors::{ExError, ExErrorKind};
use formwatch_core::VersionToken;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error for an already-applied migration
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: recorded {}, embedded {}",
            migration_id, expected, actual
        ))
}

/// Create a store error from rusqlite::Error
///
/// Every driver failure makes the store unavailable for the pass.
pub fn from_rusqlite(op: &str, err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::StoreUnavailable)
        .with_op(op.to_string())
        .with_message(err.to_string())
}

/// Create an error for a stored body that no longer decodes
pub fn corrupt_document(doc_ref: &str, err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::StoreUnavailable)
        .with_op("load")
        .with_doc_ref(doc_ref)
        .with_message(format!("stored snapshot does not decode: {}", err))
}

/// Create the conflict error returned when the expected version is stale
pub fn version_conflict(doc_ref: &str, expected: VersionToken) -> ExError {
    ExError::new(ExErrorKind::VersionConflict)
        .with_op("commit_if_version")
        .with_doc_ref(doc_ref)
        .with_message(format!(
            "snapshot changed since it was loaded at {}",
            expected
        ))
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
