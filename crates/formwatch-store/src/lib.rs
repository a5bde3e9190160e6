//! Formwatch Store - durable snapshot documents
//!
//! Provides:
//! - SQLite schema with an embedded, checksummed migrations framework
//! - Versioned snapshot documents with compare-and-swap commits
//! - [`SqliteSnapshotStore`] and the in-process [`MemorySnapshotStore`],
//!   both implementing `formwatch_core::SnapshotStore`

pub mod db;
pub mod errors;
pub mod memory;
pub mod migrations;
pub mod snapshot;
pub mod sqlite_store;

// Re-export key types
pub use errors::Result;
pub use memory::MemorySnapshotStore;
pub use snapshot::{CommitRecord, DocumentInfo};
pub use sqlite_store::SqliteSnapshotStore;
