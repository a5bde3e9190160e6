//! Snapshot document persistence.
//!
//! ## Responsibilities
//!
//! - Store one JSON snapshot document per `doc_ref` with an integer version
//! - Compare-and-swap commits: a write lands only if the stored version still
//!   equals the version the caller loaded
//! - Append every successful commit to the commit log
//!
//! ## Non-Responsibilities
//!
//! - Diffing or deciding what to commit (handled by `formwatch-engine`)
//! - Retrying after a conflict (the losing pass simply reports it)

pub mod persist;
pub mod query;

// Re-export primary types
pub use persist::commit_document;
pub use query::{commit_history, document_info, load_document, CommitRecord, DocumentInfo};
