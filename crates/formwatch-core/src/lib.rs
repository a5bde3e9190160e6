//! Formwatch Core - snapshot-diff reconciliation kernel
//!
//! This crate provides the pieces of change detection that carry no I/O:
//! - Row, snapshot and change models with identity-key semantics
//! - The pure diff engine (`previous snapshot + current rows -> changes`)
//! - Collaborator traits for row sources, snapshot stores and notifiers
//! - Notification message templates and submission timestamp parsing
//! - The canonical error and logging facilities shared by every crate

pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod message;
pub mod model;
pub mod ports;
pub mod timestamp;

// Re-exported for the logging macros
pub use formwatch_core_types;

// Re-export commonly used types
pub use diff::{compute, DiffOutcome};
pub use errors::{ExError, ExErrorKind, FormwatchError, Result};
pub use message::MessageTemplate;
pub use model::{
    Change, ChangeKind, ChangeSet, LoadedSnapshot, NotificationOutcome, NotificationResult, Row,
    Snapshot, VersionToken,
};
pub use ports::{Notifier, RowSource, SnapshotStore};
