//! Collaborator interfaces used by a reconciliation pass.
//!
//! All three are blocking; a pass runs on its own thread (or blocking
//! worker) and calls them in sequence. Implementations bound every call with
//! their own timeout and never retry internally on behalf of the pass.

use crate::errors::Result;
use crate::model::{Change, LoadedSnapshot, Row, Snapshot, VersionToken};
use std::sync::Arc;

/// Reads the full current table from the monitored source.
pub trait RowSource: Send + Sync {
    /// Fetch every data row, header rows excluded.
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::SourceUnavailable` if the full table cannot be
    /// read. Partial tables are never returned.
    fn fetch_all(&self) -> Result<Vec<Row>>;
}

/// Durable home of the snapshot document for one monitored source.
pub trait SnapshotStore: Send + Sync {
    /// Fixed reference of the snapshot document this store reads and writes.
    fn doc_ref(&self) -> &str;

    /// Load the current snapshot and its version token.
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::StoreUnavailable` if the store cannot be read.
    /// A missing document is not an error: it loads as
    /// [`LoadedSnapshot::absent`].
    fn load(&self) -> Result<LoadedSnapshot>;

    /// Replace the snapshot if the stored version still equals `expected`.
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::VersionConflict` if another writer committed
    /// first, or `ExErrorKind::StoreUnavailable` if the write itself failed.
    fn commit_if_version(&self, snapshot: &Snapshot, expected: VersionToken)
        -> Result<VersionToken>;
}

/// Delivers one message per changed row.
pub trait Notifier: Send + Sync {
    /// Send the notification for `change`.
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::DeliveryFailed` with the provider's reason.
    fn send(&self, change: &Change) -> Result<()>;
}

impl<T: RowSource + ?Sized> RowSource for Arc<T> {
    fn fetch_all(&self) -> Result<Vec<Row>> {
        (**self).fetch_all()
    }
}

impl<T: SnapshotStore + ?Sized> SnapshotStore for Arc<T> {
    fn doc_ref(&self) -> &str {
        (**self).doc_ref()
    }

    fn load(&self) -> Result<LoadedSnapshot> {
        (**self).load()
    }

    fn commit_if_version(
        &self,
        snapshot: &Snapshot,
        expected: VersionToken,
    ) -> Result<VersionToken> {
        (**self).commit_if_version(snapshot, expected)
    }
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn send(&self, change: &Change) -> Result<()> {
        (**self).send(change)
    }
}
