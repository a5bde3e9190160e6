//! In-process snapshot store.

use formwatch_core::errors::{ExError, ExErrorKind, Result};
use formwatch_core::{LoadedSnapshot, Snapshot, SnapshotStore, VersionToken};
use std::sync::Mutex;

/// Mutex-guarded snapshot document with the same compare-and-swap rules as
/// the SQLite store
///
/// Used by tests and by embedders that need no durability.
#[derive(Debug)]
pub struct MemorySnapshotStore {
    doc_ref: String,
    document: Mutex<LoadedSnapshot>,
}

impl MemorySnapshotStore {
    /// An empty store (nothing committed yet)
    pub fn new(doc_ref: impl Into<String>) -> Self {
        Self {
            doc_ref: doc_ref.into(),
            document: Mutex::new(LoadedSnapshot::absent()),
        }
    }

    /// A store that already holds `snapshot` at version 1
    pub fn with_snapshot(doc_ref: impl Into<String>, snapshot: Snapshot) -> Self {
        Self {
            doc_ref: doc_ref.into(),
            document: Mutex::new(LoadedSnapshot {
                snapshot,
                version: VersionToken::ABSENT.next(),
            }),
        }
    }

    fn poisoned(&self, op: &str) -> ExError {
        ExError::new(ExErrorKind::StoreUnavailable)
            .with_op(op.to_string())
            .with_doc_ref(self.doc_ref.clone())
            .with_message("store lock poisoned")
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn doc_ref(&self) -> &str {
        &self.doc_ref
    }

    fn load(&self) -> Result<LoadedSnapshot> {
        let document = self.document.lock().map_err(|_| self.poisoned("load"))?;
        Ok(document.clone())
    }

    fn commit_if_version(
        &self,
        snapshot: &Snapshot,
        expected: VersionToken,
    ) -> Result<VersionToken> {
        let mut document = self
            .document
            .lock()
            .map_err(|_| self.poisoned("commit_if_version"))?;

        if document.version != expected {
            return Err(crate::errors::version_conflict(&self.doc_ref, expected));
        }

        let next = expected.next();
        *document = LoadedSnapshot {
            snapshot: snapshot.clone(),
            version: next,
        };
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwatch_core::Row;

    #[test]
    fn test_with_snapshot_starts_at_version_one() {
        let snapshot = Snapshot::from_rows(vec![Row::from_iter(["t1", "A"])]);
        let store = MemorySnapshotStore::with_snapshot("doc", snapshot.clone());

        let loaded = store.load().unwrap();
        assert_eq!(loaded.version, VersionToken::new(1));
        assert_eq!(loaded.snapshot, snapshot);
    }
}
