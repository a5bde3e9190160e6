#![allow(dead_code)]

use formwatch_core::errors::{ExError, ExErrorKind, Result};
use formwatch_core::{
    Change, LoadedSnapshot, Notifier, Row, RowSource, Snapshot, SnapshotStore, VersionToken,
};
use formwatch_store::MemorySnapshotStore;
use std::collections::HashSet;
use std::sync::{Barrier, Mutex};

pub const DOC_REF: &str = "sheet_snapshots/test";

pub fn row(cells: &[&str]) -> Row {
    cells.iter().copied().collect()
}

pub fn snapshot(rows: &[&[&str]]) -> Snapshot {
    Snapshot::from_rows(rows.iter().map(|r| row(r)))
}

/// Returns the same table on every fetch
pub struct StaticRows(pub Vec<Row>);

impl StaticRows {
    pub fn new(rows: &[&[&str]]) -> Self {
        Self(rows.iter().map(|r| row(r)).collect())
    }
}

impl RowSource for StaticRows {
    fn fetch_all(&self) -> Result<Vec<Row>> {
        Ok(self.0.clone())
    }
}

/// Fails every fetch with the given kind
pub struct FailingSource(pub ExErrorKind);

impl RowSource for FailingSource {
    fn fetch_all(&self) -> Result<Vec<Row>> {
        Err(ExError::new(self.0)
            .with_op("fetch_all")
            .with_message("sheet returned 503"))
    }
}

/// Records every send and fails for selected keys
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
    attempts: Mutex<Vec<String>>,
    fail_keys: HashSet<String>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(keys: &[&str]) -> Self {
        Self {
            fail_keys: keys.iter().map(|k| k.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Keys delivered successfully, in order
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    /// Every key a send was attempted for, in order
    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, change: &Change) -> Result<()> {
        self.attempts.lock().unwrap().push(change.key().to_string());
        if self.fail_keys.contains(change.key()) {
            return Err(ExError::new(ExErrorKind::DeliveryFailed)
                .with_op("send")
                .with_row_key(change.key())
                .with_message("invalid recipient"));
        }
        self.sent.lock().unwrap().push(change.key().to_string());
        Ok(())
    }
}

/// Waits for `n` concurrent senders before delivering, so overlapping
/// passes have all loaded the snapshot before any of them commits
pub struct RendezvousNotifier {
    barrier: Barrier,
    pub inner: RecordingNotifier,
}

impl RendezvousNotifier {
    pub fn new(n: usize) -> Self {
        Self {
            barrier: Barrier::new(n),
            inner: RecordingNotifier::new(),
        }
    }
}

impl Notifier for RendezvousNotifier {
    fn send(&self, change: &Change) -> Result<()> {
        self.barrier.wait();
        self.inner.send(change)
    }
}

/// Store whose load or commit fails with `StoreUnavailable`
pub struct BrokenStore {
    pub inner: MemorySnapshotStore,
    pub fail_load: bool,
    pub fail_commit: bool,
}

impl BrokenStore {
    pub fn failing_load() -> Self {
        Self {
            inner: MemorySnapshotStore::new(DOC_REF),
            fail_load: true,
            fail_commit: false,
        }
    }

    pub fn failing_commit(seed: Snapshot) -> Self {
        Self {
            inner: MemorySnapshotStore::with_snapshot(DOC_REF, seed),
            fail_load: false,
            fail_commit: true,
        }
    }
}

impl SnapshotStore for BrokenStore {
    fn doc_ref(&self) -> &str {
        DOC_REF
    }

    fn load(&self) -> Result<LoadedSnapshot> {
        if self.fail_load {
            return Err(ExError::new(ExErrorKind::StoreUnavailable)
                .with_op("load")
                .with_message("connection refused"));
        }
        self.inner.load()
    }

    fn commit_if_version(
        &self,
        snapshot: &Snapshot,
        expected: VersionToken,
    ) -> Result<VersionToken> {
        if self.fail_commit {
            return Err(ExError::new(ExErrorKind::StoreUnavailable)
                .with_op("commit_if_version")
                .with_message("disk full"));
        }
        self.inner.commit_if_version(snapshot, expected)
    }
}

/// Store where a rival pass always commits between our load and our commit
pub struct RacingStore {
    pub inner: MemorySnapshotStore,
    pub rival: Snapshot,
}

impl SnapshotStore for RacingStore {
    fn doc_ref(&self) -> &str {
        DOC_REF
    }

    fn load(&self) -> Result<LoadedSnapshot> {
        self.inner.load()
    }

    fn commit_if_version(
        &self,
        snapshot: &Snapshot,
        expected: VersionToken,
    ) -> Result<VersionToken> {
        self.inner.commit_if_version(&self.rival, expected)?;
        self.inner.commit_if_version(snapshot, expected)
    }
}
