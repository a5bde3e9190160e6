//! Snapshot diff computation.
//!
//! The entry point is [`compute`].

use crate::model::{Change, ChangeKind, ChangeSet, Row, Snapshot};
use std::collections::HashMap;

/// Result of diffing one fetch against the previous snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOutcome {
    /// New and modified rows, in source row order
    pub changes: ChangeSet,
    /// The current rows indexed by identity key
    pub next_snapshot: Snapshot,
    /// Rows skipped because their identity key was empty
    pub blank_rows: usize,
}

/// Compute the change set and next snapshot.
///
/// - key absent from `previous` → [`ChangeKind::New`]
/// - key present with different cells → [`ChangeKind::Modified`]
/// - key present with identical cells → omitted
///
/// When `current` repeats an identity key the later row wins and the change
/// is reported at the position of that later row.
pub fn compute(previous: &Snapshot, current: Vec<Row>) -> DiffOutcome {
    let mut last_index: HashMap<&str, usize> = HashMap::with_capacity(current.len());
    for (index, row) in current.iter().enumerate() {
        if !row.is_blank() {
            last_index.insert(row.key(), index);
        }
    }

    let mut changes = ChangeSet::new();
    let mut blank_rows = 0;
    for (index, row) in current.iter().enumerate() {
        if row.is_blank() {
            blank_rows += 1;
            continue;
        }
        // Superseded by a later row with the same key
        if last_index.get(row.key()) != Some(&index) {
            continue;
        }
        match previous.get(row.key()) {
            None => changes.push(Change::new(row.clone(), ChangeKind::New)),
            Some(known) if known != row => {
                changes.push(Change::new(row.clone(), ChangeKind::Modified))
            }
            Some(_) => {}
        }
    }

    DiffOutcome {
        changes,
        next_snapshot: Snapshot::from_rows(current),
        blank_rows,
    }
}
