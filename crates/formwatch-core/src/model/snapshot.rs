use crate::model::row::Row;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All rows known to have been processed as of the last successful pass
///
/// Keyed by identity key. A snapshot is replaced wholesale on commit and
/// never mutated in place once built.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    rows: BTreeMap<String, Row>,
}

impl Snapshot {
    /// An empty snapshot (first run)
    pub fn new() -> Self {
        Self::default()
    }

    /// Index rows by identity key
    ///
    /// Blank rows are skipped and a later row replaces an earlier one with
    /// the same key.
    pub fn from_rows(rows: impl IntoIterator<Item = Row>) -> Self {
        let rows = rows
            .into_iter()
            .filter(|row| !row.is_blank())
            .map(|row| (row.key().to_string(), row))
            .collect();
        Self { rows }
    }

    pub fn get(&self, key: &str) -> Option<&Row> {
        self.rows.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.rows.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Identity keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    /// Rows in identity key order
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.values()
    }
}

/// Revision of the stored snapshot document
///
/// `VersionToken::ABSENT` (zero) means no snapshot has been stored yet. Every
/// successful commit produces a strictly greater token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(u64);

impl VersionToken {
    pub const ABSENT: VersionToken = VersionToken(0);

    pub fn new(revision: u64) -> Self {
        Self(revision)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    pub fn is_absent(&self) -> bool {
        self.0 == 0
    }

    /// The token a successful commit against `self` yields
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl std::fmt::Display for VersionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Snapshot together with the token it must be committed against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSnapshot {
    pub snapshot: Snapshot,
    pub version: VersionToken,
}

impl LoadedSnapshot {
    /// What a store returns when nothing has been committed yet
    pub fn absent() -> Self {
        Self {
            snapshot: Snapshot::new(),
            version: VersionToken::ABSENT,
        }
    }
}
