//! SQLite-backed snapshot store.

#![allow(clippy::result_large_err)]

use crate::db::{self, DEFAULT_BUSY_TIMEOUT};
use crate::errors::{io_error, Result};
use crate::migrations::apply_migrations;
use crate::snapshot::{commit_history, commit_document, document_info, load_document};
use crate::snapshot::{CommitRecord, DocumentInfo};
use formwatch_core::errors::{ExError, ExErrorKind};
use formwatch_core::{LoadedSnapshot, Snapshot, SnapshotStore, VersionToken};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Snapshot store over a SQLite database file
///
/// Every call opens its own connection, so passes sharing one store value
/// still share no connection state and concurrent commits are arbitrated by
/// the database alone.
#[derive(Debug, Clone)]
pub struct SqliteSnapshotStore {
    path: PathBuf,
    doc_ref: String,
    busy_timeout: Duration,
}

impl SqliteSnapshotStore {
    /// Open (creating if needed) the database at `path` and apply migrations
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if `doc_ref` is blank
    /// - `Io` if the parent directory cannot be created
    /// - `StoreUnavailable` / `Persistence` if the database cannot be
    ///   opened or migrated
    pub fn open(path: impl AsRef<Path>, doc_ref: impl Into<String>) -> Result<Self> {
        Self::open_with_timeout(path, doc_ref, DEFAULT_BUSY_TIMEOUT)
    }

    /// Like [`open`](Self::open) with an explicit busy timeout
    ///
    /// # Errors
    ///
    /// See [`open`](Self::open).
    pub fn open_with_timeout(
        path: impl AsRef<Path>,
        doc_ref: impl Into<String>,
        busy_timeout: Duration,
    ) -> Result<Self> {
        let doc_ref = doc_ref.into();
        if doc_ref.trim().is_empty() {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("open_store")
                .with_message("document reference must not be empty"));
        }

        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| io_error("create_store_dir", e))?;
        }

        let store = Self {
            path,
            doc_ref,
            busy_timeout,
        };
        let mut conn = store.connect()?;
        apply_migrations(&mut conn)?;

        tracing::debug!(
            path = %store.path.display(),
            doc_ref = %store.doc_ref,
            "Opened snapshot store"
        );

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Summary of the stored document, `None` before the first commit
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the database cannot be read.
    pub fn info(&self) -> Result<Option<DocumentInfo>> {
        let conn = self.connect()?;
        document_info(&conn, &self.doc_ref)
    }

    /// Most recent commits, newest first
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the database cannot be read.
    pub fn history(&self, limit: usize) -> Result<Vec<CommitRecord>> {
        let conn = self.connect()?;
        commit_history(&conn, &self.doc_ref, limit)
    }

    fn connect(&self) -> Result<Connection> {
        let conn = db::open(&self.path)?;
        db::configure(&conn, self.busy_timeout)?;
        Ok(conn)
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn doc_ref(&self) -> &str {
        &self.doc_ref
    }

    fn load(&self) -> Result<LoadedSnapshot> {
        let conn = self.connect().map_err(|e| e.with_doc_ref(self.doc_ref.clone()))?;
        load_document(&conn, &self.doc_ref)
    }

    fn commit_if_version(
        &self,
        snapshot: &Snapshot,
        expected: VersionToken,
    ) -> Result<VersionToken> {
        let mut conn = self.connect().map_err(|e| e.with_doc_ref(self.doc_ref.clone()))?;
        commit_document(&mut conn, &self.doc_ref, snapshot, expected)
    }
}
