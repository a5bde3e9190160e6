//! Read-only snapshot document queries.

#![allow(clippy::result_large_err)]

use crate::errors::{corrupt_document, from_rusqlite, Result};
use formwatch_core::{LoadedSnapshot, Snapshot, VersionToken};
use rusqlite::{Connection, OptionalExtension};

/// Summary of the stored document, without its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub doc_ref: String,
    pub version: VersionToken,
    pub row_count: usize,
    /// SHA256 of the stored JSON body
    pub body_digest: String,
    /// Commit time, milliseconds since epoch
    pub committed_at: i64,
}

/// One entry of the commit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub version: VersionToken,
    pub row_count: usize,
    pub body_digest: String,
    pub committed_at: i64,
}

/// Load the document at `doc_ref`.
///
/// A missing document loads as an empty snapshot with the absent token.
///
/// # Errors
///
/// Returns `StoreUnavailable` if the query fails or the stored body does
/// not decode.
pub fn load_document(conn: &Connection, doc_ref: &str) -> Result<LoadedSnapshot> {
    let stored: Option<(i64, String)> = conn
        .query_row(
            "SELECT version, body FROM snapshot_documents WHERE doc_ref = ?1",
            [doc_ref],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(|e| from_rusqlite("load", e).with_doc_ref(doc_ref))?;

    match stored {
        None => Ok(LoadedSnapshot::absent()),
        Some((version, body)) => {
            let snapshot: Snapshot =
                serde_json::from_str(&body).map_err(|e| corrupt_document(doc_ref, e))?;
            Ok(LoadedSnapshot {
                snapshot,
                version: from_sql_version(version),
            })
        }
    }
}

/// Fetch the document summary, `None` if nothing was committed yet.
///
/// # Errors
///
/// Returns `StoreUnavailable` if the query fails.
pub fn document_info(conn: &Connection, doc_ref: &str) -> Result<Option<DocumentInfo>> {
    conn.query_row(
        r#"
        SELECT doc_ref, version, row_count, body_digest, committed_at
        FROM snapshot_documents
        WHERE doc_ref = ?1
        "#,
        [doc_ref],
        |row| {
            Ok(DocumentInfo {
                doc_ref: row.get(0)?,
                version: from_sql_version(row.get(1)?),
                row_count: row.get::<_, i64>(2)?.max(0) as usize,
                body_digest: row.get(3)?,
                committed_at: row.get(4)?,
            })
        },
    )
    .optional()
    .map_err(|e| from_rusqlite("document_info", e).with_doc_ref(doc_ref))
}

/// Most recent commits for `doc_ref`, newest first.
///
/// # Errors
///
/// Returns `StoreUnavailable` if the query fails.
pub fn commit_history(conn: &Connection, doc_ref: &str, limit: usize) -> Result<Vec<CommitRecord>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT version, row_count, body_digest, committed_at
            FROM snapshot_commits
            WHERE doc_ref = ?1
            ORDER BY version DESC
            LIMIT ?2
            "#,
        )
        .map_err(|e| from_rusqlite("commit_history", e).with_doc_ref(doc_ref))?;

    let records = stmt
        .query_map(rusqlite::params![doc_ref, limit as i64], |row| {
            Ok(CommitRecord {
                version: from_sql_version(row.get(0)?),
                row_count: row.get::<_, i64>(1)?.max(0) as usize,
                body_digest: row.get(2)?,
                committed_at: row.get(3)?,
            })
        })
        .map_err(|e| from_rusqlite("commit_history", e).with_doc_ref(doc_ref))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| from_rusqlite("commit_history", e).with_doc_ref(doc_ref))?;

    Ok(records)
}

fn from_sql_version(version: i64) -> VersionToken {
    VersionToken::new(version.max(0) as u64)
}
