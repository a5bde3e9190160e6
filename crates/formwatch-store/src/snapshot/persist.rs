//! Snapshot commit operations.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, version_conflict, Result};
use crate::migrations::compute_checksum;
use formwatch_core::errors::{ExError, ExErrorKind};
use formwatch_core::{Snapshot, VersionToken};
use rusqlite::{Connection, TransactionBehavior};

/// Replace the document at `doc_ref` if its version still equals `expected`.
///
/// The decision is a single conditional statement whose affected-row count
/// says whether this writer won:
///
/// - `expected` absent: `INSERT ... ON CONFLICT DO NOTHING`
/// - otherwise: `UPDATE ... WHERE version = expected`
///
/// ## Returns
///
/// The new version token (`expected.next()`).
///
/// ## Errors
///
/// - `ExErrorKind::VersionConflict`: another writer committed first
/// - `ExErrorKind::StoreUnavailable`: the database could not be written
/// - `ExErrorKind::Serialization`: the snapshot could not be encoded
pub fn commit_document(
    conn: &mut Connection,
    doc_ref: &str,
    snapshot: &Snapshot,
    expected: VersionToken,
) -> Result<VersionToken> {
    let body = serde_json::to_string(snapshot).map_err(|e| {
        ExError::new(ExErrorKind::Serialization)
            .with_op("commit_document")
            .with_doc_ref(doc_ref)
            .with_message(format!("Failed to serialize snapshot: {}", e))
    })?;
    let body_digest = compute_checksum(&body);
    let row_count = snapshot.len() as i64;
    let next = expected.next();
    let next_version = to_sql_version(next, doc_ref)?;
    let expected_version = to_sql_version(expected, doc_ref)?;
    let now = chrono::Utc::now().timestamp_millis();

    // Take the write lock up front so the busy timeout applies to the whole commit
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| from_rusqlite("commit_document", e).with_doc_ref(doc_ref))?;

    let outcome = if expected.is_absent() {
        tx.execute(
            r#"
            INSERT INTO snapshot_documents (doc_ref, version, body, body_digest, row_count, committed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT (doc_ref) DO NOTHING
            "#,
            rusqlite::params![doc_ref, next_version, body, body_digest, row_count, now],
        )
    } else {
        tx.execute(
            r#"
            UPDATE snapshot_documents
            SET version = ?2, body = ?3, body_digest = ?4, row_count = ?5, committed_at = ?6
            WHERE doc_ref = ?1 AND version = ?7
            "#,
            rusqlite::params![
                doc_ref,
                next_version,
                body,
                body_digest,
                row_count,
                now,
                expected_version,
            ],
        )
    };
    let affected =
        outcome.map_err(|e| from_rusqlite("commit_document", e).with_doc_ref(doc_ref))?;

    if affected == 0 {
        // Dropping the transaction rolls it back
        return Err(version_conflict(doc_ref, expected));
    }

    tx.execute(
        r#"
        INSERT INTO snapshot_commits (doc_ref, version, body_digest, row_count, committed_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        rusqlite::params![doc_ref, next_version, body_digest, row_count, now],
    )
    .map_err(|e| from_rusqlite("commit_document", e).with_doc_ref(doc_ref))?;

    tx.commit()
        .map_err(|e| from_rusqlite("commit_document", e).with_doc_ref(doc_ref))?;

    tracing::debug!(
        doc_ref = %doc_ref,
        version = next.get(),
        row_count = row_count,
        "Committed snapshot document"
    );

    Ok(next)
}

fn to_sql_version(token: VersionToken, doc_ref: &str) -> Result<i64> {
    i64::try_from(token.get()).map_err(|_| {
        ExError::new(ExErrorKind::StoreUnavailable)
            .with_op("commit_document")
            .with_doc_ref(doc_ref)
            .with_message(format!("version {} exceeds the storable range", token))
    })
}
