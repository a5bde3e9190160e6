#![allow(clippy::unwrap_used, clippy::expect_used)]

use formwatch_core::{ExErrorKind, Row, Snapshot, SnapshotStore, VersionToken};
use formwatch_store::SqliteSnapshotStore;
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

const DOC_REF: &str = "sheet_snapshots/responses";

fn snapshot(rows: &[&[&str]]) -> Snapshot {
    Snapshot::from_rows(rows.iter().map(|r| r.iter().copied().collect::<Row>()))
}

fn open_store(dir: &TempDir) -> SqliteSnapshotStore {
    SqliteSnapshotStore::open(dir.path().join("formwatch.db"), DOC_REF).unwrap()
}

#[test]
fn test_missing_document_loads_empty_with_absent_token() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    let loaded = store.load().unwrap();

    assert!(loaded.snapshot.is_empty());
    assert!(loaded.version.is_absent());
    assert!(store.info().unwrap().is_none());
}

#[test]
fn test_first_commit_then_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let snap = snapshot(&[&["t1", "A", "111", "q1"], &["t2", "B", "222", "q2"]]);

    let version = store.commit_if_version(&snap, VersionToken::ABSENT).unwrap();

    assert_eq!(version, VersionToken::new(1));
    let loaded = store.load().unwrap();
    assert_eq!(loaded.snapshot, snap);
    assert_eq!(loaded.version, version);
}

#[test]
fn test_commit_with_stale_token_conflicts_and_keeps_winner() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let first = snapshot(&[&["t1", "A"]]);
    let second = snapshot(&[&["t1", "A"], &["t2", "B"]]);

    store.commit_if_version(&first, VersionToken::ABSENT).unwrap();
    let err = store
        .commit_if_version(&second, VersionToken::ABSENT)
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::VersionConflict);
    assert_eq!(err.doc_ref(), Some(DOC_REF));
    assert_eq!(store.load().unwrap().snapshot, first);
}

#[test]
fn test_versions_increase_with_each_commit() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    let v1 = store
        .commit_if_version(&snapshot(&[&["t1", "A"]]), VersionToken::ABSENT)
        .unwrap();
    let v2 = store
        .commit_if_version(&snapshot(&[&["t1", "B"]]), v1)
        .unwrap();

    assert!(v2 > v1);
    let err = store
        .commit_if_version(&snapshot(&[&["t1", "C"]]), v1)
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::VersionConflict);

    let history = store.history(10).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].version, v2);
    assert_eq!(history[1].version, v1);
}

#[test]
fn test_document_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let snap = snapshot(&[&["t1", "A"]]);
    {
        let store = open_store(&dir);
        store.commit_if_version(&snap, VersionToken::ABSENT).unwrap();
    }

    let reopened = open_store(&dir);
    let info = reopened.info().unwrap().unwrap();
    assert_eq!(info.doc_ref, DOC_REF);
    assert_eq!(info.version, VersionToken::new(1));
    assert_eq!(info.row_count, 1);
    assert_eq!(info.body_digest.len(), 64);
    assert_eq!(reopened.load().unwrap().snapshot, snap);
}

#[test]
fn test_documents_are_isolated_by_reference() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("formwatch.db");
    let a = SqliteSnapshotStore::open(&path, "sheet_a").unwrap();
    let b = SqliteSnapshotStore::open(&path, "sheet_b").unwrap();

    a.commit_if_version(&snapshot(&[&["t1", "A"]]), VersionToken::ABSENT)
        .unwrap();

    assert!(b.load().unwrap().version.is_absent());
    b.commit_if_version(&snapshot(&[&["t9", "Z"]]), VersionToken::ABSENT)
        .unwrap();
    assert_eq!(a.load().unwrap().snapshot.keys().collect::<Vec<_>>(), vec!["t1"]);
}

#[test]
fn test_concurrent_commits_exactly_one_wins() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(open_store(&dir));
    store
        .commit_if_version(&snapshot(&[&["t1", "A"]]), VersionToken::ABSENT)
        .unwrap();

    let loaded = store.load().unwrap();
    let barrier = Arc::new(Barrier::new(2));
    let candidates = [
        snapshot(&[&["t1", "A"], &["t2", "B"]]),
        snapshot(&[&["t1", "A"], &["t3", "C"]]),
    ];

    let handles: Vec<_> = candidates
        .iter()
        .cloned()
        .map(|candidate| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            let expected = loaded.version;
            thread::spawn(move || {
                barrier.wait();
                (candidate.clone(), store.commit_if_version(&candidate, expected))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners: Vec<_> = results.iter().filter(|(_, r)| r.is_ok()).collect();
    let losers: Vec<_> = results.iter().filter(|(_, r)| r.is_err()).collect();

    assert_eq!(winners.len(), 1);
    assert_eq!(losers.len(), 1);
    assert_eq!(
        losers[0].1.as_ref().unwrap_err().kind(),
        ExErrorKind::VersionConflict
    );

    // Final state is exactly the winner's snapshot, never a merge
    let final_state = store.load().unwrap();
    assert_eq!(final_state.snapshot, winners[0].0);
    assert_eq!(final_state.version, VersionToken::new(2));
}

#[test]
fn test_corrupt_body_reports_store_unavailable() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store
        .commit_if_version(&snapshot(&[&["t1", "A"]]), VersionToken::ABSENT)
        .unwrap();

    let conn = rusqlite::Connection::open(store.path()).unwrap();
    conn.execute(
        "UPDATE snapshot_documents SET body = 'not json' WHERE doc_ref = ?1",
        [DOC_REF],
    )
    .unwrap();

    let err = store.load().unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::StoreUnavailable);
}

#[test]
fn test_blank_doc_ref_rejected() {
    let dir = TempDir::new().unwrap();
    let err = SqliteSnapshotStore::open(dir.path().join("formwatch.db"), "  ").unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
}

#[test]
fn test_concurrent_first_opens_migrate_once_and_race_cleanly() {
    const WRITERS: usize = 8;
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fresh.db");
    let barrier = Arc::new(Barrier::new(WRITERS));

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let path = path.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let store = SqliteSnapshotStore::open(&path, DOC_REF)?;
                let loaded = store.load()?;
                let key = format!("t{}", i);
                let candidate = snapshot(&[&[key.as_str(), "A"]]);
                store.commit_if_version(&candidate, loaded.version)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let unexpected: Vec<_> = results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .filter(|e| e.kind() != ExErrorKind::VersionConflict)
        .map(|e| e.to_string())
        .collect();
    assert!(unexpected.is_empty(), "unexpected errors: {:?}", unexpected);
    assert!(results.iter().any(|r| r.is_ok()));

    let conn = rusqlite::Connection::open(&path).unwrap();
    assert_eq!(
        formwatch_store::migrations::applied_migrations(&conn).unwrap(),
        vec!["001_snapshot_documents", "002_commit_log"]
    );
}
