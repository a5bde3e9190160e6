#![allow(clippy::unwrap_used, clippy::expect_used)]

use formwatch_core::diff::compute;
use formwatch_core::model::{ChangeKind, Row, Snapshot};

fn row(cells: &[&str]) -> Row {
    cells.iter().copied().collect()
}

fn snapshot(rows: &[&[&str]]) -> Snapshot {
    Snapshot::from_rows(rows.iter().map(|r| row(r)))
}

#[test]
fn test_new_row_appended_to_known_rows() {
    let previous = snapshot(&[&["t1", "A", "111", "q1"]]);

    let outcome = compute(
        &previous,
        vec![row(&["t1", "A", "111", "q1"]), row(&["t2", "B", "222", "q2"])],
    );

    assert_eq!(outcome.changes.len(), 1);
    let change = outcome.changes.iter().next().unwrap();
    assert_eq!(change.kind, ChangeKind::New);
    assert_eq!(change.key(), "t2");
    assert!(outcome.next_snapshot.contains_key("t1"));
    assert!(outcome.next_snapshot.contains_key("t2"));
    assert_eq!(outcome.next_snapshot.len(), 2);
}

#[test]
fn test_single_column_edit_is_modified() {
    let previous = snapshot(&[&["t1", "A", "111", "q1"]]);

    let outcome = compute(&previous, vec![row(&["t1", "A", "999", "q1"])]);

    assert_eq!(outcome.changes.len(), 1);
    let change = outcome.changes.iter().next().unwrap();
    assert_eq!(change.kind, ChangeKind::Modified);
    assert_eq!(change.key(), "t1");
    assert_eq!(change.row.cell(2), Some("999"));
}

#[test]
fn test_unchanged_input_yields_nothing() {
    let previous = snapshot(&[&["t1", "A"], &["t2", "B"]]);

    let outcome = compute(&previous, vec![row(&["t1", "A"]), row(&["t2", "B"])]);

    assert!(outcome.changes.is_empty());
    assert_eq!(outcome.next_snapshot, previous);
}

#[test]
fn test_removed_row_is_not_a_change_and_is_dropped() {
    let previous = snapshot(&[&["t1", "A"], &["t2", "B"]]);

    let outcome = compute(&previous, vec![row(&["t2", "B"])]);

    assert!(outcome.changes.is_empty());
    assert!(!outcome.next_snapshot.contains_key("t1"));
    assert_eq!(outcome.next_snapshot.len(), 1);
}

#[test]
fn test_change_order_follows_source_order() {
    let previous = snapshot(&[&["t5", "old"]]);

    let outcome = compute(
        &previous,
        vec![
            row(&["t9", "x"]),
            row(&["t5", "new"]),
            row(&["t1", "y"]),
        ],
    );

    assert_eq!(outcome.changes.keys(), vec!["t9", "t5", "t1"]);
    let kinds: Vec<_> = outcome.changes.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![ChangeKind::New, ChangeKind::Modified, ChangeKind::New]
    );
}

#[test]
fn test_first_run_everything_is_new() {
    let outcome = compute(
        &Snapshot::new(),
        vec![row(&["t1", "A"]), row(&["t2", "B"]), row(&["t3", "C"])],
    );

    assert_eq!(outcome.changes.count(ChangeKind::New), 3);
    assert_eq!(outcome.changes.count(ChangeKind::Modified), 0);
}

#[test]
fn test_next_snapshot_replaces_not_merges() {
    let previous = snapshot(&[&["t1", "A"], &["t2", "B"]]);

    let outcome = compute(&previous, vec![row(&["t3", "C"])]);

    assert_eq!(outcome.next_snapshot.keys().collect::<Vec<_>>(), vec!["t3"]);
}
