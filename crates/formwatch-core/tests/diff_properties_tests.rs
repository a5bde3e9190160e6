#![allow(clippy::unwrap_used, clippy::expect_used)]

use formwatch_core::diff::compute;
use formwatch_core::model::{ChangeKind, Row, Snapshot};
use proptest::prelude::*;
use std::collections::BTreeMap;

/// Rows with unique non-blank keys, drawn from a small alphabet so that
/// previous and current overlap often.
fn arb_rows() -> impl Strategy<Value = Vec<Row>> {
    prop::collection::btree_map("t[0-9]{1,2}", prop::collection::vec("[a-c]{0,2}", 0..4), 0..12)
        .prop_map(|map: BTreeMap<String, Vec<String>>| {
            map.into_iter()
                .map(|(key, rest)| Row::new(std::iter::once(key).chain(rest).collect()))
                .collect()
        })
}

proptest! {
    #[test]
    fn prop_diff_against_itself_is_empty(rows in arb_rows()) {
        let previous = Snapshot::from_rows(rows.clone());
        let outcome = compute(&previous, rows);
        prop_assert!(outcome.changes.is_empty());
        prop_assert_eq!(outcome.next_snapshot, previous);
    }

    #[test]
    fn prop_next_snapshot_is_current_reindexed(prev in arb_rows(), current in arb_rows()) {
        let previous = Snapshot::from_rows(prev);
        let outcome = compute(&previous, current.clone());
        prop_assert_eq!(outcome.next_snapshot, Snapshot::from_rows(current));
    }

    #[test]
    fn prop_change_kinds_match_previous_membership(prev in arb_rows(), current in arb_rows()) {
        let previous = Snapshot::from_rows(prev);
        let outcome = compute(&previous, current.clone());

        for change in &outcome.changes {
            match previous.get(change.key()) {
                None => prop_assert_eq!(change.kind, ChangeKind::New),
                Some(known) => {
                    prop_assert_eq!(change.kind, ChangeKind::Modified);
                    prop_assert_ne!(known, &change.row);
                }
            }
        }

        // Every row that differs from the previous snapshot is reported
        let expected = current
            .iter()
            .filter(|row| previous.get(row.key()) != Some(*row))
            .count();
        prop_assert_eq!(outcome.changes.len(), expected);
    }

    #[test]
    fn prop_diff_is_deterministic(prev in arb_rows(), current in arb_rows()) {
        let previous = Snapshot::from_rows(prev);
        let first = compute(&previous, current.clone());
        let second = compute(&previous, current);
        prop_assert_eq!(first, second);
    }
}
