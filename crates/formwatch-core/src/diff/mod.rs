//! Snapshot diff engine.
//!
//! Compares the previously committed snapshot with a freshly fetched row set
//! and produces the rows that need a notification plus the snapshot to commit.
//!
//! ## Entry point
//!
//! ```
//! use formwatch_core::diff::compute;
//! use formwatch_core::model::{Row, Snapshot};
//!
//! let previous = Snapshot::from_rows(vec![Row::from_iter(["t1", "A"])]);
//! let current = vec![Row::from_iter(["t1", "A"]), Row::from_iter(["t2", "B"])];
//! let outcome = compute(&previous, current);
//! assert_eq!(outcome.changes.keys(), vec!["t2"]);
//! ```
//!
//! ## Guarantees
//!
//! - **Purity**: no I/O, identical inputs give identical outputs.
//! - **No deletions**: keys missing from the current rows are dropped from the
//!   next snapshot and never reported.
//! - **Replacement**: `next_snapshot` is the current rows re-indexed, never a
//!   merge with the previous snapshot.

pub mod engine;
pub mod human_summary;

pub use engine::{compute, DiffOutcome};
pub use human_summary::render_change_set;
