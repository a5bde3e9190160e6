//! Reconciliation pass orchestration.
//!
//! ## Pass pipeline (in order):
//! 1. Fetch all rows (failure: `SourceUnavailable`, nothing else happens)
//! 2. Load snapshot and version token (failure: `StoreUnavailable`, no notifications)
//! 3. Diff
//! 4. Notify each change in row order; failures are tallied, never retried
//! 5. Commit the next snapshot against the token from step 2
//!    (`VersionConflict` is reported, not raised)
//!
//! ## Logging Ownership
//!
//! The engine owns lifecycle logging for a pass: every event emitted while
//! the pass runs sits inside a `pass` span carrying its `pass_id`. Adapters
//! below use only `tracing::debug!()` for internal details.

#![allow(clippy::result_large_err)]

use crate::commands::report::PassReport;
use formwatch_core::errors::{ExError, ExErrorKind, Result};
use formwatch_core::{
    compute, ChangeSet, Notifier, NotificationOutcome, NotificationResult, RowSource,
    SnapshotStore,
};
use formwatch_core::{log_op_end, log_op_error, log_op_start};
use formwatch_core_types::PassContext;
use serde::Serialize;
use std::time::Instant;

/// What a pass does after diffing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassMode {
    /// Notify every change, then commit
    #[default]
    Notify,
    /// Diff only: no notifications, no commit
    DryRun,
    /// Commit the current rows without notifying (first deployment)
    Baseline,
}

impl PassMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassMode::Notify => "notify",
            PassMode::DryRun => "dry_run",
            PassMode::Baseline => "baseline",
        }
    }
}

/// Options for a reconciliation pass
#[derive(Debug, Clone, Default)]
pub struct PassOptions {
    pub mode: PassMode,
}

impl PassOptions {
    pub fn with_mode(mode: PassMode) -> Self {
        Self { mode }
    }
}

/// Run one reconciliation pass
///
/// ## Errors
///
/// - `SourceUnavailable`: rows could not be fetched
/// - `StoreUnavailable`: the snapshot could not be loaded, or the commit
///   failed for a reason other than a version conflict
///
/// Delivery failures and version conflicts are reported in the
/// [`PassReport`], never raised.
pub fn run_pass(
    ctx: &PassContext,
    source: &dyn RowSource,
    store: &dyn SnapshotStore,
    notifier: &dyn Notifier,
    options: &PassOptions,
) -> Result<PassReport> {
    let span = tracing::info_span!(
        "pass",
        pass_id = %ctx.pass_id,
        trace_id = ctx.trace_id.as_ref().map(|t| t.as_str()),
        origin = ctx.origin,
        mode = options.mode.as_str(),
        doc_ref = store.doc_ref(),
    );
    let _entered = span.enter();

    log_op_start!("reconcile_pass");
    let start = Instant::now();

    let mut report = run_pass_impl(ctx, source, store, notifier, options).map_err(|e| {
        let mut e = e.with_pass_id(ctx.pass_id.clone());
        if let Some(trace_id) = &ctx.trace_id {
            e = e.with_trace_id(trace_id.clone());
        }
        log_op_error!(
            "reconcile_pass",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;
    report.duration_ms = start.elapsed().as_millis() as u64;

    log_op_end!(
        "reconcile_pass",
        duration_ms = report.duration_ms,
        rows_fetched = report.rows_fetched,
        changes_sent = report.changes_sent,
        changes_failed = report.changes_failed,
        skipped_due_to_conflict = report.skipped_due_to_conflict
    );

    Ok(report)
}

fn run_pass_impl(
    ctx: &PassContext,
    source: &dyn RowSource,
    store: &dyn SnapshotStore,
    notifier: &dyn Notifier,
    options: &PassOptions,
) -> Result<PassReport> {
    // 1. Fetch
    let rows = source
        .fetch_all()
        .map_err(|e| classify(e, ExErrorKind::SourceUnavailable, "fetch_all"))?;
    let rows_fetched = rows.len();

    // 2. Load
    let loaded = store
        .load()
        .map_err(|e| classify(e, ExErrorKind::StoreUnavailable, "load"))?;

    // 3. Diff
    let outcome = compute(&loaded.snapshot, rows);
    tracing::info!(
        rows_fetched = rows_fetched,
        blank_rows = outcome.blank_rows,
        changes = outcome.changes.len(),
        version = loaded.version.get(),
        "Computed change set"
    );

    let mut report = PassReport {
        pass_id: ctx.pass_id.clone(),
        trace_id: ctx.trace_id.clone(),
        mode: options.mode,
        rows_fetched,
        blank_rows: outcome.blank_rows,
        changes_sent: 0,
        changes_failed: 0,
        skipped_due_to_conflict: false,
        committed_version: None,
        results: Vec::new(),
        pending: None,
        duration_ms: 0,
    };

    match options.mode {
        PassMode::DryRun => {
            report.pending = Some(outcome.changes);
            return Ok(report);
        }
        PassMode::Baseline => {
            tracing::info!(
                suppressed = outcome.changes.len(),
                "Baseline pass, notifications suppressed"
            );
        }
        // 4. Notify
        PassMode::Notify => notify_all(notifier, &outcome.changes, &mut report),
    }

    // 5. Commit
    match store.commit_if_version(&outcome.next_snapshot, loaded.version) {
        Ok(version) => {
            tracing::info!(version = version.get(), "Committed snapshot");
            report.committed_version = Some(version);
        }
        Err(e) if e.kind() == ExErrorKind::VersionConflict => {
            tracing::warn!(
                expected = loaded.version.get(),
                changes_sent = report.changes_sent,
                "Snapshot changed during pass, commit skipped"
            );
            report.skipped_due_to_conflict = true;
        }
        Err(e) => {
            // Sent notifications stay sent
            let message = format!(
                "commit failed after {} notification(s) were sent: {}",
                report.changes_sent,
                e.message()
            );
            return Err(ExError::new(ExErrorKind::StoreUnavailable)
                .with_op("commit_if_version")
                .with_doc_ref(store.doc_ref())
                .with_message(message)
                .with_source(e));
        }
    }

    Ok(report)
}

fn notify_all(notifier: &dyn Notifier, changes: &ChangeSet, report: &mut PassReport) {
    for change in changes {
        let outcome = match notifier.send(change) {
            Ok(()) => {
                report.changes_sent += 1;
                tracing::info!(
                    row_key = change.key(),
                    kind = change.kind.as_str(),
                    "Notification sent"
                );
                NotificationOutcome::Sent
            }
            Err(e) => {
                report.changes_failed += 1;
                tracing::warn!(
                    row_key = change.key(),
                    kind = change.kind.as_str(),
                    err.code = e.code(),
                    err.message = e.message(),
                    "Notification failed"
                );
                NotificationOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };
        report.results.push(NotificationResult {
            key: change.key().to_string(),
            kind: change.kind,
            outcome,
        });
    }
}

/// Keep an error of the expected kind, wrap anything else in it
fn classify(err: ExError, kind: ExErrorKind, op: &str) -> ExError {
    if err.kind() == kind {
        return err;
    }
    let message = err.message().to_string();
    ExError::new(kind)
        .with_op(op.to_string())
        .with_message(message)
        .with_source(err)
}
