//! Pass report and its human-readable rendering.

use crate::commands::reconcile::PassMode;
use formwatch_core::diff::render_change_set;
use formwatch_core::{ChangeSet, NotificationOutcome, NotificationResult, VersionToken};
use formwatch_core_types::{PassId, TraceId};
use serde::Serialize;

/// What one pass did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub pass_id: PassId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<TraceId>,
    pub mode: PassMode,
    pub rows_fetched: usize,
    pub blank_rows: usize,
    pub changes_sent: usize,
    pub changes_failed: usize,
    /// The commit lost to a concurrent pass; its notifications were still sent
    pub skipped_due_to_conflict: bool,
    /// Version written by this pass, `None` on conflict or dry run
    pub committed_version: Option<VersionToken>,
    pub results: Vec<NotificationResult>,
    /// Changes a dry run would have notified
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<ChangeSet>,
    pub duration_ms: u64,
}

/// Render a plain-text summary of a [`PassReport`].
pub fn render_pass_report(report: &PassReport) -> String {
    let mut out = format!(
        "pass {} ({}): {} row(s) fetched",
        report.pass_id,
        report.mode.as_str(),
        report.rows_fetched
    );
    if report.blank_rows > 0 {
        out.push_str(&format!(", {} blank skipped", report.blank_rows));
    }
    out.push('\n');

    match report.mode {
        PassMode::DryRun => {
            if let Some(pending) = &report.pending {
                out.push_str(&render_change_set(pending));
            }
            return out;
        }
        PassMode::Baseline => {}
        PassMode::Notify => {
            out.push_str(&format!(
                "notifications: {} sent, {} failed\n",
                report.changes_sent, report.changes_failed
            ));
            for result in &report.results {
                if let NotificationOutcome::Failed { reason } = &result.outcome {
                    out.push_str(&format!("  failed {} {}: {}\n", result.kind, result.key, reason));
                }
            }
        }
    }

    match (report.committed_version, report.skipped_due_to_conflict) {
        (Some(version), _) => out.push_str(&format!("snapshot committed at {}\n", version)),
        (None, true) => {
            out.push_str("snapshot not committed: another pass committed first\n")
        }
        (None, false) => out.push_str("snapshot not committed\n"),
    }
    out
}
