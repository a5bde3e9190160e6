//! Engine-level commands shared by every trigger.

#![allow(clippy::result_large_err)]

use crate::commands::reconcile::{run_pass, PassMode, PassOptions};
use crate::commands::report::PassReport;
use formwatch_core::errors::Result;
use formwatch_core::{Notifier, RowSource, SnapshotStore};
use formwatch_core_types::PassContext;

/// Commands a trigger (CLI, webhook, poll loop) can ask the engine for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCommand {
    /// Notify changes and commit.
    Reconcile,
    /// Report pending changes without side effects.
    Preview,
    /// Adopt the current rows as already notified.
    Baseline,
}

impl EngineCommand {
    pub fn mode(&self) -> PassMode {
        match self {
            EngineCommand::Reconcile => PassMode::Notify,
            EngineCommand::Preview => PassMode::DryRun,
            EngineCommand::Baseline => PassMode::Baseline,
        }
    }
}

/// The three collaborators a pass talks to.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub source: &'a dyn RowSource,
    pub store: &'a dyn SnapshotStore,
    pub notifier: &'a dyn Notifier,
}

/// Apply an engine command as one pass.
///
/// # Errors
///
/// See [`run_pass`].
pub fn apply_engine_command(
    cmd: EngineCommand,
    ctx: &PassContext,
    collaborators: Collaborators<'_>,
) -> Result<PassReport> {
    run_pass(
        ctx,
        collaborators.source,
        collaborators.store,
        collaborators.notifier,
        &PassOptions::with_mode(cmd.mode()),
    )
}
