//! Formwatch Engine - reconciliation orchestration
//!
//! Runs one reconciliation pass over the collaborator traits defined in
//! `formwatch-core`: fetch rows, load the snapshot, diff, notify, and
//! commit the next snapshot against the loaded version.

pub mod commands;

pub use commands::engine_command::{apply_engine_command, Collaborators, EngineCommand};
pub use commands::reconcile::{run_pass, PassMode, PassOptions};
pub use commands::report::{render_pass_report, PassReport};
