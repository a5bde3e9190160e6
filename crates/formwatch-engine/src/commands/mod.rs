//! Command orchestration layer.
//!
//! Provides the pass runner and the command surface shared by the CLI and
//! the webhook.

pub mod engine_command;
pub mod reconcile;
pub mod report;
