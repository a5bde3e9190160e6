//! One-shot pass commands
//!
//! Usage: formwatch reconcile|diff|baseline [--json]

use clap::Args;
use formwatch_config::{Settings, Wiring};
use formwatch_core::diff::render_change_set;
use formwatch_core_types::PassContext;
use formwatch_engine::{apply_engine_command, render_pass_report, EngineCommand, PassReport};

#[derive(Debug, Args)]
pub struct PassArgs {
    /// Print the pass report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy)]
pub enum Kind {
    Reconcile,
    Diff,
    Baseline,
}

impl Kind {
    fn command(self) -> EngineCommand {
        match self {
            Kind::Reconcile => EngineCommand::Reconcile,
            Kind::Diff => EngineCommand::Preview,
            Kind::Baseline => EngineCommand::Baseline,
        }
    }
}

/// Execute a single pass of the given kind
pub fn execute(
    kind: Kind,
    args: PassArgs,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let wiring = Wiring::from_settings(settings)?;
    let ctx = PassContext::new("cli");
    let report = apply_engine_command(kind.command(), &ctx, wiring.collaborators())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render(kind, &report));
    }
    Ok(())
}

fn render(kind: Kind, report: &PassReport) -> String {
    match (kind, &report.pending) {
        (Kind::Diff, Some(pending)) => render_change_set(pending),
        _ => render_pass_report(report),
    }
}
