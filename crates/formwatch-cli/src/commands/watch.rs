//! Polling loop
//!
//! Usage: formwatch watch [--interval SECS] [--passes N]

use clap::Args;
use formwatch_config::{Settings, Wiring};
use formwatch_core::log_op_error;
use formwatch_core_types::PassContext;
use formwatch_engine::{apply_engine_command, render_pass_report, EngineCommand};
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Seconds between pass starts (defaults to watch.interval_secs)
    #[arg(long)]
    pub interval: Option<u64>,

    /// Stop after this many passes
    #[arg(long)]
    pub passes: Option<u64>,
}

/// Run notify passes until interrupted. A failed pass is logged and the
/// next one runs on schedule.
pub fn execute(args: WatchArgs, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let interval = match args.interval {
        Some(0) => return Err("--interval must be at least 1 second".into()),
        Some(secs) => Duration::from_secs(secs),
        None => settings.watch.interval(),
    };
    let wiring = Wiring::from_settings(settings)?;
    info!(interval_secs = interval.as_secs(), "Watching for changes");

    let mut completed = 0u64;
    loop {
        let started = Instant::now();
        let ctx = PassContext::new("watch");

        match apply_engine_command(EngineCommand::Reconcile, &ctx, wiring.collaborators()) {
            Ok(report) => {
                if report.changes_sent + report.changes_failed > 0 {
                    print!("{}", render_pass_report(&report));
                }
            }
            Err(e) => {
                let duration_ms = started.elapsed().as_millis() as u64;
                log_op_error!("watch_pass", e.clone(), duration_ms = duration_ms);
                eprintln!("pass failed: {}", e);
            }
        }

        completed += 1;
        if args.passes.is_some_and(|limit| completed >= limit) {
            return Ok(());
        }
        std::thread::sleep(interval.saturating_sub(started.elapsed()));
    }
}
