//! Formwatch CLI
//!
//! Command-line interface for running and inspecting reconciliation passes

use clap::{Parser, Subcommand};
use commands::pass::Kind;
use formwatch_config::{LoggingSettings, Settings};
use formwatch_core::logging_facility::{self, WorkerGuard};
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "formwatch")]
#[command(about = "Formwatch - notify new and edited form responses", long_about = None)]
struct Cli {
    /// TOML settings file (environment variables override it)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one pass: notify changed rows and commit the snapshot
    Reconcile(commands::pass::PassArgs),
    /// Show pending changes without notifying or committing
    Diff(commands::pass::PassArgs),
    /// Adopt the current rows as already notified
    Baseline(commands::pass::PassArgs),
    /// Inspect the stored snapshot
    Snapshot(commands::snapshot::SnapshotArgs),
    /// Run passes on a fixed interval until interrupted
    Watch(commands::watch::WatchArgs),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load(cli.config.as_deref())?;
    let _log_guard = init_logging(&settings.logging)?;

    match cli.command {
        Commands::Reconcile(args) => commands::pass::execute(Kind::Reconcile, args, &settings),
        Commands::Diff(args) => commands::pass::execute(Kind::Diff, args, &settings),
        Commands::Baseline(args) => commands::pass::execute(Kind::Baseline, args, &settings),
        Commands::Snapshot(args) => commands::snapshot::execute(args, &settings),
        Commands::Watch(args) => commands::watch::execute(args, &settings),
    }
}

fn init_logging(
    settings: &LoggingSettings,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    let profile = settings.profile()?;
    match &settings.file {
        Some(path) => Ok(Some(logging_facility::init_with_file(profile, path)?)),
        None => {
            logging_facility::init(profile);
            Ok(None)
        }
    }
}
