//! Snapshot inspection commands

use chrono::DateTime;
use clap::{Args, Subcommand};
use formwatch_config::{open_store, Settings};
use formwatch_core::SnapshotStore;

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    #[command(subcommand)]
    pub command: SnapshotCommand,
}

#[derive(Debug, Subcommand)]
pub enum SnapshotCommand {
    /// Print the document reference, version and row count
    Show(ShowArgs),
    /// Print the most recent commits, newest first
    History(HistoryArgs),
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Also list every row key in the snapshot
    #[arg(long)]
    pub keys: bool,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

pub fn execute(args: SnapshotArgs, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        SnapshotCommand::Show(show_args) => execute_show(show_args, settings),
        SnapshotCommand::History(history_args) => execute_history(history_args, settings),
    }
}

fn execute_show(args: ShowArgs, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(&settings.store)?;

    let Some(info) = store.info()? else {
        println!("No snapshot committed yet for {}", store.doc_ref());
        return Ok(());
    };

    println!("Snapshot:");
    println!("  doc_ref: {}", info.doc_ref);
    println!("  version: {}", info.version);
    println!("  rows: {}", info.row_count);
    println!("  digest: {}", info.body_digest);
    println!("  committed_at: {}", format_millis(info.committed_at));

    if args.keys {
        let loaded = store.load()?;
        for key in loaded.snapshot.keys() {
            println!("  - {}", key);
        }
    }
    Ok(())
}

fn execute_history(
    args: HistoryArgs,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(&settings.store)?;
    let commits = store.history(args.limit)?;

    if commits.is_empty() {
        println!("No commits recorded for {}", store.doc_ref());
        return Ok(());
    }
    for commit in commits {
        println!(
            "{:<6} {}  {} row(s)  {}",
            commit.version.to_string(),
            format_millis(commit.committed_at),
            commit.row_count,
            &commit.body_digest[..commit.body_digest.len().min(12)]
        );
    }
    Ok(())
}

fn format_millis(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| millis.to_string())
}
