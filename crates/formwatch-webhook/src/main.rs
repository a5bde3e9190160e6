//! formwatch-webhook entry point.
//!
//! Loads settings, wires the collaborators, and serves the router until
//! Ctrl-C.

use clap::Parser;
use formwatch_config::{Settings, Wiring};
use formwatch_core::logging_facility;
use formwatch_webhook::{build_router, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "formwatch-webhook")]
#[command(about = "Run reconciliation passes on Drive push notifications", long_about = None)]
struct Args {
    /// TOML settings file (environment variables override it)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load(args.config.as_deref())?;
    let profile = settings.logging.profile()?;
    // Flushes the log file when run returns
    let _log_guard = match &settings.logging.file {
        Some(path) => Some(logging_facility::init_with_file(profile, path)?),
        None => {
            logging_facility::init(profile);
            None
        }
    };

    let addr = settings.webhook.bind_addr()?;
    let wiring = Wiring::from_settings(&settings)?;
    let state = Arc::new(
        AppState::from_wiring(wiring).with_channel_token(settings.webhook.channel_token.clone()),
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(addr, Arc::clone(&state)))?;

    // Blocking HTTP clients must be dropped outside the runtime.
    drop(runtime);
    drop(state);
    Ok(())
}

async fn serve(addr: SocketAddr, state: Arc<AppState>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("formwatch-webhook listening on http://{}", addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutting down");
}
