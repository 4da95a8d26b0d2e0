mod checks;
mod config;
mod dispatcher;
mod github;
mod http;
mod logger;
mod notify;
mod target;
mod tracker;

use anyhow::{Context, Result};
use clap::Parser;
use config::{Config, Overrides};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Parser)]
#[command(
    name = "pr-notifier",
    version,
    about = "Watch GitHub pull request checks and push the results to ntfy"
)]
struct Cli {
    /// Repository or pull request URL (falls back to REPO_URL)
    url: Option<String>,

    /// Path to a YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seconds between polls
    #[arg(short, long)]
    interval: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose)?;

    let overrides = Overrides {
        url: cli.url,
        poll_interval: cli.interval,
    };
    let config = Config::load(cli.config.as_deref(), overrides)
        .await
        .context("Cannot load configuration")?;

    let cancel = CancellationToken::new();
    listen_for_shutdown(cancel.clone());

    dispatcher::run(&config, &cancel)
        .await
        .context("Cannot start monitoring")?;

    Ok(())
}

fn listen_for_shutdown(cancel: CancellationToken) {
    tokio::spawn(async move {
        wait_for_signal().await;
        cancel.cancel();
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        Err(e) => {
            log::warn!("Cannot listen for SIGTERM: {}", e);
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
