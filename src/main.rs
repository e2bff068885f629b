mod prompt;

use anyhow::Context;
use reddit_client::{RedditClient, RedditCredentials};
use std::future::Future;
use std::io;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use watch_core::{ErrorExt, WatchSettings};
use watch_service::{ConsoleSink, Monitor};

const DEFAULT_LOG_FILTER: &str =
    "subwatch=info,watch_service=info,reddit_client=info,watch_core=info";
const CONFIG_PATH_VAR: &str = "SUBWATCH_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "subwatch.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the variables may come from the environment.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(io::stderr)
        .init();

    tracing::info!("Starting subwatch");

    let mut settings = load_settings()?;
    prompt::fill_missing(&mut settings, &mut io::stdin().lock(), &mut io::stdout())
        .context("failed to read monitor settings")?;
    let (scan_config, monitor_config) = settings.build().context("invalid monitor settings")?;

    let credentials = RedditCredentials::from_env().context("Reddit credentials missing")?;
    let client = RedditClient::new(credentials).context("failed to build Reddit client")?;
    if let Err(e) = client.authenticate().await {
        e.log_error();
        return Err(anyhow::Error::new(e).context("failed to authenticate with Reddit"));
    }
    tracing::info!("Authenticated with Reddit");

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_interrupt(tokio::signal::ctrl_c(), cancel.clone()));

    let mut monitor = Monitor::new(client, scan_config, monitor_config, ConsoleSink::stdout())
        .context("failed to start monitor")?;
    let stats = monitor.run(&cancel).await;

    tracing::info!(
        cycles = stats.cycles,
        recoveries = stats.recoveries,
        records = stats.records_reported,
        "Monitor finished"
    );
    Ok(())
}

/// Cancels `cancel` once `signal` fires. If the handler cannot be installed the
/// monitor is left running.
async fn cancel_on_interrupt<F>(signal: F, cancel: CancellationToken)
where
    F: Future<Output = io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            tracing::info!("Interrupt received, shutting down");
            cancel.cancel();
        }
        Err(e) => tracing::error!(
            "Failed to listen for Ctrl-C, monitor cannot be interrupted: {}",
            e
        ),
    }
}

/// Reads the TOML settings file if one is configured or present.
fn load_settings() -> anyhow::Result<WatchSettings> {
    let (path, explicit) = match std::env::var(CONFIG_PATH_VAR) {
        Ok(path) if !path.trim().is_empty() => (PathBuf::from(path), true),
        _ => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };

    if !explicit && !path.exists() {
        tracing::debug!("No {} found, asking for settings", DEFAULT_CONFIG_PATH);
        return Ok(WatchSettings::default());
    }

    tracing::info!("Loading settings from {}", path.display());
    WatchSettings::load(&path).with_context(|| format!("failed to load {}", path.display()))
}
