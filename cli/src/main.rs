mod session;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use viewer::config::{ConfigError, ViewerConfig};
use viewer::consts::{DEFAULT_RECONNECT_DELAY_MS, DEFAULT_URL};

use crate::session::{Session, SessionError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[derive(Parser, Debug)]
#[command(name = "wsviz", about = "Headless client for a simulation's live state stream")]
struct Cli {
    /// Socket endpoint of the state stream.
    #[arg(long, env = "WSVIZ_URL", default_value = DEFAULT_URL)]
    url: String,

    /// Period of the reconnect timer while disconnected.
    #[arg(long, env = "WSVIZ_RECONNECT_DELAY_MS", default_value_t = DEFAULT_RECONNECT_DELAY_MS)]
    reconnect_delay_ms: u32,

    /// Exit after this many accepted frames or resets.
    #[arg(long)]
    exit_after: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = ViewerConfig { url: cli.url, reconnect_delay_ms: cli.reconnect_delay_ms, ..ViewerConfig::default() }
        .validate()?;

    let report = Session::new(&config).run_until(cli.exit_after, shutdown_signal()).await?;
    tracing::info!(
        updates = report.updates,
        connects = report.connects,
        attempts = report.attempts,
        "session finished"
    );
    Ok(())
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("interrupted");
}
