//! Background simulation worker.
//!
//! Reads `start` / `cancel` requests as newline-delimited JSON on stdin and
//! writes `progress`, `complete`, `cancelled` and `error` messages as
//! newline-delimited JSON on stdout. Logs go to stderr so stdout carries
//! nothing but protocol messages.
//!
//! # Startup Sequence
//!
//! 1. Load configuration (`LOOTSIM_CONFIG` or `lootsim-config.yaml`)
//! 2. Initialize structured logging (tracing) on stderr
//! 3. Serve requests until stdin closes

mod error;
mod session;

use lootsim_core::config::WorkerConfig;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::WorkerError;

/// Application entry point for the worker.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or stdio fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = WorkerConfig::load().map_err(WorkerError::from)?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    info!(
        shards = config.simulation.shards,
        progress_every = config.progress.every,
        cancel_mode = ?config.cancellation.mode,
        "lootsim-worker starting"
    );

    // 3. Serve until EOF.
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    session::serve(stdin, stdout, &config).await?;

    info!("lootsim-worker shutdown complete");
    Ok(())
}
