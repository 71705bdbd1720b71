//! Boxlite: file storage, share links, and sync conflict resolution.
//!
//! Main entry point that wires all crates together and runs the command
//! shell on stdin.

use std::sync::Arc;

use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::{EnvFilter, fmt};

use boxlite_core::config::AppConfig;
use boxlite_core::error::AppError;
use boxlite_core::traits::clock::SystemClock;
use boxlite_service::ServiceContainer;

mod shell;

use shell::Shell;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "boxlite", version, about = "File storage and sharing shell")]
struct Cli {
    /// Directory holding default.toml and environment overlays
    #[arg(long, env = "BOXLITE_CONFIG_DIR", default_value = "config")]
    config_dir: String,

    /// Environment overlay to apply ({config_dir}/{env}.toml)
    #[arg(long, env = "BOXLITE_ENV", default_value = "development")]
    env: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config_dir, &cli.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Boxlite error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging. Logs go to stderr; stdout carries results.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

/// Build the services and serve commands until stdin closes.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Boxlite v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Services ─────────────────────────────────────────
    tracing::info!(
        "Initializing services (storage provider: {})...",
        config.storage.provider
    );
    let services = ServiceContainer::build(&config, Arc::new(SystemClock)).await?;

    // ── Step 2: Health check ─────────────────────────────────────
    services.storage.ensure_healthy().await?;
    tracing::info!("Content store healthy");

    // ── Step 3: Command shell ────────────────────────────────────
    let shell = Shell::new(services);
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    tokio::select! {
        result = shell.run(stdin, stdout) => result?,
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received");
        }
    }

    tracing::info!("Boxlite stopped");
    Ok(())
}

/// Resolves on Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
