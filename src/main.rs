use anyhow::{Context, Result};
use clap::Parser;
use job_status::cli::{handle_command, JobBoardCli};
use job_status::ConfigManager;
use std::fs::OpenOptions;
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = JobBoardCli::parse();
    let config = ConfigManager::load()?;

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true) // Clear file on startup
        .open(&config.logging.log_file)
        .with_context(|| {
            format!(
                "Failed to open log file: {}",
                config.logging.log_file.display()
            )
        })?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .init();

    info!(
        "Starting jobboard CLI against {} (timeout {}s)",
        config.api.base_url, config.api.timeout_seconds
    );

    handle_command(cli, config).await
}
