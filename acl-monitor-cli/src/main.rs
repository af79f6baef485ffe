mod commands;
mod config;
mod ui;

use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::commands::Cli;

const SHUTDOWN_GRACE_MS: u64 = 200;

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for reports
    let default_level = if cli.verbose() { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level))
        )
        .with_writer(std::io::stderr)
        .init();

    // Initialize tokio runtime
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(async {
        cli.execute().await
    });

    // Do not wait on a blocking stdin read left behind by an interrupted replay
    runtime.shutdown_timeout(Duration::from_millis(SHUTDOWN_GRACE_MS));
    result
}
