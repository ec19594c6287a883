//! datafiles - command-line client for the data files API

use clap::Parser;
use datafiles_cli::{run, Cli};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Parse arguments
    let cli = Cli::parse();

    // Setup logging; stdout is reserved for JSON output
    let log_level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("datafiles_client={0},datafiles_cli={0}", log_level).into()
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Using API at {}", cli.base_url);

    run(cli).await
}
