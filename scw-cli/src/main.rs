//! SCW CLI
//!
//! Command-line interface for locating the SCW API, checking its health and
//! driving smoke runs against it.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "scw")]
#[command(about = "SCW API discovery and smoke-run CLI", long_about = None)]
struct Cli {
    /// Built-in API URL, tried before any other discovery tier
    #[arg(long, env = "SCW_API_URL")]
    api_url: Option<String>,

    /// URL the UI is served from, used by the host heuristic and /whoami probe
    #[arg(long, env = "SCW_UI_ORIGIN")]
    origin: Option<String>,

    /// Preference file holding the saved API URL
    #[arg(long, env = "SCW_PREFERENCES")]
    preferences: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, env = "SCW_REQUEST_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Delay between run status polls in milliseconds
    #[arg(long, env = "SCW_POLL_INTERVAL_MS")]
    poll_interval_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scw_cli=warn,scw_runner=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        api_url: cli.api_url,
        origin: cli.origin,
        preferences: cli.preferences,
        timeout_secs: cli.timeout_secs,
        poll_interval_ms: cli.poll_interval_ms,
    };

    handle_command(cli.command, &config).await
}
