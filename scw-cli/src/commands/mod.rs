//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod endpoint;
mod run;

pub use endpoint::UrlCommands;
pub use run::RunArgs;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the discovery cascade and explain each tier
    Detect,
    /// Check the health of the resolved API
    Ping,
    /// Show or change the API URL
    Url {
        #[command(subcommand)]
        command: UrlCommands,
    },
    /// Create a project, submit a run and follow it to the end
    Run(RunArgs),
    /// Fetch the status of an existing run
    Status {
        /// Run ID
        run_id: String,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Detect => endpoint::detect(config).await,
        Commands::Ping => endpoint::ping(config).await,
        Commands::Url { command } => endpoint::handle_url_command(command, config).await,
        Commands::Run(args) => run::run(args, config).await,
        Commands::Status { run_id } => run::status(&run_id, config).await,
    }
}
