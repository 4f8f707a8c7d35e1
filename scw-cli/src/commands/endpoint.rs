//! Endpoint command handlers
//!
//! Discovery, health checks and management of the saved API URL.

use anyhow::{Result, bail};
use clap::Subcommand;
use colored::*;
use scw_core::domain::health::HealthState;
use scw_core::domain::provenance::Provenance;
use scw_runner::{Console, Resolution};

use crate::config::Config;

/// URL subcommands
#[derive(Subcommand)]
pub enum UrlCommands {
    /// Show the resolved, built-in and saved API URLs
    Show,
    /// Save an API URL and use it from now on
    Set {
        /// API base URL, e.g. https://scw-api.onrender.com
        url: String,
    },
    /// Forget the saved API URL and detect again
    Reset,
    /// Save the built-in API URL
    UseBuiltin,
    /// Switch back to the saved API URL
    UseSaved,
}

/// Handle URL commands
pub async fn handle_url_command(command: UrlCommands, config: &Config) -> Result<()> {
    let console = config.console()?;

    match command {
        UrlCommands::Show => {
            console.startup().await;
            print_endpoint(&console);
        }
        UrlCommands::Set { url } => {
            console.startup().await;
            let endpoint = console.enter_manual(&url).await;
            if endpoint.is_empty() {
                println!("{}", "Saved API URL cleared.".yellow());
            } else {
                println!("{} {}", "✓ Saved".green(), endpoint.as_str().cyan());
            }
        }
        UrlCommands::Reset => {
            let resolution = console.reset().await;
            println!("{}", "Saved API URL removed.".yellow());
            println!();
            print_resolution(&resolution);
        }
        UrlCommands::UseBuiltin => {
            console.startup().await;
            if !console.use_builtin().await {
                bail!("{}", console.status_message());
            }
            print_endpoint(&console);
        }
        UrlCommands::UseSaved => {
            console.startup().await;
            if !console.use_saved().await {
                bail!("{}", console.status_message());
            }
            print_endpoint(&console);
        }
    }

    Ok(())
}

/// Run the cascade and print the discovery guide
pub async fn detect(config: &Config) -> Result<()> {
    let console = config.console()?;
    let resolution = console.startup().await;

    print_resolution(&resolution);
    if !resolution.is_resolved() {
        bail!("{}", console.status_message());
    }

    Ok(())
}

/// Resolve, then probe the health endpoint
pub async fn ping(config: &Config) -> Result<()> {
    let console = config.console()?;
    console.startup().await;

    let endpoint = console.endpoint();
    let outcome = console.ping().await;

    if !endpoint.is_empty() {
        println!("API:    {}", endpoint.as_str().cyan());
    }
    println!("Health: {}", colorize_health(outcome.health()));

    if outcome.is_healthy() {
        println!("{}", console.status_message().green());
        Ok(())
    } else {
        bail!("{}", console.status_message())
    }
}

fn print_resolution(resolution: &Resolution) {
    println!("{}", "Discovery:".bold());
    for line in &resolution.trace {
        println!("  {}", line.dimmed());
    }
    println!();

    if resolution.is_resolved() {
        println!("API:    {}", resolution.endpoint.as_str().cyan());
        println!("Source: {}", colorize_provenance(resolution.provenance));
    } else {
        println!("{}", "No API URL found.".yellow());
    }
}

fn print_endpoint(console: &Console) {
    let endpoint = console.endpoint();

    println!("{}", "API URL:".bold());
    if endpoint.is_empty() {
        println!("  Current:  {}", "(none)".yellow());
    } else {
        println!("  Current:  {}", endpoint.as_str().cyan());
    }
    println!("  Source:   {}", colorize_provenance(console.provenance()));
    println!(
        "  Built-in: {}",
        console
            .builtin()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "(not set)".to_string())
            .dimmed()
    );
    println!(
        "  Saved:    {}",
        console
            .saved()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "(none)".to_string())
            .dimmed()
    );

    if console.builtin_overridden() {
        println!();
        println!(
            "{}",
            "⚠ Overriding the built-in API URL. Use `scw url use-builtin` to switch back.".yellow()
        );
    }
    if console.saved_differs() {
        println!();
        println!(
            "{}",
            "⚠ A different API URL is saved. Use `scw url use-saved` to switch to it.".yellow()
        );
    }
}

/// Colorize health state for display
fn colorize_health(health: HealthState) -> ColoredString {
    let health_str = health.to_string();
    match health {
        HealthState::Unknown => health_str.dimmed(),
        HealthState::Healthy => health_str.green(),
        HealthState::Unhealthy => health_str.red(),
    }
}

/// Colorize provenance for display
fn colorize_provenance(provenance: Provenance) -> ColoredString {
    let text = provenance.describe().to_string();
    match provenance {
        Provenance::None => text.yellow(),
        Provenance::ManualEntry => text.magenta(),
        _ => text.cyan(),
    }
}
