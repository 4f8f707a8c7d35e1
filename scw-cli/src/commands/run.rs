//! Run command handlers
//!
//! Drives a smoke run through its lifecycle and fetches run status.

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::*;
use scw_client::{Connector, HttpConnector, ScwService};
use scw_core::domain::run::{Phase, RunRequest, RunStatus, TerminalStatus};
use scw_runner::{Console, RunSnapshot};
use std::path::PathBuf;

use crate::config::Config;

/// Arguments of `scw run`
#[derive(Args)]
pub struct RunArgs {
    /// Code to run
    #[arg(long, conflicts_with = "file")]
    code: Option<String>,

    /// Read the code to run from a file
    #[arg(long)]
    file: Option<PathBuf>,

    /// Language tag sent with the run
    #[arg(long, default_value = "python")]
    language: String,

    /// Name of the project created for the run
    #[arg(long)]
    project: Option<String>,
}

impl RunArgs {
    fn into_request(self) -> Result<RunRequest> {
        let defaults = RunRequest::default();

        let code = match (self.code, self.file) {
            (Some(code), _) => code,
            (None, Some(path)) => std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
            (None, None) => defaults.code,
        };

        Ok(RunRequest::new(
            self.project.unwrap_or(defaults.project_name),
            self.language,
            code,
        ))
    }
}

/// Resolve the API, then follow one run to its end
pub async fn run(args: RunArgs, config: &Config) -> Result<()> {
    let request = args.into_request()?;
    let console = config.console()?;

    console.startup().await;
    let endpoint = console.endpoint();
    if endpoint.is_empty() {
        bail!("{}", console.status_message());
    }
    println!(
        "{} {} ({})",
        "▸ Using".bold(),
        endpoint.as_str().cyan(),
        console.provenance().describe().dimmed()
    );

    let mut lifecycle = console.lifecycle();
    let instance = console.run(Some(request)).await;
    let mut last_phase = None;

    let snapshot = loop {
        {
            let snap = lifecycle.borrow_and_update();
            if snap.instance == instance {
                if last_phase != Some(snap.phase) {
                    last_phase = Some(snap.phase);
                    print_progress(&snap);
                }
                if snap.is_finished() {
                    break snap.clone();
                }
            }
        }

        tokio::select! {
            changed = lifecycle.changed() => {
                changed.context("Run controller stopped unexpectedly")?;
            }
            _ = tokio::signal::ctrl_c() => {
                console.cancel_run("Interrupted.").await;
                bail!("Interrupted");
            }
        }
    };

    println!();
    print_summary(&snapshot);

    match snapshot.phase {
        Phase::Terminal(TerminalStatus::Completed) => Ok(()),
        _ => bail!("{}", snapshot.status_message),
    }
}

/// Fetch and display the status of one run
pub async fn status(run_id: &str, config: &Config) -> Result<()> {
    let console_config = config.console_config()?;
    let console = Console::from_config(console_config.clone())?;

    console.startup().await;
    let endpoint = console.endpoint();
    if endpoint.is_empty() {
        bail!("{}", console.status_message());
    }

    let connector = HttpConnector::new(console_config.request_timeout)?;
    let status = connector
        .connect(&endpoint)
        .run_status(run_id)
        .await
        .with_context(|| format!("Failed to fetch run {}", run_id))?;

    println!("{}", "Run Details:".bold());
    println!("  ID:     {}", run_id.cyan());
    print_status(&status);

    Ok(())
}

fn print_progress(snap: &RunSnapshot) {
    println!(
        "  {} {:<16} {}",
        "▸".cyan(),
        colorize_phase(snap.phase).to_string(),
        snap.status_message.dimmed()
    );
}

fn print_summary(snap: &RunSnapshot) {
    println!("{}", "Run Summary:".bold());
    println!("  Phase:    {}", colorize_phase(snap.phase));
    if !snap.project_id.is_empty() {
        println!("  Project:  {}", snap.project_id.dimmed());
    }
    if !snap.run_id.is_empty() {
        println!("  Run:      {}", snap.run_id.cyan());
    }
    if let Some(duration) = snap.duration() {
        println!("  Duration: {}ms", duration.num_milliseconds());
    }
    println!("  Message:  {}", snap.status_message);

    if let Some(payload) = &snap.last_payload {
        print_status(payload);
    }
}

fn print_status(status: &RunStatus) {
    println!("  Status: {}", colorize_status(&status.status));

    if !status.logs.is_empty() {
        println!("\n{}", "Logs:".bold());
        println!("{}", "─".repeat(80).dimmed());
        for line in &status.logs {
            println!("{}", line);
        }
        println!("{}", "─".repeat(80).dimmed());
    }

    if let Some(result) = status.result_text() {
        println!("\n{}", "Result:".bold());
        println!("{}", result);
    }

    if !status.extra.is_empty() {
        println!("\n{}", "Other fields:".bold());
        for (key, value) in &status.extra {
            println!("  {} = {}", key.cyan(), value);
        }
    }
}

/// Colorize lifecycle phase for display
fn colorize_phase(phase: Phase) -> ColoredString {
    let phase_str = phase.to_string();
    match phase {
        Phase::Idle => phase_str.dimmed(),
        Phase::Probing | Phase::CreatingProject | Phase::Submitting => phase_str.yellow(),
        Phase::Polling => phase_str.cyan(),
        Phase::Terminal(TerminalStatus::Completed) => phase_str.green(),
        Phase::Terminal(TerminalStatus::Failed) | Phase::Aborted => phase_str.red(),
    }
}

/// Colorize a remote run status for display
fn colorize_status(status: &str) -> ColoredString {
    match TerminalStatus::from_status(status) {
        Some(TerminalStatus::Completed) => status.green(),
        Some(TerminalStatus::Failed) => status.red(),
        None => status.yellow(),
    }
}
