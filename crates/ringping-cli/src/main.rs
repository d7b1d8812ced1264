//! ringping binary
//!
//! Launches the pingers and the echo dispatcher, waits for the run to end,
//! then prints the latency report on stdout.

mod cli;
mod config;

use anyhow::{Context, Result};
use cli::{Cli, OutputFormat};
use ringping_harness::{RunController, RunOutcome, WorkerStatus};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse_args();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = cli.run_config();
    let controller = RunController::new(config).context("invalid run configuration")?;
    controller
        .install_interrupt_handler()
        .context("cannot handle interrupts")?;

    let banner = format!("Test will run for {} seconds", cli.duration_secs);
    match cli.format {
        OutputFormat::Text => println!("{banner}"),
        // stdout carries only the JSON document
        OutputFormat::Json => eprintln!("{banner}"),
    }
    let outcome = controller.run()?;

    log_workers(&outcome);
    print_report(&outcome, cli.format)?;

    match outcome.worst_failure() {
        None => Ok(ExitCode::SUCCESS),
        Some(failure) => {
            tracing::error!(failed = outcome.failed_workers(), "run failed: {}", failure);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn log_workers(outcome: &RunOutcome) {
    for worker in &outcome.workers {
        match &worker.status {
            WorkerStatus::Stopped => {
                tracing::info!(token = %worker.token, round_trips = worker.round_trips, "pinger stopped")
            }
            WorkerStatus::Failed(e) => {
                tracing::warn!(token = %worker.token, round_trips = worker.round_trips, "pinger failed: {}", e)
            }
        }
    }
}

fn print_report(outcome: &RunOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", outcome.snapshot.summary),
        OutputFormat::Json => println!("{}", outcome.snapshot.to_json()?),
    }
    Ok(())
}
