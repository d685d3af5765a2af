//! Binary crate for the `weather-csv` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Logging setup and exit codes

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use weather_csv_core::PipelineError;

mod cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cmd = cli::Cli::parse();
    init_tracing(cmd.verbose);

    match cmd.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

/// Logs go to stderr so stdout only carries the tool's own output.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// 1 for fetch and other failures, 2 for configuration, 3 for the output file.
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<PipelineError>() {
        Some(PipelineError::Config(_)) => 2,
        Some(PipelineError::Write(_)) => 3,
        Some(PipelineError::Fetch(_)) | None => 1,
    }
}
