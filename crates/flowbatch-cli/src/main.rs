#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod commands;
mod config;
mod telemetry;

use std::process;

use crate::config::{Cli, Command};

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "flowbatch_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "flowbatch_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "flowbatch_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::debug!(
            target: TRACING_TARGET_SHUTDOWN,
            "command completed successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = ?error,
            "command terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    telemetry::init_tracing(cli.quiet)?;
    cli.log();
    cli.validate()?;

    match cli.command {
        Command::Fetch(args) => commands::fetch(args).await,
        Command::Analyze(args) => commands::analyze(args).await,
    }
}
