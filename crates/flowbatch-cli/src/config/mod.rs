//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── quiet: bool                      # Log level floor
//! └── command
//!     ├── fetch: FetchArgs
//!     │   ├── storage: StorageConfig   # Provider, bucket, endpoint
//!     │   └── fetch: FetchConfig       # Destination, start, count, jobs
//!     └── analyze: AnalyzeArgs
//!         └── analyzer: AnalyzerConfig # Directories, policy, tool template
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! # Download the first five objects of a bucket
//! flowbatch fetch --bucket apks --count 5 -d ./apks
//!
//! # Or via environment variables
//! FLOWBATCH_BUCKET=apks FLOWBATCH_COUNT=5 flowbatch fetch
//! ```

mod analyze;
mod fetch;

use std::process;

pub use analyze::AnalyzeArgs;
use clap::{Parser, Subcommand};
pub use fetch::FetchArgs;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_STARTUP;

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "flowbatch")]
#[command(about = "Fetch APKs from object storage and run FlowDroid over them")]
#[command(version)]
pub struct Cli {
    /// Only log warnings and errors (RUST_LOG still takes precedence).
    #[arg(short, long, global = true, env = "FLOWBATCH_QUIET")]
    #[serde(default)]
    pub quiet: bool,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Clone, Subcommand, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Download a positional range of a bucket listing.
    Fetch(FetchArgs),
    /// Run the analysis tool once per input file.
    Analyze(AnalyzeArgs),
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// .env files are loaded before clap parses arguments, so environment
    /// variables from .env are used as defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        match &self.command {
            Command::Fetch(args) => args.validate(),
            Command::Analyze(args) => args.validate(),
        }
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        Self::log_build_info();
        match &self.command {
            Command::Fetch(args) => args.log(),
            Command::Analyze(args) => args.log(),
        }
    }

    /// Logs build information at debug level.
    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
