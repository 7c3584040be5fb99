#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for the batch loop.
///
/// Use this target for scan results, per-file outcomes, and batch summaries.
pub const TRACING_TARGET_BATCH: &str = "flowbatch_analyzer::batch";

/// Tracing target for tool process management.
///
/// Use this target for spawn, exit, timeout, and output capture events.
pub const TRACING_TARGET_PROCESS: &str = "flowbatch_analyzer::process";

mod batch;
mod config;
mod error;
mod invocation;
mod runner;
mod scan;

#[doc(hidden)]
pub mod prelude;

pub use batch::{BatchAnalyzer, BatchReport};
pub use config::{AnalyzerConfig, FailurePolicy, PathReconstruction, ToolConfig};
pub use error::{Error, Result};
pub use invocation::ToolInvocation;
pub use runner::{InvocationOutcome, ProcessRunner, ToolRunner, ToolStatus};
pub use scan::{InputFile, report_path, scan_inputs};
