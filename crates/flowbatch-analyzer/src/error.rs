//! Batch analyzer error types.

use std::path::PathBuf;

use crate::runner::ToolStatus;

/// Result type for analyzer operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that abort a batch.
///
/// A failing tool invocation only becomes an error under
/// [`FailurePolicy::Strict`](crate::FailurePolicy::Strict).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input directory could not be enumerated.
    #[error("failed to read input directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The capture log next to a report could not be created.
    #[error("failed to create output log {}: {source}", path.display())]
    CaptureLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tool did not succeed on an input (strict policy only).
    #[error("analysis of {} failed: {status}", input.display())]
    ToolFailed { input: PathBuf, status: ToolStatus },
}
