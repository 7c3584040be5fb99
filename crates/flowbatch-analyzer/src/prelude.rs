//! Convenience re-exports.

pub use crate::{
    AnalyzerConfig, BatchAnalyzer, BatchReport, Error, FailurePolicy, InvocationOutcome,
    ProcessRunner, ToolConfig, ToolInvocation, ToolRunner, ToolStatus,
};
