//! Tool process execution.

use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;

use crate::TRACING_TARGET_PROCESS;
use crate::error::{Error, Result};
use crate::invocation::ToolInvocation;

/// How a single tool invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolStatus {
    /// The process exited with this code.
    Exited(i32),
    /// The process was terminated by a signal.
    Terminated,
    /// The process outlived the configured timeout and was killed.
    TimedOut(Duration),
    /// The process could not be started.
    SpawnFailed(String),
    /// The process started but waiting for it failed.
    WaitFailed(String),
}

impl ToolStatus {
    /// Returns `true` only for a zero exit code.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Exited(0))
    }
}

impl fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exit code {code}"),
            Self::Terminated => f.write_str("terminated by signal"),
            Self::TimedOut(after) => write!(f, "timed out after {}s", after.as_secs()),
            Self::SpawnFailed(reason) => write!(f, "spawn failed: {reason}"),
            Self::WaitFailed(reason) => write!(f, "wait failed: {reason}"),
        }
    }
}

/// Result of running the tool on one input.
#[derive(Debug, Clone)]
pub struct InvocationOutcome {
    /// Input file that was analyzed.
    pub input: PathBuf,
    /// Report path handed to the tool; it may be missing or partial.
    pub report: PathBuf,
    /// How the process ended.
    pub status: ToolStatus,
    /// Wall-clock time spent.
    pub elapsed: Duration,
}

impl InvocationOutcome {
    /// Returns `true` if the tool exited with code zero.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Executes tool invocations.
///
/// Implementations never inspect the report; they only report how the
/// process ended. An `Err` is reserved for local I/O failures around the
/// process, not for the tool failing.
#[async_trait::async_trait]
pub trait ToolRunner: Send + Sync {
    /// Runs `invocation` to completion.
    async fn run(&self, invocation: &ToolInvocation) -> Result<InvocationOutcome>;
}

/// Runs the tool as a child process.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
    capture_output: bool,
}

impl ProcessRunner {
    /// Creates a runner without a timeout whose children inherit stdio.
    pub fn new() -> Self {
        Self::default()
    }

    /// Kills processes still running after `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Redirects stdout and stderr of each process to `<report>.log`.
    #[must_use]
    pub fn with_capture_output(mut self, capture_output: bool) -> Self {
        self.capture_output = capture_output;
        self
    }

    /// Returns the capture log path used for `invocation`.
    pub fn log_path(invocation: &ToolInvocation) -> PathBuf {
        let mut path = invocation.report.clone().into_os_string();
        path.push(".log");
        PathBuf::from(path)
    }

    async fn command(&self, invocation: &ToolInvocation) -> Result<Command> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        if self.capture_output {
            let path = Self::log_path(invocation);
            let capture_error = |source| Error::CaptureLog {
                path: path.clone(),
                source,
            };
            let stdout = tokio::fs::File::create(&path)
                .await
                .map_err(capture_error)?;
            let stderr = stdout.try_clone().await.map_err(capture_error)?;
            command
                .stdout(stdout.into_std().await)
                .stderr(stderr.into_std().await);
        }

        Ok(command)
    }
}

#[async_trait::async_trait]
impl ToolRunner for ProcessRunner {
    #[tracing::instrument(
        name = "tool.run",
        skip_all,
        fields(input = %invocation.input.display())
    )]
    async fn run(&self, invocation: &ToolInvocation) -> Result<InvocationOutcome> {
        let started = Instant::now();
        let mut command = self.command(invocation).await?;

        tracing::debug!(
            target: TRACING_TARGET_PROCESS,
            command = %invocation,
            "spawning tool"
        );

        let status = match command.spawn() {
            Err(err) => ToolStatus::SpawnFailed(err.to_string()),
            Ok(mut child) => {
                let waited = match self.timeout {
                    Some(limit) => tokio::time::timeout(limit, child.wait()).await.ok(),
                    None => Some(child.wait().await),
                };

                match waited {
                    Some(Ok(exit)) => exit
                        .code()
                        .map_or(ToolStatus::Terminated, ToolStatus::Exited),
                    Some(Err(err)) => ToolStatus::WaitFailed(err.to_string()),
                    None => {
                        if let Err(err) = child.kill().await {
                            tracing::warn!(
                                target: TRACING_TARGET_PROCESS,
                                error = %err,
                                "failed to kill timed out tool"
                            );
                        }
                        ToolStatus::TimedOut(self.timeout.unwrap_or_default())
                    }
                }
            }
        };

        let elapsed = started.elapsed();
        tracing::debug!(
            target: TRACING_TARGET_PROCESS,
            status = %status,
            elapsed_ms = elapsed.as_millis() as u64,
            "tool finished"
        );

        Ok(InvocationOutcome {
            input: invocation.input.clone(),
            report: invocation.report.clone(),
            status,
            elapsed,
        })
    }
}
