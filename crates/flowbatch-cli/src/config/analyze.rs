//! `analyze` command configuration.

use anyhow::{Result as AnyhowResult, anyhow};
use clap::Args;
use flowbatch_analyzer::AnalyzerConfig;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Arguments of `flowbatch analyze`.
///
/// # Environment Variables
///
/// - `FLOWBATCH_INPUT_DIR` - Directory holding the inputs
/// - `FLOWBATCH_OUTPUT_DIR` - Directory receiving reports
/// - `FLOWBATCH_TOOL` - Program to launch (default: java)
/// - `FLOWBATCH_CLASSPATH` - Tool classpath, passed as `-cp`
/// - `FLOWBATCH_PLATFORM_JAR` - Android platform archive (default: android.jar)
/// - `FLOWBATCH_SOURCES_SINKS` - Sources and sinks file (default: SourcesAndSinks.txt)
/// - `FLOWBATCH_FAILURE_POLICY` - `continue` or `strict` (default: continue)
/// - `FLOWBATCH_ANALYZE_JOBS` - Concurrent tool processes (default: 1)
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct AnalyzeArgs {
    /// Input scanning, tool template, and failure handling.
    #[command(flatten)]
    pub analyzer: AnalyzerConfig,
}

impl AnalyzeArgs {
    /// Validates the configuration.
    ///
    /// Tool paths are not checked here; a missing tool shows up as a failed
    /// invocation, in line with the failure policy.
    ///
    /// # Errors
    ///
    /// Returns an error if an extension is empty or the process timeout is zero.
    pub fn validate(&self) -> AnyhowResult<()> {
        let config = &self.analyzer;

        if config.extension.trim_start_matches('.').is_empty() {
            return Err(anyhow!("Input extension must not be empty."));
        }

        if config.report_extension.trim_start_matches('.').is_empty() {
            return Err(anyhow!("Report extension must not be empty."));
        }

        if config.process_timeout == Some(0) {
            return Err(anyhow!(
                "Process timeout of 0 seconds is invalid. Omit it to wait indefinitely."
            ));
        }

        Ok(())
    }

    /// Logs the analyze configuration.
    pub fn log(&self) {
        let config = &self.analyzer;
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            input_dir = %config.input_dir.display(),
            output_dir = %config.output_dir.display(),
            extension = %config.extension,
            report_extension = %config.report_extension,
            policy = %config.policy,
            jobs = config.jobs.get(),
            process_timeout_secs = ?config.process_timeout,
            capture_output = config.capture_output,
            "Analyze configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            executable = %config.tool.executable.display(),
            classpath = ?config.tool.classpath,
            main_class = %config.tool.main_class,
            platform_jar = %config.tool.platform_jar.display(),
            sources_sinks = %config.tool.sources_sinks.display(),
            precision_flag = %config.tool.precision_flag,
            "Tool configuration"
        );
    }
}
