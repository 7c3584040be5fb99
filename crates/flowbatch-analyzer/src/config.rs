//! Analyzer and tool configuration.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

#[cfg(feature = "config")]
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

// Default values
const DEFAULT_EXECUTABLE: &str = "java";
const DEFAULT_MAIN_CLASS: &str = "soot.jimple.infoflow.cmd.MainClass";
const DEFAULT_PLATFORM_JAR: &str = "android.jar";
const DEFAULT_SOURCES_SINKS: &str = "SourcesAndSinks.txt";
const DEFAULT_PRECISION_FLAG: &str = "-sink-precise";
const DEFAULT_EXTENSION: &str = "apk";
const DEFAULT_REPORT_EXTENSION: &str = "txt";

/// What happens when the tool fails on one input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[derive(AsRefStr, Display)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FailurePolicy {
    /// Record the failure and move on to the next input.
    #[default]
    Continue,
    /// Stop the batch at the first failed input.
    Strict,
}

/// Taint path reconstruction mode passed as `-pr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(AsRefStr, Display)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "UPPERCASE")]
pub enum PathReconstruction {
    /// Do not reconstruct paths.
    None,
    /// Fast, imprecise reconstruction.
    Fast,
    /// Full reconstruction.
    Precise,
}

/// How to launch the analysis tool.
///
/// The command line is
/// `<executable> [-cp <classpath>] <main-class> -a <input> -p <platform-jar>
/// -s <sources-sinks> <precision-flag> -o <report>` followed by the optional
/// timeout, path reconstruction, and extra arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ToolConfig {
    /// Program to execute (usually a JVM launcher).
    #[cfg_attr(
        feature = "config",
        arg(long = "tool", env = "FLOWBATCH_TOOL", default_value = DEFAULT_EXECUTABLE)
    )]
    #[serde(default = "default_executable")]
    pub executable: PathBuf,

    /// Classpath holding the tool, passed as `-cp`.
    #[cfg_attr(feature = "config", arg(long, env = "FLOWBATCH_CLASSPATH"))]
    #[serde(default)]
    pub classpath: Option<PathBuf>,

    /// Entry point class of the tool.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "FLOWBATCH_MAIN_CLASS", default_value = DEFAULT_MAIN_CLASS)
    )]
    #[serde(default = "default_main_class")]
    pub main_class: String,

    /// Android platform API archive, passed as `-p`.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "FLOWBATCH_PLATFORM_JAR", default_value = DEFAULT_PLATFORM_JAR)
    )]
    #[serde(default = "default_platform_jar")]
    pub platform_jar: PathBuf,

    /// Sources and sinks definition file, passed as `-s`.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "FLOWBATCH_SOURCES_SINKS", default_value = DEFAULT_SOURCES_SINKS)
    )]
    #[serde(default = "default_sources_sinks")]
    pub sources_sinks: PathBuf,

    /// Precision flag placed before the output argument.
    #[cfg_attr(
        feature = "config",
        arg(
            long,
            env = "FLOWBATCH_PRECISION_FLAG",
            default_value = DEFAULT_PRECISION_FLAG,
            allow_hyphen_values = true
        )
    )]
    #[serde(default = "default_precision_flag")]
    pub precision_flag: String,

    /// Data flow analysis timeout in seconds (`-dt`).
    #[cfg_attr(feature = "config", arg(long, env = "FLOWBATCH_DATA_FLOW_TIMEOUT"))]
    #[serde(default)]
    pub data_flow_timeout: Option<u64>,

    /// Callback collection timeout in seconds (`-ct`).
    #[cfg_attr(feature = "config", arg(long, env = "FLOWBATCH_CALLBACK_TIMEOUT"))]
    #[serde(default)]
    pub callback_timeout: Option<u64>,

    /// Result collection timeout in seconds (`-rt`).
    #[cfg_attr(feature = "config", arg(long, env = "FLOWBATCH_RESULT_TIMEOUT"))]
    #[serde(default)]
    pub result_timeout: Option<u64>,

    /// Path reconstruction mode (`-pr`).
    #[cfg_attr(
        feature = "config",
        arg(long, env = "FLOWBATCH_PATH_RECONSTRUCTION", value_enum)
    )]
    #[serde(default)]
    pub path_reconstruction: Option<PathReconstruction>,

    /// Extra arguments appended verbatim (repeatable).
    #[cfg_attr(
        feature = "config",
        arg(long = "tool-arg", allow_hyphen_values = true)
    )]
    #[serde(default)]
    pub tool_args: Vec<String>,
}

fn default_executable() -> PathBuf {
    PathBuf::from(DEFAULT_EXECUTABLE)
}

fn default_main_class() -> String {
    DEFAULT_MAIN_CLASS.to_string()
}

fn default_platform_jar() -> PathBuf {
    PathBuf::from(DEFAULT_PLATFORM_JAR)
}

fn default_sources_sinks() -> PathBuf {
    PathBuf::from(DEFAULT_SOURCES_SINKS)
}

fn default_precision_flag() -> String {
    DEFAULT_PRECISION_FLAG.to_string()
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            classpath: None,
            main_class: default_main_class(),
            platform_jar: default_platform_jar(),
            sources_sinks: default_sources_sinks(),
            precision_flag: default_precision_flag(),
            data_flow_timeout: None,
            callback_timeout: None,
            result_timeout: None,
            path_reconstruction: None,
            tool_args: Vec::new(),
        }
    }
}

/// Batch analyzer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct AnalyzerConfig {
    /// Directory scanned (non-recursively) for inputs.
    #[cfg_attr(feature = "config", arg(short = 'i', long, env = "FLOWBATCH_INPUT_DIR"))]
    pub input_dir: PathBuf,

    /// Directory receiving one report per input.
    #[cfg_attr(feature = "config", arg(short = 'o', long, env = "FLOWBATCH_OUTPUT_DIR"))]
    pub output_dir: PathBuf,

    /// File name extension that marks an input.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "FLOWBATCH_EXTENSION", default_value = DEFAULT_EXTENSION)
    )]
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Extension given to report files.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "FLOWBATCH_REPORT_EXTENSION", default_value = DEFAULT_REPORT_EXTENSION)
    )]
    #[serde(default = "default_report_extension")]
    pub report_extension: String,

    /// Whether a failed analysis stops the batch.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "FLOWBATCH_FAILURE_POLICY", value_enum, default_value_t = FailurePolicy::Continue)
    )]
    #[serde(default)]
    pub policy: FailurePolicy,

    /// Number of tool processes run at once.
    #[cfg_attr(
        feature = "config",
        arg(short = 'j', long, env = "FLOWBATCH_ANALYZE_JOBS", default_value_t = NonZeroUsize::MIN)
    )]
    #[serde(default = "default_jobs")]
    pub jobs: NonZeroUsize,

    /// Wall-clock limit per tool process in seconds; the process is killed on expiry.
    #[cfg_attr(feature = "config", arg(long, env = "FLOWBATCH_PROCESS_TIMEOUT"))]
    #[serde(default)]
    pub process_timeout: Option<u64>,

    /// Write the tool's stdout and stderr to `<report>.log`.
    #[cfg_attr(feature = "config", arg(long, env = "FLOWBATCH_CAPTURE_OUTPUT"))]
    #[serde(default)]
    pub capture_output: bool,

    /// Tool invocation template.
    #[cfg_attr(feature = "config", command(flatten))]
    #[serde(default)]
    pub tool: ToolConfig,
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_report_extension() -> String {
    DEFAULT_REPORT_EXTENSION.to_string()
}

fn default_jobs() -> NonZeroUsize {
    NonZeroUsize::MIN
}

impl AnalyzerConfig {
    /// Creates a sequential, continue-on-failure configuration.
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            extension: default_extension(),
            report_extension: default_report_extension(),
            policy: FailurePolicy::default(),
            jobs: NonZeroUsize::MIN,
            process_timeout: None,
            capture_output: false,
            tool: ToolConfig::default(),
        }
    }

    /// Returns the per-process timeout as a Duration, if set.
    #[inline]
    pub fn process_timeout(&self) -> Option<Duration> {
        self.process_timeout.map(Duration::from_secs)
    }

    /// Set the tool invocation template.
    #[must_use]
    pub fn with_tool(mut self, tool: ToolConfig) -> Self {
        self.tool = tool;
        self
    }

    /// Set the failure policy.
    #[must_use]
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the number of concurrent tool processes.
    #[must_use]
    pub fn with_jobs(mut self, jobs: NonZeroUsize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Set the input extension.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}
