//! The per-file analysis loop.

use std::pin::pin;

use futures::{StreamExt, TryStreamExt};

use crate::TRACING_TARGET_BATCH;
use crate::config::{AnalyzerConfig, FailurePolicy};
use crate::error::{Error, Result};
use crate::runner::{InvocationOutcome, ToolRunner};
use crate::scan::{report_path, scan_inputs};

/// Outcomes of one batch, in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// One entry per input the tool was run on.
    pub outcomes: Vec<InvocationOutcome>,
}

impl BatchReport {
    /// Number of invocations that exited with code zero.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of invocations that did not.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Runs the analysis tool over every input in a directory.
pub struct BatchAnalyzer<R> {
    runner: R,
    config: AnalyzerConfig,
}

impl<R: ToolRunner> BatchAnalyzer<R> {
    /// Creates an analyzer that executes invocations through `runner`.
    pub fn new(runner: R, config: AnalyzerConfig) -> Self {
        Self { runner, config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Scans the input directory and runs the tool on each input.
    ///
    /// `on_outcome` is called for every finished invocation in file-name
    /// order. Under [`FailurePolicy::Continue`] tool failures are only
    /// recorded; under [`FailurePolicy::Strict`] the first one ends the
    /// batch with [`Error::ToolFailed`].
    #[tracing::instrument(
        name = "analyze.run",
        skip_all,
        fields(input_dir = %self.config.input_dir.display(), policy = %self.config.policy)
    )]
    pub async fn run<F>(&self, mut on_outcome: F) -> Result<BatchReport>
    where
        F: FnMut(&InvocationOutcome),
    {
        let config = &self.config;
        let inputs = scan_inputs(&config.input_dir, &config.extension).await?;
        tracing::info!(
            target: TRACING_TARGET_BATCH,
            inputs = inputs.len(),
            extension = %config.extension,
            "found inputs"
        );

        let invocations = inputs.iter().map(|input| {
            let report = report_path(&config.output_dir, input, &config.report_extension);
            config.tool.invocation(&input.path, &report)
        });

        let outcomes = futures::stream::iter(invocations)
            .map(|invocation| async move { self.runner.run(&invocation).await })
            .buffered(config.jobs.get());
        let mut outcomes = pin!(outcomes);

        let mut report = BatchReport::default();
        while let Some(outcome) = outcomes.try_next().await? {
            if outcome.is_success() {
                tracing::info!(
                    target: TRACING_TARGET_BATCH,
                    input = %outcome.input.display(),
                    report = %outcome.report.display(),
                    elapsed_ms = outcome.elapsed.as_millis() as u64,
                    "analysis finished"
                );
            } else {
                tracing::warn!(
                    target: TRACING_TARGET_BATCH,
                    input = %outcome.input.display(),
                    status = %outcome.status,
                    "analysis failed"
                );
            }

            on_outcome(&outcome);

            if !outcome.is_success() && config.policy == FailurePolicy::Strict {
                return Err(Error::ToolFailed {
                    input: outcome.input,
                    status: outcome.status,
                });
            }
            report.outcomes.push(outcome);
        }

        tracing::info!(
            target: TRACING_TARGET_BATCH,
            succeeded = report.succeeded(),
            failed = report.failed(),
            "batch complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::num::NonZeroUsize;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::invocation::ToolInvocation;
    use crate::runner::ToolStatus;

    /// Records invocations and fails the ones whose input stem is listed.
    #[derive(Default)]
    struct RecordingRunner {
        calls: Mutex<Vec<ToolInvocation>>,
        failing: HashSet<String>,
    }

    impl RecordingRunner {
        fn failing(stems: &[&str]) -> Self {
            Self {
                calls: Mutex::default(),
                failing: stems.iter().map(|s| s.to_string()).collect(),
            }
        }

        fn inputs(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|c| c.input.file_name().unwrap().to_string_lossy().into_owned())
                .collect()
        }
    }

    #[async_trait::async_trait]
    impl ToolRunner for RecordingRunner {
        async fn run(&self, invocation: &ToolInvocation) -> Result<InvocationOutcome> {
            self.calls.lock().unwrap().push(invocation.clone());
            let stem = invocation.input.file_stem().unwrap().to_string_lossy();
            let status = if self.failing.contains(&*stem) {
                ToolStatus::Exited(1)
            } else {
                ToolStatus::Exited(0)
            };
            Ok(InvocationOutcome {
                input: invocation.input.clone(),
                report: invocation.report.clone(),
                status,
                elapsed: Duration::ZERO,
            })
        }
    }

    fn input_dir(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        dir
    }

    #[tokio::test]
    async fn runs_once_per_matching_file() {
        let input = input_dir(&["a.apk", "b.apk", "notes.txt"]);
        let output = tempfile::tempdir().unwrap();

        let analyzer = BatchAnalyzer::new(
            RecordingRunner::default(),
            AnalyzerConfig::new(input.path(), output.path()),
        );
        let report = analyzer.run(|_| {}).await.unwrap();

        assert_eq!(analyzer.runner.inputs(), ["a.apk", "b.apk"]);
        let reports: Vec<_> = report.outcomes.iter().map(|o| o.report.clone()).collect();
        assert_eq!(
            reports,
            [output.path().join("a.txt"), output.path().join("b.txt")]
        );
    }

    #[tokio::test]
    async fn report_path_follows_input_name() {
        let input = input_dir(&["sample.apk"]);
        let analyzer = BatchAnalyzer::new(
            RecordingRunner::default(),
            AnalyzerConfig::new(input.path(), "/reports"),
        );
        analyzer.run(|_| {}).await.unwrap();

        let calls = analyzer.runner.calls.lock().unwrap();
        assert_eq!(calls[0].report, PathBuf::from("/reports/sample.txt"));
        assert_eq!(calls[0].input, input.path().join("sample.apk"));
    }

    #[tokio::test]
    async fn continues_past_failures_by_default() {
        let input = input_dir(&["a.apk", "b.apk", "c.apk"]);
        let analyzer = BatchAnalyzer::new(
            RecordingRunner::failing(&["a"]),
            AnalyzerConfig::new(input.path(), "/reports"),
        );

        let report = analyzer.run(|_| {}).await.unwrap();
        assert_eq!(analyzer.runner.inputs(), ["a.apk", "b.apk", "c.apk"]);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
    }

    #[tokio::test]
    async fn strict_policy_stops_at_first_failure() {
        let input = input_dir(&["a.apk", "b.apk", "c.apk"]);
        let config =
            AnalyzerConfig::new(input.path(), "/reports").with_policy(FailurePolicy::Strict);
        let analyzer = BatchAnalyzer::new(RecordingRunner::failing(&["b"]), config);

        let err = analyzer.run(|_| {}).await.unwrap_err();
        match err {
            Error::ToolFailed { input: failed, status } => {
                assert_eq!(failed, input.path().join("b.apk"));
                assert_eq!(status, ToolStatus::Exited(1));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(analyzer.runner.inputs(), ["a.apk", "b.apk"]);
    }

    #[tokio::test]
    async fn outcomes_keep_file_order_with_jobs() {
        let names: Vec<String> = (0..12).map(|i| format!("app{i:02}.apk")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let input = input_dir(&refs);

        let config = AnalyzerConfig::new(input.path(), "/reports")
            .with_jobs(NonZeroUsize::new(4).unwrap());
        let analyzer = BatchAnalyzer::new(RecordingRunner::default(), config);

        let mut seen = Vec::new();
        analyzer
            .run(|o| seen.push(o.input.file_name().unwrap().to_string_lossy().into_owned()))
            .await
            .unwrap();
        assert_eq!(seen, names);
    }

    #[tokio::test]
    async fn custom_extension_selects_other_inputs() {
        let input = input_dir(&["a.apk", "lib.jar"]);
        let config = AnalyzerConfig::new(input.path(), "/reports").with_extension("jar");
        let analyzer = BatchAnalyzer::new(RecordingRunner::default(), config);

        analyzer.run(|_| {}).await.unwrap();
        assert_eq!(analyzer.runner.inputs(), ["lib.jar"]);
    }

    /// Stand-in tool: writes the `-a` argument into the `-o` file, and
    /// exits non-zero for inputs whose name contains "broken".
    #[cfg(unix)]
    const FAKE_TOOL: &str = r#"
while [ $# -gt 0 ]; do
  case "$1" in
    -a) input="$2"; shift ;;
    -o) output="$2"; shift ;;
  esac
  shift
done
echo "analyzed $input" > "$output"
case "$input" in
  *broken*) exit 2 ;;
esac
"#;

    #[cfg(unix)]
    #[tokio::test]
    async fn end_to_end_with_process_runner() {
        use crate::config::ToolConfig;
        use crate::runner::ProcessRunner;

        let input = input_dir(&["a.apk", "broken.apk", "b.apk", "notes.txt"]);
        let output = tempfile::tempdir().unwrap();
        let script = output.path().join("fake-tool.sh");
        std::fs::write(&script, FAKE_TOOL).unwrap();

        let tool = ToolConfig {
            executable: PathBuf::from("sh"),
            main_class: script.to_string_lossy().into_owned(),
            ..ToolConfig::default()
        };
        let config = AnalyzerConfig::new(input.path(), output.path()).with_tool(tool);
        let report = BatchAnalyzer::new(ProcessRunner::new(), config)
            .run(|_| {})
            .await
            .unwrap();

        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.failed(), 1);
        for stem in ["a", "b", "broken"] {
            let text = std::fs::read_to_string(output.path().join(format!("{stem}.txt"))).unwrap();
            assert!(text.contains(&format!("{stem}.apk")));
        }
        assert!(!output.path().join("notes.txt").exists());
    }

    #[tokio::test]
    async fn empty_directory_runs_nothing() {
        let input = input_dir(&[]);
        let analyzer = BatchAnalyzer::new(
            RecordingRunner::default(),
            AnalyzerConfig::new(input.path(), Path::new("/reports")),
        );

        let report = analyzer.run(|_| {}).await.unwrap();
        assert!(report.outcomes.is_empty());
    }
}
