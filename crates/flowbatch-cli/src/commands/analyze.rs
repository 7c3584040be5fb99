//! `flowbatch analyze`.

use anyhow::Context;
use flowbatch_analyzer::{BatchAnalyzer, ProcessRunner};

use crate::config::AnalyzeArgs;

/// Runs the analysis tool over the input directory.
///
/// Prints one line per finished invocation to stdout. Under the default
/// failure policy this returns `Ok` even when invocations failed.
pub async fn analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let config = args.analyzer;
    let runner = ProcessRunner::new()
        .with_timeout(config.process_timeout())
        .with_capture_output(config.capture_output);

    BatchAnalyzer::new(runner, config)
        .run(|outcome| {
            println!(
                "Analyzed {} -> {} ({})",
                outcome.input.display(),
                outcome.report.display(),
                outcome.status
            )
        })
        .await
        .context("analysis aborted")?;

    Ok(())
}
