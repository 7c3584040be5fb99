//! `flowbatch fetch`.

use anyhow::Context;
use flowbatch_object::fetch::Fetcher;

use crate::TRACING_TARGET_SHUTDOWN;
use crate::config::FetchArgs;

/// Connects to the bucket and downloads the configured range.
///
/// Prints one confirmation line per downloaded object to stdout.
pub async fn fetch(args: FetchArgs) -> anyhow::Result<()> {
    let client = args
        .storage
        .connect()
        .await
        .with_context(|| format!("failed to connect to bucket {}", args.storage.bucket))?;

    let report = Fetcher::new(client, args.fetch)
        .run(|object| println!("Downloaded {} to {}", object.key, object.path.display()))
        .await
        .context("fetch aborted")?;

    tracing::info!(
        target: TRACING_TARGET_SHUTDOWN,
        listed = report.listed,
        downloaded = report.downloaded.len(),
        bytes = report.downloaded.iter().map(|d| d.bytes).sum::<u64>(),
        "fetch complete"
    );
    Ok(())
}
