//! `fetch` command configuration.

use anyhow::{Result as AnyhowResult, anyhow};
use clap::Args;
use flowbatch_object::fetch::FetchConfig;
use flowbatch_object::providers::StorageConfig;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Arguments of `flowbatch fetch`.
///
/// # Environment Variables
///
/// - `FLOWBATCH_PROVIDER` - `s3`, `gcs`, `azure` or `local` (default: s3)
/// - `FLOWBATCH_BUCKET` - Bucket, container, or directory to list
/// - `FLOWBATCH_DESTINATION` - Existing download directory (default: .)
/// - `FLOWBATCH_START` - One-based position of the first object (default: 1)
/// - `FLOWBATCH_COUNT` - Number of objects to download
/// - `FLOWBATCH_FETCH_JOBS` - Concurrent downloads (default: 1)
///
/// Provider credentials use the provider's own variables (`AWS_*`,
/// `GOOGLE_*`, `AZURE_*`).
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct FetchArgs {
    /// Bucket location and provider.
    #[command(flatten)]
    pub storage: StorageConfig,

    /// Range selection and download settings.
    #[command(flatten)]
    pub fetch: FetchConfig,
}

impl FetchArgs {
    /// Validates the configuration.
    ///
    /// The selection window is not checked; out-of-range
    /// values yield a shorter or empty selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket name is empty.
    pub fn validate(&self) -> AnyhowResult<()> {
        if self.storage.bucket.trim().is_empty() {
            return Err(anyhow!("Bucket name must not be empty."));
        }
        Ok(())
    }

    /// Logs the fetch configuration.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            provider = %self.storage.provider,
            bucket = %self.storage.bucket,
            endpoint = ?self.storage.endpoint,
            destination = %self.fetch.destination.display(),
            start = self.fetch.start,
            count = self.fetch.count,
            prefix = %self.fetch.prefix,
            listing_limit = ?self.fetch.listing_limit(),
            jobs = self.fetch.jobs.get(),
            "Fetch configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use flowbatch_object::providers::StorageProvider;

    use crate::config::{Cli, Command};

    fn parse(args: &[&str]) -> super::FetchArgs {
        let cli = Cli::try_parse_from(["flowbatch", "fetch"].iter().chain(args)).unwrap();
        match cli.command {
            Command::Fetch(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn defaults_start_at_first_object() {
        let args = parse(&["--bucket", "apks", "--count", "5"]);
        assert_eq!(args.storage.provider, StorageProvider::S3);
        assert_eq!(args.fetch.start, 1);
        assert_eq!(args.fetch.count, 5);
        assert_eq!(args.fetch.jobs.get(), 1);
        assert_eq!(args.fetch.listing_limit(), Some(1000));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn accepts_zero_and_negative_start() {
        let args = parse(&["--bucket", "apks", "-n", "5", "--start", "0"]);
        assert_eq!(args.fetch.start, 0);

        let args = parse(&["--bucket", "apks", "-n", "5", "--start", "-2"]);
        assert_eq!(args.fetch.start, -2);
    }

    #[test]
    fn parses_provider_and_limits() {
        let args = parse(&[
            "--provider",
            "local",
            "--bucket",
            "/srv/apks",
            "-n",
            "3",
            "--listing-limit",
            "0",
            "-j",
            "4",
        ]);
        assert_eq!(args.storage.provider, StorageProvider::Local);
        assert_eq!(args.fetch.listing_limit(), None);
        assert_eq!(args.fetch.jobs.get(), 4);
    }

    #[test]
    fn zero_jobs_is_rejected() {
        let result = Cli::try_parse_from([
            "flowbatch", "fetch", "--bucket", "apks", "-n", "1", "-j", "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn blank_bucket_fails_validation() {
        let args = parse(&["--bucket", " ", "-n", "1"]);
        assert!(args.validate().is_err());
    }
}
