//! Downloads a positional range of a bucket listing to a local directory.

mod selection;

use std::num::NonZeroUsize;
use std::ops::Range;
use std::path::PathBuf;
use std::pin::pin;

#[cfg(feature = "config")]
use clap::Args;
use futures::{StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};

pub use self::selection::SelectionRange;
use crate::TRACING_TARGET_FETCH;
use crate::client::{DEFAULT_LISTING_LIMIT, ListedObject, ObjectStoreClient};
use crate::types::{Error, ErrorKind, Result};

/// Range fetch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct FetchConfig {
    /// Existing local directory that receives the downloaded objects.
    #[cfg_attr(
        feature = "config",
        arg(short = 'd', long, env = "FLOWBATCH_DESTINATION", default_value = ".")
    )]
    pub destination: PathBuf,

    /// One-based position of the first object to download.
    ///
    /// Not validated: `0` selects from the end of the listing.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "FLOWBATCH_START", default_value_t = 1, allow_negative_numbers = true)
    )]
    #[serde(default = "default_start")]
    pub start: i64,

    /// Number of objects to download.
    #[cfg_attr(
        feature = "config",
        arg(short = 'n', long, env = "FLOWBATCH_COUNT", allow_negative_numbers = true)
    )]
    pub count: i64,

    /// Only list keys under this prefix.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "FLOWBATCH_PREFIX", default_value = "")
    )]
    #[serde(default)]
    pub prefix: String,

    /// Maximum number of objects taken from the listing (0 = unlimited).
    #[cfg_attr(
        feature = "config",
        arg(long, env = "FLOWBATCH_LISTING_LIMIT", default_value_t = DEFAULT_LISTING_LIMIT)
    )]
    #[serde(default = "default_listing_limit")]
    pub listing_limit: usize,

    /// Number of downloads kept in flight.
    #[cfg_attr(
        feature = "config",
        arg(short = 'j', long, env = "FLOWBATCH_FETCH_JOBS", default_value_t = NonZeroUsize::MIN)
    )]
    #[serde(default = "default_jobs")]
    pub jobs: NonZeroUsize,
}

fn default_start() -> i64 {
    1
}

fn default_listing_limit() -> usize {
    DEFAULT_LISTING_LIMIT
}

fn default_jobs() -> NonZeroUsize {
    NonZeroUsize::MIN
}

impl FetchConfig {
    /// Creates a sequential configuration with the default listing limit.
    pub fn new(destination: impl Into<PathBuf>, start: i64, count: i64) -> Self {
        Self {
            destination: destination.into(),
            start,
            count,
            prefix: String::new(),
            listing_limit: DEFAULT_LISTING_LIMIT,
            jobs: NonZeroUsize::MIN,
        }
    }

    /// Returns the selection window.
    pub const fn selection(&self) -> SelectionRange {
        SelectionRange::new(self.start, self.count)
    }

    /// Returns the listing limit, `None` when unlimited.
    pub const fn listing_limit(&self) -> Option<usize> {
        match self.listing_limit {
            0 => None,
            limit => Some(limit),
        }
    }

    /// Sets the number of concurrent downloads.
    #[must_use]
    pub fn with_jobs(mut self, jobs: NonZeroUsize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Sets the listing limit (0 = unlimited).
    #[must_use]
    pub fn with_listing_limit(mut self, limit: usize) -> Self {
        self.listing_limit = limit;
        self
    }

    /// Restricts the listing to `prefix`.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

/// A successfully downloaded object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedObject {
    /// Object key.
    pub key: String,
    /// Local file the object was written to.
    pub path: PathBuf,
    /// Bytes written.
    pub bytes: u64,
}

/// Summary of a completed fetch.
#[derive(Debug, Clone)]
pub struct FetchReport {
    /// Number of objects in the (possibly truncated) listing.
    pub listed: usize,
    /// Resolved listing positions that were selected.
    pub selected: Range<usize>,
    /// Downloads in listing order.
    pub downloaded: Vec<DownloadedObject>,
}

/// Downloads the selected range of a bucket listing.
///
/// Runs to completion or stops at the first error; there are no retries
/// and nothing already downloaded is rolled back.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: ObjectStoreClient,
    config: FetchConfig,
}

impl Fetcher {
    /// Creates a fetcher over `client`.
    pub fn new(client: ObjectStoreClient, config: FetchConfig) -> Self {
        Self { client, config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Lists the bucket, selects the configured range and downloads it.
    ///
    /// `on_complete` is invoked once per object, in listing order, right
    /// after its download finished.
    #[tracing::instrument(
        name = "fetch.run",
        skip_all,
        fields(start = self.config.start, count = self.config.count)
    )]
    pub async fn run<F>(&self, mut on_complete: F) -> Result<FetchReport>
    where
        F: FnMut(&DownloadedObject),
    {
        let listing = self
            .client
            .list_page(&self.config.prefix, self.config.listing_limit())
            .await?;

        let selection = self.config.selection();
        if selection.wraps_from_end() {
            tracing::warn!(
                target: TRACING_TARGET_FETCH,
                start = selection.start,
                "start position below 1 counts back from the end of the listing"
            );
        }

        let bounds = selection.slice_bounds(listing.len());
        let selected = &listing[bounds.clone()];
        tracing::info!(
            target: TRACING_TARGET_FETCH,
            listed = listing.len(),
            from = bounds.start,
            to = bounds.end,
            "selected objects"
        );

        if !selected.is_empty() {
            self.ensure_destination().await?;
        }

        let downloads = futures::stream::iter(selected.iter().cloned())
            .map(|object| self.download(object))
            .buffered(self.config.jobs.get());
        let mut downloads = pin!(downloads);

        let mut downloaded = Vec::with_capacity(selected.len());
        while let Some(object) = downloads.try_next().await? {
            tracing::info!(
                target: TRACING_TARGET_FETCH,
                key = %object.key,
                path = %object.path.display(),
                bytes = object.bytes,
                "downloaded object"
            );
            on_complete(&object);
            downloaded.push(object);
        }

        Ok(FetchReport {
            listed: listing.len(),
            selected: bounds,
            downloaded,
        })
    }

    async fn download(&self, object: ListedObject) -> Result<DownloadedObject> {
        let path = self.config.destination.join(&object.key);
        let bytes = self.client.download_to(&object.location, &path).await?;
        Ok(DownloadedObject {
            key: object.key,
            path,
            bytes,
        })
    }

    async fn ensure_destination(&self) -> Result<()> {
        let destination = &self.config.destination;
        let metadata = tokio::fs::metadata(destination)
            .await
            .map_err(|e| Error::io(destination, e))?;

        if !metadata.is_dir() {
            return Err(Error::new(
                ErrorKind::Io,
                format!("{} is not a directory", destination.display()),
            ));
        }
        Ok(())
    }
}
