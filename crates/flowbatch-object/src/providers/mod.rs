//! Client trait and object storage providers.

mod azure;
mod client;
mod gcs;
mod local;
mod s3;

use std::path::PathBuf;

pub use azure::{AzureCredentials, AzureProvider};
#[cfg(feature = "config")]
use clap::{Args, ValueEnum};
pub use client::Client;
pub use gcs::{GcsCredentials, GcsProvider};
pub use local::{LocalCredentials, LocalProvider};
pub use s3::{S3Credentials, S3Provider};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::TRACING_TARGET_CLIENT;
use crate::client::ObjectStoreClient;
use crate::types::Result;

/// Supported object storage services.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[derive(AsRefStr, Display)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StorageProvider {
    /// Amazon S3 or an S3-compatible service.
    #[default]
    S3,
    /// Google Cloud Storage.
    Gcs,
    /// Azure Blob Storage.
    Azure,
    /// A local directory acting as a bucket.
    Local,
}

/// Which bucket to read from and how to reach it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct StorageConfig {
    /// Object storage service hosting the bucket.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "FLOWBATCH_PROVIDER", value_enum, default_value_t = StorageProvider::S3)
    )]
    #[serde(default)]
    pub provider: StorageProvider,

    /// Bucket (or container) name; a directory path for the local provider.
    #[cfg_attr(feature = "config", arg(long, env = "FLOWBATCH_BUCKET"))]
    pub bucket: String,

    /// Region override (S3 only).
    #[cfg_attr(feature = "config", arg(long, env = "FLOWBATCH_REGION"))]
    #[serde(default)]
    pub region: Option<String>,

    /// Custom service endpoint (MinIO, fake GCS server, Azurite).
    #[cfg_attr(feature = "config", arg(long, env = "FLOWBATCH_ENDPOINT"))]
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl StorageConfig {
    /// Creates a configuration for `bucket` on `provider`.
    pub fn new(provider: StorageProvider, bucket: impl Into<String>) -> Self {
        Self {
            provider,
            bucket: bucket.into(),
            region: None,
            endpoint: None,
        }
    }

    /// Builds a client for the configured bucket.
    ///
    /// Credentials come from the provider's standard environment variables.
    pub async fn connect(&self) -> Result<ObjectStoreClient> {
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            provider = %self.provider,
            bucket = %self.bucket,
            endpoint = ?self.endpoint,
            "connecting to object store"
        );

        let client = match self.provider {
            StorageProvider::S3 => {
                let creds = S3Credentials {
                    bucket: self.bucket.clone(),
                    region: self.region.clone(),
                    endpoint: self.endpoint.clone(),
                };
                S3Provider::connect(&creds).await?.into_inner()
            }
            StorageProvider::Gcs => {
                let creds = GcsCredentials {
                    bucket: self.bucket.clone(),
                    endpoint: self.endpoint.clone(),
                };
                GcsProvider::connect(&creds).await?.into_inner()
            }
            StorageProvider::Azure => {
                let creds = AzureCredentials {
                    container: self.bucket.clone(),
                    endpoint: self.endpoint.clone(),
                };
                AzureProvider::connect(&creds).await?.into_inner()
            }
            StorageProvider::Local => {
                let creds = LocalCredentials {
                    root: PathBuf::from(&self.bucket),
                };
                LocalProvider::connect(&creds).await?.into_inner()
            }
        };

        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_are_snake_case() {
        assert_eq!(StorageProvider::S3.as_ref(), "s3");
        assert_eq!(StorageProvider::Local.to_string(), "local");
    }

    #[tokio::test]
    async fn connects_local_bucket() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.apk"), b"a").unwrap();

        let config = StorageConfig::new(StorageProvider::Local, dir.path().to_string_lossy());
        let client = config.connect().await.unwrap();
        assert_eq!(client.list_page("", None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn s3_with_http_endpoint_builds() {
        let mut config = StorageConfig::new(StorageProvider::S3, "apks");
        config.region = Some("us-east-1".to_string());
        config.endpoint = Some("http://localhost:9000".to_string());
        assert!(config.connect().await.is_ok());
    }
}
