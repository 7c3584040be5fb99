//! S3-compatible provider using [`object_store::aws::AmazonS3Builder`].
//!
//! Works with AWS S3, MinIO, and any S3-compatible service.

use derive_more::Deref;
use object_store::aws::AmazonS3Builder;
use serde::{Deserialize, Serialize};

use super::Client;
use crate::client::ObjectStoreClient;
use crate::types::Error;

/// Typed credentials for the S3-compatible provider.
///
/// Anything left unset falls back to the standard `AWS_*` environment
/// variables (`AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, `AWS_REGION`, ...).
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Credentials {
    /// S3 bucket name.
    pub bucket: String,
    /// AWS region.
    #[serde(default)]
    pub region: Option<String>,
    /// Endpoint URL (e.g. `http://localhost:9000` for MinIO).
    /// Required for non-AWS S3-compatible services.
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// S3-backed object storage client.
#[derive(Deref)]
pub struct S3Provider(ObjectStoreClient);

impl S3Provider {
    /// Unwraps the underlying client.
    pub fn into_inner(self) -> ObjectStoreClient {
        self.0
    }
}

impl Client for S3Provider {
    type Credentials = S3Credentials;

    const ID: &str = "s3";

    async fn connect(creds: &Self::Credentials) -> Result<Self, Error> {
        let mut builder = AmazonS3Builder::from_env().with_bucket_name(&creds.bucket);

        if let Some(region) = &creds.region {
            builder = builder.with_region(region);
        }

        if let Some(endpoint) = &creds.endpoint {
            builder = builder.with_endpoint(endpoint);
            if endpoint.starts_with("http://") {
                builder = builder.with_allow_http(true);
            }
        }

        let store = builder
            .build()
            .map_err(|e| Error::configuration(&e, Self::ID).with_source(e))?;

        // Listings come back in lexicographic key order.
        Ok(Self(ObjectStoreClient::new(store).with_ordered_listing()))
    }
}
