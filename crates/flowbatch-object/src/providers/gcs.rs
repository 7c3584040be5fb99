//! Google Cloud Storage provider using [`object_store::gcp::GoogleCloudStorageBuilder`].

use derive_more::Deref;
use object_store::gcp::GoogleCloudStorageBuilder;
use serde::{Deserialize, Serialize};

use super::Client;
use crate::client::ObjectStoreClient;
use crate::types::Error;

/// Typed credentials for Google Cloud Storage.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GcsCredentials {
    /// GCS bucket name.
    pub bucket: String,
    /// Custom endpoint URL (for testing with a fake GCS server).
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// Google Cloud Storage-backed object storage client.
#[derive(Deref)]
pub struct GcsProvider(ObjectStoreClient);

impl GcsProvider {
    /// Unwraps the underlying client.
    pub fn into_inner(self) -> ObjectStoreClient {
        self.0
    }
}

impl Client for GcsProvider {
    type Credentials = GcsCredentials;

    const ID: &str = "gcs";

    async fn connect(creds: &Self::Credentials) -> Result<Self, Error> {
        let mut builder = GoogleCloudStorageBuilder::from_env().with_bucket_name(&creds.bucket);

        if let Some(endpoint) = &creds.endpoint {
            builder = builder.with_url(endpoint);
        }

        let store = builder
            .build()
            .map_err(|e| Error::configuration(&e, Self::ID).with_source(e))?;

        // Listings come back in lexicographic key order.
        Ok(Self(ObjectStoreClient::new(store).with_ordered_listing()))
    }
}
