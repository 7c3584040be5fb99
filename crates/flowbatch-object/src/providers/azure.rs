//! Azure Blob Storage provider using [`object_store::azure::MicrosoftAzureBuilder`].

use derive_more::Deref;
use object_store::azure::MicrosoftAzureBuilder;
use serde::{Deserialize, Serialize};

use super::Client;
use crate::client::ObjectStoreClient;
use crate::types::Error;

/// Typed credentials for Azure Blob Storage.
///
/// The storage account and its key are read from `AZURE_STORAGE_*`.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureCredentials {
    /// Azure storage container name.
    pub container: String,
    /// Custom endpoint URL (for Azure Stack or Azurite).
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// Azure Blob Storage-backed object storage client.
#[derive(Deref)]
pub struct AzureProvider(ObjectStoreClient);

impl AzureProvider {
    /// Unwraps the underlying client.
    pub fn into_inner(self) -> ObjectStoreClient {
        self.0
    }
}

impl Client for AzureProvider {
    type Credentials = AzureCredentials;

    const ID: &str = "azure";

    async fn connect(creds: &Self::Credentials) -> Result<Self, Error> {
        let mut builder = MicrosoftAzureBuilder::from_env().with_container_name(&creds.container);

        if let Some(endpoint) = &creds.endpoint {
            builder = builder.with_endpoint(endpoint.clone());
        }

        let store = builder
            .build()
            .map_err(|e| Error::configuration(&e, Self::ID).with_source(e))?;

        // Listings come back in lexicographic key order.
        Ok(Self(ObjectStoreClient::new(store).with_ordered_listing()))
    }
}
