//! Local directory provider using [`object_store::local::LocalFileSystem`].
//!
//! Treats a directory as a bucket; keys are paths relative to it.

use std::path::PathBuf;

use derive_more::Deref;
use object_store::local::LocalFileSystem;
use serde::{Deserialize, Serialize};

use super::Client;
use crate::client::ObjectStoreClient;
use crate::types::Error;

/// Root directory of a local bucket.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalCredentials {
    /// Directory whose contents are listed as objects.
    pub root: PathBuf,
}

/// Filesystem-backed object storage client.
#[derive(Deref)]
pub struct LocalProvider(ObjectStoreClient);

impl LocalProvider {
    /// Unwraps the underlying client.
    pub fn into_inner(self) -> ObjectStoreClient {
        self.0
    }
}

impl Client for LocalProvider {
    type Credentials = LocalCredentials;

    const ID: &str = "local";

    async fn connect(creds: &Self::Credentials) -> Result<Self, Error> {
        let store = LocalFileSystem::new_with_prefix(&creds.root)
            .map_err(|e| Error::configuration(&e, Self::ID).with_source(e))?;

        Ok(Self(ObjectStoreClient::new(store)))
    }
}
