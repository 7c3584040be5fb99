//! Client trait for creating authenticated store connections.

use serde::de::DeserializeOwned;

use crate::types::Error;

/// Factory for connecting to one kind of object-storage service.
///
/// Implementations build a backend from typed credentials and wrap it in
/// an [`ObjectStoreClient`](crate::client::ObjectStoreClient).
pub trait Client: Sized + Send + 'static {
    /// Strongly-typed credentials for this provider.
    type Credentials: DeserializeOwned + Send + Sync;

    /// Unique identifier (e.g. "s3", "gcs").
    const ID: &str;

    /// Create a connected client instance.
    fn connect(
        creds: &Self::Credentials,
    ) -> impl Future<Output = Result<Self, Error>> + Send;
}
