//! Unified object-store client backed by [`object_store::ObjectStore`].
//!
//! [`ObjectStoreClient`] is a thin, cloneable wrapper around
//! `Arc<dyn ObjectStore>` that exposes the two calls the fetcher needs:
//! a single truncated listing and a streaming download to a local file.
//! Every public method is instrumented with [`tracing`].

use std::path::Path as FsPath;
use std::sync::Arc;

use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use object_store::ObjectStore;
use object_store::path::Path;
use tokio::io::AsyncWriteExt;

use crate::TRACING_TARGET_CLIENT;
use crate::types::{Error, Result};

/// Number of objects a single S3 `ListObjectsV2` response carries by default.
pub const DEFAULT_LISTING_LIMIT: usize = 1000;

/// One entry of a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedObject {
    /// Location as returned by the backend; used to fetch the object.
    pub location: Path,
    /// Object key within the bucket, as a plain string.
    pub key: String,
    /// Size in bytes as reported by the listing.
    pub size: u64,
}

/// Cloneable handle to any [`ObjectStore`] backend (S3, Azure, GCS, ...).
#[derive(Clone, Debug)]
pub struct ObjectStoreClient {
    store: Arc<dyn ObjectStore>,
    ordered_listing: bool,
}

impl ObjectStoreClient {
    /// Wrap a concrete [`ObjectStore`] implementation.
    ///
    /// The backend's listing order is not trusted: listings are read in
    /// full and sorted before the limit applies.
    pub fn new(store: impl ObjectStore) -> Self {
        Self {
            store: Arc::new(store),
            ordered_listing: false,
        }
    }

    /// Marks the backend as listing keys in lexicographic order, so a
    /// limited listing can stop after `limit` entries.
    #[must_use]
    pub fn with_ordered_listing(mut self) -> Self {
        self.ordered_listing = true;
        self
    }

    /// List objects under `prefix` as a single page.
    ///
    /// Returns the first `limit` objects in key order; objects past the
    /// limit are silently dropped, matching a single non-paginated listing
    /// call. `None` lifts the limit.
    #[tracing::instrument(name = "object.list_page", skip(self), fields(count))]
    pub async fn list_page(&self, prefix: &str, limit: Option<usize>) -> Result<Vec<ListedObject>> {
        let prefix = if prefix.is_empty() {
            None
        } else {
            Some(Path::from(prefix))
        };

        let stream = self.store.list(prefix.as_ref());
        let stream = match limit {
            Some(limit) if self.ordered_listing => stream.take(limit).boxed(),
            _ => stream,
        };

        let mut objects: Vec<ListedObject> = stream
            .map_ok(|meta| ListedObject {
                key: meta.location.to_string(),
                location: meta.location,
                size: meta.size,
            })
            .try_collect()
            .await?;
        objects.sort_by(|a, b| a.key.cmp(&b.key));
        if let Some(limit) = limit {
            objects.truncate(limit);
        }

        tracing::Span::current().record("count", objects.len());
        Ok(objects)
    }

    /// Stream the object at `location` into the local file at `dest`.
    ///
    /// Missing parent directories of `dest` are created; `dest` itself is
    /// created or truncated. Returns the number of bytes written.
    #[tracing::instrument(
        name = "object.download",
        skip(self, location, dest),
        fields(location = %location, dest = %dest.display())
    )]
    pub async fn download_to(&self, location: &Path, dest: &FsPath) -> Result<u64> {
        let result = self.store.get(location).await?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io(parent, e))?;
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| Error::io(dest, e))?;

        let mut body = result.into_stream();
        let mut written = 0u64;
        while let Some(chunk) = body.next().await {
            let chunk: Bytes = chunk?;
            file.write_all(&chunk)
                .await
                .map_err(|e| Error::io(dest, e))?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(|e| Error::io(dest, e))?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            bytes = written,
            "object downloaded"
        );
        Ok(written)
    }

    /// Seeds `key` with `data`; the key is stored verbatim.
    #[cfg(test)]
    pub(crate) async fn put(&self, key: &str, data: Bytes) -> Result<()> {
        let location = Path::parse(key).map_err(object_store::Error::from)?;
        self.store.put(&location, data.into()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use object_store::memory::InMemory;

    use super::*;
    use crate::providers::{Client, LocalCredentials, LocalProvider};
    use crate::types::ErrorKind;

    fn test_client() -> ObjectStoreClient {
        ObjectStoreClient::new(InMemory::new())
    }

    async fn seed(client: &ObjectStoreClient, keys: &[&str]) {
        for key in keys {
            client.put(key, Bytes::from(key.to_string())).await.unwrap();
        }
    }

    fn keys(objects: Vec<ListedObject>) -> Vec<String> {
        objects.into_iter().map(|o| o.key).collect()
    }

    #[tokio::test]
    async fn list_page_is_sorted_by_key() {
        let client = test_client();
        seed(&client, &["c.apk", "a.apk", "b.apk"]).await;

        let listed = client.list_page("", None).await.unwrap();
        assert_eq!(keys(listed), ["a.apk", "b.apk", "c.apk"]);
    }

    #[tokio::test]
    async fn list_page_truncates_to_limit() {
        let client = test_client();
        seed(&client, &["0.apk", "1.apk", "2.apk", "3.apk"]).await;

        let listed = client.list_page("", Some(2)).await.unwrap();
        assert_eq!(keys(listed), ["0.apk", "1.apk"]);
    }

    #[tokio::test]
    async fn limit_keeps_lowest_keys_on_unordered_backend() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["q", "z", "b", "m", "a", "k", "c", "y", "d", "x", "e", "w"] {
            std::fs::write(dir.path().join(format!("{name}.apk")), name).unwrap();
        }
        let creds = LocalCredentials {
            root: dir.path().to_path_buf(),
        };
        let client = LocalProvider::connect(&creds).await.unwrap().into_inner();

        let listed = client.list_page("", Some(3)).await.unwrap();
        assert_eq!(keys(listed), ["a.apk", "b.apk", "c.apk"]);
    }

    #[tokio::test]
    async fn ordered_listing_still_sorts_and_limits() {
        let client = test_client().with_ordered_listing();
        seed(&client, &["b.apk", "a.apk", "c.apk"]).await;

        let listed = client.list_page("", Some(2)).await.unwrap();
        assert_eq!(keys(listed), ["a.apk", "b.apk"]);
    }

    #[tokio::test]
    async fn list_page_reports_sizes() {
        let client = test_client();
        client.put("sized.apk", Bytes::from("12345")).await.unwrap();

        let items = client.list_page("", None).await.unwrap();
        assert_eq!(
            items,
            [ListedObject {
                location: Path::from("sized.apk"),
                key: "sized.apk".to_string(),
                size: 5
            }]
        );
    }

    #[tokio::test]
    async fn list_page_filters_prefix() {
        let client = test_client();
        seed(&client, &["apps/a.apk", "apps/b.apk", "other/c.apk"]).await;

        let items = client.list_page("apps", None).await.unwrap();
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn download_writes_file() {
        let client = test_client();
        client
            .put("app.apk", Bytes::from_static(b"PK\x03\x04"))
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("app.apk");
        let written = client
            .download_to(&Path::from("app.apk"), &dest)
            .await
            .unwrap();

        assert_eq!(written, 4);
        assert_eq!(std::fs::read(&dest).unwrap(), b"PK\x03\x04");
    }

    #[tokio::test]
    async fn download_uses_listed_location_for_reserved_characters() {
        let client = test_client();
        seed(&client, &["app[1].apk", "app#1.apk", "50%.apk"]).await;

        let dir = tempfile::tempdir().unwrap();
        for object in client.list_page("", None).await.unwrap() {
            let dest = dir.path().join(&object.key);
            client.download_to(&object.location, &dest).await.unwrap();
            assert_eq!(std::fs::read_to_string(&dest).unwrap(), object.key);
        }
        assert!(dir.path().join("app[1].apk").is_file());
        assert!(dir.path().join("app#1.apk").is_file());
    }

    #[tokio::test]
    async fn download_creates_nested_directories() {
        let client = test_client();
        client
            .put("vendor/x/app.apk", Bytes::from("nested"))
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("vendor/x/app.apk");
        client
            .download_to(&Path::from("vendor/x/app.apk"), &dest)
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "nested");
    }

    #[tokio::test]
    async fn download_missing_key_is_not_found() {
        let client = test_client();
        let dir = tempfile::tempdir().unwrap();

        let err = client
            .download_to(&Path::from("missing.apk"), &dir.path().join("missing.apk"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert!(!dir.path().join("missing.apk").exists());
    }
}
