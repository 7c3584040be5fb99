//! Convenience re-exports.

pub use crate::client::{ListedObject, ObjectStoreClient};
pub use crate::fetch::{DownloadedObject, FetchConfig, FetchReport, Fetcher, SelectionRange};
pub use crate::providers::{Client, StorageConfig, StorageProvider};
pub use crate::types::{Error, ErrorKind, Result};
