#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for object-store client operations.
///
/// Use this target for listing, download, and backend connection events.
pub const TRACING_TARGET_CLIENT: &str = "flowbatch_object::client";

/// Tracing target for the range fetcher.
///
/// Use this target for selection, progress, and per-object confirmation events.
pub const TRACING_TARGET_FETCH: &str = "flowbatch_object::fetch";

pub mod client;
/// Bucket range selection and download loop.
pub mod fetch;
/// Provider trait and object storage provider factories.
pub mod providers;
/// Error types.
pub mod types;

#[doc(hidden)]
pub mod prelude;

pub use types::{Error, ErrorKind, Result};
