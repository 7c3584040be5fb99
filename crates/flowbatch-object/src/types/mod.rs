//! Shared types.

pub mod error;

pub use error::{BoxedError, Error, ErrorKind, Result};
