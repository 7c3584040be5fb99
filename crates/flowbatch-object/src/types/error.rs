//! Error type for object-store and fetch operations.

use std::path::Path;

use strum::{AsRefStr, IntoStaticStr};

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with the crate [`Error`] type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors that can occur while listing or downloading objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Credentials were missing, invalid, or rejected.
    Authentication,
    /// The bucket or a listed key does not exist.
    NotFound,
    /// Local filesystem failure (destination missing or not writable).
    Io,
    /// The storage backend could not be configured.
    Configuration,
    /// Any other backend or network failure.
    Backend,
}

/// A structured error carrying a kind, a message, and an optional source.
#[derive(Debug, thiserror::Error)]
#[error("{}: {message}", kind.as_ref())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Human readable description.
    pub message: String,
    /// Optional source error.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attaches a source error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Creates a configuration error labelled with the provider id.
    pub fn configuration(msg: impl std::fmt::Display, provider: &str) -> Self {
        Self::new(ErrorKind::Configuration, format!("[{provider}] {msg}"))
    }

    /// Creates a filesystem error for `path`.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, format!("{}: {source}", path.display())).with_source(source)
    }
}

impl From<object_store::Error> for Error {
    fn from(err: object_store::Error) -> Self {
        let kind = match &err {
            object_store::Error::NotFound { .. } => ErrorKind::NotFound,
            object_store::Error::PermissionDenied { .. }
            | object_store::Error::Unauthenticated { .. } => ErrorKind::Authentication,
            object_store::Error::UnknownConfigurationKey { .. } => ErrorKind::Configuration,
            _ => ErrorKind::Backend,
        };
        Self::new(kind, err.to_string()).with_source(err)
    }
}
