//! Error types for contents operations.

use crate::path::{Path, PathError};

/// The three classes of failure visible at the contents boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The path does not exist (404).
    NotFound,
    /// The request was rejected before reaching storage (400).
    BadRequest,
    /// Storage or configuration failed (500).
    Internal,
}

/// Errors from backends and the router.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Path validation error.
    #[error("path error: {0}")]
    Path(#[from] PathError),

    /// No entry at the path.
    #[error("not found: {path}")]
    NotFound { path: Path },

    /// The operation is not allowed on this path or model.
    #[error("bad request: {message}")]
    BadRequest { message: String },

    /// The operation is not allowed on the entry at `path`.
    #[error("bad request at '{path}': {message}")]
    Rejected { path: Path, message: String },

    /// No mount is registered at the prefix.
    #[error("no mount registered at '{prefix}'")]
    UnknownMount { prefix: Path },

    /// The mount table could not be built.
    #[error("invalid mount table: {message}")]
    MountTable { message: String },

    /// A cross-backend move wrote the destination but could not remove the
    /// source. The entry now exists at both paths.
    #[error("moved '{from}' to '{to}' but failed to remove the source: {source}")]
    PartialMove {
        from: Path,
        to: Path,
        #[source]
        source: Box<Error>,
    },

    /// Storage failure inside a backend.
    #[error("backend failure at '{path}': {message}")]
    Backend {
        path: Path,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    pub fn not_found(path: &Path) -> Self {
        Error::NotFound { path: path.clone() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Error::BadRequest {
            message: message.into(),
        }
    }

    /// A request refused because of the entry at `path`. Unlike
    /// [`Error::bad_request`], the path follows the error across mounts.
    pub fn rejected(path: &Path, message: impl Into<String>) -> Self {
        Error::Rejected {
            path: path.clone(),
            message: message.into(),
        }
    }

    /// A backend failure with an underlying cause.
    pub fn backend<E>(path: &Path, message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Backend {
            path: path.clone(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// A backend failure with only a message.
    pub fn backend_msg(path: &Path, message: impl Into<String>) -> Self {
        Error::Backend {
            path: path.clone(),
            message: message.into(),
            source: None,
        }
    }

    /// Which boundary class this error falls in.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Path(_) | Error::BadRequest { .. } | Error::Rejected { .. } => {
                ErrorKind::BadRequest
            }
            Error::UnknownMount { .. }
            | Error::MountTable { .. }
            | Error::PartialMove { .. }
            | Error::Backend { .. } => ErrorKind::Internal,
        }
    }

    /// HTTP-style status code for the error class.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::NotFound => 404,
            ErrorKind::BadRequest => 400,
            ErrorKind::Internal => 500,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// The storage path this error is about, if it names one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Error::NotFound { path }
            | Error::Rejected { path, .. }
            | Error::Backend { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Translate paths carried by a backend error into the namespace of the
    /// mount at `prefix`.
    #[must_use]
    pub fn with_prefix(self, prefix: &Path) -> Self {
        if prefix.is_empty() {
            return self;
        }
        match self {
            Error::NotFound { path } => Error::NotFound {
                path: prefix.join(&path),
            },
            Error::Rejected { path, message } => Error::Rejected {
                path: prefix.join(&path),
                message,
            },
            Error::Backend {
                path,
                message,
                source,
            } => Error::Backend {
                path: prefix.join(&path),
                message,
                source,
            },
            other => other,
        }
    }
}
