//! Error types for openvocab.

use thiserror::Error;

/// Result type alias using openvocab's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Machine-checkable classification of an [`Error`].
///
/// Callers branch on the kind instead of matching message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or missing required fields, identifier contract violation.
    InvalidInput,
    /// Tenant, set or namespace resolution failure.
    Configuration,
    /// Role or tenant mismatch, unknown or blocked actor.
    Unauthorized,
    /// Resource or edge absent.
    NotFound,
    /// Resource existed but has been soft-deleted.
    Gone,
    /// Duplicate resource or edge, cycle introduced, inbound references block deletion.
    Conflict,
    /// Relation target does not exist.
    Reference,
    /// Predicate is not a legal concept-to-concept relation.
    InvalidRelation,
    /// Transport failure or request deadline exceeded.
    StoreUnavailable,
    /// Unexpected internal state.
    Internal,
}

impl ErrorKind {
    /// HTTP status a transport layer should use for this kind.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput | Self::InvalidRelation | Self::Reference => 400,
            Self::Unauthorized => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Gone => 410,
            Self::Configuration => 412,
            Self::StoreUnavailable => 503,
            Self::Internal => 500,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput => write!(f, "invalid_input"),
            Self::Configuration => write!(f, "configuration_error"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::NotFound => write!(f, "not_found"),
            Self::Gone => write!(f, "gone"),
            Self::Conflict => write!(f, "conflict"),
            Self::Reference => write!(f, "reference_error"),
            Self::InvalidRelation => write!(f, "invalid_relation"),
            Self::StoreUnavailable => write!(f, "store_unavailable"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

/// Core error type for openvocab operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error (tenant/set/namespace resolution)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Acting user may not perform the mutation
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource or edge not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource has been soft-deleted
    #[error("Gone: {0}")]
    Gone(String),

    /// Duplicate resource or edge, or a cycle would be introduced
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Dangling relation target
    #[error("Reference error: {0}")]
    Reference(String),

    /// Predicate is not a legal concept-to-concept relation
    #[error("Invalid relation: {0}")]
    InvalidRelation(String),

    /// Store could not be reached in time
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The machine-checkable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::Config(_) => ErrorKind::Configuration,
            Error::Unauthorized(_) => ErrorKind::Unauthorized,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Gone(_) => ErrorKind::Gone,
            Error::Conflict(_) => ErrorKind::Conflict,
            Error::Reference(_) => ErrorKind::Reference,
            Error::InvalidRelation(_) => ErrorKind::InvalidRelation,
            Error::StoreUnavailable(_)
            | Error::Database(_)
            | Error::Request(_)
            | Error::Io(_) => ErrorKind::StoreUnavailable,
            Error::Serialization(_) => ErrorKind::InvalidInput,
            Error::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether the caller supplied something the pipeline refused.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self.kind(),
            ErrorKind::StoreUnavailable | ErrorKind::Internal
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::StoreUnavailable(format!("request timed out: {}", e))
        } else {
            Error::Request(e.to_string())
        }
    }
}

impl From<tokio::time::error::Elapsed> for Error {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Error::StoreUnavailable("request deadline exceeded".to_string())
    }
}
