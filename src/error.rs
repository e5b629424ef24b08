//! Error types for grantmatrix

/// The main error type for grantmatrix operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Unknown role, user, category or item referenced by a request
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate or unknown item in a submitted matrix, malformed field or id
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Transaction or environment failure in LMDB
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    /// Saves are whole-target replacements, so a storage failure can always be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Storage(_))
    }
}

/// Result type alias for grantmatrix operations
pub type Result<T> = std::result::Result<T, Error>;

/// Convert any storage-layer error to `Error::Storage`
pub fn err<E: std::error::Error>(e: E) -> Error {
    Error::Storage(e.to_string())
}

pub(crate) fn not_found(what: &str, id: &str) -> Error {
    Error::NotFound(format!("{} '{}'", what, id))
}

pub(crate) fn invalid(msg: impl Into<String>) -> Error {
    Error::Validation(msg.into())
}
