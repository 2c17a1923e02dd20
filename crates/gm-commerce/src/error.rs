//! Commerce error types.

use thiserror::Error;

/// Errors that can occur in catalog and cart operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommerceError {
    /// A referenced entity or parent does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Input rejected before anything was mutated or sent.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The remote API could not be reached.
    #[error("Network error: {0}")]
    Network(String),

    /// The remote API answered with an error status.
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// The local persistent store failed (unavailable, quota exceeded).
    #[error("Storage error: {0}")]
    Storage(String),

    /// A payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,
}

/// Coarse classification of a [`CommerceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    Network,
    Server,
    Storage,
    Internal,
}

impl CommerceError {
    /// Shorthand for [`CommerceError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        CommerceError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for [`CommerceError::InvalidArgument`].
    pub fn invalid(message: impl Into<String>) -> Self {
        CommerceError::InvalidArgument(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CommerceError::NotFound { .. } => ErrorKind::NotFound,
            CommerceError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            CommerceError::Network(_) => ErrorKind::Network,
            CommerceError::Server { .. } => ErrorKind::Server,
            CommerceError::Storage(_) => ErrorKind::Storage,
            CommerceError::Serialization(_) | CommerceError::Overflow => ErrorKind::Internal,
        }
    }

    /// True for failures where the same call may succeed later.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Network | ErrorKind::Server)
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::Serialization(e.to_string())
    }
}

#[cfg(feature = "storage")]
impl From<gm_data::FetchError> for CommerceError {
    fn from(e: gm_data::FetchError) -> Self {
        use gm_data::FetchError;

        match e {
            FetchError::HttpError {
                status: 404,
                message,
            } => CommerceError::NotFound {
                entity: "resource",
                id: message,
            },
            FetchError::HttpError { status, message } => CommerceError::Server { status, message },
            FetchError::RequestError(m) | FetchError::InvalidUrl(m) => CommerceError::Network(m),
            FetchError::Timeout => CommerceError::Network("request timed out".to_string()),
            FetchError::ParseError(m) | FetchError::JsonError(m) => {
                CommerceError::Serialization(m)
            }
        }
    }
}

#[cfg(feature = "storage")]
impl From<gm_cache::CacheError> for CommerceError {
    fn from(e: gm_cache::CacheError) -> Self {
        CommerceError::Storage(e.to_string())
    }
}
