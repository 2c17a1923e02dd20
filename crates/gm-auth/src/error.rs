//! Authentication errors.

use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The server rejected the email/username and password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A required form field was blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The server refused a registration, e.g. a duplicate email.
    #[error("registration rejected: {0}")]
    Rejected(String),

    /// The login response did not carry a usable token.
    #[error("token invalid or missing")]
    InvalidToken,

    /// Local persistence failed.
    #[error("cache error: {0}")]
    Cache(#[from] gm_cache::CacheError),

    /// The auth endpoint could not be reached or answered with an error.
    #[error("http error: {0}")]
    Http(#[from] gm_data::FetchError),
}

impl AuthError {
    /// Check if this is an authentication failure.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, AuthError::InvalidCredentials | AuthError::InvalidToken)
    }

    /// Check if the input was rejected before or by the server.
    pub fn is_input_error(&self) -> bool {
        matches!(self, AuthError::MissingField(_) | AuthError::Rejected(_))
    }
}
