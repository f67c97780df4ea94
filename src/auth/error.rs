//! Authentication errors.

use thiserror::Error;

/// Errors raised while authenticating a request.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingAuthHeader,

    #[error("malformed Authorization header")]
    InvalidAuthHeader,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("insufficient permissions: {0}")]
    InsufficientPermissions(String),

    #[error("authentication error: {0}")]
    Internal(String),
}
