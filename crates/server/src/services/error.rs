//! Domain error type shared by every service.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors returned by service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input failed validation. Raised before any read or write.
    #[error("{0}")]
    Validation(String),

    /// The named entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A sale asked for more units than are on hand.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock {
        /// Units requested.
        requested: i32,
        /// Units on hand when the sale was attempted.
        available: i32,
    },

    /// The write clashes with existing data.
    #[error("{0}")]
    Conflict(String),

    /// The caller's role does not allow the operation.
    #[error("forbidden")]
    Forbidden,

    /// Username or password did not match.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Argon2 could not hash the password.
    #[error("password hashing failed")]
    PasswordHash,

    /// Storage failed.
    #[error("storage error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(message) => Self::Conflict(message),
            other => Self::Repository(other),
        }
    }
}

impl ServiceError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
