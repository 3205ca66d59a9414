//! Authentication error types.

use thiserror::Error;

use cartwheel_core::EmailError;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password is wrong. Deliberately does not say which.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A user with this email already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// No user matches the given identity.
    #[error("user not found")]
    UserNotFound,

    /// Password doesn't meet requirements.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// Email address is malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password-reset token is unknown or expired.
    #[error("invalid or expired reset token")]
    InvalidResetToken,

    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// Database operation failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}
