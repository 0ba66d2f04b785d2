//! Authentication and authorization logic.
//!
//! Provides password hashing, JWT management, and the identity resolution
//! pipeline shared by every protected endpoint in `storefront_api`.

pub mod jwt;
pub mod password;
pub mod queries;
pub mod resolver;

use thiserror::Error;

/// Authentication errors.
///
/// `InvalidToken` is raised by the token codec only; [`resolver::resolve`]
/// collapses it into `Unauthorized` before it reaches a caller.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Incorrect email or password")]
    CredentialError,

    #[error("Could not validate credentials")]
    Unauthorized,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
