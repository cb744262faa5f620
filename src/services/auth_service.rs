//! Domain service for login.
//!
//! Verifies email and password against the credential store and issues a
//! signed session token.

use serde::Serialize;
use thiserror::Error;

use crate::services::token::TokenError;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("No account registered for {0}")]
    UserNotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        if err.chain().any(|cause| cause.is::<sea_orm::DbErr>()) {
            Self::Database(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

/// Successful login payload. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: i32,
    pub token: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and issues a token.
    ///
    /// # Errors
    ///
    /// - [`AuthError::UserNotFound`] when no user has this email
    /// - [`AuthError::InvalidCredentials`] when the password does not match
    /// - [`AuthError::Token`] when signing fails
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError>;
}
