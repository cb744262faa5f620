//! Domain service for user accounts.

use serde::Deserialize;
use thiserror::Error;

use crate::db::User;
use crate::domain::{Role, UserId};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User {0} not found")]
    NotFound(UserId),

    #[error("Email address is already registered")]
    EmailTaken,

    #[error("User {0} still owns applicant records")]
    InUse(UserId),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        if crate::db::is_unique_violation(&err) {
            Self::EmailTaken
        } else if err.chain().any(|cause| cause.is::<sea_orm::DbErr>()) {
            Self::Database(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: i32,
}

/// Body of `PUT /users/{id}`. Absent fields are left unchanged; an empty
/// password keeps the stored hash.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<i32>,
    pub password: Option<String>,
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    async fn list(&self) -> Result<Vec<User>, UserError>;

    /// # Errors
    ///
    /// Returns [`UserError::NotFound`] for unknown ids.
    async fn get(&self, id: UserId) -> Result<User, UserError>;

    /// Registers an account. The email's unique index is the only duplicate
    /// check, surfacing as [`UserError::EmailTaken`].
    async fn create(&self, input: NewUser) -> Result<User, UserError>;

    async fn update(&self, id: UserId, changes: UserUpdate) -> Result<User, UserError>;

    /// # Errors
    ///
    /// Returns [`UserError::InUse`] while applicant records reference the user.
    async fn delete(&self, id: UserId) -> Result<(), UserError>;
}

pub(crate) fn validate_name(name: &str) -> Result<String, UserError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(UserError::Validation("name cannot be empty".to_string()));
    }
    if trimmed.chars().count() > 100 {
        return Err(UserError::Validation(
            "name must be 100 characters or less".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn validate_email(email: &str) -> Result<String, UserError> {
    let trimmed = email.trim();
    let valid = trimmed
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        })
        && !trimmed.chars().any(char::is_whitespace);

    if !valid {
        return Err(UserError::Validation(format!(
            "invalid email address: {trimmed}"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn validate_password(password: &str) -> Result<(), UserError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(UserError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub(crate) fn validate_role(role: i32) -> Result<Role, UserError> {
    Role::try_from(role).map_err(UserError::Validation)
}
