//! `SeaORM` implementation of the `AuthService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::db::{Store, repositories::user::verify_password};
use crate::services::auth_service::{AuthError, AuthService, LoginResult};
use crate::services::token::TokenIssuer;

pub struct SeaOrmAuthService {
    store: Store,
    tokens: Arc<TokenIssuer>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, tokens: Arc<TokenIssuer>) -> Self {
        Self { store, tokens }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "email and password are required".to_string(),
            ));
        }

        let Some((user, password_hash)) = self
            .store
            .user_repo()
            .get_by_email_with_password(email.trim())
            .await?
        else {
            warn!("Login attempt for unknown email {}", email);
            return Err(AuthError::UserNotFound(email.trim().to_string()));
        };

        if !verify_password(password_hash, password.to_string()).await? {
            warn!("Failed login for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user)?;
        info!("User {} logged in", user.id);

        Ok(LoginResult {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            token,
        })
    }
}
