//! `SeaORM` implementation of the `UserService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::config::SecurityConfig;
use crate::db::{Store, User, UserChanges, is_foreign_key_violation};
use crate::domain::UserId;
use crate::services::user_service::{
    NewUser, UserError, UserService, UserUpdate, validate_email, validate_name,
    validate_password, validate_role,
};

pub struct SeaOrmUserService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn list(&self) -> Result<Vec<User>, UserError> {
        Ok(self.store.user_repo().list().await?)
    }

    async fn get(&self, id: UserId) -> Result<User, UserError> {
        self.store
            .user_repo()
            .get_by_id(id.value())
            .await?
            .ok_or(UserError::NotFound(id))
    }

    async fn create(&self, input: NewUser) -> Result<User, UserError> {
        let name = validate_name(&input.name)?;
        let email = validate_email(&input.email)?;
        validate_password(&input.password)?;
        let role = validate_role(input.role)?;

        let user = self
            .store
            .user_repo()
            .create(&name, &email, &input.password, role.as_i32(), &self.security)
            .await?;

        info!("Registered user {} ({})", user.id, role);
        Ok(user)
    }

    async fn update(&self, id: UserId, changes: UserUpdate) -> Result<User, UserError> {
        let password = changes.password.filter(|p| !p.is_empty());
        if let Some(password) = &password {
            validate_password(password)?;
        }

        let changes = UserChanges {
            name: changes.name.as_deref().map(validate_name).transpose()?,
            email: changes.email.as_deref().map(validate_email).transpose()?,
            role: changes
                .role
                .map(validate_role)
                .transpose()?
                .map(|r| r.as_i32()),
            password,
        };

        self.store
            .user_repo()
            .update(id.value(), changes, &self.security)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    async fn delete(&self, id: UserId) -> Result<(), UserError> {
        match self.store.user_repo().delete(id.value()).await {
            Ok(true) => {
                info!("Deleted user {}", id);
                Ok(())
            }
            Ok(false) => Err(UserError::NotFound(id)),
            Err(e) if is_foreign_key_violation(&e) => Err(UserError::InUse(id)),
            Err(e) => Err(e.into()),
        }
    }
}
