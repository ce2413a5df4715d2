//! The user service: the single seam between the HTTP layer and persistence.
//!
//! Wrong credentials are not an error: `log_user` returns `Ok(None)`. Every
//! `Err` is a genuine failure and the HTTP layer reports it as a 500.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use userdesk_auth::{CredentialError, PasswordHasher, TokenIssuer};
use userdesk_core::{DomainError, NewUser, User, UserId, UserUpdate};

use crate::store::{NewUserRecord, StoreError, UserChanges, UserStore};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error(transparent)]
    Store(StoreError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Domain(e) => Self::Domain(e),
            other => Self::Store(other),
        }
    }
}

/// User operations consumed by the HTTP layer.
#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    async fn list_users(&self) -> ServiceResult<Vec<User>>;

    /// `Ok(None)` when no user has this id.
    async fn get_user(&self, id: UserId) -> ServiceResult<Option<User>>;

    async fn create_user(&self, record: NewUser) -> ServiceResult<User>;

    async fn update_user(&self, record: UserUpdate, id: UserId) -> ServiceResult<User>;

    /// Idempotent: deleting an unknown id succeeds.
    async fn delete_user(&self, id: UserId) -> ServiceResult<()>;

    async fn delete_all_users(&self) -> ServiceResult<()>;

    /// A signed session token, or `Ok(None)` when the email is unknown or the
    /// password does not match.
    async fn log_user(&self, email: &str, password: &str) -> ServiceResult<Option<String>>;
}

/// Store-backed service with bcrypt hashing and JWT issuance.
pub struct DefaultUserService<S> {
    store: S,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
}

impl<S> DefaultUserService<S>
where
    S: UserStore,
{
    pub fn new(store: S, hasher: Arc<dyn PasswordHasher>, tokens: Arc<dyn TokenIssuer>) -> Self {
        Self { store, hasher, tokens }
    }

    // bcrypt is CPU-bound; keep it off the async workers.
    async fn hash_password(&self, plain: String) -> ServiceResult<String> {
        let hasher = Arc::clone(&self.hasher);
        Ok(tokio::task::spawn_blocking(move || hasher.hash(&plain)).await??)
    }

    async fn verify_password(&self, plain: String, hash: String) -> ServiceResult<bool> {
        let hasher = Arc::clone(&self.hasher);
        Ok(tokio::task::spawn_blocking(move || hasher.verify(&plain, &hash)).await??)
    }
}

#[async_trait::async_trait]
impl<S> UserService for DefaultUserService<S>
where
    S: UserStore,
{
    async fn list_users(&self) -> ServiceResult<Vec<User>> {
        Ok(self.store.list().await?)
    }

    async fn get_user(&self, id: UserId) -> ServiceResult<Option<User>> {
        Ok(self.store.get(id).await?)
    }

    async fn create_user(&self, record: NewUser) -> ServiceResult<User> {
        let NewUser {
            full_name,
            user_name,
            email,
            password,
        } = record;

        let password_hash = self.hash_password(password).await?;
        let user = self
            .store
            .insert(
                NewUserRecord {
                    full_name,
                    user_name,
                    email,
                    password_hash,
                },
                Utc::now(),
            )
            .await?;

        tracing::info!(user_id = %user.id, "user signed up");
        Ok(user)
    }

    async fn update_user(&self, record: UserUpdate, id: UserId) -> ServiceResult<User> {
        let UserUpdate {
            user_name,
            email,
            password,
        } = record;

        let password_hash = self.hash_password(password).await?;
        let user = self
            .store
            .update(
                id,
                UserChanges {
                    user_name,
                    email,
                    password_hash,
                },
                Utc::now(),
            )
            .await?;

        tracing::info!(user_id = %user.id, "user updated");
        Ok(user)
    }

    async fn delete_user(&self, id: UserId) -> ServiceResult<()> {
        self.store.delete(id).await?;
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }

    async fn delete_all_users(&self) -> ServiceResult<()> {
        Ok(self.store.clear().await?)
    }

    async fn log_user(&self, email: &str, password: &str) -> ServiceResult<Option<String>> {
        let Some(stored) = self.store.find_by_email(email).await? else {
            tracing::warn!("login attempt for unknown email");
            return Ok(None);
        };

        if !self
            .verify_password(password.to_string(), stored.password_hash)
            .await?
        {
            tracing::warn!(user_id = %stored.user.id, "login attempt with wrong password");
            return Ok(None);
        }

        let token = self.tokens.issue(stored.user.id, &stored.user.email, Utc::now())?;
        tracing::info!(user_id = %stored.user.id, "user logged in");
        Ok(Some(token))
    }
}
