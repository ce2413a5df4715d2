//! User persistence abstractions.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use userdesk_core::{DomainError, User, UserId};

pub use in_memory::InMemoryUserStore;
pub use postgres::PostgresUserStore;

/// A user together with its password hash. Never leaves the service layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    pub user: User,
    pub password_hash: String,
}

/// Row to insert; the store assigns the id and timestamps.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub full_name: String,
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
}

/// Replacement values for an existing row.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence for users.
///
/// Email is the login identifier and must be unique across users.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// All users ordered by id.
    async fn list(&self) -> Result<Vec<User>, StoreError>;

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, StoreError>;

    /// Fails with `DomainError::Conflict` when the email is taken.
    async fn insert(&self, record: NewUserRecord, now: DateTime<Utc>) -> Result<User, StoreError>;

    /// Fails with `DomainError::NotFound` for unknown ids and
    /// `DomainError::Conflict` when the email belongs to another user.
    async fn update(&self, id: UserId, changes: UserChanges, now: DateTime<Utc>) -> Result<User, StoreError>;

    /// Succeeds whether or not the id exists.
    async fn delete(&self, id: UserId) -> Result<(), StoreError>;

    async fn clear(&self) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        (**self).list().await
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        (**self).get(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, StoreError> {
        (**self).find_by_email(email).await
    }

    async fn insert(&self, record: NewUserRecord, now: DateTime<Utc>) -> Result<User, StoreError> {
        (**self).insert(record, now).await
    }

    async fn update(&self, id: UserId, changes: UserChanges, now: DateTime<Utc>) -> Result<User, StoreError> {
        (**self).update(id, changes, now).await
    }

    async fn delete(&self, id: UserId) -> Result<(), StoreError> {
        (**self).delete(id).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        (**self).clear().await
    }
}
