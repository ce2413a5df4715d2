use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use userdesk_core::{DomainError, User, UserId};

use super::{NewUserRecord, StoreError, StoredUser, UserChanges, UserStore};

#[derive(Debug)]
struct State {
    next_id: i64,
    rows: BTreeMap<UserId, StoredUser>,
}

/// In-memory user store for tests/dev.
///
/// Ids start at 1 and are never reused, even after `clear`.
#[derive(Debug)]
pub struct InMemoryUserStore {
    inner: RwLock<State>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(State {
                next_id: 1,
                rows: BTreeMap::new(),
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("user store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("user store lock poisoned".to_string()))
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

fn email_taken(state: &State, email: &str, except: Option<UserId>) -> bool {
    state
        .rows
        .values()
        .any(|row| row.user.email == email && Some(row.user.id) != except)
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.read()?.rows.values().map(|row| row.user.clone()).collect())
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.rows.get(&id).map(|row| row.user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, StoreError> {
        Ok(self
            .read()?
            .rows
            .values()
            .find(|row| row.user.email == email)
            .cloned())
    }

    async fn insert(&self, record: NewUserRecord, now: DateTime<Utc>) -> Result<User, StoreError> {
        let mut state = self.write()?;
        if email_taken(&state, &record.email, None) {
            return Err(DomainError::conflict(format!("email {} is already registered", record.email)).into());
        }

        let id = UserId::new(state.next_id);
        state.next_id += 1;

        let user = User {
            id,
            full_name: record.full_name,
            user_name: record.user_name,
            email: record.email,
            created_at: now,
            updated_at: now,
        };
        state.rows.insert(
            id,
            StoredUser {
                user: user.clone(),
                password_hash: record.password_hash,
            },
        );
        Ok(user)
    }

    async fn update(&self, id: UserId, changes: UserChanges, now: DateTime<Utc>) -> Result<User, StoreError> {
        let mut state = self.write()?;
        if !state.rows.contains_key(&id) {
            return Err(DomainError::not_found(id).into());
        }
        if email_taken(&state, &changes.email, Some(id)) {
            return Err(DomainError::conflict(format!("email {} is already registered", changes.email)).into());
        }

        let row = state
            .rows
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(id))?;
        row.user.user_name = changes.user_name;
        row.user.email = changes.email;
        row.user.updated_at = now;
        row.password_hash = changes.password_hash;
        Ok(row.user.clone())
    }

    async fn delete(&self, id: UserId) -> Result<(), StoreError> {
        self.write()?.rows.remove(&id);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.write()?.rows.clear();
        Ok(())
    }
}
