//! User records as seen by the rest of the system.
//!
//! `User` is the public view: it never carries the password or its hash.
//! `NewUser` and `UserUpdate` are inputs and hold the plaintext password only
//! until the service hashes it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// A persisted user, safe to return to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub user_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Signup input.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub full_name: String,
    pub user_name: String,
    pub email: String,
    pub password: String,
}

/// Replacement values for an existing user. `full_name` is not updatable.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NewUser")
            .field("full_name", &self.full_name)
            .field("user_name", &self.user_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl core::fmt::Debug for UserUpdate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UserUpdate")
            .field("user_name", &self.user_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
