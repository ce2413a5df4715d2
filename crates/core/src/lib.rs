//! `userdesk-core`: domain primitives for user management.
//!
//! This crate contains **pure domain** types (no HTTP, storage or crypto).

pub mod error;
pub mod id;
pub mod user;

pub use error::{DomainError, DomainResult};
pub use id::UserId;
pub use user::{NewUser, User, UserUpdate};
