//! Infrastructure layer: user persistence and the user service.

pub mod service;
pub mod store;

pub use service::{DefaultUserService, ServiceError, ServiceResult, UserService};
pub use store::{InMemoryUserStore, PostgresUserStore, StoreError, UserStore};
