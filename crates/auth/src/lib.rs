//! `userdesk-auth`: credential handling (password hashing, token issuance).
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod error;
pub mod password;
pub mod token;

pub use claims::{TokenClaims, TokenValidationError, validate_claims};
pub use error::CredentialError;
pub use password::{BcryptHasher, PasswordHasher};
pub use token::{Hs256TokenIssuer, TokenIssuer};
