use thiserror::Error;

use crate::TokenValidationError;

/// Failure while hashing, verifying, issuing or validating credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("token encoding failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}
