//! Password hashing.

use crate::CredentialError;

/// One-way password hashing used for signup, update and login.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String, CredentialError>;

    /// `Ok(false)` on mismatch; `Err` only when `hash` is not a usable hash.
    fn verify(&self, plain: &str, hash: &str) -> Result<bool, CredentialError>;
}

/// bcrypt with a configurable work factor.
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, plain: &str) -> Result<String, CredentialError> {
        Ok(bcrypt::hash(plain, self.cost)?)
    }

    fn verify(&self, plain: &str, hash: &str) -> Result<bool, CredentialError> {
        Ok(bcrypt::verify(plain, hash)?)
    }
}
