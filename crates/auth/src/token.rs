//! Session token issuance (HS256 JWT).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use userdesk_core::UserId;

use crate::{CredentialError, TokenClaims, validate_claims};

/// Issues and validates opaque session tokens.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, sub: UserId, email: &str, now: DateTime<Utc>) -> Result<String, CredentialError>;

    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, CredentialError>;
}

pub struct Hs256TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Hs256TokenIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }
}

impl core::fmt::Debug for Hs256TokenIssuer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256TokenIssuer").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl TokenIssuer for Hs256TokenIssuer {
    fn issue(&self, sub: UserId, email: &str, now: DateTime<Utc>) -> Result<String, CredentialError> {
        let claims = TokenClaims::new(sub, email, now, self.ttl);
        Ok(jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, CredentialError> {
        // Expiry is checked against the caller's clock in validate_claims.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &validation)?;
        validate_claims(&data.claims, now)?;
        tracing::debug!(sub = %data.claims.sub, "token validated");
        Ok(data.claims)
    }
}
