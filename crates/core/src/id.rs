//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Identifier of a user (server-assigned, immutable).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(&self) -> i64 {
        self.0
    }

    /// Parse an identifier taken from a URL path segment.
    ///
    /// Accepts what a lenient base-10 integer parse accepts: surrounding
    /// whitespace, an optional sign, then one or more ASCII digits. Anything
    /// after the leading digits is ignored, so `"12abc"` is `12`.
    pub fn parse_lenient(raw: &str) -> DomainResult<Self> {
        let s = raw.trim_start();
        let sign_len = usize::from(matches!(s.as_bytes().first(), Some(b'-' | b'+')));

        let digits_len = s[sign_len..].bytes().take_while(u8::is_ascii_digit).count();
        if digits_len == 0 {
            return Err(DomainError::invalid_id(format!("UserId: {raw:?} is not a number")));
        }

        // Sign and digits together, so `i64::MIN` stays in range.
        let value: i64 = s[..sign_len + digits_len]
            .parse()
            .map_err(|e| DomainError::invalid_id(format!("UserId: {raw:?}: {e}")))?;

        Ok(Self(value))
    }
}

impl core::fmt::Display for UserId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<UserId> for i64 {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl FromStr for UserId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = i64::from_str(s)
            .map_err(|e| DomainError::invalid_id(format!("UserId: {e}")))?;
        Ok(Self(value))
    }
}
