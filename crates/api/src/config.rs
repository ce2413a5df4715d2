//! Process configuration, read from environment variables.

use thiserror::Error;

const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("{0} must start with '/'")]
    BasePath(String),
}

#[derive(Clone)]
pub struct ApiConfig {
    pub port: u16,
    /// Where the users router is mounted, e.g. `/api/users`.
    pub base_path: String,
    pub jwt_secret: String,
    pub jwt_ttl: chrono::Duration,
    pub bcrypt_cost: u32,
    pub use_persistent_stores: bool,
    pub database_url: Option<String>,
}

impl core::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("port", &self.port)
            .field("base_path", &self.base_path)
            .field("jwt_ttl", &self.jwt_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("use_persistent_stores", &self.use_persistent_stores)
            .finish_non_exhaustive()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            base_path: "/api/users".to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_ttl: chrono::Duration::hours(24),
            bcrypt_cost: userdesk_auth::BcryptHasher::default().cost(),
            use_persistent_stores: false,
            database_url: None,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = lookup("PORT") {
            config.port = parse(&v, "PORT", "a port number")?;
        }

        if let Some(v) = lookup("USERS_BASE_PATH") {
            let v = v.trim_end_matches('/').to_string();
            if !v.is_empty() && !v.starts_with('/') {
                return Err(ConfigError::BasePath(v));
            }
            config.base_path = v;
        }

        match lookup("JWT_SECRET") {
            Some(v) if !v.is_empty() => config.jwt_secret = v,
            _ => tracing::warn!("JWT_SECRET not set; using insecure dev default"),
        }

        if let Some(v) = lookup("JWT_TTL_SECS") {
            let secs: i64 = parse(&v, "JWT_TTL_SECS", "a positive number of seconds")?;
            if secs <= 0 {
                return Err(ConfigError::Invalid {
                    key: "JWT_TTL_SECS",
                    expected: "a positive number of seconds",
                    value: v,
                });
            }
            config.jwt_ttl = chrono::Duration::seconds(secs);
        }

        if let Some(v) = lookup("BCRYPT_COST") {
            config.bcrypt_cost = parse(&v, "BCRYPT_COST", "an integer between 4 and 31")?;
            if !(4..=31).contains(&config.bcrypt_cost) {
                return Err(ConfigError::Invalid {
                    key: "BCRYPT_COST",
                    expected: "an integer between 4 and 31",
                    value: v,
                });
            }
        }

        if let Some(v) = lookup("USE_PERSISTENT_STORES") {
            config.use_persistent_stores = parse(&v, "USE_PERSISTENT_STORES", "true or false")?;
        }

        config.database_url = lookup("DATABASE_URL").filter(|v| !v.is_empty());

        Ok(config)
    }
}

fn parse<T: core::str::FromStr>(
    value: &str,
    key: &'static str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        expected,
        value: value.to_string(),
    })
}
