//! Service wiring: store selection, password hashing, token issuance.

use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;

use userdesk_auth::{BcryptHasher, Hs256TokenIssuer, PasswordHasher, TokenIssuer};
use userdesk_infra::{DefaultUserService, InMemoryUserStore, PostgresUserStore, UserService};

use crate::config::ApiConfig;

/// The user service as shared by every handler.
pub type SharedUserService = Arc<dyn UserService>;

pub async fn build_services(config: &ApiConfig) -> anyhow::Result<SharedUserService> {
    let hasher: Arc<dyn PasswordHasher> = Arc::new(BcryptHasher::new(config.bcrypt_cost));
    let tokens: Arc<dyn TokenIssuer> = Arc::new(Hs256TokenIssuer::new(
        config.jwt_secret.as_bytes(),
        config.jwt_ttl,
    ));

    if !config.use_persistent_stores {
        tracing::info!("using in-memory user store");
        return Ok(Arc::new(DefaultUserService::new(
            Arc::new(InMemoryUserStore::new()),
            hasher,
            tokens,
        )));
    }

    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set when USE_PERSISTENT_STORES=true")?;

    let pool = PgPool::connect(database_url)
        .await
        .context("failed to connect to Postgres")?;

    let store = PostgresUserStore::new(pool);
    store
        .ensure_schema()
        .await
        .context("failed to create users table")?;

    tracing::info!("using Postgres user store");
    Ok(Arc::new(DefaultUserService::new(store, hasher, tokens)))
}
