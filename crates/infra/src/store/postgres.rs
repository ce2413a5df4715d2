//! Postgres-backed user store.
//!
//! Maps to the `users` table created by [`PostgresUserStore::ensure_schema`].
//! Email uniqueness is enforced by the table's unique constraint; violations
//! surface as `DomainError::Conflict`.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};

use userdesk_core::{DomainError, User, UserId};

use super::{NewUserRecord, StoreError, StoredUser, UserChanges, UserStore};

const USER_COLUMNS: &str = "id, full_name, user_name, email, password_hash, created_at, updated_at";

pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `users` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id            BIGSERIAL PRIMARY KEY,
                full_name     TEXT        NOT NULL,
                user_name     TEXT        NOT NULL,
                email         TEXT        NOT NULL UNIQUE,
                password_hash TEXT        NOT NULL,
                created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn row_to_stored(row: &PgRow) -> Result<StoredUser, sqlx::Error> {
    Ok(StoredUser {
        user: User {
            id: UserId::new(row.try_get::<i64, _>("id")?),
            full_name: row.try_get("full_name")?,
            user_name: row.try_get("user_name")?,
            email: row.try_get("email")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        },
        password_hash: row.try_get("password_hash")?,
    })
}

fn map_write_error(err: sqlx::Error, email: &str) -> StoreError {
    let unique_violation = err
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());
    if unique_violation {
        DomainError::conflict(format!("email {email} is already registered")).into()
    } else {
        StoreError::Database(err)
    }
}

#[async_trait::async_trait]
impl UserStore for PostgresUserStore {
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| row_to_stored(row).map(|s| s.user).map_err(StoreError::from))
            .collect()
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(row_to_stored).transpose()?.map(|s| s.user))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, StoreError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(row_to_stored).transpose()?)
    }

    async fn insert(&self, record: NewUserRecord, now: DateTime<Utc>) -> Result<User, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (full_name, user_name, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&record.full_name)
        .bind(&record.user_name)
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &record.email))?;

        Ok(row_to_stored(&row)?.user)
    }

    async fn update(&self, id: UserId, changes: UserChanges, now: DateTime<Utc>) -> Result<User, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET user_name = $1, email = $2, password_hash = $3, updated_at = $4
            WHERE id = $5
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&changes.user_name)
        .bind(&changes.email)
        .bind(&changes.password_hash)
        .bind(now)
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &changes.email))?;

        match row {
            Some(row) => Ok(row_to_stored(&row)?.user),
            None => Err(DomainError::not_found(id).into()),
        }
    }

    async fn delete(&self, id: UserId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users").execute(&self.pool).await?;
        tracing::info!(rows = result.rows_affected(), "cleared users table");
        Ok(())
    }
}
