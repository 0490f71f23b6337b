//! PostgreSQL implementation of the refresh-token revocation list.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::repositories::RevocationRepository;
use crate::error::AppError;

/// PostgreSQL repository for revoked refresh-token ids.
///
/// Stores token ids only. Raw tokens are never persisted.
pub struct PgRevocationRepository {
    pool: Arc<PgPool>,
}

impl PgRevocationRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RevocationRepository for PgRevocationRepository {
    async fn revoke(
        &self,
        token_id: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO revoked_refresh_tokens (token_id, user_id, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (token_id) DO NOTHING
            "#,
        )
        .bind(token_id)
        .bind(user_id)
        .bind(expires_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn is_revoked(&self, token_id: &str) -> Result<bool, AppError> {
        let revoked: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM revoked_refresh_tokens WHERE token_id = $1)",
        )
        .bind(token_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(revoked)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM revoked_refresh_tokens WHERE expires_at < $1")
            .bind(now)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected())
    }
}
