//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

const LINK_COLUMNS: &str =
    "id, short_code, original_url, owner_id, clicks, is_active, created_at, updated_at";

/// PostgreSQL repository for link storage and retrieval.
///
/// Uniqueness is delegated to the `links_short_code_key` and
/// `links_owner_url_key` constraints; violations surface as
/// [`AppError::ShortCodeConflict`] and [`AppError::DuplicateLink`].
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn insert_unique(&self, new_link: NewLink) -> Result<Link, AppError> {
        let query = format!(
            "INSERT INTO links (short_code, original_url, owner_id) \
             VALUES ($1, $2, $3) RETURNING {LINK_COLUMNS}"
        );

        sqlx::query_as::<_, Link>(&query)
            .bind(&new_link.short_code)
            .bind(&new_link.original_url)
            .bind(new_link.owner_id)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::ShortCodeConflict { .. } => AppError::ShortCodeConflict {
                    code: new_link.short_code.clone(),
                },
                other => other,
            })
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let query = format!("SELECT {LINK_COLUMNS} FROM links WHERE short_code = $1");

        let link = sqlx::query_as::<_, Link>(&query)
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(link)
    }

    async fn find_by_owner_and_url(
        &self,
        owner_id: i64,
        original_url: &str,
    ) -> Result<Option<Link>, AppError> {
        let query = format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE owner_id = $1 AND original_url = $2"
        );

        let link = sqlx::query_as::<_, Link>(&query)
            .bind(owner_id)
            .bind(original_url)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(link)
    }

    async fn increment_clicks(&self, code: &str) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE links SET clicks = clicks + 1, updated_at = NOW() \
             WHERE short_code = $1 AND is_active",
        )
        .bind(code)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn deactivate(&self, code: &str, owner_id: Option<i64>) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE links
            SET is_active = FALSE,
                updated_at = CASE WHEN is_active THEN NOW() ELSE updated_at END
            WHERE short_code = $1 AND ($2::bigint IS NULL OR owner_id = $2)
            "#,
        )
        .bind(code)
        .bind(owner_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}
