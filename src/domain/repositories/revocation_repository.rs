//! Repository trait for the refresh-token revocation list.

use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Store of refresh-token ids that must no longer be accepted.
///
/// [`RevocationRepository::revoke`] is the arbiter of one-time use: when two
/// requests present the same refresh token, exactly one of them observes
/// `Ok(true)`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RevocationRepository: Send + Sync {
    /// Records `token_id` as revoked.
    ///
    /// Returns `Ok(true)` if this call revoked it, `Ok(false)` if it was
    /// already revoked.
    async fn revoke(
        &self,
        token_id: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    async fn is_revoked(&self, token_id: &str) -> Result<bool, AppError>;

    /// Deletes entries whose token expired before `now`. Returns the number removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}
