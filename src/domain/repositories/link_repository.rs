//! Repository trait for short link persistence.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Persistence contract the link allocator depends on.
///
/// Uniqueness of `short_code` and of `(owner_id, original_url)` is enforced by
/// the store itself. Application code never checks for a free code before
/// inserting; it inserts and reacts to the rejection.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryLinkRepository`] - in-process store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new link atomically.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ShortCodeConflict`] if the short code is taken.
    /// Returns [`AppError::DuplicateLink`] if the owner already has a link for the URL.
    /// Returns [`AppError::Internal`] on any other storage failure.
    async fn insert_unique(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its short code, regardless of its active flag.
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Finds the link an owner already created for a URL.
    async fn find_by_owner_and_url(
        &self,
        owner_id: i64,
        original_url: &str,
    ) -> Result<Option<Link>, AppError>;

    /// Adds one click to an active link as a single atomic update.
    ///
    /// Inactive or unknown links are left untouched.
    async fn increment_clicks(&self, code: &str) -> Result<(), AppError>;

    /// Marks a link inactive.
    ///
    /// When `owner_id` is `Some`, only a link owned by that user is affected.
    /// Returns `Ok(true)` if a matching link exists (already inactive included).
    async fn deactivate(&self, code: &str, owner_id: Option<i64>) -> Result<bool, AppError>;

    /// Verifies the store is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
