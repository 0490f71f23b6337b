//! Short link allocation and resolution.

use std::sync::Arc;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::CodeGenerator;
use crate::utils::url_validator::validate_url;
use serde_json::json;

/// Tunables for [`LinkService`].
#[derive(Debug, Clone, Copy)]
pub struct LinkSettings {
    pub code_length: usize,
    pub max_attempts: usize,
    pub max_url_length: usize,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            code_length: CodeGenerator::DEFAULT_LENGTH,
            max_attempts: 3,
            max_url_length: 2048,
        }
    }
}

/// Service for creating, resolving and deactivating short links.
///
/// Code uniqueness is arbitrated by the store: a candidate is inserted and a
/// short-code conflict triggers a retry with a fresh candidate. The service
/// never checks for a free code before inserting.
pub struct LinkService {
    link_repository: Arc<dyn LinkRepository>,
    code_generator: CodeGenerator,
    max_attempts: usize,
    max_url_length: usize,
}

impl LinkService {
    pub fn new(link_repository: Arc<dyn LinkRepository>, settings: LinkSettings) -> Self {
        Self {
            link_repository,
            code_generator: CodeGenerator::new(settings.code_length),
            max_attempts: settings.max_attempts.max(1),
            max_url_length: settings.max_url_length,
        }
    }

    /// Creates a short link for `original_url` owned by `owner_id`.
    ///
    /// If the owner already has a link for the exact same URL, that link is
    /// returned unchanged, active or not.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a malformed URL or owner id.
    /// Returns [`AppError::CodeSpaceExhausted`] when every candidate collided.
    /// Any other store failure is returned as-is, without retrying.
    pub async fn create_short_link(
        &self,
        original_url: &str,
        owner_id: i64,
    ) -> Result<Link, AppError> {
        validate_url(original_url, self.max_url_length).map_err(|e| {
            AppError::bad_request(
                "Invalid URL",
                json!({ "field": "originalUrl", "reason": e.to_string() }),
            )
        })?;

        if owner_id <= 0 {
            return Err(AppError::bad_request(
                "Invalid owner",
                json!({ "field": "ownerId" }),
            ));
        }

        if let Some(existing) = self
            .link_repository
            .find_by_owner_and_url(owner_id, original_url)
            .await?
        {
            tracing::debug!(code = %existing.short_code, owner_id, "Returning existing short link");
            return Ok(existing);
        }

        for attempt in 1..=self.max_attempts {
            let candidate = self.code_generator.generate();
            let new_link = NewLink {
                short_code: candidate.clone(),
                original_url: original_url.to_string(),
                owner_id,
            };

            match self.link_repository.insert_unique(new_link).await {
                Ok(link) => {
                    tracing::info!(code = %link.short_code, owner_id, attempt, "Short link created");
                    return Ok(link);
                }
                Err(AppError::ShortCodeConflict { .. }) => {
                    tracing::warn!(code = %candidate, attempt, "Short code collision, retrying");
                }
                Err(AppError::DuplicateLink) => {
                    // A concurrent request for the same owner and URL won the insert.
                    return self
                        .link_repository
                        .find_by_owner_and_url(owner_id, original_url)
                        .await?
                        .ok_or_else(|| {
                            AppError::internal(
                                "Duplicate link disappeared after conflict",
                                json!({ "owner_id": owner_id }),
                            )
                        });
                }
                Err(e) => return Err(e),
            }
        }

        tracing::error!(
            code_length = self.code_generator.length(),
            attempts = self.max_attempts,
            "Short code space exhausted"
        );

        Err(AppError::CodeSpaceExhausted {
            code_length: self.code_generator.length(),
            attempts: self.max_attempts,
        })
    }

    /// Resolves a code to its destination and counts the click.
    ///
    /// The click counter is updated atomically at the store. A failure to
    /// count is logged and does not fail the resolution.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a code with foreign characters.
    /// Returns [`AppError::LinkNotFound`] for an unknown code.
    /// Returns [`AppError::LinkDeactivated`] for an inactive link.
    pub async fn resolve_short_link(&self, code: &str) -> Result<String, AppError> {
        let link = self.get_link(code).await?;

        if !link.is_resolvable() {
            return Err(AppError::LinkDeactivated {
                code: code.to_string(),
            });
        }

        if let Err(e) = self.link_repository.increment_clicks(code).await {
            tracing::warn!(code = %code, error = %e, "Failed to count click");
        }

        Ok(link.original_url)
    }

    /// Returns the full link record without counting a click.
    ///
    /// # Errors
    ///
    /// Same validation and not-found rules as [`Self::resolve_short_link`];
    /// inactive links are returned.
    pub async fn get_link(&self, code: &str) -> Result<Link, AppError> {
        if !CodeGenerator::is_valid(code) {
            return Err(AppError::bad_request(
                "Invalid short code",
                json!({ "field": "code" }),
            ));
        }

        self.link_repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::LinkNotFound {
                code: code.to_string(),
            })
    }

    /// Deactivates a link owned by `owner_id`. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::LinkNotFound`] when the code is unknown or owned by
    /// someone else.
    pub async fn deactivate_short_link(&self, code: &str, owner_id: i64) -> Result<(), AppError> {
        if !CodeGenerator::is_valid(code) {
            return Err(AppError::LinkNotFound {
                code: code.to_string(),
            });
        }

        if self
            .link_repository
            .deactivate(code, Some(owner_id))
            .await?
        {
            tracing::info!(code = %code, owner_id, "Short link deactivated");
            Ok(())
        } else {
            Err(AppError::LinkNotFound {
                code: code.to_string(),
            })
        }
    }

    /// Constructs the public short URL for a code.
    pub fn get_short_url(&self, base_url: &str, code: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), code)
    }

    /// Verifies the store is reachable.
    pub async fn health_check(&self) -> Result<(), AppError> {
        self.link_repository.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use chrono::Utc;
    use mockall::Sequence;

    fn create_test_link(id: i64, code: &str, url: &str, owner_id: i64, is_active: bool) -> Link {
        let now = Utc::now();
        Link {
            id,
            short_code: code.to_string(),
            original_url: url.to_string(),
            owner_id,
            clicks: 0,
            is_active,
            created_at: now,
            updated_at: now,
        }
    }

    fn echo_insert(new_link: NewLink) -> Result<Link, AppError> {
        Ok(create_test_link(
            1,
            &new_link.short_code,
            &new_link.original_url,
            new_link.owner_id,
            true,
        ))
    }

    fn service(mock: MockLinkRepository) -> LinkService {
        LinkService::new(Arc::new(mock), LinkSettings::default())
    }

    #[tokio::test]
    async fn test_create_short_link_success() {
        let mut mock = MockLinkRepository::new();
        mock.expect_find_by_owner_and_url()
            .times(1)
            .returning(|_, _| Ok(None));
        mock.expect_insert_unique()
            .withf(|new_link| {
                new_link.short_code.len() == 8
                    && new_link.original_url == "https://example.com"
                    && new_link.owner_id == 7
            })
            .times(1)
            .returning(echo_insert);

        let link = service(mock)
            .create_short_link("https://example.com", 7)
            .await
            .unwrap();

        assert_eq!(link.short_code.len(), 8);
        assert_eq!(link.original_url, "https://example.com");
    }

    #[tokio::test]
    async fn test_create_short_link_returns_existing_for_same_owner_and_url() {
        let mut mock = MockLinkRepository::new();
        let existing = create_test_link(5, "existing", "https://example.com", 7, true);
        mock.expect_find_by_owner_and_url()
            .withf(|owner_id, url| *owner_id == 7 && url == "https://example.com")
            .times(1)
            .returning(move |_, _| Ok(Some(existing.clone())));
        mock.expect_insert_unique().times(0);

        let link = service(mock)
            .create_short_link("https://example.com", 7)
            .await
            .unwrap();

        assert_eq!(link.id, 5);
        assert_eq!(link.short_code, "existing");
    }

    #[tokio::test]
    async fn test_create_short_link_retries_on_code_conflict() {
        let mut mock = MockLinkRepository::new();
        let mut seq = Sequence::new();
        mock.expect_find_by_owner_and_url()
            .times(1)
            .returning(|_, _| Ok(None));
        mock.expect_insert_unique()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|new_link| {
                Err(AppError::ShortCodeConflict {
                    code: new_link.short_code,
                })
            });
        mock.expect_insert_unique()
            .times(1)
            .in_sequence(&mut seq)
            .returning(echo_insert);

        let result = service(mock)
            .create_short_link("https://example.com/a", 1)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_short_link_exhausts_after_max_attempts() {
        let mut mock = MockLinkRepository::new();
        mock.expect_find_by_owner_and_url()
            .times(1)
            .returning(|_, _| Ok(None));
        mock.expect_insert_unique().times(3).returning(|new_link| {
            Err(AppError::ShortCodeConflict {
                code: new_link.short_code,
            })
        });

        let err = service(mock)
            .create_short_link("https://example.com/a", 1)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::CodeSpaceExhausted {
                code_length: 8,
                attempts: 3
            }
        ));
    }

    #[tokio::test]
    async fn test_create_short_link_does_not_retry_other_errors() {
        let mut mock = MockLinkRepository::new();
        mock.expect_find_by_owner_and_url()
            .times(1)
            .returning(|_, _| Ok(None));
        mock.expect_insert_unique()
            .times(1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let err = service(mock)
            .create_short_link("https://example.com/a", 1)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_create_short_link_converges_on_concurrent_duplicate() {
        let mut mock = MockLinkRepository::new();
        let mut seq = Sequence::new();
        mock.expect_find_by_owner_and_url()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(None));
        mock.expect_insert_unique()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(AppError::DuplicateLink));
        let winner = create_test_link(9, "winner12", "https://example.com", 7, true);
        mock.expect_find_by_owner_and_url()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, _| Ok(Some(winner.clone())));

        let link = service(mock)
            .create_short_link("https://example.com", 7)
            .await
            .unwrap();

        assert_eq!(link.short_code, "winner12");
    }

    #[tokio::test]
    async fn test_create_short_link_invalid_url_skips_store() {
        let mock = MockLinkRepository::new();

        for input in ["not-a-url", "ftp://example.com", ""] {
            let err = service(MockLinkRepository::new())
                .create_short_link(input, 1)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }), "{input}");
        }

        let too_long = format!("https://example.com/{}", "a".repeat(2048));
        let err = service(mock)
            .create_short_link(&too_long, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_short_link_rejects_non_positive_owner() {
        let err = service(MockLinkRepository::new())
            .create_short_link("https://example.com", 0)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_resolve_counts_click() {
        let mut mock = MockLinkRepository::new();
        let link = create_test_link(1, "abc12345", "https://example.com", 7, true);
        mock.expect_find_by_code()
            .withf(|code| code == "abc12345")
            .times(1)
            .returning(move |_| Ok(Some(link.clone())));
        mock.expect_increment_clicks()
            .withf(|code| code == "abc12345")
            .times(1)
            .returning(|_| Ok(()));

        let url = service(mock).resolve_short_link("abc12345").await.unwrap();

        assert_eq!(url, "https://example.com");
    }

    #[tokio::test]
    async fn test_resolve_unknown_code() {
        let mut mock = MockLinkRepository::new();
        mock.expect_find_by_code().times(1).returning(|_| Ok(None));
        mock.expect_increment_clicks().times(0);

        let err = service(mock)
            .resolve_short_link("doesnotexist")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::LinkNotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_deactivated_does_not_count() {
        let mut mock = MockLinkRepository::new();
        let link = create_test_link(1, "abc12345", "https://example.com", 7, false);
        mock.expect_find_by_code()
            .times(1)
            .returning(move |_| Ok(Some(link.clone())));
        mock.expect_increment_clicks().times(0);

        let err = service(mock)
            .resolve_short_link("abc12345")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::LinkDeactivated { .. }));
    }

    #[tokio::test]
    async fn test_resolve_survives_counter_failure() {
        let mut mock = MockLinkRepository::new();
        let link = create_test_link(1, "abc12345", "https://example.com", 7, true);
        mock.expect_find_by_code()
            .times(1)
            .returning(move |_| Ok(Some(link.clone())));
        mock.expect_increment_clicks()
            .times(1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let url = service(mock).resolve_short_link("abc12345").await.unwrap();

        assert_eq!(url, "https://example.com");
    }

    #[tokio::test]
    async fn test_resolve_rejects_malformed_code_without_store() {
        let mut mock = MockLinkRepository::new();
        mock.expect_find_by_code().times(0);

        let err = service(mock)
            .resolve_short_link("bad-code!")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_deactivate_foreign_link_is_not_found() {
        let mut mock = MockLinkRepository::new();
        mock.expect_deactivate()
            .withf(|code, owner_id| code == "abc12345" && *owner_id == Some(99))
            .times(1)
            .returning(|_, _| Ok(false));

        let err = service(mock)
            .deactivate_short_link("abc12345", 99)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::LinkNotFound { .. }));
    }

    #[test]
    fn test_get_short_url() {
        let service = service(MockLinkRepository::new());
        assert_eq!(
            service.get_short_url("http://localhost:3000/", "abc12345"),
            "http://localhost:3000/abc12345"
        );
    }
}
