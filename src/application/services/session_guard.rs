//! Request-time session authentication.

use std::sync::Arc;

use serde_json::json;

use super::token_service::{TokenService, extract_from_cookie_header};
use crate::domain::entities::Identity;
use crate::domain::repositories::UserRepository;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardMode {
    /// Reject with 401 when no token is sent and 403 when it does not verify.
    Required,
    /// Attach an identity when possible, never reject.
    Optional,
}

/// Turns a raw `Cookie` header into an authenticated [`Identity`].
///
/// With `trust_claims` the identity comes straight from the verified access
/// token. Without it the user row is re-read on every request and a deleted
/// user invalidates the token.
pub struct SessionGuard {
    token_service: Arc<TokenService>,
    user_repository: Arc<dyn UserRepository>,
    trust_claims: bool,
}

impl SessionGuard {
    pub fn new(
        token_service: Arc<TokenService>,
        user_repository: Arc<dyn UserRepository>,
        trust_claims: bool,
    ) -> Self {
        Self {
            token_service,
            user_repository,
            trust_claims,
        }
    }

    /// Authenticates a request from its `Cookie` header.
    ///
    /// # Errors
    ///
    /// Only in [`GuardMode::Required`]: [`AppError::Unauthorized`] when no
    /// access token is present, [`AppError::InvalidOrExpiredToken`] when it
    /// fails verification.
    pub async fn authenticate(
        &self,
        cookie_header: Option<&str>,
        mode: GuardMode,
    ) -> Result<Option<Identity>, AppError> {
        let Some(token) = extract_from_cookie_header(cookie_header) else {
            return match mode {
                GuardMode::Required => Err(AppError::unauthorized(
                    "Access token not provided",
                    json!({}),
                )),
                GuardMode::Optional => Ok(None),
            };
        };

        match (self.identify(&token).await, mode) {
            (Ok(identity), _) => Ok(Some(identity)),
            (Err(e), GuardMode::Required) => {
                tracing::debug!(error = %e, "Session rejected");
                Err(e)
            }
            (Err(AppError::InvalidOrExpiredToken), GuardMode::Optional) => Ok(None),
            (Err(e), GuardMode::Optional) => {
                tracing::warn!(error = %e, "Optional session lookup failed, continuing anonymously");
                Ok(None)
            }
        }
    }

    async fn identify(&self, token: &str) -> Result<Identity, AppError> {
        let claims = self.token_service.verify_access_token(token)?;

        if self.trust_claims {
            return Ok(Identity::from(&claims));
        }

        self.user_repository
            .find_by_id(claims.user_id)
            .await?
            .map(|user| Identity::from(&user))
            .ok_or(AppError::InvalidOrExpiredToken)
    }
}
