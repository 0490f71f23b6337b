//! Shared application state injected into every handler.

use std::sync::Arc;

use chrono::Duration;

use crate::application::services::{
    AccountService, LinkService, LinkSettings, SessionGuard, TokenService, TokenSettings,
};
use crate::config::Config;
use crate::domain::repositories::{LinkRepository, RevocationRepository, UserRepository};
use crate::error::AppError;

/// Everything [`AppState::new`] needs besides the repositories.
#[derive(Clone)]
pub struct AppSettings {
    pub base_url: String,
    pub links: LinkSettings,
    pub tokens: TokenSettings,
    pub trust_claims: bool,
}

impl AppSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.base_url.clone(),
            links: LinkSettings {
                code_length: config.short_code_length,
                max_attempts: config.code_max_attempts,
                max_url_length: config.max_url_length,
            },
            tokens: TokenSettings {
                secret: config.jwt_secret.clone(),
                access_ttl: Duration::minutes(config.access_token_ttl_minutes),
                refresh_ttl: Duration::days(config.refresh_token_ttl_days),
                secure_cookies: config.is_production(),
            },
            trust_claims: config.session_trust_claims,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub account_service: Arc<AccountService>,
    pub session_guard: Arc<SessionGuard>,
    pub token_service: Arc<TokenService>,
    pub base_url: Arc<str>,
}

impl AppState {
    /// Wires services on top of the given repositories.
    ///
    /// # Errors
    ///
    /// Fails if the token settings are rejected (secret too short).
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        user_repository: Arc<dyn UserRepository>,
        revocation_repository: Arc<dyn RevocationRepository>,
        settings: AppSettings,
    ) -> Result<Self, AppError> {
        let token_service = Arc::new(TokenService::new(settings.tokens)?);

        let session_guard = Arc::new(SessionGuard::new(
            token_service.clone(),
            user_repository.clone(),
            settings.trust_claims,
        ));
        let account_service = Arc::new(AccountService::new(
            user_repository,
            revocation_repository,
            token_service.clone(),
        ));
        let link_service = Arc::new(LinkService::new(link_repository, settings.links));

        Ok(Self {
            link_service,
            account_service,
            session_guard,
            token_service,
            base_url: settings.base_url.trim_end_matches('/').into(),
        })
    }
}
