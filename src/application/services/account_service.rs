//! Account registration, login and session rotation.

use std::sync::Arc;

use serde_json::json;

use super::token_service::{SessionTokens, TokenService};
use crate::domain::entities::{Identity, NewUser, User, normalize_email};
use crate::domain::repositories::{RevocationRepository, UserRepository};
use crate::error::AppError;
use crate::utils::password::{hash_password, verify_password};

/// A user together with the token pair just issued for them.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub tokens: SessionTokens,
}

/// Orchestrates user storage, password hashing and token issuance.
///
/// Refresh tokens are single-use: [`AccountService::refresh`] revokes the
/// presented token id before minting a new pair, so a replayed refresh token
/// is rejected.
pub struct AccountService {
    user_repository: Arc<dyn UserRepository>,
    revocation_repository: Arc<dyn RevocationRepository>,
    token_service: Arc<TokenService>,
}

impl AccountService {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        revocation_repository: Arc<dyn RevocationRepository>,
        token_service: Arc<TokenService>,
    ) -> Self {
        Self {
            user_repository,
            revocation_repository,
            token_service,
        }
    }

    /// Registers a new account and opens a session for it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the email is already registered.
    pub async fn register(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let email = normalize_email(email);

        if self.user_repository.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict(
                "User with this email already exists",
                json!({ "field": "email" }),
            ));
        }

        let user = self
            .user_repository
            .create(NewUser {
                email,
                password_hash: hash_password(password)?,
            })
            .await?;

        tracing::info!(user_id = user.id, "User registered");
        self.open_session(user)
    }

    /// Verifies credentials and opens a session.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] with the same message for an unknown
    /// email and for a wrong password.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let email = normalize_email(email);

        let user = match self.user_repository.find_by_email(&email).await? {
            Some(user) if verify_password(password, &user.password_hash)? => user,
            _ => {
                tracing::debug!("Login rejected");
                return Err(invalid_credentials());
            }
        };

        tracing::info!(user_id = user.id, "User logged in");
        self.open_session(user)
    }

    /// Exchanges a refresh token for a new token pair.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] when no token is presented or the
    /// user no longer exists, and [`AppError::InvalidOrExpiredToken`] when the
    /// token does not verify or was already used.
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<AuthSession, AppError> {
        let token = refresh_token
            .ok_or_else(|| AppError::unauthorized("Refresh token not provided", json!({})))?;

        let claims = self.token_service.verify_refresh_token(token)?;

        let revoked_now = self
            .revocation_repository
            .revoke(&claims.token_id, claims.user_id, claims.expires_at())
            .await?;
        if !revoked_now {
            tracing::warn!(user_id = claims.user_id, "Refresh token reuse rejected");
            return Err(AppError::InvalidOrExpiredToken);
        }

        let user = self
            .user_repository
            .find_by_id(claims.user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("User not found", json!({})))?;

        tracing::debug!(user_id = user.id, "Session refreshed");
        self.open_session(user)
    }

    /// Replaces the password after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `current_password` is wrong and
    /// [`AppError::NotFound`] if the account is gone.
    pub async fn change_password(
        &self,
        identity: &Identity,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let user = self.load_user(identity.user_id).await?;

        if !verify_password(current_password, &user.password_hash)? {
            return Err(AppError::bad_request(
                "Current password is incorrect",
                json!({ "field": "currentPassword" }),
            ));
        }

        let updated = self
            .user_repository
            .update_password(user.id, &hash_password(new_password)?)
            .await?;
        if !updated {
            return Err(user_not_found());
        }

        tracing::info!(user_id = user.id, "Password changed");
        Ok(())
    }

    /// Revokes the presented refresh token, if any. Never fails on a bad token.
    pub async fn logout(&self, refresh_token: Option<&str>) -> Result<(), AppError> {
        let Some(token) = refresh_token else {
            return Ok(());
        };

        match self.token_service.verify_refresh_token(token) {
            Ok(claims) => {
                self.revocation_repository
                    .revoke(&claims.token_id, claims.user_id, claims.expires_at())
                    .await?;
                tracing::debug!(user_id = claims.user_id, "Refresh token revoked on logout");
            }
            Err(_) => tracing::debug!("Ignoring invalid refresh token on logout"),
        }

        Ok(())
    }

    /// Current account record for an authenticated identity.
    pub async fn me(&self, identity: &Identity) -> Result<User, AppError> {
        self.load_user(identity.user_id).await
    }

    pub fn token_service(&self) -> &TokenService {
        &self.token_service
    }

    async fn load_user(&self, user_id: i64) -> Result<User, AppError> {
        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(user_not_found)
    }

    fn open_session(&self, user: User) -> Result<AuthSession, AppError> {
        let tokens = self
            .token_service
            .issue_session_tokens(&Identity::from(&user))?;
        Ok(AuthSession { user, tokens })
    }
}

fn invalid_credentials() -> AppError {
    AppError::unauthorized("Invalid credentials", json!({}))
}

fn user_not_found() -> AppError {
    AppError::not_found("User not found", json!({}))
}
