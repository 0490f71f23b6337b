//! Signed session tokens and the cookies that carry them.
//!
//! Access and refresh tokens are HS256 JWTs. Both carry the issuer, audience
//! and a `tokenType` discriminator so one kind can never be replayed as the
//! other. Verification failures of any sort collapse into
//! [`AppError::InvalidOrExpiredToken`].

use chrono::{DateTime, Duration, Utc};
use cookie::{Cookie, SameSite};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::entities::Identity;
use crate::error::AppError;

pub const TOKEN_ISSUER: &str = "url-shortner";
pub const TOKEN_AUDIENCE: &str = "url-shortner-users";

pub const ACCESS_COOKIE_NAME: &str = "access_token";
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";
pub const ACCESS_COOKIE_PATH: &str = "/";
pub const REFRESH_COOKIE_PATH: &str = "/api/v1/auth/refresh";

/// Minimum signing secret length in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    pub user_id: i64,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
    pub token_type: TokenKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshClaims {
    pub user_id: i64,
    pub token_id: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
    pub token_type: TokenKind,
}

impl RefreshClaims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

impl From<&AccessClaims> for Identity {
    fn from(claims: &AccessClaims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email.clone(),
        }
    }
}

/// A freshly minted token pair.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub refresh_token_id: String,
}

#[derive(Clone)]
pub struct TokenSettings {
    pub secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    /// Emit `Secure` cookies. Enabled in production.
    pub secure_cookies: bool,
}

/// Issues and verifies session tokens and builds their cookies.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
    secure_cookies: bool,
}

impl TokenService {
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the secret is shorter than
    /// [`MIN_SECRET_LENGTH`] bytes.
    pub fn new(settings: TokenSettings) -> Result<Self, AppError> {
        if settings.secret.len() < MIN_SECRET_LENGTH {
            return Err(AppError::internal(
                "JWT secret is too short",
                json!({ "min_length": MIN_SECRET_LENGTH }),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_audience(&[TOKEN_AUDIENCE]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.secret.as_bytes()),
            validation,
            access_ttl: settings.access_ttl,
            refresh_ttl: settings.refresh_ttl,
            secure_cookies: settings.secure_cookies,
        })
    }

    pub fn issue_access_token(&self, identity: &Identity) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = AccessClaims {
            user_id: identity.user_id,
            email: identity.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
            iss: TOKEN_ISSUER.to_string(),
            aud: TOKEN_AUDIENCE.to_string(),
            token_type: TokenKind::Access,
        };

        self.sign(&claims)
    }

    /// Issues a refresh token and returns it with its random token id.
    pub fn issue_refresh_token(&self, user_id: i64) -> Result<(String, String), AppError> {
        let now = Utc::now();
        let token_id = uuid::Uuid::new_v4().to_string();
        let claims = RefreshClaims {
            user_id,
            token_id: token_id.clone(),
            iat: now.timestamp(),
            exp: (now + self.refresh_ttl).timestamp(),
            iss: TOKEN_ISSUER.to_string(),
            aud: TOKEN_AUDIENCE.to_string(),
            token_type: TokenKind::Refresh,
        };

        Ok((self.sign(&claims)?, token_id))
    }

    pub fn issue_session_tokens(&self, identity: &Identity) -> Result<SessionTokens, AppError> {
        let access_token = self.issue_access_token(identity)?;
        let (refresh_token, refresh_token_id) = self.issue_refresh_token(identity.user_id)?;

        Ok(SessionTokens {
            access_token,
            refresh_token,
            refresh_token_id,
        })
    }

    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, AppError> {
        let claims: AccessClaims = self.verify(token)?;
        if claims.token_type != TokenKind::Access {
            return Err(AppError::InvalidOrExpiredToken);
        }
        Ok(claims)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, AppError> {
        let claims: RefreshClaims = self.verify(token)?;
        if claims.token_type != TokenKind::Refresh {
            return Err(AppError::InvalidOrExpiredToken);
        }
        Ok(claims)
    }

    /// Cookies that store a freshly issued pair.
    pub fn session_cookies(&self, tokens: &SessionTokens) -> [Cookie<'static>; 2] {
        [
            self.build_cookie(
                ACCESS_COOKIE_NAME,
                tokens.access_token.clone(),
                ACCESS_COOKIE_PATH,
                self.access_ttl,
            ),
            self.build_cookie(
                REFRESH_COOKIE_NAME,
                tokens.refresh_token.clone(),
                REFRESH_COOKIE_PATH,
                self.refresh_ttl,
            ),
        ]
    }

    /// Cookies that remove both tokens. Names and paths match the issuing cookies.
    pub fn clear_cookies(&self) -> [Cookie<'static>; 2] {
        [
            self.build_cookie(
                ACCESS_COOKIE_NAME,
                String::new(),
                ACCESS_COOKIE_PATH,
                Duration::zero(),
            ),
            self.build_cookie(
                REFRESH_COOKIE_NAME,
                String::new(),
                REFRESH_COOKIE_PATH,
                Duration::zero(),
            ),
        ]
    }

    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(|e| {
            AppError::internal("Failed to sign token", json!({ "reason": e.to_string() }))
        })
    }

    fn verify<T: for<'de> Deserialize<'de>>(&self, token: &str) -> Result<T, AppError> {
        decode::<T>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token rejected");
                AppError::InvalidOrExpiredToken
            })
    }

    fn build_cookie(
        &self,
        name: &'static str,
        value: String,
        path: &'static str,
        max_age: Duration,
    ) -> Cookie<'static> {
        let mut cookie = Cookie::new(name, value);
        cookie.set_path(path);
        cookie.set_http_only(true);
        cookie.set_secure(self.secure_cookies);
        cookie.set_same_site(SameSite::Strict);
        cookie.set_max_age(cookie::time::Duration::seconds(max_age.num_seconds()));
        cookie
    }
}

/// Returns the access token from a raw `Cookie` header, if any.
///
/// Absent or malformed headers yield `None`.
pub fn extract_from_cookie_header(header: Option<&str>) -> Option<String> {
    extract_cookie(header, ACCESS_COOKIE_NAME)
}

/// Returns the refresh token from a raw `Cookie` header, if any.
pub fn extract_refresh_from_cookie_header(header: Option<&str>) -> Option<String> {
    extract_cookie(header, REFRESH_COOKIE_NAME)
}

fn extract_cookie(header: Option<&str>, name: &str) -> Option<String> {
    Cookie::split_parse(header?)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}
