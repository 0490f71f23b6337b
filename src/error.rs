//! Application error type and its HTTP rendering.
//!
//! Every layer returns [`AppError`]. Handlers let it bubble up and axum renders
//! it through [`IntoResponse`] as:
//!
//! ```json
//! { "error": { "code": "not_found", "message": "Short link not found", "details": {} } }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

/// Unique constraint guarding `links.short_code`.
pub const SHORT_CODE_CONSTRAINT: &str = "links_short_code_key";

/// Unique constraint guarding `(links.owner_id, links.original_url)`.
pub const OWNER_URL_CONSTRAINT: &str = "links_owner_url_key";

/// Unique constraint guarding `users.email`.
pub const USER_EMAIL_CONSTRAINT: &str = "users_email_key";

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Serializable error payload.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// No credentials were presented.
    #[error("{message}")]
    Unauthorized { message: String, details: Value },

    /// Credentials were presented but are not acceptable for this operation.
    #[error("{message}")]
    Forbidden { message: String, details: Value },

    /// Signature, issuer, audience, kind or expiry mismatch. Never says which.
    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    #[error("{message}")]
    NotFound { message: String, details: Value },

    #[error("Short link not found")]
    LinkNotFound { code: String },

    #[error("Short link has been deactivated")]
    LinkDeactivated { code: String },

    #[error("{message}")]
    Conflict { message: String, details: Value },

    /// The candidate short code is already taken. Retried by the allocator.
    #[error("Short code already exists")]
    ShortCodeConflict { code: String },

    /// The owner already has a link for this URL.
    #[error("Link already exists for this owner and URL")]
    DuplicateLink,

    #[error("Could not allocate a unique short code of length {code_length} after {attempts} attempts")]
    CodeSpaceExhausted { code_length: usize, attempts: usize },

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }
    pub fn forbidden(message: impl Into<String>, details: Value) -> Self {
        Self::Forbidden {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// HTTP status this error is rendered with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } | AppError::InvalidOrExpiredToken => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } | AppError::LinkNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::LinkDeactivated { .. } => StatusCode::GONE,
            AppError::Conflict { .. }
            | AppError::ShortCodeConflict { .. }
            | AppError::DuplicateLink => StatusCode::CONFLICT,
            AppError::CodeSpaceExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts the error into its wire representation.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (code, details) = match self {
            AppError::Validation { details, .. } => ("validation_error", details.clone()),
            AppError::Unauthorized { details, .. } => ("unauthorized", details.clone()),
            AppError::Forbidden { details, .. } => ("forbidden", details.clone()),
            AppError::InvalidOrExpiredToken => ("invalid_token", json!({})),
            AppError::NotFound { details, .. } => ("not_found", details.clone()),
            AppError::LinkNotFound { code } => ("link_not_found", json!({ "code": code })),
            AppError::LinkDeactivated { code } => ("link_deactivated", json!({ "code": code })),
            AppError::Conflict { details, .. } => ("conflict", details.clone()),
            AppError::ShortCodeConflict { .. } | AppError::DuplicateLink => {
                ("conflict", json!({}))
            }
            AppError::CodeSpaceExhausted { .. } => ("code_space_exhausted", json!({})),
            // Internal details stay in the logs.
            AppError::Internal { .. } => ("internal_error", json!({})),
        };

        ErrorInfo {
            code,
            message: self.to_string(),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
        }

        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return match db.constraint() {
                Some(SHORT_CODE_CONSTRAINT) => AppError::ShortCodeConflict {
                    code: String::new(),
                },
                Some(OWNER_URL_CONSTRAINT) => AppError::DuplicateLink,
                Some(USER_EMAIL_CONSTRAINT) => AppError::conflict(
                    "User with this email already exists",
                    json!({ "field": "email" }),
                ),
                other => AppError::conflict(
                    "Unique constraint violation",
                    json!({ "constraint": other }),
                ),
            };
        }

        AppError::internal("Database error", json!({ "source": e.to_string() }))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(e.field_errors()).unwrap_or_else(|_| json!({}));
        AppError::bad_request("Request validation failed", details)
    }
}
