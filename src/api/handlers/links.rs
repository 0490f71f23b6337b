//! Handlers for the owner-facing short link API.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::links::{CreateLinkRequest, CreateLinkResponse, ResolveLinkResponse};
use crate::domain::entities::Identity;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link owned by the authenticated user.
///
/// # Endpoint
///
/// `POST /api/v1/links`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/some/long/path" }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "shortCode": "aZ3kT9Lm",
///   "originalUrl": "https://example.com/some/long/path",
///   "shortUrl": "http://localhost:3000/aZ3kT9Lm"
/// }
/// ```
///
/// Repeating the request for the same URL returns the same code.
///
/// # Errors
///
/// - `400` for a malformed, non-HTTP(S) or overlong URL
/// - `503` when no free short code was found within the attempt budget
pub async fn create_link_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<CreateLinkResponse>), AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .create_short_link(&payload.url, identity.user_id)
        .await?;

    let short_url = state
        .link_service
        .get_short_url(&state.base_url, &link.short_code);

    Ok((
        StatusCode::CREATED,
        Json(CreateLinkResponse {
            short_code: link.short_code,
            original_url: link.original_url,
            short_url,
        }),
    ))
}

/// Resolves a short code without redirecting. Counts a click.
///
/// # Endpoint
///
/// `GET /api/v1/links/{code}`
///
/// # Errors
///
/// - `404` for an unknown code
/// - `410` for a deactivated link
pub async fn resolve_link_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
    session: Option<Extension<Identity>>,
) -> Result<Json<ResolveLinkResponse>, AppError> {
    let original_url = state.link_service.resolve_short_link(&code).await?;

    if let Some(Extension(identity)) = session {
        tracing::debug!(code = %code, user_id = identity.user_id, "Link resolved by signed-in user");
    }

    Ok(Json(ResolveLinkResponse {
        short_code: code,
        original_url,
    }))
}

/// Deactivates a link owned by the authenticated user.
///
/// # Endpoint
///
/// `DELETE /api/v1/links/{code}`
///
/// # Response
///
/// `204 No Content`, also when the link was already inactive.
///
/// # Errors
///
/// - `404` when the code does not exist or belongs to another user
pub async fn deactivate_link_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(code): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .link_service
        .deactivate_short_link(&code, identity.user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
