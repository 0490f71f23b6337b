//! Handlers for account registration and cookie sessions.
//!
//! Every handler that issues or drops a session answers with `Set-Cookie`
//! headers built by [`crate::application::services::TokenService`]. Token
//! values never appear in response bodies.

use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, HeaderName, StatusCode, header},
    response::{AppendHeaders, IntoResponse, Response},
};
use cookie::Cookie;
use validator::Validate;

use crate::api::dto::auth::{
    AuthResponse, ChangePasswordRequest, LoginRequest, MeResponse, MessageResponse,
    RegisterRequest, UserView,
};
use crate::api::middleware::session::cookie_header;
use crate::application::services::token_service::extract_refresh_from_cookie_header;
use crate::domain::entities::Identity;
use crate::error::AppError;
use crate::state::AppState;

type SetCookies = AppendHeaders<[(HeaderName, String); 2]>;

fn set_cookies(cookies: [Cookie<'static>; 2]) -> SetCookies {
    AppendHeaders(cookies.map(|cookie| (header::SET_COOKIE, cookie.to_string())))
}

fn refresh_token(headers: &HeaderMap) -> Option<String> {
    extract_refresh_from_cookie_header(cookie_header(headers).as_deref())
}

/// Registers a new account and opens a session.
///
/// # Endpoint
///
/// `POST /api/v1/auth/register`
///
/// # Request Body
///
/// ```json
/// { "email": "alice@example.com", "password": "correct horse" }
/// ```
///
/// # Response
///
/// `201 Created` with both session cookies set.
///
/// ```json
/// {
///   "message": "Registration successful",
///   "user": { "id": 1, "email": "alice@example.com", "createdAt": "...", "updatedAt": "..." }
/// }
/// ```
///
/// # Errors
///
/// - `400` for an invalid email or a password outside 8..=128 characters
/// - `409` when the email is already registered
pub async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let session = state
        .account_service
        .register(&payload.email, &payload.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        set_cookies(state.token_service.session_cookies(&session.tokens)),
        Json(AuthResponse {
            message: "Registration successful".to_string(),
            user: UserView::from(session.user),
        }),
    )
        .into_response())
}

/// Verifies credentials and opens a session.
///
/// # Endpoint
///
/// `POST /api/v1/auth/login`
///
/// # Errors
///
/// - `401` with the same message for an unknown email or a wrong password
pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let session = state
        .account_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok((
        set_cookies(state.token_service.session_cookies(&session.tokens)),
        Json(AuthResponse {
            message: "Login successful".to_string(),
            user: UserView::from(session.user),
        }),
    )
        .into_response())
}

/// Exchanges the refresh cookie for a new token pair.
///
/// # Endpoint
///
/// `POST /api/v1/auth/refresh`
///
/// The presented refresh token is consumed. Replaying it fails.
///
/// # Errors
///
/// - `401` when no refresh cookie is sent
/// - `403` when the token is invalid, expired or already used
/// - `401` when the account no longer exists
///
/// Both cookies are cleared whenever a presented token is rejected.
pub async fn refresh_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = refresh_token(&headers);
    let presented = token.is_some();

    match state.account_service.refresh(token.as_deref()).await {
        Ok(session) => (
            set_cookies(state.token_service.session_cookies(&session.tokens)),
            Json(MessageResponse::new("Token refreshed successfully")),
        )
            .into_response(),
        Err(e) if presented => (set_cookies(state.token_service.clear_cookies()), e).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Ends the session and clears both cookies.
///
/// # Endpoint
///
/// `POST /api/v1/auth/logout`
///
/// A refresh token sent along with the request is revoked.
pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    state
        .account_service
        .logout(refresh_token(&headers).as_deref())
        .await?;

    tracing::info!(user_id = identity.user_id, "User logged out");

    Ok((
        set_cookies(state.token_service.clear_cookies()),
        Json(MessageResponse::new("Logout successful")),
    )
        .into_response())
}

/// Replaces the password and ends the session.
///
/// # Endpoint
///
/// `POST /api/v1/auth/change-password`
///
/// # Request Body
///
/// ```json
/// { "currentPassword": "correct horse", "newPassword": "battery staple" }
/// ```
///
/// # Errors
///
/// - `400` when the current password does not match
/// - `404` when the account no longer exists
pub async fn change_password_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Response, AppError> {
    payload.validate()?;

    state
        .account_service
        .change_password(&identity, &payload.current_password, &payload.new_password)
        .await?;

    Ok((
        set_cookies(state.token_service.clear_cookies()),
        Json(MessageResponse::new(
            "Password changed successfully. Please log in again.",
        )),
    )
        .into_response())
}

/// Returns the account behind the current session.
///
/// # Endpoint
///
/// `GET /api/v1/auth/me`
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<MeResponse>, AppError> {
    let user = state.account_service.me(&identity).await?;

    Ok(Json(MeResponse {
        user: UserView::from(user),
    }))
}
