//! Cookie session middleware.
//!
//! Thin adapters over [`crate::application::services::SessionGuard`]. On
//! success the authenticated [`crate::domain::entities::Identity`] is inserted
//! into request extensions, where handlers pick it up with
//! `Extension<Identity>` or `Option<Extension<Identity>>`.
//!
//! ```rust,ignore
//! let protected = Router::new()
//!     .route("/links", post(create_link_handler))
//!     .route_layer(middleware::from_fn_with_state(state.clone(), session::require_session));
//! ```

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

use crate::application::services::GuardMode;
use crate::error::AppError;
use crate::state::AppState;

/// Rejects the request unless it carries a valid access token cookie.
///
/// # Errors
///
/// - `401 Unauthorized` when no access token cookie is present
/// - `403 Forbidden` when the token is invalid or expired
pub async fn require_session(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    authenticate(st, req, next, GuardMode::Required).await
}

/// Attaches an identity when the request carries a valid token. Never rejects.
pub async fn optional_session(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    authenticate(st, req, next, GuardMode::Optional).await
}

async fn authenticate(
    st: AppState,
    mut req: Request,
    next: Next,
    mode: GuardMode,
) -> Result<Response, AppError> {
    let cookie_header = cookie_header(req.headers());

    if let Some(identity) = st
        .session_guard
        .authenticate(cookie_header.as_deref(), mode)
        .await?
    {
        req.extensions_mut().insert(identity);
    }

    Ok(next.run(req).await)
}

/// Joins every `Cookie` header into one string. HTTP/2 clients may split them.
pub fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let values: Vec<&str> = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_cookie_header_joins_multiple_values() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::COOKIE, HeaderValue::from_static("access_token=t"));

        assert_eq!(
            cookie_header(&headers).as_deref(),
            Some("a=1; access_token=t")
        );
    }

    #[test]
    fn test_cookie_header_absent() {
        assert_eq!(cookie_header(&HeaderMap::new()), None);
    }
}
