//! Handler for short URL redirect.

use axum::{
    Extension,
    extract::{Path, State},
    response::Redirect,
};

use crate::domain::entities::Identity;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Validate the code alphabet
/// 2. Look the link up and reject inactive links
/// 3. Count the click with a single atomic update
/// 4. Return 307 Temporary Redirect
///
/// A failure to count the click is logged and does not block the redirect.
/// The session is optional here: signed-in users are logged, anonymous
/// visitors are redirected the same way.
///
/// # Errors
///
/// - `400` for a code with characters outside `0-9A-Za-z`
/// - `404` for an unknown code
/// - `410` for a deactivated link
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    session: Option<Extension<Identity>>,
) -> Result<Redirect, AppError> {
    let original_url = state.link_service.resolve_short_link(&code).await?;

    tracing::debug!(
        code = %code,
        user_id = session.map(|Extension(identity)| identity.user_id),
        "Redirecting"
    );

    Ok(Redirect::temporary(&original_url))
}
