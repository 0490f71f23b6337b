//! API route configuration.
//!
//! Session requirements are attached per router with `route_layer`, so a
//! path can mix guarded and open methods once the routers are merged.

use crate::api::handlers::{
    change_password_handler, create_link_handler, deactivate_link_handler, login_handler,
    logout_handler, me_handler, redirect_handler, refresh_handler, register_handler,
    resolve_link_handler,
};
use crate::api::middleware::session;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

/// Short link routes, mounted under `/api/v1`.
///
/// # Endpoints
///
/// - `POST   /links`          - Create a short link (session required)
/// - `DELETE /links/{code}`   - Deactivate an owned link (session required)
/// - `GET    /links/{code}`   - Resolve a code without redirecting (session optional)
pub fn link_routes(state: &AppState) -> Router<AppState> {
    let owner = Router::new()
        .route("/links", post(create_link_handler))
        .route("/links/{code}", delete(deactivate_link_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_session,
        ));

    let public = Router::new()
        .route("/links/{code}", get(resolve_link_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::optional_session,
        ));

    owner.merge(public)
}

/// Credential routes, mounted under `/api/v1/auth`.
///
/// # Endpoints
///
/// - `POST /register` - Create an account and open a session
/// - `POST /login`    - Open a session
/// - `POST /refresh`  - Rotate the token pair using the refresh cookie
pub fn auth_public_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/refresh", post(refresh_handler))
}

/// Session routes, mounted under `/api/v1/auth`.
///
/// # Endpoints
///
/// - `POST /logout`          - Revoke the refresh token and clear cookies
/// - `POST /change-password` - Replace the password and clear cookies
/// - `GET  /me`              - Current account
pub fn auth_protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout_handler))
        .route("/change-password", post(change_password_handler))
        .route("/me", get(me_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_session,
        ))
}

/// Short URL redirect: `GET /{code}`, session optional.
pub fn redirect_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/{code}", get(redirect_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::optional_session,
        ))
}
