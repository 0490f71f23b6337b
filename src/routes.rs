//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`           - Health check (public)
//! - `GET  /{code}`           - Short link redirect (session optional)
//! - `/api/v1/links*`         - Short link API
//! - `/api/v1/auth/*`         - Accounts and cookie sessions
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Security headers** - `nosniff`, frame denial, HSTS and friends
//! - **CORS** - A single allowed origin with credentials
//! - **Rate limiting** - Per-IP token bucket, stricter on credential routes
//! - **Sessions** - Access token cookie, required or optional per route
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::{rate_limit, security_headers, tracing};
use crate::config::Config;
use crate::state::AppState;
use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method, header};
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// HTTP-level settings for [`app_router`].
#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub cors_origin: HeaderValue,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl RouterSettings {
    /// # Errors
    ///
    /// Fails if `CORS_ORIGIN` is not a valid header value.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            cors_origin: HeaderValue::from_str(&config.cors_origin)
                .context("CORS_ORIGIN is not a valid origin")?,
            rate_limit_per_second: config.rate_limit_per_second,
            rate_limit_burst: config.rate_limit_burst,
        })
    }
}

fn cors_layer(origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Constructs the application router with all routes and middleware.
///
/// Rate limiting keys on the peer address, so the router must be served with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn app_router(state: AppState, settings: &RouterSettings) -> NormalizePath<Router> {
    let limit = || rate_limit::layer(settings.rate_limit_per_second, settings.rate_limit_burst);

    let auth_router = api::routes::auth_public_routes()
        .layer(rate_limit::auth_layer())
        .merge(api::routes::auth_protected_routes(&state).layer(limit()));

    let api_router = api::routes::link_routes(&state)
        .layer(limit())
        .nest("/auth", auth_router);

    let router = Router::new()
        .route("/health", get(health_handler))
        .merge(api::routes::redirect_routes(&state).layer(limit()))
        .nest("/api/v1", api_router)
        .with_state(state)
        .layer(cors_layer(settings.cors_origin.clone()))
        .layer(middleware::from_fn(security_headers::layer))
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
