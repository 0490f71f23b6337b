#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::{Router, http::header, routing::get};
use axum_test::{TestResponse, TestServer};
use chrono::Duration;
use cookie::Cookie;
use linkgate::api::handlers::health_handler;
use linkgate::api::routes;
use linkgate::application::services::{LinkSettings, TokenSettings};
use linkgate::infrastructure::persistence::{
    InMemoryLinkRepository, InMemoryRevocationRepository, InMemoryUserRepository,
};
use linkgate::state::{AppSettings, AppState};
use serde_json::json;
use sqlx::PgPool;

pub const TEST_SECRET: &str = "integration_test_secret_of_32_bytes";
pub const BASE_URL: &str = "http://sho.rt";
pub const PASSWORD: &str = "correct horse battery";

pub struct TestApp {
    pub state: AppState,
    pub links: Arc<InMemoryLinkRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub revocations: Arc<InMemoryRevocationRepository>,
}

pub fn test_settings(trust_claims: bool) -> AppSettings {
    AppSettings {
        base_url: BASE_URL.to_string(),
        links: LinkSettings::default(),
        tokens: TokenSettings {
            secret: TEST_SECRET.to_string(),
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(7),
            secure_cookies: false,
        },
        trust_claims,
    }
}

pub fn create_test_app() -> TestApp {
    create_test_app_with(test_settings(true))
}

pub fn create_test_app_with(settings: AppSettings) -> TestApp {
    let links = Arc::new(InMemoryLinkRepository::new());
    let users = Arc::new(InMemoryUserRepository::new());
    let revocations = Arc::new(InMemoryRevocationRepository::new());

    let state = AppState::new(
        links.clone(),
        users.clone(),
        revocations.clone(),
        settings,
    )
    .unwrap();

    TestApp {
        state,
        links,
        users,
        revocations,
    }
}

/// Every route with its session layers, without rate limiting.
pub fn test_router(state: AppState) -> Router {
    let auth = routes::auth_public_routes().merge(routes::auth_protected_routes(&state));

    Router::new()
        .route("/health", get(health_handler))
        .merge(routes::redirect_routes(&state))
        .nest("/api/v1", routes::link_routes(&state).nest("/auth", auth))
        .with_state(state)
}

pub fn make_server(app: &TestApp) -> TestServer {
    TestServer::new(test_router(app.state.clone())).unwrap()
}

/// `Set-Cookie` headers of a response, keyed by cookie name.
pub fn set_cookies(response: &TestResponse) -> HashMap<String, Cookie<'static>> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| Cookie::parse(value.to_str().unwrap().to_string()).unwrap())
        .map(|cookie| (cookie.name().to_string(), cookie))
        .collect()
}

/// Session cookies returned by a successful register or login.
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
}

impl Session {
    pub fn from_response(response: &TestResponse) -> Self {
        let cookies = set_cookies(response);
        Self {
            access_token: cookies["access_token"].value().to_string(),
            refresh_token: cookies["refresh_token"].value().to_string(),
        }
    }

    pub fn access_cookie(&self) -> String {
        format!("access_token={}", self.access_token)
    }

    pub fn refresh_cookie(&self) -> String {
        format!("refresh_token={}", self.refresh_token)
    }
}

pub async fn register(server: &TestServer, email: &str) -> Session {
    let response = server
        .post("/api/v1/auth/register")
        .json(&json!({ "email": email, "password": PASSWORD }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    Session::from_response(&response)
}

pub async fn create_test_user(pool: &PgPool, email: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO users (email, password_hash) VALUES ($1, 'hash') RETURNING id")
        .bind(email)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn create_test_link(pool: &PgPool, code: &str, url: &str, owner_id: i64) {
    sqlx::query("INSERT INTO links (short_code, original_url, owner_id) VALUES ($1, $2, $3)")
        .bind(code)
        .bind(url)
        .bind(owner_id)
        .execute(pool)
        .await
        .unwrap();
}
