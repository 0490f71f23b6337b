mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
async fn test_create_link_success() {
    let app = common::create_test_app();
    let server = common::make_server(&app);
    let session = common::register(&server, "owner@example.com").await;

    let response = server
        .post("/api/v1/links")
        .add_header("Cookie", session.access_cookie())
        .json(&json!({ "url": "https://example.com/some/long/path" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let code = body["shortCode"].as_str().unwrap();
    assert_eq!(code.len(), 8);
    assert_eq!(body["originalUrl"], "https://example.com/some/long/path");
    assert_eq!(body["shortUrl"], format!("{}/{code}", common::BASE_URL));
}

#[tokio::test]
async fn test_create_link_accepts_original_url_field() {
    let app = common::create_test_app();
    let server = common::make_server(&app);
    let session = common::register(&server, "owner@example.com").await;

    let response = server
        .post("/api/v1/links")
        .add_header("Cookie", session.access_cookie())
        .json(&json!({ "originalUrl": "https://example.com" }))
        .await;

    response.assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_create_link_is_idempotent() {
    let app = common::create_test_app();
    let server = common::make_server(&app);
    let session = common::register(&server, "owner@example.com").await;

    let mut codes = Vec::new();
    for _ in 0..2 {
        let response = server
            .post("/api/v1/links")
            .add_header("Cookie", session.access_cookie())
            .json(&json!({ "url": "https://example.com/same" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        codes.push(response.json::<Value>()["shortCode"].clone());
    }

    assert_eq!(codes[0], codes[1]);
    assert_eq!(app.links.len(), 1);
}

#[tokio::test]
async fn test_create_link_requires_session() {
    let app = common::create_test_app();
    let server = common::make_server(&app);

    let response = server
        .post("/api/v1/links")
        .json(&json!({ "url": "https://example.com" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert!(app.links.is_empty());
}

#[tokio::test]
async fn test_create_link_rejects_bad_token() {
    let app = common::create_test_app();
    let server = common::make_server(&app);

    let response = server
        .post("/api/v1/links")
        .add_header("Cookie", "access_token=not.a.jwt")
        .json(&json!({ "url": "https://example.com" }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["error"]["code"], "invalid_token");
}

#[tokio::test]
async fn test_create_link_invalid_url() {
    let app = common::create_test_app();
    let server = common::make_server(&app);
    let session = common::register(&server, "owner@example.com").await;

    for url in ["", "not-a-url", "ftp://example.com/file"] {
        let response = server
            .post("/api/v1/links")
            .add_header("Cookie", session.access_cookie())
            .json(&json!({ "url": url }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>()["error"]["code"],
            "validation_error"
        );
    }
    assert!(app.links.is_empty());
}

#[tokio::test]
async fn test_resolve_link_without_session() {
    let app = common::create_test_app();
    let server = common::make_server(&app);
    let session = common::register(&server, "owner@example.com").await;

    let created: Value = server
        .post("/api/v1/links")
        .add_header("Cookie", session.access_cookie())
        .json(&json!({ "url": "https://example.com/a" }))
        .await
        .json();
    let code = created["shortCode"].as_str().unwrap();

    let response = server.get(&format!("/api/v1/links/{code}")).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["shortCode"], code);
    assert_eq!(body["originalUrl"], "https://example.com/a");
}

#[tokio::test]
async fn test_resolve_link_ignores_bad_token() {
    let app = common::create_test_app();
    let server = common::make_server(&app);
    let session = common::register(&server, "owner@example.com").await;

    let created: Value = server
        .post("/api/v1/links")
        .add_header("Cookie", session.access_cookie())
        .json(&json!({ "url": "https://example.com/a" }))
        .await
        .json();
    let code = created["shortCode"].as_str().unwrap();

    server
        .get(&format!("/api/v1/links/{code}"))
        .add_header("Cookie", "access_token=garbage")
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_resolve_link_not_found() {
    let app = common::create_test_app();
    let server = common::make_server(&app);

    let response = server.get("/api/v1/links/doesnotexist").await;

    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["error"]["code"], "link_not_found");
}

#[tokio::test]
async fn test_deactivate_link_success() {
    let app = common::create_test_app();
    let server = common::make_server(&app);
    let session = common::register(&server, "owner@example.com").await;

    let created: Value = server
        .post("/api/v1/links")
        .add_header("Cookie", session.access_cookie())
        .json(&json!({ "url": "https://example.com/a" }))
        .await
        .json();
    let code = created["shortCode"].as_str().unwrap();

    server
        .delete(&format!("/api/v1/links/{code}"))
        .add_header("Cookie", session.access_cookie())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let response = server.get(&format!("/api/v1/links/{code}")).await;
    response.assert_status(StatusCode::GONE);
    assert_eq!(response.json::<Value>()["error"]["code"], "link_deactivated");

    // Second deactivation is a no-op.
    server
        .delete(&format!("/api/v1/links/{code}"))
        .add_header("Cookie", session.access_cookie())
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_deactivate_link_of_another_owner() {
    let app = common::create_test_app();
    let server = common::make_server(&app);
    let owner = common::register(&server, "owner@example.com").await;
    let stranger = common::register(&server, "stranger@example.com").await;

    let created: Value = server
        .post("/api/v1/links")
        .add_header("Cookie", owner.access_cookie())
        .json(&json!({ "url": "https://example.com/a" }))
        .await
        .json();
    let code = created["shortCode"].as_str().unwrap();

    server
        .delete(&format!("/api/v1/links/{code}"))
        .add_header("Cookie", stranger.access_cookie())
        .await
        .assert_status_not_found();

    server
        .get(&format!("/api/v1/links/{code}"))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_deactivate_link_requires_session() {
    let app = common::create_test_app();
    let server = common::make_server(&app);

    server
        .delete("/api/v1/links/abc12345")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
