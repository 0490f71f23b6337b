mod common;

use axum::http::{StatusCode, header};
use linkgate::domain::repositories::LinkRepository;
use serde_json::{Value, json};

async fn create_link(server: &axum_test::TestServer, cookie: String, url: &str) -> String {
    let body: Value = server
        .post("/api/v1/links")
        .add_header("Cookie", cookie)
        .json(&json!({ "url": url }))
        .await
        .json();
    body["shortCode"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_redirect_success() {
    let app = common::create_test_app();
    let server = common::make_server(&app);
    let session = common::register(&server, "owner@example.com").await;
    let code = create_link(&server, session.access_cookie(), "https://example.com/target").await;

    let response = server.get(&format!("/{code}")).await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://example.com/target"
    );
}

#[tokio::test]
async fn test_redirect_counts_clicks() {
    let app = common::create_test_app();
    let server = common::make_server(&app);
    let session = common::register(&server, "owner@example.com").await;
    let code = create_link(&server, session.access_cookie(), "https://example.com/target").await;

    for _ in 0..3 {
        server
            .get(&format!("/{code}"))
            .await
            .assert_status(StatusCode::TEMPORARY_REDIRECT);
    }
    server
        .get(&format!("/{code}"))
        .add_header("Cookie", session.access_cookie())
        .await
        .assert_status(StatusCode::TEMPORARY_REDIRECT);

    let link = app.links.find_by_code(&code).await.unwrap().unwrap();
    assert_eq!(link.clicks, 4);
}

#[tokio::test]
async fn test_redirect_not_found() {
    let app = common::create_test_app();
    let server = common::make_server(&app);

    server.get("/doesnotexist").await.assert_status_not_found();
}

#[tokio::test]
async fn test_redirect_invalid_code() {
    let app = common::create_test_app();
    let server = common::make_server(&app);

    server
        .get("/bad-code")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_redirect_deactivated_link() {
    let app = common::create_test_app();
    let server = common::make_server(&app);
    let session = common::register(&server, "owner@example.com").await;
    let code = create_link(&server, session.access_cookie(), "https://example.com/target").await;

    server
        .delete(&format!("/api/v1/links/{code}"))
        .add_header("Cookie", session.access_cookie())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .get(&format!("/{code}"))
        .await
        .assert_status(StatusCode::GONE);

    let link = app.links.find_by_code(&code).await.unwrap().unwrap();
    assert_eq!(link.clicks, 0);
}
