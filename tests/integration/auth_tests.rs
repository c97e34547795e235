//! Authentication flow tests

use serde_json::json;

use crate::common::{TestApp, ADMIN_EMAIL, ADMIN_PASSWORD};

#[tokio::test]
async fn test_login_with_bootstrap_admin() {
    let app = TestApp::new().await;

    let response = app
        .post_json(
            "/api/v1/auth/login",
            json!({"email": ADMIN_EMAIL, "password": ADMIN_PASSWORD}),
        )
        .await;

    response.assert_ok();
    let body: serde_json::Value = response.json();
    assert!(body["access_token"].as_str().is_some());
    assert!(body["refresh_token"].as_str().is_some());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user"]["email"], ADMIN_EMAIL);
    assert_eq!(body["user"]["role"], "ADMIN");
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = TestApp::new().await;

    let response = app
        .post_json(
            "/api/v1/auth/login",
            json!({"email": ADMIN_EMAIL, "password": "senha-errada-123"}),
        )
        .await;

    response.assert_unauthorized();
}

#[tokio::test]
async fn test_login_with_unknown_email() {
    let app = TestApp::new().await;

    let response = app
        .post_json(
            "/api/v1/auth/login",
            json!({"email": "ninguem@teste.gov.br", "password": ADMIN_PASSWORD}),
        )
        .await;

    response.assert_unauthorized();
}

#[tokio::test]
async fn test_me_returns_authenticated_user() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let response = app.get_auth("/api/v1/auth/me", &token).await;

    response.assert_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["email"], ADMIN_EMAIL);
}

#[tokio::test]
async fn test_protected_route_without_token() {
    let app = TestApp::new().await;

    app.get("/api/v1/auth/me").await.assert_unauthorized();
    app.get("/api/v1/revenues").await.assert_unauthorized();
    app.get("/api/v1/audit-logs").await.assert_unauthorized();
}

#[tokio::test]
async fn test_protected_route_with_garbage_token() {
    let app = TestApp::new().await;

    let response = app.get_auth("/api/v1/auth/me", "not-a-jwt").await;
    response.assert_unauthorized();
}

#[tokio::test]
async fn test_refresh_token_flow() {
    let app = TestApp::new().await;

    let login = app
        .post_json(
            "/api/v1/auth/login",
            json!({"email": ADMIN_EMAIL, "password": ADMIN_PASSWORD}),
        )
        .await;
    login.assert_ok();
    let body: serde_json::Value = login.json();
    let refresh_token = body["refresh_token"].as_str().unwrap();

    let refreshed = app
        .post_json("/api/v1/auth/refresh", json!({"refresh_token": refresh_token}))
        .await;
    refreshed.assert_ok();

    let refreshed_body: serde_json::Value = refreshed.json();
    let new_access = refreshed_body["access_token"].as_str().unwrap();
    app.get_auth("/api/v1/auth/me", new_access).await.assert_ok();
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let app = TestApp::new().await;
    let access_token = app.admin_token().await;

    let response = app
        .post_json("/api/v1/auth/refresh", json!({"refresh_token": access_token}))
        .await;

    response.assert_unauthorized();
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let app = TestApp::new().await;

    let login = app
        .post_json(
            "/api/v1/auth/login",
            json!({"email": ADMIN_EMAIL, "password": ADMIN_PASSWORD}),
        )
        .await;
    let body: serde_json::Value = login.json();
    let refresh_token = body["refresh_token"].as_str().unwrap();

    app.get_auth("/api/v1/auth/me", refresh_token)
        .await
        .assert_unauthorized();
}
