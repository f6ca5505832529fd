//! Integration tests for authentication endpoints

mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_success() {
    let app = common::TestApp::new().await;

    let body = json!({
        "email": common::unique_email(),
        "password": "SecurePassword123!",
        "display_name": "Ana"
    });
    let (status, response) = app.request("POST", "/api/v1/auth/register", None, Some(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(!response["access_token"].as_str().unwrap().is_empty());
    assert!(!response["refresh_token"].as_str().unwrap().is_empty());
    assert_eq!(response["token_type"], "Bearer");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_duplicate_email_ignores_case() {
    let app = common::TestApp::new().await;

    let email = common::unique_email();
    let body = json!({"email": email, "password": "SecurePassword123!"});
    let (status, _) = app.request("POST", "/api/v1/auth/register", None, Some(body)).await;
    assert_eq!(status, StatusCode::OK);

    let body = json!({"email": email.to_uppercase(), "password": "SecurePassword123!"});
    let (status, _) = app.request("POST", "/api/v1/auth/register", None, Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_rejects_bad_input() {
    let app = common::TestApp::new().await;

    let body = json!({"email": "not-an-email", "password": "SecurePassword123!"});
    let (status, _) = app.request("POST", "/api/v1/auth/register", None, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let body = json!({"email": common::unique_email(), "password": "123"});
    let (status, _) = app.request("POST", "/api/v1/auth/register", None, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_refresh_and_me() {
    let app = common::TestApp::new().await;

    let email = common::unique_email();
    let credentials = json!({"email": email, "password": "SecurePassword123!"});
    app.request("POST", "/api/v1/auth/register", None, Some(credentials.clone())).await;

    let (status, tokens) = app.request("POST", "/api/v1/auth/login", None, Some(credentials)).await;
    assert_eq!(status, StatusCode::OK);

    let refresh = tokens["refresh_token"].as_str().unwrap();
    let (status, refreshed) = app
        .request("POST", "/api/v1/auth/refresh", None, Some(json!({"refresh_token": refresh})))
        .await;
    assert_eq!(status, StatusCode::OK);

    let access = refreshed["access_token"].as_str().unwrap();
    let (status, me) = app.get("/api/v1/auth/me", access).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], email.as_str());
    assert_eq!(me["telegram_linked"], false);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_wrong_password() {
    let app = common::TestApp::new().await;

    let email = common::unique_email();
    app.request(
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({"email": email, "password": "SecurePassword123!"})),
    )
    .await;

    let (status, _) = app
        .request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({"email": email, "password": "WrongPassword123!"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_access_token_is_not_a_refresh_token() {
    let app = common::TestApp::new().await;
    let access = app.register_user().await;

    let (status, _) = app
        .request("POST", "/api/v1/auth/refresh", None, Some(json!({"refresh_token": access})))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
