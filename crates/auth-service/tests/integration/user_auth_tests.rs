//! Registration and login over HTTP.

use auth_test_utils::TestAuthServer;
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn post(
    server: &TestAuthServer,
    path: &str,
    body: Value,
) -> Result<reqwest::Response, anyhow::Error> {
    Ok(reqwest::Client::new()
        .post(format!("{}{}", server.url(), path))
        .json(&body)
        .send()
        .await?)
}

#[tokio::test]
async fn test_register_then_login() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let credentials = json!({"username": "carol", "password": "carol-password"});

    let response = post(&server, "/api/v1/auth/register", credentials.clone()).await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await?;
    assert_eq!(body["username"], "carol");
    assert_eq!(body["authorities"], json!(["ROLE_USER"]));
    assert!(body["id"].as_str().is_some());
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());

    let response = post(&server, "/api/v1/auth/login", credentials).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 3600);
    assert_eq!(
        body["access_token"].as_str().map(|t| t.split('.').count()),
        Some(3)
    );

    Ok(())
}

#[tokio::test]
async fn test_register_duplicate_is_conflict() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server.create_user("dave", "dave-password", &["ROLE_USER"]).await?;

    let response = post(
        &server,
        "/api/v1/auth/register",
        json!({"username": "dave", "password": "another-password"}),
    )
    .await?;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "USERNAME_TAKEN");

    Ok(())
}

#[tokio::test]
async fn test_register_rejects_short_password() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = post(
        &server,
        "/api/v1/auth/register",
        json!({"username": "erin", "password": "short"}),
    )
    .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    Ok(())
}

#[tokio::test]
async fn test_login_wrong_password_and_unknown_user_look_the_same() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server.create_user("frank", "frank-password", &["ROLE_USER"]).await?;

    let wrong_password = post(
        &server,
        "/api/v1/auth/login",
        json!({"username": "frank", "password": "not-franks"}),
    )
    .await?;
    let unknown_user = post(
        &server,
        "/api/v1/auth/login",
        json!({"username": "nobody", "password": "whatever-pass"}),
    )
    .await?;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);

    let a: Value = wrong_password.json().await?;
    let b: Value = unknown_user.json().await?;
    assert_eq!(a, b);
    assert_eq!(a["error"]["code"], "INVALID_CREDENTIALS");

    Ok(())
}

#[tokio::test]
async fn test_admin_login_carries_admin_authority() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server
        .create_user("alice", "alice-password", &["ROLE_ADMIN", "ROLE_USER"])
        .await?;

    let token = server.login("alice", "alice-password").await?;
    let principal = server.state().validator.validate(&token, chrono::Utc::now())?;

    assert_eq!(principal.subject(), "alice");
    assert!(principal.has_authority("ROLE_ADMIN"));

    Ok(())
}
