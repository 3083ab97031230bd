//! Remote parse endpoint tests.
//!
//! The gateway maps `error.code` back to a failure kind, so the codes are
//! asserted exactly.

use auth_test_utils::{
    tamper_payload, test_key_bytes, test_signing_key, TestAuthServer, TestTokenBuilder,
};
use jsonwebtoken::Algorithm;
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn parse(server: &TestAuthServer, token: &str) -> Result<(StatusCode, Value), anyhow::Error> {
    let response = reqwest::Client::new()
        .post(server.parse_url())
        .json(&json!({ "token": token }))
        .send()
        .await?;
    let status = response.status();
    Ok((status, response.json().await?))
}

async fn assert_rejected(
    server: &TestAuthServer,
    token: &str,
    code: &str,
) -> Result<(), anyhow::Error> {
    let (status, body) = parse(server, token).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "token should be rejected");
    assert_eq!(body["error"]["code"], code);
    assert!(body["error"]["message"].as_str().is_some());
    Ok(())
}

#[tokio::test]
async fn test_parse_valid_token() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let token = TestTokenBuilder::new()
        .for_user("alice")
        .with_authority("ROLE_USER")
        .with_authority("ROLE_ADMIN")
        .sign(&test_signing_key(1));

    let (status, body) = parse(&server, &token).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["authorities"], json!(["ROLE_ADMIN", "ROLE_USER"]));

    Ok(())
}

#[tokio::test]
async fn test_parse_token_from_login() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server.create_user("gina", "gina-password", &["ROLE_USER"]).await?;
    let token = server.login("gina", "gina-password").await?;

    let (status, body) = parse(&server, &token).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "gina");

    Ok(())
}

#[tokio::test]
async fn test_parse_expired_token() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let token = TestTokenBuilder::new()
        .expired_seconds_ago(60)
        .sign(&test_signing_key(1));

    assert_rejected(&server, &token, "EXPIRED_TOKEN").await
}

#[tokio::test]
async fn test_parse_foreign_key_token() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let token = TestTokenBuilder::new().sign(&test_signing_key(2));

    assert_rejected(&server, &token, "BAD_SIGNATURE").await
}

#[tokio::test]
async fn test_parse_expired_foreign_key_token_reports_signature() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let token = TestTokenBuilder::new()
        .expired_seconds_ago(60)
        .sign(&test_signing_key(2));

    assert_rejected(&server, &token, "BAD_SIGNATURE").await
}

#[tokio::test]
async fn test_parse_other_hmac_algorithm() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let token = TestTokenBuilder::new().sign_raw(&test_key_bytes(1, 32), Algorithm::HS512);

    assert_rejected(&server, &token, "BAD_SIGNATURE").await
}

#[tokio::test]
async fn test_parse_unsigned_token() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let token = TestTokenBuilder::new().unsigned();

    assert_rejected(&server, &token, "UNSUPPORTED_TOKEN").await
}

#[tokio::test]
async fn test_parse_tampered_token() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let token = TestTokenBuilder::new()
        .for_user("bob")
        .with_authority("ROLE_USER")
        .sign(&test_signing_key(1));
    let forged = tamper_payload(&token, |claims| {
        claims["authorities"] = json!(["ROLE_ADMIN"]);
    });

    assert_rejected(&server, &forged, "BAD_SIGNATURE").await
}

#[tokio::test]
async fn test_parse_inverted_validity_window() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let now = chrono::Utc::now().timestamp();
    let token = TestTokenBuilder::new()
        .issued_at(now + 600)
        .expires_at(now + 300)
        .sign_raw(&test_key_bytes(1, 32), Algorithm::HS256);

    assert_rejected(&server, &token, "MALFORMED_TOKEN").await
}

#[tokio::test]
async fn test_parse_garbage() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    assert_rejected(&server, "garbage", "MALFORMED_TOKEN").await?;
    assert_rejected(&server, "", "MALFORMED_TOKEN").await
}

#[tokio::test]
async fn test_parse_missing_token_field() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = reqwest::Client::new()
        .post(server.parse_url())
        .json(&json!({ "jwt": "abc" }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    Ok(())
}
