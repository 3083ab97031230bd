//! Gateway in front of a real auth service, in both validation modes.

use crate::harness::TestGateway;
use auth_test_utils::{test_jwt_secret, test_signing_key, TestAuthServer, TestTokenBuilder};
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn gateway_for(server: &TestAuthServer, mode: &str) -> Result<TestGateway, anyhow::Error> {
    let secret = test_jwt_secret(1);
    let parse_url = server.parse_url();
    let routes = format!("/api/v1/auth={}=public", server.url());
    TestGateway::spawn(&[
        ("AUTH_VALIDATION_MODE", mode),
        ("JWT_SECRET", &secret),
        ("AUTH_PARSE_URL", &parse_url),
        ("GATEWAY_ROUTES", &routes),
    ])
    .await
}

async fn login_through_gateway(
    gateway: &TestGateway,
    username: &str,
    password: &str,
) -> Result<String, anyhow::Error> {
    let response = reqwest::Client::new()
        .post(format!("{}/api/v1/auth/login", gateway.url()))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await?;
    body["access_token"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("login response has no access_token"))
}

#[tokio::test]
async fn test_login_then_me_in_both_modes() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server
        .create_user("alice", "alice-password", &["ROLE_ADMIN"])
        .await?;

    for mode in ["local", "remote"] {
        let gateway = gateway_for(&server, mode).await?;
        let token = login_through_gateway(&gateway, "alice", "alice-password").await?;

        let response = gateway.get("/api/v1/me", Some(&token)).await?;

        assert_eq!(response.status(), StatusCode::OK, "{mode}");
        let body: Value = response.json().await?;
        assert_eq!(body["username"], "alice", "{mode}");
        assert_eq!(body["authorities"], json!(["ROLE_ADMIN"]), "{mode}");
    }

    Ok(())
}

#[tokio::test]
async fn test_invalid_tokens_rejected_in_both_modes() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let expired = TestTokenBuilder::new()
        .for_user("alice")
        .expired_seconds_ago(30)
        .sign(&test_signing_key(1));
    let foreign = TestTokenBuilder::new()
        .for_user("alice")
        .sign(&test_signing_key(9));

    for mode in ["local", "remote"] {
        let gateway = gateway_for(&server, mode).await?;

        for token in [expired.as_str(), foreign.as_str(), "garbage"] {
            let response = gateway.get("/api/v1/me", Some(token)).await?;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{mode}");
        }
    }

    Ok(())
}

#[tokio::test]
async fn test_register_through_public_route() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let gateway = gateway_for(&server, "remote").await?;

    let response = reqwest::Client::new()
        .post(format!("{}/api/v1/auth/register", gateway.url()))
        .json(&json!({ "username": "hank", "password": "hank-password" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let token = login_through_gateway(&gateway, "hank", "hank-password").await?;
    let response = gateway.get("/api/v1/me", Some(&token)).await?;
    let body: Value = response.json().await?;
    assert_eq!(body["authorities"], json!(["ROLE_USER"]));

    Ok(())
}
