//! Remote validation mode against a mocked parse endpoint.

use crate::harness::TestGateway;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PARSE_PATH: &str = "/api/v1/jwt/parse";

async fn remote_gateway(
    auth: &MockServer,
    timeout_ms: &str,
    routes: &str,
) -> Result<TestGateway, anyhow::Error> {
    let parse_url = format!("{}{}", auth.uri(), PARSE_PATH);
    TestGateway::spawn(&[
        ("AUTH_VALIDATION_MODE", "remote"),
        ("AUTH_PARSE_URL", &parse_url),
        ("AUTH_PARSE_TIMEOUT_MS", timeout_ms),
        ("GATEWAY_ROUTES", routes),
    ])
    .await
}

fn accept(token: &str, username: &str, authorities: &[&str]) -> Mock {
    Mock::given(method("POST"))
        .and(path(PARSE_PATH))
        .and(body_json(json!({ "token": token })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "username": username,
            "authorities": authorities,
        })))
}

fn reject(code: &str) -> Mock {
    Mock::given(method("POST"))
        .and(path(PARSE_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "code": code, "message": "rejected" }
        })))
}

#[tokio::test]
async fn test_remote_valid_token_authenticates() -> Result<(), anyhow::Error> {
    let auth = MockServer::start().await;
    accept("token-alice", "alice", &["ROLE_ADMIN"])
        .expect(1)
        .mount(&auth)
        .await;
    let gateway = remote_gateway(&auth, "2000", "").await?;

    let response = gateway.get("/api/v1/me", Some("token-alice")).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["authorities"], json!(["ROLE_ADMIN"]));

    Ok(())
}

#[tokio::test]
async fn test_no_header_never_calls_parse_endpoint() -> Result<(), anyhow::Error> {
    let auth = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&auth)
        .await;
    let gateway = remote_gateway(&auth, "2000", "").await?;

    let response = gateway.get("/api/v1/me", None).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = reqwest::Client::new()
        .get(format!("{}/api/v1/me", gateway.url()))
        .header("authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_rejected_tokens_get_generic_unauthorized() -> Result<(), anyhow::Error> {
    for code in [
        "MALFORMED_TOKEN",
        "BAD_SIGNATURE",
        "EXPIRED_TOKEN",
        "UNSUPPORTED_TOKEN",
    ] {
        let auth = MockServer::start().await;
        reject(code).expect(1).mount(&auth).await;
        let gateway = remote_gateway(&auth, "2000", "").await?;

        let response = gateway.get("/api/v1/me", Some("garbage")).await?;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{code}");
        let body: Value = response.json().await?;
        assert_eq!(body["error"]["code"], "UNAUTHORIZED", "{code}");
    }

    Ok(())
}

#[tokio::test]
async fn test_parse_timeout_leaves_request_unauthenticated() -> Result<(), anyhow::Error> {
    let auth = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"username": "alice", "authorities": ["ROLE_ADMIN"]}))
                .set_delay(Duration::from_millis(1000)),
        )
        .mount(&auth)
        .await;
    let gateway = remote_gateway(&auth, "100", "").await?;

    let response = gateway.get("/api/v1/me", Some("token-alice")).await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_auth_service_down_still_serves_public_routes() -> Result<(), anyhow::Error> {
    let auth = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&auth)
        .await;
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/catalog"))
        .respond_with(ResponseTemplate::new(200).set_body_string("catalog"))
        .expect(1)
        .mount(&upstream)
        .await;
    let routes = format!(
        "/api/v1/catalog={}=public;/api/v1/orders={}",
        upstream.uri(),
        upstream.uri()
    );
    let gateway = remote_gateway(&auth, "2000", &routes).await?;

    let public = gateway.get("/api/v1/catalog", Some("token-alice")).await?;
    assert_eq!(public.status(), StatusCode::OK);
    assert_eq!(public.text().await?, "catalog");

    let protected = gateway.get("/api/v1/orders", Some("token-alice")).await?;
    assert_eq!(protected.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_concurrent_requests_keep_their_own_principal() -> Result<(), anyhow::Error> {
    let auth = MockServer::start().await;
    accept("token-alice", "alice", &["ROLE_ADMIN"]).mount(&auth).await;
    accept("token-bob", "bob", &["ROLE_USER"]).mount(&auth).await;
    reject("MALFORMED_TOKEN").mount(&auth).await;
    let gateway = remote_gateway(&auth, "2000", "").await?;

    let mut tasks = Vec::new();
    for i in 0..20 {
        let url = format!("{}/api/v1/me", gateway.url());
        tasks.push(tokio::spawn(async move {
            let token = match i % 3 {
                0 => "token-alice",
                1 => "token-bob",
                _ => "garbage",
            };
            let response = reqwest::Client::new()
                .get(url)
                .bearer_auth(token)
                .send()
                .await?;
            let status = response.status();
            let body: Value = response.json().await?;
            Ok::<_, anyhow::Error>((token, status, body))
        }));
    }

    for task in tasks {
        let (token, status, body) = task.await??;
        match token {
            "token-alice" => {
                assert_eq!(status, StatusCode::OK);
                assert_eq!(body["username"], "alice");
            }
            "token-bob" => {
                assert_eq!(status, StatusCode::OK);
                assert_eq!(body["username"], "bob");
            }
            _ => assert_eq!(status, StatusCode::UNAUTHORIZED),
        }
    }

    Ok(())
}
