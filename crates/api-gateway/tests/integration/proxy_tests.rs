//! Proxying in local validation mode.

use crate::harness::TestGateway;
use auth_test_utils::{test_jwt_secret, test_signing_key, TestTokenBuilder};
use reqwest::StatusCode;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

async fn local_gateway(routes: &str) -> Result<TestGateway, anyhow::Error> {
    let secret = test_jwt_secret(1);
    TestGateway::spawn(&[
        ("AUTH_VALIDATION_MODE", "local"),
        ("JWT_SECRET", &secret),
        ("GATEWAY_ROUTES", routes),
        ("UPSTREAM_TIMEOUT_SECONDS", "2"),
    ])
    .await
}

fn token_for(subject: &str, authorities: &[&str]) -> String {
    authorities
        .iter()
        .fold(TestTokenBuilder::new().for_user(subject), |builder, a| {
            builder.with_authority(a)
        })
        .sign(&test_signing_key(1))
}

#[tokio::test]
async fn test_forwards_identity_headers() -> Result<(), anyhow::Error> {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/orders/42"))
        .and(header("x-auth-user", "alice"))
        .respond_with(|req: &Request| {
            // Raw value: the header matcher splits on commas.
            let authorities = req
                .headers
                .get("x-auth-authorities")
                .and_then(|v| v.to_str().ok());
            if authorities == Some("ROLE_ADMIN,ROLE_USER") {
                ResponseTemplate::new(200).set_body_string("order 42")
            } else {
                ResponseTemplate::new(418)
            }
        })
        .expect(1)
        .mount(&upstream)
        .await;
    let gateway = local_gateway(&format!("/api/v1/orders={}", upstream.uri())).await?;

    let token = token_for("alice", &["ROLE_USER", "ROLE_ADMIN"]);
    let response = gateway.get("/api/v1/orders/42", Some(&token)).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await?, "order 42");

    Ok(())
}

#[tokio::test]
async fn test_forged_identity_headers_are_stripped() -> Result<(), anyhow::Error> {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(|req: &Request| {
            let forged = req.headers.contains_key("x-auth-user")
                || req.headers.contains_key("x-auth-authorities");
            ResponseTemplate::new(if forged { 418 } else { 200 })
        })
        .expect(2)
        .mount(&upstream)
        .await;
    let gateway = local_gateway(&format!("/api/v1/catalog={}=public", upstream.uri())).await?;

    for bearer in [None, Some("garbage")] {
        let mut request = reqwest::Client::new()
            .get(format!("{}/api/v1/catalog", gateway.url()))
            .header("x-auth-user", "mallory")
            .header("x-auth-authorities", "ROLE_ADMIN");
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        assert_eq!(response.status(), StatusCode::OK);
    }

    Ok(())
}

#[tokio::test]
async fn test_authority_restricted_route() -> Result<(), anyhow::Error> {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/admin/users"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&upstream)
        .await;
    let gateway =
        local_gateway(&format!("/api/v1/admin={}=ROLE_ADMIN", upstream.uri())).await?;

    let anonymous = gateway.get("/api/v1/admin/users", None).await?;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let user = token_for("bob", &["ROLE_USER"]);
    let forbidden = gateway.get("/api/v1/admin/users", Some(&user)).await?;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let admin = token_for("alice", &["ROLE_ADMIN"]);
    let allowed = gateway.get("/api/v1/admin/users", Some(&admin)).await?;
    assert_eq!(allowed.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_expired_and_foreign_tokens_are_anonymous() -> Result<(), anyhow::Error> {
    let upstream = MockServer::start().await;
    let gateway = local_gateway(&format!("/api/v1/orders={}", upstream.uri())).await?;

    let expired = TestTokenBuilder::new()
        .for_user("alice")
        .expired_seconds_ago(5)
        .sign(&test_signing_key(1));
    let foreign = TestTokenBuilder::new()
        .for_user("alice")
        .sign(&test_signing_key(2));
    let unsigned = TestTokenBuilder::new().for_user("alice").unsigned();

    for token in [expired, foreign, unsigned] {
        let response = gateway.get("/api/v1/orders", Some(&token)).await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    Ok(())
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() -> Result<(), anyhow::Error> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let upstream = format!("http://{}", listener.local_addr()?);
    drop(listener);
    let gateway = local_gateway(&format!("/api/v1/orders={upstream}=public")).await?;

    let response = gateway.get("/api/v1/orders", None).await?;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    Ok(())
}

#[tokio::test]
async fn test_unknown_path_is_not_found() -> Result<(), anyhow::Error> {
    let gateway = local_gateway("").await?;

    let response = gateway.get("/api/v1/nowhere", None).await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}
