//! Test server harness for E2E testing
//!
//! Provides `TestAuthServer` for spawning real auth service instances in tests.

use crate::crypto_fixtures::test_signing_key;
use auth_service::config::{Config, MIN_BCRYPT_COST};
use auth_service::crypto;
use auth_service::models::TokenResponse;
use auth_service::repositories::{InMemoryUserRepository, User, UserRepository};
use auth_service::routes::{self, AppState};
use common::config::JwtSettings;
use common::jwt::SigningKey;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Test harness for spawning the auth service in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_login_e2e() -> Result<()> {
///     let server = TestAuthServer::spawn().await?;
///     server.create_user("alice", "password123", &["ROLE_ADMIN"]).await?;
///
///     let token = server.login("alice", "password123").await?;
///     Ok(())
/// }
/// ```
pub struct TestAuthServer {
    addr: SocketAddr,
    state: Arc<AppState>,
    handle: JoinHandle<()>,
}

impl TestAuthServer {
    /// Spawn a server signing with [`test_signing_key`]`(1)` and a one hour TTL.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with_key(test_signing_key(1), Duration::from_secs(3600)).await
    }

    /// Spawn a server with an explicit signing key and token TTL.
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Use the minimum bcrypt cost to keep tests fast
    /// - Start the HTTP server in the background
    pub async fn spawn_with_key(
        signing_key: Arc<SigningKey>,
        ttl: Duration,
    ) -> Result<Self, anyhow::Error> {
        let config = Config {
            bind_address: "127.0.0.1:0".to_string(),
            jwt: JwtSettings { signing_key, ttl },
            bcrypt_cost: MIN_BCRYPT_COST,
            admin: None,
            drain_period: Duration::ZERO,
        };

        let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
        let state = Arc::new(
            AppState::new(config, users)
                .map_err(|e| anyhow::anyhow!("Failed to build app state: {}", e))?,
        );

        // The global recorder can only be installed once per process; later
        // servers get a standalone recorder.
        let metrics_handle = match routes::init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => PrometheusBuilder::new().build_recorder().handle(),
        };

        let app = routes::build_routes(Arc::clone(&state), metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Full URL of the remote parse endpoint
    pub fn parse_url(&self) -> String {
        format!("{}/api/v1/jwt/parse", self.url())
    }

    /// Get the socket address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Shared application state (user store, issuer, validator)
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Insert a user directly into the store with arbitrary authorities.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        authorities: &[&str],
    ) -> Result<(), anyhow::Error> {
        let hash = crypto::hash_password(password, MIN_BCRYPT_COST)?;
        let authorities = authorities.iter().map(|a| a.to_string()).collect();
        self.state
            .users
            .insert(User::new(username, hash, authorities))
            .await?;
        Ok(())
    }

    /// Log in over HTTP and return the access token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, anyhow::Error> {
        let response = reqwest::Client::new()
            .post(format!("{}/api/v1/auth/login", self.url()))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Login failed with status {}", response.status());
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }
}

impl Drop for TestAuthServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
