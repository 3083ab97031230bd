//! Client for the auth service's remote parse endpoint.
//!
//! `POST {AUTH_PARSE_URL}` with `{"token": "..."}`. A 200 carries the
//! principal; a 401 carries `{"error": {"code": ...}}` which is mapped back
//! to a failure kind. Anything else, including timeouts, connection errors
//! and unreadable bodies, is a transport failure. No retries.

use crate::errors::GatewayError;
use crate::observability::metrics::record_remote_parse;
use common::jwt::AuthFailure;
use common::principal::Principal;
use common::secret::{ExposeSecret, SecretString};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::time::{Duration, Instant};
use tracing::instrument;

#[derive(Debug, Deserialize)]
struct ParseResponse {
    username: String,
    #[serde(default)]
    authorities: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: String,
}

/// HTTP client bound to one parse endpoint.
pub struct RemoteParseClient {
    parse_url: String,
    http_client: reqwest::Client,
}

impl RemoteParseClient {
    /// Create a client whose whole round-trip is bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Internal` if the HTTP client cannot be built.
    pub fn new(parse_url: String, timeout: Duration) -> Result<Self, GatewayError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| {
                tracing::error!(target: "gw.auth.remote", error = %e, "Failed to build HTTP client");
                GatewayError::Internal(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            parse_url,
            http_client,
        })
    }

    pub fn parse_url(&self) -> &str {
        &self.parse_url
    }

    /// Ask the auth service to parse `token`.
    #[instrument(skip_all, name = "gw.auth.remote_parse")]
    pub async fn parse(&self, token: &SecretString) -> Result<Principal, AuthFailure> {
        let start = Instant::now();
        let result = self.call(token).await;

        record_remote_parse(
            match &result {
                Ok(_) => "success",
                Err(failure) => failure.as_label(),
            },
            start.elapsed(),
        );

        result
    }

    async fn call(&self, token: &SecretString) -> Result<Principal, AuthFailure> {
        let response = self
            .http_client
            .post(&self.parse_url)
            .json(&json!({ "token": token.expose_secret() }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    tracing::warn!(target: "gw.auth.remote", "Remote parse timed out");
                } else {
                    tracing::warn!(target: "gw.auth.remote", error = %e, "Remote parse request failed");
                }
                AuthFailure::TransportFailure
            })?;

        match response.status() {
            StatusCode::OK => {
                let body: ParseResponse = response.json().await.map_err(|e| {
                    tracing::warn!(target: "gw.auth.remote", error = %e, "Unreadable parse response");
                    AuthFailure::TransportFailure
                })?;

                Ok(Principal::new(body.username, body.authorities))
            }
            StatusCode::UNAUTHORIZED => {
                let failure = response
                    .json::<ErrorBody>()
                    .await
                    .ok()
                    .and_then(|body| AuthFailure::from_code(&body.error.code))
                    .unwrap_or(AuthFailure::TransportFailure);

                tracing::debug!(
                    target: "gw.auth.remote",
                    failure = failure.as_label(),
                    "Token rejected by auth service"
                );
                Err(failure)
            }
            status => {
                tracing::warn!(
                    target: "gw.auth.remote",
                    status = status.as_u16(),
                    "Unexpected status from parse endpoint"
                );
                Err(AuthFailure::TransportFailure)
            }
        }
    }
}
