//! Forwards requests to upstream services.
//!
//! The full original path and query are appended to the route's upstream
//! base URL. Identity reaches the upstream only through the `x-auth-*`
//! headers set here from the request's [`Principal`]; client-supplied copies
//! are dropped.

use crate::config::RouteRule;
use crate::errors::GatewayError;
use crate::observability::metrics::record_upstream_request;
use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{HeaderMap, HeaderName, HeaderValue},
    response::Response,
};
use common::principal::Principal;
use std::time::Duration;
use tracing::instrument;

/// Maximum request body forwarded upstream (10 MiB).
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Subject of the authenticated caller.
pub const AUTH_USER_HEADER: &str = "x-auth-user";

/// Comma-separated, sorted authorities of the authenticated caller.
pub const AUTH_AUTHORITIES_HEADER: &str = "x-auth-authorities";

const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// HTTP client for upstream services.
pub struct UpstreamClient {
    http_client: reqwest::Client,
}

impl UpstreamClient {
    /// # Errors
    ///
    /// Returns `GatewayError::Internal` if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, GatewayError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5).min(timeout))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| {
                tracing::error!(target: "gw.proxy", error = %e, "Failed to build HTTP client");
                GatewayError::Internal(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self { http_client })
    }

    /// Forward `req` to `route.upstream` and relay the response.
    #[instrument(skip_all, name = "gw.proxy.forward", fields(route = %route.prefix))]
    pub async fn forward(
        &self,
        route: &RouteRule,
        req: Request,
        principal: Option<&Principal>,
    ) -> Result<Response, GatewayError> {
        let path_and_query = req
            .uri()
            .path_and_query()
            .map_or_else(|| req.uri().path().to_string(), ToString::to_string);
        let target_url = format!("{}{}", route.upstream, path_and_query);

        let (parts, body) = req.into_parts();
        let body = to_bytes(body, MAX_BODY_BYTES).await.map_err(|e| {
            tracing::debug!(target: "gw.proxy", error = %e, "Request body rejected");
            GatewayError::PayloadTooLarge
        })?;

        let headers = upstream_headers(&parts.headers, principal);

        let result = self
            .http_client
            .request(parts.method, &target_url)
            .headers(headers)
            .body(body)
            .send()
            .await;

        let upstream_response = match result {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                tracing::warn!(target: "gw.proxy", route = %route.prefix, "Upstream timed out");
                record_upstream_request(&route.prefix, "timeout");
                return Err(GatewayError::GatewayTimeout);
            }
            Err(e) => {
                record_upstream_request(&route.prefix, "error");
                return Err(GatewayError::BadGateway(e.to_string()));
            }
        };

        let status = upstream_response.status();
        let mut response_headers = upstream_response.headers().clone();
        strip_hop_by_hop(&mut response_headers);

        let body = upstream_response.bytes().await.map_err(|e| {
            record_upstream_request(&route.prefix, "error");
            if e.is_timeout() {
                GatewayError::GatewayTimeout
            } else {
                GatewayError::BadGateway(e.to_string())
            }
        })?;

        record_upstream_request(&route.prefix, "success");
        tracing::debug!(target: "gw.proxy", status = status.as_u16(), "Upstream responded");

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        *response.headers_mut() = response_headers;

        Ok(response)
    }
}

/// Headers sent upstream: the client's, minus hop-by-hop, `host`,
/// `content-length` and any `x-auth-*`, plus identity from `principal`.
pub fn upstream_headers(incoming: &HeaderMap, principal: Option<&Principal>) -> HeaderMap {
    let mut headers = incoming.clone();
    strip_hop_by_hop(&mut headers);
    headers.remove("host");
    headers.remove("content-length");
    headers.remove(AUTH_USER_HEADER);
    headers.remove(AUTH_AUTHORITIES_HEADER);

    if let Some(principal) = principal {
        let authorities = principal
            .authorities()
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",");

        // Values that cannot be header values are left out rather than mangled.
        if let Ok(value) = HeaderValue::from_str(principal.subject()) {
            headers.insert(HeaderName::from_static(AUTH_USER_HEADER), value);
        }
        if let Ok(value) = HeaderValue::from_str(&authorities) {
            headers.insert(HeaderName::from_static(AUTH_AUTHORITIES_HEADER), value);
        }
    }

    headers
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(*name);
    }
}
