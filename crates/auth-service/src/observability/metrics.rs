//! Metrics definitions for the auth service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `auth_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `outcome`: success, error (plus `conflict`/`rejected` for registration)
//! - `failure`: none or one of the five auth failure labels
//! - `endpoint`: the fixed route set, everything else is `/other`

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize Prometheus metrics recorder and return the handle
/// for serving metrics via HTTP.
///
/// # Errors
///
/// Returns error if Prometheus recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("auth_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.150, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        // bcrypt dominates issuance latency
        .set_buckets_for_metric(
            Matcher::Prefix("auth_token_issuance".to_string()),
            &[0.050, 0.100, 0.200, 0.350, 0.500, 1.000, 2.000],
        )
        .map_err(|e| format!("Failed to set token issuance buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `auth_http_requests_total`, `auth_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status_code` / `status`
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("auth_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status" => status
    )
    .record(duration.as_secs_f64());

    counter!("auth_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

fn normalize_endpoint(path: &str) -> &'static str {
    match path {
        "/health" => "/health",
        "/ping" => "/ping",
        "/metrics" => "/metrics",
        "/api/v1/auth/login" => "/api/v1/auth/login",
        "/api/v1/auth/register" => "/api/v1/auth/register",
        "/api/v1/jwt/parse" => "/api/v1/jwt/parse",
        _ => "/other",
    }
}

// ============================================================================
// Token Metrics
// ============================================================================

/// Record a login attempt
///
/// Metric: `auth_token_issuance_total`, `auth_token_issuance_duration_seconds`
/// Labels: `outcome`
pub fn record_token_issuance(outcome: &'static str, duration: Duration) {
    histogram!("auth_token_issuance_duration_seconds", "outcome" => outcome)
        .record(duration.as_secs_f64());

    counter!("auth_token_issuance_total", "outcome" => outcome).increment(1);
}

/// Record a remote parse call
///
/// Metric: `auth_jwt_parse_total`
/// Labels: `outcome`, `failure`
pub fn record_jwt_parse(outcome: &'static str, failure: Option<&'static str>) {
    counter!("auth_jwt_parse_total",
        "outcome" => outcome,
        "failure" => failure.unwrap_or("none")
    )
    .increment(1);
}

/// Record a registration attempt
///
/// Metric: `auth_registrations_total`
/// Labels: `outcome`
pub fn record_registration(outcome: &'static str) {
    counter!("auth_registrations_total", "outcome" => outcome).increment(1);
}
