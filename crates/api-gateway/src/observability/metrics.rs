//! Metrics definitions for the API gateway.
//!
//! All metrics follow Prometheus naming conventions:
//! - `gw_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! - `mode`: local, remote
//! - `outcome`: anonymous, authenticated, or an auth failure label
//! - `endpoint`: fixed gateway routes, configured route prefixes collapse to `/proxy`
//! - `route`: the configured prefix (bounded by `GATEWAY_ROUTES`)

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
            Matcher::Prefix("gw_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.150, 0.200, 0.300, 0.500, 1.000, 2.000,
                5.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Full("gw_remote_parse_duration_seconds".to_string()),
            &[0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.000],
        )
        .map_err(|e| format!("Failed to set remote parse buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `gw_http_requests_total`, `gw_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status_code` / `status`
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("gw_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status" => status
    )
    .record(duration.as_secs_f64());

    counter!("gw_http_requests_total",
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
        "/api/v1/me" => "/api/v1/me",
        _ => "/proxy",
    }
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Record one pass through the auth filter
///
/// Metric: `gw_auth_filter_total`
/// Labels: `mode`, `outcome`
pub fn record_auth_filter(mode: &'static str, outcome: &'static str) {
    counter!("gw_auth_filter_total", "mode" => mode, "outcome" => outcome).increment(1);
}

/// Record a remote parse round-trip
///
/// Metric: `gw_remote_parse_duration_seconds`
/// Labels: `outcome`
pub fn record_remote_parse(outcome: &'static str, duration: Duration) {
    histogram!("gw_remote_parse_duration_seconds", "outcome" => outcome)
        .record(duration.as_secs_f64());
}

// ============================================================================
// Upstream Metrics
// ============================================================================

/// Record a proxied request
///
/// Metric: `gw_upstream_requests_total`
/// Labels: `route`, `outcome`
pub fn record_upstream_request(route: &str, outcome: &'static str) {
    counter!("gw_upstream_requests_total",
        "route" => route.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
