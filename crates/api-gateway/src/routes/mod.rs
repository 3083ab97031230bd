//! HTTP routes for the API gateway.
//!
//! Defines the Axum router and application state.

use crate::auth::TokenVerifier;
use crate::config::Config;
use crate::errors::GatewayError;
use crate::handlers;
use crate::middleware::{authenticate, http_metrics_middleware, require_authenticated, AuthFilter};
use crate::services::UpstreamClient;
use axum::{middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

pub use crate::observability::metrics::init_metrics_recorder;

/// Lower bound for the whole-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state shared across all handlers.
pub struct AppState {
    /// Gateway configuration.
    pub config: Config,

    /// Inbound auth filter.
    pub auth: Arc<AuthFilter>,

    /// Client for proxied requests.
    pub upstream: UpstreamClient,
}

impl AppState {
    /// Build state from configuration.
    ///
    /// # Errors
    ///
    /// Fails if the token verifier or an HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self, GatewayError> {
        let auth = Arc::new(AuthFilter::new(TokenVerifier::from_config(&config)?));
        let upstream = UpstreamClient::new(config.upstream_timeout)?;

        Ok(Self {
            config,
            auth,
            upstream,
        })
    }
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/health`, `/ping` - Liveness probes - public
/// - `/metrics` - Prometheus metrics endpoint - public
/// - `/api/v1/me` - Current principal - requires authentication
/// - Fallback proxy over the configured route table
/// - Inbound auth filter on every request
/// - TraceLayer, request timeout and HTTP metrics
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ping", get(handlers::ping));

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // route_layer only wraps matched routes, so unknown paths still reach
    // the proxy fallback instead of answering 401.
    let protected_routes = Router::new()
        .route("/api/v1/me", get(handlers::get_me))
        .route_layer(middleware::from_fn(require_authenticated));

    let request_timeout = REQUEST_TIMEOUT.max(state.config.upstream_timeout + Duration::from_secs(1));

    let proxy_routes = Router::new()
        .fallback(handlers::proxy)
        .with_state(Arc::clone(&state));

    // Layer order (bottom-to-top execution):
    // 1. authenticate - Attach a Principal or nothing (innermost)
    // 2. TimeoutLayer - Timeout the request
    // 3. TraceLayer - Log request details
    // 4. http_metrics_middleware - Record ALL responses (outermost)
    public_routes
        .merge(metrics_routes)
        .merge(protected_routes)
        .merge(proxy_routes)
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state.auth),
            authenticate,
        ))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(http_metrics_middleware))
}
