//! HTTP routes for the auth service.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::crypto;
use crate::errors::AuthError;
use crate::handlers;
use crate::middleware::http_metrics_middleware;
use crate::repositories::UserRepository;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use common::token::{TokenIssuer, TokenValidator};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

pub use crate::observability::metrics::init_metrics_recorder;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// User store.
    pub users: Arc<dyn UserRepository>,

    /// Issues tokens on login.
    pub issuer: TokenIssuer,

    /// Validates tokens for remote parse calls.
    pub validator: TokenValidator,

    /// bcrypt hash checked when a login names an unknown user.
    pub dummy_password_hash: Arc<str>,
}

impl AppState {
    /// Build state from configuration. Computes the dummy hash at the
    /// configured cost, so this blocks for one bcrypt round.
    pub fn new(config: Config, users: Arc<dyn UserRepository>) -> Result<Self, AuthError> {
        let issuer = TokenIssuer::new(Arc::clone(&config.jwt.signing_key), config.jwt.ttl);
        let validator = TokenValidator::new(Arc::clone(&config.jwt.signing_key));
        let dummy_password_hash = crypto::dummy_password_hash(config.bcrypt_cost)?.into();

        Ok(Self {
            config,
            users,
            issuer,
            validator,
            dummy_password_hash,
        })
    }
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/health`, `/ping` - Liveness probes - public
/// - `/metrics` - Prometheus metrics endpoint - public
/// - `/api/v1/auth/register` - User registration
/// - `/api/v1/auth/login` - Password login, returns a bearer token
/// - `/api/v1/jwt/parse` - Remote token parsing for gateways
/// - TraceLayer for request logging
/// - HTTP metrics middleware
/// - 30 second request timeout
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ping", get(handlers::ping))
        .route("/api/v1/auth/register", post(handlers::handle_register))
        .route("/api/v1/auth/login", post(handlers::handle_login))
        .route("/api/v1/jwt/parse", post(handlers::parse_jwt))
        .with_state(state);

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // Layer order (bottom-to-top execution):
    // 1. TraceLayer - Request spans (innermost)
    // 2. TimeoutLayer - 408 after 30 seconds
    // 3. http_metrics_middleware - Record ALL responses (outermost)
    api_routes
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(middleware::from_fn(http_metrics_middleware))
}
