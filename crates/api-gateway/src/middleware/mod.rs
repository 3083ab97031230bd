//! Middleware for the API gateway.

pub mod auth;
pub mod http_metrics;

pub use auth::{authenticate, require_authenticated, AuthFilter};
pub use http_metrics::http_metrics_middleware;
