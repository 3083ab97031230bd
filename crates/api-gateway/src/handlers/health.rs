//! Liveness endpoints.
//!
//! These answer from the gateway alone and do not probe upstreams or the
//! auth service.

use tracing::instrument;

/// Handler for GET /health
#[instrument(skip_all, name = "gw.health.check")]
pub async fn health_check() -> &'static str {
    "OK"
}

/// Handler for GET /ping
#[instrument(skip_all, name = "gw.health.ping")]
pub async fn ping() -> &'static str {
    "Successful!"
}
