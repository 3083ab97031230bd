//! Liveness endpoints.

use tracing::instrument;

/// Handler for GET /health
#[instrument(skip_all, name = "auth.health.check")]
pub async fn health_check() -> &'static str {
    "OK"
}

/// Handler for GET /ping
///
/// Kept for clients that probe reachability with `/ping`.
#[instrument(skip_all, name = "auth.health.ping")]
pub async fn ping() -> &'static str {
    "Successful!"
}
