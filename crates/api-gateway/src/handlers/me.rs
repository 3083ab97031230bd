//! Current principal handler.

use axum::{Extension, Json};
use common::principal::Principal;
use serde::Serialize;
use tracing::instrument;

/// Response for `/api/v1/me`.
#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    pub username: String,

    /// Sorted.
    pub authorities: Vec<String>,
}

/// Handler for GET /api/v1/me
///
/// Sits behind `require_authenticated`, so the principal is always present.
///
/// ```json
/// { "username": "alice", "authorities": ["ROLE_ADMIN", "ROLE_USER"] }
/// ```
#[instrument(skip_all, name = "gw.handlers.me")]
pub async fn get_me(Extension(principal): Extension<Principal>) -> Json<MeResponse> {
    Json(MeResponse {
        username: principal.subject().to_string(),
        authorities: principal.authorities().iter().cloned().collect(),
    })
}
