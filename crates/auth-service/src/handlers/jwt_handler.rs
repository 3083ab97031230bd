//! Remote parse endpoint.
//!
//! Gateways running in remote validation mode post the raw bearer token here
//! and receive either the principal or a 401 whose `error.code` names the
//! failure kind.

use crate::errors::AuthError;
use crate::models::{ParseRequest, ParseResponse};
use crate::routes::AppState;
use crate::observability::metrics::record_jwt_parse;
use crate::services::jwt_service;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use common::jwt::AuthFailure;
use common::secret::ExposeSecret;
use std::sync::Arc;
use tracing::instrument;

/// Handler for POST /api/v1/jwt/parse
///
/// ## Response
///
/// 200 OK:
///
/// ```json
/// { "username": "alice", "authorities": ["ROLE_ADMIN"] }
/// ```
///
/// 401 Unauthorized:
///
/// ```json
/// { "error": { "code": "EXPIRED_TOKEN", "message": "Expired JWT token" } }
/// ```
///
/// A body without a string `token` is answered like a malformed token.
#[instrument(skip_all, name = "auth.handlers.jwt_parse")]
pub async fn parse_jwt(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ParseRequest>, JsonRejection>,
) -> Result<Json<ParseResponse>, AuthError> {
    let Json(payload) = payload.map_err(|e| {
        tracing::debug!(target: "auth.handlers.jwt", error = %e, "Unreadable parse request");
        record_jwt_parse("error", Some(AuthFailure::Malformed.as_label()));
        AuthError::InvalidToken(AuthFailure::Malformed)
    })?;

    let parsed = jwt_service::parse_token(
        &state.validator,
        payload.token.expose_secret(),
        Utc::now(),
    )?;

    Ok(Json(parsed))
}
