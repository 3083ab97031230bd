use crate::errors::AuthError;
use crate::models::{LoginRequest, RegisterRequest, RegisterResponse, TokenResponse};
use crate::observability::metrics::record_registration;
use crate::routes::AppState;
use crate::services::{token_service, user_service};
use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use common::secret::ExposeSecret;
use std::sync::Arc;
use tracing::instrument;

/// Handle user registration
///
/// POST /api/v1/auth/register
#[instrument(skip_all, name = "auth.handlers.register")]
pub async fn handle_register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AuthError> {
    let result = user_service::register_user(
        state.users.as_ref(),
        state.config.bcrypt_cost,
        &payload.username,
        payload.password.expose_secret(),
    )
    .await;

    record_registration(match &result {
        Ok(_) => "success",
        Err(AuthError::UsernameTaken) => "conflict",
        Err(AuthError::BadRequest(_)) => "rejected",
        Err(_) => "error",
    });

    let user = result?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id,
            username: user.username,
            authorities: user.authorities,
        }),
    ))
}

/// Handle password login
///
/// POST /api/v1/auth/login
#[instrument(skip_all, name = "auth.handlers.login")]
pub async fn handle_login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let token = token_service::issue_user_token(
        state.users.as_ref(),
        &state.issuer,
        &state.dummy_password_hash,
        &payload.username,
        payload.password.expose_secret(),
        Utc::now(),
    )
    .await?;

    Ok(Json(token))
}
