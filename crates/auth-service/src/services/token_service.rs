//! Password login and token issuance.

use crate::crypto;
use crate::errors::AuthError;
use crate::models::{TokenResponse, TOKEN_TYPE_BEARER};
use crate::observability::metrics::record_token_issuance;
use crate::repositories::UserRepository;
use chrono::{DateTime, Utc};
use common::token::TokenIssuer;
use std::time::Instant;
use tracing::instrument;

/// Verify `username`/`password` and issue a bearer token.
///
/// bcrypt runs whether or not the user exists; unknown users are checked
/// against `dummy_hash` so both cases cost the same.
#[instrument(skip_all, name = "auth.service.login")]
pub async fn issue_user_token(
    users: &dyn UserRepository,
    issuer: &TokenIssuer,
    dummy_hash: &str,
    username: &str,
    password: &str,
    now: DateTime<Utc>,
) -> Result<TokenResponse, AuthError> {
    let start = Instant::now();

    let result = authenticate_and_issue(users, issuer, dummy_hash, username, password, now).await;

    let outcome = match &result {
        Ok(_) => "success",
        Err(AuthError::InvalidCredentials) => "invalid_credentials",
        Err(_) => "error",
    };
    record_token_issuance(outcome, start.elapsed());

    result
}

async fn authenticate_and_issue(
    users: &dyn UserRepository,
    issuer: &TokenIssuer,
    dummy_hash: &str,
    username: &str,
    password: &str,
    now: DateTime<Utc>,
) -> Result<TokenResponse, AuthError> {
    let user = users.find_by_username(username).await?;

    let hash_to_verify = match &user {
        Some(u) => u.password_hash.as_str(),
        None => dummy_hash,
    };
    let is_valid = crypto::verify_password(password, hash_to_verify)?;

    let user = match user {
        Some(u) if is_valid => u,
        _ => {
            tracing::debug!(target: "auth.service.token", "Login rejected");
            return Err(AuthError::InvalidCredentials);
        }
    };

    let access_token = issuer
        .issue(&user.username, user.authorities.iter().cloned(), now)
        .map_err(|e| AuthError::Crypto(format!("Token signing failed: {e}")))?;

    tracing::info!(target: "auth.service.token", user_id = %user.id, "Token issued");

    Ok(TokenResponse {
        access_token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: issuer.ttl().as_secs(),
    })
}
