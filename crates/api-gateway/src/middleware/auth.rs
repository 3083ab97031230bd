//! Inbound auth filter.
//!
//! Runs on every request. A verified bearer token attaches a [`Principal`]
//! to the request extensions; a missing, non-bearer or rejected credential
//! attaches nothing. The filter itself never rejects a request: whether an
//! anonymous caller may proceed is decided later, per route.
//!
//! Remote transport failures also fall through as anonymous. Routes marked
//! `public` are therefore reachable while the auth service is down, and
//! protected routes answer 401.

use crate::auth::TokenVerifier;
use crate::config::ValidationMode;
use crate::errors::GatewayError;
use crate::observability::metrics::record_auth_filter;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use common::jwt::AuthFailure;
use common::principal::Principal;
use common::secret::SecretString;
use std::sync::Arc;
use tracing::instrument;

const BEARER_PREFIX: &str = "Bearer ";

/// Immutable filter state shared by all requests.
pub struct AuthFilter {
    verifier: TokenVerifier,
}

impl AuthFilter {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }

    pub fn mode(&self) -> ValidationMode {
        self.verifier.mode()
    }
}

/// Extract the credential following `Bearer ` in the Authorization header.
///
/// Returns `None` when the header is absent, not valid ASCII, or uses
/// another scheme.
pub fn bearer_token(headers: &HeaderMap) -> Option<SecretString> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(|token| SecretString::from(token.to_string()))
}

/// Attach a [`Principal`] for a valid bearer token, then always continue.
#[instrument(skip_all, name = "gw.middleware.auth")]
pub async fn authenticate(
    State(filter): State<Arc<AuthFilter>>,
    mut req: Request,
    next: Next,
) -> Response {
    // Only this filter may attach a principal.
    req.extensions_mut().remove::<Principal>();

    let mode = filter.mode().as_str();

    match bearer_token(req.headers()) {
        None => record_auth_filter(mode, "anonymous"),
        Some(token) => match filter.verifier.verify(&token).await {
            Ok(principal) => {
                tracing::debug!(
                    target: "gw.middleware.auth",
                    authorities = principal.authorities().len(),
                    "Bearer token accepted"
                );
                req.extensions_mut().insert(principal);
                record_auth_filter(mode, "authenticated");
            }
            Err(AuthFailure::TransportFailure) => {
                tracing::warn!(
                    target: "gw.middleware.auth",
                    mode,
                    "Token could not be verified, continuing unauthenticated"
                );
                record_auth_filter(mode, AuthFailure::TransportFailure.as_label());
            }
            Err(failure) => {
                tracing::debug!(
                    target: "gw.middleware.auth",
                    failure = failure.as_label(),
                    "Bearer token rejected"
                );
                record_auth_filter(mode, failure.as_label());
            }
        },
    }

    next.run(req).await
}

/// Reject requests that reached this point without a [`Principal`].
///
/// Applied with `route_layer` after [`authenticate`].
pub async fn require_authenticated(req: Request, next: Next) -> Result<Response, GatewayError> {
    if req.extensions().get::<Principal>().is_none() {
        tracing::debug!(target: "gw.middleware.auth", "No principal on protected route");
        return Err(GatewayError::Unauthenticated);
    }

    Ok(next.run(req).await)
}
