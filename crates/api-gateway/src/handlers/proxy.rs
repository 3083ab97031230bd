//! Route table lookup, authorization and forwarding.
//!
//! Every path not served by the gateway itself lands here. This is the
//! authorization stage that follows the auth filter: it only sees whether a
//! [`Principal`] is attached, never why one is missing.

use crate::config::{Access, RouteRule};
use crate::errors::GatewayError;
use crate::routes::AppState;
use axum::{
    extract::{Request, State},
    response::Response,
};
use common::principal::Principal;
use std::sync::Arc;
use tracing::instrument;

/// True if any segment of `path` is `.` or `..`, raw or percent-encoded.
///
/// The upstream URL builder collapses such segments, so a path that matched
/// one route could otherwise be delivered under another route's prefix.
pub fn has_dot_segment(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| {
        let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
        decoded == "." || decoded == ".."
    })
}

/// Longest configured prefix matching `path` on a segment boundary.
pub fn find_route<'a>(routes: &'a [RouteRule], path: &str) -> Option<&'a RouteRule> {
    routes
        .iter()
        .filter(|rule| rule.matches(path))
        .max_by_key(|rule| rule.prefix.len())
}

/// Decide whether `principal` may use a route with `access`.
///
/// # Errors
///
/// `Unauthenticated` when a principal is required and absent, `Forbidden`
/// when it holds none of the required authorities.
pub fn authorize(access: &Access, principal: Option<&Principal>) -> Result<(), GatewayError> {
    match (access, principal) {
        (Access::Public, _) => Ok(()),
        (_, None) => Err(GatewayError::Unauthenticated),
        (Access::Authenticated, Some(_)) => Ok(()),
        (Access::AnyOf(required), Some(principal)) => {
            if principal.has_any_authority(required.as_slice()) {
                Ok(())
            } else {
                Err(GatewayError::Forbidden)
            }
        }
    }
}

/// Fallback handler for proxied routes.
#[instrument(skip_all, name = "gw.handlers.proxy")]
pub async fn proxy(
    State(state): State<Arc<AppState>>,
    req: Request,
) -> Result<Response, GatewayError> {
    let path = req.uri().path();
    if has_dot_segment(path) {
        tracing::debug!(target: "gw.proxy", "Rejected path with dot segment");
        return Err(GatewayError::InvalidPath);
    }

    let route = find_route(&state.config.routes, path).ok_or_else(|| {
        tracing::debug!(target: "gw.proxy", "No route for path");
        GatewayError::NotFound
    })?;

    let principal = req.extensions().get::<Principal>().cloned();

    authorize(&route.access, principal.as_ref()).inspect_err(|e| {
        tracing::debug!(target: "gw.proxy", route = %route.prefix, error = %e, "Access denied");
    })?;

    state.upstream.forward(route, req, principal.as_ref()).await
}
