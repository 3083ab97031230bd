//! Gateway error types.
//!
//! Responses never say why a token was rejected. The failure kind is logged
//! and counted by the auth filter, the client only sees 401 or 403.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Insufficient authorities")]
    Forbidden,

    #[error("Invalid request path")]
    InvalidPath,

    #[error("No route for path")]
    NotFound,

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Upstream error: {0}")]
    BadGateway(String),

    #[error("Upstream timed out")]
    GatewayTimeout,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Unauthenticated => StatusCode::UNAUTHORIZED,
            GatewayError::Forbidden => StatusCode::FORBIDDEN,
            GatewayError::InvalidPath => StatusCode::BAD_REQUEST,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            GatewayError::GatewayTimeout => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: &'static str,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (code, message) = match &self {
            GatewayError::Unauthenticated => ("UNAUTHORIZED", "Authentication required"),
            GatewayError::Forbidden => ("FORBIDDEN", "Access denied"),
            GatewayError::InvalidPath => ("BAD_REQUEST", "Invalid request path"),
            GatewayError::NotFound => ("NOT_FOUND", "Not found"),
            GatewayError::PayloadTooLarge => ("PAYLOAD_TOO_LARGE", "Request body too large"),
            GatewayError::BadGateway(err) => {
                tracing::warn!(target: "gw.proxy", error = %err, "Upstream request failed");
                ("BAD_GATEWAY", "Upstream service unavailable")
            }
            GatewayError::GatewayTimeout => ("GATEWAY_TIMEOUT", "Upstream service timed out"),
            GatewayError::Internal(err) => {
                tracing::error!(target: "gw.internal", error = %err, "Internal error");
                ("INTERNAL_ERROR", "An internal error occurred")
            }
        };

        let mut response = (
            status,
            Json(ErrorResponse {
                error: ErrorDetail { code, message },
            }),
        )
            .into_response();

        if status == StatusCode::UNAUTHORIZED {
            if let Ok(header_value) = "Bearer realm=\"api-gateway\"".parse() {
                response
                    .headers_mut()
                    .insert("WWW-Authenticate", header_value);
            }
        }

        response
    }
}
