//! Auth service error types.
//!
//! Client-facing messages are generic. Internal detail is logged server-side.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::jwt::AuthFailure;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(AuthFailure),

    #[error("Username already taken")]
    UsernameTaken,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AuthError {
    /// HTTP status code for this error (for metrics recording).
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials | AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AuthError::UsernameTaken => StatusCode::CONFLICT,
            AuthError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::Crypto(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (code, message) = match &self {
            AuthError::InvalidCredentials => (
                "INVALID_CREDENTIALS",
                "Invalid username or password".to_string(),
            ),
            AuthError::InvalidToken(failure) => (failure.code(), failure.to_string()),
            AuthError::UsernameTaken => ("USERNAME_TAKEN", "Username already taken".to_string()),
            AuthError::BadRequest(reason) => ("BAD_REQUEST", reason.clone()),
            AuthError::Crypto(err) => {
                tracing::error!(target: "auth.crypto", error = %err, "Cryptographic operation failed");
                (
                    "CRYPTO_ERROR",
                    "An internal cryptographic error occurred".to_string(),
                )
            }
            AuthError::Internal(err) => {
                tracing::error!(target: "auth.internal", error = %err, "Internal error");
                ("INTERNAL_ERROR", "An internal error occurred".to_string())
            }
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        let mut response = (status, Json(error_response)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            if let Ok(header_value) = "Bearer realm=\"auth-service\"".parse() {
                response
                    .headers_mut()
                    .insert("WWW-Authenticate", header_value);
            }
        }

        response
    }
}
