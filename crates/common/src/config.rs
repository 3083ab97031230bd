//! JWT configuration shared by the auth service and the gateway.
//!
//! Both services must load the same `JWT_SECRET` for tokens issued by one to
//! validate in the other.

use crate::jwt::{KeyError, SigningKey};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the base64-encoded signing key.
pub const JWT_SECRET_VAR: &str = "JWT_SECRET";

/// Environment variable holding the token time-to-live in seconds.
pub const JWT_TTL_VAR: &str = "JWT_TTL_SECONDS";

/// Default token time-to-live (1 hour).
pub const DEFAULT_JWT_TTL_SECONDS: u64 = 3600;

/// Maximum token time-to-live (24 hours).
pub const MAX_JWT_TTL_SECONDS: u64 = 86_400;

#[derive(Debug, Error)]
pub enum JwtConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWT_SECRET: {0}")]
    InvalidSecret(#[from] KeyError),

    #[error("Invalid JWT TTL configuration: {0}")]
    InvalidTtl(String),
}

/// Signing key plus token lifetime.
///
/// `Debug` is safe: [`SigningKey`] redacts its material.
#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub signing_key: Arc<SigningKey>,
    pub ttl: Duration,
}

impl JwtSettings {
    /// Load `JWT_SECRET` and `JWT_TTL_SECONDS` from `vars`.
    ///
    /// # Errors
    ///
    /// Missing or invalid secret, or a TTL outside `1..=86400`.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, JwtConfigError> {
        let signing_key = Arc::new(signing_key_from_vars(vars)?);

        let ttl_seconds = if let Some(value_str) = vars.get(JWT_TTL_VAR) {
            let value: u64 = value_str.parse().map_err(|e| {
                JwtConfigError::InvalidTtl(format!(
                    "{JWT_TTL_VAR} must be a valid positive integer, got '{value_str}': {e}"
                ))
            })?;

            if value == 0 {
                return Err(JwtConfigError::InvalidTtl(format!(
                    "{JWT_TTL_VAR} must be greater than 0"
                )));
            }

            if value > MAX_JWT_TTL_SECONDS {
                return Err(JwtConfigError::InvalidTtl(format!(
                    "{JWT_TTL_VAR} must not exceed {MAX_JWT_TTL_SECONDS} seconds, got {value}"
                )));
            }

            value
        } else {
            DEFAULT_JWT_TTL_SECONDS
        };

        Ok(Self {
            signing_key,
            ttl: Duration::from_secs(ttl_seconds),
        })
    }
}

/// Load only the signing key (validators have no use for a TTL).
///
/// # Errors
///
/// `MissingEnvVar` if `JWT_SECRET` is absent, `InvalidSecret` otherwise.
pub fn signing_key_from_vars(vars: &HashMap<String, String>) -> Result<SigningKey, JwtConfigError> {
    let encoded = vars
        .get(JWT_SECRET_VAR)
        .ok_or_else(|| JwtConfigError::MissingEnvVar(JWT_SECRET_VAR.to_string()))?;

    Ok(SigningKey::from_base64(encoded)?)
}
