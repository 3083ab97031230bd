//! Bearer token verification.
//!
//! [`TokenVerifier`] selects between in-process validation with the shared
//! signing key and a call to the auth service's parse endpoint. Both yield a
//! [`Principal`] or an [`AuthFailure`]; the caller decides what a failure
//! means for the request.

pub mod remote;

pub use remote::RemoteParseClient;

use crate::config::{Config, ValidationMode};
use crate::errors::GatewayError;
use chrono::Utc;
use common::jwt::AuthFailure;
use common::principal::Principal;
use common::secret::{ExposeSecret, SecretString};
use common::token::TokenValidator;
use std::sync::Arc;

/// Token verification strategy.
pub enum TokenVerifier {
    Local(TokenValidator),
    Remote(RemoteParseClient),
}

impl TokenVerifier {
    /// Build the verifier named by `config.validation_mode`.
    ///
    /// # Errors
    ///
    /// Local mode without a signing key, or an HTTP client that fails to build.
    pub fn from_config(config: &Config) -> Result<Self, GatewayError> {
        match config.validation_mode {
            ValidationMode::Local => {
                let key = config.signing_key.as_ref().ok_or_else(|| {
                    GatewayError::Internal("local validation requires a signing key".to_string())
                })?;
                Ok(TokenVerifier::Local(TokenValidator::new(Arc::clone(key))))
            }
            ValidationMode::Remote => Ok(TokenVerifier::Remote(RemoteParseClient::new(
                config.auth_parse_url.clone(),
                config.auth_parse_timeout,
            )?)),
        }
    }

    pub fn mode(&self) -> ValidationMode {
        match self {
            TokenVerifier::Local(_) => ValidationMode::Local,
            TokenVerifier::Remote(_) => ValidationMode::Remote,
        }
    }

    /// Verify `token` (the bearer credential, prefix already stripped).
    pub async fn verify(&self, token: &SecretString) -> Result<Principal, AuthFailure> {
        match self {
            TokenVerifier::Local(validator) => validator.validate(token.expose_secret(), Utc::now()),
            TokenVerifier::Remote(client) => client.parse(token).await,
        }
    }
}
