//! Token issuance and validation.
//!
//! Both types are stateless apart from the shared, read-only signing key and
//! take the clock reading as an argument, so a validation result depends only
//! on `(token, key, now)`.

use crate::jwt::{decode_claims, encode_claims, AuthFailure, SigningKey, TokenClaims, TokenEncodeError};
use crate::principal::Principal;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Produces signed tokens with a fixed time-to-live.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    key: Arc<SigningKey>,
    ttl: Duration,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(key: Arc<SigningKey>, ttl: Duration) -> Self {
        Self { key, ttl }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject` valid from `now` until `now + ttl`.
    ///
    /// # Errors
    ///
    /// Propagates [`TokenEncodeError`] from the codec (empty subject, zero TTL).
    pub fn issue<I, S>(
        &self,
        subject: &str,
        authorities: I,
        now: DateTime<Utc>,
    ) -> Result<String, TokenEncodeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let iat = now.timestamp();
        let ttl_secs = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);

        let claims = TokenClaims {
            sub: subject.to_string(),
            authorities: authorities.into_iter().map(Into::into).collect(),
            iat,
            exp: iat.saturating_add(ttl_secs),
        };

        let token = encode_claims(&claims, &self.key)?;

        tracing::debug!(
            target: "common.token",
            authorities = claims.authorities.len(),
            exp = claims.exp,
            "Token issued"
        );

        Ok(token)
    }
}

/// Verifies tokens and turns them into principals.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    key: Arc<SigningKey>,
}

impl TokenValidator {
    #[must_use]
    pub fn new(key: Arc<SigningKey>) -> Self {
        Self { key }
    }

    /// Validate `token` at instant `now`.
    ///
    /// # Errors
    ///
    /// Any codec failure, or `AuthFailure::Expired` if `exp <= now`.
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, AuthFailure> {
        let claims = decode_claims(token, &self.key)?;

        if claims.exp <= now.timestamp() {
            tracing::debug!(
                target: "common.token",
                exp = claims.exp,
                now = now.timestamp(),
                "Token rejected: expired"
            );
            return Err(AuthFailure::Expired);
        }

        Ok(Principal::new(claims.sub, claims.authorities))
    }
}
