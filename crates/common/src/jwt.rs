//! Signed token codec shared by the auth service and the API gateway.
//!
//! Tokens are compact JWS strings signed with an HMAC-SHA algorithm over a
//! process-wide symmetric key. This module provides:
//! - `SigningKey` - key material with algorithm selection by key length
//! - `TokenClaims` - the claim set carried by every token
//! - `encode_claims` / `decode_claims` - the codec itself
//! - `AuthFailure` - the failure taxonomy used across the auth boundary
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Only the active key's HMAC algorithm is accepted; `none` and asymmetric
//!   algorithms are classified as `Unsupported`
//! - Key bytes live in a `SecretBox` and never appear in `Debug` output
//! - The `sub` claim is redacted in `Debug` output
//!
//! Decoding is pure: it never consults the clock. Expiry is checked by
//! [`crate::token::TokenValidator`] against an explicit `now`.

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine,
};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretBox};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum allowed token size in bytes (8KB).
///
/// Tokens larger than this are rejected before any base64 decoding or
/// signature work. A typical token with a handful of authorities is well
/// under 500 bytes.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// Minimum HMAC key length in bytes (256 bits, the HS256 floor).
pub const MIN_HMAC_KEY_BYTES: usize = 32;

/// Key length at which HS384 is selected.
const HS384_KEY_BYTES: usize = 48;

/// Key length at which HS512 is selected.
const HS512_KEY_BYTES: usize = 64;

// =============================================================================
// Error Types
// =============================================================================

/// Why a presented token did not yield a principal.
///
/// `TransportFailure` is only produced by callers that delegate validation
/// to a remote process; the codec itself never returns it.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthFailure {
    /// Not a structurally valid token (segments, encoding, claim shape).
    #[error("Invalid JWT token")]
    Malformed,

    /// Signature does not verify under the active signing key.
    #[error("Invalid JWT signature")]
    BadSignature,

    /// `exp` is not after the validation instant.
    #[error("Expired JWT token")]
    Expired,

    /// Token uses an algorithm this service does not accept.
    #[error("Unsupported JWT token")]
    Unsupported,

    /// Remote validation could not be completed.
    #[error("Token could not be verified")]
    TransportFailure,
}

impl AuthFailure {
    /// Stable wire code used in error response bodies.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            AuthFailure::Malformed => "MALFORMED_TOKEN",
            AuthFailure::BadSignature => "BAD_SIGNATURE",
            AuthFailure::Expired => "EXPIRED_TOKEN",
            AuthFailure::Unsupported => "UNSUPPORTED_TOKEN",
            AuthFailure::TransportFailure => "TRANSPORT_FAILURE",
        }
    }

    /// Inverse of [`AuthFailure::code`].
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "MALFORMED_TOKEN" => Some(AuthFailure::Malformed),
            "BAD_SIGNATURE" => Some(AuthFailure::BadSignature),
            "EXPIRED_TOKEN" => Some(AuthFailure::Expired),
            "UNSUPPORTED_TOKEN" => Some(AuthFailure::Unsupported),
            "TRANSPORT_FAILURE" => Some(AuthFailure::TransportFailure),
            _ => None,
        }
    }

    /// Bounded metrics/log label.
    #[must_use]
    pub fn as_label(self) -> &'static str {
        match self {
            AuthFailure::Malformed => "malformed",
            AuthFailure::BadSignature => "bad_signature",
            AuthFailure::Expired => "expired",
            AuthFailure::Unsupported => "unsupported",
            AuthFailure::TransportFailure => "transport_failure",
        }
    }
}

/// Errors raised while loading signing key material.
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Signing key is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("Signing key must be at least {min} bytes, got {actual}")]
    TooShort { actual: usize, min: usize },
}

/// Errors raised while producing a token.
#[derive(Error, Debug)]
pub enum TokenEncodeError {
    #[error("Token subject must not be empty")]
    MissingSubject,

    #[error("Token expiry must be strictly after issued-at")]
    InvalidValidityWindow,

    #[error("Token signing failed: {0}")]
    Signing(String),
}

// =============================================================================
// Signing Key
// =============================================================================

/// Symmetric signing key shared read-only by issuer and validator.
///
/// The HMAC algorithm follows the key length: 64+ bytes selects HS512,
/// 48+ bytes HS384, otherwise HS256. Keys under 32 bytes are rejected.
pub struct SigningKey {
    secret: SecretBox<Vec<u8>>,
    algorithm: Algorithm,
}

impl SigningKey {
    /// Build a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::TooShort` if fewer than [`MIN_HMAC_KEY_BYTES`] bytes are given.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, KeyError> {
        let len = bytes.len();
        if len < MIN_HMAC_KEY_BYTES {
            return Err(KeyError::TooShort {
                actual: len,
                min: MIN_HMAC_KEY_BYTES,
            });
        }

        let algorithm = if len >= HS512_KEY_BYTES {
            Algorithm::HS512
        } else if len >= HS384_KEY_BYTES {
            Algorithm::HS384
        } else {
            Algorithm::HS256
        };

        Ok(Self {
            secret: SecretBox::new(Box::new(bytes)),
            algorithm,
        })
    }

    /// Build a key from its standard base64 form (surrounding whitespace ignored).
    ///
    /// # Errors
    ///
    /// Returns `KeyError::Encoding` for invalid base64 and `KeyError::TooShort`
    /// if the decoded key is too short.
    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        let bytes = STANDARD.decode(encoded.trim())?;
        Self::from_bytes(bytes)
    }

    /// The HMAC algorithm tokens are signed and verified with.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Key length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.secret.expose_secret().len()
    }

    /// Always false: construction rejects short keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.secret.expose_secret().is_empty()
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.secret.expose_secret())
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.secret.expose_secret())
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("secret", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .field("len", &self.len())
            .finish()
    }
}

// =============================================================================
// Claims
// =============================================================================

/// Claim set carried by every token.
///
/// # Fields
///
/// - `sub`: Subject (username) - redacted in Debug output
/// - `authorities`: Granted roles/permissions, in issue order (may be empty)
/// - `iat`: Issued-at timestamp (Unix epoch seconds)
/// - `exp`: Expiration timestamp (Unix epoch seconds), strictly after `iat`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub authorities: Vec<String>,
    pub iat: i64,
    pub exp: i64,
}

impl fmt::Debug for TokenClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenClaims")
            .field("sub", &"[REDACTED]")
            .field("authorities", &self.authorities)
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .finish()
    }
}

// =============================================================================
// Codec
// =============================================================================

/// Sign `claims` with `key`.
///
/// # Errors
///
/// - `MissingSubject` if `sub` is empty
/// - `InvalidValidityWindow` if `exp <= iat`
/// - `Signing` if the underlying JWS encoder fails
pub fn encode_claims(claims: &TokenClaims, key: &SigningKey) -> Result<String, TokenEncodeError> {
    if claims.sub.is_empty() {
        return Err(TokenEncodeError::MissingSubject);
    }
    if claims.exp <= claims.iat {
        return Err(TokenEncodeError::InvalidValidityWindow);
    }

    let header = Header::new(key.algorithm());
    encode(&header, claims, &key.encoding_key())
        .map_err(|e| TokenEncodeError::Signing(e.to_string()))
}

/// Verify `token` against `key` and return its claims.
///
/// Does not check expiry.
///
/// # Errors
///
/// - `Malformed` - oversized, wrong segment count, undecodable header or
///   payload, missing/invalid claims, `exp <= iat`
/// - `Unsupported` - `none`, asymmetric or unknown algorithm, or empty signature
/// - `BadSignature` - signature does not verify, or a different HMAC algorithm
pub fn decode_claims(token: &str, key: &SigningKey) -> Result<TokenClaims, AuthFailure> {
    check_header(token, key)?;

    let mut validation = Validation::new(key.algorithm());
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<TokenClaims>(token, &key.decoding_key(), &validation).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Token verification failed");
        classify_decode_error(e.kind())
    })?;

    let claims = data.claims;
    if claims.sub.is_empty() {
        tracing::debug!(target: "common.jwt", "Token rejected: empty subject");
        return Err(AuthFailure::Malformed);
    }
    if claims.exp <= claims.iat {
        tracing::debug!(
            target: "common.jwt",
            iat = claims.iat,
            exp = claims.exp,
            "Token rejected: expiry not after issued-at"
        );
        return Err(AuthFailure::Malformed);
    }

    Ok(claims)
}

/// Structural and algorithm checks performed before signature verification.
fn check_header(token: &str, key: &SigningKey) -> Result<(), AuthFailure> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(AuthFailure::Malformed);
    }

    // JWT format: header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        tracing::debug!(
            target: "common.jwt",
            parts = parts.len(),
            "Token rejected: invalid JWT format"
        );
        return Err(AuthFailure::Malformed);
    }

    let header_part = parts.first().ok_or(AuthFailure::Malformed)?;
    let header_bytes = URL_SAFE_NO_PAD.decode(header_part).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to decode JWT header base64");
        AuthFailure::Malformed
    })?;

    let header: serde_json::Value = serde_json::from_slice(&header_bytes).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to parse JWT header JSON");
        AuthFailure::Malformed
    })?;

    let alg = header
        .get("alg")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            tracing::debug!(target: "common.jwt", "Token rejected: missing alg header");
            AuthFailure::Malformed
        })?;

    match classify_algorithm(alg, key.algorithm()) {
        Ok(()) => {}
        Err(failure) => {
            tracing::debug!(target: "common.jwt", alg = %alg, "Token rejected: algorithm not accepted");
            return Err(failure);
        }
    }

    if parts.get(2).is_some_and(|sig| sig.is_empty()) {
        tracing::debug!(target: "common.jwt", "Token rejected: unsigned token");
        return Err(AuthFailure::Unsupported);
    }

    Ok(())
}

fn classify_algorithm(alg: &str, expected: Algorithm) -> Result<(), AuthFailure> {
    match Algorithm::from_str(alg) {
        Ok(found) if found == expected => Ok(()),
        // Another HMAC variant cannot have been produced by the active key
        Ok(Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) => Err(AuthFailure::BadSignature),
        Ok(_) | Err(_) => Err(AuthFailure::Unsupported),
    }
}

fn classify_decode_error(kind: &ErrorKind) -> AuthFailure {
    match kind {
        ErrorKind::InvalidSignature => AuthFailure::BadSignature,
        ErrorKind::ExpiredSignature => AuthFailure::Expired,
        ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::MissingAlgorithm
        | ErrorKind::InvalidKeyFormat => AuthFailure::Unsupported,
        _ => AuthFailure::Malformed,
    }
}

// =============================================================================
// Tests
// =============================================================================
