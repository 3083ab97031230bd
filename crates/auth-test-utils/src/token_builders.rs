//! Builder patterns for test tokens
//!
//! Produces well-formed tokens as well as the broken ones the validator must
//! reject: expired, foreign-key, unsigned (`alg: none`), tampered payloads and
//! inverted validity windows.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use common::jwt::{encode_claims, SigningKey, TokenClaims};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;

/// Builder for test tokens
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .for_user("alice")
///     .with_authority("ROLE_ADMIN")
///     .expires_in(3600)
///     .sign(&test_signing_key(1));
/// ```
#[derive(Debug, Clone)]
pub struct TestTokenBuilder {
    sub: String,
    authorities: Vec<String>,
    iat: i64,
    exp: i64,
}

impl TestTokenBuilder {
    /// Defaults: subject `test-subject`, no authorities, valid for one hour from now.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            sub: "test-subject".to_string(),
            authorities: Vec::new(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(3600)).timestamp(),
        }
    }

    /// Set the subject
    pub fn for_user(mut self, subject: &str) -> Self {
        self.sub = subject.to_string();
        self
    }

    /// Add one authority
    pub fn with_authority(mut self, authority: &str) -> Self {
        self.authorities.push(authority.to_string());
        self
    }

    /// Set expiration in seconds from now
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self
    }

    /// Token that expired `seconds` ago (issued an hour before that)
    pub fn expired_seconds_ago(mut self, seconds: i64) -> Self {
        let exp = Utc::now() - Duration::seconds(seconds);
        self.exp = exp.timestamp();
        self.iat = (exp - Duration::seconds(3600)).timestamp();
        self
    }

    /// Set issued-at timestamp
    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.iat = timestamp;
        self
    }

    /// Set expiry timestamp
    pub fn expires_at(mut self, timestamp: i64) -> Self {
        self.exp = timestamp;
        self
    }

    /// The claim set this builder describes
    pub fn claims(&self) -> TokenClaims {
        TokenClaims {
            sub: self.sub.clone(),
            authorities: self.authorities.clone(),
            iat: self.iat,
            exp: self.exp,
        }
    }

    /// Sign with `key` through the production codec.
    ///
    /// Panics if the claims are not encodable (empty subject, `exp <= iat`);
    /// use [`Self::sign_raw`] to forge those.
    pub fn sign(&self, key: &SigningKey) -> String {
        encode_claims(&self.claims(), key).expect("claims should be encodable")
    }

    /// Sign with raw key bytes and an explicit algorithm, skipping all
    /// claim checks.
    pub fn sign_raw(&self, secret: &[u8], algorithm: Algorithm) -> String {
        encode(
            &Header::new(algorithm),
            &self.claims(),
            &EncodingKey::from_secret(secret),
        )
        .expect("HMAC signing should succeed")
    }

    /// Unsigned token with `alg: none` and an empty signature segment.
    pub fn unsigned(&self) -> String {
        let header = URL_SAFE_NO_PAD.encode(json!({"alg": "none", "typ": "JWT"}).to_string());
        let payload = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&self.claims()).expect("claims should serialize"),
        );
        format!("{header}.{payload}.")
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace the payload of a signed token while keeping its header and signature.
///
/// The result must fail signature verification.
pub fn tamper_payload(token: &str, mutate: impl FnOnce(&mut serde_json::Value)) -> String {
    let mut parts = token.splitn(3, '.');
    let header = parts.next().expect("header segment");
    let payload = parts.next().expect("payload segment");
    let signature = parts.next().expect("signature segment");

    let bytes = URL_SAFE_NO_PAD.decode(payload).expect("payload base64");
    let mut claims: serde_json::Value = serde_json::from_slice(&bytes).expect("payload json");
    mutate(&mut claims);

    let forged = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{forged}.{signature}")
}
