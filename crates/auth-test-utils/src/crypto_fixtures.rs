//! Deterministic signing key fixtures for testing
//!
//! The same seed always yields the same key bytes, so tokens minted in one
//! process validate in another that loaded the same fixture.

use base64::engine::general_purpose;
use base64::Engine;
use common::jwt::SigningKey;
use ring::rand::{SecureRandom, SystemRandom};
use std::sync::Arc;
use thiserror::Error;

/// Test fixture error type
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Cryptographic operation failed: {0}")]
    Crypto(String),
}

/// Deterministic key bytes of length `len` derived from `seed`.
pub fn test_key_bytes(seed: u8, len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| {
            let i = (i % 256) as u8;
            seed.wrapping_mul(31).wrapping_add(i.wrapping_mul(7)) ^ 0x5a
        })
        .collect()
}

/// 32-byte (HS256) signing key for `seed`.
///
/// # Example
/// ```rust,ignore
/// let key = test_signing_key(1);
/// assert_eq!(key.algorithm(), jsonwebtoken::Algorithm::HS256);
/// ```
pub fn test_signing_key(seed: u8) -> Arc<SigningKey> {
    test_signing_key_with_len(seed, 32)
}

/// Signing key of a specific length (48 for HS384, 64 for HS512).
pub fn test_signing_key_with_len(seed: u8, len: usize) -> Arc<SigningKey> {
    Arc::new(SigningKey::from_bytes(test_key_bytes(seed, len)).expect("test key length >= 32"))
}

/// `JWT_SECRET` value (standard base64) matching [`test_signing_key`].
pub fn test_jwt_secret(seed: u8) -> String {
    general_purpose::STANDARD.encode(test_key_bytes(seed, 32))
}

/// Fresh random 32-byte key, for tests that must not share a key with anything.
pub fn random_signing_key() -> Result<Arc<SigningKey>, FixtureError> {
    let rng = SystemRandom::new();
    let mut bytes = vec![0u8; 32];
    rng.fill(&mut bytes)
        .map_err(|e| FixtureError::Crypto(format!("Random key generation failed: {e:?}")))?;

    SigningKey::from_bytes(bytes)
        .map(Arc::new)
        .map_err(|e| FixtureError::Crypto(e.to_string()))
}
