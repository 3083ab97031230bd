//! Password hashing.

use crate::config::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use crate::errors::AuthError;
use tracing::instrument;

/// Plaintext hashed at startup to produce the timing-equalisation hash.
const DUMMY_PASSWORD: &str = "dummy-password-for-unknown-users";

/// Hash a password with bcrypt.
#[instrument(skip_all)]
pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
        return Err(AuthError::Crypto(format!(
            "Invalid bcrypt cost: {cost} (must be {MIN_BCRYPT_COST}-{MAX_BCRYPT_COST})"
        )));
    }

    bcrypt::hash(password, cost)
        .map_err(|e| AuthError::Crypto(format!("Password hashing failed: {e}")))
}

/// Verify a password against a bcrypt hash.
#[instrument(skip_all)]
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash)
        .map_err(|e| AuthError::Crypto(format!("Password verification failed: {e}")))
}

/// Hash verified against when a login names an unknown user, so that unknown
/// and known usernames take the same time to reject.
pub fn dummy_password_hash(cost: u32) -> Result<String, AuthError> {
    hash_password(DUMMY_PASSWORD, cost)
}
