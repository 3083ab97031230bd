//! User registration and the startup admin seed.

use crate::config::AdminSeed;
use crate::crypto;
use crate::errors::AuthError;
use crate::models::{ROLE_ADMIN, ROLE_USER};
use crate::repositories::{User, UserRepository};
use common::secret::ExposeSecret;
use tracing::instrument;

pub const MIN_USERNAME_CHARS: usize = 3;
pub const MAX_USERNAME_CHARS: usize = 64;
pub const MIN_PASSWORD_CHARS: usize = 8;

/// bcrypt ignores input past 72 bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Register a user with the default `ROLE_USER` authority.
#[instrument(skip_all, name = "auth.service.register")]
pub async fn register_user(
    users: &dyn UserRepository,
    bcrypt_cost: u32,
    username: &str,
    password: &str,
) -> Result<User, AuthError> {
    validate_username(username)?;
    validate_password(password)?;

    let password_hash = crypto::hash_password(password, bcrypt_cost)?;
    let user = users
        .insert(User::new(username, password_hash, vec![ROLE_USER.to_string()]))
        .await?;

    tracing::info!(target: "auth.service.user", user_id = %user.id, "User registered");

    Ok(user)
}

/// Create the configured administrator unless the username already exists.
#[instrument(skip_all, name = "auth.service.seed_admin")]
pub async fn seed_admin(
    users: &dyn UserRepository,
    bcrypt_cost: u32,
    seed: &AdminSeed,
) -> Result<(), AuthError> {
    if users.find_by_username(&seed.username).await?.is_some() {
        tracing::info!(target: "auth.service.user", "Admin user already present, skipping seed");
        return Ok(());
    }

    let password = seed.password.expose_secret();
    validate_username(&seed.username)?;
    validate_password(password)?;

    let password_hash = crypto::hash_password(password, bcrypt_cost)?;
    let admin = users
        .insert(User::new(
            &seed.username,
            password_hash,
            vec![ROLE_ADMIN.to_string(), ROLE_USER.to_string()],
        ))
        .await?;

    tracing::info!(target: "auth.service.user", user_id = %admin.id, "Admin user seeded");

    Ok(())
}

/// Usernames become token subjects and are forwarded in HTTP headers, so
/// they are limited to a header-safe ASCII set.
fn validate_username(username: &str) -> Result<(), AuthError> {
    let len = username.chars().count();
    if !(MIN_USERNAME_CHARS..=MAX_USERNAME_CHARS).contains(&len) {
        return Err(AuthError::BadRequest(format!(
            "Username must be between {MIN_USERNAME_CHARS} and {MAX_USERNAME_CHARS} characters"
        )));
    }

    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '@');
    if !username.chars().all(allowed) {
        return Err(AuthError::BadRequest(
            "Username may only contain letters, digits, '.', '_', '-' and '@'".to_string(),
        ));
    }

    Ok(())
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AuthError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_CHARS} characters"
        )));
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AuthError::BadRequest(format!(
            "Password must be at most {MAX_PASSWORD_BYTES} bytes"
        )));
    }

    Ok(())
}
