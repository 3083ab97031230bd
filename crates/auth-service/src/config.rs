//! Auth service configuration.
//!
//! Loaded from environment variables. The signing key and the seeded admin
//! password are redacted in Debug output.

use common::config::{JwtConfigError, JwtSettings};
use common::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Default bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8082";

/// Default bcrypt cost factor.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Minimum accepted bcrypt cost factor.
pub const MIN_BCRYPT_COST: u32 = 10;

/// Maximum accepted bcrypt cost factor.
pub const MAX_BCRYPT_COST: u32 = 14;

/// Maximum shutdown drain period in seconds.
pub const MAX_DRAIN_SECONDS: u64 = 300;

/// Credentials for an administrator created at startup.
#[derive(Clone)]
pub struct AdminSeed {
    pub username: String,
    pub password: SecretString,
}

impl fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSeed")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (default: "0.0.0.0:8082").
    pub bind_address: String,

    /// Signing key and token TTL.
    pub jwt: JwtSettings,

    /// bcrypt cost for password hashing (default: 12).
    pub bcrypt_cost: u32,

    /// Optional administrator seeded at startup.
    pub admin: Option<AdminSeed>,

    /// Wait after a shutdown signal before closing listeners (default: 0).
    pub drain_period: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Jwt(#[from] JwtConfigError),

    #[error("Invalid bcrypt cost configuration: {0}")]
    InvalidBcryptCost(String),

    #[error("Invalid admin seed configuration: {0}")]
    InvalidAdminSeed(String),

    #[error("Invalid drain configuration: {0}")]
    InvalidDrain(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let jwt = JwtSettings::from_vars(vars)?;

        let bcrypt_cost = if let Some(value_str) = vars.get("BCRYPT_COST") {
            let value: u32 = value_str.parse().map_err(|e| {
                ConfigError::InvalidBcryptCost(format!(
                    "BCRYPT_COST must be a valid integer, got '{value_str}': {e}"
                ))
            })?;

            if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&value) {
                return Err(ConfigError::InvalidBcryptCost(format!(
                    "BCRYPT_COST must be between {MIN_BCRYPT_COST} and {MAX_BCRYPT_COST}, got {value}"
                )));
            }

            value
        } else {
            DEFAULT_BCRYPT_COST
        };

        let admin = match (
            vars.get("AUTH_ADMIN_USERNAME"),
            vars.get("AUTH_ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(AdminSeed {
                username: username.clone(),
                password: SecretString::from(password.clone()),
            }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::InvalidAdminSeed(
                    "AUTH_ADMIN_USERNAME and AUTH_ADMIN_PASSWORD must be set together".to_string(),
                ))
            }
        };

        let drain_period = match vars.get("AUTH_DRAIN_SECONDS") {
            Some(value_str) => {
                let value: u64 = value_str
                    .parse()
                    .ok()
                    .filter(|v| *v <= MAX_DRAIN_SECONDS)
                    .ok_or_else(|| {
                        ConfigError::InvalidDrain(format!(
                            "AUTH_DRAIN_SECONDS must be between 0 and {MAX_DRAIN_SECONDS}, got '{value_str}'"
                        ))
                    })?;
                Duration::from_secs(value)
            }
            None => Duration::ZERO,
        };

        Ok(Config {
            bind_address,
            jwt,
            bcrypt_cost,
            admin,
            drain_period,
        })
    }
}
