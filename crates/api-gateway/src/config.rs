//! Gateway configuration.
//!
//! Loaded from environment variables. The signing key, when present, is
//! redacted in Debug output.

use common::config::{signing_key_from_vars, JwtConfigError};
use common::jwt::SigningKey;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Default bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default remote parse endpoint.
pub const DEFAULT_AUTH_PARSE_URL: &str = "http://localhost:8082/api/v1/jwt/parse";

/// Default remote parse timeout in milliseconds.
pub const DEFAULT_AUTH_PARSE_TIMEOUT_MS: u64 = 2000;

/// Maximum remote parse timeout in milliseconds.
pub const MAX_AUTH_PARSE_TIMEOUT_MS: u64 = 30_000;

/// Default upstream request timeout in seconds.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECONDS: u64 = 30;

/// Maximum upstream request timeout in seconds.
pub const MAX_UPSTREAM_TIMEOUT_SECONDS: u64 = 300;

/// Maximum shutdown drain period in seconds.
pub const MAX_DRAIN_SECONDS: u64 = 300;

/// Route table used when `GATEWAY_ROUTES` is unset.
pub const DEFAULT_GATEWAY_ROUTES: &str = "/api/v1/auth=http://localhost:8082=public";

/// Where bearer tokens are verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// In-process, with the shared signing key.
    Local,
    /// By calling the auth service's parse endpoint.
    Remote,
}

impl ValidationMode {
    /// Metric label value.
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationMode::Local => "local",
            ValidationMode::Remote => "remote",
        }
    }
}

impl FromStr for ValidationMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(ValidationMode::Local),
            "remote" => Ok(ValidationMode::Remote),
            other => Err(ConfigError::InvalidValidationMode(format!(
                "AUTH_VALIDATION_MODE must be 'local' or 'remote', got '{other}'"
            ))),
        }
    }
}

/// Authorization required to reach a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    /// Caller must hold at least one of these authorities.
    AnyOf(Vec<String>),
}

impl Access {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim() {
            "public" => Ok(Access::Public),
            "" | "authenticated" => Ok(Access::Authenticated),
            list => {
                let authorities: Vec<String> = list
                    .split('|')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(str::to_string)
                    .collect();

                if authorities.is_empty() {
                    return Err(ConfigError::InvalidRoute(format!(
                        "empty authority list '{list}'"
                    )));
                }

                Ok(Access::AnyOf(authorities))
            }
        }
    }
}

/// One `prefix=upstream[=access]` entry of the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    /// Path prefix, always starting with `/` and without a trailing slash
    /// (except for the catch-all `/`).
    pub prefix: String,

    /// Upstream base URL, without a trailing slash.
    pub upstream: String,

    pub access: Access,
}

impl RouteRule {
    /// True if `path` equals the prefix or continues it at a segment boundary.
    pub fn matches(&self, path: &str) -> bool {
        if self.prefix == "/" {
            return path.starts_with('/');
        }

        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

/// Parse a `GATEWAY_ROUTES` value.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidRoute`] for entries without an upstream,
/// prefixes not starting with `/`, non-HTTP upstreams or duplicate prefixes.
pub fn parse_routes(table: &str) -> Result<Vec<RouteRule>, ConfigError> {
    let mut routes: Vec<RouteRule> = Vec::new();

    for entry in table.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let mut parts = entry.splitn(3, '=');
        let prefix = parts.next().unwrap_or_default().trim();
        let upstream = parts
            .next()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ConfigError::InvalidRoute(format!("missing upstream in '{entry}'")))?;
        let access = Access::parse(parts.next().unwrap_or_default())?;

        if !prefix.starts_with('/') {
            return Err(ConfigError::InvalidRoute(format!(
                "prefix must start with '/', got '{prefix}'"
            )));
        }

        if !(upstream.starts_with("http://") || upstream.starts_with("https://")) {
            return Err(ConfigError::InvalidRoute(format!(
                "upstream must be an http(s) URL, got '{upstream}'"
            )));
        }

        let prefix = match prefix.trim_end_matches('/') {
            "" => "/".to_string(),
            trimmed => trimmed.to_string(),
        };

        if routes.iter().any(|r| r.prefix == prefix) {
            return Err(ConfigError::InvalidRoute(format!(
                "duplicate prefix '{prefix}'"
            )));
        }

        routes.push(RouteRule {
            prefix,
            upstream: upstream.trim_end_matches('/').to_string(),
            access,
        });
    }

    Ok(routes)
}

#[derive(Clone)]
pub struct Config {
    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// Token verification strategy (default: remote).
    pub validation_mode: ValidationMode,

    /// Shared signing key. Required in local mode, optional otherwise.
    pub signing_key: Option<Arc<SigningKey>>,

    /// Remote parse endpoint URL.
    pub auth_parse_url: String,

    /// Remote parse round-trip timeout (default: 2s).
    pub auth_parse_timeout: Duration,

    /// Upstream request timeout (default: 30s).
    pub upstream_timeout: Duration,

    /// Proxy route table.
    pub routes: Vec<RouteRule>,

    /// Wait after a shutdown signal before closing listeners (default: 0).
    pub drain_period: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("validation_mode", &self.validation_mode)
            .field("signing_key", &self.signing_key.as_ref().map(|_| "[REDACTED]"))
            .field("auth_parse_url", &self.auth_parse_url)
            .field("auth_parse_timeout", &self.auth_parse_timeout)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("routes", &self.routes)
            .field("drain_period", &self.drain_period)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Jwt(#[from] JwtConfigError),

    #[error("Invalid validation mode: {0}")]
    InvalidValidationMode(String),

    #[error("Invalid timeout configuration: {0}")]
    InvalidTimeout(String),

    #[error("Invalid route: {0}")]
    InvalidRoute(String),

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

        let validation_mode = match vars.get("AUTH_VALIDATION_MODE") {
            Some(value) => value.parse()?,
            None => ValidationMode::Remote,
        };

        let signing_key = match validation_mode {
            ValidationMode::Local => Some(Arc::new(signing_key_from_vars(vars)?)),
            ValidationMode::Remote => match signing_key_from_vars(vars) {
                Ok(key) => Some(Arc::new(key)),
                Err(JwtConfigError::MissingEnvVar(_)) => None,
                Err(e) => return Err(e.into()),
            },
        };

        let auth_parse_url = vars
            .get("AUTH_PARSE_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_AUTH_PARSE_URL.to_string());

        let auth_parse_timeout = Duration::from_millis(parse_bounded(
            vars,
            "AUTH_PARSE_TIMEOUT_MS",
            DEFAULT_AUTH_PARSE_TIMEOUT_MS,
            MAX_AUTH_PARSE_TIMEOUT_MS,
        )?);

        let upstream_timeout = Duration::from_secs(parse_bounded(
            vars,
            "UPSTREAM_TIMEOUT_SECONDS",
            DEFAULT_UPSTREAM_TIMEOUT_SECONDS,
            MAX_UPSTREAM_TIMEOUT_SECONDS,
        )?);

        let routes = parse_routes(
            vars.get("GATEWAY_ROUTES")
                .map(String::as_str)
                .unwrap_or(DEFAULT_GATEWAY_ROUTES),
        )?;

        let drain_period = match vars.get("GATEWAY_DRAIN_SECONDS") {
            Some(value_str) => {
                let value: u64 = value_str
                    .parse()
                    .ok()
                    .filter(|v| *v <= MAX_DRAIN_SECONDS)
                    .ok_or_else(|| {
                        ConfigError::InvalidDrain(format!(
                            "GATEWAY_DRAIN_SECONDS must be between 0 and {MAX_DRAIN_SECONDS}, got '{value_str}'"
                        ))
                    })?;
                Duration::from_secs(value)
            }
            None => Duration::ZERO,
        };

        Ok(Config {
            bind_address,
            validation_mode,
            signing_key,
            auth_parse_url,
            auth_parse_timeout,
            upstream_timeout,
            routes,
            drain_period,
        })
    }
}

fn parse_bounded(
    vars: &HashMap<String, String>,
    name: &str,
    default: u64,
    max: u64,
) -> Result<u64, ConfigError> {
    let Some(value_str) = vars.get(name) else {
        return Ok(default);
    };

    let value: u64 = value_str.parse().map_err(|e| {
        ConfigError::InvalidTimeout(format!(
            "{name} must be a valid positive integer, got '{value_str}': {e}"
        ))
    })?;

    if value == 0 || value > max {
        return Err(ConfigError::InvalidTimeout(format!(
            "{name} must be between 1 and {max}, got {value}"
        )));
    }

    Ok(value)
}
