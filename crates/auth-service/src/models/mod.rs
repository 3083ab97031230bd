use common::secret::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Authority granted to every registered user.
pub const ROLE_USER: &str = "ROLE_USER";

/// Authority granted to the seeded administrator.
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

/// Token type returned by the login endpoint.
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: SecretString,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub username: String,
    pub authorities: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: SecretString,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Body of a remote parse call.
#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub token: SecretString,
}

/// Successful remote parse result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResponse {
    pub username: String,
    pub authorities: Vec<String>,
}
