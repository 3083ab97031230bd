//! User repository.
//!
//! The store is behind a trait so services and tests do not depend on the
//! storage backend. The only backend shipped is process-local memory.

use crate::errors::AuthError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Registered user.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub authorities: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: &str, password_hash: String, authorities: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash,
            authorities,
            created_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up a user by exact username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError>;

    /// Store a new user.
    ///
    /// Returns `AuthError::UsernameTaken` if the username already exists.
    async fn insert(&self, user: User) -> Result<User, AuthError>;
}

/// In-memory user store keyed by username.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let users = self.users.read().await;
        Ok(users.get(username).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, AuthError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.username) {
            return Err(AuthError::UsernameTaken);
        }
        users.insert(user.username.clone(), user.clone());
        Ok(user)
    }
}
