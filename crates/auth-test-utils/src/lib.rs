//! # Auth Test Utilities
//!
//! Shared test utilities for the auth service and the API gateway.
//!
//! This crate provides:
//! - Deterministic signing keys (fixed bytes for reproducible tests)
//! - `TestTokenBuilder` for valid and deliberately broken tokens
//! - `TestAuthServer` for spawning a real auth service in E2E tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use auth_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let key = test_signing_key(1);
//!
//!     let token = TestTokenBuilder::new()
//!         .for_user("alice")
//!         .with_authority("ROLE_ADMIN")
//!         .sign(&key);
//!
//!     let server = TestAuthServer::spawn().await.unwrap();
//!     let parse_url = server.parse_url();
//! }
//! ```

pub mod crypto_fixtures;
pub mod server_harness;
pub mod token_builders;

pub use crypto_fixtures::*;
pub use server_harness::*;
pub use token_builders::*;
