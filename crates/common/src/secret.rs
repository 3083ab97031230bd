//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports the [`secrecy`] types used across the auth boundary. Passwords
//! in login/register bodies, raw bearer tokens handed to the remote parse
//! client, and the configured signing key are all wrapped so that `{:?}` and
//! tracing fields never print them.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct LoginRequest {
//!     username: String,
//!     password: SecretString,
//! }
//!
//! let req = LoginRequest {
//!     username: "alice".to_string(),
//!     password: SecretString::from("hunter22"),
//! };
//!
//! assert!(!format!("{req:?}").contains("hunter22"));
//! assert_eq!(req.password.expose_secret(), "hunter22");
//! ```
//!
//! Use `SecretString` for passwords, bearer tokens and the base64 form of the
//! signing key. Use `SecretBox<T>` for binary key material
//! (see [`crate::jwt::SigningKey`]).

pub use secrecy::{ExposeSecret, SecretBox, SecretString};
