//! Shared authentication primitives for the Bookshelf services.
//!
//! The auth service issues tokens and answers remote parse calls; the API
//! gateway validates tokens in-process or delegates to the auth service.
//! Both sides build on the types in this crate so that a token issued by
//! one is understood identically by the other.

#![warn(clippy::pedantic)]

/// Module for the signed token codec (claims, signing key, failure kinds)
pub mod jwt;

/// Module for the validated identity attached to a request
pub mod principal;

/// Module for token issuance and validation against a clock reading
pub mod token;

/// Module for JWT configuration shared by the services
pub mod config;

/// Module for secret types that prevent accidental logging
pub mod secret;
