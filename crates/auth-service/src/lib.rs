//! Auth Service Library
//!
//! Issues signed tokens for registered users and answers remote parse calls
//! from gateways that delegate token validation.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `crypto` - Password hashing
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `middleware` - HTTP middleware
//! - `models` - Request/response models
//! - `observability` - Metrics
//! - `repositories` - User storage
//! - `routes` - Router and application state
//! - `services` - Business logic layer

pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
