//! API Gateway Library
//!
//! Front door for the platform. Every request passes a fail-open auth filter
//! that attaches a principal for valid bearer tokens, then either a gateway
//! endpoint or the proxy, which enforces per-route access before forwarding.
//!
//! # Modules
//!
//! - `auth` - Local and remote token verification
//! - `config` - Service configuration and route table
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `middleware` - Auth filter and HTTP metrics
//! - `observability` - Metrics
//! - `routes` - Router and application state
//! - `services` - Upstream forwarding

pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod routes;
pub mod services;
