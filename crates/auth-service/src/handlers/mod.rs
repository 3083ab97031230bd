//! HTTP request handlers for the auth service.

pub mod auth_handler;
pub mod health;
pub mod jwt_handler;
pub mod metrics;

pub use auth_handler::{handle_login, handle_register};
pub use health::{health_check, ping};
pub use jwt_handler::parse_jwt;
pub use metrics::metrics_handler;
