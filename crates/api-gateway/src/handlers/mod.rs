//! HTTP request handlers for the API gateway.

pub mod health;
pub mod me;
pub mod metrics;
pub mod proxy;

pub use health::{health_check, ping};
pub use me::get_me;
pub use metrics::metrics_handler;
pub use proxy::proxy;
