//! Observability for the API gateway.
//!
//! Tokens and subjects never appear in spans, logs or metric labels. Auth
//! failures are reported by kind only.

pub mod metrics;
