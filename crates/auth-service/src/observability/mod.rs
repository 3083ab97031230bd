//! Observability for the auth service.
//!
//! Instrumentation uses `#[instrument(skip_all)]`. Usernames, passwords and
//! tokens are never recorded as span or metric fields.

pub mod metrics;
