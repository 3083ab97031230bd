//! Service layer for the API gateway.

pub mod upstream;

pub use upstream::UpstreamClient;
