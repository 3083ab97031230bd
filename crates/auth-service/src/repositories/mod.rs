//! Storage layer.

pub mod users;

pub use users::{InMemoryUserRepository, User, UserRepository};
