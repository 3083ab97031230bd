//! The identity attached to an authenticated request.
//!
//! A `Principal` is produced only by [`crate::token::TokenValidator`] (or the
//! remote parse client that mirrors it) and lives in the request's
//! extensions for the duration of that request.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Validated subject and its granted authorities.
///
/// Authorities form a set: order and duplicates in the token are irrelevant.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    subject: String,
    authorities: BTreeSet<String>,
}

impl Principal {
    pub fn new<I, S>(subject: impl Into<String>, authorities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subject: subject.into(),
            authorities: authorities.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn authorities(&self) -> &BTreeSet<String> {
        &self.authorities
    }

    #[must_use]
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }

    /// True if this principal holds at least one of `required`.
    #[must_use]
    pub fn has_any_authority<S: AsRef<str>>(&self, required: &[S]) -> bool {
        required.iter().any(|r| self.has_authority(r.as_ref()))
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("subject", &"[REDACTED]")
            .field("authorities", &self.authorities)
            .finish()
    }
}
