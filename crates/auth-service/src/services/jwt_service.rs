//! Remote token parsing.

use crate::errors::AuthError;
use crate::models::ParseResponse;
use crate::observability::metrics::record_jwt_parse;
use chrono::{DateTime, Utc};
use common::token::TokenValidator;
use tracing::instrument;

/// Validate `token` at `now` on behalf of a remote caller.
#[instrument(skip_all, name = "auth.service.jwt_parse")]
pub fn parse_token(
    validator: &TokenValidator,
    token: &str,
    now: DateTime<Utc>,
) -> Result<ParseResponse, AuthError> {
    match validator.validate(token, now) {
        Ok(principal) => {
            record_jwt_parse("success", None);
            Ok(ParseResponse {
                username: principal.subject().to_string(),
                authorities: principal.authorities().iter().cloned().collect(),
            })
        }
        Err(failure) => {
            tracing::debug!(
                target: "auth.service.jwt",
                failure = failure.as_label(),
                "Remote parse rejected token"
            );
            record_jwt_parse("error", Some(failure.as_label()));
            Err(AuthError::InvalidToken(failure))
        }
    }
}
