use crate::{
    AppState,
    api::models::auth::Operator,
    auth::session,
    config::Config,
    errors::{Error, Result},
};
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::{debug, instrument, trace};

/// Authenticate from the `Authorization: Bearer <token>` header.
///
/// Every failure is `Unauthenticated`: a missing header, a header that is not UTF-8, a scheme
/// other than Bearer, or a token that does not verify.
#[instrument(skip(parts, config))]
pub(crate) fn try_bearer_token_auth(parts: &Parts, config: &Config) -> Result<Operator> {
    let auth_header = parts.headers.get(AUTHORIZATION).ok_or_else(|| Error::Unauthenticated {
        message: Some("Authorization token required".to_string()),
    })?;

    let auth_str = auth_header.to_str().map_err(|e| {
        trace!("Non UTF-8 authorization header: {e}");
        Error::Unauthenticated {
            message: Some("Invalid authorization header".to_string()),
        }
    })?;

    let token = auth_str.strip_prefix("Bearer ").ok_or_else(|| Error::Unauthenticated {
        message: Some("Invalid authorization header".to_string()),
    })?;

    session::verify_session_token(token.trim(), config).map_err(|e| match e {
        Error::Unauthenticated { .. } => Error::Unauthenticated {
            message: Some("Invalid or expired token".to_string()),
        },
        other => other,
    })
}

impl FromRequestParts<AppState> for Operator {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        // The authorization gate has already verified the token on protected routes
        if let Some(operator) = parts.extensions.get::<Operator>() {
            trace!("Using operator from request extensions: {}", operator.username);
            return Ok(operator.clone());
        }

        let operator = try_bearer_token_auth(parts, &state.config)?;
        debug!("Found bearer token authenticated operator: {}", operator.id);
        Ok(operator)
    }
}
