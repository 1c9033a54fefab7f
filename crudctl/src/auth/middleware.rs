use crate::{AppState, api::models::auth::Operator, auth::current_user::try_bearer_token_auth, errors::Error};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::trace;

/// Route layer guarding the record endpoints.
///
/// Rejects the request with 401 before the handler runs unless it carries a valid, unexpired
/// bearer token. The decoded [`Operator`] is stored in the request extensions.
pub async fn authorization_gate(State(state): State<AppState>, mut request: Request, next: Next) -> Result<Response, Error> {
    let (parts, body) = request.into_parts();
    let operator: Operator = try_bearer_token_auth(&parts, &state.config)?;
    trace!("Authorized operator {} for {}", operator.username, parts.uri.path());

    request = Request::from_parts(parts, body);
    request.extensions_mut().insert(operator);

    Ok(next.run(request).await)
}
