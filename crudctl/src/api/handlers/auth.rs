use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::{
    AppState,
    api::models::auth::{LoginRequest, LoginResponse, Operator},
    auth::{password, session},
    errors::{Error, MISSING_FIELDS_MESSAGE},
};

/// Exchange operator credentials for an access token
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing fields or invalid credentials"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, request: Result<Json<LoginRequest>, JsonRejection>) -> Result<Json<LoginResponse>, Error> {
    let Json(request) = request.map_err(|e| {
        tracing::debug!("Rejected login body: {e}");
        Error::BadRequest {
            message: MISSING_FIELDS_MESSAGE.to_string(),
        }
    })?;

    let (username, password) = match (request.username, request.password) {
        (Some(u), Some(p)) if !u.trim().is_empty() && !p.is_empty() => (u, p),
        _ => {
            return Err(Error::BadRequest {
                message: MISSING_FIELDS_MESSAGE.to_string(),
            });
        }
    };

    // Unknown user and wrong password are indistinguishable to the caller
    let credential = state.store.get_credential_by_username(&username).await?.ok_or_else(|| {
        tracing::debug!("Login attempt for unknown username");
        Error::InvalidCredentials
    })?;

    // Verify password on a blocking thread to avoid blocking async runtime
    let hash = credential.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_string(&password, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        tracing::debug!("Login attempt with wrong password for {}", credential.username);
        return Err(Error::InvalidCredentials);
    }

    let operator = Operator {
        id: credential.id,
        username: credential.username,
    };
    let token = session::create_session_token(&operator, &state.config)?;
    tracing::info!("Operator {} logged in", operator.username);

    Ok(Json(LoginResponse { token }))
}

#[cfg(test)]
mod tests {
    use crate::{
        api::models::auth::{LoginRequest, LoginResponse},
        auth::session,
        test_utils::{create_test_app, seed_test_operator},
    };
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    #[test_log::test(tokio::test)]
    async fn test_login_success_returns_verifiable_token() {
        let (server, state) = create_test_app().await;
        seed_test_operator(&state, "admin", "admin123").await;

        let response = server.post("/login").json(&LoginRequest::new("admin", "admin123")).await;
        response.assert_status_ok();

        let body: LoginResponse = response.json();
        let operator = session::verify_session_token(&body.token, &state.config).unwrap();
        assert_eq!(operator.username, "admin");
    }

    #[test_log::test(tokio::test)]
    async fn test_unknown_user_and_wrong_password_look_identical() {
        let (server, state) = create_test_app().await;
        seed_test_operator(&state, "admin", "admin123").await;

        let wrong_password = server.post("/login").json(&LoginRequest::new("admin", "nope")).await;
        let unknown_user = server.post("/login").json(&LoginRequest::new("ghost", "admin123")).await;

        wrong_password.assert_status(StatusCode::BAD_REQUEST);
        unknown_user.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(wrong_password.json::<Value>(), json!({ "message": "Invalid credentials" }));
        assert_eq!(unknown_user.json::<Value>(), wrong_password.json::<Value>());
    }

    #[test_log::test(tokio::test)]
    async fn test_username_must_match_exactly() {
        let (server, state) = create_test_app().await;
        seed_test_operator(&state, "admin", "admin123").await;

        let response = server.post("/login").json(&LoginRequest::new("  admin  ", "admin123")).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>(), json!({ "message": "Invalid credentials" }));
    }

    #[test_log::test(tokio::test)]
    async fn test_missing_fields() {
        let (server, _state) = create_test_app().await;

        for body in [json!({}), json!({"username": "admin"}), json!({"password": "x"}), json!({"username": " ", "password": "x"})] {
            let response = server.post("/login").json(&body).await;
            response.assert_status(StatusCode::BAD_REQUEST);
            assert_eq!(response.json::<Value>(), json!({ "message": "All fields required" }));
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_malformed_body_is_validation_error() {
        let (server, _state) = create_test_app().await;

        let response = server
            .post("/login")
            .content_type("application/json")
            .bytes("{not json".into())
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.json::<Value>().get("message").is_some());
    }
}
