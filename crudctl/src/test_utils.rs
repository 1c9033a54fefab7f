//! Shared fixtures for unit and HTTP tests.

use std::sync::Arc;

use axum_test::TestServer;

use crate::{
    AppState, build_router,
    api::models::auth::{LoginRequest, LoginResponse},
    auth::password::{Argon2Params, hash_string_with_params},
    config::Config,
    db::{MemoryStore, models::credentials::CredentialCreateDBRequest},
};

pub const TEST_USERNAME: &str = "admin";
pub const TEST_PASSWORD: &str = "admin123";

pub fn create_test_config() -> Config {
    Config {
        secret_key: Some("test-secret-key-for-jwt".to_string()),
        // Tests seed operators explicitly with cheap hashing parameters
        admin_password: None,
        ..Default::default()
    }
}

pub fn create_test_state() -> AppState {
    AppState::builder()
        .store(Arc::new(MemoryStore::new()))
        .config(create_test_config())
        .build()
}

/// Insert an operator account directly into the store
pub async fn seed_test_operator(state: &AppState, username: &str, password: &str) {
    let password_hash = hash_string_with_params(password, Some(Argon2Params::fast())).expect("hash test password");
    state
        .store
        .create_credential(&CredentialCreateDBRequest {
            username: username.to_string(),
            password_hash,
        })
        .await
        .expect("seed test operator");
}

/// Router over a fresh memory store, with no operators seeded
pub async fn create_test_app() -> (TestServer, AppState) {
    let state = create_test_state();
    let router = build_router(&state).expect("build router");
    let server = TestServer::new(router).expect("Failed to create test server");
    (server, state)
}

/// Seed the default operator and log in as it
pub async fn login_token(server: &TestServer, state: &AppState) -> String {
    seed_test_operator(state, TEST_USERNAME, TEST_PASSWORD).await;

    let response = server.post("/login").json(&LoginRequest::new(TEST_USERNAME, TEST_PASSWORD)).await;
    response.assert_status_ok();
    response.json::<LoginResponse>().token
}
