//! # crudctl: record management service and client
//!
//! `crudctl` serves a small REST API for managing records (name, age, city) on behalf of
//! authenticated operators, and ships the client application that drives it.
//!
//! ## Architecture
//!
//! The server is built on [Axum](https://github.com/tokio-rs/axum). Storage sits behind the
//! [`db::Store`] trait, backed either by PostgreSQL (`database.type: external`) or by an
//! in-process store (`database.type: memory`, the default, useful for development).
//!
//! ### Request Flow
//!
//! An operator logs in with `POST /login` and receives a signed access token. Every `/users`
//! request must carry it as `Authorization: Bearer <token>`; the
//! [`auth::middleware::authorization_gate`] route layer rejects missing, malformed, and expired
//! tokens with 401 before any handler runs. Handlers validate the body, call the store, and map
//! every failure into the [`errors::Error`] taxonomy, so error bodies are always
//! `{"message": "..."}`.
//!
//! ### Core Components
//!
//! - [`api`]: handlers and wire models
//! - [`auth`]: password hashing, access tokens, and the authorization gate
//! - [`db`]: the [`db::Store`] trait and its PostgreSQL and memory backends
//! - [`client`]: the client application (pure view state plus an HTTP effect runner)
//! - [`config`]: YAML + environment configuration
//! - [`telemetry`]: tracing setup with optional OTLP export
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use crudctl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = crudctl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!     crudctl::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod openapi;
pub mod telemetry;
#[cfg(test)]
mod test_utils;
pub mod types;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    http::{self, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, patch, post},
};
use bon::Builder;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument, warn};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use config::Config;
pub use types::{CredentialId, RecordId};

use crate::{
    auth::{middleware::authorization_gate, password},
    config::{CorsOrigin, DatabaseConfig},
    db::{Store, create_store, errors::DbError, models::credentials::CredentialCreateDBRequest},
    openapi::ApiDoc,
};

/// Application state shared across all request handlers.
///
/// ```ignore
/// let state = AppState::builder()
///     .store(Arc::new(MemoryStore::new()))
///     .config(config)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Config,
}

/// Get the crudctl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Outcome of [`create_initial_admin_user`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminSeed {
    Created(CredentialId),
    AlreadyExists(CredentialId),
}

/// Provision an operator account if the username is not taken yet.
///
/// An existing account is left untouched, including its password.
#[instrument(skip(password, store))]
pub async fn create_initial_admin_user(username: &str, password: &str, store: &dyn Store) -> anyhow::Result<AdminSeed> {
    if let Some(existing) = store.get_credential_by_username(username).await? {
        info!("Operator {} already exists", username);
        return Ok(AdminSeed::AlreadyExists(existing.id));
    }

    let password = password.to_string();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_string(&password))
        .await
        .context("spawn password hashing task")??;

    let request = CredentialCreateDBRequest {
        username: username.to_string(),
        password_hash,
    };

    match store.create_credential(&request).await {
        Ok(created) => {
            info!("Created operator {}", username);
            Ok(AdminSeed::Created(created.id))
        }
        // Lost a race with a concurrent seed
        Err(DbError::UniqueViolation { .. }) => {
            let existing = store
                .get_credential_by_username(username)
                .await?
                .with_context(|| format!("operator {username} vanished after a unique violation"))?;
            info!("Operator {} already exists", username);
            Ok(AdminSeed::AlreadyExists(existing.id))
        }
        Err(e) => Err(e.into()),
    }
}

/// Provision the configured operator in the configured external database.
///
/// The memory store lives only as long as the server process, so there is nothing to seed ahead
/// of time; it is seeded at startup instead.
pub async fn seed_admin_account(config: &Config) -> anyhow::Result<AdminSeed> {
    if matches!(config.database, DatabaseConfig::Memory) {
        anyhow::bail!("--seed-admin requires an external database; the memory store is seeded at startup");
    }
    let password = config
        .admin_password
        .as_deref()
        .context("admin_password must be set to seed the operator account")?;

    let store = create_store(&config.database).await?;
    let outcome = create_initial_admin_user(&config.admin_username, password, store.as_ref()).await;
    store.close().await;
    outcome
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.auth.security.cors;

    // A literal "*" in an origin list is rejected by tower-http, so a wildcard wins outright
    let allow_origin = if cors_config.allowed_origins.iter().any(|o| matches!(o, CorsOrigin::Wildcard)) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                // Origins never carry a path, but Url always renders one
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([http::header::AUTHORIZATION, http::header::CONTENT_TYPE]);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router.
///
/// - `/healthz`, `/login`, `/openapi.json` and `/docs` are public
/// - `/users` routes sit behind the authorization gate
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let record_routes = Router::new()
        .route(
            "/users",
            get(api::handlers::records::list_records).post(api::handlers::records::create_record),
        )
        .route(
            "/users/{id}",
            patch(api::handlers::records::update_record).delete(api::handlers::records::delete_record),
        )
        .route_layer(from_fn_with_state(state.clone(), authorization_gate))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/login", post(api::handlers::auth::login))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .with_state(state.clone())
        .merge(record_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    // Tracing wraps CORS so rejected preflights are still logged
    let router = router.layer(
        ServiceBuilder::new()
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_request(DefaultOnRequest::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(create_cors_layer(&state.config)?),
    );

    Ok(router)
}

/// The assembled server: storage, state, and router.
///
/// 1. **Create**: [`Application::new`] opens storage, runs migrations and seeds the operator
/// 2. **Serve**: [`Application::serve`] binds to the configured address and handles requests
/// 3. **Shutdown**: when the shutdown future resolves, in-flight requests finish and storage closes
pub struct Application {
    router: Router,
    store: Arc<dyn Store>,
    config: Config,
}

impl Application {
    /// Create a new application instance with storage chosen from configuration
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = create_store(&config.database).await?;
        Self::new_with_store(config, store).await
    }

    /// Create an application on top of an existing store
    pub async fn new_with_store(config: Config, store: Arc<dyn Store>) -> anyhow::Result<Self> {
        debug!("Starting crudctl with host {} and port {}", config.host, config.port);

        match config.admin_password.as_deref() {
            Some(password) => {
                create_initial_admin_user(&config.admin_username, password, store.as_ref()).await?;
            }
            None => warn!("admin_password is not set; operator accounts must be seeded with --seed-admin"),
        }

        let app_state = AppState::builder().store(store.clone()).config(config.clone()).build();
        let router = build_router(&app_state)?;

        Ok(Self { router, store, config })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("crudctl listening on http://{}, available at http://localhost:{}", bind_addr, self.config.port);

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing storage...");
        self.store.close().await;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        api::models::{
            auth::{LoginRequest, LoginResponse},
            records::{RecordCreatedResponse, RecordResponse},
        },
        db::MemoryStore,
        test_utils::create_test_config,
    };
    use axum::http::StatusCode;
    use serde_json::json;

    async fn create_test_application() -> Application {
        // Seed through the startup path, as a deployment would
        let config = Config {
            admin_password: Some("admin123".to_string()),
            ..create_test_config()
        };
        Application::new_with_store(config, Arc::new(MemoryStore::new())).await.unwrap()
    }

    #[test_log::test(tokio::test)]
    async fn test_healthz_and_docs_are_public() {
        let server = create_test_application().await.into_test_server();

        let response = server.get("/healthz").await;
        response.assert_status_ok();
        response.assert_text("OK");

        let response = server.get("/openapi.json").await;
        response.assert_status_ok();
        assert!(response.text().contains("\"openapi\""));

        server.get("/docs").await.assert_status_ok();
    }

    #[test_log::test(tokio::test)]
    async fn test_create_initial_admin_user_is_idempotent() {
        let store = MemoryStore::new();

        let first = create_initial_admin_user("admin", "admin123", &store).await.unwrap();
        let second = create_initial_admin_user("admin", "different", &store).await.unwrap();

        let AdminSeed::Created(id) = first else {
            panic!("expected a new operator, got {first:?}");
        };
        assert_eq!(second, AdminSeed::AlreadyExists(id));

        // The original password still works
        let stored = store.get_credential_by_username("admin").await.unwrap().unwrap();
        assert!(password::verify_string("admin123", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_seed_admin_account_rejects_memory_store() {
        let config = Config {
            admin_password: Some("admin123".to_string()),
            ..create_test_config()
        };
        assert!(matches!(config.database, DatabaseConfig::Memory));

        let err = seed_admin_account(&config).await.unwrap_err();
        assert!(err.to_string().contains("requires an external database"), "{err}");
    }

    #[test_log::test(tokio::test)]
    async fn test_cors_preflight_for_configured_origin() {
        let server = create_test_application().await.into_test_server();

        let response = server
            .method(Method::OPTIONS, "/users")
            .add_header(http::header::ORIGIN, HeaderValue::from_static("http://localhost:5173"))
            .add_header(http::header::ACCESS_CONTROL_REQUEST_METHOD, HeaderValue::from_static("PATCH"))
            .await;

        let allowed = response.header(http::header::ACCESS_CONTROL_ALLOW_ORIGIN);
        assert_eq!(allowed, "http://localhost:5173");
    }

    #[test]
    fn test_wildcard_cors_origin_builds() {
        let mut config = create_test_config();
        config.auth.security.cors.allowed_origins = vec![CorsOrigin::Wildcard];
        assert!(create_cors_layer(&config).is_ok());
    }

    /// Seed, log in, create, list, update, list, delete, list.
    #[test_log::test(tokio::test)]
    async fn test_operator_scenario_end_to_end() {
        let server = create_test_application().await.into_test_server();

        let login = server.post("/login").json(&LoginRequest::new("admin", "admin123")).await;
        login.assert_status_ok();
        let token = login.json::<LoginResponse>().token;

        let created = server
            .post("/users")
            .authorization_bearer(&token)
            .json(&json!({"name": "Ana", "age": 30, "city": "Lima"}))
            .await;
        created.assert_status_ok();
        let id = created.json::<RecordCreatedResponse>().id;

        let records: Vec<RecordResponse> = server.get("/users").authorization_bearer(&token).await.json();
        assert_eq!(records.len(), 1);
        assert_eq!((records[0].id, records[0].name.as_str(), records[0].age), (id, "Ana", 30));

        server
            .patch(&format!("/users/{id}"))
            .authorization_bearer(&token)
            .json(&json!({"name": "Ana", "age": 31, "city": "Lima"}))
            .await
            .assert_status_ok();

        let records: Vec<RecordResponse> = server.get("/users").authorization_bearer(&token).await.json();
        assert_eq!(records[0].age, 31);

        let remaining: Vec<RecordResponse> = server.delete(&format!("/users/{id}")).authorization_bearer(&token).await.json();
        assert!(remaining.iter().all(|r| r.id != id));

        let records: Vec<RecordResponse> = server.get("/users").authorization_bearer(&token).await.json();
        assert!(records.is_empty());

        // Logged out clients are turned away
        server.get("/users").await.assert_status(StatusCode::UNAUTHORIZED);
    }
}
