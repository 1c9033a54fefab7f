//! PostgreSQL-backed [`Store`].

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::{info, instrument};

use crate::{
    config::PoolSettings,
    db::{
        errors::{DbError, Result},
        handlers::{Credentials, Records, Repository},
        models::{
            credentials::{CredentialCreateDBRequest, CredentialDBResponse},
            records::{RecordCreateDBRequest, RecordDBResponse, RecordUpdateDBRequest},
        },
        store::Store,
    },
    migrator,
    types::RecordId,
};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool. Migrations are not run.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect with the given pool settings and run the bundled migrations
    #[instrument(skip_all)]
    pub async fn connect(url: &str, settings: &PoolSettings) -> Result<Self> {
        let mut options = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs));

        if settings.idle_timeout_secs > 0 {
            options = options.idle_timeout(Duration::from_secs(settings.idle_timeout_secs));
        }
        if settings.max_lifetime_secs > 0 {
            options = options.max_lifetime(Duration::from_secs(settings.max_lifetime_secs));
        }

        let pool = options.connect(url).await?;
        migrator().run(&pool).await?;
        info!("Connected to PostgreSQL and applied migrations");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_records(&self) -> Result<Vec<RecordDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Records::new(&mut conn).list().await
    }

    async fn create_record(&self, request: &RecordCreateDBRequest) -> Result<RecordDBResponse> {
        let mut conn = self.pool.acquire().await?;
        Records::new(&mut conn).create(request).await
    }

    async fn update_record(&self, id: RecordId, request: &RecordUpdateDBRequest) -> Result<RecordDBResponse> {
        let mut conn = self.pool.acquire().await?;
        Records::new(&mut conn).update(id, request).await
    }

    async fn delete_record(&self, id: RecordId) -> Result<bool> {
        let mut conn = self.pool.acquire().await?;
        Records::new(&mut conn).delete(id).await
    }

    async fn get_credential_by_username(&self, username: &str) -> Result<Option<CredentialDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Credentials::new(&mut conn).get_by_username(username).await
    }

    async fn create_credential(&self, request: &CredentialCreateDBRequest) -> Result<CredentialDBResponse> {
        let mut tx = self.pool.begin().await?;
        let credential = Credentials::new(&mut tx).create(request).await?;
        tx.commit().await.map_err(DbError::from)?;
        Ok(credential)
    }

    async fn close(&self) {
        info!("Closing database connections...");
        self.pool.close().await;
    }
}
