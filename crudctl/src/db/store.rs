//! Storage backend abstraction.
//!
//! Handlers never talk to a connection pool directly; they go through the [`Store`] trait so
//! the same API can be served from PostgreSQL or from the in-process memory store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    config::DatabaseConfig,
    db::{
        errors::Result,
        memory::MemoryStore,
        models::{
            credentials::{CredentialCreateDBRequest, CredentialDBResponse},
            records::{RecordCreateDBRequest, RecordDBResponse, RecordUpdateDBRequest},
        },
        postgres::PgStore,
    },
    types::RecordId,
};

/// Create a storage backend from configuration
///
/// This is the single point where database configuration becomes a store instance.
pub async fn create_store(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn Store>> {
    match config {
        DatabaseConfig::Memory => {
            tracing::warn!("Using in-memory storage: records and credentials are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        DatabaseConfig::External { url, pool } => Ok(Arc::new(PgStore::connect(url, pool).await?)),
    }
}

/// Persistent collections backing the API: the record store and the credential store.
///
/// Implementations provide their own consistency; no additional locking or conflict
/// detection is layered on top, so concurrent updates are last-write-wins.
#[async_trait]
pub trait Store: Send + Sync {
    /// All records in storage order
    async fn list_records(&self) -> Result<Vec<RecordDBResponse>>;

    /// Persist a new record under a freshly generated id
    async fn create_record(&self, request: &RecordCreateDBRequest) -> Result<RecordDBResponse>;

    /// Replace all fields of an existing record.
    ///
    /// Returns [`crate::db::errors::DbError::NotFound`] if the id is unknown.
    async fn update_record(&self, id: RecordId, request: &RecordUpdateDBRequest) -> Result<RecordDBResponse>;

    /// Remove a record, returning whether it existed
    async fn delete_record(&self, id: RecordId) -> Result<bool>;

    /// Look up an operator account by username
    async fn get_credential_by_username(&self, username: &str) -> Result<Option<CredentialDBResponse>>;

    /// Provision an operator account.
    ///
    /// Returns [`crate::db::errors::DbError::UniqueViolation`] if the username is taken.
    async fn create_credential(&self, request: &CredentialCreateDBRequest) -> Result<CredentialDBResponse>;

    /// Release any held resources (connection pools)
    async fn close(&self) {}
}
