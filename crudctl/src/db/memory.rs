//! In-process [`Store`] for development and tests.
//!
//! Records keep insertion order. All access is serialized through a single
//! [`tokio::sync::RwLock`].

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::{
        errors::{DbError, Result},
        models::{
            credentials::{CredentialCreateDBRequest, CredentialDBResponse},
            records::{RecordCreateDBRequest, RecordDBResponse, RecordUpdateDBRequest},
        },
        store::Store,
    },
    types::{RecordId, abbrev_uuid},
};

#[derive(Default)]
struct Collections {
    records: Vec<RecordDBResponse>,
    credentials: Vec<CredentialDBResponse>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_records(&self) -> Result<Vec<RecordDBResponse>> {
        Ok(self.inner.read().await.records.clone())
    }

    #[instrument(skip_all, err)]
    async fn create_record(&self, request: &RecordCreateDBRequest) -> Result<RecordDBResponse> {
        let now = Utc::now();
        let record = RecordDBResponse {
            id: Uuid::new_v4(),
            name: request.name.clone(),
            age: request.age,
            city: request.city.clone(),
            created_at: now,
            updated_at: now,
        };

        self.inner.write().await.records.push(record.clone());
        Ok(record)
    }

    #[instrument(skip(self, request), fields(record_id = %abbrev_uuid(&id)), err)]
    async fn update_record(&self, id: RecordId, request: &RecordUpdateDBRequest) -> Result<RecordDBResponse> {
        let mut inner = self.inner.write().await;
        let record = inner.records.iter_mut().find(|r| r.id == id).ok_or(DbError::NotFound)?;

        record.name = request.name.clone();
        record.age = request.age;
        record.city = request.city.clone();
        record.updated_at = Utc::now();

        Ok(record.clone())
    }

    #[instrument(skip(self), fields(record_id = %abbrev_uuid(&id)), err)]
    async fn delete_record(&self, id: RecordId) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.records.len();
        inner.records.retain(|r| r.id != id);
        Ok(inner.records.len() < before)
    }

    async fn get_credential_by_username(&self, username: &str) -> Result<Option<CredentialDBResponse>> {
        Ok(self
            .inner
            .read()
            .await
            .credentials
            .iter()
            .find(|c| c.username == username)
            .cloned())
    }

    #[instrument(skip_all, fields(username = %request.username), err)]
    async fn create_credential(&self, request: &CredentialCreateDBRequest) -> Result<CredentialDBResponse> {
        let mut inner = self.inner.write().await;
        if inner.credentials.iter().any(|c| c.username == request.username) {
            return Err(DbError::UniqueViolation {
                constraint: Some("credentials_username_unique".to_string()),
                table: Some("credentials".to_string()),
                message: format!("username {} already exists", request.username),
            });
        }

        let credential = CredentialDBResponse {
            id: Uuid::new_v4(),
            username: request.username.clone(),
            password_hash: request.password_hash.clone(),
            created_at: Utc::now(),
        };
        inner.credentials.push(credential.clone());
        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request(name: &str, age: i32, city: &str) -> RecordCreateDBRequest {
        RecordCreateDBRequest {
            name: name.to_string(),
            age,
            city: city.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_unique_ids_in_insertion_order() {
        let store = MemoryStore::new();
        let first = store.create_record(&create_request("Ana", 30, "Lima")).await.unwrap();
        let second = store.create_record(&create_request("Ana", 30, "Lima")).await.unwrap();

        assert_ne!(first.id, second.id);
        let ids: Vec<_> = store.list_records().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn test_update_touches_only_the_target() {
        let store = MemoryStore::new();
        let target = store.create_record(&create_request("Ana", 30, "Lima")).await.unwrap();
        let other = store.create_record(&create_request("Bruno", 41, "Quito")).await.unwrap();

        store
            .update_record(
                target.id,
                &RecordUpdateDBRequest {
                    name: "Ana".to_string(),
                    age: 31,
                    city: "Lima".to_string(),
                },
            )
            .await
            .unwrap();

        let records = store.list_records().await.unwrap();
        assert_eq!(records[0].age, 31);
        assert_eq!(records[1], other);
    }

    #[tokio::test]
    async fn test_update_unknown_id_leaves_storage_unchanged() {
        let store = MemoryStore::new();
        let existing = store.create_record(&create_request("Ana", 30, "Lima")).await.unwrap();

        let result = store
            .update_record(
                Uuid::new_v4(),
                &RecordUpdateDBRequest {
                    name: "Ghost".to_string(),
                    age: 1,
                    city: "Nowhere".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(DbError::NotFound)));
        assert_eq!(store.list_records().await.unwrap(), vec![existing]);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        let record = store.create_record(&create_request("Ana", 30, "Lima")).await.unwrap();

        assert!(store.delete_record(record.id).await.unwrap());
        assert!(!store.delete_record(record.id).await.unwrap());
        assert!(store.list_records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = MemoryStore::new();
        let request = CredentialCreateDBRequest {
            username: "admin".to_string(),
            password_hash: "hash".to_string(),
        };

        store.create_credential(&request).await.unwrap();
        let duplicate = store.create_credential(&request).await;

        assert!(matches!(duplicate, Err(DbError::UniqueViolation { .. })));
        assert!(store.get_credential_by_username("admin").await.unwrap().is_some());
        assert!(store.get_credential_by_username("nobody").await.unwrap().is_none());
    }
}
