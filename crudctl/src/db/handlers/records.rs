//! Database repository for records.

use crate::types::{RecordId, abbrev_uuid};
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::records::{RecordCreateDBRequest, RecordDBResponse, RecordUpdateDBRequest},
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;
use uuid::Uuid;

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Record {
    pub id: RecordId,
    pub name: String,
    pub age: i32,
    pub city: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Record> for RecordDBResponse {
    fn from(record: Record) -> Self {
        Self {
            id: record.id,
            name: record.name,
            age: record.age,
            city: record.city,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

pub struct Records<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Records<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Records<'c> {
    type CreateRequest = RecordCreateDBRequest;
    type UpdateRequest = RecordUpdateDBRequest;
    type Response = RecordDBResponse;
    type Id = RecordId;

    #[instrument(skip(self, request), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        // Always generate a new ID for records
        let record_id = Uuid::new_v4();

        let record = sqlx::query_as::<_, Record>(
            r#"
            INSERT INTO records (id, name, age, city)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, age, city, created_at, updated_at
            "#,
        )
        .bind(record_id)
        .bind(&request.name)
        .bind(request.age)
        .bind(&request.city)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(record.into())
    }

    #[instrument(skip(self), fields(record_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let record = sqlx::query_as::<_, Record>("SELECT id, name, age, city, created_at, updated_at FROM records WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(record.map(Into::into))
    }

    #[instrument(skip(self), err)]
    async fn list(&mut self) -> Result<Vec<Self::Response>> {
        let records = sqlx::query_as::<_, Record>("SELECT id, name, age, city, created_at, updated_at FROM records ORDER BY seq ASC")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), fields(record_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM records WHERE id = $1").bind(id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(record_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let record = sqlx::query_as::<_, Record>(
            r#"
            UPDATE records
            SET name = $2, age = $3, city = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, age, city, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(request.age)
        .bind(&request.city)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(record.into())
    }
}
