//! Database repository for operator credentials.
//!
//! Credentials are provisioned by the seeding step and looked up on login; there is no
//! update or delete path, so this repository does not implement [`super::Repository`].

use crate::db::{
    errors::Result,
    models::credentials::{CredentialCreateDBRequest, CredentialDBResponse},
};
use crate::types::CredentialId;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;
use uuid::Uuid;

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Credential {
    pub id: CredentialId,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<Credential> for CredentialDBResponse {
    fn from(credential: Credential) -> Self {
        Self {
            id: credential.id,
            username: credential.username,
            password_hash: credential.password_hash,
            created_at: credential.created_at,
        }
    }
}

pub struct Credentials<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Credentials<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(username = %request.username), err)]
    pub async fn create(&mut self, request: &CredentialCreateDBRequest) -> Result<CredentialDBResponse> {
        let credential = sqlx::query_as::<_, Credential>(
            r#"
            INSERT INTO credentials (id, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.username)
        .bind(&request.password_hash)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(credential.into())
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_username(&mut self, username: &str) -> Result<Option<CredentialDBResponse>> {
        let credential =
            sqlx::query_as::<_, Credential>("SELECT id, username, password_hash, created_at FROM credentials WHERE username = $1")
                .bind(username)
                .fetch_optional(&mut *self.db)
                .await?;

        Ok(credential.map(Into::into))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::errors::DbError;
    use sqlx::PgPool;

    #[sqlx::test]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_username_is_unique(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Credentials::new(&mut conn);

        let request = CredentialCreateDBRequest {
            username: "admin".to_string(),
            password_hash: "hash".to_string(),
        };
        let created = repo.create(&request).await.unwrap();
        assert_eq!(repo.get_by_username("admin").await.unwrap().unwrap().id, created.id);

        let duplicate = repo.create(&request).await;
        assert!(matches!(duplicate, Err(DbError::UniqueViolation { .. })));
    }

    #[sqlx::test]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_unknown_username_is_none(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Credentials::new(&mut conn);

        assert!(repo.get_by_username("nobody").await.unwrap().is_none());
    }
}
