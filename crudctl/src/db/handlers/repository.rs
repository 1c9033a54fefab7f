//! Base repository trait for database operations.

/// Contains the Repository trait.
///
/// A repository is a data access layer for a single postgres table. It provides methods for
/// creating, reading, updating, deleting and listing entities.
use crate::db::errors::Result;

/// Base repository trait providing common database operations
///
/// This trait has separate associated types for create requests, update requests, and responses.
#[async_trait::async_trait]
pub trait Repository {
    /// The request type for creating entities
    type CreateRequest;

    /// The request type for updating entities
    type UpdateRequest;

    /// The response/DTO type returned by operations
    type Response;

    /// The identifier type for lookups
    type Id: Send + Sync;

    /// Create a new entity
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response>;

    /// Get an entity by ID
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>>;

    /// List every entity in storage order
    async fn list(&mut self) -> Result<Vec<Self::Response>>;

    /// Delete an entity by ID, returning whether a row was removed
    async fn delete(&mut self, id: Self::Id) -> Result<bool>;

    /// Update an entity by ID. Fails with [`crate::db::errors::DbError::NotFound`] if absent.
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response>;
}
