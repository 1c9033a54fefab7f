//! PostgreSQL repository implementations.
//!
//! Each repository wraps a SQLx connection (or transaction) and provides strongly-typed
//! operations returning models from [`crate::db::models`]:
//!
//! - [`Records`]: managed record CRUD, implementing [`Repository`]
//! - [`Credentials`]: operator account provisioning and lookup
//!
//! ```ignore
//! use crudctl::db::handlers::{Records, Repository};
//!
//! let mut conn = pool.acquire().await?;
//! let mut repo = Records::new(&mut conn);
//! let records = repo.list().await?;
//! ```

pub mod credentials;
pub mod records;
pub mod repository;

pub use credentials::Credentials;
pub use records::Records;
pub use repository::Repository;
