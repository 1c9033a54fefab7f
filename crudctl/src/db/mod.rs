//! Storage layer for records and operator credentials.
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (API request handlers)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │    Store    │  (trait object chosen from config)
//! └──────┬──────┘
//!        │
//!   ┌────┴──────────────┐
//!   ↓                   ↓
//! ┌─────────────┐  ┌─────────────┐
//! │ Repositories│  │ MemoryStore │
//! └──────┬──────┘  └─────────────┘
//!        ↓
//! ┌─────────────┐
//! │  PostgreSQL │
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`store`]: the [`Store`] trait and [`create_store`]
//! - [`postgres`]: PostgreSQL backend built on the repositories in [`handlers`]
//! - [`memory`]: in-process backend for development and tests
//! - [`models`]: storage request/response structures
//! - [`errors`]: storage error type
//!
//! # Migrations
//!
//! Migrations live in `crudctl/migrations/` and are applied by [`postgres::PgStore::connect`]
//! through [`crate::migrator`].

pub mod errors;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{Store, create_store};
