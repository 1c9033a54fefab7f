//! HTTP API layer.
//!
//! - [`handlers`]: axum route handlers
//! - [`models`]: request/response structures shared with the client

pub mod handlers;
pub mod models;
