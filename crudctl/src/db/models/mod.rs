//! Storage-level request and response structures.
//!
//! These types sit between the API models in [`crate::api::models`] and the
//! backends behind [`crate::db::Store`]. They carry server-side bookkeeping
//! (timestamps, password hashes) that never crosses the HTTP boundary.

pub mod credentials;
pub mod records;
