//! Authentication and authorization.
//!
//! Operators log in with a username and password via `POST /login` and receive a signed,
//! time-limited access token. Every record endpoint sits behind
//! [`middleware::authorization_gate`], which requires `Authorization: Bearer <token>`.
//!
//! # Modules
//!
//! - [`current_user`]: The [`Operator`](crate::api::models::auth::Operator) extractor
//! - [`middleware`]: Route protection middleware
//! - [`password`]: Password hashing and verification using Argon2
//! - [`session`]: Access token issuance and verification

pub mod current_user;
pub mod middleware;
pub mod password;
pub mod session;
