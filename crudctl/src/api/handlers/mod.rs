//! HTTP request handlers.
//!
//! - [`auth`]: `POST /login`
//! - [`records`]: `/users` CRUD, behind the authorization gate

pub mod auth;
pub mod records;
