//! Client application for the record API.
//!
//! The client is split into a pure core and a thin runtime:
//!
//! - [`state`]: serializable view state and the `update(state, event) -> (state, effects)`
//!   transition function. No I/O.
//! - [`session`]: runs effects against the server and a [`session::Frontend`], feeding results
//!   back into [`state::update`] as events
//! - [`api`]: reqwest implementation of the REST contract
//! - [`token_store`]: where the access token lives between runs

pub mod api;
pub mod session;
pub mod state;
pub mod token_store;

use reqwest::StatusCode;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum ClientError {
    /// The request never produced a response (connection refused, DNS, TLS, ...)
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("server responded {status}: {message}")]
    Api { status: StatusCode, message: String },

    /// An endpoint URL could not be built from the base URL
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Reading or writing the persisted token failed
    #[error("token store: {0}")]
    TokenStore(#[from] std::io::Error),

    /// Persisted token file exists but is not a JSON object of strings
    #[error("token store is corrupt: {0}")]
    CorruptTokenStore(#[from] serde_json::Error),

    /// An authenticated call was attempted with no stored token
    #[error("not logged in")]
    NotLoggedIn,
}

impl ClientError {
    /// HTTP status of a server-side failure, if there was a response
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// True when the server rejected the access token, or there was none to send
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::NotLoggedIn) || self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
