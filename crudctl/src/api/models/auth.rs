//! API request/response models for authentication.

use crate::types::CredentialId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Login request body. Fields are optional so a missing one is a validation error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

/// The authenticated operator, decoded from a valid access token.
///
/// Records are shared by all operators; the identity is only used for logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Operator {
    #[schema(value_type = String, format = "uuid")]
    pub id: CredentialId,
    pub username: String,
}
