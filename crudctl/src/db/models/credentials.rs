//! Database models for operator credentials.

use crate::types::CredentialId;
use chrono::{DateTime, Utc};

/// Database request for provisioning an operator account
#[derive(Debug, Clone)]
pub struct CredentialCreateDBRequest {
    pub username: String,
    pub password_hash: String,
}

/// Database response for an operator account
#[derive(Debug, Clone)]
pub struct CredentialDBResponse {
    pub id: CredentialId,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
