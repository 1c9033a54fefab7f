//! Database models for records.

use crate::api::models::records::RecordFields;
use crate::types::RecordId;
use chrono::{DateTime, Utc};

/// Database request for creating a new record
#[derive(Debug, Clone)]
pub struct RecordCreateDBRequest {
    pub name: String,
    pub age: i32,
    pub city: String,
}

impl From<RecordFields> for RecordCreateDBRequest {
    fn from(fields: RecordFields) -> Self {
        Self {
            name: fields.name,
            age: fields.age,
            city: fields.city,
        }
    }
}

/// Database request for replacing a record's fields. All three fields are always written.
#[derive(Debug, Clone)]
pub struct RecordUpdateDBRequest {
    pub name: String,
    pub age: i32,
    pub city: String,
}

impl From<RecordFields> for RecordUpdateDBRequest {
    fn from(fields: RecordFields) -> Self {
        Self {
            name: fields.name,
            age: fields.age,
            city: fields.city,
        }
    }
}

/// Database response for a record
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDBResponse {
    pub id: RecordId,
    pub name: String,
    pub age: i32,
    pub city: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
