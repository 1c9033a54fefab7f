//! API request/response models for records.

use crate::db::models::records::RecordDBResponse;
use crate::errors::{Error, MISSING_FIELDS_MESSAGE};
use crate::types::RecordId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

// Record response model. The id goes over the wire as `_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecordResponse {
    #[serde(rename = "_id")]
    #[schema(value_type = String, format = "uuid")]
    pub id: RecordId,
    pub name: String,
    pub age: i32,
    pub city: String,
}

impl From<RecordDBResponse> for RecordResponse {
    fn from(db: RecordDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            age: db.age,
            city: db.city,
        }
    }
}

impl RecordResponse {
    /// Build a record from an id and a full set of fields
    pub fn with_fields(id: RecordId, fields: RecordFields) -> Self {
        Self {
            id,
            name: fields.name,
            age: fields.age,
            city: fields.city,
        }
    }
}

/// A complete, validated set of record fields. Create and update both require all three.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecordFields {
    pub name: String,
    pub age: i32,
    pub city: String,
}

/// Request body for create and update.
///
/// Every field is optional at the parsing stage so that a missing field surfaces as a
/// validation error rather than a deserialization failure. `age` accepts a JSON number or a
/// numeric string.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RecordPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<i32>)]
    pub age: Option<Value>,
    #[serde(default)]
    pub city: Option<String>,
}

impl RecordPayload {
    /// Check that all three fields are present and usable
    pub fn validate(self) -> Result<RecordFields, Error> {
        let missing = || Error::BadRequest {
            message: MISSING_FIELDS_MESSAGE.to_string(),
        };

        let name = self.name.filter(|n| !n.trim().is_empty()).ok_or_else(missing)?;
        let city = self.city.filter(|c| !c.trim().is_empty()).ok_or_else(missing)?;
        let age = match self.age {
            None | Some(Value::Null) => return Err(missing()),
            Some(Value::String(s)) if s.trim().is_empty() => return Err(missing()),
            Some(value) => parse_age(&value)?,
        };

        Ok(RecordFields { name, age, city })
    }
}

fn parse_age(value: &Value) -> Result<i32, Error> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    parsed
        .filter(|age| *age > 0)
        .and_then(|age| i32::try_from(age).ok())
        .ok_or_else(|| Error::BadRequest {
            message: "Age must be a positive whole number".to_string(),
        })
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordCreatedResponse {
    pub message: String,
    #[serde(rename = "_id")]
    #[schema(value_type = String, format = "uuid")]
    pub id: RecordId,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
