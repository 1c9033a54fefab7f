//! Identifier aliases shared by the API, storage, and client layers.
//!
//! All entity IDs are UUIDs wrapped in type aliases:
//!
//! - [`RecordId`]: managed record identifier (serialized as `_id` on the wire)
//! - [`CredentialId`]: operator account identifier (the `sub` claim of access tokens)

use uuid::Uuid;

pub type RecordId = Uuid;
pub type CredentialId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}
