use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use uuid::Uuid;

use crate::{
    AppState,
    api::models::{
        auth::Operator,
        records::{MessageResponse, RecordCreatedResponse, RecordPayload, RecordResponse},
    },
    db::{
        errors::DbError,
        models::records::{RecordCreateDBRequest, RecordUpdateDBRequest},
    },
    errors::{Error, Result},
    types::{RecordId, abbrev_uuid},
};

fn parse_body(body: std::result::Result<Json<RecordPayload>, JsonRejection>) -> Result<RecordPayload> {
    body.map(|Json(payload)| payload).map_err(|e| Error::BadRequest {
        message: format!("Invalid request body: {}", e.body_text()),
    })
}

fn record_not_found(id: &str) -> Error {
    Error::NotFound {
        resource: "Record".to_string(),
        id: id.to_string(),
    }
}

/// List all records in insertion order
#[utoipa::path(
    get,
    path = "/users",
    tag = "records",
    responses(
        (status = 200, description = "All records", body = [RecordResponse]),
        (status = 401, description = "Missing or invalid access token"),
        (status = 500, description = "Internal server error"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(operator = %operator.username))]
pub async fn list_records(State(state): State<AppState>, operator: Operator) -> Result<Json<Vec<RecordResponse>>> {
    let records = state.store.list_records().await?;
    Ok(Json(records.into_iter().map(RecordResponse::from).collect()))
}

/// Create a record
#[utoipa::path(
    post,
    path = "/users",
    request_body = RecordPayload,
    tag = "records",
    responses(
        (status = 200, description = "Record created", body = RecordCreatedResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Missing or invalid access token"),
        (status = 500, description = "Internal server error"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(operator = %operator.username))]
pub async fn create_record(
    State(state): State<AppState>,
    operator: Operator,
    body: std::result::Result<Json<RecordPayload>, JsonRejection>,
) -> Result<Json<RecordCreatedResponse>> {
    let fields = parse_body(body)?.validate()?;

    let record = state.store.create_record(&RecordCreateDBRequest::from(fields)).await?;
    tracing::info!("Created record {}", abbrev_uuid(&record.id));

    Ok(Json(RecordCreatedResponse {
        message: "Record added successfully".to_string(),
        id: record.id,
    }))
}

/// Replace all fields of a record
#[utoipa::path(
    patch,
    path = "/users/{id}",
    request_body = RecordPayload,
    tag = "records",
    params(
        ("id" = String, Path, description = "Record ID"),
    ),
    responses(
        (status = 200, description = "Record updated", body = MessageResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Missing or invalid access token"),
        (status = 404, description = "Record not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(operator = %operator.username, record_id = %id))]
pub async fn update_record(
    State(state): State<AppState>,
    operator: Operator,
    Path(id): Path<String>,
    body: std::result::Result<Json<RecordPayload>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    // Field validation comes before the id lookup
    let fields = parse_body(body)?.validate()?;
    let record_id: RecordId = Uuid::parse_str(&id).map_err(|_| record_not_found(&id))?;

    match state.store.update_record(record_id, &RecordUpdateDBRequest::from(fields)).await {
        Ok(record) => {
            tracing::info!("Updated record {}", abbrev_uuid(&record.id));
            Ok(Json(MessageResponse {
                message: "Record updated successfully".to_string(),
            }))
        }
        Err(DbError::NotFound) => Err(record_not_found(&id)),
        Err(e) => Err(e.into()),
    }
}

/// Delete a record and return the remaining records
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "records",
    params(
        ("id" = String, Path, description = "Record ID"),
    ),
    responses(
        (status = 200, description = "Remaining records after the deletion", body = [RecordResponse]),
        (status = 401, description = "Missing or invalid access token"),
        (status = 500, description = "Internal server error"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(operator = %operator.username, record_id = %id))]
pub async fn delete_record(
    State(state): State<AppState>,
    operator: Operator,
    Path(id): Path<String>,
) -> Result<Json<Vec<RecordResponse>>> {
    // Unknown and unparseable ids are both a no-op
    match Uuid::parse_str(&id) {
        Ok(record_id) => {
            if state.store.delete_record(record_id).await? {
                tracing::info!("Deleted record {}", abbrev_uuid(&record_id));
            } else {
                tracing::debug!("Delete of absent record {}", abbrev_uuid(&record_id));
            }
        }
        Err(_) => tracing::debug!("Delete with unparseable record id"),
    }

    let records = state.store.list_records().await?;
    Ok(Json(records.into_iter().map(RecordResponse::from).collect()))
}
