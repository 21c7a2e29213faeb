//! Roster intake endpoints. Every accepted change publishes a new roster
//! version, which triggers an evaluation pass.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::PatientSnapshot;
use crate::roster::decode_records;

#[derive(Serialize)]
pub struct RosterResponse {
    pub patients: Vec<PatientSnapshot>,
}

#[derive(Serialize)]
pub struct ReplaceResponse {
    pub accepted: usize,
    pub skipped: usize,
}

#[derive(Serialize)]
pub struct UpsertResponse {
    pub patient_id: String,
    pub inserted: bool,
}

#[derive(Serialize)]
pub struct RemoveResponse {
    pub patient_id: String,
    pub removed: bool,
}

/// `GET /api/roster`
pub async fn current(State(ctx): State<ApiContext>) -> Json<RosterResponse> {
    Json(RosterResponse {
        patients: ctx.core.current_roster().to_vec(),
    })
}

/// `PUT /api/roster`: replace the roster. Records that do not decode are
/// skipped and counted; the rest are accepted.
pub async fn replace(
    State(ctx): State<ApiContext>,
    Json(records): Json<Vec<serde_json::Value>>,
) -> Json<ReplaceResponse> {
    let (patients, skipped) = decode_records(records);
    let accepted = ctx.core.replace_roster(patients);
    Json(ReplaceResponse { accepted, skipped })
}

/// `POST /api/roster/patients`: insert or replace one patient by id.
pub async fn upsert(
    State(ctx): State<ApiContext>,
    Json(patient): Json<PatientSnapshot>,
) -> Result<(StatusCode, Json<UpsertResponse>), ApiError> {
    if !patient.has_identity() {
        return Err(ApiError::BadRequest("Patient id and name are required".into()));
    }

    let patient_id = patient.id.clone();
    let inserted = ctx.core.upsert_patient(patient);
    let status = if inserted {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(UpsertResponse { patient_id, inserted })))
}

/// `DELETE /api/roster/patients/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
) -> Result<Json<RemoveResponse>, ApiError> {
    if !ctx.core.remove_patient(&patient_id) {
        return Err(ApiError::NotFound(format!("Patient {patient_id}")));
    }
    Ok(Json(RemoveResponse {
        patient_id,
        removed: true,
    }))
}
