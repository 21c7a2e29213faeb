//! Alert feed and acknowledgment endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::monitor::{Alert, AlertCounts, MonitorEngine};

#[derive(Debug, Default, Deserialize)]
pub struct AlertQuery {
    pub patient_id: Option<String>,
    #[serde(default)]
    pub unacknowledged: bool,
}

#[derive(Serialize)]
pub struct AlertsResponse {
    pub alerts: Vec<Alert>,
    pub counts: AlertCounts,
}

#[derive(Serialize)]
pub struct AcknowledgeResponse {
    pub alert_id: Uuid,
    pub acknowledged: bool,
}

#[derive(Serialize)]
pub struct AcknowledgeAllResponse {
    pub acknowledged: usize,
}

/// `GET /api/alerts`: history, most recent first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<AlertQuery>,
) -> Result<Json<AlertsResponse>, ApiError> {
    let engine = ctx.core.engine();

    let alerts = match (&query.patient_id, query.unacknowledged) {
        (Some(patient_id), unacknowledged) => engine
            .alerts_for_patient(patient_id)?
            .into_iter()
            .filter(|a| !unacknowledged || !a.acknowledged)
            .collect(),
        (None, true) => engine.unacknowledged_alerts()?,
        (None, false) => engine.alerts()?,
    };

    Ok(Json(AlertsResponse {
        alerts,
        counts: engine.counts()?,
    }))
}

/// `GET /api/alerts/counts`
pub async fn counts(State(ctx): State<ApiContext>) -> Result<Json<AlertCounts>, ApiError> {
    Ok(Json(ctx.core.engine().counts()?))
}

/// `POST /api/alerts/:id/acknowledge`: unknown or evicted ids are a no-op.
pub async fn acknowledge(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<AcknowledgeResponse>, ApiError> {
    let alert_id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::BadRequest(format!("Invalid alert id: {id}")))?;

    let acknowledged = ctx.core.engine().acknowledge(&alert_id)?;
    Ok(Json(AcknowledgeResponse {
        alert_id,
        acknowledged,
    }))
}

/// `POST /api/alerts/acknowledge-all`
pub async fn acknowledge_all(
    State(ctx): State<ApiContext>,
) -> Result<Json<AcknowledgeAllResponse>, ApiError> {
    let acknowledged = ctx.core.engine().acknowledge_all()?;
    Ok(Json(AcknowledgeAllResponse { acknowledged }))
}
