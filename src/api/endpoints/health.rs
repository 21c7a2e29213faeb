//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::monitor::{AlertCounts, EngineStatus, MonitorEngine};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub started_at: DateTime<Utc>,
    pub monitoring: bool,
    pub patients: usize,
    pub engine: EngineStatus,
    pub counts: AlertCounts,
}

/// `GET /api/health`: liveness plus a snapshot of engine state.
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    let engine = ctx.core.engine();

    Ok(Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        started_at: ctx.started_at,
        monitoring: ctx.core.is_monitoring().await,
        patients: ctx.core.current_roster().len(),
        engine: engine.status()?,
        counts: engine.counts()?,
    }))
}
