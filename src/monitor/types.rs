use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Direction, FindingCategory, PatientSnapshot, Severity, VitalParameter};

use super::notify::MonitorEvent;

// ---------------------------------------------------------------------------
// Finding
// ---------------------------------------------------------------------------

/// One detected condition, produced fresh on every evaluation pass and
/// never stored. Approved findings become [`Alert`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub patient_id: String,
    pub patient_name: String,
    pub category: FindingCategory,
    pub severity: Severity,
    /// Suppression key component: `heart_rate`, `spo2-trend`, `lab:potassium`, ...
    pub parameter_key: String,
    pub message: String,
    pub direction: Option<Direction>,
    /// Measured value (or delta, for trends) that triggered the finding.
    pub value: Option<f64>,
    /// Threshold the value crossed.
    pub threshold: Option<f64>,
}

impl Finding {
    /// Composite deduplication key: `patient_id:parameter_key`.
    pub fn suppression_key(&self) -> String {
        format!("{}:{}", self.patient_id, self.parameter_key)
    }
}

// ---------------------------------------------------------------------------
// Alert
// ---------------------------------------------------------------------------

/// Session-lifetime, acknowledgeable notification exposed to consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub patient_id: String,
    pub patient_name: String,
    pub severity: Severity,
    pub category: FindingCategory,
    pub parameter_key: String,
    pub message: String,
    pub direction: Option<Direction>,
    pub value: Option<f64>,
    pub threshold: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub acknowledged: bool,
    pub acknowledged_at: Option<DateTime<Utc>>,
}

impl Alert {
    pub fn from_finding(finding: Finding, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id: finding.patient_id,
            patient_name: finding.patient_name,
            severity: finding.severity,
            category: finding.category,
            parameter_key: finding.parameter_key,
            message: finding.message,
            direction: finding.direction,
            value: finding.value,
            threshold: finding.threshold,
            created_at,
            acknowledged: false,
            acknowledged_at: None,
        }
    }
}

// ---------------------------------------------------------------------------
// AlertCounts
// ---------------------------------------------------------------------------

/// Badge counts derived from the current alert list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertCounts {
    pub critical: usize,
    pub warning: usize,
    pub total_unacknowledged: usize,
}

impl AlertCounts {
    pub fn from_alerts<'a>(alerts: impl IntoIterator<Item = &'a Alert>) -> Self {
        alerts.into_iter().fold(Self::default(), |mut counts, alert| {
            match alert.severity {
                Severity::Critical => counts.critical += 1,
                Severity::Warning => counts.warning += 1,
            }
            if !alert.acknowledged {
                counts.total_unacknowledged += 1;
            }
            counts
        })
    }

    pub fn total(&self) -> usize {
        self.critical + self.warning
    }
}

// ---------------------------------------------------------------------------
// Pass summary & engine status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub evaluated_at: DateTime<Utc>,
    pub patients_evaluated: usize,
    pub patients_skipped: usize,
    pub findings: usize,
    pub suppressed: usize,
    pub new_alerts: Vec<Alert>,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnginePhase {
    Idle,
    Evaluating,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub phase: EnginePhase,
    pub passes: u64,
    pub last_pass_at: Option<DateTime<Utc>>,
    pub last_pass_ms: Option<u64>,
    pub last_skipped: usize,
    pub alert_capacity: usize,
}

// ---------------------------------------------------------------------------
// MonitorError
// ---------------------------------------------------------------------------

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MonitorError {
    #[error("Malformed patient snapshot: {reason}")]
    MalformedSnapshot { reason: String },

    #[error("Invalid {parameter} measurement for patient {patient_id}")]
    InvalidMeasurement {
        patient_id: String,
        parameter: VitalParameter,
    },

    #[error("Internal lock failed")]
    LockFailed,
}

// ---------------------------------------------------------------------------
// MonitorEngine trait
// ---------------------------------------------------------------------------

/// The deterioration monitor as seen by feeds and consumers.
pub trait MonitorEngine {
    /// Run one evaluation pass over the roster using the current time.
    fn evaluate(&self, roster: &[PatientSnapshot]) -> Result<EvaluationSummary, MonitorError> {
        self.evaluate_at(roster, Utc::now())
    }

    /// Run one evaluation pass with an explicit clock reading.
    fn evaluate_at(
        &self,
        roster: &[PatientSnapshot],
        now: DateTime<Utc>,
    ) -> Result<EvaluationSummary, MonitorError>;

    /// Alert history, most recent first.
    fn alerts(&self) -> Result<Vec<Alert>, MonitorError>;

    fn counts(&self) -> Result<AlertCounts, MonitorError>;

    /// Acknowledge one alert. Unknown or already-acknowledged ids are a
    /// no-op and return `Ok(false)`.
    fn acknowledge(&self, alert_id: &Uuid) -> Result<bool, MonitorError>;

    /// Acknowledge every unacknowledged alert. Returns how many changed.
    fn acknowledge_all(&self) -> Result<usize, MonitorError>;

    /// Push channel for newly raised alerts and acknowledgments.
    fn subscribe(&self) -> tokio::sync::broadcast::Receiver<MonitorEvent>;

    fn status(&self) -> Result<EngineStatus, MonitorError>;
}
