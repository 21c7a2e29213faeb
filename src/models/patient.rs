use serde::{Deserialize, Serialize};

use super::enums::PatientStatus;
use super::lab::LabResult;
use super::vital_sign::{VitalRecord, VitalSigns};

/// Normalized, monitorable state of one patient as delivered by the roster
/// feed. Replaced wholesale on every update, never mutated by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientSnapshot {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: PatientStatus,
    #[serde(default)]
    pub vitals: VitalSigns,
    /// Prior vitals rounds, most recent first.
    #[serde(default)]
    pub history: Vec<VitalRecord>,
    #[serde(default)]
    pub labs: Vec<LabResult>,
}

impl PatientSnapshot {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_vitals(mut self, vitals: VitalSigns) -> Self {
        self.vitals = vitals;
        self
    }

    /// Push the current vitals into history and replace them, the way a
    /// new vitals round arrives from the feed.
    pub fn with_new_round(mut self, vitals: VitalSigns) -> Self {
        let previous = std::mem::replace(&mut self.vitals, vitals);
        self.history.insert(0, VitalRecord::from(previous));
        self
    }

    pub fn with_lab(mut self, lab: LabResult) -> Self {
        self.labs.push(lab);
        self
    }

    pub fn with_status(mut self, status: PatientStatus) -> Self {
        self.status = status;
        self
    }

    /// Discharged patients are excluded from monitoring.
    pub fn is_monitored(&self) -> bool {
        self.status != PatientStatus::Discharged
    }

    /// Vitals from the immediately preceding round, if any.
    pub fn previous_vitals(&self) -> Option<&VitalSigns> {
        self.history.first().map(|r| &r.vitals)
    }

    pub fn has_identity(&self) -> bool {
        !self.id.trim().is_empty() && !self.name.trim().is_empty()
    }
}
