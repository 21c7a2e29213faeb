use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One resulted lab test as delivered by the roster feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabResult {
    pub name: String,
    pub value: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub abnormal: bool,
    /// Set by the reporting lab when the value is in its critical range.
    #[serde(default)]
    pub critical: bool,
    #[serde(default)]
    pub resulted_at: Option<DateTime<Utc>>,
}

impl LabResult {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
            unit: None,
            abnormal: false,
            critical: false,
            resulted_at: None,
        }
    }

    pub fn flagged(mut self, abnormal: bool, critical: bool) -> Self {
        self.abnormal = abnormal;
        self.critical = critical;
        self
    }

    /// Suppression key for this result. Keyed by name so repeated
    /// identical results collapse in the deduplicator.
    pub fn parameter_key(&self) -> String {
        format!("lab:{}", self.name.trim().to_lowercase())
    }
}
