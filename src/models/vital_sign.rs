use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::VitalParameter;

/// A set of vital measurements taken together. Every field is optional
/// because not all vitals are recorded on every round.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalSigns {
    #[serde(default)]
    pub heart_rate: Option<f64>,
    #[serde(default)]
    pub systolic_bp: Option<f64>,
    #[serde(default)]
    pub diastolic_bp: Option<f64>,
    #[serde(default)]
    pub spo2: Option<f64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub respiratory_rate: Option<f64>,
}

impl VitalSigns {
    pub fn get(&self, parameter: VitalParameter) -> Option<f64> {
        match parameter {
            VitalParameter::HeartRate => self.heart_rate,
            VitalParameter::SystolicBp => self.systolic_bp,
            VitalParameter::DiastolicBp => self.diastolic_bp,
            VitalParameter::Spo2 => self.spo2,
            VitalParameter::Temperature => self.temperature,
            VitalParameter::RespiratoryRate => self.respiratory_rate,
        }
    }

    pub fn set(&mut self, parameter: VitalParameter, value: Option<f64>) {
        let slot = match parameter {
            VitalParameter::HeartRate => &mut self.heart_rate,
            VitalParameter::SystolicBp => &mut self.systolic_bp,
            VitalParameter::DiastolicBp => &mut self.diastolic_bp,
            VitalParameter::Spo2 => &mut self.spo2,
            VitalParameter::Temperature => &mut self.temperature,
            VitalParameter::RespiratoryRate => &mut self.respiratory_rate,
        };
        *slot = value;
    }

    /// Builder used by fixtures and the roster intake.
    pub fn with(mut self, parameter: VitalParameter, value: f64) -> Self {
        self.set(parameter, Some(value));
        self
    }

    pub fn is_empty(&self) -> bool {
        VitalParameter::ALL.iter().all(|p| self.get(*p).is_none())
    }

    /// First recorded vital whose value is NaN or infinite.
    pub fn first_non_finite(&self) -> Option<VitalParameter> {
        VitalParameter::ALL
            .into_iter()
            .find(|p| self.get(*p).is_some_and(|v| !v.is_finite()))
    }
}

/// A prior vitals round kept in the patient's history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalRecord {
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub vitals: VitalSigns,
}

impl From<VitalSigns> for VitalRecord {
    fn from(vitals: VitalSigns) -> Self {
        Self {
            recorded_at: None,
            vitals,
        }
    }
}
