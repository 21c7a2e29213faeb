//! Deterioration trends between two consecutive vitals rounds.
//!
//! Trend magnitudes are independent of the absolute limits in
//! [`super::thresholds`]: a patient can trend badly while every value is
//! still inside its safe range.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::models::{Direction, FindingCategory, PatientSnapshot, Severity, VitalParameter, VitalSigns};

use super::messages;
use super::types::Finding;

/// Absorbs float noise such as `37.3 - 36.8 = 0.49999...`.
const DELTA_EPSILON: f64 = 1e-9;

/// Parameter key used when trend findings are combined per patient.
pub const COMBINED_TREND_KEY: &str = "trend";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendThresholds {
    /// Absolute heart-rate change in either direction (bpm).
    pub heart_rate_delta: f64,
    /// SpO2 drop in percentage points.
    pub spo2_drop: f64,
    /// Systolic drop (mmHg).
    pub systolic_drop: f64,
    /// Temperature rise (°C).
    pub temperature_rise: f64,
}

impl Default for TrendThresholds {
    fn default() -> Self {
        Self {
            heart_rate_delta: 20.0,
            spo2_drop: 3.0,
            systolic_drop: 20.0,
            temperature_rise: 0.5,
        }
    }
}

impl TrendThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let all = [
            ("heart_rate_delta", self.heart_rate_delta),
            ("spo2_drop", self.spo2_drop),
            ("systolic_drop", self.systolic_drop),
            ("temperature_rise", self.temperature_rise),
        ];
        for (name, value) in all {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidThresholds(format!(
                    "trend {name} must be a positive number"
                )));
            }
        }
        Ok(())
    }

    fn rules(&self) -> [(VitalParameter, Movement, f64); 4] {
        [
            (VitalParameter::HeartRate, Movement::Either, self.heart_rate_delta),
            (VitalParameter::SystolicBp, Movement::Drop, self.systolic_drop),
            (VitalParameter::Spo2, Movement::Drop, self.spo2_drop),
            (VitalParameter::Temperature, Movement::Rise, self.temperature_rise),
        ]
    }
}

/// Which direction of change counts as deterioration.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Movement {
    Either,
    Drop,
    Rise,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendChange {
    pub parameter: VitalParameter,
    pub previous: f64,
    pub current: f64,
    /// Magnitude of the adverse change (always positive).
    pub delta: f64,
    pub threshold: f64,
    pub direction: Direction,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendAssessment {
    pub is_deteriorating: bool,
    pub changes: Vec<TrendChange>,
}

impl TrendAssessment {
    pub fn descriptions(&self) -> Vec<String> {
        self.changes.iter().map(|c| c.description.clone()).collect()
    }
}

/// Compare the current round against the previous one.
pub fn detect_trend(
    current: &VitalSigns,
    previous: &VitalSigns,
    thresholds: &TrendThresholds,
) -> TrendAssessment {
    let mut changes = Vec::new();

    for (parameter, movement, threshold) in thresholds.rules() {
        let (Some(now), Some(before)) = (current.get(parameter), previous.get(parameter)) else {
            continue;
        };

        let adverse = match movement {
            Movement::Either => (now - before).abs(),
            Movement::Drop => before - now,
            Movement::Rise => now - before,
        };

        if adverse + DELTA_EPSILON >= threshold {
            let direction = if now >= before { Direction::High } else { Direction::Low };
            changes.push(TrendChange {
                parameter,
                previous: before,
                current: now,
                delta: adverse,
                threshold,
                direction,
                description: messages::trend_change(parameter, before, now),
            });
        }
    }

    TrendAssessment {
        is_deteriorating: !changes.is_empty(),
        changes,
    }
}

/// Trend findings for a patient, using the head of its history as the
/// previous round. Trend findings are always warnings.
pub fn evaluate_trend(
    patient: &PatientSnapshot,
    thresholds: &TrendThresholds,
    combine: bool,
) -> Vec<Finding> {
    let Some(previous) = patient.previous_vitals() else {
        return Vec::new();
    };

    let assessment = detect_trend(&patient.vitals, previous, thresholds);
    if !assessment.is_deteriorating {
        return Vec::new();
    }

    if combine {
        return vec![Finding {
            patient_id: patient.id.clone(),
            patient_name: patient.name.clone(),
            category: FindingCategory::Trend,
            severity: Severity::Warning,
            parameter_key: COMBINED_TREND_KEY.to_string(),
            message: messages::combined_trend_message(&assessment.descriptions()),
            direction: None,
            value: None,
            threshold: None,
        }];
    }

    assessment
        .changes
        .into_iter()
        .map(|change| Finding {
            patient_id: patient.id.clone(),
            patient_name: patient.name.clone(),
            category: FindingCategory::Trend,
            severity: Severity::Warning,
            parameter_key: format!("{}-trend", change.parameter),
            message: messages::trend_message(&change.description),
            direction: Some(change.direction),
            value: Some(change.delta),
            threshold: Some(change.threshold),
        })
        .collect()
}
