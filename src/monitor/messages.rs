//! Clinician-facing alert text.
//!
//! Messages name the clinical condition first so a badge or banner can be
//! read at a glance, then carry the measured value and the crossed limit.

use crate::models::{Direction, LabResult, Severity, VitalParameter};

/// Clinical term for a vital outside its limits in the given direction.
pub fn condition_name(parameter: VitalParameter, direction: Direction) -> &'static str {
    match (parameter, direction) {
        (VitalParameter::HeartRate, Direction::High) => "tachycardia",
        (VitalParameter::HeartRate, Direction::Low) => "bradycardia",
        (VitalParameter::SystolicBp, Direction::High) => "hypertension",
        (VitalParameter::SystolicBp, Direction::Low) => "hypotension",
        (VitalParameter::DiastolicBp, Direction::High) => "diastolic hypertension",
        (VitalParameter::DiastolicBp, Direction::Low) => "diastolic hypotension",
        (VitalParameter::Spo2, Direction::Low) => "hypoxemia",
        (VitalParameter::Spo2, Direction::High) => "hyperoxemia",
        (VitalParameter::Temperature, Direction::High) => "fever",
        (VitalParameter::Temperature, Direction::Low) => "hypothermia",
        (VitalParameter::RespiratoryRate, Direction::High) => "tachypnea",
        (VitalParameter::RespiratoryRate, Direction::Low) => "bradypnea",
    }
}

/// Round to one decimal and drop a trailing `.0`.
pub fn format_value(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    format!("{rounded}")
}

fn severity_prefix(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "Critical",
        Severity::Warning => "Warning",
    }
}

/// e.g. `Critical tachycardia: heart rate 160 bpm (limit 150 bpm)`.
pub fn vital_message(
    parameter: VitalParameter,
    severity: Severity,
    direction: Direction,
    value: f64,
    threshold: f64,
) -> String {
    let unit = parameter.unit();
    format!(
        "{} {}: {} {} {} (limit {} {})",
        severity_prefix(severity),
        condition_name(parameter, direction),
        parameter.label(),
        format_value(value),
        unit,
        format_value(threshold),
        unit,
    )
}

/// e.g. `SpO2 fell by 7 % (97 → 90)`.
pub fn trend_change(parameter: VitalParameter, previous: f64, current: f64) -> String {
    let verb = if current >= previous { "rose" } else { "fell" };
    let mut label = parameter.label().to_string();
    if let Some(first) = label.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    format!(
        "{} {} by {} {} ({} → {})",
        label,
        verb,
        format_value((current - previous).abs()),
        parameter.unit(),
        format_value(previous),
        format_value(current),
    )
}

pub fn trend_message(description: &str) -> String {
    format!("Deteriorating trend: {description}")
}

/// One notification covering every deteriorating parameter for a patient.
pub fn combined_trend_message(descriptions: &[String]) -> String {
    format!("Deteriorating trend: {}", descriptions.join("; "))
}

/// e.g. `Critical lab result: Potassium 6.8 mmol/L`.
pub fn lab_message(lab: &LabResult, severity: Severity) -> String {
    let kind = match severity {
        Severity::Critical => "Critical lab result",
        Severity::Warning => "Abnormal lab result",
    };
    let value = lab
        .value
        .map(format_value)
        .unwrap_or_else(|| "flagged".to_string());
    match lab.unit.as_deref() {
        Some(unit) if !unit.is_empty() => format!("{kind}: {} {value} {unit}", lab.name),
        _ => format!("{kind}: {} {value}", lab.name),
    }
}
