use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::models::{Direction, FindingCategory, PatientSnapshot, Severity, VitalParameter};

use super::messages;
use super::trend::TrendThresholds;
use super::types::Finding;

/// Low/high cutoffs of one tier. Either side may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
}

impl Bounds {
    pub const fn new(low: Option<f64>, high: Option<f64>) -> Self {
        Self { low, high }
    }

    /// Direction and cutoff crossed by `value`. Boundary values breach.
    pub fn breach(&self, value: f64) -> Option<(Direction, f64)> {
        if let Some(high) = self.high {
            if value >= high {
                return Some((Direction::High, high));
            }
        }
        if let Some(low) = self.low {
            if value <= low {
                return Some((Direction::Low, low));
            }
        }
        None
    }
}

/// Critical and warning tiers for one vital.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalLimits {
    pub parameter: VitalParameter,
    pub critical: Bounds,
    pub warning: Bounds,
}

impl VitalLimits {
    /// Warning cutoffs must sit inside (or on) the critical cutoffs.
    fn is_nested(&self) -> bool {
        let low_ok = match (self.critical.low, self.warning.low) {
            (Some(c), Some(w)) => c <= w,
            _ => true,
        };
        let high_ok = match (self.critical.high, self.warning.high) {
            (Some(c), Some(w)) => w <= c,
            _ => true,
        };
        low_ok && high_ok
    }
}

/// Reference limits for every monitored vital plus trend magnitudes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable {
    pub vitals: Vec<VitalLimits>,
    #[serde(default)]
    pub trends: TrendThresholds,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        let limits = |parameter, cl, wl, wh, ch| VitalLimits {
            parameter,
            critical: Bounds::new(cl, ch),
            warning: Bounds::new(wl, wh),
        };
        Self {
            vitals: vec![
                limits(VitalParameter::HeartRate, Some(40.0), Some(50.0), Some(120.0), Some(150.0)),
                limits(VitalParameter::SystolicBp, Some(80.0), Some(90.0), Some(160.0), Some(180.0)),
                limits(VitalParameter::DiastolicBp, Some(40.0), Some(50.0), Some(100.0), Some(120.0)),
                limits(VitalParameter::Spo2, Some(88.0), Some(92.0), None, None),
                limits(VitalParameter::Temperature, Some(35.0), Some(36.0), Some(38.5), Some(40.0)),
                limits(VitalParameter::RespiratoryRate, Some(8.0), Some(10.0), Some(24.0), Some(30.0)),
            ],
            trends: TrendThresholds::default(),
        }
    }
}

impl ThresholdTable {
    /// Load a table from a JSON file and validate it.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ThresholdLoad(path.display().to_string(), e.to_string()))?;
        let table: ThresholdTable = serde_json::from_str(&json)
            .map_err(|e| ConfigError::ThresholdParse(path.display().to_string(), e.to_string()))?;
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for limits in &self.vitals {
            if !limits.is_nested() {
                return Err(ConfigError::InvalidThresholds(format!(
                    "{} warning tier lies outside its critical tier",
                    limits.parameter
                )));
            }
        }
        self.trends.validate()
    }

    pub fn limits(&self, parameter: VitalParameter) -> Option<&VitalLimits> {
        self.vitals.iter().find(|l| l.parameter == parameter)
    }
}

/// Compare each recorded vital against the critical then warning tier.
/// At most one finding per vital; unset vitals are skipped.
pub fn evaluate_vitals(patient: &PatientSnapshot, table: &ThresholdTable) -> Vec<Finding> {
    let mut findings = Vec::new();

    for parameter in VitalParameter::ALL {
        let Some(value) = patient.vitals.get(parameter) else {
            continue;
        };
        let Some(limits) = table.limits(parameter) else {
            continue;
        };

        let breach = limits
            .critical
            .breach(value)
            .map(|(direction, threshold)| (Severity::Critical, direction, threshold))
            .or_else(|| {
                limits
                    .warning
                    .breach(value)
                    .map(|(direction, threshold)| (Severity::Warning, direction, threshold))
            });

        if let Some((severity, direction, threshold)) = breach {
            findings.push(Finding {
                patient_id: patient.id.clone(),
                patient_name: patient.name.clone(),
                category: FindingCategory::Vitals,
                severity,
                parameter_key: parameter.as_str().to_string(),
                message: messages::vital_message(parameter, severity, direction, value, threshold),
                direction: Some(direction),
                value: Some(value),
                threshold: Some(threshold),
            });
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VitalSigns;

    fn patient(vitals: VitalSigns) -> PatientSnapshot {
        PatientSnapshot::new("p1", "Ada Lovelace").with_vitals(vitals)
    }

    #[test]
    fn values_inside_both_tiers_produce_nothing() {
        let vitals = VitalSigns {
            heart_rate: Some(80.0),
            systolic_bp: Some(120.0),
            diastolic_bp: Some(75.0),
            spo2: Some(97.0),
            temperature: Some(36.8),
            respiratory_rate: Some(16.0),
        };
        assert!(evaluate_vitals(&patient(vitals), &ThresholdTable::default()).is_empty());
    }

    #[test]
    fn critical_high_heart_rate() {
        let vitals = VitalSigns::default().with(VitalParameter::HeartRate, 160.0);
        let findings = evaluate_vitals(&patient(vitals), &ThresholdTable::default());

        assert_eq!(findings.len(), 1);
        let f = &findings[0];
        assert_eq!(f.severity, Severity::Critical);
        assert_eq!(f.direction, Some(Direction::High));
        assert_eq!(f.parameter_key, "heart_rate");
        assert_eq!(f.value, Some(160.0));
        assert_eq!(f.threshold, Some(150.0));
        assert!(f.message.to_lowercase().contains("tachycardia"));
    }

    #[test]
    fn value_exactly_at_critical_cutoff_is_critical() {
        let table = ThresholdTable::default();
        let high = VitalSigns::default().with(VitalParameter::HeartRate, 150.0);
        let low = VitalSigns::default().with(VitalParameter::Spo2, 88.0);

        let findings = evaluate_vitals(&patient(high), &table);
        assert_eq!(findings[0].severity, Severity::Critical);

        let findings = evaluate_vitals(&patient(low), &table);
        assert_eq!(findings[0].severity, Severity::Critical);
        assert_eq!(findings[0].direction, Some(Direction::Low));
    }

    #[test]
    fn warning_tier_inside_critical_bounds() {
        let vitals = VitalSigns::default().with(VitalParameter::Spo2, 90.0);
        let findings = evaluate_vitals(&patient(vitals), &ThresholdTable::default());

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert_eq!(findings[0].threshold, Some(92.0));
        assert!(findings[0].message.contains("hypoxemia"));
    }

    #[test]
    fn missing_vitals_are_skipped() {
        let findings = evaluate_vitals(&patient(VitalSigns::default()), &ThresholdTable::default());
        assert!(findings.is_empty());
    }

    #[test]
    fn every_breaching_vital_is_reported() {
        let vitals = VitalSigns::default()
            .with(VitalParameter::HeartRate, 35.0)
            .with(VitalParameter::Temperature, 39.0)
            .with(VitalParameter::RespiratoryRate, 16.0)
            .with(VitalParameter::SystolicBp, 185.0);
        let findings = evaluate_vitals(&patient(vitals), &ThresholdTable::default());

        let keys: Vec<_> = findings.iter().map(|f| f.parameter_key.as_str()).collect();
        assert_eq!(keys, ["heart_rate", "systolic_bp", "temperature"]);
        assert_eq!(findings[0].severity, Severity::Critical);
        assert_eq!(findings[1].severity, Severity::Critical);
        assert_eq!(findings[2].severity, Severity::Warning);
    }

    #[test]
    fn spo2_has_no_high_cutoff() {
        let vitals = VitalSigns::default().with(VitalParameter::Spo2, 100.0);
        assert!(evaluate_vitals(&patient(vitals), &ThresholdTable::default()).is_empty());
    }

    #[test]
    fn default_table_is_valid() {
        ThresholdTable::default().validate().unwrap();
    }

    #[test]
    fn inverted_tiers_are_rejected() {
        let mut table = ThresholdTable::default();
        table.vitals[0].warning.high = Some(200.0);
        assert!(matches!(table.validate(), Err(ConfigError::InvalidThresholds(_))));
    }

    #[test]
    fn load_reads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thresholds.json");
        let mut table = ThresholdTable::default();
        table.vitals.retain(|l| l.parameter == VitalParameter::HeartRate);
        table.vitals[0].critical.high = Some(140.0);
        std::fs::write(&path, serde_json::to_string(&table).unwrap()).unwrap();

        let loaded = ThresholdTable::load(&path).unwrap();
        assert_eq!(loaded.vitals.len(), 1);
        assert_eq!(loaded.vitals[0].critical.high, Some(140.0));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = ThresholdTable::load(Path::new("/nonexistent/thresholds.json")).unwrap_err();
        assert!(matches!(err, ConfigError::ThresholdLoad(_, _)));
    }
}
