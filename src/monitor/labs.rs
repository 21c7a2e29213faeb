use crate::models::{FindingCategory, PatientSnapshot, Severity};

use super::messages;
use super::types::Finding;

/// One finding per lab result flagged abnormal. Severity follows the
/// result's own critical flag. Repeats are left to the deduplicator.
pub fn evaluate_labs(patient: &PatientSnapshot) -> Vec<Finding> {
    patient
        .labs
        .iter()
        .filter(|lab| lab.abnormal)
        .map(|lab| {
            let severity = if lab.critical {
                Severity::Critical
            } else {
                Severity::Warning
            };
            Finding {
                patient_id: patient.id.clone(),
                patient_name: patient.name.clone(),
                category: FindingCategory::Lab,
                severity,
                parameter_key: lab.parameter_key(),
                message: messages::lab_message(lab, severity),
                direction: None,
                value: lab.value,
                threshold: None,
            }
        })
        .collect()
}
