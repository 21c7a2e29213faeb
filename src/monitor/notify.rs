use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{FindingCategory, Severity};

use super::types::Alert;

/// Events published on the engine's push channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MonitorEvent {
    AlertRaised { alert: Alert },
    CriticalRaised { notice: CriticalNotice },
    Acknowledged { alert_id: Uuid },
    AllAcknowledged { count: usize },
}

/// Immediate-surfacing payload for a new critical alert, meant for a
/// notification sink (pager, banner, bedside display).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalNotice {
    pub alert_id: Uuid,
    pub patient_id: String,
    pub patient_name: String,
    pub action_type: NoticeType,
    pub banner: String,
    pub raised_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeType {
    VitalCritical,
    LabCritical,
    Other,
}

/// Build notices for the critical alerts in `alerts`, in order.
pub fn critical_notices(alerts: &[Alert]) -> Vec<CriticalNotice> {
    alerts
        .iter()
        .filter(|a| a.severity == Severity::Critical)
        .map(|alert| {
            let action_type = match alert.category {
                FindingCategory::Vitals => NoticeType::VitalCritical,
                FindingCategory::Lab => NoticeType::LabCritical,
                FindingCategory::Trend => NoticeType::Other,
            };
            CriticalNotice {
                alert_id: alert.id,
                patient_id: alert.patient_id.clone(),
                patient_name: alert.patient_name.clone(),
                action_type,
                banner: format!("{}: {}", alert.patient_name, alert.message),
                raised_at: alert.created_at,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::types::Finding;

    fn make_alert(category: FindingCategory, severity: Severity) -> Alert {
        Alert::from_finding(
            Finding {
                patient_id: "p1".into(),
                patient_name: "Ada".into(),
                category,
                severity,
                parameter_key: "lab:potassium".into(),
                message: "Critical lab result: Potassium 6.8".into(),
                direction: None,
                value: Some(6.8),
                threshold: None,
            },
            Utc::now(),
        )
    }

    #[test]
    fn critical_lab_alert_becomes_lab_notice() {
        let alert = make_alert(FindingCategory::Lab, Severity::Critical);
        let notices = critical_notices(std::slice::from_ref(&alert));
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].action_type, NoticeType::LabCritical);
        assert_eq!(notices[0].alert_id, alert.id);
        assert_eq!(notices[0].banner, "Ada: Critical lab result: Potassium 6.8");
    }

    #[test]
    fn warnings_produce_no_notice() {
        let alert = make_alert(FindingCategory::Vitals, Severity::Warning);
        assert!(critical_notices(&[alert]).is_empty());
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = MonitorEvent::AllAcknowledged { count: 3 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "all_acknowledged");
        assert_eq!(json["count"], 3);
    }
}
