use std::collections::VecDeque;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::types::{Alert, AlertCounts, MonitorError};

/// Default rolling history size.
pub const DEFAULT_ALERT_CAPACITY: usize = 20;

/// Rolling, capped alert history backed by RwLock.
/// Oldest alerts are evicted first regardless of acknowledgment.
pub struct AlertStore {
    alerts: RwLock<VecDeque<Alert>>,
    capacity: usize,
}

impl AlertStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            alerts: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append newly approved alerts and evict overflow oldest-first.
    /// Returns the number of evicted alerts.
    pub fn append(&self, new_alerts: &[Alert]) -> Result<usize, MonitorError> {
        let mut alerts = self.alerts.write().map_err(|_| MonitorError::LockFailed)?;

        alerts.extend(new_alerts.iter().cloned());

        let mut evicted = 0;
        while alerts.len() > self.capacity {
            if let Some(old) = alerts.pop_front() {
                tracing::debug!(alert_id = %old.id, patient_id = %old.patient_id, "Alert evicted from history");
                evicted += 1;
            }
        }
        Ok(evicted)
    }

    /// All alerts, most recent first.
    pub fn list(&self) -> Result<Vec<Alert>, MonitorError> {
        self.filtered(|_| true)
    }

    pub fn for_patient(&self, patient_id: &str) -> Result<Vec<Alert>, MonitorError> {
        self.filtered(|a| a.patient_id == patient_id)
    }

    pub fn unacknowledged(&self) -> Result<Vec<Alert>, MonitorError> {
        self.filtered(|a| !a.acknowledged)
    }

    fn filtered(&self, keep: impl Fn(&Alert) -> bool) -> Result<Vec<Alert>, MonitorError> {
        let alerts = self.alerts.read().map_err(|_| MonitorError::LockFailed)?;
        Ok(alerts.iter().rev().filter(|a| keep(a)).cloned().collect())
    }

    pub fn counts(&self) -> Result<AlertCounts, MonitorError> {
        let alerts = self.alerts.read().map_err(|_| MonitorError::LockFailed)?;
        Ok(AlertCounts::from_alerts(alerts.iter()))
    }

    pub fn len(&self) -> Result<usize, MonitorError> {
        let alerts = self.alerts.read().map_err(|_| MonitorError::LockFailed)?;
        Ok(alerts.len())
    }

    /// Acknowledge one alert. Returns `false` when the id is unknown (for
    /// example already evicted) or the alert was already acknowledged.
    pub fn acknowledge(&self, alert_id: &Uuid, now: DateTime<Utc>) -> Result<bool, MonitorError> {
        let mut alerts = self.alerts.write().map_err(|_| MonitorError::LockFailed)?;

        match alerts.iter_mut().find(|a| a.id == *alert_id) {
            Some(alert) if !alert.acknowledged => {
                alert.acknowledged = true;
                alert.acknowledged_at = Some(now);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Acknowledge every unacknowledged alert. Returns how many changed.
    pub fn acknowledge_all(&self, now: DateTime<Utc>) -> Result<usize, MonitorError> {
        let mut alerts = self.alerts.write().map_err(|_| MonitorError::LockFailed)?;

        let mut changed = 0;
        for alert in alerts.iter_mut().filter(|a| !a.acknowledged) {
            alert.acknowledged = true;
            alert.acknowledged_at = Some(now);
            changed += 1;
        }
        Ok(changed)
    }
}

impl Default for AlertStore {
    fn default() -> Self {
        Self::new(DEFAULT_ALERT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FindingCategory, Severity};
    use crate::monitor::types::Finding;

    fn make_alert(patient: &str, severity: Severity) -> Alert {
        Alert::from_finding(
            Finding {
                patient_id: patient.into(),
                patient_name: "Ada".into(),
                category: FindingCategory::Vitals,
                severity,
                parameter_key: "heart_rate".into(),
                message: "test alert".into(),
                direction: None,
                value: None,
                threshold: None,
            },
            Utc::now(),
        )
    }

    #[test]
    fn list_is_most_recent_first() {
        let store = AlertStore::default();
        let first = make_alert("p1", Severity::Warning);
        let second = make_alert("p2", Severity::Critical);
        store.append(&[first.clone(), second.clone()]).unwrap();

        let list = store.list().unwrap();
        assert_eq!(list[0].id, second.id);
        assert_eq!(list[1].id, first.id);
    }

    #[test]
    fn history_never_exceeds_capacity() {
        let store = AlertStore::new(3);
        let alerts: Vec<_> = (0..5).map(|i| make_alert(&format!("p{i}"), Severity::Warning)).collect();

        let evicted = store.append(&alerts).unwrap();
        assert_eq!(evicted, 2);
        assert_eq!(store.len().unwrap(), 3);

        let remaining: Vec<_> = store.list().unwrap().into_iter().map(|a| a.patient_id).collect();
        assert_eq!(remaining, ["p4", "p3", "p2"]);
    }

    #[test]
    fn acknowledged_alerts_are_evicted_in_order_too() {
        let store = AlertStore::new(2);
        let a = make_alert("p1", Severity::Warning);
        store.append(&[a.clone()]).unwrap();
        store.acknowledge(&a.id, Utc::now()).unwrap();
        store.append(&[make_alert("p2", Severity::Warning), make_alert("p3", Severity::Warning)]).unwrap();

        assert!(store.list().unwrap().iter().all(|x| x.id != a.id));
    }

    #[test]
    fn acknowledge_is_idempotent() {
        let store = AlertStore::default();
        let a = make_alert("p1", Severity::Critical);
        store.append(&[a.clone()]).unwrap();

        assert!(store.acknowledge(&a.id, Utc::now()).unwrap());
        assert!(!store.acknowledge(&a.id, Utc::now()).unwrap());
        assert_eq!(store.counts().unwrap().total_unacknowledged, 0);
    }

    #[test]
    fn acknowledge_unknown_id_is_noop() {
        let store = AlertStore::default();
        assert!(!store.acknowledge(&Uuid::new_v4(), Utc::now()).unwrap());
    }

    #[test]
    fn acknowledge_all_clears_unacknowledged() {
        let store = AlertStore::default();
        store
            .append(&[make_alert("p1", Severity::Critical), make_alert("p2", Severity::Warning)])
            .unwrap();

        assert_eq!(store.acknowledge_all(Utc::now()).unwrap(), 2);
        assert_eq!(store.counts().unwrap().total_unacknowledged, 0);
        assert_eq!(store.acknowledge_all(Utc::now()).unwrap(), 0);
        assert_eq!(store.counts().unwrap().total_unacknowledged, 0);
    }

    #[test]
    fn filters_by_patient_and_state() {
        let store = AlertStore::default();
        let a = make_alert("p1", Severity::Critical);
        store.append(&[a.clone(), make_alert("p2", Severity::Warning)]).unwrap();
        store.acknowledge(&a.id, Utc::now()).unwrap();

        assert_eq!(store.for_patient("p1").unwrap().len(), 1);
        assert_eq!(store.unacknowledged().unwrap()[0].patient_id, "p2");
    }

    #[test]
    fn zero_capacity_is_clamped() {
        assert_eq!(AlertStore::new(0).capacity(), 1);
    }
}
