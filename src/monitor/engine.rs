use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::config::MonitorConfig;
use crate::models::PatientSnapshot;

use super::labs::evaluate_labs;
use super::notify::{critical_notices, MonitorEvent};
use super::store::AlertStore;
use super::suppression::{Decision, SuppressionTracker};
use super::thresholds::evaluate_vitals;
use super::trend::evaluate_trend;
use super::types::{
    Alert, AlertCounts, EnginePhase, EngineStatus, EvaluationSummary, Finding, MonitorEngine,
    MonitorError,
};

/// Buffered events per subscriber before the slowest one starts lagging.
const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Default)]
struct PassStats {
    passes: u64,
    last_pass_at: Option<DateTime<Utc>>,
    last_pass_ms: Option<u64>,
    last_skipped: usize,
}

/// Resets the phase flag even if a pass returns early.
struct EvaluatingGuard<'a>(&'a AtomicBool);

impl<'a> EvaluatingGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for EvaluatingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Default implementation of the monitor engine.
/// Runs the three evaluators per patient, deduplicates the findings, keeps
/// the rolling alert history, and publishes new alerts.
pub struct DefaultMonitorEngine {
    config: MonitorConfig,
    /// Held for a whole pass, which serializes evaluation of every patient.
    suppression: Mutex<SuppressionTracker>,
    store: AlertStore,
    events: broadcast::Sender<MonitorEvent>,
    evaluating: AtomicBool,
    stats: Mutex<PassStats>,
}

impl DefaultMonitorEngine {
    pub fn new(config: MonitorConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            suppression: Mutex::new(SuppressionTracker::new(config.windows)),
            store: AlertStore::new(config.alert_capacity),
            config,
            events,
            evaluating: AtomicBool::new(false),
            stats: Mutex::new(PassStats::default()),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// All findings for one patient, computed from this one snapshot.
    /// Order: vitals, trends, labs; each in parameter order.
    pub fn evaluate_patient(&self, patient: &PatientSnapshot) -> Result<Vec<Finding>, MonitorError> {
        if !patient.has_identity() {
            return Err(MonitorError::MalformedSnapshot {
                reason: format!("patient record missing id or name (id: {:?})", patient.id),
            });
        }

        let rounds = std::iter::once(&patient.vitals).chain(patient.previous_vitals());
        for vitals in rounds {
            if let Some(parameter) = vitals.first_non_finite() {
                return Err(MonitorError::InvalidMeasurement {
                    patient_id: patient.id.clone(),
                    parameter,
                });
            }
        }

        let thresholds = &self.config.thresholds;
        let mut findings = evaluate_vitals(patient, thresholds);
        findings.extend(evaluate_trend(
            patient,
            &thresholds.trends,
            self.config.combine_trends,
        ));
        findings.extend(evaluate_labs(patient));
        Ok(findings)
    }

    pub fn alerts_for_patient(&self, patient_id: &str) -> Result<Vec<Alert>, MonitorError> {
        self.store.for_patient(patient_id)
    }

    pub fn unacknowledged_alerts(&self) -> Result<Vec<Alert>, MonitorError> {
        self.store.unacknowledged()
    }

    /// A pass that panicked leaves the tracker poisoned. Its state is
    /// discarded so the next pass starts from an empty tracker.
    fn lock_suppression(&self) -> MutexGuard<'_, SuppressionTracker> {
        self.suppression.lock().unwrap_or_else(|poisoned| {
            tracing::error!("Suppression state poisoned by a failed pass, resetting it");
            self.suppression.clear_poison();
            let mut tracker = poisoned.into_inner();
            *tracker = SuppressionTracker::new(self.config.windows);
            tracker
        })
    }

    fn publish(&self, new_alerts: &[Alert]) {
        // Send only fails when nobody is subscribed.
        for alert in new_alerts {
            let _ = self.events.send(MonitorEvent::AlertRaised {
                alert: alert.clone(),
            });
        }
        for notice in critical_notices(new_alerts) {
            let _ = self.events.send(MonitorEvent::CriticalRaised { notice });
        }
    }
}

impl MonitorEngine for DefaultMonitorEngine {
    fn evaluate_at(
        &self,
        roster: &[PatientSnapshot],
        now: DateTime<Utc>,
    ) -> Result<EvaluationSummary, MonitorError> {
        let start = Instant::now();
        let mut suppression = self.lock_suppression();
        let _phase = EvaluatingGuard::enter(&self.evaluating);

        let mut findings = Vec::new();
        let mut evaluated = 0;
        let mut skipped = 0;

        for patient in roster.iter().filter(|p| p.is_monitored()) {
            match self.evaluate_patient(patient) {
                Ok(patient_findings) => {
                    evaluated += 1;
                    findings.extend(patient_findings);
                }
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(
                        patient_id = %patient.id,
                        error = %e,
                        "Skipping patient for this evaluation pass"
                    );
                }
            }
        }

        let total_findings = findings.len();
        let mut suppressed = 0;
        let mut new_alerts = Vec::new();

        for finding in findings {
            match suppression.check(&finding, now) {
                Decision::Approved => new_alerts.push(Alert::from_finding(finding, now)),
                Decision::Suppressed { remaining } => {
                    suppressed += 1;
                    tracing::debug!(
                        patient_id = %finding.patient_id,
                        parameter = %finding.parameter_key,
                        severity = finding.severity.as_str(),
                        remaining_secs = remaining.num_seconds(),
                        "Finding suppressed"
                    );
                }
            }
        }

        let evicted = self.store.append(&new_alerts)?;
        drop(suppression);

        self.publish(&new_alerts);

        let processing_time_ms = start.elapsed().as_millis() as u64;
        if let Ok(mut stats) = self.stats.lock() {
            stats.passes += 1;
            stats.last_pass_at = Some(now);
            stats.last_pass_ms = Some(processing_time_ms);
            stats.last_skipped = skipped;
        }

        tracing::info!(
            patients = evaluated,
            skipped,
            findings = total_findings,
            raised = new_alerts.len(),
            suppressed,
            evicted,
            processing_ms = processing_time_ms,
            "Evaluation pass complete"
        );

        Ok(EvaluationSummary {
            evaluated_at: now,
            patients_evaluated: evaluated,
            patients_skipped: skipped,
            findings: total_findings,
            suppressed,
            new_alerts,
            processing_time_ms,
        })
    }

    fn alerts(&self) -> Result<Vec<Alert>, MonitorError> {
        self.store.list()
    }

    fn counts(&self) -> Result<AlertCounts, MonitorError> {
        self.store.counts()
    }

    fn acknowledge(&self, alert_id: &Uuid) -> Result<bool, MonitorError> {
        let changed = self.store.acknowledge(alert_id, Utc::now())?;
        if changed {
            tracing::info!(alert_id = %alert_id, "Alert acknowledged");
            let _ = self.events.send(MonitorEvent::Acknowledged {
                alert_id: *alert_id,
            });
        }
        Ok(changed)
    }

    fn acknowledge_all(&self) -> Result<usize, MonitorError> {
        let count = self.store.acknowledge_all(Utc::now())?;
        if count > 0 {
            tracing::info!(count, "All alerts acknowledged");
            let _ = self.events.send(MonitorEvent::AllAcknowledged { count });
        }
        Ok(count)
    }

    fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.events.subscribe()
    }

    fn status(&self) -> Result<EngineStatus, MonitorError> {
        let stats = self.stats.lock().map_err(|_| MonitorError::LockFailed)?;
        let phase = if self.evaluating.load(Ordering::SeqCst) {
            EnginePhase::Evaluating
        } else {
            EnginePhase::Idle
        };
        Ok(EngineStatus {
            phase,
            passes: stats.passes,
            last_pass_at: stats.last_pass_at,
            last_pass_ms: stats.last_pass_ms,
            last_skipped: stats.last_skipped,
            alert_capacity: self.store.capacity(),
        })
    }
}
