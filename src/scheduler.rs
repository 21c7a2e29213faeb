//! Evaluation scheduler: runs a monitor pass on every roster change and on
//! a fixed re-evaluation cadence, so persisting conditions resurface once
//! their suppression window lapses even when no new data arrives.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::models::Severity;
use crate::monitor::{DefaultMonitorEngine, MonitorEngine};
use crate::roster::Roster;

/// Handle for the background evaluation task.
///
/// Dropping the handle requests shutdown; `stop()` also waits for the task.
pub struct MonitorHandle {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Request shutdown. A pass already running completes first.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }

    pub async fn stop(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Spawn the evaluation loop on the current tokio runtime.
pub fn start_monitor(
    engine: Arc<DefaultMonitorEngine>,
    roster: watch::Receiver<Roster>,
    interval: Duration,
) -> MonitorHandle {
    let (tx, rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
        tracing::info!(interval_secs = interval.as_secs(), "Monitor scheduler started");
        scheduler_loop(engine, roster, interval, rx).await;
        tracing::info!("Monitor scheduler shutting down");
    });

    MonitorHandle {
        shutdown: Some(tx),
        handle: Some(handle),
    }
}

async fn scheduler_loop(
    engine: Arc<DefaultMonitorEngine>,
    mut roster: watch::Receiver<Roster>,
    interval: Duration,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = &mut shutdown => return,
            changed = roster.changed() => {
                if changed.is_err() {
                    // Feed dropped.
                    return;
                }
                ticker.reset();
            }
            _ = ticker.tick() => {}
        }

        // Intermediate versions published during a pass are coalesced.
        let current = roster.borrow_and_update().clone();
        run_pass(&engine, current).await;
    }
}

async fn run_pass(engine: &Arc<DefaultMonitorEngine>, roster: Roster) {
    let engine = Arc::clone(engine);
    let result = tokio::task::spawn_blocking(move || engine.evaluate(&roster)).await;

    match result {
        Ok(Ok(summary)) => {
            for alert in summary.new_alerts.iter().filter(|a| a.severity == Severity::Critical) {
                tracing::warn!(
                    alert_id = %alert.id,
                    patient_id = %alert.patient_id,
                    "{}",
                    alert.message
                );
            }
        }
        Ok(Err(e)) => tracing::error!(error = %e, "Evaluation pass failed"),
        Err(e) => tracing::error!(error = %e, "Evaluation task panicked"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonitorConfig;
    use crate::models::{PatientSnapshot, VitalParameter, VitalSigns};
    use crate::monitor::MonitorEvent;
    use crate::roster::RosterFeed;

    fn tachycardic(id: &str) -> PatientSnapshot {
        PatientSnapshot::new(id, "Ada")
            .with_vitals(VitalSigns::default().with(VitalParameter::HeartRate, 160.0))
    }

    #[tokio::test]
    async fn roster_change_triggers_pass() {
        let engine = Arc::new(DefaultMonitorEngine::new(MonitorConfig::default()));
        let feed = RosterFeed::new();
        let mut events = engine.subscribe();
        let handle = start_monitor(engine.clone(), feed.subscribe(), Duration::from_secs(3600));

        feed.replace(vec![tachycardic("p1")]);

        let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("no event within timeout")
            .unwrap();
        assert!(matches!(event, MonitorEvent::AlertRaised { .. }));
        assert_eq!(engine.alerts().unwrap().len(), 1);

        handle.stop().await;
    }

    #[tokio::test]
    async fn stop_ends_the_task() {
        let engine = Arc::new(DefaultMonitorEngine::new(MonitorConfig::default()));
        let feed = RosterFeed::new();
        let handle = start_monitor(engine, feed.subscribe(), Duration::from_secs(3600));

        tokio::time::timeout(Duration::from_secs(5), handle.stop())
            .await
            .expect("scheduler did not stop");
    }

    #[tokio::test]
    async fn periodic_tick_reevaluates_unchanged_roster() {
        let engine = Arc::new(DefaultMonitorEngine::new(MonitorConfig::default()));
        let feed = RosterFeed::new();
        let handle = start_monitor(engine.clone(), feed.subscribe(), Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(engine.status().unwrap().passes >= 2);

        handle.stop().await;
    }
}
