//! Transport-agnostic application state.
//!
//! `CoreState` is the single shared state between the scheduler and the
//! HTTP surface. The engine owns its own locking; the state only ties the
//! engine, the roster feed and the running server handles together.

use std::sync::Arc;

use crate::api::WardApiServer;
use crate::config::MonitorConfig;
use crate::models::PatientSnapshot;
use crate::monitor::DefaultMonitorEngine;
use crate::roster::{Roster, RosterFeed};
use crate::scheduler::{self, MonitorHandle};

pub struct CoreState {
    engine: Arc<DefaultMonitorEngine>,
    roster: RosterFeed,
    /// Background evaluation task. Uses tokio Mutex for async.
    scheduler: tokio::sync::Mutex<Option<MonitorHandle>>,
    /// HTTP server handle. Uses tokio Mutex for async.
    pub api_server: tokio::sync::Mutex<Option<WardApiServer>>,
}

impl CoreState {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            engine: Arc::new(DefaultMonitorEngine::new(config)),
            roster: RosterFeed::new(),
            scheduler: tokio::sync::Mutex::new(None),
            api_server: tokio::sync::Mutex::new(None),
        }
    }

    pub fn engine(&self) -> &Arc<DefaultMonitorEngine> {
        &self.engine
    }

    pub fn roster(&self) -> &RosterFeed {
        &self.roster
    }

    pub fn current_roster(&self) -> Roster {
        self.roster.current()
    }

    pub fn replace_roster(&self, patients: Vec<PatientSnapshot>) -> usize {
        self.roster.replace(patients)
    }

    pub fn upsert_patient(&self, patient: PatientSnapshot) -> bool {
        self.roster.upsert(patient)
    }

    pub fn remove_patient(&self, patient_id: &str) -> bool {
        self.roster.remove(patient_id)
    }

    /// Start the evaluation scheduler if it is not already running.
    pub async fn start_monitoring(&self) {
        let mut guard = self.scheduler.lock().await;
        if guard.is_some() {
            return;
        }
        let interval = self.engine.config().reevaluate_interval;
        *guard = Some(scheduler::start_monitor(
            Arc::clone(&self.engine),
            self.roster.subscribe(),
            interval,
        ));
    }

    pub async fn is_monitoring(&self) -> bool {
        self.scheduler.lock().await.is_some()
    }

    /// Stop the scheduler and the HTTP server, waiting for both.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.scheduler.lock().await.take() {
            handle.stop().await;
        }
        if let Some(mut server) = self.api_server.lock().await.take() {
            server.shutdown();
        }
    }
}

impl Default for CoreState {
    fn default() -> Self {
        Self::new(MonitorConfig::default())
    }
}
