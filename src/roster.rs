//! Roster feed: the current set of patient snapshots.
//!
//! Every change publishes a fresh immutable `Arc<[PatientSnapshot]>`, so an
//! evaluation pass always reads one consistent version while the feed keeps
//! accepting updates.

use std::sync::Arc;

use tokio::sync::watch;

use crate::models::PatientSnapshot;

pub type Roster = Arc<[PatientSnapshot]>;

pub struct RosterFeed {
    tx: watch::Sender<Roster>,
}

impl RosterFeed {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Roster::from(Vec::new()));
        Self { tx }
    }

    /// Current roster version.
    pub fn current(&self) -> Roster {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Roster> {
        self.tx.subscribe()
    }

    /// Replace the whole roster.
    pub fn replace(&self, patients: Vec<PatientSnapshot>) -> usize {
        let count = patients.len();
        self.tx.send_replace(Roster::from(patients));
        tracing::debug!(patients = count, "Roster replaced");
        count
    }

    /// Insert or replace one patient by id. Returns `true` when inserted.
    pub fn upsert(&self, patient: PatientSnapshot) -> bool {
        let mut inserted = false;
        self.tx.send_modify(|roster| {
            let mut next = roster.to_vec();
            match next.iter_mut().find(|p| p.id == patient.id) {
                Some(existing) => *existing = patient,
                None => {
                    next.push(patient);
                    inserted = true;
                }
            }
            *roster = Roster::from(next);
        });
        inserted
    }

    /// Remove one patient by id. Returns `true` when something was removed.
    pub fn remove(&self, patient_id: &str) -> bool {
        self.tx.send_if_modified(|roster| {
            if !roster.iter().any(|p| p.id == patient_id) {
                return false;
            }
            let next: Vec<_> = roster.iter().filter(|p| p.id != patient_id).cloned().collect();
            *roster = Roster::from(next);
            true
        })
    }
}

impl Default for RosterFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode patient records, skipping entries that do not decode. Returns the
/// decoded patients and the number skipped.
pub fn decode_records(records: Vec<serde_json::Value>) -> (Vec<PatientSnapshot>, usize) {
    let mut patients = Vec::with_capacity(records.len());
    let mut skipped = 0;
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<PatientSnapshot>(record) {
            Ok(patient) => patients.push(patient),
            Err(e) => {
                skipped += 1;
                tracing::warn!(index, error = %e, "Skipping undecodable patient record");
            }
        }
    }
    (patients, skipped)
}
