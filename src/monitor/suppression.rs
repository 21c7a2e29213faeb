//! Alert deduplication and time-windowed rate limiting.
//!
//! Keyed by `patient_id:parameter_key` so one parameter never mutes another
//! for the same patient. Critical findings resurface after a short window;
//! warnings are muted longer.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::config::ConfigError;
use crate::models::Severity;

use super::types::Finding;

/// Minimum time between two alerts for the same key, per severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuppressionWindows {
    pub critical: Duration,
    pub warning: Duration,
}

impl Default for SuppressionWindows {
    fn default() -> Self {
        Self {
            critical: Duration::seconds(60),
            warning: Duration::seconds(300),
        }
    }
}

impl SuppressionWindows {
    pub fn new(critical: Duration, warning: Duration) -> Result<Self, ConfigError> {
        let windows = Self { critical, warning };
        windows.validate()?;
        Ok(windows)
    }

    /// Both windows must be positive, and the critical window strictly
    /// shorter than the warning window.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (severity, window) in [(Severity::Critical, self.critical), (Severity::Warning, self.warning)] {
            if window <= Duration::zero() {
                return Err(ConfigError::EmptyWindow {
                    severity: severity.as_str().to_string(),
                    secs: window.num_seconds(),
                });
            }
        }
        if self.critical < self.warning {
            Ok(())
        } else {
            Err(ConfigError::InvalidWindows {
                critical_secs: self.critical.num_seconds(),
                warning_secs: self.warning.num_seconds(),
            })
        }
    }

    pub fn window(&self, severity: Severity) -> Duration {
        match severity {
            Severity::Critical => self.critical,
            Severity::Warning => self.warning,
        }
    }
}

/// Last emission recorded for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuppressionEntry {
    pub last_emitted: DateTime<Utc>,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approved,
    Suppressed { remaining: Duration },
}

impl Decision {
    pub fn is_approved(&self) -> bool {
        matches!(self, Decision::Approved)
    }
}

/// Owned suppression map. Entries live for the whole monitoring session
/// and age out implicitly once their window has elapsed.
#[derive(Debug, Default)]
pub struct SuppressionTracker {
    entries: HashMap<String, SuppressionEntry>,
    windows: SuppressionWindows,
}

impl SuppressionTracker {
    pub fn new(windows: SuppressionWindows) -> Self {
        Self {
            entries: HashMap::new(),
            windows,
        }
    }

    /// Decide whether `finding` may raise an alert at `now`, recording the
    /// emission when it may.
    pub fn check(&mut self, finding: &Finding, now: DateTime<Utc>) -> Decision {
        let key = finding.suppression_key();

        if let Some(entry) = self.entries.get(&key) {
            let escalated = finding.severity.rank() > entry.severity.rank();
            let window = self.windows.window(finding.severity);
            let elapsed = now - entry.last_emitted;

            // A negative elapsed means the clock stepped back; treat as expired.
            if !escalated && elapsed >= Duration::zero() && elapsed < window {
                return Decision::Suppressed {
                    remaining: window - elapsed,
                };
            }
        }

        self.entries.insert(
            key,
            SuppressionEntry {
                last_emitted: now,
                severity: finding.severity,
            },
        );
        Decision::Approved
    }

    pub fn entry(&self, key: &str) -> Option<&SuppressionEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn windows(&self) -> SuppressionWindows {
        self.windows
    }
}
