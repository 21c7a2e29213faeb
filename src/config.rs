use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::monitor::store::DEFAULT_ALERT_CAPACITY;
use crate::monitor::suppression::SuppressionWindows;
use crate::monitor::thresholds::ThresholdTable;

/// Application-level constants
pub const APP_NAME: &str = "Wardwatch";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";
pub const DEFAULT_CRITICAL_WINDOW_SECS: u64 = 60;
pub const DEFAULT_WARNING_WINDOW_SECS: u64 = 300;
pub const DEFAULT_REEVALUATE_SECS: u64 = 30;

const ENV_BIND_ADDR: &str = "WARDWATCH_BIND_ADDR";
const ENV_ALERT_CAPACITY: &str = "WARDWATCH_ALERT_CAPACITY";
const ENV_CRITICAL_WINDOW: &str = "WARDWATCH_CRITICAL_WINDOW_SECS";
const ENV_WARNING_WINDOW: &str = "WARDWATCH_WARNING_WINDOW_SECS";
const ENV_REEVALUATE: &str = "WARDWATCH_REEVALUATE_SECS";
const ENV_COMBINE_TRENDS: &str = "WARDWATCH_COMBINE_TRENDS";
const ENV_THRESHOLDS_FILE: &str = "WARDWATCH_THRESHOLDS_FILE";

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> &'static str {
    "wardwatch_lib=info,wardwatch=info,tower_http=warn"
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("Failed to read threshold file {0}: {1}")]
    ThresholdLoad(String, String),

    #[error("Failed to parse threshold file {0}: {1}")]
    ThresholdParse(String, String),

    #[error("Critical suppression window ({critical_secs}s) must be shorter than the warning window ({warning_secs}s)")]
    InvalidWindows { critical_secs: i64, warning_secs: i64 },

    #[error("The {severity} suppression window must be positive, got {secs}s")]
    EmptyWindow { severity: String, secs: i64 },

    #[error("Invalid threshold table: {0}")]
    InvalidThresholds(String),
}

/// Everything the monitor engine and its scheduler need.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub thresholds: ThresholdTable,
    pub windows: SuppressionWindows,
    pub alert_capacity: usize,
    /// Re-evaluation cadence when the roster has not changed.
    pub reevaluate_interval: Duration,
    /// Collapse all trend changes of one round into a single finding.
    pub combine_trends: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            thresholds: ThresholdTable::default(),
            windows: SuppressionWindows::default(),
            alert_capacity: DEFAULT_ALERT_CAPACITY,
            reevaluate_interval: Duration::from_secs(DEFAULT_REEVALUATE_SECS),
            combine_trends: false,
        }
    }
}

impl MonitorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.windows.validate()?;
        self.thresholds.validate()?;
        if self.alert_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: ENV_ALERT_CAPACITY.into(),
                value: "0".into(),
            });
        }
        if self.reevaluate_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: ENV_REEVALUATE.into(),
                value: "0".into(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub monitor: MonitorConfig,
}

impl AppConfig {
    /// Read configuration from `WARDWATCH_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = parse_or(&lookup, ENV_BIND_ADDR, SocketAddr::from(([127, 0, 0, 1], 8787)))?;
        let alert_capacity = parse_or(&lookup, ENV_ALERT_CAPACITY, DEFAULT_ALERT_CAPACITY)?;
        let critical_secs = parse_or(&lookup, ENV_CRITICAL_WINDOW, DEFAULT_CRITICAL_WINDOW_SECS)?;
        let warning_secs = parse_or(&lookup, ENV_WARNING_WINDOW, DEFAULT_WARNING_WINDOW_SECS)?;
        let reevaluate_secs = parse_or(&lookup, ENV_REEVALUATE, DEFAULT_REEVALUATE_SECS)?;
        let combine_trends = parse_or(&lookup, ENV_COMBINE_TRENDS, false)?;

        let thresholds = match lookup(ENV_THRESHOLDS_FILE).filter(|p| !p.trim().is_empty()) {
            Some(path) => ThresholdTable::load(&PathBuf::from(path))?,
            None => ThresholdTable::default(),
        };

        let monitor = MonitorConfig {
            thresholds,
            windows: SuppressionWindows::new(
                window(ENV_CRITICAL_WINDOW, critical_secs)?,
                window(ENV_WARNING_WINDOW, warning_secs)?,
            )?,
            alert_capacity,
            reevaluate_interval: Duration::from_secs(reevaluate_secs),
            combine_trends,
        };
        monitor.validate()?;

        Ok(Self { bind_addr, monitor })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}

/// Seconds to a window, rejecting values chrono cannot represent.
fn window(key: &str, secs: u64) -> Result<chrono::Duration, ConfigError> {
    i64::try_from(secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .ok_or_else(|| ConfigError::InvalidValue {
            key: key.to_string(),
            value: secs.to_string(),
        })
}
