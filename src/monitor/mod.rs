pub mod engine;
pub mod labs;
pub mod messages;
pub mod notify;
pub mod store;
pub mod suppression;
pub mod thresholds;
pub mod trend;
pub mod types;

pub use engine::DefaultMonitorEngine;
pub use notify::{CriticalNotice, MonitorEvent, NoticeType};
pub use store::{AlertStore, DEFAULT_ALERT_CAPACITY};
pub use suppression::{Decision, SuppressionTracker, SuppressionWindows};
pub use thresholds::{Bounds, ThresholdTable, VitalLimits};
pub use trend::TrendThresholds;
pub use types::*;
