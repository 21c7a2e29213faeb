use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a wire string does not name any variant of the target enum.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid {field} value: {value}")]
pub struct ParseEnumError {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ParseEnumError {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(PatientStatus {
    Admitted => "admitted",
    Observation => "observation",
    Stable => "stable",
    Critical => "critical",
    Discharged => "discharged",
});

impl Default for PatientStatus {
    fn default() -> Self {
        Self::Admitted
    }
}

str_enum!(Severity {
    Warning => "warning",
    Critical => "critical",
});

impl Severity {
    /// Numeric rank used for escalation checks. Higher is more urgent.
    pub fn rank(self) -> u8 {
        match self {
            Self::Warning => 1,
            Self::Critical => 2,
        }
    }
}

str_enum!(FindingCategory {
    Vitals => "vitals",
    Trend => "trend",
    Lab => "lab",
});

str_enum!(Direction {
    High => "high",
    Low => "low",
});

str_enum!(VitalParameter {
    HeartRate => "heart_rate",
    SystolicBp => "systolic_bp",
    DiastolicBp => "diastolic_bp",
    Spo2 => "spo2",
    Temperature => "temperature",
    RespiratoryRate => "respiratory_rate",
});

impl VitalParameter {
    /// Evaluation order within a patient. Stable so tests stay deterministic.
    pub const ALL: [VitalParameter; 6] = [
        Self::HeartRate,
        Self::SystolicBp,
        Self::DiastolicBp,
        Self::Spo2,
        Self::Temperature,
        Self::RespiratoryRate,
    ];

    /// Display name used in alert messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::HeartRate => "heart rate",
            Self::SystolicBp => "systolic blood pressure",
            Self::DiastolicBp => "diastolic blood pressure",
            Self::Spo2 => "SpO2",
            Self::Temperature => "temperature",
            Self::RespiratoryRate => "respiratory rate",
        }
    }

    /// Default unit for this vital.
    pub fn unit(self) -> &'static str {
        match self {
            Self::HeartRate => "bpm",
            Self::SystolicBp | Self::DiastolicBp => "mmHg",
            Self::Spo2 => "%",
            Self::Temperature => "°C",
            Self::RespiratoryRate => "/min",
        }
    }
}
