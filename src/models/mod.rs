pub mod enums;
pub mod lab;
pub mod patient;
pub mod vital_sign;

pub use enums::{Direction, FindingCategory, PatientStatus, Severity, VitalParameter};
pub use lab::LabResult;
pub use patient::PatientSnapshot;
pub use vital_sign::{VitalRecord, VitalSigns};
