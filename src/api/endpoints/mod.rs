//! Endpoint handlers grouped by resource.

pub mod alerts;
pub mod health;
pub mod roster;
