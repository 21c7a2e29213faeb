//! Shared types for the API layer.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::core_state::CoreState;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
    pub started_at: DateTime<Utc>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self {
            core,
            started_at: Utc::now(),
        }
    }
}
