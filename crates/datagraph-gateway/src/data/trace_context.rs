//! Per-request trace context

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one gateway request across log lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TraceContext {
    pub trace_id: String,
    pub route: String,
}

impl TraceContext {
    /// Starts a fresh trace for the given route.
    pub fn for_route(route: impl Into<String>) -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string(),
            route: route.into(),
        }
    }
}
