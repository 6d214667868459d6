use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::error::CaptureError;

/// Counters for debugging a background capture session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptureDiagnostics {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub period_bytes: usize,
    pub ring_depth: usize,
    pub periods_captured: u64,
    pub periods_delivered: u64,
    /// Unread periods overwritten by the reader thread.
    pub periods_evicted: u64,
    /// Overrun signals handed to the consumer (one per gap, not per period).
    pub ring_overruns: u64,
    pub hardware_overruns: u64,
}

impl CaptureDiagnostics {
    pub fn new(period_bytes: usize, ring_depth: usize) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            period_bytes,
            ring_depth,
            periods_captured: 0,
            periods_delivered: 0,
            periods_evicted: 0,
            ring_overruns: 0,
            hardware_overruns: 0,
        }
    }

    pub fn to_json(&self) -> Result<String, CaptureError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CaptureError::Unknown(format!("failed to serialize diagnostics: {}", e)))
    }
}
