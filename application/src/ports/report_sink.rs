//! Port for structured execution reports.
//!
//! Defines the [`ReportSink`] trait for recording execution results to a
//! machine-readable log (e.g. JSONL), separate from `tracing` diagnostics.

use serde_json::Value;

/// A structured report event.
pub struct ReportEvent {
    /// Event type identifier (`item_result`, `batch_summary`, `single_result`)
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ReportEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for recording report events.
///
/// `record` is synchronous and non-fallible; a failing sink must not
/// disturb the run it reports on.
pub trait ReportSink: Send + Sync {
    fn record(&self, event: ReportEvent);
}

/// No-op implementation for tests and when reporting is disabled.
pub struct NoReportSink;

impl ReportSink for NoReportSink {
    fn record(&self, _event: ReportEvent) {}
}
