//! Progress notification port
//!
//! Defines the interface for reporting progress during batch execution.

use geotools_domain::{BatchReport, ExecutionResult};

/// Callback for progress updates during a batch run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bar, plain log lines, etc.)
pub trait BatchProgressNotifier: Send + Sync {
    /// Called once before the first item
    fn on_batch_start(&self, tool_id: &str, total_items: usize);

    /// Called before an item is attempted
    fn on_item_start(&self, _index: usize, _input_name: &str) {}

    /// Called for every item, including skipped ones
    fn on_item_complete(&self, result: &ExecutionResult);

    /// Called once with the final report
    fn on_batch_complete(&self, report: &BatchReport);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl BatchProgressNotifier for NoProgress {
    fn on_batch_start(&self, _tool_id: &str, _total_items: usize) {}
    fn on_item_complete(&self, _result: &ExecutionResult) {}
    fn on_batch_complete(&self, _report: &BatchReport) {}
}
