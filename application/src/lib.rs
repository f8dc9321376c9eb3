//! Application layer for geotools
//!
//! This crate contains the batch execution use case, port definitions, and
//! execution options. It depends only on the domain layer.

pub mod config;
pub mod output;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionOptions;
pub use output::{OutputNamer, OutputResolver};
pub use ports::{
    progress::{BatchProgressNotifier, NoProgress},
    report_sink::{NoReportSink, ReportEvent, ReportSink},
};
pub use use_cases::run_tool::{BatchExecutor, BatchItem, BatchRequest, RunToolError};
