//! Logging infrastructure: structured batch reports.
//!
//! Provides [`JsonlReportWriter`], a JSONL file writer that implements the
//! [`ReportSink`](geotools_application::ReportSink) port.

mod jsonl_report;

pub use jsonl_report::JsonlReportWriter;
