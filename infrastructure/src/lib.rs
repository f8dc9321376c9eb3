//! Infrastructure layer for geotools
//!
//! This crate contains adapters that implement the ports defined in the
//! domain and application layers: datasource backends, builtin tools,
//! configuration file loading and JSONL batch reports.

pub mod config;
pub mod datasource;
pub mod logging;
pub mod tools;

// Re-export commonly used types
pub use config::{
    ConfigIssue, ConfigLoader, FileConfig, FileExecutionConfig, FileOutputConfig,
    FileReportConfig,
};
pub use datasource::{FsDatasourceProvider, MemoryStore};
pub use logging::JsonlReportWriter;
pub use tools::register_builtin_tools;
