//! Presentation layer for geotools
//!
//! This crate contains CLI definitions, parameter argument parsing, output
//! formatters and batch progress reporters.

pub mod cli;
pub mod config;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, RunArgs};
pub use cli::params::{ParamArgError, parse_assignments};
pub use config::OutputConfig;
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{BatchProgressReporter, SimpleProgress};
