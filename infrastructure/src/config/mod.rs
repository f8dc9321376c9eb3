//! Configuration file loading for geotools
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Project root: `./geotools.toml` or `./.geotools.toml`
//! 3. Global: `$XDG_CONFIG_HOME/geotools/config.toml`
//! 4. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, FileConfig, FileExecutionConfig, FileOutputConfig, FileReportConfig,
};
pub use loader::ConfigLoader;
