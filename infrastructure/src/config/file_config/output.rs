//! Output configuration from TOML (`[output]` section)

use serde::{Deserialize, Serialize};

/// Raw terminal output configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Enable colored terminal output
    pub color: bool,
    /// Show a progress bar during batch runs
    pub progress: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            progress: true,
        }
    }
}
