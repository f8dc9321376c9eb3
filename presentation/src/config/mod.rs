//! Presentation-level configuration
//!
//! Configuration for terminal output.

use serde::{Deserialize, Serialize};

/// Output configuration for the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Enable colored terminal output
    pub color: bool,
    /// Show a progress bar during batch runs
    pub show_progress: bool,
    /// Print results as JSON instead of text
    pub json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            show_progress: true,
            json: false,
        }
    }
}

impl OutputConfig {
    /// Apply to the process-wide color setting.
    pub fn apply_color(&self) {
        if !self.color {
            colored::control::set_override(false);
        }
    }
}
