//! Execution options: batch loop and output policy.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Options controlling how the batch executor runs tools and places outputs.
///
/// Populated from the `[execution]` config section and CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOptions {
    /// Keep going after a failed batch item
    pub continue_on_error: bool,
    /// Allow replacing existing output files
    pub overwrite_outputs: bool,
    /// Materialize outputs in memory when the parameter supports it
    pub prefer_in_memory: bool,
    /// Directory for file outputs without an explicit directory
    pub output_dir: Option<PathBuf>,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            continue_on_error: true,
            overwrite_outputs: false,
            prefer_in_memory: false,
            output_dir: None,
        }
    }
}

impl ExecutionOptions {
    // ==================== Builder Methods ====================

    pub fn with_continue_on_error(mut self, value: bool) -> Self {
        self.continue_on_error = value;
        self
    }

    pub fn with_overwrite_outputs(mut self, value: bool) -> Self {
        self.overwrite_outputs = value;
        self
    }

    pub fn with_prefer_in_memory(mut self, value: bool) -> Self {
        self.prefer_in_memory = value;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }
}
