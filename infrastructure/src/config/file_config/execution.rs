//! Execution configuration from TOML (`[execution]` section)

use geotools_application::ExecutionOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw execution configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExecutionConfig {
    /// Keep running remaining batch items after a failure
    pub continue_on_error: bool,
    /// Replace existing output files
    pub overwrite_outputs: bool,
    /// Keep outputs in memory when the tool supports it
    pub prefer_in_memory: bool,
    /// Directory for output files without an explicit directory
    pub output_dir: Option<PathBuf>,
}

impl Default for FileExecutionConfig {
    fn default() -> Self {
        let options = ExecutionOptions::default();
        Self {
            continue_on_error: options.continue_on_error,
            overwrite_outputs: options.overwrite_outputs,
            prefer_in_memory: options.prefer_in_memory,
            output_dir: None,
        }
    }
}

impl FileExecutionConfig {
    /// Convert to application-layer [`ExecutionOptions`].
    pub fn to_execution_options(&self) -> ExecutionOptions {
        let mut options = ExecutionOptions::default()
            .with_continue_on_error(self.continue_on_error)
            .with_overwrite_outputs(self.overwrite_outputs)
            .with_prefer_in_memory(self.prefer_in_memory);
        if let Some(dir) = &self.output_dir {
            options = options.with_output_dir(dir.clone());
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_section_deserialize() {
        let toml_str = r#"
[execution]
continue_on_error = false
overwrite_outputs = true
output_dir = "out"
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        assert!(!config.execution.continue_on_error);
        assert!(config.execution.overwrite_outputs);
        assert!(!config.execution.prefer_in_memory);

        let options = config.execution.to_execution_options();
        assert!(!options.continue_on_error);
        assert!(options.overwrite_outputs);
        assert_eq!(options.output_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn test_defaults_match_execution_options() {
        let options = FileExecutionConfig::default().to_execution_options();
        assert_eq!(options, ExecutionOptions::default());
    }
}
