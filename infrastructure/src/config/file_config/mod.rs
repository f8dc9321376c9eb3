//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.

mod execution;
mod output;
mod report;

pub use execution::FileExecutionConfig;
pub use output::FileOutputConfig;
pub use report::FileReportConfig;

use serde::{Deserialize, Serialize};

/// A problem found in an otherwise loadable configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// Dotted path of the offending key, e.g. `execution.output_dir`
    pub field: String,
    pub message: String,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Execution settings
    pub execution: FileExecutionConfig,
    /// Report settings
    pub report: FileReportConfig,
    /// Terminal output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the configuration, returning warnings.
    ///
    /// Issues never prevent loading; the caller decides whether to print
    /// them.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if let Some(dir) = &self.execution.output_dir {
            if dir.as_os_str().is_empty() {
                issues.push(ConfigIssue {
                    field: "execution.output_dir".to_string(),
                    message: "execution.output_dir is empty, using the working directory"
                        .to_string(),
                });
            } else if dir.is_file() {
                issues.push(ConfigIssue {
                    field: "execution.output_dir".to_string(),
                    message: format!(
                        "execution.output_dir '{}' is a file, not a directory",
                        dir.display()
                    ),
                });
            }
        }

        if let Some(path) = &self.report.jsonl_path {
            if path.is_dir() {
                issues.push(ConfigIssue {
                    field: "report.jsonl_path".to_string(),
                    message: format!("report.jsonl_path '{}' is a directory", path.display()),
                });
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[execution]
continue_on_error = true
overwrite_outputs = false
prefer_in_memory = true
output_dir = "out"

[report]
jsonl_path = "reports/batch.jsonl"

[output]
color = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(config.execution.prefer_in_memory);
        assert_eq!(config.execution.output_dir, Some(PathBuf::from("out")));
        assert_eq!(
            config.report.jsonl_path,
            Some(PathBuf::from("reports/batch.jsonl"))
        );
        assert!(!config.output.color);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: FileConfig = toml::from_str("[report]\n").unwrap();
        assert!(config.execution.continue_on_error);
        assert!(config.report.jsonl_path.is_none());
        assert!(config.output.progress);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(FileConfig::default().validate().is_empty());
    }

    #[test]
    fn test_validate_output_dir_is_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut config = FileConfig::default();
        config.execution.output_dir = Some(file.path().to_path_buf());

        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "execution.output_dir");
    }

    #[test]
    fn test_validate_report_path_is_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = FileConfig::default();
        config.report.jsonl_path = Some(dir.path().to_path_buf());

        let issues = config.validate();
        assert_eq!(issues[0].field, "report.jsonl_path");
    }
}
