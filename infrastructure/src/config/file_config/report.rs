//! Report configuration from TOML (`[report]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw report configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReportConfig {
    /// JSONL file that batch results are appended to
    pub jsonl_path: Option<PathBuf>,
}
