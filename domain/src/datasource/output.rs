//! Output destinations decided before a tool body runs.

use crate::datasource::pointer::DatasourcePointer;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a tool body must materialize one output parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum OutputTarget {
    /// Dataset kept in the in-memory store under `name`
    InMemory { name: String },
    /// File at `path`; `overwrite` permits replacing an existing file
    File { path: PathBuf, overwrite: bool },
}

impl OutputTarget {
    pub fn pointer(&self) -> DatasourcePointer {
        match self {
            OutputTarget::InMemory { name } => DatasourcePointer::memory(name),
            OutputTarget::File { path, .. } => DatasourcePointer::new(path),
        }
    }

    pub fn is_in_memory(&self) -> bool {
        matches!(self, OutputTarget::InMemory { .. })
    }
}

impl std::fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.pointer())
    }
}

/// An output a tool body reports as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProducedOutput {
    /// Output parameter the dataset was produced for
    pub parameter: String,
    pub pointer: DatasourcePointer,
    pub in_memory: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_count: Option<usize>,
}

impl ProducedOutput {
    pub fn new(parameter: impl Into<String>, target: &OutputTarget) -> Self {
        Self {
            parameter: parameter.into(),
            pointer: target.pointer(),
            in_memory: target.is_in_memory(),
            feature_count: None,
        }
    }

    pub fn with_feature_count(mut self, count: usize) -> Self {
        self.feature_count = Some(count);
        self
    }
}
