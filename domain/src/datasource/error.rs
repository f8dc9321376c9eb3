//! Datasource errors

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DatasourceError {
    #[error("Failed to open '{}': {reason}", .path.display())]
    Open { path: PathBuf, reason: String },

    #[error("No layers found in '{}'", .path.display())]
    NoLayersFound { path: PathBuf },

    #[error("Unsupported datasource format: '{}'", .path.display())]
    Unsupported { path: PathBuf },

    #[error("Failed to write '{}': {reason}", .path.display())]
    Write { path: PathBuf, reason: String },
}

impl DatasourceError {
    pub fn open(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        DatasourceError::Open {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn write(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        DatasourceError::Write {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        match self {
            DatasourceError::Open { path, .. }
            | DatasourceError::NoLayersFound { path }
            | DatasourceError::Unsupported { path }
            | DatasourceError::Write { path, .. } => path,
        }
    }
}
