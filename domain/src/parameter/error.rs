//! Parameter validation errors

use crate::parameter::kind::{DataKind, DataSourceType, ParameterKindTag};
use std::path::PathBuf;
use thiserror::Error;

/// A parameter value was missing or invalid.
///
/// Every variant names the offending parameter so the caller can point the
/// user at the right input element.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required parameter '{parameter}'")]
    Missing { parameter: String },

    #[error("Unknown parameter '{parameter}' for tool '{tool}'")]
    Unknown { parameter: String, tool: String },

    #[error("Parameter '{parameter}': expected {expected} value, got {found}")]
    TypeMismatch {
        parameter: String,
        expected: ParameterKindTag,
        found: &'static str,
    },

    #[error("Parameter '{parameter}': value must be a finite number")]
    NotFinite { parameter: String },

    #[error("Parameter '{parameter}': value {value} is outside the allowed range {range}")]
    OutOfRange {
        parameter: String,
        value: String,
        range: String,
    },

    #[error("Parameter '{parameter}': '{value}' is not one of [{}]", .choices.join(", "))]
    InvalidOption {
        parameter: String,
        value: String,
        choices: Vec<String>,
    },

    #[error("Parameter '{parameter}': field '{field}' not found in the layer bound to '{layer}'")]
    FieldNotFound {
        parameter: String,
        field: String,
        layer: String,
    },

    #[error("Parameter '{parameter}': layer parameter '{layer}' is not bound")]
    LayerNotBound { parameter: String, layer: String },

    #[error(
        "Parameter '{parameter}': '{}' is not a {data_type} file (expected one of: {})",
        .path.display(),
        .data_type.extensions().join(", ")
    )]
    InvalidExtension {
        parameter: String,
        path: PathBuf,
        data_type: DataKind,
    },

    #[error("Parameter '{parameter}': expected a {expected} datasource, got {found}")]
    WrongSourceType {
        parameter: String,
        expected: DataSourceType,
        found: DataSourceType,
    },

    #[error("Parameter '{parameter}': in-memory output is not supported")]
    InMemoryNotSupported { parameter: String },

    #[error(
        "Parameter '{parameter}': output '{}' already exists (enable overwrite to replace it)",
        .path.display()
    )]
    OutputExists { parameter: String, path: PathBuf },

    #[error("Parameter '{parameter}': {reason}")]
    Invalid { parameter: String, reason: String },
}

impl ValidationError {
    pub fn missing(parameter: impl Into<String>) -> Self {
        ValidationError::Missing {
            parameter: parameter.into(),
        }
    }

    pub fn invalid(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::Invalid {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Name of the parameter that failed validation.
    pub fn parameter(&self) -> &str {
        match self {
            ValidationError::Missing { parameter }
            | ValidationError::Unknown { parameter, .. }
            | ValidationError::TypeMismatch { parameter, .. }
            | ValidationError::NotFinite { parameter }
            | ValidationError::OutOfRange { parameter, .. }
            | ValidationError::InvalidOption { parameter, .. }
            | ValidationError::FieldNotFound { parameter, .. }
            | ValidationError::LayerNotBound { parameter, .. }
            | ValidationError::InvalidExtension { parameter, .. }
            | ValidationError::WrongSourceType { parameter, .. }
            | ValidationError::InMemoryNotSupported { parameter }
            | ValidationError::OutputExists { parameter, .. }
            | ValidationError::Invalid { parameter, .. } => parameter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_not_found_names_both_parameters() {
        let err = ValidationError::FieldNotFound {
            parameter: "Field".into(),
            field: "population".into(),
            layer: "InputLayer".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'Field'"));
        assert!(msg.contains("'InputLayer'"));
        assert!(msg.contains("population"));
        assert_eq!(err.parameter(), "Field");
    }

    #[test]
    fn test_invalid_extension_lists_expected() {
        let err = ValidationError::InvalidExtension {
            parameter: "Grid".into(),
            path: PathBuf::from("roads.shp"),
            data_type: DataKind::Grid,
        };
        assert!(err.to_string().contains("roads.shp"));
        assert!(err.to_string().contains("asc"));
    }

    #[test]
    fn test_missing_display() {
        assert_eq!(
            ValidationError::missing("BufferDistance").to_string(),
            "Missing required parameter 'BufferDistance'"
        );
    }
}
