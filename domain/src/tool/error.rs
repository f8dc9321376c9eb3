//! Tool declaration and execution errors

use thiserror::Error;

/// A tool body reported failure.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ExecutionFailure {
    pub message: String,
    /// Optional extra detail (e.g. the offending feature)
    pub details: Option<String>,
}

impl ExecutionFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// A tool declaration is unusable. Raised at registration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Tool id must not be empty")]
    EmptyToolId,

    #[error("Tool '{tool}' declares parameter '{parameter}' more than once")]
    DuplicateParameter { tool: String, parameter: String },

    #[error("Tool '{tool}': field parameter '{parameter}' refers to '{layer}', which is not a layer parameter")]
    UnknownFieldLayer {
        tool: String,
        parameter: String,
        layer: String,
    },

    #[error("Tool '{tool}': default of '{parameter}' is invalid: {reason}")]
    InvalidDefault {
        tool: String,
        parameter: String,
        reason: String,
    },

    #[error("Tool '{tool}': no behavior registered for kind '{kind}' of '{parameter}'")]
    NoBehavior {
        tool: String,
        parameter: String,
        kind: String,
    },

    #[error("Tool '{tool}': output parameter '{parameter}' must be an output layer")]
    InvalidOutputParameter { tool: String, parameter: String },
}
