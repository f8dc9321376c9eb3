//! Types for the RunTool use case

use geotools_domain::{
    ConfigurationError, Datasource, DatasourceError, DatasourcePointer, ErrorKind, ExecutionError,
    ExecutionFailure, ParameterValues, ValidationError,
};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while running a tool
#[derive(Error, Debug)]
pub enum RunToolError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Datasource(#[from] DatasourceError),

    #[error("Tool '{tool}' failed: {failure}")]
    Execution {
        tool: String,
        failure: ExecutionFailure,
    },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Parameter '{parameter}' of tool '{tool}' cannot vary across batch items")]
    InvalidBatchParameter { tool: String, parameter: String },

    #[error("Tool '{0}' has no parameter that can vary across batch items")]
    NoBatchParameter(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl RunToolError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunToolError::Cancelled)
    }

    /// Serializable form recorded in an execution result.
    pub fn to_execution_error(&self) -> ExecutionError {
        match self {
            RunToolError::Validation(e) => {
                ExecutionError::new(ErrorKind::Validation, e.to_string()).with_parameter(e.parameter())
            }
            RunToolError::Datasource(e) => ExecutionError::new(ErrorKind::Datasource, e.to_string()),
            RunToolError::Execution { failure, .. } => {
                let message = match &failure.details {
                    Some(details) => format!("{} ({})", failure.message, details),
                    None => failure.message.clone(),
                };
                ExecutionError::new(ErrorKind::Execution, message)
            }
            RunToolError::Configuration(_)
            | RunToolError::InvalidBatchParameter { .. }
            | RunToolError::NoBatchParameter(_) => {
                ExecutionError::new(ErrorKind::Configuration, self.to_string())
            }
            RunToolError::Cancelled => ExecutionError::new(ErrorKind::Cancelled, self.to_string()),
        }
    }
}

/// One input of a batch run.
#[derive(Debug, Clone)]
pub enum BatchItem {
    /// Opened (and closed) by the executor for this item only
    Pointer(DatasourcePointer),
    /// Already open; borrowed, never closed by the executor
    Open(Arc<dyn Datasource>),
}

impl BatchItem {
    /// Name the item's output names derive from.
    pub fn name(&self) -> String {
        match self {
            BatchItem::Pointer(pointer) => pointer.name(),
            BatchItem::Open(ds) => ds.pointer().name(),
        }
    }
}

impl From<DatasourcePointer> for BatchItem {
    fn from(pointer: DatasourcePointer) -> Self {
        BatchItem::Pointer(pointer)
    }
}

impl From<PathBuf> for BatchItem {
    fn from(path: PathBuf) -> Self {
        BatchItem::Pointer(DatasourcePointer::new(path))
    }
}

impl From<&str> for BatchItem {
    fn from(path: &str) -> Self {
        BatchItem::Pointer(DatasourcePointer::parse(path))
    }
}

impl From<Arc<dyn Datasource>> for BatchItem {
    fn from(ds: Arc<dyn Datasource>) -> Self {
        BatchItem::Open(ds)
    }
}

/// Input for a batch run
#[derive(Debug, Clone, Default)]
pub struct BatchRequest {
    /// Items in processing order
    pub items: Vec<BatchItem>,
    /// Values held constant across items
    pub shared: ParameterValues,
    /// Parameter rebound per item; defaults to the tool's first layer
    /// (or batch filename) parameter
    pub batch_parameter: Option<String>,
    /// Overrides [`ExecutionOptions::continue_on_error`](crate::config::ExecutionOptions)
    pub continue_on_error: Option<bool>,
}

impl BatchRequest {
    pub fn new(items: impl IntoIterator<Item = impl Into<BatchItem>>) -> Self {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_shared(mut self, shared: ParameterValues) -> Self {
        self.shared = shared;
        self
    }

    pub fn with_batch_parameter(mut self, name: impl Into<String>) -> Self {
        self.batch_parameter = Some(name.into());
        self
    }

    pub fn with_continue_on_error(mut self, value: bool) -> Self {
        self.continue_on_error = Some(value);
        self
    }
}
