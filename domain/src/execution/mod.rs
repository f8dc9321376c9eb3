//! Execution state and results.

pub mod result;
pub mod state;

pub use result::{
    BatchReport, BatchSummary, ErrorKind, ExecutionError, ExecutionResult, ExecutionStatus,
};
pub use state::{ExecutionState, ToolExecution};
