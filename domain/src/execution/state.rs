//! Execution state machine.
//!
//! Tracks one execution of a tool body. Each [`ExecutionState`] variant
//! carries only the fields meaningful in that state.
//!
//! # State Transitions
//!
//! ```text
//! Unbound ──> Validated ──> Running ──> Succeeded
//!    │            │                └──> Failed
//!    └────────────┴──> Failed (rejected before running)
//! ```
//!
//! Invalid transitions are no-ops. An execution never returns to
//! `Unbound`; a new execution is a new [`ToolExecution`].

use crate::datasource::output::ProducedOutput;
use crate::execution::result::{ExecutionError, ExecutionResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExecutionState {
    /// Parameters not yet validated.
    Unbound,
    /// All parameters passed validation.
    Validated { validated_at: u64 },
    /// Tool body is executing.
    Running { started_at: u64 },
    /// Tool body returned its outputs.
    Succeeded {
        started_at: u64,
        finished_at: u64,
        outputs: Vec<ProducedOutput>,
    },
    /// Rejected before running, or the tool body failed.
    Failed {
        /// `None` when the body never ran
        started_at: Option<u64>,
        failed_at: u64,
        error: ExecutionError,
    },
}

impl ExecutionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unbound => "unbound",
            Self::Validated { .. } => "validated",
            Self::Running { .. } => "running",
            Self::Succeeded { .. } => "succeeded",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }

    /// Time spent in the tool body (only for terminal states that ran).
    pub fn duration_ms(&self) -> Option<u64> {
        match self {
            Self::Succeeded {
                started_at,
                finished_at,
                ..
            } => Some(finished_at.saturating_sub(*started_at)),
            Self::Failed {
                started_at: Some(started_at),
                failed_at,
                ..
            } => Some(failed_at.saturating_sub(*started_at)),
            _ => None,
        }
    }
}

/// One execution of a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolExecution {
    pub tool_id: String,
    pub state: ExecutionState,
}

impl ToolExecution {
    pub fn new(tool_id: impl Into<String>) -> Self {
        Self {
            tool_id: tool_id.into(),
            state: ExecutionState::Unbound,
        }
    }

    /// Unbound -> Validated.
    pub fn mark_validated(&mut self) {
        if self.state == ExecutionState::Unbound {
            self.state = ExecutionState::Validated {
                validated_at: current_timestamp(),
            };
        }
    }

    /// Validated -> Running.
    pub fn mark_running(&mut self) {
        if let ExecutionState::Validated { .. } = self.state {
            self.state = ExecutionState::Running {
                started_at: current_timestamp(),
            };
        }
    }

    /// Running -> Succeeded.
    pub fn mark_succeeded(&mut self, outputs: Vec<ProducedOutput>) {
        if let ExecutionState::Running { started_at } = self.state {
            self.state = ExecutionState::Succeeded {
                started_at,
                finished_at: current_timestamp(),
                outputs,
            };
        }
    }

    /// Running -> Failed.
    pub fn mark_failed(&mut self, error: ExecutionError) {
        if let ExecutionState::Running { started_at } = self.state {
            self.state = ExecutionState::Failed {
                started_at: Some(started_at),
                failed_at: current_timestamp(),
                error,
            };
        }
    }

    /// Unbound/Validated -> Failed, without running the body.
    pub fn mark_rejected(&mut self, error: ExecutionError) {
        if matches!(
            self.state,
            ExecutionState::Unbound | ExecutionState::Validated { .. }
        ) {
            self.state = ExecutionState::Failed {
                started_at: None,
                failed_at: current_timestamp(),
                error,
            };
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn duration_ms(&self) -> Option<u64> {
        self.state.duration_ms()
    }

    /// Convert a terminal execution into its result; `None` otherwise.
    pub fn into_result(self) -> Option<ExecutionResult> {
        let duration = self.state.duration_ms();
        let result = match self.state {
            ExecutionState::Succeeded { outputs, .. } => {
                ExecutionResult::succeeded(self.tool_id, outputs)
            }
            ExecutionState::Failed { error, .. } => ExecutionResult::failed(self.tool_id, error),
            _ => return None,
        };
        Some(result.with_duration(duration))
    }
}

/// Current timestamp in milliseconds.
fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
