//! Execution outcomes and batch reports.

use crate::datasource::output::ProducedOutput;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Succeeded,
    Failed,
    /// Never attempted (halted or cancelled batch)
    Skipped,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Succeeded => "succeeded",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Category of a failure recorded in a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Validation,
    Datasource,
    Execution,
    Configuration,
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Datasource => "datasource",
            ErrorKind::Execution => "execution",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Serializable failure detail of one execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionError {
    pub kind: ErrorKind,
    pub message: String,
    /// Offending parameter, for validation failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

impl ExecutionError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            parameter: None,
        }
    }

    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = Some(parameter.into());
        self
    }
}

impl std::fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {}", self.kind, self.message)
    }
}

/// Outcome of one execution (one batch item in batch mode).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub tool_id: String,
    /// Position in the batch; `None` in single mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_index: Option<usize>,
    /// Name of the varying input, when there is one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_name: Option<String>,
    pub status: ExecutionStatus,
    #[serde(default)]
    pub outputs: Vec<ProducedOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ExecutionError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl ExecutionResult {
    fn new(tool_id: impl Into<String>, status: ExecutionStatus) -> Self {
        Self {
            tool_id: tool_id.into(),
            item_index: None,
            input_name: None,
            status,
            outputs: Vec::new(),
            error: None,
            duration_ms: None,
        }
    }

    pub fn succeeded(tool_id: impl Into<String>, outputs: Vec<ProducedOutput>) -> Self {
        let mut result = Self::new(tool_id, ExecutionStatus::Succeeded);
        result.outputs = outputs;
        result
    }

    pub fn failed(tool_id: impl Into<String>, error: ExecutionError) -> Self {
        let mut result = Self::new(tool_id, ExecutionStatus::Failed);
        result.error = Some(error);
        result
    }

    pub fn skipped(tool_id: impl Into<String>) -> Self {
        Self::new(tool_id, ExecutionStatus::Skipped)
    }

    pub fn with_item(mut self, index: usize, input_name: Option<String>) -> Self {
        self.item_index = Some(index);
        self.input_name = input_name;
        self
    }

    pub fn with_duration(mut self, duration_ms: Option<u64>) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Succeeded
    }
}

/// Aggregate counts of a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[ExecutionResult]) -> Self {
        results.iter().fold(
            Self {
                total: results.len(),
                ..Self::default()
            },
            |mut acc, r| {
                match r.status {
                    ExecutionStatus::Succeeded => acc.succeeded += 1,
                    ExecutionStatus::Failed => acc.failed += 1,
                    ExecutionStatus::Skipped => acc.skipped += 1,
                }
                acc
            },
        )
    }
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} total, {} succeeded, {} failed, {} skipped",
            self.total, self.succeeded, self.failed, self.skipped
        )
    }
}

/// Complete report of a batch run, produced even when halted early.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub tool_id: String,
    /// One result per input item, in input order
    pub results: Vec<ExecutionResult>,
    pub summary: BatchSummary,
    /// Stopped by a cancellation request
    pub cancelled: bool,
    /// Stopped by the first failure (stop-on-error)
    pub halted: bool,
}

impl BatchReport {
    pub fn new(tool_id: impl Into<String>, results: Vec<ExecutionResult>) -> Self {
        let summary = BatchSummary::from_results(&results);
        Self {
            tool_id: tool_id.into(),
            results,
            summary,
            cancelled: false,
            halted: false,
        }
    }

    pub fn with_cancelled(mut self, cancelled: bool) -> Self {
        self.cancelled = cancelled;
        self
    }

    pub fn with_halted(mut self, halted: bool) -> Self {
        self.halted = halted;
        self
    }

    pub fn all_succeeded(&self) -> bool {
        self.summary.succeeded == self.summary.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let results = vec![
            ExecutionResult::succeeded("buffer", Vec::new()).with_item(0, None),
            ExecutionResult::failed("buffer", ExecutionError::new(ErrorKind::Execution, "boom"))
                .with_item(1, None),
            ExecutionResult::skipped("buffer").with_item(2, None),
            ExecutionResult::skipped("buffer").with_item(3, None),
        ];
        let report = BatchReport::new("buffer", results).with_halted(true);
        assert_eq!(
            report.summary,
            BatchSummary {
                total: 4,
                succeeded: 1,
                failed: 1,
                skipped: 2
            }
        );
        assert!(!report.all_succeeded());
        assert_eq!(
            report.summary.to_string(),
            "4 total, 1 succeeded, 1 failed, 2 skipped"
        );
    }

    #[test]
    fn test_result_serializes_status_lowercase() {
        let result = ExecutionResult::failed(
            "buffer",
            ExecutionError::new(ErrorKind::Validation, "missing").with_parameter("BufferDistance"),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"]["kind"], "validation");
        assert_eq!(json["error"]["parameter"], "BufferDistance");
        assert!(json.get("item_index").is_none());
    }
}
