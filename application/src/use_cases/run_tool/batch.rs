//! Batch mode: one execution per input item.

use super::types::{BatchItem, BatchRequest, RunToolError};
use super::{BatchExecutor, finish};
use crate::output::OutputNamer;
use crate::ports::progress::BatchProgressNotifier;
use crate::use_cases::shared::check_cancelled;
use geotools_domain::{
    BatchReport, ExecutionResult, ParameterBinder, ParameterDefinition, ParameterValue,
    ParameterValues, RegisteredTool, ToolExecution,
};
use serde_json::json;
use tracing::{info, warn};

impl BatchExecutor {
    /// Run `tool` once per item of `request`.
    ///
    /// Only the batch parameter is rebound per item; shared values stay
    /// constant. Items run in order and never overlap. Item failures are
    /// captured in that item's result; with `continue_on_error` off the
    /// first failure halts the batch and the remaining items are reported
    /// as skipped. Cancellation is checked between items.
    ///
    /// Errors are returned only for problems that affect every item (no
    /// usable batch parameter, unknown shared parameter names).
    pub fn run_batch(
        &self,
        tool: &RegisteredTool,
        request: BatchRequest,
        progress: &dyn BatchProgressNotifier,
    ) -> Result<BatchReport, RunToolError> {
        let descriptor = tool.descriptor.as_ref();
        let batch_parameter = match &request.batch_parameter {
            Some(name) => descriptor.batch_parameter(Some(name.as_str())).ok_or_else(|| {
                RunToolError::InvalidBatchParameter {
                    tool: descriptor.id.clone(),
                    parameter: name.clone(),
                }
            })?,
            None => descriptor
                .batch_parameter(None)
                .ok_or_else(|| RunToolError::NoBatchParameter(descriptor.id.clone()))?,
        };
        ParameterBinder::new(&descriptor.id, &descriptor.parameters).check_names(&request.shared)?;

        let continue_on_error = request
            .continue_on_error
            .unwrap_or(self.options.continue_on_error);
        let total = request.items.len();
        info!(
            tool = %descriptor.id,
            items = total,
            batch_parameter = %batch_parameter.name,
            continue_on_error,
            "Starting batch run"
        );
        progress.on_batch_start(&descriptor.id, total);

        let mut namer = OutputNamer::new();
        let mut results = Vec::with_capacity(total);
        let mut halted = false;
        let mut cancelled = false;

        for (index, item) in request.items.iter().enumerate() {
            let input_name = item.name();

            if !halted && !cancelled && check_cancelled(&self.cancellation_token).is_err() {
                info!(tool = %descriptor.id, item = index, "Batch cancelled");
                cancelled = true;
            }
            if halted || cancelled {
                let result = ExecutionResult::skipped(&descriptor.id).with_item(index, Some(input_name));
                progress.on_item_complete(&result);
                results.push(result);
                continue;
            }

            progress.on_item_start(index, &input_name);
            let values = item_values(&request.shared, batch_parameter, item);
            let mut execution = ToolExecution::new(&descriptor.id);
            let outcome = self.execute(tool, &values, &mut execution, Some(input_name.as_str()), &mut namer);
            let result = finish(execution).with_item(index, Some(input_name.clone()));

            match &outcome {
                Ok(()) => info!(
                    tool = %descriptor.id,
                    item = index,
                    input = %input_name,
                    status = %result.status,
                    "Batch item finished"
                ),
                Err(e) => warn!(
                    tool = %descriptor.id,
                    item = index,
                    input = %input_name,
                    error = %e,
                    "Batch item failed"
                ),
            }

            self.record("item_result", &result);
            progress.on_item_complete(&result);
            results.push(result);

            if outcome.is_err() && !continue_on_error {
                info!(tool = %descriptor.id, item = index, "Stopping batch after failure");
                halted = true;
            }
        }

        let report = BatchReport::new(&descriptor.id, results)
            .with_cancelled(cancelled)
            .with_halted(halted);
        info!(tool = %descriptor.id, summary = %report.summary, "Batch run complete");
        self.record(
            "batch_summary",
            &json!({
                "tool_id": report.tool_id,
                "summary": report.summary,
                "cancelled": report.cancelled,
                "halted": report.halted,
            }),
        );
        progress.on_batch_complete(&report);
        Ok(report)
    }
}

/// Shared values with the batch parameter bound to `item`.
fn item_values(
    shared: &ParameterValues,
    batch_parameter: &ParameterDefinition,
    item: &BatchItem,
) -> ParameterValues {
    let mut values = shared.clone();
    let name = &batch_parameter.name;
    values.remove(name);
    match (item, batch_parameter.kind.is_layer()) {
        (BatchItem::Open(ds), true) => values.set_open_layer(name, ds.clone()),
        (BatchItem::Open(ds), false) => {
            values.set(name, ParameterValue::Path(ds.filename().to_path_buf()))
        }
        (BatchItem::Pointer(pointer), true) => {
            values.set(name, ParameterValue::Datasource(pointer.clone()))
        }
        (BatchItem::Pointer(pointer), false) => {
            values.set(name, ParameterValue::Path(pointer.path.clone()))
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::ports::progress::NoProgress;
    use geotools_domain::{
        BatchSummary, Datasource, DatasourcePointer, ErrorKind, ExecutionStatus, OutputTarget,
    };
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::Ordering;
    use tokio_util::sync::CancellationToken;

    fn shared() -> ParameterValues {
        ParameterValues::new()
            .with_value("BufferDistance", 25.0)
            .with_value("MergeResults", false)
    }

    fn statuses(report: &BatchReport) -> Vec<ExecutionStatus> {
        report.results.iter().map(|r| r.status).collect()
    }

    #[test]
    fn test_continue_on_error_runs_every_item_in_order() {
        let fixture = Fixture::new();
        let request = BatchRequest::new(["a.geojson", "bad.geojson", "missing.geojson", "d.geojson"])
            .with_shared(shared())
            .with_continue_on_error(true);

        let report = fixture
            .executor()
            .run_batch(&fixture.tool, request, &NoProgress)
            .unwrap();

        assert_eq!(
            statuses(&report),
            vec![
                ExecutionStatus::Succeeded,
                ExecutionStatus::Failed,
                ExecutionStatus::Failed,
                ExecutionStatus::Succeeded,
            ]
        );
        let indices: Vec<_> = report.results.iter().map(|r| r.item_index).collect();
        assert_eq!(indices, vec![Some(0), Some(1), Some(2), Some(3)]);
        assert_eq!(
            report.summary,
            BatchSummary {
                total: 4,
                succeeded: 2,
                failed: 2,
                skipped: 0
            }
        );
        assert_eq!(
            report.results[1].error.as_ref().unwrap().kind,
            ErrorKind::Execution
        );
        assert_eq!(
            report.results[2].error.as_ref().unwrap().kind,
            ErrorKind::Datasource
        );
        assert!(!report.halted);
        // every opened input closed, one per attempted item that opened
        assert_eq!(fixture.closes.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_stop_on_error_skips_remaining_items() {
        let fixture = Fixture::new();
        let request = BatchRequest::new(["a.geojson", "bad.geojson", "c.geojson", "d.geojson"])
            .with_shared(shared())
            .with_continue_on_error(false);

        let report = fixture
            .executor()
            .run_batch(&fixture.tool, request, &NoProgress)
            .unwrap();

        assert_eq!(
            statuses(&report),
            vec![
                ExecutionStatus::Succeeded,
                ExecutionStatus::Failed,
                ExecutionStatus::Skipped,
                ExecutionStatus::Skipped,
            ]
        );
        assert!(report.halted);
        assert_eq!(fixture.body.segments().len(), 1);
        assert_eq!(report.results.len(), 4);
    }

    #[test]
    fn test_shared_values_stay_constant_and_defaults_apply() {
        let fixture = Fixture::new();
        let request = BatchRequest::new(["a.geojson", "b.geojson"])
            .with_shared(shared().with_value("NumSegments", 12));
        fixture
            .executor()
            .run_batch(&fixture.tool, request, &NoProgress)
            .unwrap();
        assert_eq!(fixture.body.segments(), vec![12, 12]);

        let request = BatchRequest::new(["a.geojson"]).with_shared(shared());
        let fixture = Fixture::new();
        fixture
            .executor()
            .run_batch(&fixture.tool, request, &NoProgress)
            .unwrap();
        assert_eq!(fixture.body.segments(), vec![30]);
    }

    #[test]
    fn test_output_names_derive_from_input_and_never_collide() {
        let fixture = Fixture::new();
        let request = BatchRequest::new([
            "2020/parcels.geojson",
            "2021/parcels.geojson",
            "roads.geojson",
        ])
        .with_shared(shared());

        let report = fixture
            .executor()
            .run_batch(&fixture.tool, request, &NoProgress)
            .unwrap();

        let names: Vec<String> = report
            .results
            .iter()
            .map(|r| r.outputs[0].pointer.name())
            .collect();
        assert_eq!(
            names,
            vec!["parcels_Buffer", "parcels_Buffer_2", "roads_Buffer"]
        );
    }

    #[test]
    fn test_cancellation_between_items() {
        let fixture = Fixture::new();
        let token = CancellationToken::new();
        fixture.body.cancel_after_first(token.clone());
        let request = BatchRequest::new(["a.geojson", "b.geojson", "c.geojson"]).with_shared(shared());

        let report = fixture
            .executor()
            .with_cancellation(token)
            .run_batch(&fixture.tool, request, &NoProgress)
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(
            statuses(&report),
            vec![
                ExecutionStatus::Succeeded,
                ExecutionStatus::Skipped,
                ExecutionStatus::Skipped,
            ]
        );
    }

    #[test]
    fn test_open_items_are_borrowed() {
        let fixture = Fixture::new();
        let a: Arc<dyn Datasource> = Arc::new(fixture.layer("a.geojson"));
        let b: Arc<dyn Datasource> = Arc::new(fixture.layer("b.geojson"));
        let request = BatchRequest::new([BatchItem::Open(a.clone()), BatchItem::Open(b)])
            .with_shared(shared());

        let report = fixture
            .executor()
            .run_batch(&fixture.tool, request, &NoProgress)
            .unwrap();

        assert!(report.all_succeeded());
        assert_eq!(fixture.closes.load(Ordering::SeqCst), 0);
        assert_eq!(report.results[0].input_name.as_deref(), Some("a"));
        assert_eq!(Arc::strong_count(&a), 1);
    }

    #[test]
    fn test_in_memory_outputs_in_batch() {
        let fixture = Fixture::new();
        let request = BatchRequest::new([DatasourcePointer::new("a.geojson")])
            .with_shared(shared().with_value("Output", "memory:Buffer"));
        let report = fixture
            .executor()
            .run_batch(&fixture.tool, request, &NoProgress)
            .unwrap();
        let output = &report.results[0].outputs[0];
        assert!(output.in_memory);
        assert_eq!(
            output.pointer,
            OutputTarget::InMemory {
                name: "a_Buffer".into()
            }
            .pointer()
        );
    }

    #[test]
    fn test_invalid_batch_parameter() {
        let fixture = Fixture::new();
        let request = BatchRequest::new(["a.geojson"]).with_batch_parameter("BufferDistance");
        let err = fixture
            .executor()
            .run_batch(&fixture.tool, request, &NoProgress)
            .unwrap_err();
        assert!(matches!(err, RunToolError::InvalidBatchParameter { .. }));
    }

    #[test]
    fn test_unknown_shared_parameter_rejected_up_front() {
        let fixture = Fixture::new();
        let request = BatchRequest::new(["a.geojson"])
            .with_shared(shared().with_value("Colour", "red"));
        let err = fixture
            .executor()
            .run_batch(&fixture.tool, request, &NoProgress)
            .unwrap_err();
        assert!(matches!(err, RunToolError::Validation(_)));
        assert!(fixture.body.segments().is_empty());
    }

    struct CountingProgress {
        events: Mutex<Vec<String>>,
    }

    impl BatchProgressNotifier for CountingProgress {
        fn on_batch_start(&self, tool_id: &str, total_items: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("start {} {}", tool_id, total_items));
        }

        fn on_item_complete(&self, result: &ExecutionResult) {
            self.events.lock().unwrap().push(result.status.to_string());
        }

        fn on_batch_complete(&self, report: &BatchReport) {
            self.events
                .lock()
                .unwrap()
                .push(format!("done {}", report.summary.total));
        }
    }

    #[test]
    fn test_progress_and_report_events() {
        let fixture = Fixture::new();
        let progress = CountingProgress {
            events: Mutex::new(Vec::new()),
        };
        let sink = Arc::new(RecordingSink::default());
        let request = BatchRequest::new(["a.geojson", "bad.geojson", "c.geojson"])
            .with_shared(shared())
            .with_continue_on_error(false);

        fixture
            .executor()
            .with_report_sink(sink.clone())
            .run_batch(&fixture.tool, request, &progress)
            .unwrap();

        assert_eq!(
            *progress.events.lock().unwrap(),
            vec!["start buffer 3", "succeeded", "failed", "skipped", "done 3"]
        );
        assert_eq!(
            sink.event_types(),
            vec!["item_result", "item_result", "batch_summary"]
        );
    }
}
