//! RunTool use case
//!
//! Binds parameters, opens inputs, places outputs and drives the tool body
//! through the execution state machine, once (single mode) or per item
//! (batch mode, see [`batch`]).
//!
//! ```text
//! values ─▶ acquire inputs ─▶ bind ─▶ resolve outputs ─▶ run ─▶ close inputs
//!           (owned/borrowed)  (fail-fast)  (no silent overwrite)
//! ```

mod batch;
#[cfg(test)]
mod test_support;
mod types;

pub use types::{BatchItem, BatchRequest, RunToolError};

use crate::config::ExecutionOptions;
use crate::output::{OutputNamer, OutputResolver};
use crate::ports::report_sink::{NoReportSink, ReportEvent, ReportSink};
use crate::use_cases::shared::check_cancelled;
use geotools_domain::parameter::NoLayers;
use geotools_domain::{
    BoundParameters, DatasourceInput, DatasourceProvider, ErrorKind, ExecutionError,
    ExecutionResult, InputSet, OutputTarget, ParameterBinder, ParameterValue, ParameterValues,
    RegisteredTool, ToolContext, ToolDescriptor, ToolExecution, ValidationError,
};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Executes registered tools in single or batch mode.
///
/// The executor is synchronous: tool bodies run to completion on the
/// calling thread and batch items never overlap. Callers that need a
/// responsive UI run it on a blocking worker and cancel through the token.
pub struct BatchExecutor {
    provider: Arc<dyn DatasourceProvider>,
    options: ExecutionOptions,
    cancellation_token: Option<CancellationToken>,
    report_sink: Arc<dyn ReportSink>,
}

impl BatchExecutor {
    pub fn new(provider: Arc<dyn DatasourceProvider>) -> Self {
        Self {
            provider,
            options: ExecutionOptions::default(),
            cancellation_token: None,
            report_sink: Arc::new(NoReportSink),
        }
    }

    pub fn with_options(mut self, options: ExecutionOptions) -> Self {
        self.options = options;
        self
    }

    /// Set a cancellation token checked between batch items
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn with_report_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.report_sink = sink;
        self
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.options
    }

    /// Bind `values` once and run the tool once.
    ///
    /// Every failure propagates to the caller; the tool body never sees an
    /// invalid parameter.
    pub fn run_single(
        &self,
        tool: &RegisteredTool,
        values: &ParameterValues,
    ) -> Result<ExecutionResult, RunToolError> {
        check_cancelled(&self.cancellation_token)?;
        info!(tool = %tool.id(), "Running tool");

        let mut execution = ToolExecution::new(tool.id());
        let mut namer = OutputNamer::new();
        let outcome = self.execute(tool, values, &mut execution, None, &mut namer);
        let result = finish(execution);
        self.record("single_result", &result);

        match outcome {
            Ok(()) => {
                info!(
                    tool = %tool.id(),
                    outputs = result.outputs.len(),
                    duration_ms = result.duration_ms.unwrap_or_default(),
                    "Tool succeeded"
                );
                Ok(result)
            }
            Err(e) => {
                warn!(tool = %tool.id(), error = %e, "Tool failed");
                Err(e)
            }
        }
    }

    /// Drive one execution through the state machine.
    ///
    /// On any failure before the body runs, the execution is rejected;
    /// inputs opened here are closed on every path.
    fn execute(
        &self,
        tool: &RegisteredTool,
        values: &ParameterValues,
        execution: &mut ToolExecution,
        batch_input: Option<&str>,
        namer: &mut OutputNamer,
    ) -> Result<(), RunToolError> {
        let outcome = self.attempt(tool, values, execution, batch_input, namer);
        if let Err(e) = &outcome {
            execution.mark_rejected(e.to_execution_error());
        }
        outcome
    }

    fn attempt(
        &self,
        tool: &RegisteredTool,
        values: &ParameterValues,
        execution: &mut ToolExecution,
        batch_input: Option<&str>,
        namer: &mut OutputNamer,
    ) -> Result<(), RunToolError> {
        let descriptor = tool.descriptor.as_ref();
        ParameterBinder::new(&descriptor.id, &descriptor.parameters).check_names(values)?;

        let mut inputs = self.acquire_inputs(descriptor, values)?;
        let bound = descriptor.bind(values, &inputs)?;
        let outputs = self.resolve_outputs(descriptor, &bound, batch_input, namer)?;
        execution.mark_validated();

        execution.mark_running();
        let ctx = ToolContext::new(descriptor, &bound, &inputs, &outputs);
        let outcome = tool.tool.run(&ctx);
        inputs.close_all();

        match outcome {
            Ok(produced) => {
                execution.mark_succeeded(produced);
                Ok(())
            }
            Err(failure) => {
                let error = RunToolError::Execution {
                    tool: descriptor.id.clone(),
                    failure,
                };
                execution.mark_failed(error.to_execution_error());
                Err(error)
            }
        }
    }

    /// Open (or borrow) the datasource of every bound layer parameter.
    fn acquire_inputs(
        &self,
        descriptor: &ToolDescriptor,
        values: &ParameterValues,
    ) -> Result<InputSet, RunToolError> {
        let mut inputs = InputSet::new();
        for definition in descriptor.layer_parameters() {
            if let Some(datasource) = values.open_layer(&definition.name) {
                inputs.insert(&definition.name, DatasourceInput::borrowed(datasource.clone()));
                continue;
            }

            let Some(value) = values
                .get(&definition.name)
                .or(definition.default_value.as_ref())
            else {
                continue;
            };
            let ParameterValue::Datasource(pointer) = definition.validate(value, &NoLayers)? else {
                continue;
            };
            debug!(parameter = %definition.name, path = %pointer, "Opening input");
            let input = DatasourceInput::open(self.provider.as_ref(), &pointer)?;
            inputs.insert(&definition.name, input);
        }
        Ok(inputs)
    }

    fn resolve_outputs(
        &self,
        descriptor: &ToolDescriptor,
        bound: &BoundParameters,
        batch_input: Option<&str>,
        namer: &mut OutputNamer,
    ) -> Result<Vec<(String, OutputTarget)>, RunToolError> {
        let resolver = OutputResolver::new(self.provider.as_ref(), &self.options);
        let mut targets = Vec::new();
        for definition in descriptor.outputs() {
            let request = bound
                .get_output(&definition.name)
                .ok_or_else(|| ValidationError::missing(&definition.name))?;
            let base = match batch_input {
                Some(input) => OutputNamer::batch_name(input, &request.name),
                None => request.name.clone(),
            };
            let name = namer.claim(&base);
            let target = resolver.resolve(definition, request, &name)?;
            debug!(parameter = %definition.name, target = %target, "Resolved output");
            targets.push((definition.name.clone(), target));
        }
        Ok(targets)
    }

    fn record(&self, event_type: &'static str, payload: &impl Serialize) {
        match serde_json::to_value(payload) {
            Ok(value) => self.report_sink.record(ReportEvent::new(event_type, value)),
            Err(e) => warn!(error = %e, "Failed to serialize report event"),
        }
    }
}

/// Result of a finished execution.
fn finish(execution: ToolExecution) -> ExecutionResult {
    let tool_id = execution.tool_id.clone();
    execution.into_result().unwrap_or_else(|| {
        ExecutionResult::failed(
            tool_id,
            ExecutionError::new(ErrorKind::Execution, "execution did not finish"),
        )
    })
}
