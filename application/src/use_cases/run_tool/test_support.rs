//! Test doubles for the RunTool use case.

use super::BatchExecutor;
use crate::config::ExecutionOptions;
use crate::ports::report_sink::{ReportEvent, ReportSink};
use geotools_domain::{
    DataSourceType, Datasource, DatasourceError, DatasourcePointer, DatasourceProvider,
    ExecutionFailure, FieldInfo, FieldType, GisTool, ParameterDefinition, ProducedOutput,
    RegisteredTool, ToolContext, ToolDescriptor, ToolRegistry,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub struct StubLayer {
    path: PathBuf,
    closes: Arc<AtomicUsize>,
}

impl Datasource for StubLayer {
    fn filename(&self) -> &Path {
        &self.path
    }

    fn source_type(&self) -> DataSourceType {
        DataSourceType::Vector
    }

    fn fields(&self) -> Vec<FieldInfo> {
        vec![FieldInfo::new("owner", FieldType::String)]
    }

    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Opens any path; `missing*` fails to open, `empty*` has no layers.
pub struct StubProvider {
    closes: Arc<AtomicUsize>,
}

impl DatasourceProvider for StubProvider {
    fn open(&self, pointer: &DatasourcePointer) -> Result<Box<dyn Datasource>, DatasourceError> {
        let stem = pointer.name();
        if stem.starts_with("missing") {
            return Err(DatasourceError::open(&pointer.path, "No such file or directory"));
        }
        if stem.starts_with("empty") {
            return Err(DatasourceError::NoLayersFound {
                path: pointer.path.clone(),
            });
        }
        Ok(Box::new(StubLayer {
            path: pointer.path.clone(),
            closes: self.closes.clone(),
        }))
    }
}

/// Buffer-shaped tool body that fails on inputs named `bad*`.
#[derive(Default)]
pub struct RecordingTool {
    segments: Mutex<Vec<i64>>,
    cancel_after_first: Mutex<Option<CancellationToken>>,
}

impl RecordingTool {
    pub fn segments(&self) -> Vec<i64> {
        self.segments.lock().unwrap().clone()
    }

    pub fn cancel_after_first(&self, token: CancellationToken) {
        *self.cancel_after_first.lock().unwrap() = Some(token);
    }
}

impl GisTool for RecordingTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new("buffer", "Buffer by distance")
            .with_group("vector-geometry")
            .with_parameter(ParameterDefinition::vector_layer("InputLayer", "Input layer"))
            .with_parameter(ParameterDefinition::double("BufferDistance", "Buffer distance"))
            .with_parameter(ParameterDefinition::integer("NumSegments", "Segments").with_default(30))
            .with_parameter(ParameterDefinition::boolean("MergeResults", "Merge results"))
            .with_parameter(ParameterDefinition::vector_output("Output", "Output").with_default("Buffer"))
    }

    fn run(&self, ctx: &ToolContext<'_>) -> Result<Vec<ProducedOutput>, ExecutionFailure> {
        if let Some(token) = self.cancel_after_first.lock().unwrap().as_ref() {
            token.cancel();
        }
        let input = ctx.input("InputLayer")?;
        if input.pointer().name().starts_with("bad") {
            return Err(ExecutionFailure::new("unsupported geometry"));
        }
        self.segments.lock().unwrap().push(ctx.integer("NumSegments")?);
        Ok(vec![ProducedOutput::new("Output", ctx.output("Output")?)])
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<&'static str>>,
}

impl RecordingSink {
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }
}

impl ReportSink for RecordingSink {
    fn record(&self, event: ReportEvent) {
        self.events.lock().unwrap().push(event.event_type);
    }
}

pub struct Fixture {
    pub body: Arc<RecordingTool>,
    pub tool: Arc<RegisteredTool>,
    pub closes: Arc<AtomicUsize>,
    pub out_dir: tempfile::TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let body = Arc::new(RecordingTool::default());
        let tool = ToolRegistry::new().register(body.clone()).unwrap();
        Self {
            body,
            tool,
            closes: Arc::new(AtomicUsize::new(0)),
            out_dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn options(&self) -> ExecutionOptions {
        ExecutionOptions::default().with_output_dir(self.out_dir.path())
    }

    pub fn executor(&self) -> BatchExecutor {
        BatchExecutor::new(Arc::new(StubProvider {
            closes: self.closes.clone(),
        }))
        .with_options(self.options())
    }

    pub fn layer(&self, path: &str) -> StubLayer {
        StubLayer {
            path: PathBuf::from(path),
            closes: self.closes.clone(),
        }
    }
}
