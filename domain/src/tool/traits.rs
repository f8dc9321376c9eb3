//! The tool execution contract.

use crate::datasource::output::ProducedOutput;
use crate::tool::context::ToolContext;
use crate::tool::descriptor::ToolDescriptor;
use crate::tool::error::ExecutionFailure;

/// A unit of geoprocessing work.
///
/// `descriptor` is called once, at registration; the result is cached.
/// `run` is called once per execution with fully validated parameters and
/// returns the outputs it wrote. On failure the body must leave no partial
/// output behind.
pub trait GisTool: Send + Sync {
    fn descriptor(&self) -> ToolDescriptor;

    fn run(&self, ctx: &ToolContext<'_>) -> Result<Vec<ProducedOutput>, ExecutionFailure>;
}
