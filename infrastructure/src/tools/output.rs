//! Shared helpers for builtin tool bodies: typed input access and output
//! materialization.

use crate::datasource::geojson::{self, Feature, VectorLayer};
use crate::datasource::grid::GridLayer;
use crate::datasource::memory::MemoryStore;
use geotools_domain::{ExecutionFailure, OutputTarget, ProducedOutput, ToolContext};

/// The GeoJSON layer bound to `parameter`.
pub(crate) fn vector_input<'c>(
    ctx: &'c ToolContext<'_>,
    parameter: &str,
) -> Result<&'c VectorLayer, ExecutionFailure> {
    let input = ctx.input(parameter)?;
    input.as_any().downcast_ref::<VectorLayer>().ok_or_else(|| {
        ExecutionFailure::new(format!("'{}' is not a GeoJSON layer", parameter))
            .with_details(input.pointer().to_string())
    })
}

/// The ASCII grid bound to `parameter`.
pub(crate) fn grid_input<'c>(
    ctx: &'c ToolContext<'_>,
    parameter: &str,
) -> Result<&'c GridLayer, ExecutionFailure> {
    let input = ctx.input(parameter)?;
    input.as_any().downcast_ref::<GridLayer>().ok_or_else(|| {
        ExecutionFailure::new(format!("'{}' is not an ASCII grid", parameter))
            .with_details(input.pointer().to_string())
    })
}

/// Write `features` to the target resolved for output `parameter`.
pub(crate) fn write_vector(
    store: &MemoryStore,
    ctx: &ToolContext<'_>,
    parameter: &str,
    features: Vec<Feature>,
) -> Result<ProducedOutput, ExecutionFailure> {
    let target = ctx.output(parameter)?;
    let count = features.len();

    match target {
        OutputTarget::InMemory { name } => {
            store.insert(name.clone(), features);
        }
        OutputTarget::File { path, overwrite } => {
            geojson::write_layer(path, &features, *overwrite)
                .map_err(|e| ExecutionFailure::new(e.to_string()))?;
        }
    }

    Ok(ProducedOutput::new(parameter, target).with_feature_count(count))
}
