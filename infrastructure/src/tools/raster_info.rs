//! `raster-info`: summarize a grid as a one-feature vector layer.

use super::output::{grid_input, write_vector};
use crate::datasource::geojson::{Feature, Geometry};
use crate::datasource::memory::MemoryStore;
use geotools_domain::tool::GROUP_RASTER;
use geotools_domain::{
    Datasource, ExecutionFailure, GisTool, ParameterDefinition, ProducedOutput, ToolContext,
    ToolDescriptor,
};
use serde_json::{Map, Value, json};
use std::sync::Arc;

pub const RASTER_INFO: &str = "raster-info";

pub struct RasterInfoTool {
    store: Arc<MemoryStore>,
}

impl RasterInfoTool {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

impl GisTool for RasterInfoTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(RASTER_INFO, "Raster information")
            .with_description("Writes the extent and band statistics of a grid as a polygon feature")
            .with_group(GROUP_RASTER)
            .with_parameter(ParameterDefinition::raster_layer("InputGrid", "Input grid"))
            .with_parameter(ParameterDefinition::vector_output("Output", "Output").with_default("RasterInfo"))
    }

    fn run(&self, ctx: &ToolContext<'_>) -> Result<Vec<ProducedOutput>, ExecutionFailure> {
        let grid = grid_input(ctx, "InputGrid")?;
        let header = grid.header();
        let (min_x, min_y, max_x, max_y) = header.extent();

        let mut properties = Map::new();
        properties.insert("source".into(), json!(grid.filename().display().to_string()));
        properties.insert("ncols".into(), json!(header.ncols));
        properties.insert("nrows".into(), json!(header.nrows));
        properties.insert("cellsize".into(), json!(header.cell_size));
        properties.insert("bands".into(), json!(grid.band_count()));
        properties.insert("nodata".into(), json!(header.nodata));
        match grid.stats() {
            Some(stats) => {
                properties.insert("min".into(), json!(stats.min));
                properties.insert("max".into(), json!(stats.max));
                properties.insert("mean".into(), json!(stats.mean));
                properties.insert("valid_cells".into(), json!(stats.valid_cells));
            }
            None => {
                for key in ["min", "max", "mean"] {
                    properties.insert(key.into(), Value::Null);
                }
                properties.insert("valid_cells".into(), json!(0));
            }
        }

        let extent = Geometry::Polygon {
            coordinates: vec![vec![
                vec![min_x, min_y],
                vec![max_x, min_y],
                vec![max_x, max_y],
                vec![min_x, max_y],
                vec![min_x, min_y],
            ]],
        };
        let summary = Feature::new(Some(extent)).with_properties(properties);

        Ok(vec![write_vector(&self.store, ctx, "Output", vec![summary])?])
    }
}
