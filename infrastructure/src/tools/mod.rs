//! Builtin geoprocessing tools
//!
//! | Id | Group | Inputs |
//! |----|-------|--------|
//! | `buffer` | vector-geometry | point layer, distance |
//! | `select-by-attribute` | vector-attributes | layer, field condition |
//! | `raster-info` | raster | ASCII grid |
//!
//! Every tool writes vector output either to a GeoJSON file or to the
//! shared [`MemoryStore`].

pub mod buffer;
pub mod raster_info;
pub mod select;

mod output;

pub use buffer::{BUFFER, BufferTool};
pub use raster_info::{RASTER_INFO, RasterInfoTool};
pub use select::{SELECT_BY_ATTRIBUTE, SelectByAttributeTool};

use crate::datasource::memory::MemoryStore;
use geotools_domain::{ConfigurationError, ToolRegistry};
use std::sync::Arc;
use tracing::debug;

/// Register every builtin tool, writing in-memory outputs to `store`.
pub fn register_builtin_tools(
    registry: &ToolRegistry,
    store: &Arc<MemoryStore>,
) -> Result<(), ConfigurationError> {
    registry.register(Arc::new(BufferTool::new(store.clone())))?;
    registry.register(Arc::new(SelectByAttributeTool::new(store.clone())))?;
    registry.register(Arc::new(RasterInfoTool::new(store.clone())))?;
    debug!(tools = registry.len(), "Registered builtin tools");
    Ok(())
}
