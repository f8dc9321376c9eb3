//! Datasource backends
//!
//! [`FsDatasourceProvider`] implements the domain's `DatasourceProvider`
//! port over GeoJSON and ESRI ASCII grid files, and over the in-memory
//! [`MemoryStore`] used for in-memory outputs.

pub mod geojson;
pub mod grid;
pub mod memory;
mod provider;

pub use geojson::{Feature, Geometry, VectorLayer};
pub use grid::{BandStats, GridHeader, GridLayer};
pub use memory::MemoryStore;
pub use provider::FsDatasourceProvider;
