//! In-memory dataset store addressed by `memory://<name>` pointers.

use super::geojson::{Feature, VectorLayer};
use geotools_domain::DatasourcePointer;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Holds vector layers produced as in-memory outputs.
///
/// Shared between the datasource provider (reads) and tool bodies
/// (writes). Storing under an existing name replaces the previous layer;
/// the output resolver only hands out a taken name when overwriting is on.
#[derive(Debug, Default)]
pub struct MemoryStore {
    layers: RwLock<HashMap<String, Arc<Vec<Feature>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, name: impl Into<String>, features: Vec<Feature>) -> DatasourcePointer {
        let name = name.into();
        let pointer = DatasourcePointer::memory(&name);
        debug!(name = %name, features = features.len(), "Stored in-memory layer");
        self.layers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name, Arc::new(features));
        pointer
    }

    /// Open the layer stored under `name`.
    pub fn get(&self, name: &str) -> Option<VectorLayer> {
        self.layers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .map(|features| VectorLayer::new(DatasourcePointer::memory(name).path, features.clone()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.layers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(name)
    }

    pub fn remove(&self, name: &str) -> bool {
        self.layers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(name)
            .is_some()
    }

    /// Stored names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .layers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}
