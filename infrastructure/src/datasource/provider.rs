//! Filesystem datasource provider.

use super::geojson;
use super::grid;
use super::memory::MemoryStore;
use geotools_domain::{DataKind, Datasource, DatasourceError, DatasourcePointer, DatasourceProvider};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Opens GeoJSON (`.geojson`, `.json`) and ESRI ASCII grid (`.asc`) files,
/// plus `memory://` pointers into a shared [`MemoryStore`].
///
/// Other known vector and raster formats are reported as unsupported.
pub struct FsDatasourceProvider {
    store: Arc<MemoryStore>,
}

impl FsDatasourceProvider {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    fn open_file(&self, path: &Path) -> Result<Box<dyn Datasource>, DatasourceError> {
        if !path.exists() {
            return Err(DatasourceError::open(path, "No such file or directory"));
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("geojson" | "json") => Ok(Box::new(geojson::read_layer(path)?)),
            Some("asc") => Ok(Box::new(grid::read_grid(path)?)),
            _ => {
                debug!(path = %path.display(), kind = ?DataKind::from_path(path), "Unsupported datasource format");
                Err(DatasourceError::Unsupported {
                    path: path.to_path_buf(),
                })
            }
        }
    }
}

impl DatasourceProvider for FsDatasourceProvider {
    fn open(&self, pointer: &DatasourcePointer) -> Result<Box<dyn Datasource>, DatasourceError> {
        if let Some(key) = pointer.memory_key() {
            return self
                .store
                .get(key)
                .map(|layer| Box::new(layer) as Box<dyn Datasource>)
                .ok_or_else(|| DatasourceError::open(&pointer.path, "no in-memory dataset with this name"));
        }

        let datasource = self.open_file(&pointer.path)?;
        match &pointer.identity {
            // Single-layer formats: the identity must name the file's only layer.
            Some(identity) if *identity != pointer.name() => Err(DatasourceError::open(
                &pointer.path,
                format!("layer '{}' not found", identity),
            )),
            _ => Ok(datasource),
        }
    }

    fn exists(&self, pointer: &DatasourcePointer) -> bool {
        match pointer.memory_key() {
            Some(key) => self.store.contains(key),
            None => pointer.path.exists(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::geojson::Feature;
    use geotools_domain::DataSourceType;

    fn provider() -> FsDatasourceProvider {
        FsDatasourceProvider::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_open_geojson_and_grid() {
        let dir = tempfile::tempdir().unwrap();
        let vector = dir.path().join("roads.GEOJSON");
        std::fs::write(
            &vector,
            r#"{"type":"FeatureCollection","features":[{"type":"Feature","geometry":null,"properties":{}}]}"#,
        )
        .unwrap();
        let raster = dir.path().join("dem.asc");
        std::fs::write(&raster, "ncols 1\nnrows 1\nxllcorner 0\nyllcorner 0\ncellsize 1\n5\n").unwrap();

        let provider = provider();
        assert_eq!(
            provider.open_path(&vector).unwrap().source_type(),
            DataSourceType::Vector
        );
        assert_eq!(
            provider.open_path(&raster).unwrap().source_type(),
            DataSourceType::Raster
        );
    }

    #[test]
    fn test_known_but_unsupported_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parcels.shp");
        std::fs::write(&path, b"\0\0").unwrap();

        assert!(matches!(
            provider().open_path(&path),
            Err(DatasourceError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = provider()
            .open_path(Path::new("/nonexistent/parcels.geojson"))
            .unwrap_err();
        assert!(matches!(err, DatasourceError::Open { .. }));
    }

    #[test]
    fn test_memory_pointers() {
        let provider = provider();
        let pointer = DatasourcePointer::memory("Buffer");
        assert!(!provider.exists(&pointer));
        assert!(provider.open(&pointer).is_err());

        provider.store().insert("Buffer", vec![Feature::new(None)]);
        assert!(provider.exists(&pointer));
        assert_eq!(provider.open(&pointer).unwrap().feature_count(), Some(1));
    }

    #[test]
    fn test_identity_must_match_single_layer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roads.geojson");
        std::fs::write(
            &path,
            r#"{"type":"FeatureCollection","features":[{"type":"Feature","geometry":null,"properties":{}}]}"#,
        )
        .unwrap();

        let provider = provider();
        assert!(provider.open(&DatasourcePointer::new(&path).with_identity("roads")).is_ok());
        assert!(provider.open(&DatasourcePointer::new(&path).with_identity("rivers")).is_err());
    }
}
