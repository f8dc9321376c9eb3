//! Datasource abstractions implemented by the storage backend.

use crate::datasource::error::DatasourceError;
use crate::datasource::pointer::DatasourcePointer;
use crate::datasource::schema::FieldInfo;
use crate::parameter::kind::DataSourceType;
use std::any::Any;
use std::fmt::Debug;
use std::path::Path;

/// An opened vector or raster dataset.
pub trait Datasource: Send + Sync + Debug {
    /// File the dataset was opened from (`memory://...` for in-memory data)
    fn filename(&self) -> &Path;

    /// Layer identity inside a multi-layer file
    fn identity(&self) -> Option<&str> {
        None
    }

    fn source_type(&self) -> DataSourceType;

    /// Attribute schema; empty for rasters
    fn fields(&self) -> Vec<FieldInfo> {
        Vec::new()
    }

    fn feature_count(&self) -> Option<usize> {
        None
    }

    /// Reopenable reference to this dataset.
    fn pointer(&self) -> DatasourcePointer {
        let pointer = DatasourcePointer::new(self.filename());
        match self.identity() {
            Some(identity) => pointer.with_identity(identity),
            None => pointer,
        }
    }

    /// Release backend resources. Called at most once, by the owner.
    fn close(&mut self) {}

    /// Access to the concrete type for tool bodies that need it.
    fn as_any(&self) -> &dyn Any;
}

/// Opens datasets by path or pointer.
pub trait DatasourceProvider: Send + Sync {
    fn open(&self, pointer: &DatasourcePointer) -> Result<Box<dyn Datasource>, DatasourceError>;

    fn open_path(&self, path: &Path) -> Result<Box<dyn Datasource>, DatasourceError> {
        self.open(&DatasourcePointer::new(path))
    }

    /// Whether a dataset already exists at `pointer`.
    fn exists(&self, pointer: &DatasourcePointer) -> bool {
        pointer.path.exists()
    }
}
