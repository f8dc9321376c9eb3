//! Owned-or-borrowed datasource wrappers for one tool run.

use crate::datasource::error::DatasourceError;
use crate::datasource::pointer::DatasourcePointer;
use crate::datasource::traits::{Datasource, DatasourceProvider};
use crate::parameter::behavior::LayerLookup;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Whether a [`DatasourceInput`] is responsible for closing its dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Opened by the wrapper; closed when the wrapper closes
    Owned,
    /// Handed in already open; the caller keeps responsibility
    Borrowed,
}

#[derive(Debug)]
enum Handle {
    Owned(Box<dyn Datasource>),
    Borrowed(Arc<dyn Datasource>),
}

impl Handle {
    fn get(&self) -> &dyn Datasource {
        match self {
            Handle::Owned(ds) => ds.as_ref(),
            Handle::Borrowed(ds) => ds.as_ref(),
        }
    }
}

/// A datasource bound to a layer parameter for the duration of one run.
///
/// The pointer is captured at construction and stays available after
/// [`close`](Self::close). Closing is idempotent and also happens on drop,
/// so an owned dataset is released exactly once on every exit path.
#[derive(Debug)]
pub struct DatasourceInput {
    handle: Option<Handle>,
    ownership: Ownership,
    pointer: DatasourcePointer,
}

impl DatasourceInput {
    /// Wrap a dataset the caller already holds open.
    pub fn borrowed(datasource: Arc<dyn Datasource>) -> Self {
        let pointer = datasource.pointer();
        Self {
            handle: Some(Handle::Borrowed(datasource)),
            ownership: Ownership::Borrowed,
            pointer,
        }
    }

    /// Take ownership of a freshly opened dataset.
    pub fn owned(datasource: Box<dyn Datasource>) -> Self {
        let pointer = datasource.pointer();
        Self {
            handle: Some(Handle::Owned(datasource)),
            ownership: Ownership::Owned,
            pointer,
        }
    }

    /// Open `pointer` through `provider`; the result owns the dataset.
    pub fn open(
        provider: &dyn DatasourceProvider,
        pointer: &DatasourcePointer,
    ) -> Result<Self, DatasourceError> {
        provider.open(pointer).map(Self::owned)
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    /// Owned inputs are closed after the run; borrowed ones never are.
    pub fn close_after_run(&self) -> bool {
        self.ownership == Ownership::Owned
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// The open dataset, or `None` once closed.
    pub fn datasource(&self) -> Option<&dyn Datasource> {
        self.handle.as_ref().map(Handle::get)
    }

    pub fn pointer(&self) -> &DatasourcePointer {
        &self.pointer
    }

    pub fn name(&self) -> String {
        self.pointer.name()
    }

    pub fn filename(&self) -> &Path {
        &self.pointer.path
    }

    /// Release the dataset. Owned datasets are closed; borrowed ones are
    /// only dropped. A second call does nothing.
    pub fn close(&mut self) {
        match self.handle.take() {
            Some(Handle::Owned(mut ds)) => {
                tracing::debug!(path = %self.pointer, "Closing owned datasource");
                ds.close();
            }
            Some(Handle::Borrowed(_)) | None => {}
        }
    }
}

impl Drop for DatasourceInput {
    fn drop(&mut self) {
        self.close();
    }
}

/// Inputs of one run keyed by layer parameter name.
#[derive(Debug, Default)]
pub struct InputSet {
    inputs: HashMap<String, DatasourceInput>,
}

impl InputSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, parameter: impl Into<String>, input: DatasourceInput) {
        if let Some(mut previous) = self.inputs.insert(parameter.into(), input) {
            previous.close();
        }
    }

    pub fn get(&self, parameter: &str) -> Option<&DatasourceInput> {
        self.inputs.get(parameter)
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Close every input per its ownership.
    pub fn close_all(&mut self) {
        for input in self.inputs.values_mut() {
            input.close();
        }
    }
}

impl LayerLookup for InputSet {
    fn layer(&self, parameter: &str) -> Option<&dyn Datasource> {
        self.inputs.get(parameter).and_then(DatasourceInput::datasource)
    }
}
