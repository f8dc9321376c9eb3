//! Read-only view a tool body gets of its bound parameters.

use crate::datasource::input::InputSet;
use crate::datasource::output::OutputTarget;
use crate::datasource::traits::Datasource;
use crate::parameter::behavior::LayerLookup;
use crate::parameter::binding::BoundParameters;
use crate::tool::descriptor::ToolDescriptor;
use crate::tool::error::ExecutionFailure;
use std::path::Path;

/// Everything one run of a tool body may read.
///
/// Accessors return [`ExecutionFailure`] when a value is absent, which can
/// only happen if the tool reads a parameter it did not declare.
pub struct ToolContext<'a> {
    descriptor: &'a ToolDescriptor,
    params: &'a BoundParameters,
    inputs: &'a InputSet,
    outputs: &'a [(String, OutputTarget)],
}

impl<'a> ToolContext<'a> {
    pub fn new(
        descriptor: &'a ToolDescriptor,
        params: &'a BoundParameters,
        inputs: &'a InputSet,
        outputs: &'a [(String, OutputTarget)],
    ) -> Self {
        Self {
            descriptor,
            params,
            inputs,
            outputs,
        }
    }

    pub fn descriptor(&self) -> &ToolDescriptor {
        self.descriptor
    }

    pub fn params(&self) -> &BoundParameters {
        self.params
    }

    pub fn input(&self, name: &str) -> Result<&dyn Datasource, ExecutionFailure> {
        self.inputs
            .layer(name)
            .ok_or_else(|| ExecutionFailure::new(format!("input '{}' is not open", name)))
    }

    pub fn double(&self, name: &str) -> Result<f64, ExecutionFailure> {
        self.params.get_f64(name).ok_or_else(|| unbound(name))
    }

    pub fn integer(&self, name: &str) -> Result<i64, ExecutionFailure> {
        self.params.get_i64(name).ok_or_else(|| unbound(name))
    }

    pub fn boolean(&self, name: &str) -> Result<bool, ExecutionFailure> {
        self.params.get_bool(name).ok_or_else(|| unbound(name))
    }

    pub fn string(&self, name: &str) -> Result<&str, ExecutionFailure> {
        self.params.get_str(name).ok_or_else(|| unbound(name))
    }

    pub fn path(&self, name: &str) -> Result<&Path, ExecutionFailure> {
        self.params
            .get(name)
            .and_then(|v| v.as_path())
            .ok_or_else(|| unbound(name))
    }

    pub fn output(&self, name: &str) -> Result<&OutputTarget, ExecutionFailure> {
        self.outputs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, target)| target)
            .ok_or_else(|| ExecutionFailure::new(format!("no destination for output '{}'", name)))
    }

    pub fn outputs(&self) -> impl Iterator<Item = (&str, &OutputTarget)> {
        self.outputs.iter().map(|(n, t)| (n.as_str(), t))
    }
}

fn unbound(name: &str) -> ExecutionFailure {
    ExecutionFailure::new(format!("parameter '{}' is not bound", name))
}
