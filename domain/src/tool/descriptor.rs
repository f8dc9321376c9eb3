//! Tool descriptors
//!
//! Static metadata of a tool: id, display name, group and the ordered
//! parameter declaration. Built once per tool at registration.

use crate::parameter::behavior::{self, LayerLookup, NoLayers};
use crate::parameter::binding::{BoundParameters, ParameterBinder, ParameterValues};
use crate::parameter::definition::{ControlMode, ParameterDefinition, ParameterDescription};
use crate::parameter::error::ValidationError;
use crate::parameter::kind::ParameterKind;
use crate::tool::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Group key of tools that modify vector geometry.
pub const GROUP_VECTOR_GEOMETRY: &str = "vector-geometry";
/// Group key of tools that work on vector attributes.
pub const GROUP_VECTOR_ATTRIBUTES: &str = "vector-attributes";
/// Group key of raster tools.
pub const GROUP_RASTER: &str = "raster";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Stable identifier used on the command line (`buffer`)
    pub id: String,
    /// Display name (`Buffer by distance`)
    pub name: String,
    pub description: String,
    pub group: String,
    /// Declared parameters, in display order
    pub parameters: Vec<ParameterDefinition>,
}

impl ToolDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            group: String::new(),
            parameters: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn with_parameter(mut self, parameter: ParameterDefinition) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterDefinition> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn inputs(&self) -> impl Iterator<Item = &ParameterDefinition> {
        self.parameters.iter().filter(|p| !p.is_output())
    }

    pub fn outputs(&self) -> impl Iterator<Item = &ParameterDefinition> {
        self.parameters.iter().filter(|p| p.is_output())
    }

    pub fn layer_parameters(&self) -> impl Iterator<Item = &ParameterDefinition> {
        self.parameters.iter().filter(|p| p.kind.is_layer())
    }

    /// The parameter that varies across batch items.
    ///
    /// `explicit` must name a batch-capable parameter; otherwise the first
    /// layer parameter, then the first batch filename parameter, is used.
    pub fn batch_parameter(&self, explicit: Option<&str>) -> Option<&ParameterDefinition> {
        match explicit {
            Some(name) => self.parameter(name).filter(|p| p.kind.is_batch_capable()),
            None => self
                .layer_parameters()
                .next()
                .or_else(|| self.parameters.iter().find(|p| p.kind.is_batch_capable())),
        }
    }

    /// Bind `values` against this tool's declaration.
    pub fn bind(
        &self,
        values: &ParameterValues,
        layers: &dyn LayerLookup,
    ) -> Result<BoundParameters, ValidationError> {
        ParameterBinder::new(&self.id, &self.parameters).bind(values, layers)
    }

    /// Describe every parameter for a presentation layer.
    pub fn describe(&self, mode: ControlMode) -> Vec<ParameterDescription> {
        self.parameters.iter().map(|p| p.describe(mode)).collect()
    }

    /// Check the declaration for integration errors.
    pub fn validate_declaration(&self) -> Result<(), ConfigurationError> {
        if self.id.trim().is_empty() {
            return Err(ConfigurationError::EmptyToolId);
        }

        let mut seen = HashSet::new();
        for p in &self.parameters {
            if !seen.insert(p.name.as_str()) {
                return Err(ConfigurationError::DuplicateParameter {
                    tool: self.id.clone(),
                    parameter: p.name.clone(),
                });
            }
        }

        for p in &self.parameters {
            if !behavior::is_supported(p.tag()) {
                return Err(ConfigurationError::NoBehavior {
                    tool: self.id.clone(),
                    parameter: p.name.clone(),
                    kind: p.tag().to_string(),
                });
            }

            if p.is_output() != matches!(p.kind, ParameterKind::OutputLayer { .. }) {
                return Err(ConfigurationError::InvalidOutputParameter {
                    tool: self.id.clone(),
                    parameter: p.name.clone(),
                });
            }

            if let Some(layer) = p.kind.depends_on()
                && !self.parameter(layer).is_some_and(|l| l.kind.is_layer())
            {
                return Err(ConfigurationError::UnknownFieldLayer {
                    tool: self.id.clone(),
                    parameter: p.name.clone(),
                    layer: layer.to_string(),
                });
            }

            self.check_default(p)?;
        }
        Ok(())
    }

    fn check_default(&self, p: &ParameterDefinition) -> Result<(), ConfigurationError> {
        let Some(default) = &p.default_value else {
            return Ok(());
        };
        let invalid = |reason: String| ConfigurationError::InvalidDefault {
            tool: self.id.clone(),
            parameter: p.name.clone(),
            reason,
        };
        match &p.kind {
            // Field domains and layer types are only known once a layer is bound.
            ParameterKind::Field { .. } => default
                .as_str()
                .map(|_| ())
                .ok_or_else(|| invalid(format!("expected a field name, got {}", default.type_name()))),
            ParameterKind::Layer { .. } => default
                .as_pointer()
                .map(|_| ())
                .ok_or_else(|| invalid(format!("expected a datasource, got {}", default.type_name()))),
            _ => p
                .validate(default, &NoLayers)
                .map(|_| ())
                .map_err(|e| invalid(e.to_string())),
        }
    }
}
