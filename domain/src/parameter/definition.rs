//! Parameter declarations.
//!
//! A tool declares its parameters once, in display order, through the
//! constructors on [`ParameterDefinition`]:
//!
//! ```
//! use geotools_domain::parameter::ParameterDefinition;
//!
//! let params = vec![
//!     ParameterDefinition::vector_layer("InputLayer", "Layer to build buffer for"),
//!     ParameterDefinition::double("BufferDistance", "Buffer distance"),
//!     ParameterDefinition::integer("NumSegments", "Number of segments").with_default(30),
//!     ParameterDefinition::boolean("MergeResults", "Merge results"),
//!     ParameterDefinition::vector_output("Output", "Save results as").with_default("Buffer"),
//! ];
//! assert!(!params[2].is_required());
//! ```

use crate::parameter::behavior::{self, LayerLookup};
use crate::parameter::error::ValidationError;
use crate::parameter::kind::{DataKind, DataSourceType, DistanceUnit, ParameterKind, ParameterKindTag};
use crate::parameter::value::ParameterValue;
use serde::{Deserialize, Serialize};

/// Role of a parameter within a tool's declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterRole {
    /// Required input
    Input,
    /// Input that falls back to its default when unbound
    OptionalInput,
    /// Declares a result dataset
    Output,
}

impl ParameterRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterRole::Input => "input",
            ParameterRole::OptionalInput => "optional",
            ParameterRole::Output => "output",
        }
    }
}

impl std::fmt::Display for ParameterRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether the presentation layer is building controls for one run or a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    #[default]
    Single,
    Batch,
}

/// Input control a presentation layer should render for a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlVariant {
    Text,
    MultiLineText,
    Numeric,
    Integer,
    Checkbox,
    Distance,
    Combo,
    FieldPicker,
    FilePicker,
    BatchFilePicker,
    LayerPicker,
    BatchLayerPicker,
    OutputPicker,
    BatchOutputPicker,
}

impl ControlVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlVariant::Text => "text",
            ControlVariant::MultiLineText => "multi_line_text",
            ControlVariant::Numeric => "numeric",
            ControlVariant::Integer => "integer",
            ControlVariant::Checkbox => "checkbox",
            ControlVariant::Distance => "distance",
            ControlVariant::Combo => "combo",
            ControlVariant::FieldPicker => "field_picker",
            ControlVariant::FilePicker => "file_picker",
            ControlVariant::BatchFilePicker => "batch_file_picker",
            ControlVariant::LayerPicker => "layer_picker",
            ControlVariant::BatchLayerPicker => "batch_layer_picker",
            ControlVariant::OutputPicker => "output_picker",
            ControlVariant::BatchOutputPicker => "batch_output_picker",
        }
    }
}

impl std::fmt::Display for ControlVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A declared parameter of a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    /// Stable identifier, unique within the tool
    pub name: String,
    /// Human-readable label
    pub display_name: String,
    pub role: ParameterRole,
    pub kind: ParameterKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<ParameterValue>,
}

impl ParameterDefinition {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>, kind: ParameterKind) -> Self {
        let role = match kind {
            ParameterKind::OutputLayer { .. } => ParameterRole::Output,
            _ => ParameterRole::Input,
        };
        Self {
            name: name.into(),
            display_name: display_name.into(),
            role,
            kind,
            default_value: None,
        }
    }

    // ==================== Kind Constructors ====================

    pub fn string(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(name, display_name, ParameterKind::String { multi_line: false })
    }

    pub fn double(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(name, display_name, ParameterKind::Double { min: None, max: None })
    }

    pub fn integer(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(name, display_name, ParameterKind::Integer { min: None, max: None })
    }

    pub fn boolean(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(name, display_name, ParameterKind::Boolean)
    }

    pub fn distance(
        name: impl Into<String>,
        display_name: impl Into<String>,
        unit: DistanceUnit,
    ) -> Self {
        Self::new(
            name,
            display_name,
            ParameterKind::Distance {
                unit,
                min: None,
                max: None,
            },
        )
    }

    pub fn options<I, S>(name: impl Into<String>, display_name: impl Into<String>, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            display_name,
            ParameterKind::Options {
                choices: choices.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// Attribute field of the layer bound to parameter `layer`.
    pub fn field(
        name: impl Into<String>,
        display_name: impl Into<String>,
        layer: impl Into<String>,
    ) -> Self {
        Self::new(name, display_name, ParameterKind::Field { layer: layer.into() })
    }

    pub fn filename(
        name: impl Into<String>,
        display_name: impl Into<String>,
        data_type: DataKind,
    ) -> Self {
        Self::new(
            name,
            display_name,
            ParameterKind::Filename {
                data_type,
                batch: false,
            },
        )
    }

    pub fn layer(
        name: impl Into<String>,
        display_name: impl Into<String>,
        source_type: DataSourceType,
    ) -> Self {
        Self::new(name, display_name, ParameterKind::Layer { source_type })
    }

    pub fn vector_layer(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::layer(name, display_name, DataSourceType::Vector)
    }

    pub fn raster_layer(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::layer(name, display_name, DataSourceType::Raster)
    }

    pub fn output_layer(
        name: impl Into<String>,
        display_name: impl Into<String>,
        layer_type: DataSourceType,
    ) -> Self {
        Self::new(
            name,
            display_name,
            ParameterKind::OutputLayer {
                layer_type,
                support_in_memory: true,
            },
        )
    }

    pub fn vector_output(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::output_layer(name, display_name, DataSourceType::Vector)
    }

    // ==================== Builder Methods ====================

    /// Mark as optional input. Outputs stay outputs.
    pub fn optional(mut self) -> Self {
        if self.role == ParameterRole::Input {
            self.role = ParameterRole::OptionalInput;
        }
        self
    }

    /// Set the default value. An input with a default becomes optional.
    pub fn with_default(mut self, value: impl Into<ParameterValue>) -> Self {
        self.default_value = Some(value.into());
        self.optional()
    }

    /// Set numeric bounds on a double or distance parameter.
    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        match &mut self.kind {
            ParameterKind::Double { min: lo, max: hi }
            | ParameterKind::Distance { min: lo, max: hi, .. } => {
                *lo = min;
                *hi = max;
            }
            _ => {}
        }
        self
    }

    /// Set bounds on an integer parameter.
    pub fn with_int_range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        if let ParameterKind::Integer { min: lo, max: hi } = &mut self.kind {
            *lo = min;
            *hi = max;
        }
        self
    }

    pub fn multi_line(mut self) -> Self {
        if let ParameterKind::String { multi_line } = &mut self.kind {
            *multi_line = true;
        }
        self
    }

    /// Allow a filename parameter to vary across batch items.
    pub fn batch(mut self) -> Self {
        if let ParameterKind::Filename { batch, .. } = &mut self.kind {
            *batch = true;
        }
        self
    }

    /// Disable in-memory materialization of an output.
    pub fn disk_only(mut self) -> Self {
        if let ParameterKind::OutputLayer {
            support_in_memory, ..
        } = &mut self.kind
        {
            *support_in_memory = false;
        }
        self
    }

    // ==================== Queries ====================

    pub fn tag(&self) -> ParameterKindTag {
        self.kind.tag()
    }

    pub fn is_required(&self) -> bool {
        self.role == ParameterRole::Input
    }

    pub fn is_output(&self) -> bool {
        self.role == ParameterRole::Output
    }

    // ==================== Behavior ====================

    /// Validate `value` against this parameter and return the normalized value.
    ///
    /// `layers` gives access to datasources already bound to layer
    /// parameters; field parameters resolve their domain through it.
    pub fn validate(
        &self,
        value: &ParameterValue,
        layers: &dyn LayerLookup,
    ) -> Result<ParameterValue, ValidationError> {
        let behavior = behavior::behavior_for(self.tag()).ok_or_else(|| {
            ValidationError::invalid(&self.name, format!("no behavior for kind {}", self.tag()))
        })?;
        (behavior.validate)(self, value, layers)
    }

    /// Parse textual input (CLI `Name=Value`, script prompt) into a value.
    pub fn parse_text(&self, text: &str) -> Result<ParameterValue, ValidationError> {
        let behavior = behavior::behavior_for(self.tag()).ok_or_else(|| {
            ValidationError::invalid(&self.name, format!("no behavior for kind {}", self.tag()))
        })?;
        (behavior.parse)(&self.kind, text).map_err(|reason| ValidationError::invalid(&self.name, reason))
    }

    /// Describe this parameter for a presentation layer.
    pub fn describe(&self, mode: ControlMode) -> ParameterDescription {
        let (constraints, control) = match behavior::behavior_for(self.tag()) {
            Some(b) => ((b.constraints)(&self.kind), (b.control)(&self.kind, mode)),
            None => (serde_json::Value::Null, ControlVariant::Text),
        };
        ParameterDescription {
            name: self.name.clone(),
            display_name: self.display_name.clone(),
            role: self.role,
            kind: self.tag(),
            constraints,
            default_value: self.default_value.clone(),
            control,
        }
    }
}

/// Presentation-facing metadata of one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescription {
    pub name: String,
    pub display_name: String,
    pub role: ParameterRole,
    pub kind: ParameterKindTag,
    /// Kind-specific constraints (bounds, choices, extensions, ...)
    pub constraints: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<ParameterValue>,
    pub control: ControlVariant,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_makes_optional() {
        let p = ParameterDefinition::integer("NumSegments", "Number of segments").with_default(30);
        assert_eq!(p.role, ParameterRole::OptionalInput);
        assert_eq!(p.default_value, Some(ParameterValue::Integer(30)));
        assert!(!p.is_required());
    }

    #[test]
    fn test_output_keeps_output_role() {
        let p = ParameterDefinition::vector_output("Output", "Save results as").with_default("Buffer");
        assert_eq!(p.role, ParameterRole::Output);
        assert!(p.is_output());
    }

    #[test]
    fn test_builder_modifiers_apply_to_matching_kind_only() {
        let p = ParameterDefinition::boolean("Merge", "Merge").with_range(Some(0.0), Some(1.0));
        assert_eq!(p.kind, ParameterKind::Boolean);

        let p = ParameterDefinition::integer("N", "N").with_int_range(Some(3), Some(360));
        assert_eq!(p.kind, ParameterKind::Integer { min: Some(3), max: Some(360) });

        let p = ParameterDefinition::filename("Input", "Input", DataKind::Vector).batch();
        assert!(p.kind.is_batch_capable());

        let p = ParameterDefinition::vector_output("Output", "Output").disk_only();
        assert_eq!(
            p.kind,
            ParameterKind::OutputLayer {
                layer_type: DataSourceType::Vector,
                support_in_memory: false
            }
        );
    }

    #[test]
    fn test_describe_switches_control_in_batch_mode() {
        let p = ParameterDefinition::vector_layer("InputLayer", "Input layer");
        assert_eq!(p.describe(ControlMode::Single).control, ControlVariant::LayerPicker);
        assert_eq!(p.describe(ControlMode::Batch).control, ControlVariant::BatchLayerPicker);

        let p = ParameterDefinition::double("Distance", "Distance");
        assert_eq!(p.describe(ControlMode::Batch).control, ControlVariant::Numeric);
    }

    #[test]
    fn test_describe_reports_constraints() {
        let p = ParameterDefinition::options("Operator", "Operator", ["=", "!="]);
        let description = p.describe(ControlMode::Single);
        assert_eq!(description.kind, ParameterKindTag::Options);
        assert_eq!(description.constraints["choices"], serde_json::json!(["=", "!="]));
    }
}
