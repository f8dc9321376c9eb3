//! Per-kind parameter behavior.
//!
//! Each [`ParameterKindTag`] maps to one [`KindBehavior`] entry holding the
//! kind's validate / parse / describe functions. Adding a parameter kind
//! means adding a table entry; nothing dispatches on the kind elsewhere.

use crate::datasource::pointer::DatasourcePointer;
use crate::datasource::traits::Datasource;
use crate::parameter::definition::{ControlMode, ControlVariant, ParameterDefinition};
use crate::parameter::error::ValidationError;
use crate::parameter::kind::{DataKind, ParameterKind, ParameterKindTag};
use crate::parameter::value::{OutputRequest, ParameterValue};
use serde_json::json;
use std::path::PathBuf;

/// Access to datasources already bound to layer parameters.
///
/// Field parameters resolve their valid domain through this lookup at
/// validation time, which is why layer parameters bind first.
pub trait LayerLookup {
    fn layer(&self, parameter: &str) -> Option<&dyn Datasource>;
}

/// Lookup with no bound layers (declaration-time checks).
pub struct NoLayers;

impl LayerLookup for NoLayers {
    fn layer(&self, _parameter: &str) -> Option<&dyn Datasource> {
        None
    }
}

type ValidateFn =
    fn(&ParameterDefinition, &ParameterValue, &dyn LayerLookup) -> Result<ParameterValue, ValidationError>;
type ParseFn = fn(&ParameterKind, &str) -> Result<ParameterValue, String>;
type ConstraintsFn = fn(&ParameterKind) -> serde_json::Value;
type ControlFn = fn(&ParameterKind, ControlMode) -> ControlVariant;

/// Behavior of one parameter kind.
pub(crate) struct KindBehavior {
    pub tag: ParameterKindTag,
    pub validate: ValidateFn,
    pub parse: ParseFn,
    pub constraints: ConstraintsFn,
    pub control: ControlFn,
}

static BEHAVIORS: [KindBehavior; 10] = [
    KindBehavior {
        tag: ParameterKindTag::String,
        validate: validate_string,
        parse: parse_string,
        constraints: constraints_string,
        control: control_string,
    },
    KindBehavior {
        tag: ParameterKindTag::Double,
        validate: validate_double,
        parse: parse_double,
        constraints: constraints_numeric,
        control: |_, _| ControlVariant::Numeric,
    },
    KindBehavior {
        tag: ParameterKindTag::Integer,
        validate: validate_integer,
        parse: parse_integer,
        constraints: constraints_numeric,
        control: |_, _| ControlVariant::Integer,
    },
    KindBehavior {
        tag: ParameterKindTag::Boolean,
        validate: validate_boolean,
        parse: parse_boolean,
        constraints: |_| json!({}),
        control: |_, _| ControlVariant::Checkbox,
    },
    KindBehavior {
        tag: ParameterKindTag::Distance,
        validate: validate_distance,
        parse: parse_distance,
        constraints: constraints_numeric,
        control: |_, _| ControlVariant::Distance,
    },
    KindBehavior {
        tag: ParameterKindTag::Options,
        validate: validate_options,
        parse: parse_trimmed_string,
        constraints: constraints_options,
        control: |_, _| ControlVariant::Combo,
    },
    KindBehavior {
        tag: ParameterKindTag::Field,
        validate: validate_field,
        parse: parse_trimmed_string,
        constraints: constraints_field,
        control: |_, _| ControlVariant::FieldPicker,
    },
    KindBehavior {
        tag: ParameterKindTag::Filename,
        validate: validate_filename,
        parse: parse_filename,
        constraints: constraints_filename,
        control: |_, mode| match mode {
            ControlMode::Single => ControlVariant::FilePicker,
            ControlMode::Batch => ControlVariant::BatchFilePicker,
        },
    },
    KindBehavior {
        tag: ParameterKindTag::Layer,
        validate: validate_layer,
        parse: parse_layer,
        constraints: constraints_layer,
        control: |_, mode| match mode {
            ControlMode::Single => ControlVariant::LayerPicker,
            ControlMode::Batch => ControlVariant::BatchLayerPicker,
        },
    },
    KindBehavior {
        tag: ParameterKindTag::OutputLayer,
        validate: validate_output,
        parse: parse_output,
        constraints: constraints_output,
        control: |_, mode| match mode {
            ControlMode::Single => ControlVariant::OutputPicker,
            ControlMode::Batch => ControlVariant::BatchOutputPicker,
        },
    },
];

pub(crate) fn behavior_for(tag: ParameterKindTag) -> Option<&'static KindBehavior> {
    BEHAVIORS.iter().find(|b| b.tag == tag)
}

/// Whether the behavior table has an entry for `tag`.
pub fn is_supported(tag: ParameterKindTag) -> bool {
    behavior_for(tag).is_some()
}

// ==================== Validation ====================

fn mismatch(def: &ParameterDefinition, value: &ParameterValue) -> ValidationError {
    ValidationError::TypeMismatch {
        parameter: def.name.clone(),
        expected: def.tag(),
        found: value.type_name(),
    }
}

fn kind_mismatch(def: &ParameterDefinition) -> ValidationError {
    ValidationError::invalid(&def.name, format!("declared kind is not {}", def.tag()))
}

fn format_range<T: std::fmt::Display>(min: Option<T>, max: Option<T>) -> String {
    match (min, max) {
        (Some(lo), Some(hi)) => format!("[{}, {}]", lo, hi),
        (Some(lo), None) => format!(">= {}", lo),
        (None, Some(hi)) => format!("<= {}", hi),
        (None, None) => "any".to_string(),
    }
}

fn check_finite_range(
    def: &ParameterDefinition,
    value: f64,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            parameter: def.name.clone(),
        });
    }
    let below = min.is_some_and(|lo| value < lo);
    let above = max.is_some_and(|hi| value > hi);
    if below || above {
        return Err(ValidationError::OutOfRange {
            parameter: def.name.clone(),
            value: value.to_string(),
            range: format_range(min, max),
        });
    }
    Ok(())
}

fn validate_string(
    def: &ParameterDefinition,
    value: &ParameterValue,
    _layers: &dyn LayerLookup,
) -> Result<ParameterValue, ValidationError> {
    let ParameterKind::String { multi_line } = def.kind else {
        return Err(kind_mismatch(def));
    };
    let ParameterValue::String(text) = value else {
        return Err(mismatch(def, value));
    };
    if !multi_line && text.contains('\n') {
        return Err(ValidationError::invalid(&def.name, "multi-line text is not allowed"));
    }
    Ok(value.clone())
}

fn validate_double(
    def: &ParameterDefinition,
    value: &ParameterValue,
    _layers: &dyn LayerLookup,
) -> Result<ParameterValue, ValidationError> {
    let ParameterKind::Double { min, max } = def.kind else {
        return Err(kind_mismatch(def));
    };
    let v = match value {
        ParameterValue::Double(v) => *v,
        ParameterValue::Integer(v) => *v as f64,
        other => return Err(mismatch(def, other)),
    };
    check_finite_range(def, v, min, max)?;
    Ok(ParameterValue::Double(v))
}

fn validate_integer(
    def: &ParameterDefinition,
    value: &ParameterValue,
    _layers: &dyn LayerLookup,
) -> Result<ParameterValue, ValidationError> {
    let ParameterKind::Integer { min, max } = def.kind else {
        return Err(kind_mismatch(def));
    };
    let v = match value {
        ParameterValue::Integer(v) => *v,
        ParameterValue::Double(d) => {
            if !d.is_finite() {
                return Err(ValidationError::NotFinite {
                    parameter: def.name.clone(),
                });
            }
            if d.fract() != 0.0 || d.abs() > i64::MAX as f64 {
                return Err(ValidationError::invalid(
                    &def.name,
                    format!("{} is not a whole number", d),
                ));
            }
            *d as i64
        }
        other => return Err(mismatch(def, other)),
    };
    let below = min.is_some_and(|lo| v < lo);
    let above = max.is_some_and(|hi| v > hi);
    if below || above {
        return Err(ValidationError::OutOfRange {
            parameter: def.name.clone(),
            value: v.to_string(),
            range: format_range(min, max),
        });
    }
    Ok(ParameterValue::Integer(v))
}

fn validate_boolean(
    def: &ParameterDefinition,
    value: &ParameterValue,
    _layers: &dyn LayerLookup,
) -> Result<ParameterValue, ValidationError> {
    match value {
        ParameterValue::Boolean(_) => Ok(value.clone()),
        other => Err(mismatch(def, other)),
    }
}

fn validate_distance(
    def: &ParameterDefinition,
    value: &ParameterValue,
    _layers: &dyn LayerLookup,
) -> Result<ParameterValue, ValidationError> {
    let ParameterKind::Distance { unit, min, max } = def.kind else {
        return Err(kind_mismatch(def));
    };
    let v = match value {
        ParameterValue::Distance { value, unit: given } => given.convert(*value, unit).ok_or_else(|| {
            ValidationError::invalid(&def.name, format!("cannot convert {} to {}", given, unit))
        })?,
        ParameterValue::Double(v) => *v,
        ParameterValue::Integer(v) => *v as f64,
        other => return Err(mismatch(def, other)),
    };
    check_finite_range(def, v, min, max)?;
    Ok(ParameterValue::Distance { value: v, unit })
}

fn validate_options(
    def: &ParameterDefinition,
    value: &ParameterValue,
    _layers: &dyn LayerLookup,
) -> Result<ParameterValue, ValidationError> {
    let ParameterKind::Options { choices } = &def.kind else {
        return Err(kind_mismatch(def));
    };
    let ParameterValue::String(text) = value else {
        return Err(mismatch(def, value));
    };
    choices
        .iter()
        .find(|c| c.eq_ignore_ascii_case(text.trim()))
        .map(|c| ParameterValue::String(c.clone()))
        .ok_or_else(|| ValidationError::InvalidOption {
            parameter: def.name.clone(),
            value: text.clone(),
            choices: choices.clone(),
        })
}

fn validate_field(
    def: &ParameterDefinition,
    value: &ParameterValue,
    layers: &dyn LayerLookup,
) -> Result<ParameterValue, ValidationError> {
    let ParameterKind::Field { layer } = &def.kind else {
        return Err(kind_mismatch(def));
    };
    let ParameterValue::String(field) = value else {
        return Err(mismatch(def, value));
    };
    let datasource = layers.layer(layer).ok_or_else(|| ValidationError::LayerNotBound {
        parameter: def.name.clone(),
        layer: layer.clone(),
    })?;
    let field = field.trim();
    if datasource.fields().iter().any(|f| f.name == field) {
        Ok(ParameterValue::String(field.to_string()))
    } else {
        Err(ValidationError::FieldNotFound {
            parameter: def.name.clone(),
            field: field.to_string(),
            layer: layer.clone(),
        })
    }
}

fn validate_filename(
    def: &ParameterDefinition,
    value: &ParameterValue,
    _layers: &dyn LayerLookup,
) -> Result<ParameterValue, ValidationError> {
    let ParameterKind::Filename { data_type, .. } = def.kind else {
        return Err(kind_mismatch(def));
    };
    let path = match value {
        ParameterValue::Path(p) => p.clone(),
        ParameterValue::String(s) => PathBuf::from(s.trim()),
        ParameterValue::Datasource(pointer) => pointer.path.clone(),
        other => return Err(mismatch(def, other)),
    };
    if path.as_os_str().is_empty() {
        return Err(ValidationError::invalid(&def.name, "path is empty"));
    }
    if !data_type.matches(&path) {
        return Err(ValidationError::InvalidExtension {
            parameter: def.name.clone(),
            path,
            data_type,
        });
    }
    Ok(ParameterValue::Path(path))
}

fn validate_layer(
    def: &ParameterDefinition,
    value: &ParameterValue,
    layers: &dyn LayerLookup,
) -> Result<ParameterValue, ValidationError> {
    let ParameterKind::Layer { source_type } = def.kind else {
        return Err(kind_mismatch(def));
    };
    let pointer = value.as_pointer().ok_or_else(|| mismatch(def, value))?;

    let actual = match layers.layer(&def.name) {
        Some(datasource) => Some(datasource.source_type()),
        None if pointer.is_in_memory() => None,
        None => DataKind::from_path(&pointer.path).map(|kind| kind.source_type()),
    };
    if let Some(actual) = actual
        && !source_type.accepts(actual)
    {
        return Err(ValidationError::WrongSourceType {
            parameter: def.name.clone(),
            expected: source_type,
            found: actual,
        });
    }
    Ok(ParameterValue::Datasource(pointer))
}

fn validate_output(
    def: &ParameterDefinition,
    value: &ParameterValue,
    _layers: &dyn LayerLookup,
) -> Result<ParameterValue, ValidationError> {
    let ParameterKind::OutputLayer {
        support_in_memory, ..
    } = def.kind
    else {
        return Err(kind_mismatch(def));
    };
    let request = match value {
        ParameterValue::Output(request) => request.clone(),
        ParameterValue::String(text) => OutputRequest::parse(text)
            .ok_or_else(|| ValidationError::invalid(&def.name, "output name is empty"))?,
        other => return Err(mismatch(def, other)),
    };
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ValidationError::invalid(&def.name, "output name is empty"));
    }
    if name.contains(['/', '\\']) {
        return Err(ValidationError::invalid(
            &def.name,
            format!("output name '{}' must not contain path separators", name),
        ));
    }
    if request.in_memory && !support_in_memory {
        return Err(ValidationError::InMemoryNotSupported {
            parameter: def.name.clone(),
        });
    }
    Ok(ParameterValue::Output(request))
}

// ==================== Text Parsing ====================

fn parse_string(_kind: &ParameterKind, text: &str) -> Result<ParameterValue, String> {
    Ok(ParameterValue::String(text.to_string()))
}

fn parse_trimmed_string(_kind: &ParameterKind, text: &str) -> Result<ParameterValue, String> {
    Ok(ParameterValue::String(text.trim().to_string()))
}

fn parse_double(_kind: &ParameterKind, text: &str) -> Result<ParameterValue, String> {
    text.trim()
        .parse::<f64>()
        .map(ParameterValue::Double)
        .map_err(|_| format!("'{}' is not a number", text))
}

fn parse_integer(_kind: &ParameterKind, text: &str) -> Result<ParameterValue, String> {
    text.trim()
        .parse::<i64>()
        .map(ParameterValue::Integer)
        .map_err(|_| format!("'{}' is not an integer", text))
}

fn parse_boolean(_kind: &ParameterKind, text: &str) -> Result<ParameterValue, String> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(ParameterValue::Boolean(true)),
        "false" | "no" | "0" | "off" => Ok(ParameterValue::Boolean(false)),
        _ => Err(format!("'{}' is not a boolean (use true/false)", text)),
    }
}

fn parse_distance(kind: &ParameterKind, text: &str) -> Result<ParameterValue, String> {
    let ParameterKind::Distance { unit, .. } = kind else {
        return Err("not a distance parameter".to_string());
    };
    let text = text.trim();
    let split = text
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+')))
        .unwrap_or(text.len());
    let (number, suffix) = text.split_at(split);
    let value = number
        .parse::<f64>()
        .map_err(|_| format!("'{}' is not a distance", text))?;
    let unit = if suffix.trim().is_empty() {
        *unit
    } else {
        crate::parameter::kind::DistanceUnit::from_suffix(suffix)
            .ok_or_else(|| format!("unknown distance unit '{}'", suffix.trim()))?
    };
    Ok(ParameterValue::Distance { value, unit })
}

fn parse_filename(_kind: &ParameterKind, text: &str) -> Result<ParameterValue, String> {
    Ok(ParameterValue::Path(PathBuf::from(text.trim())))
}

fn parse_layer(_kind: &ParameterKind, text: &str) -> Result<ParameterValue, String> {
    let text = text.trim();
    if text.is_empty() {
        return Err("datasource path is empty".to_string());
    }
    Ok(ParameterValue::Datasource(DatasourcePointer::parse(text)))
}

fn parse_output(_kind: &ParameterKind, text: &str) -> Result<ParameterValue, String> {
    OutputRequest::parse(text)
        .map(ParameterValue::Output)
        .ok_or_else(|| format!("'{}' is not a valid output name", text))
}

// ==================== Description ====================

fn constraints_string(kind: &ParameterKind) -> serde_json::Value {
    match kind {
        ParameterKind::String { multi_line } => json!({ "multi_line": multi_line }),
        _ => serde_json::Value::Null,
    }
}

fn constraints_numeric(kind: &ParameterKind) -> serde_json::Value {
    match kind {
        ParameterKind::Double { min, max } => json!({ "min": min, "max": max }),
        ParameterKind::Integer { min, max } => json!({ "min": min, "max": max }),
        ParameterKind::Distance { unit, min, max } => {
            json!({ "unit": unit.as_str(), "min": min, "max": max })
        }
        _ => serde_json::Value::Null,
    }
}

fn constraints_options(kind: &ParameterKind) -> serde_json::Value {
    match kind {
        ParameterKind::Options { choices } => json!({ "choices": choices }),
        _ => serde_json::Value::Null,
    }
}

fn constraints_field(kind: &ParameterKind) -> serde_json::Value {
    match kind {
        ParameterKind::Field { layer } => json!({ "layer": layer }),
        _ => serde_json::Value::Null,
    }
}

fn constraints_filename(kind: &ParameterKind) -> serde_json::Value {
    match kind {
        ParameterKind::Filename { data_type, batch } => json!({
            "data_type": data_type.as_str(),
            "extensions": data_type.extensions(),
            "batch": batch,
        }),
        _ => serde_json::Value::Null,
    }
}

fn constraints_layer(kind: &ParameterKind) -> serde_json::Value {
    match kind {
        ParameterKind::Layer { source_type } => json!({ "source_type": source_type.as_str() }),
        _ => serde_json::Value::Null,
    }
}

fn constraints_output(kind: &ParameterKind) -> serde_json::Value {
    match kind {
        ParameterKind::OutputLayer {
            layer_type,
            support_in_memory,
        } => json!({
            "layer_type": layer_type.as_str(),
            "support_in_memory": support_in_memory,
        }),
        _ => serde_json::Value::Null,
    }
}

fn control_string(kind: &ParameterKind, _mode: ControlMode) -> ControlVariant {
    match kind {
        ParameterKind::String { multi_line: true } => ControlVariant::MultiLineText,
        _ => ControlVariant::Text,
    }
}
