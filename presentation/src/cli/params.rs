//! `Name=Value` parameter assignments from the command line.

use geotools_domain::{ParameterValues, ToolDescriptor, ValidationError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamArgError {
    #[error("Invalid parameter assignment '{0}' (expected Name=Value)")]
    Malformed(String),

    #[error("Unknown parameter '{parameter}' for tool '{tool}'")]
    Unknown { parameter: String, tool: String },

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Parse assignments into values typed by each parameter's kind.
///
/// Text is converted with the parameter's own parser, so `25`, `1.5km`,
/// `yes` and `memory:Result` all land as the right value type. Later
/// assignments to the same name win.
pub fn parse_assignments(
    descriptor: &ToolDescriptor,
    assignments: &[String],
) -> Result<ParameterValues, ParamArgError> {
    let mut values = ParameterValues::new();
    for assignment in assignments {
        let (name, text) = assignment
            .split_once('=')
            .map(|(n, v)| (n.trim(), v))
            .filter(|(n, _)| !n.is_empty())
            .ok_or_else(|| ParamArgError::Malformed(assignment.clone()))?;

        let definition = descriptor
            .parameter(name)
            .ok_or_else(|| ParamArgError::Unknown {
                parameter: name.to_string(),
                tool: descriptor.id.clone(),
            })?;
        values.set(name, definition.parse_text(text)?);
    }
    Ok(values)
}
