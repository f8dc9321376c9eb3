//! `select-by-attribute`: copy features whose attribute matches a condition.

use super::output::{vector_input, write_vector};
use crate::datasource::geojson::Feature;
use crate::datasource::memory::MemoryStore;
use geotools_domain::tool::GROUP_VECTOR_ATTRIBUTES;
use geotools_domain::{
    ExecutionFailure, GisTool, ParameterDefinition, ProducedOutput, ToolContext, ToolDescriptor,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

pub const SELECT_BY_ATTRIBUTE: &str = "select-by-attribute";

const OPERATORS: [&str; 5] = ["=", "!=", "<", ">", "contains"];

pub struct SelectByAttributeTool {
    store: Arc<MemoryStore>,
}

impl SelectByAttributeTool {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

impl GisTool for SelectByAttributeTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(SELECT_BY_ATTRIBUTE, "Select by attribute")
            .with_description("Copies the features whose attribute satisfies a condition")
            .with_group(GROUP_VECTOR_ATTRIBUTES)
            .with_parameter(ParameterDefinition::vector_layer("InputLayer", "Input layer"))
            .with_parameter(ParameterDefinition::field("Field", "Field", "InputLayer"))
            .with_parameter(ParameterDefinition::options("Operator", "Operator", OPERATORS).with_default("="))
            .with_parameter(ParameterDefinition::string("Value", "Value"))
            .with_parameter(ParameterDefinition::vector_output("Output", "Output").with_default("Selection"))
    }

    fn run(&self, ctx: &ToolContext<'_>) -> Result<Vec<ProducedOutput>, ExecutionFailure> {
        let layer = vector_input(ctx, "InputLayer")?;
        let field = ctx.string("Field")?;
        let operator = Operator::parse(ctx.string("Operator")?)?;
        let value = ctx.string("Value")?;

        let condition = Condition::new(operator, value)?;
        let selected: Vec<Feature> = layer
            .features()
            .iter()
            .filter(|f| f.properties.get(field).is_some_and(|v| condition.matches(v)))
            .cloned()
            .collect();
        debug!(
            tool = SELECT_BY_ATTRIBUTE,
            field,
            selected = selected.len(),
            total = layer.features().len(),
            "Selected features"
        );

        Ok(vec![write_vector(&self.store, ctx, "Output", selected)?])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Equal,
    NotEqual,
    Less,
    Greater,
    Contains,
}

impl Operator {
    fn parse(text: &str) -> Result<Self, ExecutionFailure> {
        match text {
            "=" => Ok(Operator::Equal),
            "!=" => Ok(Operator::NotEqual),
            "<" => Ok(Operator::Less),
            ">" => Ok(Operator::Greater),
            "contains" => Ok(Operator::Contains),
            other => Err(ExecutionFailure::new(format!("unknown operator '{}'", other))),
        }
    }
}

struct Condition<'v> {
    operator: Operator,
    text: &'v str,
    number: Option<f64>,
}

impl<'v> Condition<'v> {
    /// Ordering operators require a numeric comparison value.
    fn new(operator: Operator, text: &'v str) -> Result<Self, ExecutionFailure> {
        let number = text.trim().parse::<f64>().ok();
        if matches!(operator, Operator::Less | Operator::Greater) && number.is_none() {
            return Err(ExecutionFailure::new(format!(
                "Value '{}' must be numeric for ordering operators",
                text
            )));
        }
        Ok(Self {
            operator,
            text,
            number,
        })
    }

    /// Null attributes never match.
    fn matches(&self, attribute: &Value) -> bool {
        let attribute_number = attribute.as_f64();
        let attribute_text = match attribute {
            Value::Null => return false,
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        match self.operator {
            Operator::Equal | Operator::NotEqual => {
                let equal = match (attribute_number, self.number) {
                    (Some(a), Some(b)) => a == b,
                    _ => attribute_text == self.text,
                };
                equal == (self.operator == Operator::Equal)
            }
            Operator::Less => matches!((attribute_number, self.number), (Some(a), Some(b)) if a < b),
            Operator::Greater => {
                matches!((attribute_number, self.number), (Some(a), Some(b)) if a > b)
            }
            Operator::Contains => attribute_text.contains(self.text),
        }
    }
}
