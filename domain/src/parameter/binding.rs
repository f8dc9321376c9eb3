//! Binding raw parameter values to a tool's declared parameters.

use crate::datasource::traits::Datasource;
use crate::parameter::behavior::LayerLookup;
use crate::parameter::definition::ParameterDefinition;
use crate::parameter::error::ValidationError;
use crate::parameter::value::{OutputRequest, ParameterValue};
use std::collections::HashMap;
use std::sync::Arc;

/// Raw values supplied by the caller, keyed by parameter name.
///
/// Layer parameters may be bound either to a pointer value or to a
/// datasource the caller already holds open ([`with_open_layer`]). Open
/// layers are borrowed: the executor never closes them.
///
/// [`with_open_layer`]: ParameterValues::with_open_layer
#[derive(Debug, Clone, Default)]
pub struct ParameterValues {
    values: HashMap<String, ParameterValue>,
    open: HashMap<String, Arc<dyn Datasource>>,
}

impl ParameterValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn with_open_layer(mut self, name: impl Into<String>, datasource: Arc<dyn Datasource>) -> Self {
        self.open.insert(name.into(), datasource);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ParameterValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn set_open_layer(&mut self, name: impl Into<String>, datasource: Arc<dyn Datasource>) {
        self.open.insert(name.into(), datasource);
    }

    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<ParameterValue> {
        self.open.remove(name);
        self.values.remove(name)
    }

    pub fn open_layer(&self, name: &str) -> Option<&Arc<dyn Datasource>> {
        self.open.get(name)
    }

    /// Names of every supplied parameter (values and open layers).
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values
            .keys()
            .chain(self.open.keys().filter(|k| !self.values.contains_key(*k)))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.open.is_empty()
    }
}

/// Validated, normalized values of one tool invocation in declaration order.
///
/// Unbound optional parameters without a default are present as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundParameters {
    entries: Vec<(String, Option<ParameterValue>)>,
}

impl BoundParameters {
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_ref())
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ParameterValue::as_f64)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ParameterValue::as_i64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(ParameterValue::as_bool)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParameterValue::as_str)
    }

    pub fn get_output(&self, name: &str) -> Option<&OutputRequest> {
        self.get(name).and_then(ParameterValue::as_output)
    }

    /// Replace the value of an already bound parameter.
    pub fn replace(&mut self, name: &str, value: ParameterValue) {
        if let Some((_, slot)) = self.entries.iter_mut().find(|(n, _)| n == name) {
            *slot = Some(value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&ParameterValue>)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Binds [`ParameterValues`] to a list of [`ParameterDefinition`]s.
pub struct ParameterBinder<'a> {
    tool_id: &'a str,
    parameters: &'a [ParameterDefinition],
}

impl<'a> ParameterBinder<'a> {
    pub fn new(tool_id: &'a str, parameters: &'a [ParameterDefinition]) -> Self {
        Self {
            tool_id,
            parameters,
        }
    }

    /// Reject names that match no declared parameter.
    pub fn check_names(&self, values: &ParameterValues) -> Result<(), ValidationError> {
        let mut names: Vec<&str> = values.names().collect();
        names.sort_unstable();
        match names
            .into_iter()
            .find(|name| !self.parameters.iter().any(|p| p.name == *name))
        {
            Some(unknown) => Err(ValidationError::Unknown {
                parameter: unknown.to_string(),
                tool: self.tool_id.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Validate every declared parameter and return the normalized values.
    ///
    /// Non-field parameters bind first in declaration order, then field
    /// parameters, so a field always sees the layer it depends on. The
    /// first failure aborts binding.
    pub fn bind(
        &self,
        values: &ParameterValues,
        layers: &dyn LayerLookup,
    ) -> Result<BoundParameters, ValidationError> {
        self.check_names(values)?;

        let mut bound: Vec<Option<ParameterValue>> = vec![None; self.parameters.len()];
        let order = self
            .parameters
            .iter()
            .enumerate()
            .filter(|(_, p)| p.kind.depends_on().is_none())
            .chain(
                self.parameters
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.kind.depends_on().is_some()),
            );

        for (index, definition) in order {
            bound[index] = self.bind_one(definition, values, layers)?;
        }

        Ok(BoundParameters {
            entries: self
                .parameters
                .iter()
                .map(|p| p.name.clone())
                .zip(bound)
                .collect(),
        })
    }

    fn bind_one(
        &self,
        definition: &ParameterDefinition,
        values: &ParameterValues,
        layers: &dyn LayerLookup,
    ) -> Result<Option<ParameterValue>, ValidationError> {
        let supplied = values.get(&definition.name).cloned().or_else(|| {
            if definition.kind.is_layer() {
                layers
                    .layer(&definition.name)
                    .map(|ds| ParameterValue::Datasource(ds.pointer()))
            } else {
                None
            }
        });

        match supplied.or_else(|| definition.default_value.clone()) {
            Some(value) => definition.validate(&value, layers).map(Some),
            None if definition.is_required() || definition.is_output() => {
                Err(ValidationError::missing(&definition.name))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::schema::{FieldInfo, FieldType};
    use crate::parameter::behavior::NoLayers;
    use crate::parameter::kind::DataSourceType;
    use std::path::{Path, PathBuf};

    #[derive(Debug)]
    struct Parcels {
        path: PathBuf,
    }

    impl Datasource for Parcels {
        fn filename(&self) -> &Path {
            &self.path
        }

        fn source_type(&self) -> DataSourceType {
            DataSourceType::Vector
        }

        fn fields(&self) -> Vec<FieldInfo> {
            vec![FieldInfo::new("owner", FieldType::String)]
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    struct OneLayer(Parcels);

    impl LayerLookup for OneLayer {
        fn layer(&self, parameter: &str) -> Option<&dyn Datasource> {
            (parameter == "InputLayer").then_some(&self.0 as &dyn Datasource)
        }
    }

    fn select_params() -> Vec<ParameterDefinition> {
        vec![
            ParameterDefinition::field("Field", "Field", "InputLayer"),
            ParameterDefinition::vector_layer("InputLayer", "Input layer"),
            ParameterDefinition::integer("Limit", "Limit").optional(),
            ParameterDefinition::vector_output("Output", "Output").with_default("Selection"),
        ]
    }

    fn parcels() -> OneLayer {
        OneLayer(Parcels {
            path: PathBuf::from("parcels.geojson"),
        })
    }

    #[test]
    fn test_bind_resolves_defaults_and_keeps_declaration_order() {
        let params = select_params();
        let values = ParameterValues::new()
            .with_value("InputLayer", "parcels.geojson")
            .with_value("Field", "owner");

        let bound = ParameterBinder::new("select", &params)
            .bind(&values, &parcels())
            .unwrap();

        let names: Vec<&str> = bound.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Field", "InputLayer", "Limit", "Output"]);
        assert_eq!(bound.get_str("Field"), Some("owner"));
        assert!(bound.get("Limit").is_none());
        assert_eq!(bound.get_output("Output").unwrap().name, "Selection");
    }

    #[test]
    fn test_bind_unknown_parameter() {
        let params = select_params();
        let values = ParameterValues::new().with_value("Colour", "red");
        let err = ParameterBinder::new("select", &params)
            .bind(&values, &NoLayers)
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::Unknown {
                parameter: "Colour".into(),
                tool: "select".into()
            }
        );
    }

    #[test]
    fn test_bind_missing_required() {
        let params = select_params();
        let values = ParameterValues::new().with_value("Field", "owner");
        let err = ParameterBinder::new("select", &params)
            .bind(&values, &NoLayers)
            .unwrap_err();
        assert_eq!(err, ValidationError::missing("InputLayer"));
    }

    #[test]
    fn test_bind_synthesizes_pointer_for_open_layer() {
        let params = select_params();
        let values = ParameterValues::new().with_value("Field", "owner");
        let bound = ParameterBinder::new("select", &params)
            .bind(&values, &parcels())
            .unwrap();
        assert!(matches!(
            bound.get("InputLayer"),
            Some(ParameterValue::Datasource(p)) if p.path == Path::new("parcels.geojson")
        ));
    }

    #[test]
    fn test_bind_field_against_unknown_field_fails() {
        let params = select_params();
        let values = ParameterValues::new()
            .with_value("InputLayer", "parcels.geojson")
            .with_value("Field", "zoning");
        let err = ParameterBinder::new("select", &params)
            .bind(&values, &parcels())
            .unwrap_err();
        assert!(matches!(err, ValidationError::FieldNotFound { .. }));
    }
}
