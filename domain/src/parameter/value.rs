//! Parameter values bound to declared parameters at run time.

use crate::datasource::pointer::DatasourcePointer;
use crate::parameter::kind::DistanceUnit;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A value bound to a parameter.
///
/// Values arrive loosely typed (e.g. a `String` for a filename, an
/// `Integer` for a double) and are normalized to the declared kind during
/// validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ParameterValue {
    String(String),
    Double(f64),
    Integer(i64),
    Boolean(bool),
    Distance { value: f64, unit: DistanceUnit },
    Path(PathBuf),
    Datasource(DatasourcePointer),
    Output(OutputRequest),
}

impl ParameterValue {
    /// Short name of the value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParameterValue::String(_) => "string",
            ParameterValue::Double(_) => "double",
            ParameterValue::Integer(_) => "integer",
            ParameterValue::Boolean(_) => "boolean",
            ParameterValue::Distance { .. } => "distance",
            ParameterValue::Path(_) => "path",
            ParameterValue::Datasource(_) => "datasource",
            ParameterValue::Output(_) => "output",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterValue::Double(v) => Some(*v),
            ParameterValue::Integer(v) => Some(*v as f64),
            ParameterValue::Distance { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParameterValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            ParameterValue::Path(p) => Some(p),
            ParameterValue::String(s) => Some(Path::new(s)),
            _ => None,
        }
    }

    pub fn as_output(&self) -> Option<&OutputRequest> {
        match self {
            ParameterValue::Output(o) => Some(o),
            _ => None,
        }
    }

    /// Interpret the value as a reference to a datasource.
    ///
    /// Paths and strings are turned into identity-less pointers.
    pub fn as_pointer(&self) -> Option<DatasourcePointer> {
        match self {
            ParameterValue::Datasource(p) => Some(p.clone()),
            ParameterValue::Path(p) => Some(DatasourcePointer::new(p)),
            ParameterValue::String(s) if !s.trim().is_empty() => Some(DatasourcePointer::new(s)),
            _ => None,
        }
    }
}

impl std::fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParameterValue::String(s) => write!(f, "{}", s),
            ParameterValue::Double(v) => write!(f, "{}", v),
            ParameterValue::Integer(v) => write!(f, "{}", v),
            ParameterValue::Boolean(v) => write!(f, "{}", v),
            ParameterValue::Distance { value, unit } => write!(f, "{}{}", value, unit),
            ParameterValue::Path(p) => write!(f, "{}", p.display()),
            ParameterValue::Datasource(p) => write!(f, "{}", p),
            ParameterValue::Output(o) => write!(f, "{}", o),
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(s: &str) -> Self {
        ParameterValue::String(s.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(s: String) -> Self {
        ParameterValue::String(s)
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        ParameterValue::Double(v)
    }
}

impl From<i64> for ParameterValue {
    fn from(v: i64) -> Self {
        ParameterValue::Integer(v)
    }
}

impl From<i32> for ParameterValue {
    fn from(v: i32) -> Self {
        ParameterValue::Integer(v as i64)
    }
}

impl From<bool> for ParameterValue {
    fn from(v: bool) -> Self {
        ParameterValue::Boolean(v)
    }
}

impl From<PathBuf> for ParameterValue {
    fn from(p: PathBuf) -> Self {
        ParameterValue::Path(p)
    }
}

impl From<DatasourcePointer> for ParameterValue {
    fn from(p: DatasourcePointer) -> Self {
        ParameterValue::Datasource(p)
    }
}

impl From<OutputRequest> for ParameterValue {
    fn from(o: OutputRequest) -> Self {
        ParameterValue::Output(o)
    }
}

/// Prefix marking an in-memory output in textual input (`memory:Buffer`).
pub const MEMORY_OUTPUT_PREFIX: &str = "memory:";

/// What the user asked for on an output-layer parameter.
///
/// In batch mode `name` acts as a template combined with each item's
/// input name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRequest {
    /// Output dataset name (without extension)
    pub name: String,
    /// Target directory; falls back to the configured output directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    /// Materialize the output in memory instead of on disk
    #[serde(default)]
    pub in_memory: bool,
    /// Allow replacing an existing dataset
    #[serde(default)]
    pub overwrite: bool,
}

impl OutputRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            directory: None,
            in_memory: false,
            overwrite: false,
        }
    }

    pub fn in_memory(name: impl Into<String>) -> Self {
        Self::new(name).with_in_memory(true)
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn with_in_memory(mut self, in_memory: bool) -> Self {
        self.in_memory = in_memory;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Parse textual output input.
    ///
    /// - `memory:Name` requests an in-memory dataset
    /// - `dir/Name.geojson` sets directory and name (extension dropped)
    /// - `Name` sets the name only
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(name) = text.strip_prefix(MEMORY_OUTPUT_PREFIX) {
            let name = name.trim();
            return (!name.is_empty()).then(|| Self::in_memory(name));
        }

        let path = Path::new(text);
        let name = path.file_stem()?.to_str()?.to_string();
        let mut request = Self::new(name);
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            request = request.with_directory(parent);
        }
        Some(request)
    }
}

impl std::fmt::Display for OutputRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.in_memory {
            return write!(f, "{}{}", MEMORY_OUTPUT_PREFIX, self.name);
        }
        match &self.directory {
            Some(dir) => write!(f, "{}", dir.join(&self.name).display()),
            None => write!(f, "{}", self.name),
        }
    }
}
