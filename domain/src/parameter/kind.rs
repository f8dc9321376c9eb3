//! Parameter kinds: the closed set of value slots a tool can declare.
//!
//! [`ParameterKind`] carries the kind-specific constraints, while
//! [`ParameterKindTag`] is the plain discriminator used to look up the
//! kind's behavior (validation, parsing, description) in the behavior table.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Kind of datasource a layer parameter accepts or an output produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceType {
    Vector,
    Raster,
    /// Either vector or raster
    Any,
}

impl DataSourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSourceType::Vector => "vector",
            DataSourceType::Raster => "raster",
            DataSourceType::Any => "any",
        }
    }

    /// Whether a datasource of type `actual` satisfies this requirement.
    pub fn accepts(&self, actual: DataSourceType) -> bool {
        match self {
            DataSourceType::Any => true,
            expected => *expected == actual,
        }
    }
}

impl std::fmt::Display for DataSourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Data kind of a file referenced by a filename parameter.
///
/// | Kind | Extensions |
/// |------|------------|
/// | `Vector` | shp, kml, dgn, dxf, gml, mif, tab, geojson, json |
/// | `Image` | tif, png |
/// | `Grid` | asc |
/// | `Any` | anything |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Vector,
    Image,
    Grid,
    Any,
}

const VECTOR_EXTENSIONS: &[&str] = &[
    "shp", "kml", "dgn", "dxf", "gml", "mif", "tab", "geojson", "json",
];
const IMAGE_EXTENSIONS: &[&str] = &["tif", "png"];
const GRID_EXTENSIONS: &[&str] = &["asc"];

impl DataKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Vector => "vector",
            DataKind::Image => "image",
            DataKind::Grid => "grid",
            DataKind::Any => "any",
        }
    }

    /// File extensions (lowercase, without the dot) of this kind.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            DataKind::Vector => VECTOR_EXTENSIONS,
            DataKind::Image => IMAGE_EXTENSIONS,
            DataKind::Grid => GRID_EXTENSIONS,
            DataKind::Any => &[],
        }
    }

    /// Check whether `path` has an extension of this kind (case-insensitive).
    pub fn matches(&self, path: &Path) -> bool {
        if *self == DataKind::Any {
            return true;
        }
        extension_of(path)
            .map(|ext| self.extensions().contains(&ext.as_str()))
            .unwrap_or(false)
    }

    /// Infer the data kind from a path's extension.
    pub fn from_path(path: &Path) -> Option<DataKind> {
        let ext = extension_of(path)?;
        [DataKind::Vector, DataKind::Image, DataKind::Grid]
            .into_iter()
            .find(|kind| kind.extensions().contains(&ext.as_str()))
    }

    /// Datasource type produced when a file of this kind is opened.
    pub fn source_type(&self) -> DataSourceType {
        match self {
            DataKind::Vector => DataSourceType::Vector,
            DataKind::Image | DataKind::Grid => DataSourceType::Raster,
            DataKind::Any => DataSourceType::Any,
        }
    }
}

impl std::fmt::Display for DataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Measurement unit of a distance parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    Meters,
    Kilometers,
    Feet,
    Miles,
    /// Map units of a geographic coordinate system
    Degrees,
}

impl DistanceUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceUnit::Meters => "m",
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Feet => "ft",
            DistanceUnit::Miles => "mi",
            DistanceUnit::Degrees => "deg",
        }
    }

    /// Parse a unit suffix such as `m`, `km` or `ft`.
    pub fn from_suffix(suffix: &str) -> Option<DistanceUnit> {
        match suffix.trim().to_ascii_lowercase().as_str() {
            "m" | "meter" | "meters" => Some(DistanceUnit::Meters),
            "km" | "kilometer" | "kilometers" => Some(DistanceUnit::Kilometers),
            "ft" | "foot" | "feet" => Some(DistanceUnit::Feet),
            "mi" | "mile" | "miles" => Some(DistanceUnit::Miles),
            "deg" | "degree" | "degrees" => Some(DistanceUnit::Degrees),
            _ => None,
        }
    }

    /// Convert `value` expressed in this unit into `target`.
    ///
    /// Degrees are not convertible to linear units; a conversion between
    /// degrees and anything else returns `None`.
    pub fn convert(&self, value: f64, target: DistanceUnit) -> Option<f64> {
        if *self == target {
            return Some(value);
        }
        let from = self.meters_per_unit()?;
        let to = target.meters_per_unit()?;
        Some(value * from / to)
    }

    fn meters_per_unit(&self) -> Option<f64> {
        match self {
            DistanceUnit::Meters => Some(1.0),
            DistanceUnit::Kilometers => Some(1000.0),
            DistanceUnit::Feet => Some(0.3048),
            DistanceUnit::Miles => Some(1609.344),
            DistanceUnit::Degrees => None,
        }
    }
}

impl std::fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of a parameter together with its kind-specific constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterKind {
    String {
        multi_line: bool,
    },
    Double {
        min: Option<f64>,
        max: Option<f64>,
    },
    Integer {
        min: Option<i64>,
        max: Option<i64>,
    },
    Boolean,
    Distance {
        unit: DistanceUnit,
        min: Option<f64>,
        max: Option<f64>,
    },
    Options {
        choices: Vec<String>,
    },
    /// Attribute field of the layer bound to parameter `layer`
    Field {
        layer: String,
    },
    Filename {
        data_type: DataKind,
        /// Whether the parameter may vary across batch items
        batch: bool,
    },
    Layer {
        source_type: DataSourceType,
    },
    OutputLayer {
        layer_type: DataSourceType,
        support_in_memory: bool,
    },
}

impl ParameterKind {
    /// Discriminator used for behavior lookup.
    pub fn tag(&self) -> ParameterKindTag {
        match self {
            ParameterKind::String { .. } => ParameterKindTag::String,
            ParameterKind::Double { .. } => ParameterKindTag::Double,
            ParameterKind::Integer { .. } => ParameterKindTag::Integer,
            ParameterKind::Boolean => ParameterKindTag::Boolean,
            ParameterKind::Distance { .. } => ParameterKindTag::Distance,
            ParameterKind::Options { .. } => ParameterKindTag::Options,
            ParameterKind::Field { .. } => ParameterKindTag::Field,
            ParameterKind::Filename { .. } => ParameterKindTag::Filename,
            ParameterKind::Layer { .. } => ParameterKindTag::Layer,
            ParameterKind::OutputLayer { .. } => ParameterKindTag::OutputLayer,
        }
    }

    /// Layer parameters reference a datasource that the executor opens.
    pub fn is_layer(&self) -> bool {
        matches!(self, ParameterKind::Layer { .. })
    }

    /// Whether this parameter can be the varying parameter of a batch run.
    pub fn is_batch_capable(&self) -> bool {
        matches!(
            self,
            ParameterKind::Layer { .. } | ParameterKind::Filename { batch: true, .. }
        )
    }

    /// The layer parameter this one depends on, if any.
    pub fn depends_on(&self) -> Option<&str> {
        match self {
            ParameterKind::Field { layer } => Some(layer),
            _ => None,
        }
    }
}

/// Plain discriminator of [`ParameterKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKindTag {
    String,
    Double,
    Integer,
    Boolean,
    Distance,
    Options,
    Field,
    Filename,
    Layer,
    OutputLayer,
}

impl ParameterKindTag {
    pub const ALL: [ParameterKindTag; 10] = [
        ParameterKindTag::String,
        ParameterKindTag::Double,
        ParameterKindTag::Integer,
        ParameterKindTag::Boolean,
        ParameterKindTag::Distance,
        ParameterKindTag::Options,
        ParameterKindTag::Field,
        ParameterKindTag::Filename,
        ParameterKindTag::Layer,
        ParameterKindTag::OutputLayer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKindTag::String => "string",
            ParameterKindTag::Double => "double",
            ParameterKindTag::Integer => "integer",
            ParameterKindTag::Boolean => "boolean",
            ParameterKindTag::Distance => "distance",
            ParameterKindTag::Options => "options",
            ParameterKindTag::Field => "field",
            ParameterKindTag::Filename => "filename",
            ParameterKindTag::Layer => "layer",
            ParameterKindTag::OutputLayer => "output_layer",
        }
    }
}

impl std::fmt::Display for ParameterKindTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_kind_matches_case_insensitive() {
        assert!(DataKind::Vector.matches(Path::new("parcels.SHP")));
        assert!(DataKind::Vector.matches(Path::new("roads.geojson")));
        assert!(!DataKind::Vector.matches(Path::new("dem.asc")));
        assert!(DataKind::Grid.matches(Path::new("dem.asc")));
        assert!(!DataKind::Image.matches(Path::new("no_extension")));
        assert!(DataKind::Any.matches(Path::new("no_extension")));
    }

    #[test]
    fn test_data_kind_from_path() {
        assert_eq!(DataKind::from_path(Path::new("a.tif")), Some(DataKind::Image));
        assert_eq!(DataKind::from_path(Path::new("a.kml")), Some(DataKind::Vector));
        assert_eq!(DataKind::from_path(Path::new("a.xyz")), None);
        assert_eq!(DataKind::Grid.source_type(), DataSourceType::Raster);
    }

    #[test]
    fn test_source_type_accepts() {
        assert!(DataSourceType::Any.accepts(DataSourceType::Raster));
        assert!(DataSourceType::Vector.accepts(DataSourceType::Vector));
        assert!(!DataSourceType::Vector.accepts(DataSourceType::Raster));
    }

    #[test]
    fn test_distance_conversion() {
        assert_eq!(DistanceUnit::Kilometers.convert(1.5, DistanceUnit::Meters), Some(1500.0));
        assert_eq!(DistanceUnit::Meters.convert(10.0, DistanceUnit::Meters), Some(10.0));
        assert!(DistanceUnit::Degrees.convert(1.0, DistanceUnit::Meters).is_none());
        assert_eq!(DistanceUnit::from_suffix("KM"), Some(DistanceUnit::Kilometers));
        assert_eq!(DistanceUnit::from_suffix("parsec"), None);
    }

    #[test]
    fn test_kind_tags_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for tag in ParameterKindTag::ALL {
            assert!(seen.insert(tag.as_str()));
        }
        assert_eq!(
            ParameterKind::Field { layer: "InputLayer".into() }.depends_on(),
            Some("InputLayer")
        );
        assert!(ParameterKind::Filename { data_type: DataKind::Vector, batch: true }.is_batch_capable());
        assert!(!ParameterKind::Filename { data_type: DataKind::Vector, batch: false }.is_batch_capable());
    }
}
