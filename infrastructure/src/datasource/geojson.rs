//! GeoJSON FeatureCollection reading and writing.

use geotools_domain::{
    DataSourceType, Datasource, DatasourceError, FieldInfo, FieldType, MEMORY_SCHEME,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// `[x, y]` or `[x, y, z]`
pub type Position = Vec<f64>;

/// GeoJSON geometry object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
}

impl Geometry {
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point { .. } => "Point",
            Geometry::MultiPoint { .. } => "MultiPoint",
            Geometry::LineString { .. } => "LineString",
            Geometry::MultiLineString { .. } => "MultiLineString",
            Geometry::Polygon { .. } => "Polygon",
            Geometry::MultiPolygon { .. } => "MultiPolygon",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
enum FeatureTag {
    #[default]
    Feature,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
enum CollectionTag {
    #[default]
    FeatureCollection,
}

/// GeoJSON feature: optional geometry plus attribute properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    tag: FeatureTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub geometry: Option<Geometry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn new(geometry: Option<Geometry>) -> Self {
        Self {
            geometry,
            ..Self::default()
        }
    }

    pub fn with_properties(mut self, properties: Map<String, Value>) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct FeatureCollection {
    #[serde(rename = "type")]
    tag: CollectionTag,
    features: Vec<Feature>,
}

/// An opened GeoJSON layer.
///
/// Features are shared, so layers reopened from the in-memory store do not
/// copy the data.
#[derive(Debug, Clone)]
pub struct VectorLayer {
    path: PathBuf,
    identity: Option<String>,
    features: Arc<Vec<Feature>>,
}

impl VectorLayer {
    pub fn new(path: impl Into<PathBuf>, features: Arc<Vec<Feature>>) -> Self {
        Self {
            path: path.into(),
            identity: None,
            features,
        }
    }

    pub fn with_identity(mut self, identity: Option<String>) -> Self {
        self.identity = identity;
        self
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn is_in_memory(&self) -> bool {
        self.path
            .to_str()
            .is_some_and(|p| p.starts_with(MEMORY_SCHEME))
    }
}

impl Datasource for VectorLayer {
    fn filename(&self) -> &Path {
        &self.path
    }

    fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    fn source_type(&self) -> DataSourceType {
        DataSourceType::Vector
    }

    fn fields(&self) -> Vec<FieldInfo> {
        infer_fields(&self.features)
    }

    fn feature_count(&self) -> Option<usize> {
        Some(self.features.len())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Union of property keys across features, with a type per key.
///
/// Integers widen to doubles; any other disagreement makes the field a
/// string. Keys whose values are all null are typed as strings.
pub fn infer_fields(features: &[Feature]) -> Vec<FieldInfo> {
    let mut fields: Vec<(String, Option<FieldType>)> = Vec::new();

    for feature in features {
        for (key, value) in &feature.properties {
            let observed = value_type(value);
            match fields.iter_mut().find(|(name, _)| name == key) {
                Some((_, current)) => *current = merge_types(*current, observed),
                None => fields.push((key.clone(), observed)),
            }
        }
    }

    fields
        .into_iter()
        .map(|(name, ty)| FieldInfo::new(name, ty.unwrap_or(FieldType::String)))
        .collect()
}

fn value_type(value: &Value) -> Option<FieldType> {
    match value {
        Value::Null => None,
        Value::Bool(_) => Some(FieldType::Boolean),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(FieldType::Integer),
        Value::Number(_) => Some(FieldType::Double),
        _ => Some(FieldType::String),
    }
}

fn merge_types(current: Option<FieldType>, observed: Option<FieldType>) -> Option<FieldType> {
    match (current, observed) {
        (None, ty) | (ty, None) => ty,
        (Some(a), Some(b)) if a == b => Some(a),
        (Some(FieldType::Integer), Some(FieldType::Double))
        | (Some(FieldType::Double), Some(FieldType::Integer)) => Some(FieldType::Double),
        _ => Some(FieldType::String),
    }
}

/// Read a FeatureCollection from `path`.
///
/// An empty collection has no layers.
pub fn read_layer(path: &Path) -> Result<VectorLayer, DatasourceError> {
    let file = File::open(path).map_err(|e| DatasourceError::open(path, e))?;
    let collection: FeatureCollection =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| DatasourceError::open(path, e))?;

    if collection.features.is_empty() {
        return Err(DatasourceError::NoLayersFound {
            path: path.to_path_buf(),
        });
    }

    debug!(path = %path.display(), features = collection.features.len(), "Opened GeoJSON layer");
    Ok(VectorLayer::new(path, Arc::new(collection.features)))
}

/// Write `features` as a FeatureCollection to `path`.
///
/// Fails when the file exists and `overwrite` is false. Parent directories
/// are created as needed.
pub fn write_layer(path: &Path, features: &[Feature], overwrite: bool) -> Result<(), DatasourceError> {
    if path.exists() && !overwrite {
        return Err(DatasourceError::write(path, "file already exists"));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| DatasourceError::write(path, e))?;
    }

    let file = File::create(path).map_err(|e| DatasourceError::write(path, e))?;
    write_or_discard(path, file, features)?;

    debug!(path = %path.display(), features = features.len(), "Wrote GeoJSON layer");
    Ok(())
}

/// Serialize `features` into `writer`, removing the partial file at `path`
/// when serialization or the final flush fails.
fn write_or_discard<W: Write>(path: &Path, writer: W, features: &[Feature]) -> Result<(), DatasourceError> {
    let Err(e) = write_collection(writer, features) else {
        return Ok(());
    };
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Removed partial GeoJSON output"),
        Err(remove) if remove.kind() == io::ErrorKind::NotFound => {}
        Err(remove) => warn!(
            path = %path.display(),
            error = %remove,
            "Failed to remove partial GeoJSON output"
        ),
    }
    Err(DatasourceError::write(path, e))
}

fn write_collection<W: Write>(writer: W, features: &[Feature]) -> io::Result<()> {
    let collection = FeatureCollection {
        tag: CollectionTag::FeatureCollection,
        features: features.to_vec(),
    };
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, &collection)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PARCELS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [1.0, 2.0]},
             "properties": {"owner": "ada", "area": 10, "vacant": false}},
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [3.0, 4.0, 5.0]},
             "properties": {"owner": "bob", "area": 12.5, "zone": null}},
            {"type": "Feature", "geometry": null, "properties": null}
        ]
    }"#;

    #[test]
    fn test_read_layer_and_infer_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parcels.geojson");
        std::fs::write(&path, PARCELS).unwrap();

        let layer = read_layer(&path).unwrap();
        assert_eq!(layer.feature_count(), Some(3));
        assert_eq!(layer.source_type(), DataSourceType::Vector);
        assert!(layer.features()[2].properties.is_empty());

        let fields = layer.fields();
        let ty = |name: &str| fields.iter().find(|f| f.name == name).unwrap().field_type;
        assert_eq!(ty("owner"), FieldType::String);
        assert_eq!(ty("area"), FieldType::Double);
        assert_eq!(ty("vacant"), FieldType::Boolean);
        assert_eq!(ty("zone"), FieldType::String);
    }

    #[test]
    fn test_empty_collection_has_no_layers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.geojson");
        std::fs::write(&path, r#"{"type": "FeatureCollection", "features": []}"#).unwrap();

        assert!(matches!(
            read_layer(&path),
            Err(DatasourceError::NoLayersFound { .. })
        ));
    }

    #[test]
    fn test_not_a_feature_collection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("point.geojson");
        std::fs::write(&path, r#"{"type": "Point", "coordinates": [0, 0]}"#).unwrap();

        assert!(matches!(read_layer(&path), Err(DatasourceError::Open { .. })));
    }

    #[test]
    fn test_write_then_read_preserves_features() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.geojson");
        let features = vec![
            Feature::new(Some(Geometry::Point {
                coordinates: vec![0.5, 0.5],
            }))
            .with_property("name", "a"),
        ];

        write_layer(&path, &features, false).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let raw: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(raw["type"], "FeatureCollection");
        assert_eq!(raw["features"][0]["type"], "Feature");
        assert_eq!(raw["features"][0]["properties"], json!({"name": "a"}));

        assert_eq!(read_layer(&path).unwrap().features(), features.as_slice());
    }

    struct BrokenDisk;

    impl Write for BrokenDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::other("disk full"))
        }
    }

    #[test]
    fn test_failed_write_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.geojson");
        std::fs::write(&path, "{\"type\": \"FeatureColl").unwrap();
        let features = vec![Feature::new(Some(Geometry::Point {
            coordinates: vec![1.0, 2.0],
        }))];

        let err = write_or_discard(&path, BrokenDisk, &features).unwrap_err();

        assert!(matches!(err, DatasourceError::Write { .. }));
        assert!(err.to_string().contains("disk full"));
        assert!(!path.exists());
        // a retry is not blocked by leftovers
        write_layer(&path, &features, false).unwrap();
        assert_eq!(read_layer(&path).unwrap().features().len(), 1);
    }

    #[test]
    fn test_write_refuses_existing_file_without_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.geojson");
        let features = vec![Feature::new(None)];

        write_layer(&path, &features, false).unwrap();
        assert!(matches!(
            write_layer(&path, &features, false),
            Err(DatasourceError::Write { .. })
        ));
        assert!(write_layer(&path, &features, true).is_ok());
    }
}
