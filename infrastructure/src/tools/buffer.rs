//! `buffer`: polygons at a fixed distance around point features.

use super::output::{vector_input, write_vector};
use crate::datasource::geojson::{Feature, Geometry, Position};
use crate::datasource::memory::MemoryStore;
use geotools_domain::tool::descriptor::GROUP_VECTOR_GEOMETRY;
use geotools_domain::{
    ExecutionFailure, GisTool, ParameterDefinition, ProducedOutput, ToolContext, ToolDescriptor,
};
use std::f64::consts::PI;
use std::sync::Arc;
use tracing::{debug, warn};

pub const BUFFER: &str = "buffer";

pub struct BufferTool {
    store: Arc<MemoryStore>,
}

impl BufferTool {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

impl GisTool for BufferTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(BUFFER, "Buffer by distance")
            .with_description("Creates a polygon around each point at the given distance")
            .with_group(GROUP_VECTOR_GEOMETRY)
            .with_parameter(ParameterDefinition::vector_layer("InputLayer", "Input layer"))
            .with_parameter(
                ParameterDefinition::double("BufferDistance", "Buffer distance")
                    .with_range(Some(0.0), None),
            )
            .with_parameter(
                ParameterDefinition::integer("NumSegments", "Number of segments")
                    .with_int_range(Some(3), Some(360))
                    .with_default(30),
            )
            .with_parameter(ParameterDefinition::boolean("MergeResults", "Merge results"))
            .with_parameter(ParameterDefinition::vector_output("Output", "Output").with_default("Buffer"))
    }

    fn run(&self, ctx: &ToolContext<'_>) -> Result<Vec<ProducedOutput>, ExecutionFailure> {
        let layer = vector_input(ctx, "InputLayer")?;
        let distance = ctx.double("BufferDistance")?;
        if distance <= 0.0 {
            return Err(ExecutionFailure::new("BufferDistance must be greater than zero"));
        }
        let segments = ctx.integer("NumSegments")? as usize;
        let merge = ctx.boolean("MergeResults")?;

        let mut buffered: Vec<Feature> = Vec::with_capacity(layer.features().len());
        let mut without_geometry = 0usize;
        for (index, feature) in layer.features().iter().enumerate() {
            let Some(geometry) = &feature.geometry else {
                without_geometry += 1;
                continue;
            };
            let polygons = buffer_geometry(geometry, distance, segments).map_err(|kind| {
                ExecutionFailure::new(format!("Cannot buffer {} geometries", kind))
                    .with_details(format!("feature {}", index))
            })?;
            let geometry = match polygons.len() {
                1 => Geometry::Polygon {
                    coordinates: polygons.into_iter().flatten().collect(),
                },
                _ => Geometry::MultiPolygon {
                    coordinates: polygons,
                },
            };
            buffered.push(Feature::new(Some(geometry)).with_properties(feature.properties.clone()));
        }

        let features = if merge {
            vec![merge_polygons(buffered)]
        } else {
            buffered
        };
        if without_geometry > 0 {
            warn!(
                tool = BUFFER,
                skipped = without_geometry,
                "Skipped features without geometry"
            );
        }
        debug!(tool = BUFFER, features = features.len(), merge, "Buffered layer");

        Ok(vec![write_vector(&self.store, ctx, "Output", features)?])
    }
}

/// Polygons (each a list of rings) around every point of `geometry`.
///
/// Returns the geometry type name for anything but points.
fn buffer_geometry(
    geometry: &Geometry,
    distance: f64,
    segments: usize,
) -> Result<Vec<Vec<Vec<Position>>>, &'static str> {
    match geometry {
        Geometry::Point { coordinates } => Ok(vec![vec![circle(coordinates, distance, segments)]]),
        Geometry::MultiPoint { coordinates } => Ok(coordinates
            .iter()
            .map(|p| vec![circle(p, distance, segments)])
            .collect()),
        other => Err(other.type_name()),
    }
}

/// Closed counter-clockwise ring of `segments` vertices around `center`.
fn circle(center: &Position, radius: f64, segments: usize) -> Vec<Position> {
    let (cx, cy) = (
        center.first().copied().unwrap_or_default(),
        center.get(1).copied().unwrap_or_default(),
    );
    let mut ring: Vec<Position> = (0..segments)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / segments as f64;
            vec![cx + radius * angle.cos(), cy + radius * angle.sin()]
        })
        .collect();
    if let Some(first) = ring.first().cloned() {
        ring.push(first);
    }
    ring
}

fn merge_polygons(features: Vec<Feature>) -> Feature {
    let coordinates = features
        .into_iter()
        .filter_map(|f| f.geometry)
        .flat_map(|g| match g {
            Geometry::Polygon { coordinates } => vec![coordinates],
            Geometry::MultiPolygon { coordinates } => coordinates,
            _ => Vec::new(),
        })
        .collect();
    Feature::new(Some(Geometry::MultiPolygon { coordinates }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_is_closed_with_requested_vertices() {
        let ring = circle(&vec![10.0, 20.0], 5.0, 8);
        assert_eq!(ring.len(), 9);
        assert_eq!(ring.first(), ring.last());
        for p in &ring {
            let r = ((p[0] - 10.0).powi(2) + (p[1] - 20.0).powi(2)).sqrt();
            assert!((r - 5.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_non_point_geometry_is_rejected() {
        let line = Geometry::LineString {
            coordinates: vec![vec![0.0, 0.0], vec![1.0, 1.0]],
        };
        assert_eq!(buffer_geometry(&line, 1.0, 8), Err("LineString"));
    }

    #[test]
    fn test_multipoint_gives_one_polygon_per_point() {
        let points = Geometry::MultiPoint {
            coordinates: vec![vec![0.0, 0.0], vec![5.0, 5.0]],
        };
        assert_eq!(buffer_geometry(&points, 1.0, 4).unwrap().len(), 2);
    }

    #[test]
    fn test_merge_collects_all_polygons() {
        let polygon = |x: f64| {
            Feature::new(Some(Geometry::Polygon {
                coordinates: vec![circle(&vec![x, 0.0], 1.0, 4)],
            }))
            .with_property("id", x)
        };
        let merged = merge_polygons(vec![polygon(0.0), polygon(10.0)]);
        assert!(merged.properties.is_empty());
        match merged.geometry {
            Some(Geometry::MultiPolygon { coordinates }) => assert_eq!(coordinates.len(), 2),
            other => panic!("expected MultiPolygon, got {:?}", other),
        }
    }
}
