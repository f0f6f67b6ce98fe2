//! GeoJSON-backed feature store.
//!
//! A [`GeoJsonLayer`] keeps the parsed `FeatureCollection` document next to
//! an in-memory [`MemoryLayer`]. All store operations go to the memory
//! layer; only geometries that were actually written get patched back into
//! the document on output, so every untouched feature (properties, `id`,
//! foreign members, Z ordinates) comes out exactly as it went in.
//! Rewritten geometries are 2D; a warning names the features that lost
//! ordinates that way.
//!
//! ## Rust Lesson #22: serde internally tagged enums
//!
//! `#[serde(tag = "type")]` maps `{"type": "Polygon", "coordinates": ...}`
//! straight onto the `Polygon { coordinates }` variant. No hand-written
//! dispatch on the `"type"` string.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};
use crate::feature::{Feature, FeatureId, LayerInfo};
use crate::geometry::{Geometry, Point, Polygon, Ring};
use crate::ports::FeatureStore;
use crate::store::MemoryLayer;

/// A GeoJSON position: `[x, y, ...]`.
type Position = Vec<f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
enum GeoJsonGeometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    GeometryCollection { geometries: Vec<GeoJsonGeometry> },
}

impl GeoJsonGeometry {
    /// True when any position carries more than x and y.
    fn has_extra_ordinates(&self) -> bool {
        fn wide(positions: &[Position]) -> bool {
            positions.iter().any(|p| p.len() > 2)
        }
        match self {
            GeoJsonGeometry::Point { coordinates } => coordinates.len() > 2,
            GeoJsonGeometry::MultiPoint { coordinates }
            | GeoJsonGeometry::LineString { coordinates } => wide(coordinates),
            GeoJsonGeometry::MultiLineString { coordinates }
            | GeoJsonGeometry::Polygon { coordinates } => coordinates.iter().any(|r| wide(r)),
            GeoJsonGeometry::MultiPolygon { coordinates } => {
                coordinates.iter().flatten().any(|r| wide(r))
            }
            GeoJsonGeometry::GeometryCollection { geometries } => {
                geometries.iter().any(GeoJsonGeometry::has_extra_ordinates)
            }
        }
    }
}

/// A feature layer read from a GeoJSON `FeatureCollection`.
#[derive(Debug, Clone)]
pub struct GeoJsonLayer {
    layer: MemoryLayer,
    document: Value,
    /// Features with Z/M ordinates in the source
    extra_ordinates: BTreeSet<FeatureId>,
}

impl GeoJsonLayer {
    /// Parse a `FeatureCollection`.
    ///
    /// The layer is named after the top-level `"name"` member when there
    /// is one, `fallback_name` otherwise. Feature ids are positions in the
    /// `features` array.
    pub fn parse(fallback_name: &str, content: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(content)?;

        if document.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
            return Err(StoreError::Format(
                "top-level object is not a FeatureCollection".into(),
            ));
        }
        let raw_features = document
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                StoreError::Format("FeatureCollection has no \"features\" array".into())
            })?;

        let mut geometries = Vec::with_capacity(raw_features.len());
        let mut extra_ordinates = BTreeSet::new();
        for (index, raw) in raw_features.iter().enumerate() {
            let (geometry, wide) = parse_feature(raw).map_err(|e| match e {
                StoreError::Format(msg) => {
                    StoreError::Format(format!("feature {}: {}", index, msg))
                }
                other => other,
            })?;
            if wide {
                extra_ordinates.insert(FeatureId(index as u64));
            }
            geometries.push(geometry);
        }

        let name = document
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(fallback_name)
            .to_string();
        let layer = MemoryLayer::from_geometries(name, geometries);
        let info = layer.layer_info();
        debug!(
            layer = %info.name,
            features = layer.len(),
            kind = ?info.kind,
            "parsed GeoJSON layer"
        );

        Ok(Self {
            layer,
            document,
            extra_ordinates,
        })
    }

    /// Read a layer from disk; the file stem is the fallback name.
    pub fn open(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("layer");
        let layer = Self::parse(stem, &content)?;
        info!(path = %path.display(), features = layer.layer.len(), "opened layer");
        Ok(layer)
    }

    /// The underlying memory layer.
    pub fn layer(&self) -> &MemoryLayer {
        &self.layer
    }

    /// Ids of features whose geometry was written, ascending.
    pub fn modified_ids(&self) -> Vec<FeatureId> {
        let ids: BTreeSet<FeatureId> = self.layer.committed_writes().iter().copied().collect();
        ids.into_iter().collect()
    }

    pub fn is_modified(&self) -> bool {
        !self.layer.committed_writes().is_empty()
    }

    /// Modified features whose source had Z/M ordinates; their rewritten
    /// geometry is 2D.
    pub fn flattened_ids(&self) -> Vec<FeatureId> {
        self.modified_ids()
            .into_iter()
            .filter(|id| self.extra_ordinates.contains(id))
            .collect()
    }

    /// The document with every modified geometry patched in.
    pub fn to_document(&self) -> Result<Value> {
        let mut document = self.document.clone();
        let Some(features) = document.get_mut("features").and_then(Value::as_array_mut) else {
            return Err(StoreError::Format(
                "FeatureCollection lost its \"features\" array".into(),
            ));
        };

        let flattened = self.flattened_ids();
        if !flattened.is_empty() {
            warn!(
                count = flattened.len(),
                ids = ?flattened,
                "rewritten geometries dropped ordinates beyond x,y"
            );
        }

        for id in self.modified_ids() {
            let geometry = self.layer.get(id)?.ok_or(StoreError::UnknownFeature(id))?;
            let slot = usize::try_from(id.0)
                .ok()
                .and_then(|index| features.get_mut(index))
                .ok_or(StoreError::UnknownFeature(id))?;
            if let Some(feature) = slot.as_object_mut() {
                feature.insert("geometry".to_string(), geometry_to_value(&geometry)?);
            }
        }

        Ok(document)
    }

    /// Serialize the layer, patched with its modifications.
    pub fn to_json_string(&self, pretty: bool) -> Result<String> {
        let document = self.to_document()?;
        let text = if pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        Ok(text)
    }

    /// Write the layer to `path`.
    pub fn save(&self, path: &Path, pretty: bool) -> Result<()> {
        let mut text = self.to_json_string(pretty)?;
        text.push('\n');
        fs::write(path, text)?;
        info!(path = %path.display(), modified = self.modified_ids().len(), "saved layer");
        Ok(())
    }
}

impl FeatureStore for GeoJsonLayer {
    fn layer_info(&self) -> LayerInfo {
        self.layer.layer_info()
    }

    fn features(&self) -> Result<Vec<Feature>> {
        self.layer.features()
    }

    fn get(&self, id: FeatureId) -> Result<Option<Geometry>> {
        self.layer.get(id)
    }

    fn select(&mut self, ids: &[FeatureId]) {
        self.layer.select(ids)
    }

    fn clear_selection(&mut self) {
        self.layer.clear_selection()
    }

    fn selection(&self) -> &[FeatureId] {
        self.layer.selection()
    }

    fn commit_pending(&mut self) -> Result<()> {
        self.layer.commit_pending()
    }

    fn begin_edit(&mut self) -> Result<()> {
        self.layer.begin_edit()
    }

    fn write_geometry(&mut self, id: FeatureId, geometry: Geometry) -> Result<()> {
        self.layer.write_geometry(id, geometry)
    }

    fn commit_edit(&mut self) -> Result<()> {
        self.layer.commit_edit()
    }

    fn rollback_edit(&mut self) {
        self.layer.rollback_edit()
    }
}

// ============================================================================
// READING
// ============================================================================

/// The feature's geometry, and whether it has more than two ordinates.
fn parse_feature(raw: &Value) -> Result<(Geometry, bool)> {
    let object = raw
        .as_object()
        .ok_or_else(|| StoreError::Format("feature is not an object".into()))?;

    match object.get("geometry") {
        None | Some(Value::Null) => Ok((Geometry::Empty, false)),
        Some(value) => {
            let parsed: GeoJsonGeometry = serde_json::from_value(value.clone())
                .map_err(|e| StoreError::Format(format!("bad geometry: {}", e)))?;
            Ok((from_geojson(&parsed)?, parsed.has_extra_ordinates()))
        }
    }
}

fn to_point(position: &[f64]) -> Result<Point> {
    match position {
        [x, y, ..] => Ok(Point::new(*x, *y)),
        _ => Err(StoreError::Format(format!(
            "position needs at least 2 ordinates, got {}",
            position.len()
        ))),
    }
}

fn to_points(positions: &[Position]) -> Result<Vec<Point>> {
    positions.iter().map(|p| to_point(p)).collect()
}

/// Rings in order; an empty ring list is an empty polygon.
fn to_polygon(rings: &[Vec<Position>]) -> Result<Option<Polygon>> {
    let rings = rings.iter().map(|r| to_points(r)).collect::<Result<Vec<Ring>>>()?;
    Ok(Polygon::from_rings(rings))
}

fn from_geojson(geometry: &GeoJsonGeometry) -> Result<Geometry> {
    let converted = match geometry {
        GeoJsonGeometry::Point { coordinates } => Geometry::Point(to_point(coordinates)?),
        GeoJsonGeometry::MultiPoint { coordinates } => Geometry::Collection(
            to_points(coordinates)?.into_iter().map(Geometry::Point).collect(),
        ),
        GeoJsonGeometry::LineString { coordinates } => {
            Geometry::LineString(to_points(coordinates)?)
        }
        GeoJsonGeometry::MultiLineString { coordinates } => Geometry::Collection(
            coordinates
                .iter()
                .map(|line| to_points(line).map(Geometry::LineString))
                .collect::<Result<_>>()?,
        ),
        GeoJsonGeometry::Polygon { coordinates } => match to_polygon(coordinates)? {
            Some(polygon) => Geometry::Polygon(polygon),
            None => Geometry::Empty,
        },
        GeoJsonGeometry::MultiPolygon { coordinates } => {
            let mut polygons = Vec::with_capacity(coordinates.len());
            for rings in coordinates {
                if let Some(polygon) = to_polygon(rings)? {
                    polygons.push(polygon);
                }
            }
            Geometry::MultiPolygon(polygons)
        }
        GeoJsonGeometry::GeometryCollection { geometries } => {
            Geometry::Collection(geometries.iter().map(from_geojson).collect::<Result<_>>()?)
        }
    };
    Ok(converted)
}

// ============================================================================
// WRITING
// ============================================================================

fn from_point(point: &Point) -> Position {
    vec![point.x, point.y]
}

fn from_points(points: &[Point]) -> Vec<Position> {
    points.iter().map(from_point).collect()
}

fn from_polygon(polygon: &Polygon) -> Vec<Vec<Position>> {
    polygon.rings().map(|ring| from_points(ring)).collect()
}

/// `None` for `Empty`, which GeoJSON spells `null`.
fn to_geojson(geometry: &Geometry) -> Option<GeoJsonGeometry> {
    let converted = match geometry {
        Geometry::Empty => return None,
        Geometry::Point(p) => GeoJsonGeometry::Point { coordinates: from_point(p) },
        Geometry::LineString(points) => GeoJsonGeometry::LineString {
            coordinates: from_points(points),
        },
        Geometry::Polygon(poly) => GeoJsonGeometry::Polygon {
            coordinates: from_polygon(poly),
        },
        Geometry::MultiPolygon(polys) => GeoJsonGeometry::MultiPolygon {
            coordinates: polys.iter().map(from_polygon).collect(),
        },
        Geometry::Collection(parts) => GeoJsonGeometry::GeometryCollection {
            geometries: parts.iter().filter_map(to_geojson).collect(),
        },
    };
    Some(converted)
}

fn geometry_to_value(geometry: &Geometry) -> Result<Value> {
    match to_geojson(geometry) {
        Some(g) => Ok(serde_json::to_value(g)?),
        None => Ok(Value::Null),
    }
}
