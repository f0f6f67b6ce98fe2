//! Features and layer metadata.

use std::fmt;

use serde::Serialize;

use crate::geometry::Geometry;

/// Identifier of a feature inside its layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FeatureId(pub u64);

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for FeatureId {
    fn from(id: u64) -> Self {
        FeatureId(id)
    }
}

/// An identifier plus the geometry stored under it.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: FeatureId,
    pub geometry: Geometry,
}

impl Feature {
    pub fn new(id: impl Into<FeatureId>, geometry: Geometry) -> Self {
        Self {
            id: id.into(),
            geometry,
        }
    }
}

/// Geometry family declared (or inferred) for a vector layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryFamily {
    Point,
    Line,
    Polygon,
    Unknown,
}

/// What kind of layer a store represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Vector(GeometryFamily),
    Raster,
}

/// Name and kind of a layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerInfo {
    pub name: String,
    pub kind: LayerKind,
}

impl LayerInfo {
    pub fn new(name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Shorthand for a polygon vector layer.
    pub fn polygons(name: impl Into<String>) -> Self {
        Self::new(name, LayerKind::Vector(GeometryFamily::Polygon))
    }

    /// Only polygon vector layers can be audited.
    pub fn is_polygonal(&self) -> bool {
        self.kind == LayerKind::Vector(GeometryFamily::Polygon)
    }
}

/// Infer a layer's geometry family from its features.
///
/// Bare points or lines make the layer non-polygonal. Otherwise the layer
/// is polygonal as soon as one feature carries polygonal content (null
/// geometries and collections are tolerated). A layer with nothing to go
/// on is `Unknown`.
pub fn infer_family<'a, I>(geometries: I) -> GeometryFamily
where
    I: IntoIterator<Item = &'a Geometry>,
{
    let mut polygonal = false;
    for geometry in geometries {
        match geometry {
            Geometry::Point(_) => return GeometryFamily::Point,
            Geometry::LineString(_) => return GeometryFamily::Line,
            other => polygonal |= other.has_polygonal_content(),
        }
    }
    if polygonal {
        GeometryFamily::Polygon
    } else {
        GeometryFamily::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{ring, Point, Polygon};

    fn square() -> Geometry {
        Geometry::Polygon(Polygon::new(ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)])))
    }

    #[test]
    fn polygon_layer_with_nulls_is_polygonal() {
        let geoms = [Geometry::Empty, square(), Geometry::Collection(vec![square()])];
        assert_eq!(infer_family(&geoms), GeometryFamily::Polygon);
    }

    #[test]
    fn any_bare_point_makes_point_layer() {
        let geoms = [square(), Geometry::Point(Point::new(0.0, 0.0))];
        assert_eq!(infer_family(&geoms), GeometryFamily::Point);
    }

    #[test]
    fn empty_layer_is_unknown() {
        assert_eq!(infer_family(&Vec::<Geometry>::new()), GeometryFamily::Unknown);
        assert_eq!(infer_family(&[Geometry::Empty]), GeometryFamily::Unknown);
    }

    #[test]
    fn only_polygon_vectors_are_polygonal() {
        assert!(LayerInfo::polygons("parcels").is_polygonal());
        assert!(!LayerInfo::new("dem", LayerKind::Raster).is_polygonal());
        assert!(!LayerInfo::new("roads", LayerKind::Vector(GeometryFamily::Line)).is_polygonal());
    }

    #[test]
    fn feature_id_displays_as_number() {
        assert_eq!(FeatureId(42).to_string(), "42");
    }
}
