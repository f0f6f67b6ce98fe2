//! `geo`-backed [`GeometryEngine`].
//!
//! Validity comes from `geo`'s `Validation` trait (OGC simple-feature
//! rules). Repair re-nodes the polygonal parts by unioning them with an
//! empty multipolygon, which resolves self-intersections, and then
//! applies the usual 0/1/many shape rule.

use geo::{BooleanOps, Coord, LineString, Validation};

use crate::geometry::{Geometry, Point, Polygon};
use crate::ports::GeometryEngine;
use crate::structure::{collapse, collect_polygonal_parts};

/// Geometry engine over the `geo` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeoEngine;

impl GeoEngine {
    pub fn new() -> Self {
        Self
    }
}

impl GeometryEngine for GeoEngine {
    fn is_valid(&self, geometry: &Geometry) -> bool {
        match to_geo(geometry) {
            Some(g) => Validation::is_valid(&g),
            None => false,
        }
    }

    fn repair(&self, geometry: &Geometry) -> Option<Geometry> {
        if geometry.is_empty() {
            return None;
        }
        if !geometry.has_polygonal_content() {
            return self.is_valid(geometry).then(|| geometry.clone());
        }

        let mut parts = Vec::new();
        collect_polygonal_parts(geometry, &mut parts);
        // The union's integer snapping cannot place non-finite coordinates.
        if parts.iter().any(|p| has_non_finite(p)) {
            return None;
        }
        let subject = geo::MultiPolygon::new(parts.into_iter().map(to_geo_polygon).collect());
        let noded = subject.union(&geo::MultiPolygon::<f64>::new(Vec::new()));

        collapse(noded.0.iter().map(from_geo_polygon).collect())
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

fn has_non_finite(polygon: &Polygon) -> bool {
    polygon
        .outer
        .iter()
        .chain(polygon.holes.iter().flatten())
        .any(|p| !p.x.is_finite() || !p.y.is_finite())
}

fn to_coord(point: &Point) -> Coord<f64> {
    Coord { x: point.x, y: point.y }
}

fn to_line_string(points: &[Point]) -> LineString<f64> {
    LineString::new(points.iter().map(to_coord).collect())
}

/// `geo::Polygon::new` closes open rings.
fn to_geo_polygon(polygon: &Polygon) -> geo::Polygon<f64> {
    geo::Polygon::new(
        to_line_string(&polygon.outer),
        polygon.holes.iter().map(|hole| to_line_string(hole)).collect(),
    )
}

fn from_line_string(line: &LineString<f64>) -> Vec<Point> {
    line.coords().map(|c| Point::new(c.x, c.y)).collect()
}

fn from_geo_polygon(polygon: &geo::Polygon<f64>) -> Polygon {
    Polygon::with_holes(
        from_line_string(polygon.exterior()),
        polygon.interiors().iter().map(from_line_string).collect(),
    )
}

/// Convert to a `geo` geometry. `Empty` has no counterpart.
pub fn to_geo(geometry: &Geometry) -> Option<geo::Geometry<f64>> {
    let converted = match geometry {
        Geometry::Empty => return None,
        Geometry::Point(p) => geo::Geometry::Point(geo::Point::from(to_coord(p))),
        Geometry::LineString(points) => geo::Geometry::LineString(to_line_string(points)),
        Geometry::Polygon(poly) => geo::Geometry::Polygon(to_geo_polygon(poly)),
        Geometry::MultiPolygon(polys) => {
                let polygons = polys.iter().map(to_geo_polygon).collect();
            geo::Geometry::MultiPolygon(geo::MultiPolygon::new(polygons))
        }
        Geometry::Collection(parts) => {
            let members = parts.iter().filter_map(to_geo).collect();
            geo::Geometry::GeometryCollection(geo::GeometryCollection(members))
        }
    };
    Some(converted)
}
