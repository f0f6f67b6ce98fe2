//! Structure cleaning - apply ring cleaning to whole geometries.
//!
//! The cleaners never mutate their input. They return `None` when no
//! polygonal content survives and otherwise a freshly built geometry whose
//! shape follows the number of surviving polygons:
//!
//! | survivors | output                 |
//! |-----------|------------------------|
//! | 0         | `None`                 |
//! | 1         | `Geometry::Polygon`    |
//! | 2+        | `Geometry::MultiPolygon` |
//!
//! Collections are reduced to their polygonal parts first. Points and
//! lines inside a collection do not survive cleaning.

use crate::geometry::{Geometry, Polygon};
use crate::ring::{clean_rings, CleanConfig};

/// Clean every ring of a polygon.
///
/// If the exterior is dropped, the first surviving hole becomes the new
/// exterior. That changes the polygon's meaning, but it is what the ring
/// list says, so we keep it and let the validity test judge the result.
pub fn clean_polygon(polygon: &Polygon, config: &CleanConfig) -> Option<Polygon> {
    Polygon::from_rings(clean_rings(polygon.rings(), config))
}

/// Clean a polygon set, keeping survivors in iteration order.
pub fn clean_polygons<'a, I>(polygons: I, config: &CleanConfig) -> Vec<Polygon>
where
    I: IntoIterator<Item = &'a Polygon>,
{
    polygons
        .into_iter()
        .filter_map(|poly| clean_polygon(poly, config))
        .collect()
}

/// Clean any geometry.
///
/// ## Rust Lesson #12: Exhaustive matching
///
/// Adding a new `Geometry` variant makes this `match` fail to compile until
/// the new shape is handled - there is no silent "default" branch.
pub fn clean_geometry(geometry: &Geometry, config: &CleanConfig) -> Option<Geometry> {
    match geometry {
        Geometry::Empty | Geometry::Point(_) | Geometry::LineString(_) => None,
        Geometry::Polygon(poly) => clean_polygon(poly, config).map(Geometry::Polygon),
        Geometry::MultiPolygon(polys) => collapse(clean_polygons(polys, config)),
        Geometry::Collection(_) => {
            let mut parts = Vec::new();
            collect_polygonal_parts(geometry, &mut parts);
            collapse(clean_polygons(parts, config))
        }
    }
}

/// Pick the output shape for a list of surviving polygons.
pub fn collapse(mut polygons: Vec<Polygon>) -> Option<Geometry> {
    match polygons.len() {
        0 => None,
        1 => polygons.pop().map(Geometry::Polygon),
        _ => Some(Geometry::MultiPolygon(polygons)),
    }
}

/// Gather polygons from a geometry, descending into nested collections.
pub fn collect_polygonal_parts<'a>(geometry: &'a Geometry, out: &mut Vec<&'a Polygon>) {
    match geometry {
        Geometry::Polygon(poly) => out.push(poly),
        Geometry::MultiPolygon(polys) => out.extend(polys.iter()),
        Geometry::Collection(parts) => {
            for part in parts {
                collect_polygonal_parts(part, out);
            }
        }
        Geometry::Empty | Geometry::Point(_) | Geometry::LineString(_) => {}
    }
}

// ============================================================================
// TESTS
// ============================================================================
