//! Property-based tests for vertex cleaning and scanning.
//!
//! These tests verify that:
//! - Cleaning a ring twice gives the same result as cleaning it once
//! - A surviving ring is closed, duplicate-free and long enough
//! - Structure cleaning never yields a one-member multipolygon
//! - The scanner partitions every layer into valid and invalid ids

use std::collections::HashSet;

use polymend::{
    clean_geometry, clean_ring, normalize::point_key, scan_layer, CleanConfig, Geometry,
    GeometryEngine, MemoryLayer, Point, Polygon, Ring,
};
use proptest::prelude::*;

/// Strategy to generate a closed ring on a small integer grid.
///
/// The grid is tiny on purpose so repeated vertices are common.
fn arb_ring() -> impl Strategy<Value = Ring> {
    prop::collection::vec((-3i8..=3, -3i8..=3), 1..12).prop_map(|coords| {
        let mut ring: Ring = coords
            .into_iter()
            .map(|(x, y)| Point::new(f64::from(x), f64::from(y)))
            .collect();
        ring.push(ring[0]);
        ring
    })
}

fn arb_polygon() -> impl Strategy<Value = Polygon> {
    (arb_ring(), prop::collection::vec(arb_ring(), 0..3))
        .prop_map(|(outer, holes)| Polygon::with_holes(outer, holes))
}

fn arb_geometry() -> impl Strategy<Value = Geometry> {
    prop_oneof![
        Just(Geometry::Empty),
        arb_polygon().prop_map(Geometry::Polygon),
        prop::collection::vec(arb_polygon(), 0..4).prop_map(Geometry::MultiPolygon),
        (arb_polygon(), -3i8..=3).prop_map(|(poly, x)| Geometry::Collection(vec![
            Geometry::Point(Point::new(f64::from(x), 0.0)),
            Geometry::Polygon(poly),
        ])),
    ]
}

/// Valid iff the geometry has an even number of vertices.
struct ParityEngine;

impl GeometryEngine for ParityEngine {
    fn is_valid(&self, geometry: &Geometry) -> bool {
        geometry.vertex_count() % 2 == 0
    }

    fn repair(&self, _geometry: &Geometry) -> Option<Geometry> {
        None
    }
}

proptest! {
    /// Cleaning is idempotent.
    #[test]
    fn clean_ring_is_idempotent(ring in arb_ring()) {
        let config = CleanConfig::default();
        if let Some(once) = clean_ring(&ring, &config) {
            let twice = clean_ring(&once, &config);
            prop_assert_eq!(twice, Some(once));
        }
    }

    /// A survivor is closed, has no repeated body vertex and meets the minimum.
    #[test]
    fn surviving_ring_is_well_formed(ring in arb_ring(), min in 3usize..6) {
        let config = CleanConfig { min_ring_points: min, ..CleanConfig::default() };
        let distinct: HashSet<_> = ring[..ring.len() - 1].iter().map(|&p| point_key(p)).collect();

        match clean_ring(&ring, &config) {
            Some(cleaned) => {
                prop_assert!(cleaned.len() >= min);
                prop_assert_eq!(cleaned.first(), cleaned.last());
                let body = &cleaned[..cleaned.len() - 1];
                let keys: HashSet<_> = body.iter().map(|&p| point_key(p)).collect();
                prop_assert_eq!(keys.len(), body.len());
                prop_assert_eq!(keys, distinct);
            }
            None => prop_assert!(distinct.len() + 1 < min),
        }
    }

    /// The output shape always follows the survivor count.
    #[test]
    fn structure_collapse_rule_holds(geometry in arb_geometry()) {
        match clean_geometry(&geometry, &CleanConfig::default()) {
            Some(Geometry::MultiPolygon(polys)) => prop_assert!(polys.len() >= 2),
            Some(Geometry::Polygon(_)) | None => {}
            Some(other) => prop_assert!(false, "unexpected cleaned shape {:?}", other.kind()),
        }
    }

    /// Every feature lands in exactly one of the two id lists.
    #[test]
    fn scan_partitions_the_layer(geometries in prop::collection::vec(arb_geometry(), 0..20)) {
        let layer = MemoryLayer::from_geometries("prop", geometries);
        let result = scan_layer(&layer, &ParityEngine).unwrap();

        prop_assert_eq!(result.total, layer.len());
        prop_assert_eq!(result.invalid_count() + result.valid_count(), result.total);

        let mut seen = HashSet::new();
        for id in result.invalid_ids.iter().chain(&result.valid_ids) {
            prop_assert!(seen.insert(*id), "id {} reported twice", id);
        }
    }
}
