//! Ring cleaning - drop repeated vertices and re-close the ring.
//!
//! A ring is walked once (closing point excluded), keeping the first
//! occurrence of every vertex key. Repeats are dropped wherever they
//! occur, not only when adjacent, so a ring that deliberately revisits a
//! vertex (a self-touching ring) loses the revisit as well.
//!
//! Rings that end up with fewer than [`MIN_RING_POINTS`] points can no
//! longer enclose area and are rejected by omission: `clean_ring` returns
//! `None` and `clean_rings` simply leaves them out.

use std::collections::HashSet;

use crate::geometry::{Point, Ring};
use crate::normalize::{Normalizer, DEFAULT_PRECISION};

/// Smallest valid closed ring: three distinct vertices plus the closing repeat.
pub const MIN_RING_POINTS: usize = 4;

/// Configuration for vertex cleaning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleanConfig {
    /// Decimal digits used to decide vertex equality
    pub precision: u32,
    /// Minimum point count (closing point included) for a ring to survive
    pub min_ring_points: usize,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            min_ring_points: MIN_RING_POINTS,
        }
    }
}

impl CleanConfig {
    pub fn with_precision(precision: u32) -> Self {
        Self {
            precision,
            ..Self::default()
        }
    }

    #[inline]
    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.precision)
    }
}

/// Remove every repeated vertex from a closed ring and close it again.
///
/// The last point is treated as the closing repeat and skipped. The result
/// is not length-checked; see [`clean_ring`] for that.
pub fn remove_duplicate_points(ring: &[Point], normalizer: &Normalizer) -> Ring {
    let Some((_closing, body)) = ring.split_last() else {
        return Vec::new();
    };

    let mut seen = HashSet::with_capacity(body.len());
    let mut cleaned: Ring = body
        .iter()
        .copied()
        .filter(|&p| seen.insert(normalizer.key(p)))
        .collect();

    if let (Some(&first), Some(&last)) = (cleaned.first(), cleaned.last()) {
        if !normalizer.same(first, last) {
            cleaned.push(first);
        }
    }

    cleaned
}

/// Clean a single ring, rejecting it if it became too degenerate.
pub fn clean_ring(ring: &[Point], config: &CleanConfig) -> Option<Ring> {
    let cleaned = remove_duplicate_points(ring, &config.normalizer());
    (cleaned.len() >= config.min_ring_points).then_some(cleaned)
}

/// Clean a ring set, keeping the survivors in their original order.
pub fn clean_rings<'a, I>(rings: I, config: &CleanConfig) -> Vec<Ring>
where
    I: IntoIterator<Item = &'a Ring>,
{
    rings
        .into_iter()
        .filter_map(|ring| clean_ring(ring, config))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ring;
    use pretty_assertions::assert_eq;

    fn clean(coords: &[(f64, f64)]) -> Option<Ring> {
        clean_ring(&ring(coords), &CleanConfig::default())
    }

    #[test]
    fn duplicate_second_vertex_is_removed() {
        let cleaned = clean(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (0.0, 1.0),
            (0.0, 0.0),
        ]);
        assert_eq!(
            cleaned,
            Some(ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]))
        );
    }

    #[test]
    fn two_distinct_points_are_rejected() {
        assert_eq!(clean(&[(0.0, 0.0), (1.0, 0.0), (0.0, 0.0)]), None);
    }

    #[test]
    fn triangle_survives() {
        let tri = ring(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (0.0, 0.0)]);
        assert_eq!(clean_ring(&tri, &CleanConfig::default()), Some(tri));
    }

    #[test]
    fn huge_coordinates_are_not_merged() {
        let big = ring(&[
            (0.0, 0.0),
            (1e301, 0.0),
            (2e301, 0.0),
            (2e301, 1e301),
            (0.0, 1e301),
            (0.0, 0.0),
        ]);
        assert_eq!(clean_ring(&big, &CleanConfig::default()), Some(big));
    }

    #[test]
    fn clean_ring_is_returned_unchanged() {
        let square = ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]);
        assert_eq!(clean_ring(&square, &CleanConfig::default()), Some(square));
    }

    #[test]
    fn scattered_duplicates_collapse_to_first_occurrence() {
        // (1,0) is revisited after (1,1): global dedup drops the revisit too
        let cleaned = clean(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (1.0, 0.0),
            (2.0, 2.0),
            (0.0, 1.0),
            (0.0, 0.0),
        ]);
        assert_eq!(
            cleaned,
            Some(ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (2.0, 2.0), (0.0, 1.0), (0.0, 0.0)]))
        );
    }

    #[test]
    fn near_duplicates_within_precision_are_merged() {
        let cleaned = clean(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (1.000000001, 0.0),
            (1.0, 1.0),
            (0.0, 0.0),
        ]);
        assert_eq!(cleaned, Some(ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)])));
    }

    #[test]
    fn cleaning_is_idempotent() {
        let once = clean(&[
            (0.0, 0.0),
            (0.0, 0.0),
            (3.0, 0.0),
            (3.0, 3.0),
            (3.0, 0.0),
            (0.0, 3.0),
            (0.0, 0.0),
        ])
        .unwrap();
        let twice = clean_ring(&once, &CleanConfig::default()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn degenerate_inputs_never_panic() {
        assert_eq!(clean(&[]), None);
        assert_eq!(clean(&[(1.0, 1.0)]), None);
        assert_eq!(clean(&[(1.0, 1.0), (1.0, 1.0)]), None);
        assert!(remove_duplicate_points(&[], &Normalizer::default()).is_empty());
    }

    #[test]
    fn single_vertex_body_is_not_reclosed() {
        let cleaned = remove_duplicate_points(
            &ring(&[(5.0, 5.0), (5.0, 5.0), (5.0, 5.0)]),
            &Normalizer::default(),
        );
        assert_eq!(cleaned, ring(&[(5.0, 5.0)]));
    }

    #[test]
    fn unclosed_ring_loses_last_point_and_gets_closed() {
        // The last point is always treated as the closing repeat
        let cleaned = clean(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (9.0, 9.0)]);
        assert_eq!(
            cleaned,
            Some(ring(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (0.0, 0.0)]))
        );
    }

    #[test]
    fn clean_rings_keeps_order_and_drops_degenerates() {
        let outer = ring(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]);
        let sliver = ring(&[(1.0, 1.0), (2.0, 2.0), (1.0, 1.0)]);
        let hole = ring(&[(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 4.0)]);
        let rings = vec![outer.clone(), sliver, hole.clone()];

        assert_eq!(clean_rings(&rings, &CleanConfig::default()), vec![outer, hole]);
    }

    #[test]
    fn custom_minimum_is_honoured() {
        let config = CleanConfig { min_ring_points: 5, ..CleanConfig::default() };
        let tri = ring(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (0.0, 0.0)]);
        assert_eq!(clean_ring(&tri, &config), None);
    }
}
