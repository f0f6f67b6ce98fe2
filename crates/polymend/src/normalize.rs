//! Point normalization - hashable keys for vertex equality.
//!
//! Two vertices are "the same" for deduplication when both coordinates
//! agree after rounding to a fixed number of decimal digits. Instead of
//! comparing floats directly we turn each point into a [`PointKey`] that
//! can go straight into a `HashSet`.
//!
//! Magnitudes too large to scale (around 1e300 at the default precision)
//! have no fractional digits left, so they are keyed unrounded.
//!
//! ## Rust Lesson #11: Hash and Eq
//!
//! `f64` does not implement `Eq` or `Hash` (NaN != NaN), so a
//! `HashSet<Point>` won't compile. The usual trick is to map the float
//! onto an integer-like representation first - here the bit pattern of
//! the rounded, scaled value.

use crate::geometry::Point;

/// Decimal digits used for vertex equality unless configured otherwise.
pub const DEFAULT_PRECISION: u32 = 8;

/// Canonical, hashable identity of a point at a given precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointKey {
    x: u64,
    y: u64,
}

/// Rounds coordinates to a fixed number of decimal digits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalizer {
    precision: u32,
    scale: f64,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_PRECISION)
    }
}

impl Normalizer {
    pub fn new(precision: u32) -> Self {
        Self {
            precision,
            scale: 10f64.powi(precision as i32),
        }
    }

    #[inline]
    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Round a single coordinate to the configured precision.
    ///
    /// Values whose scaled form overflows come back unchanged.
    #[inline]
    pub fn round(&self, value: f64) -> f64 {
        let scaled = (value * self.scale).round();
        if scaled.is_infinite() && value.is_finite() {
            return value;
        }
        scaled / self.scale
    }

    /// Key for a point. Equal keys <=> equal after rounding.
    #[inline]
    pub fn key(&self, point: Point) -> PointKey {
        PointKey {
            x: self.canonical_bits(point.x),
            y: self.canonical_bits(point.y),
        }
    }

    /// True when both points collapse onto the same key.
    #[inline]
    pub fn same(&self, a: Point, b: Point) -> bool {
        self.key(a) == self.key(b)
    }

    fn canonical_bits(&self, value: f64) -> u64 {
        let rounded = self.round(value);
        if rounded.is_nan() {
            return f64::NAN.to_bits();
        }
        // -0.0 + 0.0 == +0.0, so both zeros share one bit pattern
        (rounded + 0.0).to_bits()
    }
}

/// Key a point at the default precision.
#[inline]
pub fn point_key(point: Point) -> PointKey {
    Normalizer::default().key(point)
}

// ============================================================================
// TESTS
// ============================================================================
