//! Core geometry types for polymend.
//!
//! ## Rust Lesson #3: Structs & Derives
//!
//! The `#[derive(...)]` macro auto-generates common functionality:
//! - `Debug` = lets you print with `{:?}`
//! - `Clone` = can duplicate the value
//! - `Copy` = can copy implicitly (small stack values only)
//! - `PartialEq` = can compare with `==`
//!
//! `PartialEq` on [`Geometry`] is what the repair pass uses to decide
//! whether a cleaned geometry is "structurally different" from the original.

/// A 2D point with x,y coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A closed vertex sequence: the last point repeats the first.
pub type Ring = Vec<Point>;

/// A polygon with an outer boundary and optional holes.
///
/// ## Rust Lesson #4: Ownership & Vec
///
/// This struct OWNS its rings. `&[Point]` would be a BORROWED slice
/// (read-only view), which is what the cleaners take as input: they never
/// touch the original, they build a new `Polygon` from the survivors.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    /// Outer boundary (exterior ring)
    pub outer: Ring,
    /// Interior holes, in original order
    pub holes: Vec<Ring>,
}

/// Tagged union over every shape a feature can carry.
///
/// `Point`, `LineString` and `Collection` are the non-polygonal family:
/// collections may still embed polygonal parts, which the structure cleaner
/// extracts.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Geometry {
    /// Null geometry
    #[default]
    Empty,
    Point(Point),
    LineString(Vec<Point>),
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
    /// Heterogeneous geometry collection
    Collection(Vec<Geometry>),
}

/// The flat type of a geometry, without its coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Empty,
    Point,
    LineString,
    Polygon,
    MultiPolygon,
    Collection,
}

// ============================================================================
// IMPLEMENTATIONS (methods)
// ============================================================================

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

impl Polygon {
    /// Create a simple polygon with no holes.
    pub fn new(outer: Ring) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    /// Create a polygon with holes.
    pub fn with_holes(outer: Ring, holes: Vec<Ring>) -> Self {
        Self { outer, holes }
    }

    /// Build a polygon from an ordered ring list.
    ///
    /// The first ring becomes the exterior, the rest become holes.
    ///
    /// ## Rust Lesson #6: Option<T>
    ///
    /// Rust has no `null`. An empty ring list has no polygon, so we return
    /// `None` and the compiler makes the caller deal with it.
    pub fn from_rings(rings: Vec<Ring>) -> Option<Self> {
        let mut rings = rings.into_iter();
        let outer = rings.next()?;
        Some(Self {
            outer,
            holes: rings.collect(),
        })
    }

    /// All rings, exterior first.
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }

    /// Number of rings including the exterior.
    #[inline]
    pub fn ring_count(&self) -> usize {
        1 + self.holes.len()
    }

    /// Total vertex count over all rings (closing points included).
    pub fn vertex_count(&self) -> usize {
        self.rings().map(Vec::len).sum()
    }
}

impl Geometry {
    /// The flat type of this geometry.
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Empty => GeometryKind::Empty,
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::LineString(_) => GeometryKind::LineString,
            Geometry::Polygon(_) => GeometryKind::Polygon,
            Geometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
            Geometry::Collection(_) => GeometryKind::Collection,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Geometry::Empty)
    }

    /// True when the geometry carries polygonal content anywhere,
    /// including polygons nested inside collections.
    pub fn has_polygonal_content(&self) -> bool {
        match self {
            Geometry::Polygon(_) => true,
            Geometry::MultiPolygon(polys) => !polys.is_empty(),
            Geometry::Collection(parts) => parts.iter().any(Geometry::has_polygonal_content),
            Geometry::Empty | Geometry::Point(_) | Geometry::LineString(_) => false,
        }
    }

    /// Total number of stored vertices.
    pub fn vertex_count(&self) -> usize {
        match self {
            Geometry::Empty => 0,
            Geometry::Point(_) => 1,
            Geometry::LineString(points) => points.len(),
            Geometry::Polygon(poly) => poly.vertex_count(),
            Geometry::MultiPolygon(polys) => polys.iter().map(Polygon::vertex_count).sum(),
            Geometry::Collection(parts) => parts.iter().map(Geometry::vertex_count).sum(),
        }
    }
}

impl From<Polygon> for Geometry {
    fn from(poly: Polygon) -> Self {
        Geometry::Polygon(poly)
    }
}

impl GeometryKind {
    /// GeoJSON-style type name.
    pub fn name(&self) -> &'static str {
        match self {
            GeometryKind::Empty => "Empty",
            GeometryKind::Point => "Point",
            GeometryKind::LineString => "LineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPolygon => "MultiPolygon",
            GeometryKind::Collection => "GeometryCollection",
        }
    }
}

/// Build a ring from coordinate pairs. Handy in tests and examples.
pub fn ring(coords: &[(f64, f64)]) -> Ring {
    coords.iter().copied().map(Point::from).collect()
}

// ============================================================================
// TESTS
// ============================================================================
