//! # polymend
//!
//! Polygon validity audit, repair orchestration and duplicate-vertex
//! cleaning for feature layers.
//!
//! ## Rust Lesson #7: Modules
//!
//! Rust modules are like ES6 modules but more explicit:
//! - `mod foo;` = load from `foo.rs` or `foo/mod.rs`
//! - `pub mod foo;` = also export it publicly
//! - `pub use foo::Bar;` = re-export Bar at this level
//!
//! The pure layers (`geometry`, `normalize`, `ring`, `structure`) know
//! nothing about stores or engines. `scan` and `repair` only talk to the
//! traits in `ports`; `store`, `layer`, `engine` and `notify` plug
//! concrete implementations into those traits.

pub mod engine;
pub mod error;
pub mod feature;
pub mod geometry;
pub mod layer;
pub mod normalize;
pub mod notify;
pub mod ports;
pub mod repair;
pub mod ring;
pub mod scan;
pub mod session;
pub mod store;
pub mod structure;

// Re-export common types at crate root for convenience.
pub use engine::GeoEngine;
pub use error::{Result, StoreError};
pub use feature::{Feature, FeatureId, GeometryFamily, LayerInfo, LayerKind};
pub use geometry::{Geometry, GeometryKind, Point, Polygon, Ring};
pub use layer::GeoJsonLayer;
pub use normalize::{Normalizer, PointKey, DEFAULT_PRECISION};
pub use notify::{RecordingSink, TracingSink};
pub use ports::{
    Decision, DecisionProvider, DecisionRequest, FeatureStore, FixedDecision, GeometryEngine,
    NotificationSink,
};
pub use repair::{
    all_valid_message, invalid_found_message, Orchestrator, Outcome, RepairState, RunReport,
    NO_POLYGON_LAYER,
};
pub use ring::{clean_ring, remove_duplicate_points, CleanConfig, MIN_RING_POINTS};
pub use scan::{scan_layer, ScanResult};
pub use session::EditSession;
pub use store::MemoryLayer;
pub use structure::{clean_geometry, clean_polygon, collapse};
