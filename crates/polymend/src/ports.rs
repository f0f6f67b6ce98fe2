//! Port traits abstracting every collaborator away from the orchestrator.
//!
//! The orchestrator only ever talks to these four traits, so the same run
//! logic drives a GeoJSON file from the CLI, an in-memory layer in tests,
//! or a host application's own layer type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::feature::{Feature, FeatureId, LayerInfo};
use crate::geometry::Geometry;

/// Storage and selection for one layer of features.
///
/// Writes are only accepted between `begin_edit` and `commit_edit` /
/// `rollback_edit`. Callers normally go through
/// [`EditSession`](crate::session::EditSession), which guarantees the
/// session is closed on every exit path.
pub trait FeatureStore {
    fn layer_info(&self) -> LayerInfo;

    /// Snapshot of every feature, in the store's native order.
    fn features(&self) -> Result<Vec<Feature>>;

    /// Current geometry of one feature, `None` if the id is unknown.
    fn get(&self, id: FeatureId) -> Result<Option<Geometry>>;

    fn select(&mut self, ids: &[FeatureId]);
    fn clear_selection(&mut self);
    fn selection(&self) -> &[FeatureId];

    /// Commit edits left open by someone else before we start auditing.
    fn commit_pending(&mut self) -> Result<()>;

    fn begin_edit(&mut self) -> Result<()>;
    fn write_geometry(&mut self, id: FeatureId, geometry: Geometry) -> Result<()>;
    fn commit_edit(&mut self) -> Result<()>;
    fn rollback_edit(&mut self);
}

/// Validity test and make-valid primitive (GEOS-like).
pub trait GeometryEngine {
    fn is_valid(&self, geometry: &Geometry) -> bool;

    /// Attempt to turn an invalid geometry into a valid one.
    /// `None` means the engine gave up.
    fn repair(&self, geometry: &Geometry) -> Option<Geometry>;
}

/// The operator's answer to "try to repair?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Decision {
    Cancel,
    Repair,
    #[serde(alias = "repair+clean", alias = "repair + delete")]
    RepairClean,
}

impl Decision {
    pub fn name(&self) -> &'static str {
        match self {
            Decision::Cancel => "cancel",
            Decision::Repair => "repair",
            Decision::RepairClean => "repair-clean",
        }
    }

    /// Whether this decision leads to the repair pass.
    pub fn repairs(&self) -> bool {
        !matches!(self, Decision::Cancel)
    }

    /// Whether this decision adds the duplicate-vertex cleaning pass.
    pub fn cleans(&self) -> bool {
        matches!(self, Decision::RepairClean)
    }

    pub fn all() -> &'static [Decision] {
        &[Decision::Cancel, Decision::Repair, Decision::RepairClean]
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cancel" | "c" => Ok(Decision::Cancel),
            "repair" | "r" => Ok(Decision::Repair),
            "repair-clean" | "repair+clean" | "repair + clean" | "repair + delete" | "rc" => {
                Ok(Decision::RepairClean)
            }
            other => Err(format!(
                "unknown decision '{}' (expected cancel, repair or repair-clean)",
                other
            )),
        }
    }
}

/// What the decision provider is told before it answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionRequest {
    pub layer: String,
    pub invalid: usize,
    pub total: usize,
}

/// Whoever decides how to proceed once invalid geometries were found.
pub trait DecisionProvider {
    /// Blocks until an answer is available.
    fn ask(&mut self, request: &DecisionRequest) -> Decision;
}

/// Answers every request with the same decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDecision(pub Decision);

impl DecisionProvider for FixedDecision {
    fn ask(&mut self, _request: &DecisionRequest) -> Decision {
        self.0
    }
}

/// Fire-and-forget user notifications.
pub trait NotificationSink {
    fn info(&mut self, message: &str);
    fn warn(&mut self, message: &str);
}
