//! Repair orchestration - the audit/repair/clean state machine.
//!
//! ```text
//! Idle -> Scanning -+-> AllValid
//!                   |
//!                   +-> AwaitingDecision -+-> Cancelled
//!                                         |
//!                                         +-> Repairing -+-> Repaired
//!                                                        |
//!                                                        +-> RepairingAndCleaning -> Cleaned
//! ```
//!
//! One run performs at most one scan, one decision, one repair pass and
//! one cleaning pass. Each write pass runs inside its own
//! [`EditSession`], so a store error mid-pass rolls that pass back.
//!
//! Target ids are snapshotted before any write: the repair pass works from
//! the scan's invalid list and the cleaning pass from a `features()`
//! snapshot, never from a live cursor over the store being edited.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::feature::FeatureId;
use crate::ports::{
    Decision, DecisionProvider, DecisionRequest, FeatureStore, GeometryEngine, NotificationSink,
};
use crate::ring::CleanConfig;
use crate::scan::{scan_layer, ScanResult};
use crate::session::EditSession;
use crate::structure::clean_geometry;

/// Warning sent when the run target is missing or not a polygon layer.
pub const NO_POLYGON_LAYER: &str =
    "No active polygon layer found, please activate one polygon layer.";

/// Scan summary for a layer without invalid geometries.
pub fn all_valid_message(layer: &str, scan: &ScanResult) -> String {
    format!(
        "OK: All {} polygons in layer '{}' are valid ({}/{} valid, runtime: {:.3} sec.)",
        scan.total,
        layer,
        scan.valid_count(),
        scan.total,
        scan.elapsed.as_secs_f64()
    )
}

/// Scan summary for a layer with invalid geometries.
pub fn invalid_found_message(layer: &str, scan: &ScanResult) -> String {
    format!(
        "NotOK: {} from {} polygons are not valid in layer '{}' (detecttime: {:.3} sec.)",
        scan.invalid_count(),
        scan.total,
        layer,
        scan.elapsed.as_secs_f64()
    )
}

/// States of a single orchestrator run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepairState {
    Idle,
    Scanning,
    AllValid,
    AwaitingDecision,
    Cancelled,
    Repairing,
    Repaired,
    RepairingAndCleaning,
    Cleaned,
}

impl RepairState {
    pub fn name(&self) -> &'static str {
        match self {
            RepairState::Idle => "idle",
            RepairState::Scanning => "scanning",
            RepairState::AllValid => "all-valid",
            RepairState::AwaitingDecision => "awaiting-decision",
            RepairState::Cancelled => "cancelled",
            RepairState::Repairing => "repairing",
            RepairState::Repaired => "repaired",
            RepairState::RepairingAndCleaning => "repairing-and-cleaning",
            RepairState::Cleaned => "cleaned",
        }
    }

    /// Edges of the state graph.
    pub fn can_transition_to(&self, next: RepairState) -> bool {
        use RepairState::*;
        matches!(
            (self, next),
            (Idle, Scanning)
                | (Scanning, AllValid)
                | (Scanning, AwaitingDecision)
                | (AwaitingDecision, Cancelled)
                | (AwaitingDecision, Repairing)
                | (Repairing, Repaired)
                | (Repairing, RepairingAndCleaning)
                | (RepairingAndCleaning, Cleaned)
        )
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome().is_some()
    }

    /// The run outcome a terminal state stands for.
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            RepairState::AllValid => Some(Outcome::AllValid),
            RepairState::Cancelled => Some(Outcome::Cancelled),
            RepairState::Repaired => Some(Outcome::Repaired),
            RepairState::Cleaned => Some(Outcome::Cleaned),
            _ => None,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    /// Precondition failed, nothing was scanned
    Aborted,
    AllValid,
    Cancelled,
    Repaired,
    Cleaned,
}

/// Summary of one orchestrator run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub layer: String,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
    /// Features examined by the scan
    pub total: usize,
    /// Invalid features found by the scan
    pub invalid_before: usize,
    /// Invalid features whose repair was written back
    pub repaired: usize,
    /// Features known to be invalid when the run ended
    pub remaining_invalid: Vec<FeatureId>,
    /// Features rewritten by the cleaning pass
    pub cleaned: usize,
    pub scan_secs: f64,
    pub elapsed_secs: f64,
}

impl RunReport {
    fn new(layer: String, outcome: Outcome) -> Self {
        Self {
            layer,
            outcome,
            decision: None,
            total: 0,
            invalid_before: 0,
            repaired: 0,
            remaining_invalid: Vec::new(),
            cleaned: 0,
            scan_secs: 0.0,
            elapsed_secs: 0.0,
        }
    }

    /// Features considered valid when the run ended.
    pub fn valid_after(&self) -> usize {
        self.total.saturating_sub(self.remaining_invalid.len())
    }

    /// Total writes performed; a feature repaired and then cleaned counts twice.
    pub fn writes(&self) -> usize {
        self.repaired + self.cleaned
    }

    /// One-line human summary, e.g. `layer 'parcels': 5/5 valid`.
    pub fn summary_line(&self) -> String {
        let counts = format!("{}/{} valid", self.valid_after(), self.total);
        match self.outcome {
            Outcome::Aborted => "aborted: no active polygon layer".to_string(),
            Outcome::AllValid => format!("layer '{}': {}", self.layer, counts),
            Outcome::Cancelled => format!("layer '{}': {}, repair cancelled", self.layer, counts),
            Outcome::Repaired => format!(
                "layer '{}': {} after repair ({} of {} repaired)",
                self.layer, counts, self.repaired, self.invalid_before
            ),
            Outcome::Cleaned => format!(
                "layer '{}': {} after repair ({} of {} repaired, {} cleaned)",
                self.layer, counts, self.repaired, self.invalid_before, self.cleaned
            ),
        }
    }
}

/// Drives one audit/repair/clean run against a feature store.
pub struct Orchestrator<'a> {
    engine: &'a dyn GeometryEngine,
    decisions: &'a mut dyn DecisionProvider,
    sink: &'a mut dyn NotificationSink,
    config: CleanConfig,
    state: RepairState,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        engine: &'a dyn GeometryEngine,
        decisions: &'a mut dyn DecisionProvider,
        sink: &'a mut dyn NotificationSink,
    ) -> Self {
        Self {
            engine,
            decisions,
            sink,
            config: CleanConfig::default(),
            state: RepairState::Idle,
        }
    }

    /// Use a non-default cleaning configuration.
    pub fn with_config(mut self, config: CleanConfig) -> Self {
        self.config = config;
        self
    }

    /// State reached by the last run.
    pub fn state(&self) -> RepairState {
        self.state
    }

    /// Run the state machine once against `target`.
    ///
    /// `target` is the active layer, if any. A missing or non-polygonal
    /// target aborts with a warning before anything is scanned. Store
    /// failures are returned as errors; per-feature repair and clean
    /// failures are only reflected in the report.
    pub fn run<S>(&mut self, target: Option<&mut S>) -> Result<RunReport>
    where
        S: FeatureStore + ?Sized,
    {
        let started = Instant::now();
        self.state = RepairState::Idle;

        let store = match target {
            Some(store) if store.layer_info().is_polygonal() => store,
            other => {
                let layer = other.map(|s| s.layer_info().name).unwrap_or_default();
                self.sink.warn(NO_POLYGON_LAYER);
                let mut report = RunReport::new(layer, Outcome::Aborted);
                report.elapsed_secs = started.elapsed().as_secs_f64();
                return Ok(report);
            }
        };

        let layer = store.layer_info().name;
        info!(layer = %layer, "auditing layer");
        store.commit_pending()?;

        self.transition(RepairState::Scanning);
        let scan = scan_layer(&*store, self.engine)?;
        let mut report = RunReport::new(layer.clone(), Outcome::AllValid);
        report.total = scan.total;
        report.invalid_before = scan.invalid_count();
        report.scan_secs = scan.elapsed.as_secs_f64();

        if scan.all_valid() {
            self.transition(RepairState::AllValid);
            self.sink.info(&all_valid_message(&layer, &scan));
            return Ok(self.finish(report, started));
        }

        store.select(&scan.invalid_ids);
        self.sink.warn(&invalid_found_message(&layer, &scan));

        self.transition(RepairState::AwaitingDecision);
        let decision = self.decisions.ask(&DecisionRequest {
            layer: layer.clone(),
            invalid: scan.invalid_count(),
            total: scan.total,
        });
        info!(decision = %decision, "decision received");
        report.decision = Some(decision);

        if !decision.repairs() {
            self.transition(RepairState::Cancelled);
            report.remaining_invalid = scan.invalid_ids.clone();
            self.sink.info(&format!(
                "Repair cancelled; {} invalid polygons remain selected.",
                scan.invalid_count()
            ));
            return Ok(self.finish(report, started));
        }

        self.transition(RepairState::Repairing);
        let mut still_invalid = self.repair_pass(store, &scan)?;
        store.clear_selection();
        report.repaired = scan.invalid_count() - still_invalid.len();
        self.sink.info(&format!(
            "Repair attempt completed: {} of {} invalid polygons repaired, {} still invalid. \
             Please start a new test...",
            report.repaired,
            scan.invalid_count(),
            still_invalid.len()
        ));

        if !decision.cleans() {
            self.transition(RepairState::Repaired);
            report.remaining_invalid = still_invalid;
            return Ok(self.finish(report, started));
        }

        self.transition(RepairState::RepairingAndCleaning);
        report.cleaned = self.clean_pass(store, &mut still_invalid)?;
        report.remaining_invalid = still_invalid;
        self.sink.info(&format!(
            "Duplicate vertices removed from {} polygons in layer '{}'.",
            report.cleaned, layer
        ));
        self.transition(RepairState::Cleaned);
        Ok(self.finish(report, started))
    }

    /// Repair every invalid feature; returns the ids that stayed invalid.
    fn repair_pass<S>(&self, store: &mut S, scan: &ScanResult) -> Result<Vec<FeatureId>>
    where
        S: FeatureStore + ?Sized,
    {
        info!(count = scan.invalid_count(), "repairing invalid geometries");
        let mut session = EditSession::begin(store)?;
        let mut still_invalid = Vec::new();

        for &id in &scan.invalid_ids {
            let Some(geometry) = session.get(id)? else {
                debug!(id = %id, "feature disappeared before repair");
                still_invalid.push(id);
                continue;
            };

            match self.engine.repair(&geometry) {
                Some(fixed) if self.engine.is_valid(&fixed) => {
                    debug!(id = %id, kind = fixed.kind().name(), "repaired");
                    session.write(id, fixed)?;
                }
                Some(_) => {
                    debug!(id = %id, "repair result is still invalid, skipping");
                    still_invalid.push(id);
                }
                None => {
                    debug!(id = %id, "engine could not repair, skipping");
                    still_invalid.push(id);
                }
            }
        }

        session.commit()?;
        Ok(still_invalid)
    }

    /// Clean every feature of the layer; returns the number of rewrites.
    ///
    /// A feature the repair pass could not fix is dropped from
    /// `still_invalid` when its cleaned form is valid and gets written.
    fn clean_pass<S>(&self, store: &mut S, still_invalid: &mut Vec<FeatureId>) -> Result<usize>
    where
        S: FeatureStore + ?Sized,
    {
        info!("removing duplicate vertices");
        let mut session = EditSession::begin(store)?;
        let features = session.features()?;

        for feature in features {
            if feature.geometry.is_empty() {
                continue;
            }
            let Some(cleaned) = clean_geometry(&feature.geometry, &self.config) else {
                debug!(
                    id = %feature.id,
                    "no polygonal content survives cleaning, keeping original"
                );
                continue;
            };
            if cleaned == feature.geometry {
                continue;
            }
            if !self.engine.is_valid(&cleaned) {
                debug!(id = %feature.id, "cleaned geometry is invalid, keeping original");
                continue;
            }

            debug!(
                id = %feature.id,
                before = feature.geometry.vertex_count(),
                after = cleaned.vertex_count(),
                "cleaned"
            );
            session.write(feature.id, cleaned)?;
            still_invalid.retain(|&id| id != feature.id);
        }

        session.commit()
    }

    fn transition(&mut self, next: RepairState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {:?} -> {:?}",
            self.state,
            next
        );
        debug!(from = self.state.name(), to = next.name(), "state transition");
        self.state = next;
    }

    fn finish(&self, mut report: RunReport, started: Instant) -> RunReport {
        if let Some(outcome) = self.state.outcome() {
            report.outcome = outcome;
        }
        report.elapsed_secs = started.elapsed().as_secs_f64();
        info!(summary = %report.summary_line(), "run finished");
        report
    }
}

// ============================================================================
// TESTS
// ============================================================================
