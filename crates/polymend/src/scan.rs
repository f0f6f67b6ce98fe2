//! Validity scanning - classify every feature of a layer once.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::Result;
use crate::feature::FeatureId;
use crate::ports::{FeatureStore, GeometryEngine};

/// Outcome of one pass over a layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    /// Number of features examined
    pub total: usize,
    /// Invalid feature ids, in iteration order
    pub invalid_ids: Vec<FeatureId>,
    /// Valid feature ids, in iteration order
    pub valid_ids: Vec<FeatureId>,
    /// Wall-clock time spent scanning
    pub elapsed: Duration,
}

impl ScanResult {
    #[inline]
    pub fn invalid_count(&self) -> usize {
        self.invalid_ids.len()
    }

    #[inline]
    pub fn valid_count(&self) -> usize {
        self.valid_ids.len()
    }

    #[inline]
    pub fn all_valid(&self) -> bool {
        self.invalid_ids.is_empty()
    }
}

/// Run the validity test over every feature of `store`.
///
/// Nothing is written and the selection is left alone; the orchestrator
/// decides what to do with the result.
pub fn scan_layer<S, E>(store: &S, engine: &E) -> Result<ScanResult>
where
    S: FeatureStore + ?Sized,
    E: GeometryEngine + ?Sized,
{
    let start = Instant::now();
    let features = store.features()?;

    let mut invalid_ids = Vec::new();
    let mut valid_ids = Vec::with_capacity(features.len());

    for feature in &features {
        if engine.is_valid(&feature.geometry) {
            valid_ids.push(feature.id);
        } else {
            debug!(id = %feature.id, kind = feature.geometry.kind().name(), "invalid geometry");
            invalid_ids.push(feature.id);
        }
    }

    Ok(ScanResult {
        total: features.len(),
        invalid_ids,
        valid_ids,
        elapsed: start.elapsed(),
    })
}
