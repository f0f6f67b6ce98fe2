//! Error types for feature stores.
//!
//! Per-feature repair and clean failures are not errors: they are absorbed
//! by the orchestrator and show up as counts in the run report. What is
//! left here are the failures of the store itself.

use thiserror::Error;

use crate::feature::FeatureId;

/// Errors raised by a [`FeatureStore`](crate::ports::FeatureStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write targeted an id the layer does not contain
    #[error("feature {0} not found")]
    UnknownFeature(FeatureId),

    #[error("an edit session is already open on layer '{0}'")]
    EditInProgress(String),

    #[error("no edit session is open on layer '{0}'")]
    NoEditSession(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Well-formed JSON that is not a usable GeoJSON layer
    #[error("invalid GeoJSON: {0}")]
    Format(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
