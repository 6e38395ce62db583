//! Error types for aggregation and output writing

use amap_core::ModelError;
use amap_graph::GraphError;
use std::path::PathBuf;

/// Errors raised producing the run's outputs
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Output file unwritable
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV serialization failure
    #[error("csv error writing {path}: {reason}")]
    Csv { path: PathBuf, reason: String },

    /// JSON serialization failure
    #[error("json serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Record invariant violated during aggregation
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Catchment/graph disagreement (foreign node reference)
    #[error(transparent)]
    Graph(#[from] GraphError),
}
