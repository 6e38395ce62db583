//! Error types for input loading
//!
//! Whole-source failures only; per-record problems are recovered as
//! warnings by the loaders themselves.

use amap_core::ModelError;
use amap_graph::GraphError;
use std::path::PathBuf;

/// Fatal loader errors, each naming the failing source
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Source unreachable (missing file, IO failure)
    #[error("cannot read source {path}: {source}")]
    DataSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source readable but not parseable as its expected format
    #[error("malformed source {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    /// Declared CRS unsupported, so auto-reprojection cannot succeed
    #[error("CRS mismatch for {path}: {reason}")]
    CrsMismatch { path: PathBuf, reason: String },

    /// Source parsed but yielded no usable features
    #[error("source {path} contains no usable features")]
    EmptySource { path: PathBuf },

    /// Invariant violation constructing a core record
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Graph construction failure not attributable to one segment
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl IngestError {
    /// Shorthand for a malformed-source error
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
