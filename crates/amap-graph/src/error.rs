//! Error types for graph construction and traversal

/// Errors raised by the graph crate
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Segment rejected at construction (degenerate or invalid weights)
    #[error("invalid segment {from} -> {to}: {reason}")]
    InvalidSegment {
        from: usize,
        to: usize,
        reason: String,
    },

    /// Node reference does not belong to this graph
    #[error("node {index} out of range (graph has {nodes} nodes)")]
    NodeOutOfRange { index: usize, nodes: usize },

    /// Expansion requested over a graph with no nodes
    #[error("road graph is empty")]
    EmptyGraph,
}
