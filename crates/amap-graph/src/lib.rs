//! Accessmap Graph - road network traversal
//!
//! The computational core of the pipeline:
//! - [`RoadGraph`]: immutable weighted road graph built once per run
//! - [`NodeLocator`]: R-tree nearest-node lookup for snapping
//! - [`Catchment`]: multi-source shortest-time expansion; one pass per
//!   facility category answers every threshold
//!
//! The graph is read-only after construction, so per-category catchment
//! expansions run in parallel without locking.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod catchment;
pub mod error;
pub mod graph;
pub mod snap;

// Re-exports for convenience
pub use catchment::{compute_catchments, Catchment};
pub use error::GraphError;
pub use graph::{GraphBuilder, RoadEdge, RoadGraph, RoadNode};
pub use snap::NodeLocator;
