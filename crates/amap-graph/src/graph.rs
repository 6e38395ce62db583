//! Road graph arena
//!
//! A directed `petgraph` graph over projected coordinates. Built once
//! by the network loader and immutable thereafter; an undirected road
//! segment is stored as a pair of opposing directed edges.

use crate::error::GraphError;
use amap_core::NodeRef;
use geo::Point;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Coordinate quantum for node deduplication, meters
const DEDUP_QUANTUM_M: f64 = 0.01;

/// A road-graph node (intersection or segment endpoint)
#[derive(Debug, Clone)]
pub struct RoadNode {
    /// Location in the metric CRS
    pub point: Point<f64>,
    /// Identifier carried from the source network, when present
    pub source_id: Option<i64>,
}

/// A directed road segment with precomputed traversal cost
#[derive(Debug, Clone, Copy)]
pub struct RoadEdge {
    /// Segment length, meters
    pub length_m: f64,
    /// Traversal time for the run's travel mode, seconds
    pub travel_secs: f64,
}

/// Immutable weighted road graph
#[derive(Debug)]
pub struct RoadGraph {
    graph: DiGraph<RoadNode, RoadEdge>,
}

impl RoadGraph {
    /// Number of nodes
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of directed edges
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether `node` belongs to this graph
    #[inline]
    #[must_use]
    pub fn contains(&self, node: NodeRef) -> bool {
        node.index() < self.graph.node_count()
    }

    /// Location of a node
    ///
    /// # Errors
    /// Returns [`GraphError::NodeOutOfRange`] for a foreign reference.
    pub fn point(&self, node: NodeRef) -> Result<Point<f64>, GraphError> {
        self.graph
            .node_weight(NodeIndex::new(node.index()))
            .map(|n| n.point)
            .ok_or(GraphError::NodeOutOfRange {
                index: node.index(),
                nodes: self.graph.node_count(),
            })
    }

    /// Iterate all nodes as `(reference, location)`
    pub fn nodes(&self) -> impl Iterator<Item = (NodeRef, Point<f64>)> + '_ {
        self.graph.node_indices().map(|ix| {
            #[allow(clippy::cast_possible_truncation)]
            let node = NodeRef::new(ix.index() as u32);
            (node, self.graph[ix].point)
        })
    }

    /// Outgoing edges of a node as `(target, travel_secs)`
    pub(crate) fn outgoing(&self, node: NodeIndex) -> impl Iterator<Item = (NodeIndex, f64)> + '_ {
        self.graph
            .edges(node)
            .map(|e| (petgraph::visit::EdgeRef::target(&e), e.weight().travel_secs))
    }
}

/// Builder accumulating validated nodes and segments
///
/// Nodes are deduplicated on a centimeter grid so segment endpoints
/// that coincide in the source data share one graph node.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: DiGraph<RoadNode, RoadEdge>,
    dedup: HashMap<(i64, i64), NodeIndex>,
}

impl GraphBuilder {
    /// Empty builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn quantize(point: Point<f64>) -> (i64, i64) {
        #[allow(clippy::cast_possible_truncation)]
        (
            (point.x() / DEDUP_QUANTUM_M).round() as i64,
            (point.y() / DEDUP_QUANTUM_M).round() as i64,
        )
    }

    /// Intern a node at `point`, reusing any existing node on the same
    /// grid cell
    pub fn intern_node(&mut self, point: Point<f64>, source_id: Option<i64>) -> NodeRef {
        let key = Self::quantize(point);
        let ix = *self
            .dedup
            .entry(key)
            .or_insert_with(|| self.graph.add_node(RoadNode { point, source_id }));
        #[allow(clippy::cast_possible_truncation)]
        NodeRef::new(ix.index() as u32)
    }

    /// Add a road segment between two interned nodes
    ///
    /// Inserts one directed edge, or the opposing pair when `oneway` is
    /// false.
    ///
    /// # Errors
    /// Returns [`GraphError::InvalidSegment`] for coincident endpoints,
    /// non-positive length, or negative/non-finite travel time.
    pub fn add_segment(
        &mut self,
        from: NodeRef,
        to: NodeRef,
        length_m: f64,
        travel_secs: f64,
        oneway: bool,
    ) -> Result<(), GraphError> {
        let invalid = |reason: String| GraphError::InvalidSegment {
            from: from.index(),
            to: to.index(),
            reason,
        };
        if from == to {
            return Err(invalid("coincident endpoints".to_string()));
        }
        if !length_m.is_finite() || length_m <= 0.0 {
            return Err(invalid(format!("non-positive length {length_m}")));
        }
        if !travel_secs.is_finite() || travel_secs < 0.0 {
            return Err(invalid(format!("negative travel time {travel_secs}")));
        }
        let a = NodeIndex::new(from.index());
        let b = NodeIndex::new(to.index());
        if self.graph.node_weight(a).is_none() || self.graph.node_weight(b).is_none() {
            return Err(invalid("endpoint not interned".to_string()));
        }
        let edge = RoadEdge {
            length_m,
            travel_secs,
        };
        self.graph.add_edge(a, b, edge);
        if !oneway {
            self.graph.add_edge(b, a, edge);
        }
        Ok(())
    }

    /// Freeze into an immutable [`RoadGraph`]
    #[must_use]
    pub fn build(self) -> RoadGraph {
        tracing::info!(
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "road graph built"
        );
        RoadGraph { graph: self.graph }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_deduplicates_coincident_points() {
        let mut b = GraphBuilder::new();
        let n1 = b.intern_node(Point::new(100.0, 100.0), None);
        let n2 = b.intern_node(Point::new(100.004, 99.996), None);
        assert_eq!(n1, n2);
        let n3 = b.intern_node(Point::new(100.5, 100.0), None);
        assert_ne!(n1, n3);
    }

    #[test]
    fn undirected_segment_inserts_both_directions() {
        let mut b = GraphBuilder::new();
        let a = b.intern_node(Point::new(0.0, 0.0), None);
        let c = b.intern_node(Point::new(50.0, 0.0), None);
        b.add_segment(a, c, 50.0, 40.0, false).unwrap();
        let g = b.build();
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn oneway_segment_inserts_single_direction() {
        let mut b = GraphBuilder::new();
        let a = b.intern_node(Point::new(0.0, 0.0), None);
        let c = b.intern_node(Point::new(50.0, 0.0), None);
        b.add_segment(a, c, 50.0, 40.0, true).unwrap();
        assert_eq!(b.build().edge_count(), 1);
    }

    #[test]
    fn rejects_degenerate_segments() {
        let mut b = GraphBuilder::new();
        let a = b.intern_node(Point::new(0.0, 0.0), None);
        let c = b.intern_node(Point::new(50.0, 0.0), None);
        assert!(b.add_segment(a, a, 10.0, 5.0, false).is_err());
        assert!(b.add_segment(a, c, 0.0, 5.0, false).is_err());
        assert!(b.add_segment(a, c, 10.0, -1.0, false).is_err());
    }
}
