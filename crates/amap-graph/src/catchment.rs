//! Catchment engine
//!
//! Multi-source shortest-travel-time expansion. Every facility of a
//! category is seeded at time zero into one Dijkstra pass (edge weights
//! are non-negative travel seconds), and the per-node minimum arrival
//! time is recorded once. All thresholds are then answered from that
//! single pass; unreachable nodes simply never receive an arrival time
//! and fall outside every threshold, which is expected, not an error.
//!
//! Equidistant ties between facilities are immaterial: coverage is
//! category-level, not facility attribution.

use crate::error::GraphError;
use crate::graph::RoadGraph;
use amap_core::{FacilityCategory, NodeRef};
use ordered_float::OrderedFloat;
use petgraph::graph::NodeIndex;
use rayon::prelude::*;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Arrival times from one category's facility set
#[derive(Debug, Clone)]
pub struct Catchment {
    /// Category whose facilities seeded the expansion
    pub category: FacilityCategory,
    /// Minimum arrival seconds per node; infinity marks unreachable
    arrival: Vec<f64>,
}

impl Catchment {
    /// Run the expansion for `category` seeded at `sources`
    ///
    /// `cutoff_secs` bounds the expansion (normally the largest
    /// configured threshold); nodes beyond it stay unreached. An empty
    /// source set yields an empty catchment.
    ///
    /// # Errors
    /// Returns [`GraphError::EmptyGraph`] for a node-less graph and
    /// [`GraphError::NodeOutOfRange`] when a source reference does not
    /// belong to `graph`.
    pub fn compute(
        graph: &RoadGraph,
        category: FacilityCategory,
        sources: &[NodeRef],
        cutoff_secs: f64,
    ) -> Result<Self, GraphError> {
        if graph.node_count() == 0 {
            return Err(GraphError::EmptyGraph);
        }
        for &source in sources {
            if !graph.contains(source) {
                return Err(GraphError::NodeOutOfRange {
                    index: source.index(),
                    nodes: graph.node_count(),
                });
            }
        }

        let mut arrival = vec![f64::INFINITY; graph.node_count()];
        let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, usize)>> = BinaryHeap::new();
        for &source in sources {
            if arrival[source.index()] > 0.0 {
                arrival[source.index()] = 0.0;
                heap.push(Reverse((OrderedFloat(0.0), source.index())));
            }
        }

        while let Some(Reverse((OrderedFloat(time), index))) = heap.pop() {
            if time > arrival[index] {
                continue; // stale heap entry
            }
            for (target, travel_secs) in graph.outgoing(NodeIndex::new(index)) {
                let next = time + travel_secs;
                if next <= cutoff_secs && next < arrival[target.index()] {
                    arrival[target.index()] = next;
                    heap.push(Reverse((OrderedFloat(next), target.index())));
                }
            }
        }

        let reached = arrival.iter().filter(|t| t.is_finite()).count();
        tracing::info!(
            category = %category,
            sources = sources.len(),
            reached,
            nodes = arrival.len(),
            "catchment expansion complete"
        );
        Ok(Self { category, arrival })
    }

    /// Minimum arrival time at `node`, when reachable
    #[must_use]
    pub fn arrival_secs(&self, node: NodeRef) -> Option<f64> {
        self.arrival
            .get(node.index())
            .copied()
            .filter(|t| t.is_finite())
    }

    /// Whether `node` is within `threshold_secs` of a source facility
    #[must_use]
    pub fn is_covered(&self, node: NodeRef, threshold_secs: f64) -> bool {
        self.arrival
            .get(node.index())
            .is_some_and(|&t| t <= threshold_secs)
    }

    /// All nodes covered at `threshold_secs`
    #[must_use]
    pub fn covered_nodes(&self, threshold_secs: f64) -> Vec<NodeRef> {
        self.arrival
            .iter()
            .enumerate()
            .filter(|(_, &t)| t <= threshold_secs)
            .map(|(i, _)| {
                #[allow(clippy::cast_possible_truncation)]
                NodeRef::new(i as u32)
            })
            .collect()
    }

    /// Number of nodes reached at any time
    #[must_use]
    pub fn reached_count(&self) -> usize {
        self.arrival.iter().filter(|t| t.is_finite()).count()
    }
}

/// Compute every category's catchment in parallel
///
/// Expansions are independent traversals over the shared immutable
/// graph, so they map cleanly onto a rayon worker pool.
///
/// # Errors
/// Propagates the first [`GraphError`] from any expansion.
pub fn compute_catchments(
    graph: &RoadGraph,
    sources_by_category: &[(FacilityCategory, Vec<NodeRef>)],
    cutoff_secs: f64,
) -> Result<Vec<Catchment>, GraphError> {
    sources_by_category
        .par_iter()
        .map(|(category, sources)| {
            Catchment::compute(graph, category.clone(), sources, cutoff_secs)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use geo::Point;

    /// Line of `n` nodes with uniform one-minute edges
    fn line_graph(n: usize) -> (RoadGraph, Vec<NodeRef>) {
        let mut b = GraphBuilder::new();
        let nodes: Vec<NodeRef> = (0..n)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                b.intern_node(Point::new(i as f64 * 100.0, 0.0), None)
            })
            .collect();
        for w in nodes.windows(2) {
            b.add_segment(w[0], w[1], 100.0, 60.0, false).unwrap();
        }
        (b.build(), nodes)
    }

    fn clinic() -> FacilityCategory {
        FacilityCategory::new("clinic").unwrap()
    }

    #[test]
    fn single_source_five_minute_line() {
        // Facility at node 0, threshold 5 min on a
        // 10-node line -> nodes 0..=5 covered.
        let (g, nodes) = line_graph(10);
        let c = Catchment::compute(&g, clinic(), &[nodes[0]], 3600.0).unwrap();
        let covered = c.covered_nodes(300.0);
        assert_eq!(covered, nodes[0..=5].to_vec());
        assert!(!c.is_covered(nodes[6], 300.0));
    }

    #[test]
    fn multi_source_union_of_neighborhoods() {
        // Facilities at both ends, threshold 2 min -> union of the two
        // 2-minute neighborhoods.
        let (g, nodes) = line_graph(10);
        let c = Catchment::compute(&g, clinic(), &[nodes[0], nodes[9]], 3600.0).unwrap();
        let covered = c.covered_nodes(120.0);
        let expected: Vec<NodeRef> = vec![
            nodes[0], nodes[1], nodes[2], nodes[7], nodes[8], nodes[9],
        ];
        assert_eq!(covered, expected);
    }

    #[test]
    fn unreachable_nodes_excluded_at_every_threshold() {
        // Two disconnected components; the far one never gets a time.
        let mut b = GraphBuilder::new();
        let a = b.intern_node(Point::new(0.0, 0.0), None);
        let c = b.intern_node(Point::new(100.0, 0.0), None);
        let island = b.intern_node(Point::new(10_000.0, 0.0), None);
        b.add_segment(a, c, 100.0, 60.0, false).unwrap();
        let g = b.build();

        let catchment = Catchment::compute(&g, clinic(), &[a], f64::INFINITY).unwrap();
        assert!(catchment.arrival_secs(island).is_none());
        assert!(!catchment.is_covered(island, f64::MAX));
        assert_eq!(catchment.reached_count(), 2);
    }

    #[test]
    fn cutoff_bounds_expansion() {
        let (g, nodes) = line_graph(10);
        let c = Catchment::compute(&g, clinic(), &[nodes[0]], 180.0).unwrap();
        assert_eq!(c.reached_count(), 4); // nodes 0..=3 within 3 min
    }

    #[test]
    fn empty_source_set_covers_nothing() {
        let (g, _) = line_graph(4);
        let c = Catchment::compute(&g, clinic(), &[], 3600.0).unwrap();
        assert_eq!(c.reached_count(), 0);
        assert!(c.covered_nodes(f64::MAX).is_empty());
    }

    #[test]
    fn foreign_source_rejected() {
        let (g, _) = line_graph(4);
        let foreign = NodeRef::new(99);
        assert!(Catchment::compute(&g, clinic(), &[foreign], 60.0).is_err());
    }

    #[test]
    fn oneway_edges_respected() {
        let mut b = GraphBuilder::new();
        let a = b.intern_node(Point::new(0.0, 0.0), None);
        let c = b.intern_node(Point::new(100.0, 0.0), None);
        b.add_segment(a, c, 100.0, 60.0, true).unwrap();
        let g = b.build();

        let from_a = Catchment::compute(&g, clinic(), &[a], 3600.0).unwrap();
        assert!(from_a.is_covered(c, 60.0));
        let from_c = Catchment::compute(&g, clinic(), &[c], 3600.0).unwrap();
        assert!(from_c.arrival_secs(a).is_none());
    }
}
