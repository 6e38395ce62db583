//! Nearest-node spatial index
//!
//! R-tree over graph node coordinates, used to snap facilities and
//! population sample points to the road network. Built once per graph;
//! queries are read-only and safe to issue from parallel workers.

use crate::graph::RoadGraph;
use amap_core::NodeRef;
use geo::Point;
use rstar::primitives::GeomWithData;
use rstar::RTree;

/// Nearest-node lookup over a frozen [`RoadGraph`]
#[derive(Debug)]
pub struct NodeLocator {
    tree: RTree<GeomWithData<[f64; 2], u32>>,
}

impl NodeLocator {
    /// Index every node of `graph`
    #[must_use]
    pub fn build(graph: &RoadGraph) -> Self {
        let entries: Vec<_> = graph
            .nodes()
            .map(|(node, point)| {
                #[allow(clippy::cast_possible_truncation)]
                GeomWithData::new([point.x(), point.y()], node.index() as u32)
            })
            .collect();
        tracing::debug!(nodes = entries.len(), "node locator built");
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Nearest graph node to `point` and its distance in meters
    ///
    /// `None` only for an empty graph.
    #[must_use]
    pub fn nearest(&self, point: Point<f64>) -> Option<(NodeRef, f64)> {
        let query = [point.x(), point.y()];
        self.tree.nearest_neighbor(&query).map(|entry| {
            let [x, y] = *entry.geom();
            let dist = (x - point.x()).hypot(y - point.y());
            (NodeRef::new(entry.data), dist)
        })
    }

    /// Nearest node within `max_distance_m`, or the rejected distance
    ///
    /// `Err` carries how far the nearest node actually was, for the
    /// unsnapped-facility report.
    pub fn snap(&self, point: Point<f64>, max_distance_m: f64) -> Result<(NodeRef, f64), f64> {
        match self.nearest(point) {
            Some((node, dist)) if dist <= max_distance_m => Ok((node, dist)),
            Some((_, dist)) => Err(dist),
            None => Err(f64::INFINITY),
        }
    }
}
