//! Testing utilities for the accessmap workspace
//!
//! Shared fixtures: toy road networks, population cell grids, and
//! square spatial units, all in a flat synthetic metric plane.

#![allow(missing_docs)]

use amap_core::{FacilityCategory, PopulationCell, SpatialUnit, UnitId};
use amap_graph::{GraphBuilder, NodeLocator, RoadGraph};
use amap_core::NodeRef;
use geo::{polygon, MultiPolygon, Point, Polygon};

/// Line of `n` nodes spaced 100 m apart with uniform `edge_secs` edges
pub fn line_graph(n: usize, edge_secs: f64) -> (RoadGraph, Vec<NodeRef>) {
    let mut b = GraphBuilder::new();
    let nodes: Vec<NodeRef> = (0..n)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            b.intern_node(Point::new(i as f64 * 100.0, 0.0), None)
        })
        .collect();
    for w in nodes.windows(2) {
        b.add_segment(w[0], w[1], 100.0, edge_secs, false)
            .expect("fixture segment");
    }
    (b.build(), nodes)
}

/// `w` x `h` lattice with `spacing_m` edges traversed in `edge_secs`
pub fn grid_graph(w: usize, h: usize, spacing_m: f64, edge_secs: f64) -> (RoadGraph, Vec<NodeRef>) {
    let mut b = GraphBuilder::new();
    let mut nodes = Vec::with_capacity(w * h);
    for y in 0..h {
        for x in 0..w {
            #[allow(clippy::cast_precision_loss)]
            let p = Point::new(x as f64 * spacing_m, y as f64 * spacing_m);
            nodes.push(b.intern_node(p, None));
        }
    }
    for y in 0..h {
        for x in 0..w {
            let here = nodes[y * w + x];
            if x + 1 < w {
                b.add_segment(here, nodes[y * w + x + 1], spacing_m, edge_secs, false)
                    .expect("fixture segment");
            }
            if y + 1 < h {
                b.add_segment(here, nodes[(y + 1) * w + x], spacing_m, edge_secs, false)
                    .expect("fixture segment");
            }
        }
    }
    (b.build(), nodes)
}

/// Locator over a fixture graph
pub fn locator(graph: &RoadGraph) -> NodeLocator {
    NodeLocator::build(graph)
}

/// Axis-aligned square polygon with lower-left corner at `(x0, y0)`
pub fn square(x0: f64, y0: f64, size: f64) -> Polygon<f64> {
    polygon![
        (x: x0, y: y0),
        (x: x0 + size, y: y0),
        (x: x0 + size, y: y0 + size),
        (x: x0, y: y0 + size),
    ]
}

/// Population cell over a square footprint
pub fn square_cell(x0: f64, y0: f64, size: f64, population: f64) -> PopulationCell {
    PopulationCell::new(square(x0, y0, size), population).expect("fixture cell")
}

/// Grid of `nx` x `ny` population cells of side `size` starting at the
/// origin, each holding `population`
pub fn cell_grid(nx: usize, ny: usize, size: f64, population: f64) -> Vec<PopulationCell> {
    let mut cells = Vec::with_capacity(nx * ny);
    for y in 0..ny {
        for x in 0..nx {
            #[allow(clippy::cast_precision_loss)]
            cells.push(square_cell(x as f64 * size, y as f64 * size, size, population));
        }
    }
    cells
}

/// Square spatial unit with lower-left corner at `(x0, y0)`
pub fn square_unit(id: &str, x0: f64, y0: f64, size: f64) -> SpatialUnit {
    SpatialUnit::new(
        UnitId::new(id),
        id.to_string(),
        MultiPolygon::new(vec![square(x0, y0, size)]),
    )
}

/// The clinic category
pub fn clinic() -> FacilityCategory {
    FacilityCategory::new(FacilityCategory::CLINIC).expect("fixture category")
}

/// The school category
pub fn school() -> FacilityCategory {
    FacilityCategory::new(FacilityCategory::SCHOOL).expect("fixture category")
}
