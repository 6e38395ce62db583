use amap_graph::{compute_catchments, Catchment};
use amap_test_utils::{clinic, grid_graph, line_graph, school};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_catchment_growth_is_monotone(
        n in 2..30usize,
        source_idx in 0..30usize,
        t1 in 0.0..1800.0f64,
        dt in 0.0..1800.0f64,
    ) {
        let (g, nodes) = line_graph(n, 60.0);
        let source = nodes[source_idx % n];
        let c = Catchment::compute(&g, clinic(), &[source], f64::INFINITY).unwrap();

        // For T1 < T2 the covered set at T1 is a subset of the set at T2.
        let at_t1 = c.covered_nodes(t1);
        let at_t2 = c.covered_nodes(t1 + dt);
        prop_assert!(at_t1.iter().all(|n| at_t2.contains(n)));
    }

    #[test]
    fn prop_arrival_bounded_by_line_distance(
        n in 2..20usize,
        probe in 0..20usize,
    ) {
        // On a uniform line, arrival time from node 0 is exactly
        // hops * edge time.
        let (g, nodes) = line_graph(n, 30.0);
        let c = Catchment::compute(&g, clinic(), &[nodes[0]], f64::INFINITY).unwrap();
        let probe_idx = probe % n;
        #[allow(clippy::cast_precision_loss)]
        let expected = probe_idx as f64 * 30.0;
        let got = c.arrival_secs(nodes[probe_idx]).unwrap();
        prop_assert!((got - expected).abs() < 1e-9);
    }
}

#[test]
fn batch_matches_individual_expansions() {
    let (g, nodes) = grid_graph(5, 5, 100.0, 60.0);
    let sources = vec![
        (clinic(), vec![nodes[0]]),
        (school(), vec![nodes[24], nodes[4]]),
    ];
    let batch = compute_catchments(&g, &sources, 600.0).unwrap();
    assert_eq!(batch.len(), 2);

    for (catchment, (category, source_nodes)) in batch.iter().zip(&sources) {
        assert_eq!(&catchment.category, category);
        let solo = Catchment::compute(&g, category.clone(), source_nodes, 600.0).unwrap();
        for &node in &nodes {
            assert_eq!(catchment.arrival_secs(node), solo.arrival_secs(node));
        }
    }
}

#[test]
fn grid_expansion_is_manhattan() {
    // On a lattice with uniform edges, arrival time is the Manhattan
    // hop count times the edge time.
    let (g, nodes) = grid_graph(4, 4, 100.0, 45.0);
    let c = Catchment::compute(&g, clinic(), &[nodes[0]], f64::INFINITY).unwrap();
    for y in 0..4usize {
        for x in 0..4usize {
            #[allow(clippy::cast_precision_loss)]
            let expected = (x + y) as f64 * 45.0;
            let got = c.arrival_secs(nodes[y * 4 + x]).unwrap();
            assert!((got - expected).abs() < 1e-9, "node ({x},{y})");
        }
    }
}

#[test]
fn deterministic_across_runs() {
    // Identical inputs yield identical arrival tables.
    let (g, nodes) = grid_graph(6, 6, 100.0, 60.0);
    let sources = [nodes[3], nodes[20], nodes[35]];
    let a = Catchment::compute(&g, clinic(), &sources, 1800.0).unwrap();
    let b = Catchment::compute(&g, clinic(), &sources, 1800.0).unwrap();
    for &node in &nodes {
        assert_eq!(a.arrival_secs(node), b.arrival_secs(node));
    }
}
