//! Property tests: an added edge `u -> v` is cycle-forming exactly when `v`
//! already reaches `u`, and its contribution is the size of the closed cycle.

use proptest::prelude::*;
use topomem_metrics::{EdgeDelta, GraphSnapshot, StructuralExtractor};
use topomem_types::Edge;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn name(i: usize) -> String {
    format!("n{i}")
}

/// Reflexive-transitive closure by Floyd-Warshall.
fn closure(n: usize, edges: &[(usize, usize)]) -> Vec<Vec<bool>> {
    let mut reach = vec![vec![false; n]; n];
    for (i, row) in reach.iter_mut().enumerate() {
        row[i] = true;
    }
    for &(a, b) in edges {
        reach[a][b] = true;
    }
    for k in 0..n {
        for i in 0..n {
            for j in 0..n {
                if reach[i][k] && reach[k][j] {
                    reach[i][j] = true;
                }
            }
        }
    }
    reach
}

fn snapshot(n: usize, edges: &[(usize, usize)]) -> GraphSnapshot {
    let mut g = GraphSnapshot::new();
    for i in 0..n {
        g = g.with_node(name(i));
    }
    for &(a, b) in edges {
        g = g.with_edge(name(a), name(b));
    }
    g
}

fn brute_force(n: usize, edges: &[(usize, usize)], u: usize, v: usize) -> Option<usize> {
    if u == v {
        return Some(1);
    }
    let reach = closure(n, edges);
    if !reach[v][u] {
        return None;
    }
    Some((0..n).filter(|&x| reach[v][x] && reach[x][u]).count())
}

// ---------------------------------------------------------------------------
// Exhaustive check on every 3-node digraph
// ---------------------------------------------------------------------------

#[test]
fn exhaustive_three_node_graphs() {
    let n = 3;
    let all_pairs: Vec<(usize, usize)> = (0..n).flat_map(|a| (0..n).map(move |b| (a, b))).collect();
    let extractor = StructuralExtractor::default();

    for mask in 0u32..(1 << all_pairs.len()) {
        let edges: Vec<(usize, usize)> = all_pairs
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, &p)| p)
            .collect();
        let before = snapshot(n, &edges);

        for &(u, v) in &all_pairs {
            if edges.contains(&(u, v)) {
                continue;
            }
            let delta = EdgeDelta::new().add(name(u), name(v));
            let found = extractor.cycle_forming_edges(&before, &delta);
            let expected = brute_force(n, &edges, u, v);
            match expected {
                None => assert!(
                    found.is_empty(),
                    "mask {mask:#b}: {u}->{v} flagged but {v} does not reach {u}"
                ),
                Some(size) => {
                    assert_eq!(found.len(), 1, "mask {mask:#b}: {u}->{v} missed");
                    assert_eq!(found[0].edge, Edge::new(name(u), name(v)));
                    assert_eq!(found[0].contribution, size as f64, "mask {mask:#b}: {u}->{v}");
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Random larger graphs
// ---------------------------------------------------------------------------

fn arb_graph(max_nodes: usize) -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (2..=max_nodes).prop_flat_map(|n| {
        let edge = (0..n, 0..n).prop_filter("no self-loops", |(a, b)| a != b);
        (Just(n), prop::collection::vec(edge, 0..(n * 2)))
    })
}

proptest! {
    #[test]
    fn cycle_forming_matches_reachability(
        (n, edges) in arb_graph(7),
        u_seed in 0usize..64,
        v_seed in 0usize..64,
    ) {
        let u = u_seed % n;
        let v = v_seed % n;
        prop_assume!(u != v && !edges.contains(&(u, v)));

        let before = snapshot(n, &edges);
        let delta = EdgeDelta::new().add(name(u), name(v));
        let found = StructuralExtractor::default().cycle_forming_edges(&before, &delta);

        match brute_force(n, &edges, u, v) {
            None => prop_assert!(found.is_empty()),
            Some(size) => {
                prop_assert_eq!(found.len(), 1);
                prop_assert_eq!(found[0].contribution, size as f64);
            }
        }
    }

    #[test]
    fn edges_already_present_never_count(
        (n, edges) in arb_graph(6),
    ) {
        prop_assume!(!edges.is_empty());
        let before = snapshot(n, &edges);
        let mut delta = EdgeDelta::new();
        for &(a, b) in &edges {
            delta = delta.add(name(a), name(b));
        }
        let found = StructuralExtractor::default().cycle_forming_edges(&before, &delta);
        prop_assert!(found.is_empty());
    }
}
