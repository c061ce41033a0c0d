use std::collections::HashSet;

use petgraph::algo::{has_path_connecting, tarjan_scc};
use petgraph::graph::NodeIndex;
use petgraph::visit::Bfs;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use topomem_types::{Channel, ChannelReading, Edge, EdgeContribution, MetricKind, MetricVector};
use tracing::{debug, warn};

use crate::config::StructuralConfig;
use crate::extractor::MetricExtractor;
use crate::graph::{EdgeDelta, GraphSnapshot, IndexedGraph};
use crate::spectral::spectral_entropy;

/// A pre-change graph and the change applied to it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralInput {
    pub before: GraphSnapshot,
    pub delta: EdgeDelta,
}

impl StructuralInput {
    pub fn new(before: GraphSnapshot, delta: EdgeDelta) -> Self {
        Self { before, delta }
    }
}

/// Extracts `C S H D E` from a graph change.
#[derive(Clone, Debug, Default)]
pub struct StructuralExtractor {
    config: StructuralConfig,
}

impl StructuralExtractor {
    pub fn new(config: StructuralConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StructuralConfig {
        &self.config
    }

    /// Added edges that close a cycle in the pre-change graph, in delta order.
    ///
    /// `(u -> v)` is cycle-forming iff `v` reaches `u` before the change. A
    /// self-loop always is. Edges already present, and repeats within the
    /// delta, are not new and are skipped.
    pub fn cycle_forming_edges(&self, before: &GraphSnapshot, delta: &EdgeDelta) -> Vec<EdgeContribution> {
        let indexed = before.to_petgraph();
        let mut seen: HashSet<&Edge> = HashSet::new();
        let mut out = Vec::new();
        for (order, edge) in delta.added.iter().enumerate() {
            if before.contains_edge(edge) || !seen.insert(edge) {
                continue;
            }
            if edge.is_self_loop() {
                out.push(EdgeContribution {
                    edge: edge.clone(),
                    contribution: 1.0,
                    order,
                });
                continue;
            }
            let (Some(u), Some(v)) = (indexed.node(&edge.from), indexed.node(&edge.to)) else {
                continue;
            };
            if has_path_connecting(&indexed.graph, v, u, None) {
                let size = cycle_node_count(&indexed, u, v);
                out.push(EdgeContribution {
                    edge: edge.clone(),
                    contribution: size as f64,
                    order,
                });
            }
        }
        out
    }
}

/// Nodes on any path `v ~> u`: `|reach+(v) ∩ reach-(u)|`.
fn cycle_node_count(g: &IndexedGraph, u: NodeIndex, v: NodeIndex) -> usize {
    let mut forward = HashSet::new();
    let mut bfs = Bfs::new(&g.graph, v);
    while let Some(n) = bfs.next(&g.graph) {
        forward.insert(n);
    }

    let mut backward = HashSet::new();
    let mut stack = vec![u];
    while let Some(n) = stack.pop() {
        if !backward.insert(n) {
            continue;
        }
        for p in g.graph.neighbors_directed(n, Direction::Incoming) {
            if !backward.contains(&p) {
                stack.push(p);
            }
        }
    }

    forward.intersection(&backward).count()
}

/// Share of nodes in the largest strongly connected component.
pub(crate) fn scc_mass(graph: &GraphSnapshot) -> f64 {
    if graph.is_empty() {
        return 0.0;
    }
    let indexed = graph.to_petgraph();
    let largest = tarjan_scc(&indexed.graph)
        .iter()
        .map(Vec::len)
        .max()
        .unwrap_or(0);
    largest as f64 / graph.node_count() as f64
}

impl MetricExtractor for StructuralExtractor {
    type Input = StructuralInput;

    fn kind(&self) -> MetricKind {
        MetricKind::Structural
    }

    fn extract(&self, input: &StructuralInput) -> MetricVector {
        let before = &input.before;
        let after = before.apply(&input.delta);

        if after.is_empty() {
            warn!("empty graph, emitting degenerate structural vector");
            return MetricVector::degenerate(MetricKind::Structural).with_size(0, 0);
        }

        let contributors = self.cycle_forming_edges(before, &input.delta);
        let cycles = contributors.len() as f64;

        let scc_before = scc_mass(before);
        let scc_after = scc_mass(&after);
        let scc_delta = scc_after - scc_before;

        let spectral = &self.config.spectral;
        let (entropy, entropy_delta, degenerate) =
            match (spectral_entropy(before, spectral), spectral_entropy(&after, spectral)) {
                (Some(b), Some(a)) => (a.entropy, a.entropy - b.entropy, false),
                (b, a) => {
                    warn!(
                        nodes = after.node_count(),
                        before_ok = b.is_some(),
                        after_ok = a.is_some(),
                        "degenerate spectrum, entropy delta set to 0"
                    );
                    (a.map(|e| e.entropy).unwrap_or(0.0), 0.0, true)
                }
            };

        let density_before = before.density();
        let density_after = after.density();
        let density_delta = density_after - density_before;

        let added = input
            .delta
            .added
            .iter()
            .filter(|e| !before.contains_edge(e))
            .collect::<HashSet<_>>()
            .len();
        let removed = input
            .delta
            .removed
            .iter()
            .filter(|e| before.contains_edge(e))
            .collect::<HashSet<_>>()
            .len();
        let drift = ((added + removed) as f64 / before.edge_count().max(1) as f64).clamp(0.0, 1.0);

        debug!(
            cycles = contributors.len(),
            scc_delta,
            entropy_delta,
            density_delta,
            drift,
            "structural metrics extracted"
        );

        let readings = [
            ChannelReading::new(Channel::CycleForming, cycles, cycles, cycles),
            ChannelReading::new(Channel::SccMass, scc_after, scc_delta, scc_delta.max(0.0)),
            ChannelReading::new(
                Channel::SpectralEntropy,
                entropy,
                entropy_delta,
                entropy_delta.abs(),
            ),
            ChannelReading::new(
                Channel::Density,
                density_after,
                density_delta,
                density_delta.max(0.0),
            ),
            ChannelReading::new(Channel::EdgeDrift, drift, drift, drift),
        ];

        let mut vector = MetricVector::new(MetricKind::Structural, readings)
            .with_contributors(contributors)
            .with_size(after.node_count(), after.edge_count());
        vector.degenerate = degenerate;
        vector
    }
}
