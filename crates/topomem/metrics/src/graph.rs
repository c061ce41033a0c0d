use std::collections::{BTreeSet, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use topomem_types::Edge;

/// A directed graph as a set of named nodes and edges.
///
/// Nodes referenced by an edge are always present in the node set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    nodes: BTreeSet<String>,
    edges: BTreeSet<Edge>,
}

/// Edges added and removed by one change.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDelta {
    #[serde(default)]
    pub added: Vec<Edge>,
    #[serde(default)]
    pub removed: Vec<Edge>,
}

impl EdgeDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.added.push(Edge::new(from, to));
        self
    }

    pub fn remove(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.removed.push(Edge::new(from, to));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

impl GraphSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_edges<I, A, B>(edges: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        let mut g = Self::new();
        for (a, b) in edges {
            g.insert_edge(Edge::new(a, b));
        }
        g
    }

    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.nodes.insert(node.into());
        self
    }

    pub fn with_edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.insert_edge(Edge::new(from, to));
        self
    }

    pub fn insert_edge(&mut self, edge: Edge) -> bool {
        self.nodes.insert(edge.from.clone());
        self.nodes.insert(edge.to.clone());
        self.edges.insert(edge)
    }

    pub fn remove_edge(&mut self, edge: &Edge) -> bool {
        self.edges.remove(edge)
    }

    pub fn contains_edge(&self, edge: &Edge) -> bool {
        self.edges.contains(edge)
    }

    pub fn contains_node(&self, node: &str) -> bool {
        self.nodes.contains(node)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Edges per node; 0 for an empty graph.
    pub fn density(&self) -> f64 {
        if self.nodes.is_empty() {
            0.0
        } else {
            self.edges.len() as f64 / self.nodes.len() as f64
        }
    }

    /// The post-change graph. Removals are applied before additions; removing
    /// an edge never removes its endpoints.
    pub fn apply(&self, delta: &EdgeDelta) -> Self {
        let mut next = self.clone();
        for e in &delta.removed {
            next.remove_edge(e);
        }
        for e in &delta.added {
            next.insert_edge(e.clone());
        }
        next
    }

    pub(crate) fn to_petgraph(&self) -> IndexedGraph {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.edges.len());
        let mut index = HashMap::with_capacity(self.nodes.len());
        for n in &self.nodes {
            index.insert(n.clone(), graph.add_node(()));
        }
        for e in &self.edges {
            if let (Some(&a), Some(&b)) = (index.get(&e.from), index.get(&e.to)) {
                graph.add_edge(a, b, ());
            }
        }
        IndexedGraph { graph, index }
    }
}

/// A petgraph view of a snapshot with a name lookup.
pub(crate) struct IndexedGraph {
    pub graph: DiGraph<(), ()>,
    pub index: HashMap<String, NodeIndex>,
}

impl IndexedGraph {
    pub fn node(&self, name: &str) -> Option<NodeIndex> {
        self.index.get(name).copied()
    }
}
