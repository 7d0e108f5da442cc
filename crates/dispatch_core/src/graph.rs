//! City road graph: nodes, undirected weighted edges and display coordinates.
//!
//! The graph is built once at startup and never mutated afterwards, so it is
//! shared as `Arc<CityGraph>` and read without locking. Node names are interned
//! to dense indices; path search works on those indices internally.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// Opaque identifier of a location in the city graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for NodeId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Undirected road segment. Serializes as `[a, b, weight]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(NodeId, NodeId, f64)", into = "(NodeId, NodeId, f64)")]
pub struct Edge {
    pub a: NodeId,
    pub b: NodeId,
    pub weight: f64,
}

impl Edge {
    pub fn new(a: impl Into<NodeId>, b: impl Into<NodeId>, weight: f64) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
            weight,
        }
    }
}

impl From<(NodeId, NodeId, f64)> for Edge {
    fn from((a, b, weight): (NodeId, NodeId, f64)) -> Self {
        Self { a, b, weight }
    }
}

impl From<Edge> for (NodeId, NodeId, f64) {
    fn from(edge: Edge) -> Self {
        (edge.a, edge.b, edge.weight)
    }
}

/// Display position of a node. Opaque to the engine.
pub type Coord = [f64; 2];

#[derive(Debug, Clone, Default)]
pub struct CityGraph {
    index: Arc<HashMap<NodeId, usize>>,
    nodes: Arc<Vec<NodeId>>,
    adjacency: Vec<Vec<(usize, f64)>>,
    edges: Vec<Edge>,
    coords: BTreeMap<NodeId, Coord>,
}

impl CityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from an edge list, in order.
    pub fn from_edges<I>(edges: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = Edge>,
    {
        let mut graph = Self::new();
        for edge in edges {
            graph.add_edge(edge.a, edge.b, edge.weight)?;
        }
        Ok(graph)
    }

    /// Attach display coordinates. Every coordinate must name a known node.
    pub fn with_coords<I>(mut self, coords: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (NodeId, Coord)>,
    {
        for (node, coord) in coords {
            if !self.contains(&node) {
                return Err(GraphError::UnknownNode(node));
            }
            self.coords.insert(node, coord);
        }
        Ok(self)
    }

    /// Insert a bidirectional edge, registering both endpoints as nodes.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId, weight: f64) -> Result<(), GraphError> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(GraphError::InvalidWeight { a, b, weight });
        }
        if a == b {
            return Err(GraphError::SelfLoop(a));
        }
        let ia = self.intern(&a);
        let ib = self.intern(&b);
        self.adjacency[ia].push((ib, weight));
        self.adjacency[ib].push((ia, weight));
        self.edges.push(Edge { a, b, weight });
        Ok(())
    }

    fn intern(&mut self, node: &NodeId) -> usize {
        if let Some(&idx) = self.index.get(node) {
            return idx;
        }
        let idx = self.nodes.len();
        Arc::make_mut(&mut self.index).insert(node.clone(), idx);
        Arc::make_mut(&mut self.nodes).push(node.clone());
        self.adjacency.push(Vec::new());
        idx
    }

    pub fn contains(&self, node: &NodeId) -> bool {
        self.index.contains_key(node)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes in registration order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Edges in load order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn coords(&self) -> &BTreeMap<NodeId, Coord> {
        &self.coords
    }

    /// `(neighbor, weight)` pairs of `node`; empty for unknown nodes.
    pub fn neighbors<'a>(&'a self, node: &NodeId) -> impl Iterator<Item = (&'a NodeId, f64)> + 'a {
        self.index_of(node).into_iter().flat_map(move |idx| {
            self.adjacency[idx]
                .iter()
                .map(move |&(next, weight)| (&self.nodes[next], weight))
        })
    }

    /// Weight of the first edge found between `a` and `b`.
    pub fn edge_weight(&self, a: &NodeId, b: &NodeId) -> Option<f64> {
        self.neighbors(a)
            .find(|(next, _)| *next == b)
            .map(|(_, weight)| weight)
    }

    pub(crate) fn index_of(&self, node: &NodeId) -> Option<usize> {
        self.index.get(node).copied()
    }

    /// Shared handles to the node interning tables.
    pub(crate) fn interning(&self) -> (Arc<HashMap<NodeId, usize>>, Arc<Vec<NodeId>>) {
        (Arc::clone(&self.index), Arc::clone(&self.nodes))
    }

    pub(crate) fn adjacent(&self, idx: usize) -> &[(usize, f64)] {
        &self.adjacency[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str) -> NodeId {
        NodeId::new(name)
    }

    #[test]
    fn add_edge_is_symmetric() {
        let mut graph = CityGraph::new();
        graph.add_edge(node("A"), node("B"), 4.0).expect("edge");

        assert_eq!(graph.edge_weight(&node("A"), &node("B")), Some(4.0));
        assert_eq!(graph.edge_weight(&node("B"), &node("A")), Some(4.0));
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edges().len(), 1);
    }

    #[test]
    fn neighbors_of_unknown_node_is_empty() {
        let graph = CityGraph::from_edges([Edge::new("A", "B", 1.0)]).expect("graph");
        assert_eq!(graph.neighbors(&node("Z")).count(), 0);
        assert!(!graph.contains(&node("Z")));
    }

    #[test]
    fn edge_weight_takes_first_parallel_edge() {
        let graph = CityGraph::from_edges([Edge::new("A", "B", 3.0), Edge::new("B", "A", 9.0)])
            .expect("graph");
        assert_eq!(graph.edge_weight(&node("A"), &node("B")), Some(3.0));
        assert_eq!(graph.neighbors(&node("A")).count(), 2);
    }

    #[test]
    fn rejects_negative_and_non_finite_weights() {
        let mut graph = CityGraph::new();
        assert!(matches!(
            graph.add_edge(node("A"), node("B"), -1.0),
            Err(GraphError::InvalidWeight { .. })
        ));
        assert!(matches!(
            graph.add_edge(node("A"), node("B"), f64::NAN),
            Err(GraphError::InvalidWeight { .. })
        ));
        assert!(matches!(
            graph.add_edge(node("A"), node("A"), 1.0),
            Err(GraphError::SelfLoop(_))
        ));
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn coords_must_reference_known_nodes() {
        let graph = CityGraph::from_edges([Edge::new("A", "B", 1.0)]).expect("graph");
        let err = graph
            .clone()
            .with_coords([(node("Q"), [0.0, 0.0])])
            .expect_err("unknown node");
        assert_eq!(err, GraphError::UnknownNode(node("Q")));

        let graph = graph.with_coords([(node("A"), [1.0, 2.0])]).expect("coords");
        assert_eq!(graph.coords().get(&node("A")), Some(&[1.0, 2.0]));
    }

    #[test]
    fn edge_serializes_as_tuple() {
        let json = serde_json::to_string(&Edge::new("A", "B", 4.0)).expect("json");
        assert_eq!(json, r#"["A","B",4.0]"#);
        let edge: Edge = serde_json::from_str(r#"["C","D",8]"#).expect("edge");
        assert_eq!(edge, Edge::new("C", "D", 8.0));
    }
}
