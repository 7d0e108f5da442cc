//! Built-in sample city: seven nodes, nine roads.

use std::collections::BTreeMap;

use crate::graph::{Coord, Edge, NodeId};

const SAMPLE_EDGES: [(&str, &str, f64); 9] = [
    ("A", "B", 4.0),
    ("A", "C", 2.0),
    ("B", "D", 5.0),
    ("C", "D", 8.0),
    ("C", "E", 10.0),
    ("D", "E", 2.0),
    ("B", "F", 3.0),
    ("E", "G", 6.0),
    ("F", "G", 7.0),
];

const SAMPLE_COORDS: [(&str, Coord); 7] = [
    ("A", [100.0, 100.0]),
    ("B", [220.0, 80.0]),
    ("C", [140.0, 200.0]),
    ("D", [300.0, 150.0]),
    ("E", [420.0, 220.0]),
    ("F", [200.0, 240.0]),
    ("G", [480.0, 320.0]),
];

pub fn sample_edges() -> Vec<Edge> {
    SAMPLE_EDGES
        .iter()
        .map(|&(a, b, weight)| Edge::new(a, b, weight))
        .collect()
}

pub fn sample_coords() -> BTreeMap<NodeId, Coord> {
    SAMPLE_COORDS
        .iter()
        .map(|&(node, coord)| (NodeId::new(node), coord))
        .collect()
}
