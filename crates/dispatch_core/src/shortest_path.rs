//! Single-source shortest paths over the city graph.
//!
//! Dijkstra with a binary-heap frontier. `BinaryHeap` has no decrease-key, so
//! an improved distance pushes a fresh entry and stale entries are skipped when
//! popped (lazy deletion).

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};

use lru::LruCache;
use tracing::debug;

use crate::graph::{CityGraph, NodeId};

#[derive(Debug, Clone, Copy, PartialEq)]
struct FrontierEntry {
    distance: f64,
    node: usize,
}

impl Eq for FrontierEntry {}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by distance.
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Distances and parent links from one start node to every node of a graph.
#[derive(Debug, Clone)]
pub struct ShortestPathTree {
    start: usize,
    index: Arc<HashMap<NodeId, usize>>,
    nodes: Arc<Vec<NodeId>>,
    dist: Vec<f64>,
    parent: Vec<Option<usize>>,
}

impl ShortestPathTree {
    pub fn start(&self) -> &NodeId {
        &self.nodes[self.start]
    }

    fn index_of(&self, node: &NodeId) -> Option<usize> {
        self.index.get(node).copied()
    }

    /// Distance to `node`: `None` if the node is not in the graph,
    /// `f64::INFINITY` if it is unreachable.
    pub fn distance(&self, node: &NodeId) -> Option<f64> {
        self.index_of(node).map(|idx| self.dist[idx])
    }

    pub fn is_reachable(&self, node: &NodeId) -> bool {
        self.distance(node).is_some_and(f64::is_finite)
    }

    pub fn parent(&self, node: &NodeId) -> Option<&NodeId> {
        let idx = self.index_of(node)?;
        self.parent[idx].map(|p| &self.nodes[p])
    }

    /// Walk parent links from `target` back to the root and reverse.
    ///
    /// Returns `[target]` when `target` has no parent, which is the case both
    /// for the root and for unreachable nodes; check [`Self::distance`] or use
    /// [`Self::route_to`] to tell them apart. Unknown targets yield an empty
    /// path.
    pub fn path_to(&self, target: &NodeId) -> Vec<NodeId> {
        let Some(mut idx) = self.index_of(target) else {
            return Vec::new();
        };
        let mut path = vec![self.nodes[idx].clone()];
        while let Some(prev) = self.parent[idx] {
            path.push(self.nodes[prev].clone());
            idx = prev;
        }
        path.reverse();
        path
    }

    /// Path from the root to `target`, or `None` if `target` is unreachable.
    pub fn route_to(&self, target: &NodeId) -> Option<Vec<NodeId>> {
        self.is_reachable(target).then(|| self.path_to(target))
    }
}

/// Run Dijkstra from `start`. Returns `None` if `start` is not in the graph.
pub fn shortest_paths(graph: &CityGraph, start: &NodeId) -> Option<ShortestPathTree> {
    let start_idx = graph.index_of(start)?;
    let n = graph.node_count();
    let mut dist = vec![f64::INFINITY; n];
    let mut parent = vec![None; n];
    let mut frontier = BinaryHeap::new();

    dist[start_idx] = 0.0;
    frontier.push(FrontierEntry {
        distance: 0.0,
        node: start_idx,
    });

    while let Some(FrontierEntry { distance, node }) = frontier.pop() {
        if distance > dist[node] {
            continue;
        }
        for &(next, weight) in graph.adjacent(node) {
            let candidate = distance + weight;
            if candidate < dist[next] {
                dist[next] = candidate;
                parent[next] = Some(node);
                frontier.push(FrontierEntry {
                    distance: candidate,
                    node: next,
                });
            }
        }
    }

    debug!(start = %start, nodes = n, "computed shortest-path tree");

    let (index, nodes) = graph.interning();
    Some(ShortestPathTree {
        start: start_idx,
        index,
        nodes,
        dist,
        parent,
    })
}

/// LRU cache of shortest-path trees keyed by start node.
///
/// The graph never changes after startup, so cached trees never go stale.
pub struct PathCache {
    graph: Arc<CityGraph>,
    cache: Mutex<LruCache<NodeId, Arc<ShortestPathTree>>>,
}

impl PathCache {
    pub fn new(graph: Arc<CityGraph>, capacity: usize) -> Self {
        Self {
            graph,
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN),
            )),
        }
    }

    pub fn graph(&self) -> &CityGraph {
        &self.graph
    }

    /// Tree rooted at `start`, computed on first use.
    pub fn tree(&self, start: &NodeId) -> Option<Arc<ShortestPathTree>> {
        {
            let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(tree) = cache.get(start) {
                return Some(Arc::clone(tree));
            }
        }

        let tree = Arc::new(shortest_paths(&self.graph, start)?);
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(start.clone(), Arc::clone(&tree));
        Some(tree)
    }

    pub fn len(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Edge;
    use crate::route::path_distance;
    use crate::test_helpers::sample_graph;

    fn node(name: &str) -> NodeId {
        NodeId::new(name)
    }

    #[test]
    fn root_has_zero_distance_and_no_parent() {
        let graph = sample_graph();
        for start in graph.nodes() {
            let tree = shortest_paths(&graph, start).expect("tree");
            assert_eq!(tree.distance(start), Some(0.0));
            assert_eq!(tree.parent(start), None);
            assert_eq!(tree.path_to(start), vec![start.clone()]);
        }
    }

    #[test]
    fn prefers_longer_hop_count_with_lower_weight() {
        let graph = sample_graph();
        let tree = shortest_paths(&graph, &node("A")).expect("tree");

        assert_eq!(tree.distance(&node("E")), Some(11.0));
        assert_eq!(
            tree.path_to(&node("E")),
            vec![node("A"), node("B"), node("D"), node("E")]
        );
    }

    #[test]
    fn reconstructed_paths_sum_to_distance() {
        let graph = sample_graph();
        for start in graph.nodes() {
            let tree = shortest_paths(&graph, start).expect("tree");
            for target in graph.nodes() {
                let path = tree.route_to(target).expect("connected graph");
                let summed = path_distance(&graph, &path);
                assert_eq!(Some(summed), tree.distance(target), "{start} -> {target}");
            }
        }
    }

    #[test]
    fn disconnected_nodes_stay_at_infinity() {
        let graph = CityGraph::from_edges([Edge::new("A", "B", 1.0), Edge::new("X", "Y", 2.0)])
            .expect("graph");
        let tree = shortest_paths(&graph, &node("A")).expect("tree");

        assert_eq!(tree.distance(&node("Y")), Some(f64::INFINITY));
        assert_eq!(tree.parent(&node("Y")), None);
        assert_eq!(tree.path_to(&node("Y")), vec![node("Y")]);
        assert_eq!(tree.route_to(&node("Y")), None);
        assert_eq!(tree.route_to(&node("A")), Some(vec![node("A")]));
    }

    #[test]
    fn unknown_start_or_target() {
        let graph = sample_graph();
        assert!(shortest_paths(&graph, &node("Z")).is_none());

        let tree = shortest_paths(&graph, &node("A")).expect("tree");
        assert_eq!(tree.distance(&node("Z")), None);
        assert!(tree.path_to(&node("Z")).is_empty());
    }

    #[test]
    fn stale_frontier_entries_are_skipped() {
        // B is first reached at 10 via A-B, then improved to 2 via A-C-B.
        let graph = CityGraph::from_edges([
            Edge::new("A", "B", 10.0),
            Edge::new("A", "C", 1.0),
            Edge::new("C", "B", 1.0),
            Edge::new("B", "D", 1.0),
        ])
        .expect("graph");
        let tree = shortest_paths(&graph, &node("A")).expect("tree");

        assert_eq!(tree.distance(&node("B")), Some(2.0));
        assert_eq!(tree.distance(&node("D")), Some(3.0));
        assert_eq!(tree.parent(&node("B")), Some(&node("C")));
    }

    #[test]
    fn cache_reuses_trees() {
        let cache = PathCache::new(Arc::new(sample_graph()), 2);
        let first = cache.tree(&node("A")).expect("tree");
        let second = cache.tree(&node("A")).expect("tree");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        cache.tree(&node("B")).expect("tree");
        cache.tree(&node("C")).expect("tree");
        assert_eq!(cache.len(), 2);
        assert!(cache.tree(&node("Z")).is_none());
    }
}
