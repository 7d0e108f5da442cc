//! Route composition: driver → pickup → dropoff over shortest paths.

use serde::Serialize;

use crate::error::DispatchError;
use crate::graph::{CityGraph, NodeId};
use crate::shortest_path::PathCache;

/// Multi-leg path and its total distance.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Route {
    pub path: Vec<NodeId>,
    pub distance: f64,
}

/// Sum edge weights along consecutive pairs of `path`, looking each weight up
/// in the graph again. Parallel edges resolve to the first one found; pairs
/// with no edge contribute nothing.
pub fn path_distance(graph: &CityGraph, path: &[NodeId]) -> f64 {
    path.windows(2)
        .filter_map(|pair| graph.edge_weight(&pair[0], &pair[1]))
        .sum()
}

/// Shortest path between two nodes.
pub fn leg(paths: &PathCache, from: &NodeId, to: &NodeId) -> Result<Vec<NodeId>, DispatchError> {
    let tree = paths
        .tree(from)
        .ok_or_else(|| DispatchError::InvalidNode(from.clone()))?;
    if tree.distance(to).is_none() {
        return Err(DispatchError::InvalidNode(to.clone()));
    }
    tree.route_to(to).ok_or_else(|| DispatchError::NoRoute {
        from: from.clone(),
        to: to.clone(),
    })
}

/// Full route for a trip: the driver → pickup leg followed by the
/// pickup → dropoff leg, without repeating the pickup node.
pub fn compose_route(
    paths: &PathCache,
    driver_location: &NodeId,
    pickup: &NodeId,
    dropoff: &NodeId,
) -> Result<Route, DispatchError> {
    let mut path = leg(paths, driver_location, pickup)?;
    let dropoff_leg = leg(paths, pickup, dropoff)?;
    path.extend(dropoff_leg.into_iter().skip(1));

    let distance = path_distance(paths.graph(), &path);
    Ok(Route { path, distance })
}
