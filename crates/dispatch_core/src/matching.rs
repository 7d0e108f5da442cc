use crate::graph::NodeId;
use crate::model::DriverId;
use crate::shortest_path::ShortestPathTree;

/// Driver chosen for a request, with the distance from the pickup to the
/// driver's current location.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    pub driver_id: DriverId,
    pub location: NodeId,
    pub pickup_distance: f64,
}

/// Trait for policies that pick one idle driver for a pending request.
///
/// `pickup_tree` is the shortest-path tree rooted at the request's pickup
/// node; `available_drivers` are `(driver, location)` pairs of idle drivers,
/// snapshotted under the state lock.
pub trait MatchingPolicy: Send + Sync {
    fn find_match(
        &self,
        pickup_tree: &ShortestPathTree,
        available_drivers: &[(DriverId, NodeId)],
    ) -> Option<MatchCandidate>;
}

/// Nearest idle driver by graph distance from the pickup.
///
/// Drivers that cannot reach the pickup are never candidates. Equal distances
/// resolve to the lowest driver id, independent of slice order.
#[derive(Debug, Default)]
pub struct NearestIdleMatching;

impl MatchingPolicy for NearestIdleMatching {
    fn find_match(
        &self,
        pickup_tree: &ShortestPathTree,
        available_drivers: &[(DriverId, NodeId)],
    ) -> Option<MatchCandidate> {
        available_drivers
            .iter()
            .filter_map(|(driver_id, location)| {
                let distance = pickup_tree.distance(location)?;
                distance.is_finite().then_some((driver_id, location, distance))
            })
            .min_by(|a, b| a.2.total_cmp(&b.2).then_with(|| a.0.cmp(b.0)))
            .map(|(driver_id, location, pickup_distance)| MatchCandidate {
                driver_id: driver_id.clone(),
                location: location.clone(),
                pickup_distance,
            })
    }
}
