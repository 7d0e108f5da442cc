//! Read-only view of the whole dispatch state, for rendering layers.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::graph::{CityGraph, Coord, Edge, NodeId};
use crate::model::{Driver, Ride, RideRequest};
use crate::state::DispatchState;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverSnapshot {
    #[serde(flatten)]
    pub driver: Driver,
    pub average_rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSnapshot {
    pub city_coords: BTreeMap<NodeId, Coord>,
    pub edges: Vec<Edge>,
    pub drivers: Vec<DriverSnapshot>,
    pub pending_requests: Vec<RideRequest>,
    /// Most recent rides, oldest first.
    pub ride_history: Vec<Ride>,
}

impl StateSnapshot {
    /// Capture a snapshot; `history_limit` bounds how many of the latest rides
    /// are included.
    pub fn capture(graph: &CityGraph, state: &DispatchState, history_limit: usize) -> Self {
        let rides = state.rides();
        let skip = rides.len().saturating_sub(history_limit);
        Self {
            city_coords: graph.coords().clone(),
            edges: graph.edges().to_vec(),
            drivers: state
                .drivers()
                .map(|driver| DriverSnapshot {
                    average_rating: driver.average_rating(),
                    driver: driver.clone(),
                })
                .collect(),
            pending_requests: state.pending().iter().cloned().collect(),
            ride_history: rides[skip..].to_vec(),
        }
    }
}
