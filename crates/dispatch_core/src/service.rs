//! Boundary operations exposed to the outer request-handling layer.
//!
//! [`DispatchService`] is a cheap-to-clone handle. It owns the static graph,
//! the shared state and the trip supervisor; every operation that touches
//! shared state takes the state lock for its whole read-modify-write.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::config::DispatchConfig;
use crate::dispatch;
use crate::error::{ConfigError, DispatchError};
use crate::graph::{CityGraph, NodeId};
use crate::ledger::{self, RatingBounds};
use crate::lifecycle::TripSupervisor;
use crate::matching::{MatchingPolicy, NearestIdleMatching};
use crate::model::{Assignment, Driver, DriverId, PassengerId, RideId, RideRequest};
use crate::pricing::FareConfig;
use crate::route::{leg, path_distance};
use crate::shortest_path::PathCache;
use crate::snapshot::StateSnapshot;
use crate::state::{lock_state, DispatchState, SharedState};

/// Priced route for a trip, without dispatching it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub path: Vec<NodeId>,
    pub distance: f64,
    pub fare: f64,
}

struct ServiceInner {
    graph: Arc<CityGraph>,
    paths: PathCache,
    policy: Box<dyn MatchingPolicy>,
    fares: FareConfig,
    rating: RatingBounds,
    history_limit: usize,
    state: SharedState,
    trips: TripSupervisor,
}

#[derive(Clone)]
pub struct DispatchService {
    inner: Arc<ServiceInner>,
}

impl DispatchService {
    /// Build the city graph from `config` and start with empty state.
    /// Trip tasks are spawned on `runtime`.
    pub fn new(config: &DispatchConfig, runtime: Handle) -> Result<Self, ConfigError> {
        config.validate()?;
        let graph = config.city.build_graph()?;
        Ok(Self::with_policy(
            graph,
            config,
            Box::new(NearestIdleMatching),
            runtime,
        ))
    }

    /// Build a service over an existing graph and matching policy. The city
    /// section of `config` is ignored.
    pub fn with_policy(
        graph: CityGraph,
        config: &DispatchConfig,
        policy: Box<dyn MatchingPolicy>,
        runtime: Handle,
    ) -> Self {
        let graph = Arc::new(graph);
        info!(
            nodes = graph.node_count(),
            edges = graph.edges().len(),
            "dispatch service ready"
        );
        Self {
            inner: Arc::new(ServiceInner {
                paths: PathCache::new(Arc::clone(&graph), config.path_cache_capacity),
                graph,
                policy,
                fares: config.fares,
                rating: config.rating,
                history_limit: config.history_limit,
                state: DispatchState::new().shared(),
                trips: TripSupervisor::new(runtime, config.trip_step()),
            }),
        }
    }

    pub fn graph(&self) -> &CityGraph {
        &self.inner.graph
    }

    pub fn trips(&self) -> &TripSupervisor {
        &self.inner.trips
    }

    /// Run `f` against the state with the lock held.
    pub fn with_state<R>(&self, f: impl FnOnce(&DispatchState) -> R) -> R {
        f(&lock_state(&self.inner.state))
    }

    pub fn state(&self) -> StateSnapshot {
        let state = lock_state(&self.inner.state);
        StateSnapshot::capture(&self.inner.graph, &state, self.inner.history_limit)
    }

    /// Register a driver, idle at `location`. Re-registering an idle driver
    /// resets its record; a driver on a trip cannot be re-registered.
    pub fn add_driver(&self, id: DriverId, location: NodeId) -> Result<(), DispatchError> {
        if !self.inner.graph.contains(&location) {
            return Err(DispatchError::InvalidLocation(location));
        }
        let mut state = lock_state(&self.inner.state);
        if state.driver(&id).is_some_and(|driver| !driver.is_idle()) {
            return Err(DispatchError::DriverOnTrip(id));
        }
        info!(driver = %id, location = %location, "driver registered");
        state.insert_driver(Driver::new(id, location));
        Ok(())
    }

    /// Queue a ride request. Both nodes must exist and the destination must
    /// be reachable from the source.
    pub fn request_ride(
        &self,
        passenger_id: PassengerId,
        source: NodeId,
        destination: NodeId,
    ) -> Result<(), DispatchError> {
        for node in [&source, &destination] {
            if !self.inner.graph.contains(node) {
                return Err(DispatchError::InvalidNode(node.clone()));
            }
        }
        leg(&self.inner.paths, &source, &destination)?;

        let mut state = lock_state(&self.inner.state);
        debug!(
            passenger = %passenger_id,
            source = %source,
            destination = %destination,
            queued = state.pending().len() + 1,
            "ride requested"
        );
        state.enqueue(RideRequest {
            passenger_id,
            source,
            destination,
        });
        Ok(())
    }

    /// Dispatch the head of the queue and start its trip. Returns as soon as
    /// the ride is assigned.
    pub fn assign_next(&self) -> Result<Assignment, DispatchError> {
        let inner = &self.inner;
        let mut state = lock_state(&inner.state);
        let assignment = dispatch::assign_next(
            &mut state,
            &inner.paths,
            inner.policy.as_ref(),
            &inner.fares,
            Utc::now(),
        )?;
        inner.trips.start(
            Arc::clone(&inner.state),
            assignment.ride_id,
            assignment.path.len(),
        );
        Ok(assignment)
    }

    /// Dispatch the whole queue, waiting `retry` between attempts while no
    /// driver is free but some trip is still running. Returns the number of
    /// rides assigned.
    pub async fn dispatch_all(&self, retry: Duration) -> Result<usize, DispatchError> {
        let mut dispatched = 0;
        loop {
            // Sampled before assigning, so a trip that finishes in between is
            // still waited for.
            let trips_running = self.inner.trips.in_flight() > 0;
            match self.assign_next() {
                Ok(_) => dispatched += 1,
                Err(DispatchError::NoPendingRequests) => return Ok(dispatched),
                Err(DispatchError::NoAvailableDriver) if trips_running => {
                    tokio::time::sleep(retry).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    pub fn rate_ride(&self, ride_id: RideId, rating: u32) -> Result<(), DispatchError> {
        let mut state = lock_state(&self.inner.state);
        ledger::rate_ride(&mut state, ride_id, rating, &self.inner.rating)
    }

    pub fn quote(&self, source: &NodeId, destination: &NodeId) -> Result<Quote, DispatchError> {
        let path = leg(&self.inner.paths, source, destination)?;
        let distance = path_distance(&self.inner.graph, &path);
        Ok(Quote {
            fare: self.inner.fares.fare(distance),
            path,
            distance,
        })
    }
}
