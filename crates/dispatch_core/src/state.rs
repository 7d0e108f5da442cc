//! Shared mutable dispatch state: driver pool, request queue, ride history
//! and the ride id counter. One mutex guards all of it.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::model::{Driver, DriverId, Ride, RideId, RideRequest};

pub type SharedState = Arc<Mutex<DispatchState>>;

/// Acquire the state lock. A poisoned lock is recovered rather than
/// propagated; every mutation under the lock is a handful of field writes.
pub fn lock_state(state: &Mutex<DispatchState>) -> MutexGuard<'_, DispatchState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
pub struct DispatchState {
    drivers: BTreeMap<DriverId, Driver>,
    queue: VecDeque<RideRequest>,
    rides: Vec<Ride>,
    next_ride_id: u64,
}

impl Default for DispatchState {
    fn default() -> Self {
        Self {
            drivers: BTreeMap::new(),
            queue: VecDeque::new(),
            rides: Vec::new(),
            next_ride_id: 1,
        }
    }
}

impl DispatchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }

    /// Drivers in id order.
    pub fn drivers(&self) -> impl Iterator<Item = &Driver> {
        self.drivers.values()
    }

    pub fn driver(&self, id: &DriverId) -> Option<&Driver> {
        self.drivers.get(id)
    }

    pub(crate) fn driver_mut(&mut self, id: &DriverId) -> Option<&mut Driver> {
        self.drivers.get_mut(id)
    }

    pub(crate) fn insert_driver(&mut self, driver: Driver) {
        self.drivers.insert(driver.id.clone(), driver);
    }

    /// Pending requests, head first.
    pub fn pending(&self) -> &VecDeque<RideRequest> {
        &self.queue
    }

    pub(crate) fn enqueue(&mut self, request: RideRequest) {
        self.queue.push_back(request);
    }

    pub(crate) fn pop_request(&mut self) -> Option<RideRequest> {
        self.queue.pop_front()
    }

    /// Put a request back at the head, ahead of everything queued after it.
    pub(crate) fn requeue_front(&mut self, request: RideRequest) {
        self.queue.push_front(request);
    }

    /// All rides in assignment order.
    pub fn rides(&self) -> &[Ride] {
        &self.rides
    }

    pub fn ride(&self, id: RideId) -> Option<&Ride> {
        self.ride_position(id).map(|idx| &self.rides[idx])
    }

    pub(crate) fn ride_mut(&mut self, id: RideId) -> Option<&mut Ride> {
        self.ride_position(id).map(|idx| &mut self.rides[idx])
    }

    // Rides are appended in id order, so history stays sorted.
    fn ride_position(&self, id: RideId) -> Option<usize> {
        self.rides.binary_search_by_key(&id, |ride| ride.ride_id).ok()
    }

    pub(crate) fn push_ride(&mut self, ride: Ride) {
        debug_assert!(
            self.rides.last().map_or(true, |last| last.ride_id < ride.ride_id),
            "ride ids must increase"
        );
        self.rides.push(ride);
    }

    pub(crate) fn allocate_ride_id(&mut self) -> RideId {
        let id = RideId(self.next_ride_id);
        self.next_ride_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeId;
    use crate::model::PassengerId;

    fn request(passenger: &str) -> RideRequest {
        RideRequest {
            passenger_id: PassengerId::new(passenger),
            source: NodeId::new("A"),
            destination: NodeId::new("B"),
        }
    }

    #[test]
    fn requeue_front_preserves_order_of_the_rest() {
        let mut state = DispatchState::new();
        state.enqueue(request("p1"));
        state.enqueue(request("p2"));
        state.enqueue(request("p3"));

        let head = state.pop_request().expect("head");
        state.requeue_front(head);

        let order: Vec<_> = state
            .pending()
            .iter()
            .map(|r| r.passenger_id.to_string())
            .collect();
        assert_eq!(order, vec!["p1", "p2", "p3"]);
    }

    #[test]
    fn ride_ids_start_at_one_and_increase() {
        let mut state = DispatchState::new();
        assert_eq!(state.allocate_ride_id(), RideId(1));
        assert_eq!(state.allocate_ride_id(), RideId(2));
        assert_eq!(state.allocate_ride_id(), RideId(3));
    }

    #[test]
    fn drivers_iterate_in_id_order() {
        let mut state = DispatchState::new();
        for id in ["d3", "d1", "d2"] {
            state.insert_driver(Driver::new(DriverId::new(id), NodeId::new("A")));
        }
        let ids: Vec<_> = state.drivers().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["d1", "d2", "d3"]);
    }
}
