//! Dispatch: match the head of the request queue to an idle driver and
//! materialize a ride.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::DispatchError;
use crate::graph::NodeId;
use crate::matching::MatchingPolicy;
use crate::model::{Assignment, DriverId, DriverStatus, Ride, RideRequest, RideStatus};
use crate::pricing::FareConfig;
use crate::route::compose_route;
use crate::shortest_path::PathCache;
use crate::state::DispatchState;

/// Assign the head request to the best idle driver.
///
/// Must be called with the state lock held for the whole call. On any failure
/// after the pop, the request goes back to the head of the queue and no other
/// state changes.
pub fn assign_next(
    state: &mut DispatchState,
    paths: &PathCache,
    policy: &dyn MatchingPolicy,
    fares: &FareConfig,
    now: DateTime<Utc>,
) -> Result<Assignment, DispatchError> {
    let request = state.pop_request().ok_or(DispatchError::NoPendingRequests)?;

    match try_assign(state, paths, policy, fares, &request, now) {
        Ok(assignment) => Ok(assignment),
        Err(err) => {
            warn!(
                passenger = %request.passenger_id,
                source = %request.source,
                error = %err,
                "assignment failed, request returned to queue head"
            );
            state.requeue_front(request);
            Err(err)
        }
    }
}

fn try_assign(
    state: &mut DispatchState,
    paths: &PathCache,
    policy: &dyn MatchingPolicy,
    fares: &FareConfig,
    request: &RideRequest,
    now: DateTime<Utc>,
) -> Result<Assignment, DispatchError> {
    let pickup_tree = paths
        .tree(&request.source)
        .ok_or_else(|| DispatchError::InvalidNode(request.source.clone()))?;

    let available_drivers: Vec<(DriverId, NodeId)> = state
        .drivers()
        .filter(|driver| driver.is_idle())
        .map(|driver| (driver.id.clone(), driver.location.clone()))
        .collect();

    let candidate = policy
        .find_match(&pickup_tree, &available_drivers)
        .ok_or(DispatchError::NoAvailableDriver)?;

    let route = compose_route(
        paths,
        &candidate.location,
        &request.source,
        &request.destination,
    )?;
    let fare = fares.fare(route.distance);

    // Nothing below can fail.
    if let Some(driver) = state.driver_mut(&candidate.driver_id) {
        driver.status = DriverStatus::OnTrip;
    }
    let ride_id = state.allocate_ride_id();
    state.push_ride(Ride {
        ride_id,
        passenger_id: request.passenger_id.clone(),
        driver_id: candidate.driver_id.clone(),
        driver_start: candidate.location.clone(),
        source: request.source.clone(),
        destination: request.destination.clone(),
        path: route.path.clone(),
        distance: route.distance,
        fare,
        status: RideStatus::Ongoing,
        created_at: now,
        completed_at: None,
    });

    info!(
        ride_id = %ride_id,
        driver = %candidate.driver_id,
        passenger = %request.passenger_id,
        pickup_distance = candidate.pickup_distance,
        distance = route.distance,
        fare,
        "assigned ride"
    );

    Ok(Assignment {
        ride_id,
        driver_id: candidate.driver_id,
        driver_location: candidate.location,
        path: route.path,
        distance: route.distance,
        fare,
    })
}
