//! Trip lifecycle: simulated travel and the `ongoing → completed` transition.
//!
//! Each assigned ride gets exactly one tokio task, owned by [`TripSupervisor`].
//! The task sleeps for the modelled travel time without holding the state
//! lock, then takes the lock once for the terminal transition. There is no
//! cancellation: a started trip always runs to completion. If a task dies
//! before completing, its ride stays `ongoing` and its driver stays `ontrip`.

use std::mem;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::error::DispatchError;
use crate::model::{DriverStatus, RideId, RideStatus};
use crate::state::{lock_state, DispatchState, SharedState};

/// Default simulated travel time per path node.
pub const DEFAULT_TRIP_STEP: Duration = Duration::from_millis(600);

/// Apply trip completion to `ride_id`.
///
/// The driver moves to the ride's destination, is credited the fare and goes
/// back to idle; the ride becomes completed. Returns `Ok(false)` without
/// touching anything if the ride was already completed.
pub fn complete_ride(
    state: &mut DispatchState,
    ride_id: RideId,
    now: DateTime<Utc>,
) -> Result<bool, DispatchError> {
    let ride = state
        .ride_mut(ride_id)
        .ok_or(DispatchError::RideNotFound(ride_id))?;
    if ride.is_completed() {
        warn!(ride_id = %ride_id, "ride already completed");
        return Ok(false);
    }
    ride.status = RideStatus::Completed;
    ride.completed_at = Some(now);
    let driver_id = ride.driver_id.clone();
    let destination = ride.destination.clone();
    let fare = ride.fare;

    if let Some(driver) = state.driver_mut(&driver_id) {
        driver.location = destination;
        driver.credit(fare);
        driver.status = DriverStatus::Idle;
    }

    info!(ride_id = %ride_id, driver = %driver_id, fare, "ride completed");
    Ok(true)
}

#[derive(Default)]
struct TripTasks {
    /// Highest ride id a task was started for. Rides are started in id order.
    last_started: Option<RideId>,
    /// Handles of trips that had not finished at the last `start`.
    handles: Vec<(RideId, JoinHandle<()>)>,
}

/// Decrements the running-trip count when the task finishes or is dropped.
struct RunningTrip(Arc<AtomicUsize>);

impl Drop for RunningTrip {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Owns the simulation task of every in-flight ride.
pub struct TripSupervisor {
    runtime: Handle,
    step: Duration,
    running: Arc<AtomicUsize>,
    tasks: Mutex<TripTasks>,
}

impl TripSupervisor {
    pub fn new(runtime: Handle, step: Duration) -> Self {
        Self {
            runtime,
            step,
            running: Arc::new(AtomicUsize::new(0)),
            tasks: Mutex::new(TripTasks::default()),
        }
    }

    /// One step per node on the path.
    pub fn travel_time(&self, path_len: usize) -> Duration {
        self.step
            .saturating_mul(u32::try_from(path_len).unwrap_or(u32::MAX))
    }

    /// Spawn the trip task for `ride_id`. Returns `false`, spawning nothing,
    /// if a task was already started for this ride or a later one.
    ///
    /// Callers start rides in allocation order, under the state lock.
    pub fn start(&self, state: SharedState, ride_id: RideId, path_len: usize) -> bool {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        if tasks.last_started.is_some_and(|last| last >= ride_id) {
            warn!(ride_id = %ride_id, "trip already started");
            return false;
        }
        tasks.last_started = Some(ride_id);
        tasks.handles.retain(|(_, handle)| !handle.is_finished());

        self.running.fetch_add(1, Ordering::AcqRel);
        let running = RunningTrip(Arc::clone(&self.running));
        let travel = self.travel_time(path_len);
        let handle = self.runtime.spawn(run_trip(state, ride_id, travel, running));
        tasks.handles.push((ride_id, handle));
        true
    }

    /// Number of trip tasks that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.running.load(Ordering::Acquire)
    }

    /// Wait for every trip started so far, including ones started while
    /// waiting.
    pub async fn drain(&self) {
        loop {
            let handles = {
                let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
                mem::take(&mut tasks.handles)
            };
            if handles.is_empty() {
                return;
            }
            for (ride_id, handle) in handles {
                if let Err(err) = handle.await {
                    error!(ride_id = %ride_id, error = %err, "trip task failed; ride left ongoing");
                }
            }
        }
    }
}

async fn run_trip(state: SharedState, ride_id: RideId, travel: Duration, running: RunningTrip) {
    tokio::time::sleep(travel).await;
    {
        let mut guard = lock_state(&state);
        if let Err(err) = complete_ride(&mut guard, ride_id, Utc::now()) {
            error!(ride_id = %ride_id, error = %err, "failed to complete ride");
        }
    }
    // The count drops only once the completion is visible.
    drop(running);
}
