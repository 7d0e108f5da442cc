//! Driver ledger: earnings credits and post-trip ratings.

use serde::Deserialize;
use tracing::info;

use crate::error::DispatchError;
use crate::model::{Driver, RideId};
use crate::state::DispatchState;

/// Accepted rating range, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RatingBounds {
    pub min: u32,
    pub max: u32,
}

impl Default for RatingBounds {
    fn default() -> Self {
        Self { min: 1, max: 5 }
    }
}

impl RatingBounds {
    pub fn check(&self, rating: u32) -> Result<(), DispatchError> {
        if (self.min..=self.max).contains(&rating) {
            Ok(())
        } else {
            Err(DispatchError::InvalidRating {
                rating,
                min: self.min,
                max: self.max,
            })
        }
    }
}

impl Driver {
    pub fn credit(&mut self, fare: f64) {
        self.earnings += fare;
    }

    pub fn record_rating(&mut self, rating: u32) {
        self.rating_sum += u64::from(rating);
        self.rating_count += 1;
    }

    /// `rating_sum / rating_count`, or `None` before the first rating.
    pub fn average_rating(&self) -> Option<f64> {
        (self.rating_count > 0).then(|| self.rating_sum as f64 / self.rating_count as f64)
    }
}

/// Rate a completed ride, adding the rating to its driver's aggregate.
///
/// The range check runs first, so an out-of-range rating is rejected even for
/// an unknown ride. A ride may be rated more than once; every rating counts.
pub fn rate_ride(
    state: &mut DispatchState,
    ride_id: RideId,
    rating: u32,
    bounds: &RatingBounds,
) -> Result<(), DispatchError> {
    bounds.check(rating)?;
    let ride = state
        .ride(ride_id)
        .ok_or(DispatchError::RideNotFound(ride_id))?;
    if !ride.is_completed() {
        return Err(DispatchError::RideNotCompleted(ride_id));
    }
    let driver_id = ride.driver_id.clone();

    if let Some(driver) = state.driver_mut(&driver_id) {
        driver.record_rating(rating);
        info!(
            ride_id = %ride_id,
            driver = %driver_id,
            rating,
            rating_count = driver.rating_count,
            "ride rated"
        );
    }
    Ok(())
}
