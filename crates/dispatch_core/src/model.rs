//! Drivers, ride requests and rides.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::graph::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverId(String);

impl DriverId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DriverId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PassengerId(String);

impl PassengerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for PassengerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PassengerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Ride identifier. Allocated under the state lock, starting at 1 and
/// increasing with every assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RideId(pub u64);

impl fmt::Display for RideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverStatus {
    Idle,
    OnTrip,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Driver {
    pub id: DriverId,
    pub location: NodeId,
    pub earnings: f64,
    pub rating_sum: u64,
    pub rating_count: u64,
    pub status: DriverStatus,
}

impl Driver {
    /// Fresh idle driver with no earnings or ratings.
    pub fn new(id: DriverId, location: NodeId) -> Self {
        Self {
            id,
            location,
            earnings: 0.0,
            rating_sum: 0,
            rating_count: 0,
            status: DriverStatus::Idle,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.status == DriverStatus::Idle
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideRequest {
    pub passenger_id: PassengerId,
    pub source: NodeId,
    pub destination: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RideStatus {
    Ongoing,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ride {
    pub ride_id: RideId,
    pub passenger_id: PassengerId,
    pub driver_id: DriverId,
    /// Driver location when the ride was assigned.
    pub driver_start: NodeId,
    pub source: NodeId,
    pub destination: NodeId,
    /// Driver → pickup → destination.
    pub path: Vec<NodeId>,
    pub distance: f64,
    pub fare: f64,
    pub status: RideStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Ride {
    pub fn is_completed(&self) -> bool {
        self.status == RideStatus::Completed
    }
}

/// Result of a successful dispatch, returned before the trip completes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub ride_id: RideId,
    pub driver_id: DriverId,
    pub driver_location: NodeId,
    pub path: Vec<NodeId>,
    pub distance: f64,
    pub fare: f64,
}
