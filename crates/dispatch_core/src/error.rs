use crate::graph::NodeId;
use crate::model::{DriverId, RideId};

/// Errors raised while building the city graph.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    #[error("edge {a}-{b} has invalid weight {weight}")]
    InvalidWeight { a: NodeId, b: NodeId, weight: f64 },
    #[error("edge {0}-{0} is a self-loop")]
    SelfLoop(NodeId),
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
}

/// Failures reported by dispatch operations. All are recoverable; none are
/// retried internally.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    #[error("invalid driver location {0}")]
    InvalidLocation(NodeId),
    #[error("invalid node {0}")]
    InvalidNode(NodeId),
    #[error("driver {0} is on a trip")]
    DriverOnTrip(DriverId),
    #[error("no route from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },
    #[error("no pending requests")]
    NoPendingRequests,
    #[error("no available drivers right now")]
    NoAvailableDriver,
    #[error("ride {0} not found")]
    RideNotFound(RideId),
    #[error("ride {0} is not completed")]
    RideNotCompleted(RideId),
    #[error("rating {rating} is outside {min}..={max}")]
    InvalidRating { rating: u32, min: u32, max: u32 },
}

/// Errors raised while loading a [`crate::config::DispatchConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid city graph: {0}")]
    Graph(#[from] GraphError),
    #[error("{0}")]
    Invalid(String),
}
