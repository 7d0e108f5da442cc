//! Dispatch configuration, loadable from JSON.
//!
//! Every field has a default, so `{}` is a valid config that runs the built-in
//! sample city with the standard fares.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::city::{sample_coords, sample_edges};
use crate::error::{ConfigError, GraphError};
use crate::graph::{CityGraph, Coord, Edge, NodeId};
use crate::ledger::RatingBounds;
use crate::lifecycle::DEFAULT_TRIP_STEP;
use crate::pricing::FareConfig;

/// Rides included in a state snapshot by default.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Shortest-path trees kept in the path cache by default.
pub const DEFAULT_PATH_CACHE_CAPACITY: usize = 256;

/// Road network and display coordinates. A `city` given in JSON must list
/// its edges; coordinates are optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CityConfig {
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub coords: BTreeMap<NodeId, Coord>,
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            edges: sample_edges(),
            coords: sample_coords(),
        }
    }
}

impl CityConfig {
    pub fn build_graph(&self) -> Result<CityGraph, GraphError> {
        CityGraph::from_edges(self.edges.iter().cloned())?
            .with_coords(self.coords.iter().map(|(node, coord)| (node.clone(), *coord)))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub city: CityConfig,
    pub fares: FareConfig,
    /// Simulated travel time per path node, in milliseconds.
    pub trip_step_ms: u64,
    pub history_limit: usize,
    pub path_cache_capacity: usize,
    pub rating: RatingBounds,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            city: CityConfig::default(),
            fares: FareConfig::default(),
            trip_step_ms: DEFAULT_TRIP_STEP.as_millis() as u64,
            history_limit: DEFAULT_HISTORY_LIMIT,
            path_cache_capacity: DEFAULT_PATH_CACHE_CAPACITY,
            rating: RatingBounds::default(),
        }
    }
}

impl DispatchConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn trip_step(&self) -> Duration {
        Duration::from_millis(self.trip_step_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.city.edges.is_empty() {
            return Err(ConfigError::Invalid("city must have at least one edge".into()));
        }
        if self.rating.min > self.rating.max {
            return Err(ConfigError::Invalid(format!(
                "rating.min ({}) must not exceed rating.max ({})",
                self.rating.min, self.rating.max
            )));
        }
        if !self.fares.base_fare.is_finite() || !self.fares.rate_per_unit.is_finite() {
            return Err(ConfigError::Invalid("fares must be finite".into()));
        }
        if self.fares.rate_per_unit < 0.0 {
            return Err(ConfigError::Invalid(
                "fares.rate_per_unit must not be negative".into(),
            ));
        }
        Ok(())
    }
}
