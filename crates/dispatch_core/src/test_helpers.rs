//! Sample-city fixtures: the built-in seven-node graph and a dispatch config
//! whose trips finish in a fraction of a second.

use crate::config::{CityConfig, DispatchConfig};
use crate::graph::CityGraph;

/// Simulated travel time per path node used by fast test configs.
pub const TEST_TRIP_STEP_MS: u64 = 100;

/// The built-in seven-node sample city.
///
/// # Panics
///
/// Panics if the sample city is invalid (should never happen).
pub fn sample_graph() -> CityGraph {
    CityConfig::default()
        .build_graph()
        .expect("sample city should be a valid graph")
}

/// Default config with a short trip step, for tests that run trips.
pub fn fast_config() -> DispatchConfig {
    DispatchConfig {
        trip_step_ms: TEST_TRIP_STEP_MS,
        ..DispatchConfig::default()
    }
}
