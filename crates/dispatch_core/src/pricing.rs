//! Fare calculation from route distance.

use serde::Deserialize;

/// Default base fare in currency units.
pub const BASE_FARE: f64 = 20.0;

/// Default rate per graph distance unit.
pub const RATE_PER_DISTANCE_UNIT: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct FareConfig {
    pub base_fare: f64,
    pub rate_per_unit: f64,
}

impl Default for FareConfig {
    fn default() -> Self {
        Self {
            base_fare: BASE_FARE,
            rate_per_unit: RATE_PER_DISTANCE_UNIT,
        }
    }
}

impl FareConfig {
    /// Formula: `round2(base_fare + distance * rate_per_unit)`.
    pub fn fare(&self, distance: f64) -> f64 {
        round_cents(self.base_fare + distance * self.rate_per_unit)
    }
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_costs_base_fare() {
        assert_eq!(FareConfig::default().fare(0.0), BASE_FARE);
    }

    #[test]
    fn fare_includes_base_and_distance() {
        let fares = FareConfig::default();
        assert_eq!(fares.fare(11.0), 130.0);
        assert_eq!(fares.fare(21.0), 230.0);
    }

    #[test]
    fn fare_grows_with_distance() {
        let fares = FareConfig::default();
        let mut previous = fares.fare(0.0);
        for step in 1..50 {
            let fare = fares.fare(step as f64 * 0.37);
            assert!(fare > previous, "fare should increase with distance");
            previous = fare;
        }
    }

    #[test]
    fn fare_rounds_to_cents() {
        let fares = FareConfig {
            base_fare: 2.5,
            rate_per_unit: 1.333,
        };
        assert_eq!(fares.fare(1.0), 3.83);
        let cents = fares.fare(7.77) * 100.0;
        assert!((cents - cents.round()).abs() < 1e-6);
    }
}
