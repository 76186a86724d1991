//! Helper functions for integration tests

use seird_rs::config::SimulationConfig;
use seird_rs::physics::{Compartment, CompartmentField, CompartmentTotals};

/// Assert that two sets of totals are close (within relative tolerance)
pub fn assert_totals_close(
    actual: &CompartmentTotals,
    expected: &CompartmentTotals,
    tolerance: f64,
    message: &str,
) {
    for compartment in Compartment::ALL {
        let error = relative_error(actual.get(compartment), expected.get(compartment));
        assert!(
            error < tolerance,
            "{}: {} differs by {} (tolerance {})",
            message,
            compartment,
            error,
            tolerance
        );
    }
}

/// Every value of every compartment is >= 0
pub fn all_non_negative(field: &CompartmentField) -> bool {
    Compartment::ALL
        .into_iter()
        .all(|compartment| field.get(compartment).iter().all(|value| *value >= 0.0))
}

/// Reference configuration on a grid small enough for debug builds
pub fn small_config(nx: usize, ny: usize) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.spatial.shape = (nx, ny);
    config
}

/// Compute relative error: |actual - expected| / |expected|
pub fn relative_error(actual: f64, expected: f64) -> f64 {
    if expected.abs() < 1e-10 {
        (actual - expected).abs()
    } else {
        (actual - expected).abs() / expected.abs()
    }
}
