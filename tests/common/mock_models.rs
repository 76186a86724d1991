//! Mock epidemic models for testing
//!
//! These models have known analytical solutions, making them
//! ideal for validating numerical solver accuracy.

use seird_rs::physics::{Compartment, CompartmentVector, EpidemicModel};
use seird_rs::Result;

// =================================================================================================
// Exponential Decay: dy/dt = -k*y
// =================================================================================================

/// Exponential decay of every compartment: dy/dt = -k*y
///
/// Analytical solution: y(t) = y₀ * exp(-k*t)
pub struct ExponentialDecay {
    pub decay_rate: f64,
}

impl ExponentialDecay {
    pub fn new(decay_rate: f64) -> Self {
        Self { decay_rate }
    }

    /// Compute analytical solution at time t
    pub fn analytical_solution(&self, t: f64, y0: f64) -> f64 {
        y0 * (-self.decay_rate * t).exp()
    }
}

impl EpidemicModel for ExponentialDecay {
    type State = CompartmentVector;

    fn rates(&self, state: &CompartmentVector) -> Result<CompartmentVector> {
        Ok(*state * -self.decay_rate)
    }

    fn name(&self) -> &str {
        "Exponential Decay"
    }
}

// =================================================================================================
// Linear Transfer: S -> R at rate k
// =================================================================================================

/// Susceptibles move straight to recovered: S' = -k*S, R' = k*S
///
/// Analytical solution: S(t) = S₀ * exp(-k*t), R(t) = R₀ + S₀ * (1 - exp(-k*t)).
/// The total is conserved exactly.
pub struct LinearTransfer {
    pub rate: f64,
}

impl LinearTransfer {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }
}

impl EpidemicModel for LinearTransfer {
    type State = CompartmentVector;

    fn rates(&self, state: &CompartmentVector) -> Result<CompartmentVector> {
        let flow = self.rate * state.get(Compartment::Susceptible);
        Ok(CompartmentVector::new(-flow, 0.0, 0.0, flow, 0.0))
    }

    fn name(&self) -> &str {
        "Linear Transfer"
    }
}
