//! Spatially lumped SEIRD model
//!
//! # Equations
//!
//! With N = S + E + I + R (the living population):
//!
//! ```text
//! dS/dt = −βE·S·E/N − βI·S·I/N + μ·(N − S)
//! dE/dt =  βE·S·E/N + βI·S·I/N − σ·E − φE·E − μ·E
//! dI/dt =  σ·E − φD·I − φR·I − μ·I
//! dR/dt =  φR·I + φE·E − μ·R
//! dD/dt =  φD·I
//! ```
//!
//! The μ·N birth term replaces every natural death, so S+E+I+R+D is constant
//! for any μ.
//!
//! # Degenerate population
//!
//! Standard incidence divides by N. When N falls to `population_floor` or
//! below the right-hand side is undefined and [`LumpedSeird::rates`] fails
//! with [`SimulationError::DegeneratePopulation`] instead of producing NaN.

use crate::error::{Result, SimulationError};
use crate::physics::{Compartment, CompartmentVector, EpidemicModel, Incidence, ParameterSet};

/// Default living-population floor below which rates are refused
pub const DEFAULT_POPULATION_FLOOR: f64 = 1e-12;

/// SEIRD dynamics for a single well-mixed population
///
/// # Example
///
/// ```rust
/// use seird_rs::models::LumpedSeird;
/// use seird_rs::physics::{CompartmentState, CompartmentVector, EpidemicModel, ParameterSet};
///
/// let model = LumpedSeird::new(ParameterSet::default()).unwrap();
/// let rates = model.rates(&CompartmentVector::new(989.0, 10.0, 1.0, 0.0, 0.0)).unwrap();
///
/// assert!(rates.totals().total().abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct LumpedSeird {
    parameters: ParameterSet,
    incidence: Incidence,
    population_floor: f64,
}

impl LumpedSeird {
    /// Create a model with standard incidence
    pub fn new(parameters: ParameterSet) -> Result<Self> {
        parameters.validate()?;

        Ok(Self {
            parameters,
            incidence: Incidence::Standard,
            population_floor: DEFAULT_POPULATION_FLOOR,
        })
    }

    /// Use another incidence form
    pub fn with_incidence(mut self, incidence: Incidence) -> Self {
        self.incidence = incidence;
        self
    }

    /// Change the degenerate-population floor
    pub fn with_population_floor(mut self, floor: f64) -> Result<Self> {
        if !floor.is_finite() || floor < 0.0 {
            return Err(SimulationError::invalid(
                "population_floor",
                format!("must be non-negative and finite, got {}", floor),
            ));
        }
        self.population_floor = floor;
        Ok(self)
    }

    /// Rates in use
    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    /// Incidence form
    pub fn incidence(&self) -> Incidence {
        self.incidence
    }

    /// Living-population floor
    pub fn population_floor(&self) -> f64 {
        self.population_floor
    }
}

impl EpidemicModel for LumpedSeird {
    type State = CompartmentVector;

    fn rates(&self, state: &CompartmentVector) -> Result<CompartmentVector> {
        let p = &self.parameters;
        let s = state.get(Compartment::Susceptible);
        let e = state.get(Compartment::Exposed);
        let i = state.get(Compartment::Infected);
        let r = state.get(Compartment::Recovered);
        let living = state.living_population();

        if self.incidence == Incidence::Standard
            && (living.is_nan() || living <= self.population_floor)
        {
            return Err(SimulationError::DegeneratePopulation {
                population: living,
                floor: self.population_floor,
            });
        }

        let force = self.incidence.force_of_infection(p, s, e, i, living);

        Ok(CompartmentVector::new(
            -force + p.natural_death_rate * (living - s),
            force
                - p.progression_rate * e
                - p.recovery_rate_exposed * e
                - p.natural_death_rate * e,
            p.progression_rate * e
                - p.death_rate * i
                - p.recovery_rate_infected * i
                - p.natural_death_rate * i,
            p.recovery_rate_infected * i + p.recovery_rate_exposed * e - p.natural_death_rate * r,
            p.death_rate * i,
        ))
    }

    fn name(&self) -> &str {
        "Lumped SEIRD"
    }

    fn description(&self) -> Option<&str> {
        Some("Well-mixed SEIRD ordinary differential equations with frequency-dependent incidence.")
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::CompartmentState;

    #[test]
    fn test_reference_rates() {
        let model = LumpedSeird::new(ParameterSet::default()).unwrap();
        let rates = model.rates(&CompartmentVector::new(989.0, 10.0, 1.0, 0.0, 0.0)).unwrap();

        let force = 0.0003 * 989.0 * 10.0 / 1000.0 + 0.0003 * 989.0 * 1.0 / 1000.0;
        assert!((rates.get(Compartment::Susceptible) + force).abs() < 1e-12);
        assert!((rates.get(Compartment::Infected) - (10.0 / 7.0 - 1.0 / 160.0 - 1.0 / 24.0)).abs() < 1e-12);
        assert!((rates.get(Compartment::Recovered) - (1.0 / 24.0 + 10.0 / 6.0)).abs() < 1e-12);
    }

    #[test]
    fn test_natural_death_keeps_total_constant() {
        let parameters = ParameterSet {
            natural_death_rate: 0.01,
            ..Default::default()
        };
        let model = LumpedSeird::new(parameters).unwrap();
        let rates = model.rates(&CompartmentVector::new(500.0, 200.0, 100.0, 50.0, 10.0)).unwrap();

        assert!(rates.totals().total().abs() < 1e-12);
    }

    #[test]
    fn test_collapsed_population_is_an_error() {
        let model = LumpedSeird::new(ParameterSet::default()).unwrap();
        let result = model.rates(&CompartmentVector::new(0.0, 0.0, 0.0, 0.0, 1000.0));

        assert!(matches!(result, Err(SimulationError::DegeneratePopulation { .. })));
    }

    #[test]
    fn test_mass_action_tolerates_collapsed_population() {
        let model = LumpedSeird::new(ParameterSet::default())
            .unwrap()
            .with_incidence(Incidence::MassAction);

        assert!(model.rates(&CompartmentVector::zeros()).is_ok());
    }

    #[test]
    fn test_negative_floor_rejected() {
        let model = LumpedSeird::new(ParameterSet::default()).unwrap();
        assert!(model.with_population_floor(-1.0).is_err());
    }
}
