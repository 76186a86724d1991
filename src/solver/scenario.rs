//! Simulation scenario definition
//!
//! A scenario combines an epidemic model with its initial state.

use crate::error::{Result, SimulationError};
use crate::physics::{CompartmentState, EpidemicModel};

/// Simulation scenario
///
/// Defines a specific case to simulate:
/// - Epidemic model (equations)
/// - Initial state
///
/// # Design
///
/// The same scenario can be solved with different numerical methods.
/// This is the "WHAT to solve" (not "HOW to solve").
///
/// # Examples
///
/// ```rust,ignore
/// let scenario = Scenario::new(model, initial_state);
///
/// let fixed = ForwardEulerSolver::new().solve(&scenario, &fixed_config)?;
/// let adaptive = DormandPrinceSolver::new().solve(&scenario, &adaptive_config)?;
/// ```
pub struct Scenario<M: EpidemicModel> {
    /// Epidemic model (equations)
    pub model: M,

    /// State at the start of the run
    pub initial_state: M::State,
}

impl<M: EpidemicModel> Scenario<M> {
    /// Create a scenario
    pub fn new(model: M, initial_state: M::State) -> Self {
        Self { model, initial_state }
    }

    /// Reject initial states holding NaN or infinities
    pub fn validate(&self) -> Result<()> {
        if let Some(compartment) = self.initial_state.first_non_finite() {
            return Err(SimulationError::NonFinite { compartment, step: 0 });
        }
        Ok(())
    }

    /// Get model name
    pub fn get_model_name(&self) -> &str {
        self.model.name()
    }
}

impl<M: EpidemicModel> std::fmt::Debug for Scenario<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("model", &self.model.name())
            .field("initial_totals", &self.initial_state.totals())
            .finish()
    }
}
