//! Forward Euler numerical solver
//!
//! # Mathematical Background
//!
//! The Forward Euler method is the simplest explicit time-stepping scheme
//! for solving ordinary differential equations (ODEs):
//!
//! ```text
//! dy/dt = f(y)
//! ```
//!
//! The scheme approximates the solution at time t_{n+1} = t_n + dt using:
//!
//! ```text
//! y_{n+1} = max(0, y_n + dt * f(y_n))
//! ```
//!
//! The `max(0, ·)` clamp is applied to every value after every step and
//! can be switched off.
//!
//! With `dt = 1` the step adds each rate once, which is the per-day update
//! of the grid model; smaller steps resolve a day in `1/dt` sub-steps.
//!
//! # Characteristics
//!
//! - **Order**: First-order accurate (error ~ O(dt))
//! - **Stability**: Conditionally stable (diffusion number ≤ 1/2, rate·dt ≪ 1)
//! - **Complexity**: 1 right-hand side evaluation per step
//! - **Memory**: one new state per step, the old one is kept until the metrics are recorded
//!
//! # Example
//!
//! ```rust,ignore
//! use seird_rs::solver::{ForwardEulerSolver, Solver, SolverConfiguration};
//!
//! let solver = ForwardEulerSolver::new();
//! // 120 per-day updates
//! let config = SolverConfiguration::time_evolution(1.0, 120);
//!
//! let result = solver.solve(&scenario, &config)?;
//! ```

use crate::error::{Result, SimulationError};
use crate::metrics::MetricsAccumulator;
use crate::physics::{CompartmentState, EpidemicModel};
use crate::solver::{
    validate_state, Scenario, SimulationResult, Solver, SolverConfiguration, SolverType,
};

// =================================================================================================
// Forward Euler Solver
// =================================================================================================

/// Forward Euler time-stepping solver
///
/// # Algorithm
///
/// 1. Start with initial state y_0
/// 2. For each time step n = 0, 1, 2, ..., N-1:
///    - Compute rates: k = f(y_n), every value read from y_n
///    - Update state into a fresh buffer: y_{n+1} = y_n + dt * k
///    - Clamp negative values to zero
///    - Record the daily metrics against y_n
///    - Store trajectory point every `snapshot_interval` steps
/// 3. Return trajectory, final state and metrics
///
/// # Stability
///
/// Nothing is enforced. When the model reports a
/// [`stability_limit`](EpidemicModel::stability_limit) smaller than `dt`
/// a warning is logged and the run continues.
#[derive(Debug, Clone, Copy)]
pub struct ForwardEulerSolver {
    clamp: bool,
}

impl Default for ForwardEulerSolver {
    fn default() -> Self {
        Self { clamp: true }
    }
}

impl ForwardEulerSolver {
    /// Create a new Forward Euler solver (clamping enabled)
    ///
    /// # Example
    ///
    /// ```rust
    /// use seird_rs::solver::{ForwardEulerSolver, Solver};
    ///
    /// let solver = ForwardEulerSolver::new();
    /// assert_eq!(solver.name(), "Forward Euler");
    /// assert!(solver.clamps());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Solver that leaves negative values in place
    pub fn without_clamping() -> Self {
        Self { clamp: false }
    }

    /// Whether negative values are clamped after each step
    pub fn clamps(&self) -> bool {
        self.clamp
    }

    /// One step, returning the new state and the number of clamped values
    fn step<M: EpidemicModel>(&self, model: &M, state: &M::State, dt: f64) -> Result<(M::State, usize)> {
        let rates = model.rates(state)?;
        let mut next = state.linear_combination(&[(dt, &rates)]);

        let clamped = if self.clamp { next.clamp_non_negative() } else { 0 };
        Ok((next, clamped))
    }
}

impl Solver for ForwardEulerSolver {
    fn advance<M: EpidemicModel>(&self, model: &M, state: &M::State, dt: f64) -> Result<M::State> {
        let (next, _) = self.step(model, state, dt)?;
        Ok(next)
    }

    fn solve<M: EpidemicModel>(
        &self,
        scenario: &Scenario<M>,
        config: &SolverConfiguration,
    ) -> Result<SimulationResult<M::State>> {
        // ====== Step 1: Validation ======

        config.validate()?;
        scenario.validate()?;

        // Forward Euler is dedicated to fixed-step time evolution
        let (dt, time_steps) = match &config.solver_type {
            SolverType::TimeEvolution { time_step, time_steps } => (*time_step, *time_steps),
            other => {
                return Err(SimulationError::UnsupportedConfiguration {
                    solver: self.name(),
                    configuration: other.name(),
                });
            }
        };

        if let Some(limit) = scenario.model.stability_limit()
            && dt > limit
        {
            log::warn!(
                "{}: time step {} exceeds the explicit diffusion limit {:.6e}; expect oscillations",
                scenario.model.name(),
                dt,
                limit
            );
        }

        // ====== Step 2: Setup ======

        let interval = config.snapshot_interval;
        let recorded = time_steps / interval + 2;

        let mut state = scenario.initial_state.clone();
        let mut metrics = MetricsAccumulator::with_capacity(&state, time_steps);

        let mut time_points = Vec::with_capacity(recorded);
        let mut trajectory = Vec::with_capacity(recorded);
        time_points.push(0.0);
        trajectory.push(state.clone());

        let mut total_clamped = 0usize;
        let mut first_clamp = None;

        // ====== Step 3: Time Integration ======

        for step in 0..time_steps {
            // The whole update reads the step-n snapshot and writes a new buffer
            let (next, clamped) = self.step(&scenario.model, &state, dt)?;

            if clamped > 0 {
                log::debug!("step {}: clamped {} negative values", step + 1, clamped);
                total_clamped += clamped;
                first_clamp.get_or_insert(step + 1);
            }

            validate_state(&next, step + 1)?;

            // Calculate directly from index to avoid accumulating rounding errors
            let time = (step as f64 + 1.0) * dt;

            metrics.record(time, &next);
            state = next;
            if (step + 1) % interval == 0 || step + 1 == time_steps {
                time_points.push(time);
                trajectory.push(state.clone());
            }

            log::trace!("step {}/{} t = {}", step + 1, time_steps, time);
        }

        if let Some(first) = first_clamp {
            log::warn!(
                "{}: clamped {} negative values to zero (first at step {}); consider a smaller time step",
                scenario.model.name(),
                total_clamped,
                first
            );
        }

        // ====== Step 4: Build Result ======

        let mut result = SimulationResult::new(time_points, trajectory, state, metrics.finish());

        result.add_metadata("solver", self.name());
        result.add_metadata("model", scenario.model.name());
        result.add_metadata("time steps", &time_steps.to_string());
        result.add_metadata("dt", &dt.to_string());
        result.add_metadata("total time", &(dt * time_steps as f64).to_string());
        result.add_metadata("clamped values", &total_clamped.to_string());

        Ok(result)
    }

    fn name(&self) -> &'static str {
        "Forward Euler"
    }
}

// =================================================================================================
// Tests
// =================================================================================================
