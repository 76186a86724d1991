//! Dormand–Prince 5(4) adaptive solver
//!
//! # Mathematical Background
//!
//! An embedded explicit Runge–Kutta pair: seven stages give a fifth-order
//! solution (used to advance, "local extrapolation") and a fourth-order one
//! whose difference estimates the local error.
//!
//! ```text
//! k₁ = f(yₙ)                                    (= k₇ of the previous step, FSAL)
//! k₂ = f(yₙ + h·a₂₁k₁)
//! …
//! k₆ = f(yₙ + h·(a₆₁k₁ + … + a₆₅k₅))
//! yₙ₊₁ = yₙ + h·(b₁k₁ + b₃k₃ + b₄k₄ + b₅k₅ + b₆k₆)
//! k₇ = f(yₙ₊₁)
//! err = h·Σ eᵢkᵢ
//! ```
//!
//! # Step size control
//!
//! ```text
//! ‖err‖ = rms( errᵢ / (atol + rtol·max(|yₙ,ᵢ|, |yₙ₊₁,ᵢ|)) )
//! accept when ‖err‖ ≤ 1
//! h ← h · clamp(0.9·‖err‖^(−1/5), 0.2, 5)     (growth capped at 1 right after a rejection)
//! ```
//!
//! # Output
//!
//! Requested times are served by cubic Hermite interpolation over the
//! accepted step that contains them, using the end values and slopes the
//! pair already computed. The interpolant is exact at step nodes, so a
//! requested time that coincides with `t_end` returns the integrated state.
//!
//! # Characteristics
//!
//! - **Order**: 5 (advancing), 4 (embedded)
//! - **Cost**: 6 right-hand side evaluations per attempted step (FSAL)
//! - **Use**: non-stiff ODEs where accuracy matters; the lumped SEIRD model
//!
//! # Example
//!
//! ```rust
//! use seird_rs::models::{LumpedInitialCondition, LumpedSeird};
//! use seird_rs::physics::{CompartmentState, ParameterSet};
//! use seird_rs::solver::{DormandPrinceSolver, Scenario, Solver, SolverConfiguration, Tolerance};
//!
//! let model = LumpedSeird::new(ParameterSet::default()).unwrap();
//! let scenario = Scenario::new(model, LumpedInitialCondition::default().build().unwrap());
//!
//! let solver = DormandPrinceSolver::with_tolerance(Tolerance { rtol: 1e-8, ..Default::default() });
//! let result = solver.solve(&scenario, &SolverConfiguration::adaptive(0.0, 200.0, 200)).unwrap();
//!
//! let total = result.final_state.totals().total();
//! assert!((total - 1000.0).abs() < 1e-6);
//! ```

use crate::error::{Result, SimulationError};
use crate::metrics::MetricsAccumulator;
use crate::physics::{CompartmentState, EpidemicModel};
use crate::solver::{
    validate_state, Scenario, SimulationResult, Solver, SolverConfiguration, SolverType,
};
use serde::{Deserialize, Serialize};

// =================================================================================================
// Butcher tableau
// =================================================================================================

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// 5th-order weights (advancing solution)
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// 4th-order weights (embedded)
const BS1: f64 = 5179.0 / 57600.0;
const BS3: f64 = 7571.0 / 16695.0;
const BS4: f64 = 393.0 / 640.0;
const BS5: f64 = -92097.0 / 339200.0;
const BS6: f64 = 187.0 / 2100.0;
const BS7: f64 = 1.0 / 40.0;

// Error = y5 - y4
const E1: f64 = B1 - BS1;
const E3: f64 = B3 - BS3;
const E4: f64 = B4 - BS4;
const E5: f64 = B5 - BS5;
const E6: f64 = B6 - BS6;
const E7: f64 = -BS7;

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;

// =================================================================================================
// Tolerance
// =================================================================================================

/// Error control settings
///
/// Defaults: `rtol = 1e-6`, `atol = 1e-9`, automatic initial step,
/// `min_step = 1e-12`, unbounded `max_step`, `max_steps = 100 000`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tolerance {
    /// Relative tolerance
    pub rtol: f64,
    /// Absolute tolerance
    pub atol: f64,
    /// First step size; `None` picks 1/1000 of the interval
    pub initial_step: Option<f64>,
    /// Smallest step before giving up
    pub min_step: f64,
    /// Largest step allowed
    pub max_step: f64,
    /// Largest number of attempted steps
    pub max_steps: usize,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            rtol: 1e-6,
            atol: 1e-9,
            initial_step: None,
            min_step: 1e-12,
            max_step: f64::INFINITY,
            max_steps: 100_000,
        }
    }
}

impl Tolerance {
    /// Check every setting is usable
    pub fn validate(&self) -> Result<()> {
        if !self.rtol.is_finite() || self.rtol <= 0.0 {
            return Err(SimulationError::invalid("rtol", format!("must be finite and > 0, got {}", self.rtol)));
        }
        if !self.atol.is_finite() || self.atol <= 0.0 {
            return Err(SimulationError::invalid("atol", format!("must be finite and > 0, got {}", self.atol)));
        }
        if let Some(h0) = self.initial_step
            && (!h0.is_finite() || h0 <= 0.0)
        {
            return Err(SimulationError::invalid("initial_step", format!("must be finite and > 0, got {}", h0)));
        }
        if !self.min_step.is_finite() || self.min_step <= 0.0 {
            return Err(SimulationError::invalid("min_step", format!("must be finite and > 0, got {}", self.min_step)));
        }
        if self.max_step.is_nan() || self.max_step < self.min_step {
            return Err(SimulationError::invalid(
                "max_step",
                format!("must be at least min_step ({}), got {}", self.min_step, self.max_step),
            ));
        }
        if self.max_steps == 0 {
            return Err(SimulationError::invalid("max_steps", "must be > 0"));
        }
        Ok(())
    }

    fn first_step(&self, span: f64) -> f64 {
        self.initial_step
            .unwrap_or(span * 1e-3)
            .max(self.min_step)
            .min(self.max_step)
            .min(span)
    }
}

// =================================================================================================
// Integration output
// =================================================================================================

/// States at the requested times plus step statistics
#[derive(Debug, Clone)]
pub struct Integration<S> {
    /// One state per requested time
    pub outputs: Vec<S>,
    /// State at the end of the interval
    pub final_state: S,
    /// Accepted steps
    pub accepted_steps: usize,
    /// Rejected steps
    pub rejected_steps: usize,
    /// Right-hand side evaluations
    pub evaluations: usize,
}

// =================================================================================================
// Dormand–Prince Solver
// =================================================================================================

/// Adaptive Dormand–Prince 5(4) solver
///
/// Accepts both configuration types: `Adaptive` resamples onto the requested
/// evaluation times, `TimeEvolution` reports every multiple of the step
/// while still choosing its internal steps adaptively.
#[derive(Debug, Clone, Copy, Default)]
pub struct DormandPrinceSolver {
    tolerance: Tolerance,
}

impl DormandPrinceSolver {
    /// Create a solver with default tolerances
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a solver with explicit tolerances
    pub fn with_tolerance(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }

    /// Tolerances in use
    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    /// Integrate from `t_start` to `t_end` and sample at `times`
    ///
    /// `times` must be strictly increasing inside `[t_start, t_end]`.
    ///
    /// # Errors
    ///
    /// - Invalid tolerances or interval
    /// - [`SimulationError::MaxStepsExceeded`] / [`SimulationError::StepSizeUnderflow`]
    /// - any error of the model's right-hand side
    /// - [`SimulationError::NonFinite`] when an accepted step holds NaN/Inf
    pub fn integrate<M: EpidemicModel>(
        &self,
        model: &M,
        initial: &M::State,
        t_start: f64,
        t_end: f64,
        times: &[f64],
    ) -> Result<Integration<M::State>> {
        let tol = &self.tolerance;
        tol.validate()?;

        if !t_start.is_finite() || !t_end.is_finite() || t_end < t_start {
            return Err(SimulationError::invalid(
                "t_end",
                format!("interval [{}, {}] must be finite and ordered", t_start, t_end),
            ));
        }

        let mut outputs = Vec::with_capacity(times.len());
        let mut next_output = 0;

        let mut t = t_start;
        let mut y = initial.clone();
        let mut f = model.rates(&y)?;
        let mut evaluations = 1;

        while next_output < times.len() && times[next_output] <= t {
            outputs.push(y.clone());
            next_output += 1;
        }

        let mut h = tol.first_step(t_end - t_start);
        let mut accepted_steps = 0;
        let mut rejected_steps = 0;
        let mut previous_rejected = false;

        while t < t_end {
            if accepted_steps + rejected_steps >= tol.max_steps {
                return Err(SimulationError::MaxStepsExceeded {
                    max_steps: tol.max_steps,
                    time: t,
                    target: t_end,
                });
            }

            // Snap the last step onto t_end
            let last = t + h >= t_end;
            let step = if last { t_end - t } else { h };

            // ====== Stages ======

            let k1 = &f;
            let k2 = model.rates(&y.linear_combination(&[(step * A21, k1)]))?;
            let k3 = model.rates(&y.linear_combination(&[(step * A31, k1), (step * A32, &k2)]))?;
            let k4 = model.rates(&y.linear_combination(&[
                (step * A41, k1),
                (step * A42, &k2),
                (step * A43, &k3),
            ]))?;
            let k5 = model.rates(&y.linear_combination(&[
                (step * A51, k1),
                (step * A52, &k2),
                (step * A53, &k3),
                (step * A54, &k4),
            ]))?;
            let k6 = model.rates(&y.linear_combination(&[
                (step * A61, k1),
                (step * A62, &k2),
                (step * A63, &k3),
                (step * A64, &k4),
                (step * A65, &k5),
            ]))?;

            // 5th-order solution (local extrapolation)
            let y_new = y.linear_combination(&[
                (step * B1, k1),
                (step * B3, &k3),
                (step * B4, &k4),
                (step * B5, &k5),
                (step * B6, &k6),
            ]);

            // Stage 7 (FSAL: first same as last)
            let k7 = model.rates(&y_new)?;
            evaluations += 6;

            let error = k1.scale(step * E1).linear_combination(&[
                (step * E3, &k3),
                (step * E4, &k4),
                (step * E5, &k5),
                (step * E6, &k6),
                (step * E7, &k7),
            ]);
            let error_norm = error.error_norm(&y, &y_new, tol.atol, tol.rtol);

            if error_norm <= 1.0 {
                // ====== Accept ======

                let t_new = if last { t_end } else { t + step };

                while next_output < times.len() && times[next_output] <= t_new {
                    let theta = (times[next_output] - t) / step;
                    outputs.push(hermite(&y, &f, &y_new, &k7, step, theta));
                    next_output += 1;
                }

                accepted_steps += 1;
                validate_state(&y_new, accepted_steps)?;

                log::trace!("accepted h = {:.3e} at t = {:.6}, error {:.3e}", step, t_new, error_norm);

                t = t_new;
                y = y_new;
                f = k7;

                let mut factor = if error_norm == 0.0 {
                    MAX_FACTOR
                } else {
                    (SAFETY * error_norm.powf(-0.2)).clamp(MIN_FACTOR, MAX_FACTOR)
                };
                if previous_rejected {
                    factor = factor.min(1.0);
                }
                previous_rejected = false;

                h = (step * factor).max(tol.min_step).min(tol.max_step);
            } else {
                // ====== Reject ======

                rejected_steps += 1;
                previous_rejected = true;

                // A NaN norm (overflowing stage) shrinks as hard as possible
                let factor = if error_norm.is_finite() {
                    (SAFETY * error_norm.powf(-0.2)).clamp(MIN_FACTOR, 1.0)
                } else {
                    MIN_FACTOR
                };

                h = step * factor;
                if h < tol.min_step {
                    return Err(SimulationError::StepSizeUnderflow { step_size: h, time: t });
                }

                log::trace!("rejected h = {:.3e} at t = {:.6}, error {:.3e}", step, t, error_norm);
            }
        }

        // Requested times at t_end served by the last accepted step; anything left is
        // only possible when t_start == t_end.
        while next_output < times.len() {
            outputs.push(y.clone());
            next_output += 1;
        }

        log::debug!(
            "Dormand-Prince: {} accepted, {} rejected, {} evaluations",
            accepted_steps,
            rejected_steps,
            evaluations
        );

        Ok(Integration {
            outputs,
            final_state: y,
            accepted_steps,
            rejected_steps,
            evaluations,
        })
    }
}

/// Cubic Hermite interpolant over one step, θ ∈ [0, 1]
fn hermite<S: CompartmentState>(y0: &S, f0: &S, y1: &S, f1: &S, step: f64, theta: f64) -> S {
    let theta2 = theta * theta;
    let theta3 = theta2 * theta;

    let h00 = 2.0 * theta3 - 3.0 * theta2 + 1.0;
    let h10 = theta3 - 2.0 * theta2 + theta;
    let h01 = -2.0 * theta3 + 3.0 * theta2;
    let h11 = theta3 - theta2;

    y0.scale(h00)
        .linear_combination(&[(step * h10, f0), (h01, y1), (step * h11, f1)])
}

impl Solver for DormandPrinceSolver {
    fn advance<M: EpidemicModel>(&self, model: &M, state: &M::State, dt: f64) -> Result<M::State> {
        let integration = self.integrate(model, state, 0.0, dt, &[])?;
        Ok(integration.final_state)
    }

    fn solve<M: EpidemicModel>(
        &self,
        scenario: &Scenario<M>,
        config: &SolverConfiguration,
    ) -> Result<SimulationResult<M::State>> {
        // ====== Step 1: Validation ======

        config.validate()?;
        scenario.validate()?;

        let initial = &scenario.initial_state;

        // ====== Step 2: Integration ======

        let (time_points, trajectory, final_state, integration_stats, metrics) = match &config.solver_type {
            SolverType::Adaptive { t_start, t_end, evaluation_times } => {
                let integration = self.integrate(&scenario.model, initial, *t_start, *t_end, evaluation_times)?;

                // One metrics entry per evaluation time, the first relative to the initial state
                let mut metrics = MetricsAccumulator::with_capacity(initial, evaluation_times.len());
                for (time, state) in evaluation_times.iter().zip(&integration.outputs) {
                    metrics.record(*time, state);
                }

                (
                    evaluation_times.clone(),
                    integration.outputs,
                    integration.final_state,
                    (integration.accepted_steps, integration.rejected_steps, integration.evaluations),
                    metrics.finish(),
                )
            }
            SolverType::TimeEvolution { time_step, time_steps } => {
                let dt = *time_step;
                let steps = *time_steps;
                let times: Vec<f64> = (1..=steps).map(|k| k as f64 * dt).collect();
                let t_end = steps as f64 * dt;

                let integration = self.integrate(&scenario.model, initial, 0.0, t_end, &times)?;

                let mut metrics = MetricsAccumulator::with_capacity(initial, steps);
                let mut time_points = vec![0.0];
                let mut trajectory = vec![initial.clone()];

                for (index, (time, state)) in times.iter().zip(&integration.outputs).enumerate() {
                    metrics.record(*time, state);
                    if (index + 1) % config.snapshot_interval == 0 || index + 1 == steps {
                        time_points.push(*time);
                        trajectory.push(state.clone());
                    }
                }

                (
                    time_points,
                    trajectory,
                    integration.final_state,
                    (integration.accepted_steps, integration.rejected_steps, integration.evaluations),
                    metrics.finish(),
                )
            }
        };

        // ====== Step 3: Build Result ======

        let (accepted, rejected, evaluations) = integration_stats;
        let mut result = SimulationResult::new(time_points, trajectory, final_state, metrics);

        result.add_metadata("solver", self.name());
        result.add_metadata("model", scenario.model.name());
        result.add_metadata("rtol", &self.tolerance.rtol.to_string());
        result.add_metadata("atol", &self.tolerance.atol.to_string());
        result.add_metadata("accepted steps", &accepted.to_string());
        result.add_metadata("rejected steps", &rejected.to_string());
        result.add_metadata("evaluations", &evaluations.to_string());

        Ok(result)
    }

    fn name(&self) -> &'static str {
        "Dormand-Prince 5(4)"
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{Compartment, CompartmentVector};

    /// dy/dt = -k * y for every compartment
    struct ExponentialDecay {
        decay_rate: f64,
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

    /// Rotation in the (S, E) plane: S'' = -S
    struct HarmonicOscillator;

    impl EpidemicModel for HarmonicOscillator {
        type State = CompartmentVector;

        fn rates(&self, state: &CompartmentVector) -> Result<CompartmentVector> {
            Ok(CompartmentVector::new(
                state.get(Compartment::Exposed),
                -state.get(Compartment::Susceptible),
                0.0,
                0.0,
                0.0,
            ))
        }

        fn name(&self) -> &str {
            "Harmonic Oscillator"
        }
    }

    fn unit_state() -> CompartmentVector {
        CompartmentVector::new(1.0, 1.0, 1.0, 1.0, 1.0)
    }

    #[test]
    fn test_coefficients_are_consistent() {
        // Each row of A sums to its node c
        assert!((A21 - 0.2).abs() < 1e-15);
        assert!((A31 + A32 - 0.3).abs() < 1e-15);
        assert!((A41 + A42 + A43 - 0.8).abs() < 1e-14);
        assert!((A51 + A52 + A53 + A54 - 8.0 / 9.0).abs() < 1e-13);
        assert!((A61 + A62 + A63 + A64 + A65 - 1.0).abs() < 1e-13);

        // Both weight sets are consistent, the error weights cancel
        assert!((B1 + B3 + B4 + B5 + B6 - 1.0).abs() < 1e-14);
        assert!((BS1 + BS3 + BS4 + BS5 + BS6 + BS7 - 1.0).abs() < 1e-14);
        assert!((E1 + E3 + E4 + E5 + E6 + E7).abs() < 1e-14);
    }

    #[test]
    fn test_tolerance_validation() {
        assert!(Tolerance::default().validate().is_ok());
        assert!(Tolerance { rtol: 0.0, ..Default::default() }.validate().is_err());
        assert!(Tolerance { atol: -1.0, ..Default::default() }.validate().is_err());
        assert!(Tolerance { max_steps: 0, ..Default::default() }.validate().is_err());
        assert!(Tolerance { initial_step: Some(0.0), ..Default::default() }.validate().is_err());
    }

    #[test]
    fn test_exponential_decay_accuracy() {
        let solver = DormandPrinceSolver::new();
        let model = ExponentialDecay { decay_rate: 1.0 };
        let times = [0.0, 0.5, 1.0, 2.0];

        let integration = solver.integrate(&model, &unit_state(), 0.0, 2.0, &times).unwrap();

        assert_eq!(integration.outputs.len(), 4);
        for (time, state) in times.iter().zip(&integration.outputs) {
            let exact = (-time).exp();
            assert!((state.get(Compartment::Infected) - exact).abs() < 1e-5, "t = {time}");
        }
        assert!(integration.rejected_steps <= integration.accepted_steps);
    }

    #[test]
    fn test_final_output_is_step_node() {
        let solver = DormandPrinceSolver::new();
        let model = ExponentialDecay { decay_rate: 0.3 };

        let integration = solver.integrate(&model, &unit_state(), 0.0, 3.0, &[3.0]).unwrap();
        assert_eq!(integration.outputs[0], integration.final_state);
    }

    #[test]
    fn test_harmonic_oscillator_period() {
        let solver = DormandPrinceSolver::with_tolerance(Tolerance {
            rtol: 1e-9,
            atol: 1e-12,
            ..Default::default()
        });
        let period = 2.0 * std::f64::consts::PI;
        let initial = CompartmentVector::new(1.0, 0.0, 0.0, 0.0, 0.0);

        let result = solver.advance(&HarmonicOscillator, &initial, period).unwrap();

        assert!((result.get(Compartment::Susceptible) - 1.0).abs() < 1e-6);
        assert!(result.get(Compartment::Exposed).abs() < 1e-6);
    }

    #[test]
    fn test_max_steps_is_honoured() {
        let solver = DormandPrinceSolver::with_tolerance(Tolerance {
            max_step: 1e-3,
            max_steps: 10,
            ..Default::default()
        });
        let model = ExponentialDecay { decay_rate: 1.0 };

        let result = solver.integrate(&model, &unit_state(), 0.0, 1.0, &[1.0]);
        assert!(matches!(result, Err(SimulationError::MaxStepsExceeded { max_steps: 10, .. })));
    }

    #[test]
    fn test_adaptive_solve_records_every_evaluation_time() {
        let scenario = Scenario::new(ExponentialDecay { decay_rate: 0.1 }, unit_state());
        let config = SolverConfiguration::adaptive(0.0, 10.0, 11);

        let result = DormandPrinceSolver::new().solve(&scenario, &config).unwrap();

        assert_eq!(result.time_points.len(), 11);
        assert_eq!(result.trajectory.len(), 11);
        assert_eq!(result.metrics.len(), 11);
        // t = 0 is the initial state itself
        assert_eq!(result.metrics.new_infections[0], 0.0);
        assert!(result.metrics.new_infections[1] < 0.0);
    }

    #[test]
    fn test_time_evolution_configuration_is_accepted() {
        let scenario = Scenario::new(ExponentialDecay { decay_rate: 1.0 }, unit_state());
        let config = SolverConfiguration::time_evolution(0.1, 10);

        let result = DormandPrinceSolver::new().solve(&scenario, &config).unwrap();

        assert_eq!(result.time_points.len(), 11);
        assert_eq!(result.metrics.len(), 10);
        let value = result.final_state.get(Compartment::Recovered);
        assert!((value - (-1.0f64).exp()).abs() < 1e-5);
    }

    #[test]
    fn test_deterministic() {
        let scenario = Scenario::new(HarmonicOscillator, CompartmentVector::new(1.0, 0.0, 0.0, 0.0, 0.0));
        let config = SolverConfiguration::adaptive(0.0, 5.0, 21);
        let solver = DormandPrinceSolver::new();

        let first = solver.solve(&scenario, &config).unwrap();
        let second = solver.solve(&scenario, &config).unwrap();

        assert_eq!(first.trajectory, second.trajectory);
    }
}
