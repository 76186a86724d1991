//! Numerical solver traits and types
//!
//! # Design Philosophy
//!
//! - Central enum `SolverType` defines the kind of time integration
//! - `SolverConfiguration` carries the `SolverType` plus recording options
//! - `SimulationResult` holds the trajectory, the final state and the daily metrics
//! - Both models share one `Solver` trait, so a test harness can drive either

use crate::error::{Result, SimulationError};
use crate::metrics::DailyMetrics;
use crate::physics::{CompartmentState, EpidemicModel};
use crate::solver::Scenario;
use std::collections::HashMap;

// =================================================================================================
// Central Solver Type Enumeration
// =================================================================================================

/// Type of time integration
///
/// # Examples
///
/// ```rust
/// use seird_rs::solver::SolverType;
///
/// // Fixed-step evolution, 120 days with Δt = 1
/// let fixed = SolverType::TimeEvolution {
///     time_step: 1.0,
///     time_steps: 120,
/// };
/// assert!(fixed.validate().is_ok());
///
/// // Adaptive integration resampled at t = 0, 1, 2
/// let adaptive = SolverType::Adaptive {
///     t_start: 0.0,
///     t_end: 2.0,
///     evaluation_times: vec![0.0, 1.0, 2.0],
/// };
/// assert_eq!(adaptive.name(), "Adaptive");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum SolverType {
    /// Fixed number of steps of constant size
    ///
    /// Used by: forward Euler
    TimeEvolution {
        /// Step size Δt
        time_step: f64,
        /// Number of steps
        time_steps: usize,
    },

    /// Adaptive step size over `[t_start, t_end]`, output at `evaluation_times`
    ///
    /// Used by: Dormand–Prince
    Adaptive {
        /// Start of the integration interval
        t_start: f64,
        /// End of the integration interval
        t_end: f64,
        /// Strictly increasing output times inside the interval
        evaluation_times: Vec<f64>,
    },
}

impl SolverType {
    /// Get name identifier
    pub fn name(&self) -> &'static str {
        match self {
            SolverType::TimeEvolution { .. } => "TimeEvolution",
            SolverType::Adaptive { .. } => "Adaptive",
        }
    }

    /// Validate that parameters are meaningful
    pub fn validate(&self) -> Result<()> {
        match self {
            SolverType::TimeEvolution { time_step, time_steps } => {
                if !time_step.is_finite() || *time_step <= 0.0 {
                    return Err(SimulationError::invalid(
                        "time_step",
                        format!("must be positive and finite, got {}", time_step),
                    ));
                }
                if *time_steps == 0 {
                    return Err(SimulationError::invalid("time_steps", "must be greater than 0"));
                }
                Ok(())
            }
            SolverType::Adaptive { t_start, t_end, evaluation_times } => {
                if !t_start.is_finite() || !t_end.is_finite() || t_end <= t_start {
                    return Err(SimulationError::invalid(
                        "t_end",
                        format!("interval [{}, {}] must be finite and non-empty", t_start, t_end),
                    ));
                }
                if evaluation_times.is_empty() {
                    return Err(SimulationError::invalid("evaluation_times", "must not be empty"));
                }
                if evaluation_times
                    .iter()
                    .any(|t| !t.is_finite() || t < t_start || t > t_end)
                {
                    return Err(SimulationError::invalid(
                        "evaluation_times",
                        format!("every time must lie in [{}, {}]", t_start, t_end),
                    ));
                }
                if evaluation_times.windows(2).any(|pair| pair[1] <= pair[0]) {
                    return Err(SimulationError::invalid(
                        "evaluation_times",
                        "must be strictly increasing",
                    ));
                }
                Ok(())
            }
        }
    }
}

// =================================================================================================
// Solver configuration
// =================================================================================================

/// Configuration for numerical solver
///
/// # Examples
///
/// ```rust
/// use seird_rs::solver::SolverConfiguration;
///
/// let config = SolverConfiguration::time_evolution(0.01, 120).with_snapshot_interval(10);
/// assert!(config.validate().is_ok());
///
/// let config = SolverConfiguration::adaptive(0.0, 200.0, 201);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfiguration {
    /// Type of solver and its parameters
    pub solver_type: SolverType,

    /// Keep every n-th step in the trajectory (fixed-step solvers only)
    ///
    /// The initial and the final state are always kept.
    pub snapshot_interval: usize,
}

impl SolverConfiguration {
    /// Create a new configuration with a given solver type
    pub fn new(solver_type: SolverType) -> Self {
        Self {
            solver_type,
            snapshot_interval: 1,
        }
    }

    /// Create a fixed-step configuration
    pub fn time_evolution(time_step: f64, time_steps: usize) -> Self {
        Self::new(SolverType::TimeEvolution { time_step, time_steps })
    }

    /// Create an adaptive configuration with `points` evenly spaced output times
    ///
    /// With a single point the output is at `t_end`.
    pub fn adaptive(t_start: f64, t_end: f64, points: usize) -> Self {
        Self::new(SolverType::Adaptive {
            t_start,
            t_end,
            evaluation_times: linspace(t_start, t_end, points),
        })
    }

    /// Create an adaptive configuration with explicit output times
    pub fn adaptive_at(t_start: f64, t_end: f64, evaluation_times: Vec<f64>) -> Self {
        Self::new(SolverType::Adaptive { t_start, t_end, evaluation_times })
    }

    /// Change the trajectory recording interval
    pub fn with_snapshot_interval(mut self, interval: usize) -> Self {
        self.snapshot_interval = interval;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.snapshot_interval == 0 {
            return Err(SimulationError::invalid("snapshot_interval", "must be at least 1"));
        }
        self.solver_type.validate()
    }
}

/// `points` evenly spaced values over `[start, end]`, both ends included
pub fn linspace(start: f64, end: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![end],
        _ => {
            let step = (end - start) / (points - 1) as f64;
            (0..points)
                .map(|k| if k + 1 == points { end } else { start + step * k as f64 })
                .collect()
        }
    }
}

// =================================================================================================
// Simulation result
// =================================================================================================

/// Output of a solver run
#[derive(Clone, Debug)]
pub struct SimulationResult<S> {
    /// Time of every recorded state
    pub time_points: Vec<f64>,

    /// Recorded states, same length as `time_points`
    pub trajectory: Vec<S>,

    /// State at the end of the run
    pub final_state: S,

    /// Daily new infections, deaths and recoveries
    pub metrics: DailyMetrics,

    /// Free-form diagnostics (solver name, step counts…)
    pub metadata: HashMap<String, String>,
}

impl<S: CompartmentState> SimulationResult<S> {
    /// Create a result without metadata
    pub fn new(time_points: Vec<f64>, trajectory: Vec<S>, final_state: S, metrics: DailyMetrics) -> Self {
        Self {
            time_points,
            trajectory,
            final_state,
            metrics,
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata entry
    pub fn add_metadata(&mut self, key: &str, value: &str) {
        self.metadata.insert(key.to_string(), value.to_string());
    }

    /// Number of recorded states
    pub fn len(&self) -> usize {
        self.trajectory.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.trajectory.is_empty()
    }
}

// =================================================================================================
// Solver trait
// =================================================================================================

/// Time integrator
///
/// # Responsibility
/// Advances a model's state in time. Knows nothing about epidemiology beyond
/// the [`CompartmentState`] arithmetic.
pub trait Solver {
    /// Advance `state` by `dt`
    fn advance<M: EpidemicModel>(&self, model: &M, state: &M::State, dt: f64) -> Result<M::State>;

    /// Run a whole scenario under `config`
    fn solve<M: EpidemicModel>(
        &self,
        scenario: &Scenario<M>,
        config: &SolverConfiguration,
    ) -> Result<SimulationResult<M::State>>;

    /// Solver name
    fn name(&self) -> &'static str;
}

// =================================================================================================
// Tests
// =================================================================================================
