//! Error types for simulation runs
//!
//! Every failure is local to one run: there is no retry and no partial
//! recovery, a failed run is reported as failed.

use crate::physics::Compartment;

/// Errors raised while configuring or running a simulation
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// A configuration value is out of its admissible range
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter
        name: &'static str,
        /// Human readable explanation
        reason: String,
    },

    /// The living population S+E+I+R collapsed, the force of infection is undefined
    #[error("degenerate population: living population {population} is at or below {floor}")]
    DegeneratePopulation {
        /// Living population at the failing evaluation
        population: f64,
        /// Configured floor
        floor: f64,
    },

    /// NaN or Inf appeared in a compartment
    #[error("non-finite value in {compartment} at step {step}; reduce the time step or check the rates")]
    NonFinite {
        /// First compartment found with a non-finite value
        compartment: Compartment,
        /// Step (or accepted step) index
        step: usize,
    },

    /// The adaptive integrator ran out of steps
    #[error("maximum number of steps ({max_steps}) exceeded at t = {time:.6e} before reaching t = {target:.6e}")]
    MaxStepsExceeded {
        /// Configured limit
        max_steps: usize,
        /// Time reached
        time: f64,
        /// Time requested
        target: f64,
    },

    /// The adaptive integrator needed a step below the configured minimum
    #[error("step size {step_size:.3e} fell below the minimum at t = {time:.6e}")]
    StepSizeUnderflow {
        /// Rejected step size
        step_size: f64,
        /// Time reached
        time: f64,
    },

    /// A solver was handed a configuration it does not implement
    #[error("{solver} does not support {configuration} configuration")]
    UnsupportedConfiguration {
        /// Solver name
        solver: &'static str,
        /// Configuration name
        configuration: &'static str,
    },

    /// Array shapes disagree
    #[error("shape mismatch: expected {expected:?}, got {found:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: (usize, usize),
        /// Shape found
        found: (usize, usize),
    },

    /// Configuration file could not be read
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl SimulationError {
    /// Shorthand for [`SimulationError::InvalidParameter`]
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, SimulationError>;
