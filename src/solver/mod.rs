//! Numerical solvers
//!
//! This module provides traits and implementations for time integrators.
//! A solver applies a numerical method to the equations provided by an
//! epidemic model within a specific scenario.
//!
//! # Core Concepts
//!
//! ## The Architecture (WHAT vs HOW)
//!
//! 1. **Scenario** (`Scenario`) - WHAT to solve
//!    - Epidemic model (equations, boundary closure)
//!    - Initial state
//!
//! 2. **Configuration** (`SolverConfiguration`) - HOW to solve
//!    - Solver type (fixed-step or adaptive)
//!    - Step size and count, or interval and output times
//!
//! 3. **Solver** (`Solver` trait) - The numerical method
//!    - Applies the numerical scheme
//!    - Records the trajectory and the daily metrics
//!    - Independent of epidemiology
//!
//! # Module Organization
//!
//! - **`traits`**: `Solver`, `SolverType`, `SolverConfiguration`, `SimulationResult`
//! - **`boundary`**: `BoundaryCondition` and the 5-point Laplacian
//! - **`scenario`**: `Scenario` (model + initial state)
//! - **`methods`**: `ForwardEulerSolver`, `DormandPrinceSolver`
//!
//! # Quick Start Example
//!
//! ```rust
//! use seird_rs::models::{LumpedInitialCondition, LumpedSeird};
//! use seird_rs::physics::ParameterSet;
//! use seird_rs::solver::{DormandPrinceSolver, Scenario, Solver, SolverConfiguration};
//!
//! // 1. Create scenario (WHAT to solve)
//! let model = LumpedSeird::new(ParameterSet::default()).unwrap();
//! let initial = LumpedInitialCondition::default().build().unwrap();
//! let scenario = Scenario::new(model, initial);
//!
//! // 2. Create configuration (HOW to solve)
//! let config = SolverConfiguration::adaptive(0.0, 200.0, 200);
//!
//! // 3. Solve
//! let result = DormandPrinceSolver::new().solve(&scenario, &config).unwrap();
//! assert_eq!(result.time_points.len(), 200);
//! ```
//!
//! # Workflow Diagram
//!
//! ```text
//! ┌─────────────────┐
//! │ Epidemic Model  │  (equations)
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │ Scenario        │ ← WHAT to solve
//! │ (model + y₀)    │
//! └────────┬────────┘
//!          │
//! ┌────────▼─────────────┐
//! │ Solver Configuration │ ← HOW to solve
//! └────────┬─────────────┘
//!          │
//! ┌────────▼────────┐
//! │ Numerical Solver│ ← The method
//! │ (Euler, DOPRI)  │
//! └────────┬────────┘
//!          │
//! ┌────────▼──────────────────┐
//! │ Simulation Result         │ ← The solution
//! │ (trajectory + metrics)    │
//! └───────────────────────────┘
//! ```
//!
//! # Time Step Selection
//!
//! The grid model is explicit: keep the diffusion number
//! `ν·Δt·(1/hx² + 1/hy²)` at or below 1/2 and `rate·Δt` well below 1.
//! Neither is enforced; the Euler solver logs a warning when the diffusion
//! number is exceeded and clamps negative values after every step.
//!
//! # Error Handling
//!
//! Every solver method returns [`crate::Result`]. Common errors:
//! - Invalid configuration (non-positive step, zero steps, empty output grid)
//! - Numerical instability (NaN/Inf in a compartment)
//! - Degenerate population in the lumped model
//! - Adaptive integrator exhausted (`max_steps`, minimum step size)

// =================================================================================================
// Module Declarations
// =================================================================================================
pub mod boundary;
pub mod methods;
mod scenario;
mod traits;

// =================================================================================================
// Parallel Execution Threshold
// =================================================================================================
//
// Deciding *when* to hand work off to Rayon is a numerical-execution concern,
// not an epidemiological one.  It therefore lives here (solver) rather than in
// the models.
//
// The threshold is stored in an AtomicUsize so that it can be changed at
// runtime (useful in benchmarks and tests) without requiring a mutex on every
// `rates()` call.  Relaxed ordering is sufficient: the value is a
// performance hint, not a synchronisation point.
// =================================================================================================

use std::sync::atomic::{AtomicUsize, Ordering};

/// Default number of grid cells above which the per-cell kernel of
/// [`SpatialSeird`](crate::models::SpatialSeird) switches to parallel iteration.
///
/// Below roughly 1 000 cells the overhead of Rayon's thread-pool dispatch
/// outweighs the per-cell work of one SEIRD update.
const DEFAULT_PARALLEL_THRESHOLD: usize = 999;

/// Runtime-configurable parallel-execution threshold.
///
/// Read via [`parallel_threshold()`], written via [`set_parallel_threshold()`].
static PARALLEL_THRESHOLD: AtomicUsize = AtomicUsize::new(DEFAULT_PARALLEL_THRESHOLD);

/// Return the current parallel-execution threshold.
///
/// Per-cell kernels run sequentially when the grid has fewer cells than this
/// value, and switch to Rayon when it has more, but only when the crate is
/// compiled with the `parallel` feature.
///
/// # Example
///
/// ```rust
/// use seird_rs::solver::parallel_threshold;
///
/// assert!(parallel_threshold() > 0);
/// ```
pub fn parallel_threshold() -> usize {
    PARALLEL_THRESHOLD.load(Ordering::Relaxed)
}

/// Set the parallel-execution threshold to a new value.
///
/// # Panics
///
/// Panics when `threshold == 0`.  A zero-cell threshold would force
/// parallel dispatch even for an empty grid, which is never the intended
/// behaviour.
///
/// # Example
///
/// ```rust
/// use seird_rs::solver::{parallel_threshold, set_parallel_threshold};
///
/// let previous = parallel_threshold();
/// set_parallel_threshold(2048);
/// assert_eq!(parallel_threshold(), 2048);
///
/// // Restore so other tests are not affected.
/// set_parallel_threshold(previous);
/// ```
pub fn set_parallel_threshold(threshold: usize) {
    assert!(threshold > 0, "parallel threshold must be at least 1");
    PARALLEL_THRESHOLD.store(threshold, Ordering::Relaxed);
}

/// RAII guard that saves the current threshold on construction and restores
/// it on drop.
///
/// Only compiled in test builds.  Guards taken with [`save`](Self::save)
/// also hold a process-wide lock, so tests that change the threshold run one
/// at a time and never observe each other's value.
///
/// ```rust,ignore
/// let _guard = crate::solver::ThresholdGuard::save(50);
/// // threshold is now 50 …
/// // … and is automatically restored when _guard is dropped.
/// ```
#[cfg(test)]
pub(crate) struct ThresholdGuard {
    previous: usize,
    _lock: Option<std::sync::MutexGuard<'static, ()>>,
}

#[cfg(test)]
static THRESHOLD_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
impl ThresholdGuard {
    /// Set the threshold to `new_value` and return a guard that will
    /// restore the previous value on drop.
    pub(crate) fn save(new_value: usize) -> Self {
        // A test that panicked while holding the lock has already restored its value.
        let lock = THRESHOLD_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let previous = parallel_threshold();
        set_parallel_threshold(new_value);
        Self {
            previous,
            _lock: Some(lock),
        }
    }

    /// Same as `save` without taking the lock; only valid under an outer guard.
    fn nested(new_value: usize) -> Self {
        let previous = parallel_threshold();
        set_parallel_threshold(new_value);
        Self { previous, _lock: None }
    }
}

#[cfg(test)]
impl Drop for ThresholdGuard {
    fn drop(&mut self) {
        // Bypass the public setter so that restoring to any value (including
        // the built-in default) never panics.
        PARALLEL_THRESHOLD.store(self.previous, Ordering::Relaxed);
    }
}

// =================================================================================================
// Per-cell Assembly
// =================================================================================================

/// Evaluate `kernel` for every cell index `0..cells`, in index order
///
/// The same kernel runs on both paths: Rayon when the `parallel` feature is
/// compiled in and `cells` exceeds [`parallel_threshold()`], a plain loop
/// otherwise. `collect()` keeps index order, so both paths give identical
/// results.
pub(crate) fn map_cells<T, F>(cells: usize, kernel: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        if cells > parallel_threshold() {
            use rayon::prelude::*;

            return (0..cells).into_par_iter().map(kernel).collect();
        }
    }

    // Below threshold (or parallel feature not compiled in): sequential.
    (0..cells).map(kernel).collect()
}

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use traits::{linspace, SimulationResult, Solver, SolverConfiguration, SolverType};

pub use boundary::{laplacian, BoundaryCondition};
pub use scenario::Scenario;

pub use methods::{DormandPrinceSolver, ForwardEulerSolver, Tolerance};

// =================================================================================================
// Helper Functions
// =================================================================================================

use crate::error::{Result, SimulationError};
use crate::physics::CompartmentState;

/// Validate a state for numerical issues
///
/// Checks that the state does not contain NaN or Inf values, which would
/// indicate numerical instability (time step too large for the rates or the
/// diffusion number).
///
/// # Arguments
///
/// * `state` - State to validate
/// * `step` - Current step (for error reporting)
///
/// # Example
///
/// ```rust,ignore
/// validate_state(&state, 42)?;  // Validates state at step 42
/// ```
pub(crate) fn validate_state<S: CompartmentState>(state: &S, step: usize) -> Result<()> {
    match state.first_non_finite() {
        Some(compartment) => Err(SimulationError::NonFinite { compartment, step }),
        None => Ok(()),
    }
}

// =================================================================================================
// Tests
// =================================================================================================
