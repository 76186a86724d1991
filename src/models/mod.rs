//! SEIRD epidemic models
//!
//! All models implement the [`EpidemicModel`](crate::physics::EpidemicModel) trait.
//! The solver calls `rates` at each stage. Models are responsible for the
//! dynamics (infection, progression, recovery, diffusion), the solver for
//! the time integration.
//!
//! # Available Models
//!
//! ## [`SpatialSeird`]: reaction–diffusion grid
//!
//! Five density fields over a rectangular grid with a 5-point Laplacian.
//! Advanced by fixed-step forward Euler with clamping.
//!
//! ## [`LumpedSeird`]: well-mixed population
//!
//! Five scalar counts with frequency-dependent incidence. Integrated by the
//! adaptive Dormand–Prince solver and resampled onto requested times.
//!
//! # Initial conditions
//!
//! [`SpatialInitialCondition`] builds the smoothed density split used by the
//! grid model, [`LumpedInitialCondition`] the literal counts of the lumped one.

// =================================================================================================
// Module Declarations
// =================================================================================================

pub mod initial;
pub mod lumped;
pub mod spatial;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use initial::{gaussian_filter, LumpedInitialCondition, SpatialInitialCondition};
pub use lumped::{LumpedSeird, DEFAULT_POPULATION_FLOOR};
pub use spatial::SpatialSeird;
