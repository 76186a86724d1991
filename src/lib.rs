//! seird-rs: SEIRD Epidemic Simulation Framework
//!
//! Compartmental epidemic simulation (Susceptible, Exposed, Infected,
//! Recovered, Deceased) in two forms:
//!
//! - a **reaction–diffusion model** on a 2D grid, advanced by fixed-step
//!   forward Euler with a 5-point Laplacian;
//! - a **lumped ODE model** integrated by the adaptive Dormand–Prince 5(4)
//!   scheme and resampled onto a requested time grid.
//!
//! Both produce daily metrics (new infections, deaths and recoveries) that
//! can be exported to CSV or JSON.
//!
//! # Architecture
//!
//! 1. **Separation of dynamics and numerics**
//!    - Models define right-hand sides ([`physics::EpidemicModel`])
//!    - Solvers integrate them ([`solver::Solver`])
//!
//! 2. **One state vocabulary**
//!    - [`physics::CompartmentVector`] for a single population
//!    - [`physics::CompartmentField`] for a grid
//!    - both implement [`physics::CompartmentState`], so either solver can
//!      drive either model
//!
//! # Quick Start
//!
//! ```rust
//! use seird_rs::prelude::*;
//!
//! # fn main() -> seird_rs::Result<()> {
//! // 1. Model and initial state
//! let model = LumpedSeird::new(ParameterSet::default())?;
//! let initial = LumpedInitialCondition::default().build()?;
//! let scenario = Scenario::new(model, initial);
//!
//! // 2. Solver configuration: days 0..200 at 200 uniform samples
//! let config = SolverConfiguration::adaptive(0.0, 200.0, 200);
//!
//! // 3. Run
//! let result = DormandPrinceSolver::new().solve(&scenario, &config)?;
//!
//! // 4. Results
//! assert_eq!(result.time_points.len(), 200);
//! assert_eq!(result.metrics.len(), 200);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`physics`]: compartments, parameters, grid, state containers
//! - [`models`]: spatial and lumped SEIRD, initial conditions
//! - [`solver`]: forward Euler, Dormand–Prince, boundary closures
//! - [`metrics`]: daily increments
//! - [`config`]: TOML run configuration
//! - [`output`]: CSV and JSON export

pub mod error;
pub mod physics;

pub mod models;
pub mod solver;

pub mod config;
pub mod metrics;
pub mod output;

pub use error::{Result, SimulationError};

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust
    //! use seird_rs::prelude::*;
    //! ```
    pub use crate::error::{Result, SimulationError};
    pub use crate::metrics::DailyMetrics;
    pub use crate::models::{LumpedInitialCondition, LumpedSeird, SpatialInitialCondition, SpatialSeird};
    pub use crate::physics::{
        Compartment, CompartmentField, CompartmentState, CompartmentVector, EpidemicModel, Grid,
        Incidence, ParameterSet,
    };
    pub use crate::solver::{
        BoundaryCondition, DormandPrinceSolver, ForwardEulerSolver, Scenario, SimulationResult,
        Solver, SolverConfiguration, SolverType, Tolerance,
    };
}
