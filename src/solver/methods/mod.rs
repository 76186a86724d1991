//! Numerical methods for the SEIRD models
//!
//! Concrete implementations of the [`Solver`](crate::solver::Solver) trait.
//! Both are explicit and operate on any [`CompartmentState`](crate::physics::CompartmentState),
//! so either can drive the spatial or the lumped model.
//!
//! # Available Methods
//!
//! - **[`ForwardEulerSolver`]**: fixed-step forward Euler
//!   - Order: first-order O(dt)
//!   - Cost: 1 right-hand side evaluation per step
//!   - Use: the reaction-diffusion grid, where dt is bounded by the diffusion
//!     number anyway; clamps negative densities after every step
//!
//! - **[`DormandPrinceSolver`]**: adaptive Dormand–Prince 5(4)
//!   - Order: fifth-order with an embedded fourth-order error estimate
//!   - Cost: 6 right-hand side evaluations per attempted step (FSAL)
//!   - Use: the lumped ODE, resampled on a requested time grid
//!
//! # Example
//!
//! ```rust
//! use seird_rs::models::{LumpedInitialCondition, LumpedSeird};
//! use seird_rs::physics::ParameterSet;
//! use seird_rs::solver::{DormandPrinceSolver, ForwardEulerSolver, Scenario, Solver, SolverConfiguration};
//!
//! let model = LumpedSeird::new(ParameterSet::default()).unwrap();
//! let scenario = Scenario::new(model, LumpedInitialCondition::default().build().unwrap());
//!
//! let euler = ForwardEulerSolver::new().solve(&scenario, &SolverConfiguration::time_evolution(0.1, 100)).unwrap();
//! let dopri = DormandPrinceSolver::new().solve(&scenario, &SolverConfiguration::time_evolution(0.1, 100)).unwrap();
//!
//! assert_eq!(euler.time_points.len(), dopri.time_points.len());
//! ```

pub mod dopri;
pub mod euler;

pub use dopri::{DormandPrinceSolver, Integration, Tolerance};
pub use euler::ForwardEulerSolver;
