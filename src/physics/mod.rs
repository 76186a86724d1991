//! Epidemic dynamics primitives
//!
//! This module provides the compartment vocabulary, the parameter set, the
//! grid geometry and the two state containers shared by every model.
//!
//! # Core Concepts
//!
//! - **Compartment**: Type-safe identifier for S, E, I, R, D
//! - **ParameterSet**: Per-capita rates (transmission, progression, recovery, death, diffusion)
//! - **CompartmentState**: Arithmetic a solver needs, implemented by both state containers
//! - **EpidemicModel**: Computes `dy/dt` at a given state
//!
//! # Architecture
//!
//! Epidemic models are **separate from numerical solvers**:
//! - The model provides the **equations** (dynamics)
//! - The solver provides the **method** to integrate them (numerics)
//!
//! This separation allows:
//! - Same model with different solvers (forward Euler, Dormand–Prince)
//! - Same solver with different models (grid, lumped)
//!
//! # Example
//!
//! ```rust
//! use seird_rs::physics::{CompartmentState, CompartmentVector, EpidemicModel};
//! use seird_rs::Result;
//!
//! struct NoDynamics;
//!
//! impl EpidemicModel for NoDynamics {
//!     type State = CompartmentVector;
//!
//!     fn rates(&self, _state: &CompartmentVector) -> Result<CompartmentVector> {
//!         Ok(CompartmentVector::zeros())
//!     }
//!
//!     fn name(&self) -> &str {
//!         "No dynamics"
//!     }
//! }
//!
//! let state = CompartmentVector::new(989.0, 10.0, 1.0, 0.0, 0.0);
//! let rates = NoDynamics.rates(&state).unwrap();
//! assert_eq!(rates.totals().total(), 0.0);
//! ```

// module declaration
pub mod grid;
pub mod parameters;
pub mod state;
pub mod traits;

// re-export commonly used types for convenience
pub use grid::Grid;
pub use parameters::{Incidence, ParameterSet};
pub use state::{CompartmentField, CompartmentVector};
pub use traits::{Compartment, CompartmentState, CompartmentTotals, EpidemicModel};
