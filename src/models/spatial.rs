//! Reaction–diffusion SEIRD model on a 2D grid
//!
//! # Equations
//!
//! Per cell, with the force of infection `λ = (βE·E + βI·I)·S` (mass action)
//! or `λ = (βE·E + βI·I)·S / N` (standard):
//!
//! ```text
//! ∂S/∂t = −λ + α·S − μ·S                + ν·∇²S
//! ∂E/∂t =  λ − σ·E − φE·E − μ·E         + ν·∇²E
//! ∂I/∂t =  σ·E − φR·I − φD·I − μ·I      + ν·∇²I
//! ∂R/∂t =  φR·I + φE·E − μ·R            + ν·∇²R
//! ∂D/∂t =  φD·I
//! ```
//!
//! The deceased do not diffuse. ∇² is the 5-point stencil of
//! [`solver::boundary`](crate::solver::boundary) closed by the model's
//! [`BoundaryCondition`].
//!
//! # Example
//!
//! ```rust
//! use seird_rs::models::{SpatialInitialCondition, SpatialSeird};
//! use seird_rs::physics::{Grid, ParameterSet};
//! use seird_rs::solver::{ForwardEulerSolver, Scenario, Solver, SolverConfiguration};
//!
//! let grid = Grid::new((20, 20), (13.0, 12.0)).unwrap();
//! let model = SpatialSeird::new(ParameterSet::default(), grid).unwrap();
//! let initial = SpatialInitialCondition::default().build(&grid).unwrap();
//!
//! let scenario = Scenario::new(model, initial);
//! let config = SolverConfiguration::time_evolution(0.01, 10);
//! let result = ForwardEulerSolver::new().solve(&scenario, &config).unwrap();
//!
//! assert_eq!(result.metrics.len(), 10);
//! ```

use crate::error::{Result, SimulationError};
use crate::physics::{
    Compartment, CompartmentField, CompartmentVector, EpidemicModel, Grid, Incidence, ParameterSet,
};
use crate::solver::boundary::{laplacian_at, stencil_weights};
use crate::solver::BoundaryCondition;

/// SEIRD dynamics with diffusion over a rectangular grid
#[derive(Debug, Clone)]
pub struct SpatialSeird {
    parameters: ParameterSet,
    grid: Grid,
    boundary: BoundaryCondition,
    incidence: Incidence,
}

impl SpatialSeird {
    /// Create a model with Neumann boundaries and mass-action incidence
    ///
    /// # Errors
    /// Invalid rates or grid geometry.
    pub fn new(parameters: ParameterSet, grid: Grid) -> Result<Self> {
        parameters.validate()?;
        grid.validate()?;

        Ok(Self {
            parameters,
            grid,
            boundary: BoundaryCondition::default(),
            incidence: Incidence::MassAction,
        })
    }

    /// Use another boundary closure
    pub fn with_boundary(mut self, boundary: BoundaryCondition) -> Self {
        self.boundary = boundary;
        self
    }

    /// Use another incidence form
    pub fn with_incidence(mut self, incidence: Incidence) -> Self {
        self.incidence = incidence;
        self
    }

    /// Rates in use
    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    /// Grid geometry
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Boundary closure
    pub fn boundary(&self) -> BoundaryCondition {
        self.boundary
    }

    /// Incidence form
    pub fn incidence(&self) -> Incidence {
        self.incidence
    }

    /// Local (non-diffusive) rates of one cell
    pub fn reaction(&self, cell: &CompartmentVector) -> CompartmentVector {
        let p = &self.parameters;
        let s = cell.get(Compartment::Susceptible);
        let e = cell.get(Compartment::Exposed);
        let i = cell.get(Compartment::Infected);
        let r = cell.get(Compartment::Recovered);

        let force = self
            .incidence
            .force_of_infection(p, s, e, i, cell.living_population());

        CompartmentVector::new(
            -force + p.birth_rate * s - p.natural_death_rate * s,
            force
                - p.progression_rate * e
                - p.recovery_rate_exposed * e
                - p.natural_death_rate * e,
            p.progression_rate * e
                - p.recovery_rate_infected * i
                - p.death_rate * i
                - p.natural_death_rate * i,
            p.recovery_rate_infected * i + p.recovery_rate_exposed * e - p.natural_death_rate * r,
            p.death_rate * i,
        )
    }
}

impl EpidemicModel for SpatialSeird {
    type State = CompartmentField;

    fn rates(&self, state: &CompartmentField) -> Result<CompartmentField> {
        let shape = state.shape();
        if shape != self.grid.shape {
            return Err(SimulationError::ShapeMismatch {
                expected: self.grid.shape,
                found: shape,
            });
        }

        let (_, ny) = shape;
        let cells = state.cells();
        let weights = stencil_weights(&self.grid);
        let diffusion = self.parameters.diffusion;
        let boundary = self.boundary;

        // ── Cell kernel ──────────────────────────────────────────────────────
        //
        // Reads the five fields of `state` only and returns the rates of cell
        // k, so no cell ever sees another cell's update. Cells are numbered
        // row-major, matching CompartmentField::from_cells.

        let compute_cell = |k: usize| -> [f64; Compartment::COUNT] {
            let (i, j) = (k / ny, k % ny);
            let mut rates = self.reaction(&state.cell(i, j)).to_array();

            if diffusion != 0.0 {
                for compartment in Compartment::ALL.into_iter().filter(|c| c.is_living()) {
                    rates[compartment.index()] +=
                        diffusion * laplacian_at(state.get(compartment), i, j, weights, boundary);
                }
            }

            rates
        };

        let rows = crate::solver::map_cells(cells, compute_cell);

        CompartmentField::from_cells(shape, &rows)
    }

    fn name(&self) -> &str {
        "Spatial SEIRD"
    }

    fn description(&self) -> Option<&str> {
        Some(
            "Reaction-diffusion SEIRD model on a rectangular grid \
             with a 5-point Laplacian and explicit boundary closure.",
        )
    }

    fn stability_limit(&self) -> Option<f64> {
        let limit = self.grid.stable_time_step(self.parameters.diffusion);
        limit.is_finite().then_some(limit)
    }
}

// =================================================================================================
// Tests
// =================================================================================================
