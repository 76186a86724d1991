//! TOML run configuration
//!
//! One file drives both models. Every table and every field is optional and
//! falls back to the reference configuration, so an empty file is a valid
//! configuration:
//!
//! ```toml
//! [parameters]
//! transmission_exposed = 0.0003
//! diffusion = 1e-4
//!
//! [spatial]
//! shape = [100, 100]
//! extent = [13.0, 12.0]
//! time_step = 1.0
//! time_steps = 120
//! boundary = "neumann"
//!
//! [spatial.initial]
//! smoothing = 1.0
//!
//! [lumped]
//! t_end = 200.0
//! evaluation_points = 200
//!
//! [lumped.tolerance]
//! rtol = 1e-8
//!
//! [output]
//! directory = "results"
//! start_date = "2020-03-04"
//! format = "both"
//! ```
//!
//! See [`SimulationConfig::from_file`] for loading.

use crate::error::{Result, SimulationError};
use crate::models::{
    LumpedInitialCondition, LumpedSeird, SpatialInitialCondition, SpatialSeird,
    DEFAULT_POPULATION_FLOOR,
};
use crate::physics::{CompartmentField, CompartmentVector, Grid, Incidence, ParameterSet};
use crate::solver::{
    BoundaryCondition, DormandPrinceSolver, ForwardEulerSolver, Scenario, SolverConfiguration,
    Tolerance,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// =================================================================================================
// Top level
// =================================================================================================

/// Complete run configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Epidemiological rates shared by both models
    pub parameters: ParameterSet,
    /// Reaction-diffusion grid run
    pub spatial: SpatialConfig,
    /// Lumped ODE run
    pub lumped: LumpedConfig,
    /// Where and how results are written
    pub output: OutputConfig,
}

impl SimulationConfig {
    /// Load and validate a configuration file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if any
    /// value is out of range.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;

        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|error| SimulationError::invalid("configuration", error.to_string()))
    }

    /// Check every section
    pub fn validate(&self) -> Result<()> {
        self.parameters.validate()?;
        self.spatial.validate()?;
        self.lumped.validate()?;
        self.output.validate()?;
        Ok(())
    }

    /// Spatial model and initial state, ready for [`ForwardEulerSolver`]
    pub fn spatial_scenario(&self) -> Result<Scenario<SpatialSeird>> {
        let grid = self.spatial.grid()?;
        let model = SpatialSeird::new(self.parameters, grid)?
            .with_boundary(self.spatial.boundary)
            .with_incidence(self.spatial.incidence);
        let initial: CompartmentField = self.spatial.initial.build(&grid)?;

        Ok(Scenario::new(model, initial))
    }

    /// Lumped model and initial state, ready for [`DormandPrinceSolver`]
    pub fn lumped_scenario(&self) -> Result<Scenario<LumpedSeird>> {
        let model = LumpedSeird::new(self.parameters)?
            .with_incidence(self.lumped.incidence)
            .with_population_floor(self.lumped.population_floor)?;
        let initial: CompartmentVector = self.lumped.initial.build()?;

        Ok(Scenario::new(model, initial))
    }
}

// =================================================================================================
// Spatial section
// =================================================================================================

/// `[spatial]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpatialConfig {
    /// Grid points per axis
    pub shape: (usize, usize),
    /// Physical size per axis
    pub extent: (f64, f64),
    /// Euler step Δt (days)
    ///
    /// Every rate is multiplied by Δt, so 1.0 applies each rate once per
    /// step: the plain per-day update.
    pub time_step: f64,
    /// Number of steps
    pub time_steps: usize,
    /// Keep every n-th field in the trajectory
    pub snapshot_interval: usize,
    /// Laplacian boundary closure
    pub boundary: BoundaryCondition,
    /// Force of infection form
    pub incidence: Incidence,
    /// Disable the non-negativity clamp
    pub disable_clamping: bool,
    /// Initial state builder
    pub initial: SpatialInitialCondition,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        let grid = Grid::default();
        Self {
            shape: grid.shape,
            extent: grid.extent,
            time_step: 1.0,
            time_steps: 120,
            snapshot_interval: 1,
            boundary: BoundaryCondition::default(),
            incidence: Incidence::MassAction,
            disable_clamping: false,
            initial: SpatialInitialCondition::default(),
        }
    }
}

impl SpatialConfig {
    /// Grid geometry
    pub fn grid(&self) -> Result<Grid> {
        Grid::new(self.shape, self.extent)
    }

    /// Fixed-step solver settings
    pub fn solver_configuration(&self) -> SolverConfiguration {
        SolverConfiguration::time_evolution(self.time_step, self.time_steps)
            .with_snapshot_interval(self.snapshot_interval)
    }

    /// Forward Euler solver with the configured clamping
    pub fn solver(&self) -> ForwardEulerSolver {
        if self.disable_clamping {
            ForwardEulerSolver::without_clamping()
        } else {
            ForwardEulerSolver::new()
        }
    }

    /// Check geometry, stepping and initial state settings
    pub fn validate(&self) -> Result<()> {
        self.grid()?;
        self.solver_configuration().validate()?;
        if let BoundaryCondition::Dirichlet(value) = self.boundary
            && (!value.is_finite() || value < 0.0)
        {
            return Err(SimulationError::invalid(
                "boundary",
                format!("Dirichlet value must be non-negative and finite, got {}", value),
            ));
        }
        self.initial.validate()
    }
}

// =================================================================================================
// Lumped section
// =================================================================================================

/// `[lumped]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LumpedConfig {
    /// Start of the integration interval
    pub t_start: f64,
    /// End of the integration interval
    pub t_end: f64,
    /// Number of evenly spaced output times, both ends included
    pub evaluation_points: usize,
    /// Force of infection form
    pub incidence: Incidence,
    /// Living population below which rates are refused
    pub population_floor: f64,
    /// Initial counts
    pub initial: LumpedInitialCondition,
    /// Adaptive step control
    pub tolerance: Tolerance,
}

impl Default for LumpedConfig {
    fn default() -> Self {
        Self {
            t_start: 0.0,
            t_end: 200.0,
            evaluation_points: 200,
            incidence: Incidence::Standard,
            population_floor: DEFAULT_POPULATION_FLOOR,
            initial: LumpedInitialCondition::default(),
            tolerance: Tolerance::default(),
        }
    }
}

impl LumpedConfig {
    /// Adaptive solver settings
    pub fn solver_configuration(&self) -> SolverConfiguration {
        SolverConfiguration::adaptive(self.t_start, self.t_end, self.evaluation_points)
    }

    /// Dormand–Prince solver with the configured tolerances
    pub fn solver(&self) -> DormandPrinceSolver {
        DormandPrinceSolver::with_tolerance(self.tolerance)
    }

    /// Check interval, output grid, tolerances and initial counts
    pub fn validate(&self) -> Result<()> {
        if self.evaluation_points == 0 {
            return Err(SimulationError::invalid("evaluation_points", "must be > 0"));
        }
        self.solver_configuration().validate()?;
        self.tolerance.validate()?;
        if !self.population_floor.is_finite() || self.population_floor < 0.0 {
            return Err(SimulationError::invalid(
                "population_floor",
                format!("must be non-negative and finite, got {}", self.population_floor),
            ));
        }
        self.initial.build().map(|_| ())
    }
}

// =================================================================================================
// Output section
// =================================================================================================

/// Export file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Comma separated values
    #[default]
    Csv,
    /// JSON document
    Json,
    /// Both CSV and JSON
    Both,
}

impl OutputFormat {
    /// Whether CSV files are written
    pub fn csv(self) -> bool {
        matches!(self, OutputFormat::Csv | OutputFormat::Both)
    }

    /// Whether JSON files are written
    pub fn json(self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Both)
    }
}

/// `[output]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory receiving the result files (created when missing)
    pub directory: PathBuf,
    /// Calendar date of the first recorded day
    pub start_date: NaiveDate,
    /// File format
    pub format: OutputFormat,
    /// Decimal places in CSV files
    pub precision: usize,
    /// Write a `#` comment header in CSV files
    pub include_metadata: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("results"),
            start_date: NaiveDate::from_ymd_opt(2020, 3, 4).unwrap_or_default(),
            format: OutputFormat::Csv,
            precision: 6,
            include_metadata: true,
        }
    }
}

impl OutputConfig {
    /// Check the precision is representable
    pub fn validate(&self) -> Result<()> {
        if self.precision > 17 {
            return Err(SimulationError::invalid(
                "precision",
                format!("at most 17 decimal places are meaningful, got {}", self.precision),
            ));
        }
        Ok(())
    }
}

// =================================================================================================
// Tests
// =================================================================================================
