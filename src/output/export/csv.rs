//! CSV export of simulation results
//!
//! CSV files open directly in spreadsheets, pandas or any plotting tool,
//! which is where visualisation of the series happens.
//!
//! # Files
//!
//! ## Daily metrics
//!
//! ```csv
//! Date,Time,Cases,Deaths,Recoveries
//! 2020-03-05,1.000000,0.123457,0.000062,0.041667
//! 2020-03-06,2.000000,0.130112,0.000071,0.043210
//! ```
//!
//! `Time` is the model time of the entry and `Date` the calendar day it
//! falls in, counted from the configured start date at t = 0.
//!
//! ## Trajectory (compartment totals per recorded time)
//!
//! ```csv
//! Time,Susceptible,Exposed,Infected,Recovered,Deceased
//! 0.000000,989.000000,10.000000,1.000000,0.000000,0.000000
//! ```
//!
//! ## Grid field (one row per cell)
//!
//! ```csv
//! x,y,S,E,I,R,D
//! 0.000000,0.000000,0.890000,0.100000,0.010000,0.000000,0.000000
//! ```
//!
//! ## With metadata
//!
//! ```csv
//! # SEIRD Simulation Data
//! # Generated: 2026-02-11T15:30:00+00:00
//! # Model: Lumped SEIRD
//! # Solver: Dormand-Prince 5(4)
//! # Total Time: 200
//! # Time Steps: 200
//! #
//! Date,Time,Cases,Deaths,Recoveries
//! ...
//! ```

use super::{check_metrics, date_of, ExportError, Exporter};
use crate::metrics::DailyMetrics;
use crate::physics::{Compartment, CompartmentField, CompartmentState, Grid};
use crate::solver::SimulationResult;
use chrono::NaiveDate;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

// =============================================================================
// Configuration Structures
// =============================================================================

/// Configuration for CSV export
///
/// # Example
///
/// ```rust
/// use seird_rs::output::export::CsvConfig;
///
/// let config = CsvConfig::european().precision(3);
/// assert_eq!(config.delimiter, ';');
/// assert_eq!(config.precision, 3);
/// ```
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// Column delimiter (default: ',')
    pub delimiter: char,

    /// Decimal separator (default: '.')
    pub decimal_separator: char,

    /// Number of decimal places for floating-point values (default: 6)
    pub precision: usize,

    /// Include metadata header comments (default: false)
    pub include_metadata: bool,

    /// Metadata to include in header
    pub metadata: Option<CsvMetadata>,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            decimal_separator: '.',
            precision: 6,
            include_metadata: false,
            metadata: None,
        }
    }
}

impl CsvConfig {
    /// European CSV format (semicolon, comma for decimal)
    pub fn european() -> Self {
        Self {
            delimiter: ';',
            decimal_separator: ',',
            ..Default::default()
        }
    }

    /// Builder pattern: set delimiter
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Builder pattern: set precision
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Builder pattern: enable metadata
    pub fn with_metadata(mut self, metadata: CsvMetadata) -> Self {
        self.include_metadata = true;
        self.metadata = Some(metadata);
        self
    }
}

/// Metadata for CSV header comments
///
/// Only fields that are set appear in the header.
#[derive(Debug, Clone, Default)]
pub struct CsvMetadata {
    /// Model name (e.g. "Spatial SEIRD")
    pub model_name: Option<String>,

    /// Solver name (e.g. "Forward Euler")
    pub solver_name: Option<String>,

    /// Simulated time span (days)
    pub total_time: Option<f64>,

    /// Number of time steps or output points
    pub time_steps: Option<usize>,

    /// Additional custom parameters
    pub custom: Vec<(String, String)>,
}

impl CsvMetadata {
    /// Create metadata from run information
    pub fn from_simulation(model: &str, solver: &str, total_time: f64, time_steps: usize) -> Self {
        Self {
            model_name: Some(model.to_string()),
            solver_name: Some(solver.to_string()),
            total_time: Some(total_time),
            time_steps: Some(time_steps),
            ..Default::default()
        }
    }

    /// Create metadata from a finished run, carrying its metadata entries along
    pub fn from_result<S>(result: &SimulationResult<S>) -> Self {
        let mut metadata = Self {
            model_name: result.metadata.get("model").cloned(),
            solver_name: result.metadata.get("solver").cloned(),
            total_time: result.time_points.last().copied(),
            time_steps: Some(result.metrics.len()),
            ..Default::default()
        };

        let mut extra: Vec<_> = result
            .metadata
            .iter()
            .filter(|(key, _)| key.as_str() != "model" && key.as_str() != "solver")
            .collect();
        extra.sort();
        for (key, value) in extra {
            metadata.add_custom(key.clone(), value.clone());
        }

        metadata
    }

    /// Add custom parameter
    pub fn add_custom(&mut self, key: String, value: String) {
        self.custom.push((key, value));
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Write metadata header comments
fn write_metadata_header<W: Write>(out: &mut W, metadata: &CsvMetadata) -> Result<(), ExportError> {
    writeln!(out, "# SEIRD Simulation Data")?;

    let now = chrono::Utc::now();
    writeln!(out, "# Generated: {}", now.to_rfc3339())?;

    if let Some(model) = &metadata.model_name {
        writeln!(out, "# Model: {}", model)?;
    }
    if let Some(solver) = &metadata.solver_name {
        writeln!(out, "# Solver: {}", solver)?;
    }
    if let Some(total_time) = metadata.total_time {
        writeln!(out, "# Total Time: {}", total_time)?;
    }
    if let Some(time_steps) = metadata.time_steps {
        writeln!(out, "# Time Steps: {}", time_steps)?;
    }

    for (key, value) in &metadata.custom {
        writeln!(out, "# {}: {}", key, value)?;
    }

    writeln!(out, "#")?;

    Ok(())
}

/// Format number with configured precision and decimal separator
fn format_number(value: f64, config: &CsvConfig) -> String {
    let formatted = format!("{:.prec$}", value, prec = config.precision);

    if config.decimal_separator != '.' {
        formatted.replace('.', &config.decimal_separator.to_string())
    } else {
        formatted
    }
}

// =============================================================================
// Exporter
// =============================================================================

/// CSV writer for metrics, trajectories and grid fields
#[derive(Debug, Clone, Default)]
pub struct CsvExporter {
    config: CsvConfig,
}

impl CsvExporter {
    /// Exporter with explicit formatting options
    pub fn new(config: CsvConfig) -> Self {
        Self { config }
    }

    /// Formatting options in use
    pub fn config(&self) -> &CsvConfig {
        &self.config
    }

    fn create(&self, path: &Path) -> Result<BufWriter<File>, ExportError> {
        let mut out = BufWriter::new(File::create(path)?);

        if self.config.include_metadata
            && let Some(metadata) = &self.config.metadata
        {
            write_metadata_header(&mut out, metadata)?;
        }

        Ok(out)
    }

    fn write_row<W: Write>(&self, out: &mut W, leading: &str, values: &[f64]) -> Result<(), ExportError> {
        write!(out, "{}", leading)?;
        for value in values {
            write!(out, "{}{}", self.config.delimiter, format_number(*value, &self.config))?;
        }
        writeln!(out)?;
        Ok(())
    }

    /// Write every cell of a grid state with its physical coordinates
    ///
    /// # Errors
    ///
    /// - the field shape differs from the grid shape
    /// - a value is NaN or Inf
    /// - the file cannot be written
    pub fn export_field(&self, field: &CompartmentField, grid: &Grid, path: &Path) -> Result<(), ExportError> {
        if field.shape() != grid.shape {
            return Err(ExportError::InvalidData(format!(
                "field shape {:?} does not match grid shape {:?}",
                field.shape(),
                grid.shape
            )));
        }
        if let Some(compartment) = field.first_non_finite() {
            return Err(ExportError::InvalidData(format!("NaN or Inf detected in {}", compartment)));
        }

        let delimiter = self.config.delimiter;
        let mut out = self.create(path)?;

        write!(out, "x{}y", delimiter)?;
        for compartment in Compartment::ALL {
            write!(out, "{}{}", delimiter, compartment.symbol())?;
        }
        writeln!(out)?;

        let (nx, ny) = grid.shape;
        for i in 0..nx {
            for j in 0..ny {
                let (x, y) = grid.coordinates(i, j);
                let leading = format!("{}{}{}", format_number(x, &self.config), delimiter, format_number(y, &self.config));
                self.write_row(&mut out, &leading, &field.cell(i, j).to_array())?;
            }
        }

        out.flush()?;
        log::debug!("wrote {} cells to {}", nx * ny, path.display());
        Ok(())
    }
}

impl Exporter for CsvExporter {
    fn export_metrics(&self, metrics: &DailyMetrics, start_date: NaiveDate, path: &Path) -> Result<(), ExportError> {
        check_metrics(metrics)?;

        let delimiter = self.config.delimiter;
        let mut out = self.create(path)?;

        writeln!(out, "Date{d}Time{d}Cases{d}Deaths{d}Recoveries", d = delimiter)?;

        for (index, time) in metrics.time.iter().enumerate() {
            let date = date_of(start_date, *time)?;
            let leading = format!(
                "{}{}{}",
                date.format("%Y-%m-%d"),
                delimiter,
                format_number(*time, &self.config)
            );
            self.write_row(
                &mut out,
                &leading,
                &[metrics.new_infections[index], metrics.new_deaths[index], metrics.new_recoveries[index]],
            )?;
        }

        out.flush()?;
        log::debug!("wrote {} days to {}", metrics.len(), path.display());
        Ok(())
    }

    fn export_trajectory<S: CompartmentState>(
        &self,
        result: &SimulationResult<S>,
        path: &Path,
    ) -> Result<(), ExportError> {
        if result.is_empty() {
            return Err(ExportError::InvalidData("trajectory holds no time point".to_string()));
        }
        if result.time_points.len() != result.trajectory.len() {
            return Err(ExportError::InvalidData(format!(
                "{} time points versus {} states",
                result.time_points.len(),
                result.trajectory.len()
            )));
        }

        let delimiter = self.config.delimiter;
        let mut out = self.create(path)?;

        write!(out, "Time")?;
        for compartment in Compartment::ALL {
            write!(out, "{}{}", delimiter, compartment)?;
        }
        writeln!(out)?;

        for (time, state) in result.time_points.iter().zip(&result.trajectory) {
            let totals = state.totals().as_array();
            if totals.iter().any(|value| !value.is_finite()) {
                return Err(ExportError::InvalidData(format!("NaN or Inf detected at t = {}", time)));
            }
            self.write_row(&mut out, &format_number(*time, &self.config), &totals)?;
        }

        out.flush()?;
        log::debug!("wrote {} snapshots to {}", result.len(), path.display());
        Ok(())
    }
}

// =================================================================================================
// Tests
// =================================================================================================
