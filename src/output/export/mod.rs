//! Export of simulation results
//!
//! # Architecture
//!
//! The [`Exporter`] trait abstracts the file format. Each format is an
//! independent implementation in its own sub-module, so adding a format
//! means adding a file.
//!
//! # Available formats
//!
//! | Format | Module   | Metrics | Trajectory | Grid field |
//! |--------|----------|---------|------------|------------|
//! | CSV    | [`csv`]  | yes     | yes        | yes        |
//! | JSON   | [`json`] | yes     | yes        | no         |
//!
//! # Usage example
//!
//! ```rust,ignore
//! use seird_rs::output::export::{CsvExporter, Exporter, JsonExporter};
//!
//! let start = chrono::NaiveDate::from_ymd_opt(2020, 3, 4).unwrap();
//!
//! CsvExporter::default().export_metrics(&result.metrics, start, "cases.csv".as_ref())?;
//! JsonExporter::default().export_metrics(&result.metrics, start, "cases.json".as_ref())?;
//! ```

pub mod csv;
pub mod json;

pub use csv::{CsvConfig, CsvExporter, CsvMetadata};
pub use json::JsonExporter;

use crate::metrics::DailyMetrics;
use crate::physics::CompartmentState;
use crate::solver::SimulationResult;
use chrono::{NaiveDate, TimeDelta};
use std::path::Path;

/// Errors raised while writing result files
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// File could not be created or written
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialisation failed
    #[error("failed to serialise JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Data is empty, inconsistent or not finite
    #[error("invalid export data: {0}")]
    InvalidData(String),
}

/// Abstraction over export formats
///
/// Both methods write one file at `path`, replacing any existing file.
pub trait Exporter {
    /// Daily series, one row (or entry) per recorded entry
    ///
    /// `start_date` is the calendar date of model time 0; each entry is
    /// dated by the whole day its recorded time falls in, so entries closer
    /// than one day apart share a date.
    ///
    /// # Errors
    ///
    /// - the series are empty or of different lengths
    /// - a value is NaN or Inf
    /// - the file cannot be written
    fn export_metrics(&self, metrics: &DailyMetrics, start_date: NaiveDate, path: &Path) -> Result<(), ExportError>;

    /// Compartment totals at every recorded time point
    ///
    /// # Errors
    ///
    /// - the result holds no time point
    /// - the file cannot be written
    fn export_trajectory<S: CompartmentState>(
        &self,
        result: &SimulationResult<S>,
        path: &Path,
    ) -> Result<(), ExportError>;
}

// =================================================================================================
// Shared validation
// =================================================================================================

/// Reject empty, ragged or non-finite metrics
pub(crate) fn check_metrics(metrics: &DailyMetrics) -> Result<(), ExportError> {
    if metrics.is_empty() {
        return Err(ExportError::InvalidData("no recorded day to export".to_string()));
    }

    let series = [
        ("time", &metrics.time),
        ("new_infections", &metrics.new_infections),
        ("new_deaths", &metrics.new_deaths),
        ("new_recoveries", &metrics.new_recoveries),
    ];

    for (name, values) in series {
        if values.len() != metrics.len() {
            return Err(ExportError::InvalidData(format!(
                "{} has {} entries, expected {}",
                name,
                values.len(),
                metrics.len()
            )));
        }
        if values.iter().any(|value| !value.is_finite()) {
            return Err(ExportError::InvalidData(format!("NaN or Inf detected in {}", name)));
        }
    }

    Ok(())
}

/// Tolerance on whole-day boundaries, absorbs `k·dt` rounding
const DAY_EPSILON: f64 = 1e-9;

/// Calendar date of model time `time`, with `start_date` at t = 0
pub(crate) fn date_of(start_date: NaiveDate, time: f64) -> Result<NaiveDate, ExportError> {
    let overflow = || ExportError::InvalidData(format!("t = {} overflows the calendar", time));

    let day = (time + DAY_EPSILON).floor();
    if !day.is_finite() || day.abs() > i32::MAX as f64 {
        return Err(overflow());
    }

    TimeDelta::try_days(day as i64)
        .and_then(|offset| start_date.checked_add_signed(offset))
        .ok_or_else(overflow)
}
