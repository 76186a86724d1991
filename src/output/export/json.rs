//! JSON export of simulation results
//!
//! Daily metrics:
//!
//! ```json
//! {
//!   "start_date": "2020-03-04",
//!   "time": [1.0, 2.0],
//!   "data": [0.12, 0.13],
//!   "deaths": [0.00006, 0.00007],
//!   "recoveries": [0.04, 0.04]
//! }
//! ```
//!
//! `data` holds the daily new infections, `time` the model time of each
//! entry (days since `start_date`). Trajectories are written column
//! wise, one array per compartment next to a `time` array.

use super::{check_metrics, ExportError, Exporter};
use crate::metrics::DailyMetrics;
use crate::physics::{Compartment, CompartmentState};
use crate::solver::SimulationResult;
use chrono::NaiveDate;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Serialize)]
struct MetricsDocument<'a> {
    start_date: NaiveDate,
    time: &'a [f64],
    data: &'a [f64],
    deaths: &'a [f64],
    recoveries: &'a [f64],
}

#[derive(Serialize)]
struct TrajectoryDocument<'a> {
    time: &'a [f64],
    susceptible: Vec<f64>,
    exposed: Vec<f64>,
    infected: Vec<f64>,
    recovered: Vec<f64>,
    deceased: Vec<f64>,
}

/// JSON writer for metrics and trajectories
#[derive(Debug, Clone, Copy)]
pub struct JsonExporter {
    pretty: bool,
}

impl Default for JsonExporter {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl JsonExporter {
    /// Single-line output instead of indented
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    fn write<T: Serialize>(&self, document: &T, path: &Path) -> Result<(), ExportError> {
        let mut out = BufWriter::new(File::create(path)?);
        if self.pretty {
            serde_json::to_writer_pretty(&mut out, document)?;
        } else {
            serde_json::to_writer(&mut out, document)?;
        }
        writeln!(out)?;
        out.flush()?;
        Ok(())
    }
}

impl Exporter for JsonExporter {
    fn export_metrics(&self, metrics: &DailyMetrics, start_date: NaiveDate, path: &Path) -> Result<(), ExportError> {
        check_metrics(metrics)?;

        let document = MetricsDocument {
            start_date,
            time: &metrics.time,
            data: &metrics.new_infections,
            deaths: &metrics.new_deaths,
            recoveries: &metrics.new_recoveries,
        };
        self.write(&document, path)?;

        log::debug!("wrote {} days to {}", metrics.len(), path.display());
        Ok(())
    }

    fn export_trajectory<S: CompartmentState>(
        &self,
        result: &SimulationResult<S>,
        path: &Path,
    ) -> Result<(), ExportError> {
        if result.is_empty() || result.time_points.len() != result.trajectory.len() {
            return Err(ExportError::InvalidData(format!(
                "{} time points versus {} states",
                result.time_points.len(),
                result.trajectory.len()
            )));
        }

        let totals: Vec<_> = result.trajectory.iter().map(|state| state.totals()).collect();
        let column = |compartment: Compartment| -> Vec<f64> {
            totals.iter().map(|total| total.get(compartment)).collect()
        };

        // serde_json writes non-finite floats as null, which would silently hide a blow-up
        if totals.iter().any(|total| total.as_array().iter().any(|value| !value.is_finite())) {
            return Err(ExportError::InvalidData("NaN or Inf detected in trajectory".to_string()));
        }

        let document = TrajectoryDocument {
            time: &result.time_points,
            susceptible: column(Compartment::Susceptible),
            exposed: column(Compartment::Exposed),
            infected: column(Compartment::Infected),
            recovered: column(Compartment::Recovered),
            deceased: column(Compartment::Deceased),
        };
        self.write(&document, path)?;

        log::debug!("wrote {} snapshots to {}", result.len(), path.display());
        Ok(())
    }
}
