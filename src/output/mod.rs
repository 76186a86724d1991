//! Output of simulation results
//!
//! Results leave the crate as files: daily metrics, compartment
//! trajectories and, for the grid model, the final field. Plotting is left
//! to external tools reading these files.
//!
//! # Architecture
//!
//! ```text
//! output/
//! ├── mod.rs              ← This file (run-level export)
//! └── export/             ← Format implementations
//!     ├── mod.rs          ← Exporter trait, ExportError
//!     ├── csv.rs
//!     └── json.rs
//! ```
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use seird_rs::config::OutputConfig;
//! use seird_rs::output::export_run;
//!
//! let written = export_run(&result, "lumped", &OutputConfig::default())?;
//! ```

pub mod export;

pub use export::{CsvConfig, CsvExporter, CsvMetadata, ExportError, Exporter, JsonExporter};

use crate::config::OutputConfig;
use crate::physics::CompartmentState;
use crate::solver::SimulationResult;
use std::path::PathBuf;

/// Write the metrics and the trajectory of one run
///
/// Files are named `<prefix>_metrics.<ext>` and `<prefix>_trajectory.<ext>`
/// inside `config.directory`, which is created when missing. Returns the
/// written paths in the order they were written.
///
/// # Errors
///
/// The first export that fails.
pub fn export_run<S: CompartmentState>(
    result: &SimulationResult<S>,
    prefix: &str,
    config: &OutputConfig,
) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(&config.directory)?;

    let mut written = Vec::new();

    if config.format.csv() {
        let mut csv_config = CsvConfig::default().precision(config.precision);
        if config.include_metadata {
            csv_config = csv_config.with_metadata(CsvMetadata::from_result(result));
        }
        let exporter = CsvExporter::new(csv_config);

        let path = config.directory.join(format!("{prefix}_metrics.csv"));
        exporter.export_metrics(&result.metrics, config.start_date, &path)?;
        written.push(path);

        let path = config.directory.join(format!("{prefix}_trajectory.csv"));
        exporter.export_trajectory(result, &path)?;
        written.push(path);
    }

    if config.format.json() {
        let exporter = JsonExporter::default();

        let path = config.directory.join(format!("{prefix}_metrics.json"));
        exporter.export_metrics(&result.metrics, config.start_date, &path)?;
        written.push(path);

        let path = config.directory.join(format!("{prefix}_trajectory.json"));
        exporter.export_trajectory(result, &path)?;
        written.push(path);
    }

    for path in &written {
        log::info!("wrote {}", path.display());
    }

    Ok(written)
}
