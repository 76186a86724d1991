use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use seird_rs::config::{OutputFormat, SimulationConfig};
use seird_rs::metrics::DailyMetrics;
use seird_rs::output::{export_run, CsvConfig, CsvExporter};
use seird_rs::physics::CompartmentState;
use seird_rs::solver::Solver;
use std::path::PathBuf;
use std::time::Instant;

/// SEIRD epidemic simulation on a grid and as a lumped ODE
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// TOML configuration file (reference values when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the output directory
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Override the output format
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the reaction-diffusion grid model
    Spatial,

    /// Run the lumped ODE model
    Lumped,

    /// Run both models
    All,

    /// Print the effective configuration as TOML
    Config,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = Cli::parse();
    log::debug!("{args:#?}");

    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_file(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(directory) = args.output_dir {
        config.output.directory = directory;
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }

    match args.command {
        Command::Spatial => run_spatial(&config)?,
        Command::Lumped => run_lumped(&config)?,
        Command::All => {
            run_spatial(&config)?;
            run_lumped(&config)?;
        }
        Command::Config => {
            let text = config.to_toml().context("failed to render configuration")?;
            print!("{text}");
        }
    }

    Ok(())
}

fn run_spatial(config: &SimulationConfig) -> Result<()> {
    let scenario = config.spatial_scenario().context("failed to build spatial scenario")?;
    let solver = config.spatial.solver();
    let grid = *scenario.model.grid();

    log::info!(
        "spatial run: {}x{} grid, dt = {}, {} steps, {} boundary",
        grid.shape.0,
        grid.shape.1,
        config.spatial.time_step,
        config.spatial.time_steps,
        config.spatial.boundary
    );

    let start = Instant::now();
    let result = solver
        .solve(&scenario, &config.spatial.solver_configuration())
        .context("spatial simulation failed")?;
    log::info!("spatial run finished in {:.2?}", start.elapsed());

    summarize("spatial", &result.metrics, result.final_state.totals().total());

    export_run(&result, "spatial", &config.output).context("failed to export spatial results")?;

    if config.output.format != OutputFormat::Json {
        let path = config.output.directory.join("spatial_field.csv");
        CsvExporter::new(CsvConfig::default().precision(config.output.precision))
            .export_field(&result.final_state, &grid, &path)
            .context("failed to export final field")?;
        log::info!("wrote {}", path.display());
    }

    Ok(())
}

fn run_lumped(config: &SimulationConfig) -> Result<()> {
    let scenario = config.lumped_scenario().context("failed to build lumped scenario")?;
    let solver = config.lumped.solver();

    log::info!(
        "lumped run: t = {}..{}, {} outputs, rtol = {}, R0 = {:.3}",
        config.lumped.t_start,
        config.lumped.t_end,
        config.lumped.evaluation_points,
        config.lumped.tolerance.rtol,
        config.parameters.basic_reproduction_number()
    );

    let start = Instant::now();
    let result = solver
        .solve(&scenario, &config.lumped.solver_configuration())
        .context("lumped simulation failed")?;
    log::info!("lumped run finished in {:.2?}", start.elapsed());

    summarize("lumped", &result.metrics, result.final_state.totals().total());

    export_run(&result, "lumped", &config.output).context("failed to export lumped results")?;

    Ok(())
}

fn summarize(label: &str, metrics: &DailyMetrics, population: f64) {
    if let Some((index, peak)) = metrics.peak_infections() {
        let time = metrics.time.get(index).copied().unwrap_or(f64::NAN);
        log::info!("{label}: largest daily increase in infections {peak:.4} at t = {time}");
    }
    log::info!(
        "{label}: {:.4} deaths, {:.4} recoveries, final population {:.4}",
        metrics.total_deaths(),
        metrics.total_recoveries(),
        population
    );
}
