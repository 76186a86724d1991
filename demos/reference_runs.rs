//! Reference SEIRD runs
//!
//! 1. Lumped ODE: y0 = [989, 10, 1, 0, 0], t ∈ [0, 200] at 200 samples,
//!    Dormand–Prince 5(4)
//! 2. Grid: 100×100 cells, 120 per-day forward Euler steps, ν = 1e-4,
//!    zero-flux edges
//!
//! Both write their metrics and trajectories to `results/demo/`.
//!
//! ```bash
//! cargo run --release --example reference_runs
//! ```

use seird_rs::{
    config::{OutputFormat, SimulationConfig},
    metrics::DailyMetrics,
    output::export_run,
    physics::{Compartment, CompartmentState},
    solver::Solver,
};
use std::error::Error;
use std::time::Instant;

fn print_metrics(metrics: &DailyMetrics, rows: usize) {
    println!("  {:>8} {:>14} {:>12} {:>12}", "t", "new infected", "deaths", "recoveries");
    for index in 0..rows.min(metrics.len()) {
        println!(
            "  {:>8.3} {:>14.6} {:>12.6} {:>12.6}",
            metrics.time[index],
            metrics.new_infections[index],
            metrics.new_deaths[index],
            metrics.new_recoveries[index]
        );
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut config = SimulationConfig::default();
    config.output.directory = "results/demo".into();
    config.output.format = OutputFormat::Both;

    // ====== Lumped model ======

    println!("=== Lumped SEIRD (Dormand-Prince 5(4)) ===\n");
    println!("  R0 = {:.4}", config.parameters.basic_reproduction_number());
    println!(
        "  t = {}..{}, {} samples, rtol = {:e}\n",
        config.lumped.t_start, config.lumped.t_end, config.lumped.evaluation_points, config.lumped.tolerance.rtol
    );

    let scenario = config.lumped_scenario()?;
    let start = Instant::now();
    let lumped = config.lumped.solver().solve(&scenario, &config.lumped.solver_configuration())?;
    println!("✓ solved in {:.3}s", start.elapsed().as_secs_f64());
    println!(
        "  {} accepted / {} rejected steps\n",
        lumped.metadata.get("accepted steps").map_or("?", String::as_str),
        lumped.metadata.get("rejected steps").map_or("?", String::as_str)
    );

    let infected: Vec<f64> = lumped.trajectory.iter().map(|state| state.get(Compartment::Infected)).collect();
    if let Some((index, peak)) = infected
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
    {
        println!("  infected peak: {:.4} at t = {:.2}", peak, lumped.time_points[index]);
    }
    println!("  final state: {}\n", lumped.final_state);
    print_metrics(&lumped.metrics, 8);

    for path in export_run(&lumped, "lumped", &config.output)? {
        println!("  wrote {}", path.display());
    }

    // ====== Grid model ======

    println!("\n=== Spatial SEIRD (forward Euler) ===\n");
    println!(
        "  grid {}x{}, extent {:?}, {} steps of {} day, ν = {:e}, {} edges\n",
        config.spatial.shape.0,
        config.spatial.shape.1,
        config.spatial.extent,
        config.spatial.time_steps,
        config.spatial.time_step,
        config.parameters.diffusion,
        config.spatial.boundary
    );

    let scenario = config.spatial_scenario()?;
    let start = Instant::now();
    let spatial = config.spatial.solver().solve(&scenario, &config.spatial.solver_configuration())?;
    println!("✓ solved in {:.3}s\n", start.elapsed().as_secs_f64());

    let before = scenario.initial_state.totals();
    let after = spatial.final_state.totals();
    for compartment in Compartment::ALL {
        println!(
            "  {:<12} {:>14.4} -> {:>14.4}",
            compartment.to_string(),
            before.get(compartment),
            after.get(compartment)
        );
    }
    println!();
    print_metrics(&spatial.metrics, 8);

    for path in export_run(&spatial, "spatial", &config.output)? {
        println!("  wrote {}", path.display());
    }

    Ok(())
}
