//! Invariants shared by both models
//!
//! Conservation, non-negativity, determinism and the agreement between the
//! grid model without diffusion and the lumped model.

use seird_rs::models::{LumpedInitialCondition, LumpedSeird, SpatialInitialCondition, SpatialSeird};
use seird_rs::physics::{
    Compartment, CompartmentField, CompartmentState, CompartmentVector, EpidemicModel, Grid, Incidence,
    ParameterSet,
};
use seird_rs::solver::{
    BoundaryCondition, DormandPrinceSolver, ForwardEulerSolver, Scenario, Solver, SolverConfiguration,
};

mod common;
use common::{all_non_negative, assert_totals_close, relative_error, small_config};

fn spatial_scenario(parameters: ParameterSet, boundary: BoundaryCondition) -> Scenario<SpatialSeird> {
    let grid = Grid::new((20, 20), (13.0, 12.0)).unwrap();
    let model = SpatialSeird::new(parameters, grid).unwrap().with_boundary(boundary);
    let mut initial = SpatialInitialCondition::default().build(&grid).unwrap();
    // break the symmetry so diffusion has something to do
    initial.get_mut(Compartment::Infected)[[3, 15]] = 0.5;
    Scenario::new(model, initial)
}

// =================================================================================================
// Conservation
// =================================================================================================

#[test]
fn test_spatial_total_conserved_with_zero_flux_boundary() {
    let parameters = ParameterSet {
        diffusion: 0.05,
        ..Default::default()
    };
    let scenario = spatial_scenario(parameters, BoundaryCondition::Neumann);
    let initial_total = scenario.initial_state.totals().total();

    let result = ForwardEulerSolver::without_clamping()
        .solve(&scenario, &SolverConfiguration::time_evolution(0.5, 60).with_snapshot_interval(10))
        .unwrap();

    for state in &result.trajectory {
        let total = state.totals().total();
        assert!(relative_error(total, initial_total) < 1e-12, "total drifted to {}", total);
    }
}

#[test]
fn test_spatial_total_conserved_with_periodic_boundary() {
    let parameters = ParameterSet {
        diffusion: 0.05,
        ..Default::default()
    };
    let scenario = spatial_scenario(parameters, BoundaryCondition::Periodic);
    let initial_total = scenario.initial_state.totals().total();

    let result = ForwardEulerSolver::without_clamping()
        .solve(&scenario, &SolverConfiguration::time_evolution(0.5, 60))
        .unwrap();

    assert!(relative_error(result.final_state.totals().total(), initial_total) < 1e-12);
}

#[test]
fn test_absorbing_boundary_loses_population() {
    let parameters = ParameterSet {
        diffusion: 0.05,
        ..Default::default()
    };
    let scenario = spatial_scenario(parameters, BoundaryCondition::Dirichlet(0.0));
    let initial_total = scenario.initial_state.totals().total();

    let result = ForwardEulerSolver::new()
        .solve(&scenario, &SolverConfiguration::time_evolution(0.5, 60))
        .unwrap();

    assert!(result.final_state.totals().total() < initial_total);
}

#[test]
fn test_lumped_total_conserved_with_natural_death() {
    let parameters = ParameterSet {
        natural_death_rate: 0.01,
        ..Default::default()
    };
    let scenario = Scenario::new(
        LumpedSeird::new(parameters).unwrap(),
        LumpedInitialCondition::default().build().unwrap(),
    );

    let result = DormandPrinceSolver::new()
        .solve(&scenario, &SolverConfiguration::adaptive(0.0, 200.0, 200))
        .unwrap();

    for state in &result.trajectory {
        assert!((state.total_population() - 1000.0).abs() < 1e-8);
    }
}

#[test]
fn test_metrics_sum_to_compartment_change() {
    let scenario = spatial_scenario(ParameterSet::default(), BoundaryCondition::Neumann);
    let before = scenario.initial_state.totals();

    let result = ForwardEulerSolver::new()
        .solve(&scenario, &SolverConfiguration::time_evolution(1.0, 40))
        .unwrap();
    let after = result.final_state.totals();

    let deaths: f64 = result.metrics.new_deaths.iter().sum();
    let infections: f64 = result.metrics.new_infections.iter().sum();

    assert!((deaths - (after.get(Compartment::Deceased) - before.get(Compartment::Deceased))).abs() < 1e-9);
    assert!((infections - (after.get(Compartment::Infected) - before.get(Compartment::Infected))).abs() < 1e-9);
    assert!(result.metrics.new_deaths.iter().all(|value| *value >= 0.0));
}

// =================================================================================================
// Non-negativity
// =================================================================================================

#[test]
fn test_clamped_spatial_run_stays_non_negative() {
    let config = small_config(20, 20);
    let scenario = config.spatial_scenario().unwrap();

    let result = config.spatial.solver().solve(&scenario, &config.spatial.solver_configuration()).unwrap();

    assert!(result.trajectory.iter().all(all_non_negative));
}

#[test]
fn test_lumped_run_stays_non_negative() {
    let config = small_config(2, 2);
    let scenario = config.lumped_scenario().unwrap();

    let result = config.lumped.solver().solve(&scenario, &config.lumped.solver_configuration()).unwrap();

    for state in &result.trajectory {
        assert!(state.to_array().iter().all(|value| *value >= -1e-9), "{}", state);
    }
}

// =================================================================================================
// Determinism
// =================================================================================================

#[test]
fn test_runs_are_reproducible() {
    let config = small_config(15, 12);

    let spatial = config.spatial_scenario().unwrap();
    let first = config.spatial.solver().solve(&spatial, &config.spatial.solver_configuration()).unwrap();
    let second = config.spatial.solver().solve(&spatial, &config.spatial.solver_configuration()).unwrap();
    assert_eq!(first.final_state, second.final_state);
    assert_eq!(first.metrics, second.metrics);

    let lumped = config.lumped_scenario().unwrap();
    let first = config.lumped.solver().solve(&lumped, &config.lumped.solver_configuration()).unwrap();
    let second = config.lumped.solver().solve(&lumped, &config.lumped.solver_configuration()).unwrap();
    assert_eq!(first.trajectory, second.trajectory);
    assert_eq!(first.metrics, second.metrics);
}

// =================================================================================================
// Disease-free state
// =================================================================================================

#[test]
fn test_no_infection_without_seed() {
    let grid = Grid::new((10, 10), (13.0, 12.0)).unwrap();
    let initial = SpatialInitialCondition {
        exposed_fraction: 0.0,
        infected_seed: 0.0,
        ..Default::default()
    }
    .build(&grid)
    .unwrap();
    let scenario = Scenario::new(SpatialSeird::new(ParameterSet::default(), grid).unwrap(), initial);

    let result = ForwardEulerSolver::new()
        .solve(&scenario, &SolverConfiguration::time_evolution(1.0, 30))
        .unwrap();

    assert!(result.metrics.new_infections.iter().all(|value| *value == 0.0));
    assert!(result.metrics.new_deaths.iter().all(|value| *value == 0.0));

    let lumped = Scenario::new(
        LumpedSeird::new(ParameterSet::default()).unwrap(),
        CompartmentVector::new(1000.0, 0.0, 0.0, 0.0, 0.0),
    );
    let result = DormandPrinceSolver::new()
        .solve(&lumped, &SolverConfiguration::adaptive(0.0, 50.0, 51))
        .unwrap();

    assert!(result.metrics.new_infections.iter().all(|value| *value == 0.0));
    assert!(result.metrics.new_recoveries.iter().all(|value| *value == 0.0));
}

// =================================================================================================
// Grid without diffusion reduces to the lumped model
// =================================================================================================

#[test]
fn test_cell_reaction_matches_lumped_rates() {
    let parameters = ParameterSet {
        diffusion: 0.0,
        ..Default::default()
    };
    let values = [889.0, 100.0, 10.0, 1.0, 0.0];

    let spatial = SpatialSeird::new(parameters, Grid::new((4, 3), (1.0, 1.0)).unwrap())
        .unwrap()
        .with_incidence(Incidence::Standard);
    let lumped = LumpedSeird::new(parameters).unwrap();

    let field_rates = spatial.rates(&CompartmentField::uniform((4, 3), values)).unwrap();
    let scalar_rates = lumped.rates(&CompartmentVector::from_array(values)).unwrap();

    for compartment in Compartment::ALL {
        let expected = scalar_rates.get(compartment);
        for value in field_rates.get(compartment).iter() {
            assert!((value - expected).abs() < 1e-12, "{}: {} vs {}", compartment, value, expected);
        }
    }
}

#[test]
fn test_uniform_grid_run_matches_lumped_run() {
    let parameters = ParameterSet {
        diffusion: 0.0,
        ..Default::default()
    };
    let values = [989.0, 10.0, 1.0, 0.0, 0.0];
    let config = SolverConfiguration::time_evolution(0.1, 300);

    let grid = Grid::new((5, 4), (1.0, 1.0)).unwrap();
    let spatial = Scenario::new(
        SpatialSeird::new(parameters, grid).unwrap().with_incidence(Incidence::Standard),
        CompartmentField::uniform(grid.shape, values),
    );
    let lumped = Scenario::new(LumpedSeird::new(parameters).unwrap(), CompartmentVector::from_array(values));

    let field = ForwardEulerSolver::new().solve(&spatial, &config).unwrap();
    let scalar = ForwardEulerSolver::new().solve(&lumped, &config).unwrap();

    let cells = grid.cells() as f64;
    let per_cell = CompartmentVector::from_array(field.final_state.totals().as_array()) * (1.0 / cells);
    assert_totals_close(&per_cell.totals(), &scalar.final_state.totals(), 1e-10, "uniform grid");
}
