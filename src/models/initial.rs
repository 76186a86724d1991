//! Initial condition builders
//!
//! Both builders are pure functions of their configuration: the same values
//! always give the same state.
//!
//! # Spatial
//!
//! A population density ρ (uniform `base_density` unless supplied) is
//! smoothed with a separable Gaussian filter, then split:
//!
//! ```text
//! S = susceptible_fraction · ρ
//! E = exposed_fraction · ρ
//! I = infected_seed            (constant, independent of ρ)
//! R = D = 0
//! ```
//!
//! The filter reflects at the edges (`d c b a | a b c d | d c b a`) and
//! truncates the kernel at four standard deviations, so a uniform density
//! stays exactly uniform. The half-width never exceeds the longest grid
//! axis: past that the reflected lane only repeats, so very wide kernels
//! cost memory without changing the shape of the result.
//!
//! # Lumped
//!
//! Literal compartment counts, default `[989, 10, 1, 0, 0]`.

use crate::error::{Result, SimulationError};
use crate::physics::{Compartment, CompartmentField, CompartmentVector, Grid};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

/// Kernel half-width in standard deviations
const TRUNCATE: f64 = 4.0;

// =================================================================================================
// Spatial initial condition
// =================================================================================================

/// Builder for the initial grid state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpatialInitialCondition {
    /// Uniform population density before smoothing
    pub base_density: f64,
    /// Gaussian smoothing standard deviation, in cells (0 disables smoothing)
    pub smoothing: f64,
    /// Share of the density placed in S
    pub susceptible_fraction: f64,
    /// Share of the density placed in E
    pub exposed_fraction: f64,
    /// Constant infected density in every cell
    pub infected_seed: f64,
}

impl Default for SpatialInitialCondition {
    fn default() -> Self {
        Self {
            base_density: 1.0,
            smoothing: 1.0,
            susceptible_fraction: 0.89,
            exposed_fraction: 0.10,
            infected_seed: 0.01,
        }
    }
}

impl SpatialInitialCondition {
    /// Check values are finite and non-negative and the fractions fit in the density
    pub fn validate(&self) -> Result<()> {
        let values = [
            ("base_density", self.base_density),
            ("smoothing", self.smoothing),
            ("susceptible_fraction", self.susceptible_fraction),
            ("exposed_fraction", self.exposed_fraction),
            ("infected_seed", self.infected_seed),
        ];

        for (name, value) in values {
            if !value.is_finite() || value < 0.0 {
                return Err(SimulationError::invalid(
                    name,
                    format!("must be non-negative and finite, got {}", value),
                ));
            }
        }

        if self.susceptible_fraction + self.exposed_fraction > 1.0 {
            return Err(SimulationError::invalid(
                "exposed_fraction",
                format!(
                    "susceptible and exposed fractions sum to {} > 1",
                    self.susceptible_fraction + self.exposed_fraction
                ),
            ));
        }

        Ok(())
    }

    /// Build the state for `grid` from a uniform density
    ///
    /// # Example
    ///
    /// ```rust
    /// use seird_rs::models::SpatialInitialCondition;
    /// use seird_rs::physics::{Compartment, Grid};
    ///
    /// let grid = Grid::new((10, 10), (1.0, 1.0)).unwrap();
    /// let state = SpatialInitialCondition::default().build(&grid).unwrap();
    ///
    /// let s = state.get(Compartment::Susceptible)[[4, 7]];
    /// assert!((s - 0.89).abs() < 1e-12);
    /// ```
    pub fn build(&self, grid: &Grid) -> Result<CompartmentField> {
        grid.validate()?;
        self.build_from_density(Array2::from_elem(grid.shape, self.base_density))
    }

    /// Build the state from a caller-supplied density field (smoothed like the uniform one)
    pub fn build_from_density(&self, density: Array2<f64>) -> Result<CompartmentField> {
        self.validate()?;

        if density.iter().any(|value| !value.is_finite() || *value < 0.0) {
            return Err(SimulationError::invalid(
                "density",
                "every cell must be non-negative and finite",
            ));
        }

        let density = gaussian_filter(&density, self.smoothing);
        let shape = density.dim();

        let mut state = CompartmentField::zeros(shape);
        state.set(Compartment::Susceptible, &density * self.susceptible_fraction)?;
        state.set(Compartment::Exposed, &density * self.exposed_fraction)?;
        state.set(Compartment::Infected, Array2::from_elem(shape, self.infected_seed))?;

        Ok(state)
    }
}

// =================================================================================================
// Gaussian smoothing
// =================================================================================================

/// Normalised 1D Gaussian kernel, length `2·radius + 1` with `radius ≤ max_radius`
fn gaussian_kernel(sigma: f64, max_radius: usize) -> Vec<f64> {
    // float-to-int casts saturate, an infinite sigma lands on max_radius
    let radius = ((TRUNCATE * sigma + 0.5) as usize).min(max_radius);
    let variance = sigma * sigma;

    let mut kernel: Vec<f64> = (0..=2 * radius)
        .map(|k| {
            let x = k as f64 - radius as f64;
            (-0.5 * x * x / variance).exp()
        })
        .collect();

    let sum: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|weight| *weight /= sum);
    kernel
}

/// Reflect an out-of-range index back into `0..n` (`d c b a | a b c d | d c b a`)
#[inline]
fn reflect(index: isize, n: usize) -> usize {
    let period = 2 * n as isize;
    let folded = index.rem_euclid(period);
    if folded < n as isize {
        folded as usize
    } else {
        (period - 1 - folded) as usize
    }
}

/// Convolve every lane along `axis` with `kernel`
fn convolve_axis(field: &Array2<f64>, kernel: &[f64], axis: Axis) -> Array2<f64> {
    let radius = (kernel.len() / 2) as isize;
    let mut output = Array2::zeros(field.dim());

    for (lane, mut out_lane) in field.lanes(axis).into_iter().zip(output.lanes_mut(axis)) {
        let n = lane.len();
        for position in 0..n {
            out_lane[position] = kernel
                .iter()
                .enumerate()
                .map(|(k, weight)| weight * lane[reflect(position as isize + k as isize - radius, n)])
                .sum::<f64>();
        }
    }

    output
}

/// Separable Gaussian smoothing with reflecting edges
///
/// `sigma` is in cells; `sigma = 0` returns the field unchanged.
pub fn gaussian_filter(field: &Array2<f64>, sigma: f64) -> Array2<f64> {
    if sigma.is_nan() || sigma <= 0.0 || field.is_empty() {
        return field.clone();
    }

    let (nx, ny) = field.dim();
    let kernel = gaussian_kernel(sigma, nx.max(ny));
    let along_x = convolve_axis(field, &kernel, Axis(0));
    convolve_axis(&along_x, &kernel, Axis(1))
}

// =================================================================================================
// Lumped initial condition
// =================================================================================================

/// Builder for the initial lumped state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LumpedInitialCondition {
    /// Initial susceptible count
    pub susceptible: f64,
    /// Initial exposed count
    pub exposed: f64,
    /// Initial infected count
    pub infected: f64,
    /// Initial recovered count
    pub recovered: f64,
    /// Initial deceased count
    pub deceased: f64,
}

impl Default for LumpedInitialCondition {
    fn default() -> Self {
        Self {
            susceptible: 989.0,
            exposed: 10.0,
            infected: 1.0,
            recovered: 0.0,
            deceased: 0.0,
        }
    }
}

impl LumpedInitialCondition {
    /// Build the validated state
    pub fn build(&self) -> Result<CompartmentVector> {
        let values = [
            ("susceptible", self.susceptible),
            ("exposed", self.exposed),
            ("infected", self.infected),
            ("recovered", self.recovered),
            ("deceased", self.deceased),
        ];

        for (name, value) in values {
            if !value.is_finite() || value < 0.0 {
                return Err(SimulationError::invalid(
                    name,
                    format!("must be non-negative and finite, got {}", value),
                ));
            }
        }

        Ok(CompartmentVector::from_array(values.map(|(_, value)| value)))
    }
}

// =================================================================================================
// Tests
// =================================================================================================
