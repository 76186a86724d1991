//! Rectangular grid geometry
//!
//! Axis 0 is `x`, axis 1 is `y`. Cell `(i, j)` sits at
//! `(i · hx, j · hy)` with `h = extent / (points − 1)`, so the first and last
//! cells lie on the domain edges.

use crate::error::{Result, SimulationError};
use serde::{Deserialize, Serialize};

/// Fixed-size rectangular grid with a physical extent
///
/// # Example
///
/// ```
/// use seird_rs::physics::Grid;
///
/// let grid = Grid::new((100, 100), (13.0, 12.0)).unwrap();
/// let (hx, hy) = grid.spacing();
///
/// assert!((hx - 13.0 / 99.0).abs() < 1e-15);
/// assert!((hy - 12.0 / 99.0).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    /// Number of points along each axis
    pub shape: (usize, usize),
    /// Physical length along each axis
    pub extent: (f64, f64),
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            shape: (100, 100),
            extent: (13.0, 12.0),
        }
    }
}

impl Grid {
    /// Create a validated grid
    pub fn new(shape: (usize, usize), extent: (f64, f64)) -> Result<Self> {
        let grid = Self { shape, extent };
        grid.validate()?;
        Ok(grid)
    }

    /// Check at least two points and a positive, finite extent per axis
    pub fn validate(&self) -> Result<()> {
        if self.shape.0 < 2 || self.shape.1 < 2 {
            return Err(SimulationError::invalid(
                "shape",
                format!("each axis needs at least 2 points, got {:?}", self.shape),
            ));
        }

        for extent in [self.extent.0, self.extent.1] {
            if !extent.is_finite() || extent <= 0.0 {
                return Err(SimulationError::invalid(
                    "extent",
                    format!("must be positive and finite, got {:?}", self.extent),
                ));
            }
        }

        Ok(())
    }

    /// Number of cells
    pub fn cells(&self) -> usize {
        self.shape.0 * self.shape.1
    }

    /// Grid spacing `(hx, hy)`
    pub fn spacing(&self) -> (f64, f64) {
        (
            self.extent.0 / (self.shape.0 - 1) as f64,
            self.extent.1 / (self.shape.1 - 1) as f64,
        )
    }

    /// Physical coordinates of cell `(i, j)`
    pub fn coordinates(&self, i: usize, j: usize) -> (f64, f64) {
        let (hx, hy) = self.spacing();
        (i as f64 * hx, j as f64 * hy)
    }

    /// Explicit diffusion number `ν·Δt·(1/hx² + 1/hy²)`
    ///
    /// Forward Euler on the 5-point stencil is stable for values ≤ 1/2.
    pub fn diffusion_number(&self, diffusion: f64, time_step: f64) -> f64 {
        let (hx, hy) = self.spacing();
        diffusion * time_step * (1.0 / (hx * hx) + 1.0 / (hy * hy))
    }

    /// Largest time step with a diffusion number of 1/2 (infinite for ν = 0)
    pub fn stable_time_step(&self, diffusion: f64) -> f64 {
        if diffusion <= 0.0 {
            return f64::INFINITY;
        }
        let (hx, hy) = self.spacing();
        0.5 / (diffusion * (1.0 / (hx * hx) + 1.0 / (hy * hy)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_single_point_axis() {
        assert!(Grid::new((1, 10), (1.0, 1.0)).is_err());
        assert!(Grid::new((10, 0), (1.0, 1.0)).is_err());
    }

    #[test]
    fn test_reject_non_positive_extent() {
        assert!(Grid::new((10, 10), (0.0, 1.0)).is_err());
        assert!(Grid::new((10, 10), (1.0, f64::NAN)).is_err());
    }

    #[test]
    fn test_edges_on_domain_boundary() {
        let grid = Grid::new((11, 5), (2.0, 1.0)).unwrap();
        let (x, y) = grid.coordinates(10, 4);

        assert!((x - 2.0).abs() < 1e-12);
        assert!((y - 1.0).abs() < 1e-12);
        assert_eq!(grid.cells(), 55);
    }

    #[test]
    fn test_stability_threshold() {
        let grid = Grid::default();
        let limit = grid.stable_time_step(1e-4);

        assert!((grid.diffusion_number(1e-4, limit) - 0.5).abs() < 1e-12);
        assert!(grid.diffusion_number(1e-4, 0.01) < 0.5);
        assert_eq!(grid.stable_time_step(0.0), f64::INFINITY);
    }
}
