//! Boundary closure and the discrete Laplacian
//!
//! # Design Philosophy
//!
//! The 5-point stencil reaches one cell beyond the grid at every edge. What
//! sits in that ghost cell is the boundary condition, and it is always
//! explicit: the grid model carries a [`BoundaryCondition`] and never relies
//! on an implicit library default.
//!
//! ```text
//!             u[i, j+1]
//!                 │
//! u[i-1, j] ── u[i, j] ── u[i+1, j]       ∇²u ≈ (u[i-1,j] − 2u[i,j] + u[i+1,j]) / hx²
//!                 │                          + (u[i,j-1] − 2u[i,j] + u[i,j+1]) / hy²
//!             u[i, j-1]
//! ```

use crate::physics::Grid;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

// =================================================================================================
// Boundary Condition
// =================================================================================================

/// Value taken by the ghost cells outside the grid
///
/// # Examples
///
/// ```rust
/// use seird_rs::solver::BoundaryCondition;
///
/// // Zero-flux, conserves population under diffusion
/// let closed = BoundaryCondition::default();
/// assert_eq!(closed, BoundaryCondition::Neumann);
///
/// // Absorbing edge
/// let absorbing = BoundaryCondition::Dirichlet(0.0);
/// assert!(!absorbing.conserves_mass());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryCondition {
    /// Zero flux: the ghost cell mirrors the edge cell
    #[default]
    Neumann,

    /// Fixed ghost value (0 gives a zero-padded halo)
    Dirichlet(f64),

    /// Opposite edges are neighbours
    Periodic,
}

impl BoundaryCondition {
    /// Whether diffusion alone keeps the grid total constant
    pub fn conserves_mass(&self) -> bool {
        matches!(self, BoundaryCondition::Neumann | BoundaryCondition::Periodic)
    }

    /// Value at `(i + di, j + dj)`, resolving ghost cells
    #[inline]
    fn neighbour(&self, field: &Array2<f64>, i: usize, j: usize, di: isize, dj: isize) -> f64 {
        let (nx, ny) = field.dim();
        let ni = i as isize + di;
        let nj = j as isize + dj;

        if ni >= 0 && nj >= 0 && (ni as usize) < nx && (nj as usize) < ny {
            return field[[ni as usize, nj as usize]];
        }

        match self {
            BoundaryCondition::Neumann => field[[i, j]],
            BoundaryCondition::Dirichlet(value) => *value,
            BoundaryCondition::Periodic => field[[
                ni.rem_euclid(nx as isize) as usize,
                nj.rem_euclid(ny as isize) as usize,
            ]],
        }
    }
}

impl fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryCondition::Neumann => write!(f, "neumann"),
            BoundaryCondition::Dirichlet(value) => write!(f, "dirichlet({})", value),
            BoundaryCondition::Periodic => write!(f, "periodic"),
        }
    }
}

// =================================================================================================
// Laplacian
// =================================================================================================

/// `(1/hx², 1/hy²)` for the stencil
#[inline]
pub fn stencil_weights(grid: &Grid) -> (f64, f64) {
    let (hx, hy) = grid.spacing();
    (1.0 / (hx * hx), 1.0 / (hy * hy))
}

/// 5-point Laplacian of `field` at cell `(i, j)`
///
/// `weights` comes from [`stencil_weights`].
#[inline]
pub fn laplacian_at(
    field: &Array2<f64>,
    i: usize,
    j: usize,
    weights: (f64, f64),
    boundary: BoundaryCondition,
) -> f64 {
    let centre = field[[i, j]];
    let west = boundary.neighbour(field, i, j, -1, 0);
    let east = boundary.neighbour(field, i, j, 1, 0);
    let south = boundary.neighbour(field, i, j, 0, -1);
    let north = boundary.neighbour(field, i, j, 0, 1);

    (west - 2.0 * centre + east) * weights.0 + (south - 2.0 * centre + north) * weights.1
}

/// 5-point Laplacian of a whole field
///
/// # Example
///
/// ```rust
/// use ndarray::Array2;
/// use seird_rs::physics::Grid;
/// use seird_rs::solver::{laplacian, BoundaryCondition};
///
/// let grid = Grid::new((8, 8), (1.0, 1.0)).unwrap();
/// let uniform = Array2::from_elem((8, 8), 3.0);
///
/// let result = laplacian(&uniform, &grid, BoundaryCondition::Neumann);
/// assert!(result.iter().all(|value| value.abs() < 1e-9));
/// ```
pub fn laplacian(field: &Array2<f64>, grid: &Grid, boundary: BoundaryCondition) -> Array2<f64> {
    let weights = stencil_weights(grid);
    Array2::from_shape_fn(field.dim(), |(i, j)| laplacian_at(field, i, j, weights, boundary))
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(nx: usize, ny: usize) -> Grid {
        Grid::new((nx, ny), (1.0, 2.0)).unwrap()
    }

    fn bump(nx: usize, ny: usize) -> Array2<f64> {
        Array2::from_shape_fn((nx, ny), |(i, j)| ((i * 7 + j * 3) % 5) as f64 + 0.25 * i as f64)
    }

    #[test]
    fn test_uniform_field_has_zero_laplacian() {
        let uniform = Array2::from_elem((6, 9), 2.5);

        for boundary in [BoundaryCondition::Neumann, BoundaryCondition::Periodic] {
            let result = laplacian(&uniform, &grid(6, 9), boundary);
            assert!(result.iter().all(|value| value.abs() < 1e-9), "{boundary}");
        }
    }

    #[test]
    fn test_neumann_laplacian_sums_to_zero() {
        let field = bump(10, 7);
        let result = laplacian(&field, &grid(10, 7), BoundaryCondition::Neumann);

        assert!(result.sum().abs() < 1e-8);
    }

    #[test]
    fn test_periodic_laplacian_sums_to_zero() {
        let field = bump(5, 6);
        let result = laplacian(&field, &grid(5, 6), BoundaryCondition::Periodic);

        assert!(result.sum().abs() < 1e-8);
    }

    #[test]
    fn test_dirichlet_zero_drains_uniform_field() {
        let uniform = Array2::from_elem((4, 4), 1.0);
        let g = grid(4, 4);
        let result = laplacian(&uniform, &g, BoundaryCondition::Dirichlet(0.0));
        let (wx, wy) = stencil_weights(&g);

        // Corner loses to both ghost neighbours, interior is untouched
        assert!((result[[0, 0]] + wx + wy).abs() < 1e-9);
        assert!(result[[1, 1]].abs() < 1e-12);
        assert!(result.sum() < 0.0);
    }

    #[test]
    fn test_interior_matches_second_difference() {
        // u = x² has ∇²u = 2 everywhere inside the grid
        let g = Grid::new((11, 5), (1.0, 1.0)).unwrap();
        let (hx, _) = g.spacing();
        let field = Array2::from_shape_fn((11, 5), |(i, _)| (i as f64 * hx).powi(2));

        let result = laplacian(&field, &g, BoundaryCondition::Neumann);
        assert!((result[[5, 2]] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_periodic_wraps_edges() {
        let mut field = Array2::zeros((4, 4));
        field[[3, 0]] = 1.0;
        let g = Grid::new((4, 4), (3.0, 3.0)).unwrap();

        // spacing is 1, so the west neighbour of (0, 0) contributes 1
        let value = laplacian_at(&field, 0, 0, stencil_weights(&g), BoundaryCondition::Periodic);
        assert!((value - 1.0).abs() < 1e-12);
    }
}
