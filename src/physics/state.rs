//! Compartment state containers
//!
//! Two concrete states implement [`CompartmentState`]:
//!
//! - **CompartmentVector**: five scalars for the lumped model (`nalgebra::Vector5`)
//! - **CompartmentField**: five 2D arrays of equal shape for the grid model (`ndarray::Array2`)
//!
//! # Memory Layout
//!
//! - **CompartmentVector**: 40 bytes, stack allocated
//! - **CompartmentField[n×m]**: 5 × 8nm bytes

use crate::error::{Result, SimulationError};
use crate::physics::traits::{Compartment, CompartmentState, CompartmentTotals};
use nalgebra::Vector5;
use ndarray::Array2;
use std::fmt;

// =================================================================================================
// Lumped state
// =================================================================================================

/// Five population counts (S, E, I, R, D)
///
/// # Example
///
/// ```
/// use seird_rs::physics::{Compartment, CompartmentVector};
///
/// let state = CompartmentVector::new(989.0, 10.0, 1.0, 0.0, 0.0);
/// assert_eq!(state.get(Compartment::Infected), 1.0);
/// assert_eq!(state.living_population(), 1000.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompartmentVector(Vector5<f64>);

impl CompartmentVector {
    /// Create from the five compartment values
    pub fn new(susceptible: f64, exposed: f64, infected: f64, recovered: f64, deceased: f64) -> Self {
        Self(Vector5::new(susceptible, exposed, infected, recovered, deceased))
    }

    /// Create from values in storage order
    pub fn from_array(values: [f64; Compartment::COUNT]) -> Self {
        Self(Vector5::from(values))
    }

    /// All compartments empty
    pub fn zeros() -> Self {
        Self(Vector5::zeros())
    }

    /// Value of one compartment
    #[inline]
    pub fn get(&self, compartment: Compartment) -> f64 {
        self.0[compartment.index()]
    }

    /// Overwrite one compartment
    #[inline]
    pub fn set(&mut self, compartment: Compartment, value: f64) {
        self.0[compartment.index()] = value;
    }

    /// Underlying nalgebra vector
    pub fn as_vector(&self) -> &Vector5<f64> {
        &self.0
    }

    /// Values in storage order
    pub fn to_array(&self) -> [f64; Compartment::COUNT] {
        self.0.into()
    }

    /// Living population N = S + E + I + R
    pub fn living_population(&self) -> f64 {
        self.0.rows(0, 4).sum()
    }

    /// S + E + I + R + D
    pub fn total_population(&self) -> f64 {
        self.0.sum()
    }
}

impl From<Vector5<f64>> for CompartmentVector {
    fn from(vector: Vector5<f64>) -> Self {
        Self(vector)
    }
}

impl std::ops::Add for CompartmentVector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::Mul<f64> for CompartmentVector {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self::Output {
        Self(self.0 * scalar)
    }
}

impl CompartmentState for CompartmentVector {
    fn totals(&self) -> CompartmentTotals {
        CompartmentTotals::new(self.to_array())
    }

    fn scale(&self, factor: f64) -> Self {
        Self(self.0 * factor)
    }

    fn linear_combination(&self, terms: &[(f64, &Self)]) -> Self {
        let mut combined = self.0;
        for (coefficient, term) in terms {
            combined += term.0 * *coefficient;
        }
        Self(combined)
    }

    fn clamp_non_negative(&mut self) -> usize {
        let mut clamped = 0;
        for value in self.0.iter_mut() {
            if *value < 0.0 {
                *value = 0.0;
                clamped += 1;
            }
        }
        clamped
    }

    fn first_non_finite(&self) -> Option<Compartment> {
        Compartment::ALL
            .into_iter()
            .find(|compartment| !self.get(*compartment).is_finite())
    }

    fn error_norm(&self, previous: &Self, next: &Self, atol: f64, rtol: f64) -> f64 {
        let mut sum = 0.0;
        for i in 0..Compartment::COUNT {
            let scale = atol + rtol * previous.0[i].abs().max(next.0[i].abs());
            let ratio = self.0[i] / scale;
            sum += ratio * ratio;
        }
        (sum / Compartment::COUNT as f64).sqrt()
    }
}

impl fmt::Display for CompartmentVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "S={:.4} E={:.4} I={:.4} R={:.4} D={:.4}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4]
        )
    }
}

// =================================================================================================
// Spatial state
// =================================================================================================

/// Five density fields over a rectangular grid
///
/// All fields always share one shape; constructors and [`set`](Self::set)
/// refuse anything else.
#[derive(Debug, Clone, PartialEq)]
pub struct CompartmentField {
    fields: [Array2<f64>; Compartment::COUNT],
}

impl CompartmentField {
    /// Assemble from five fields of identical shape
    pub fn new(
        susceptible: Array2<f64>,
        exposed: Array2<f64>,
        infected: Array2<f64>,
        recovered: Array2<f64>,
        deceased: Array2<f64>,
    ) -> Result<Self> {
        let fields = [susceptible, exposed, infected, recovered, deceased];
        let expected = fields[0].dim();

        for field in &fields[1..] {
            if field.dim() != expected {
                return Err(SimulationError::ShapeMismatch {
                    expected,
                    found: field.dim(),
                });
            }
        }

        Ok(Self { fields })
    }

    /// Every compartment zero everywhere
    pub fn zeros(shape: (usize, usize)) -> Self {
        Self::uniform(shape, [0.0; Compartment::COUNT])
    }

    /// Every cell holds the same five values
    pub fn uniform(shape: (usize, usize), values: [f64; Compartment::COUNT]) -> Self {
        Self {
            fields: values.map(|value| Array2::from_elem(shape, value)),
        }
    }

    /// Build from per-cell values laid out in row-major order
    ///
    /// Used to scatter the result of a per-cell computation back into fields.
    pub fn from_cells(shape: (usize, usize), cells: &[[f64; Compartment::COUNT]]) -> Result<Self> {
        if cells.len() != shape.0 * shape.1 {
            return Err(SimulationError::ShapeMismatch {
                expected: shape,
                found: (cells.len(), 1),
            });
        }

        let mut state = Self::zeros(shape);
        for (k, field) in state.fields.iter_mut().enumerate() {
            for (value, cell) in field.iter_mut().zip(cells) {
                *value = cell[k];
            }
        }
        Ok(state)
    }

    /// Grid shape
    pub fn shape(&self) -> (usize, usize) {
        self.fields[0].dim()
    }

    /// Number of cells
    pub fn cells(&self) -> usize {
        self.fields[0].len()
    }

    /// Field of one compartment
    pub fn get(&self, compartment: Compartment) -> &Array2<f64> {
        &self.fields[compartment.index()]
    }

    /// Mutable field of one compartment
    pub fn get_mut(&mut self, compartment: Compartment) -> &mut Array2<f64> {
        &mut self.fields[compartment.index()]
    }

    /// Replace one field, keeping the common shape
    pub fn set(&mut self, compartment: Compartment, field: Array2<f64>) -> Result<()> {
        if field.dim() != self.shape() {
            return Err(SimulationError::ShapeMismatch {
                expected: self.shape(),
                found: field.dim(),
            });
        }
        self.fields[compartment.index()] = field;
        Ok(())
    }

    /// The five values of cell `(i, j)`
    #[inline]
    pub fn cell(&self, i: usize, j: usize) -> CompartmentVector {
        CompartmentVector::from_array(self.fields.each_ref().map(|field| field[[i, j]]))
    }

    /// Overwrite cell `(i, j)`
    pub fn set_cell(&mut self, i: usize, j: usize, values: &CompartmentVector) {
        for compartment in Compartment::ALL {
            self.fields[compartment.index()][[i, j]] = values.get(compartment);
        }
    }
}

impl CompartmentState for CompartmentField {
    fn totals(&self) -> CompartmentTotals {
        CompartmentTotals::new(self.fields.each_ref().map(|field| field.sum()))
    }

    fn scale(&self, factor: f64) -> Self {
        Self {
            fields: self.fields.each_ref().map(|field| field * factor),
        }
    }

    fn linear_combination(&self, terms: &[(f64, &Self)]) -> Self {
        let mut combined = self.clone();
        for (coefficient, term) in terms {
            for (field, other) in combined.fields.iter_mut().zip(term.fields.iter()) {
                field.scaled_add(*coefficient, other);
            }
        }
        combined
    }

    fn clamp_non_negative(&mut self) -> usize {
        let mut clamped = 0;
        for field in self.fields.iter_mut() {
            for value in field.iter_mut() {
                if *value < 0.0 {
                    *value = 0.0;
                    clamped += 1;
                }
            }
        }
        clamped
    }

    fn first_non_finite(&self) -> Option<Compartment> {
        Compartment::ALL
            .into_iter()
            .find(|compartment| self.get(*compartment).iter().any(|value| !value.is_finite()))
    }

    fn error_norm(&self, previous: &Self, next: &Self, atol: f64, rtol: f64) -> f64 {
        let mut sum = 0.0;
        let mut count = 0usize;

        for k in 0..Compartment::COUNT {
            let values = self.fields[k]
                .iter()
                .zip(previous.fields[k].iter())
                .zip(next.fields[k].iter());

            for ((error, before), after) in values {
                let scale = atol + rtol * before.abs().max(after.abs());
                let ratio = error / scale;
                sum += ratio * ratio;
                count += 1;
            }
        }

        if count == 0 {
            return 0.0;
        }
        (sum / count as f64).sqrt()
    }
}

impl fmt::Display for CompartmentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (nx, ny) = self.shape();
        let totals = self.totals();
        write!(
            f,
            "CompartmentField[{}×{}] ΣS={:.4} ΣE={:.4} ΣI={:.4} ΣR={:.4} ΣD={:.4}",
            nx,
            ny,
            totals.get(Compartment::Susceptible),
            totals.get(Compartment::Exposed),
            totals.get(Compartment::Infected),
            totals.get(Compartment::Recovered),
            totals.get(Compartment::Deceased),
        )
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_populations() {
        let state = CompartmentVector::new(989.0, 10.0, 1.0, 0.0, 3.0);

        assert_eq!(state.living_population(), 1000.0);
        assert_eq!(state.total_population(), 1003.0);
    }

    #[test]
    fn test_vector_operators() {
        let a = CompartmentVector::new(1.0, 2.0, 3.0, 4.0, 5.0);
        let b = a + a * 2.0;

        assert_eq!(b.to_array(), [3.0, 6.0, 9.0, 12.0, 15.0]);
    }

    #[test]
    fn test_vector_linear_combination() {
        let y = CompartmentVector::new(1.0, 1.0, 1.0, 1.0, 1.0);
        let k1 = CompartmentVector::new(1.0, 0.0, 0.0, 0.0, 0.0);
        let k2 = CompartmentVector::new(0.0, 2.0, 0.0, 0.0, 0.0);

        let combined = y.linear_combination(&[(0.5, &k1), (-1.0, &k2)]);
        assert_eq!(combined.to_array(), [1.5, -1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_vector_clamp_counts() {
        let mut state = CompartmentVector::new(-1.0, 2.0, -0.5, 0.0, 1.0);

        assert_eq!(state.clamp_non_negative(), 2);
        assert_eq!(state.to_array(), [0.0, 2.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_vector_non_finite_detection() {
        let mut state = CompartmentVector::zeros();
        assert_eq!(state.first_non_finite(), None);

        state.set(Compartment::Recovered, f64::NAN);
        assert_eq!(state.first_non_finite(), Some(Compartment::Recovered));
    }

    #[test]
    fn test_vector_error_norm() {
        let error = CompartmentVector::new(1e-9, 1e-9, 1e-9, 1e-9, 1e-9);
        let zero = CompartmentVector::zeros();

        let norm = error.error_norm(&zero, &zero, 1e-9, 1e-6);
        assert!((norm - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_field_shape_mismatch() {
        let ok = Array2::<f64>::zeros((3, 3));
        let bad = Array2::<f64>::zeros((3, 4));

        let result = CompartmentField::new(ok.clone(), ok.clone(), bad, ok.clone(), ok);
        assert!(matches!(result, Err(SimulationError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_field_totals() {
        let field = CompartmentField::uniform((4, 5), [0.89, 0.1, 0.01, 0.0, 0.0]);
        let totals = field.totals();

        assert!((totals.get(Compartment::Susceptible) - 0.89 * 20.0).abs() < 1e-12);
        assert!((totals.living() - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_field_from_cells_row_major() {
        let cells: Vec<[f64; 5]> = (0..6).map(|k| [k as f64, 0.0, 0.0, 0.0, 0.0]).collect();
        let field = CompartmentField::from_cells((2, 3), &cells).unwrap();

        assert_eq!(field.get(Compartment::Susceptible)[[0, 2]], 2.0);
        assert_eq!(field.get(Compartment::Susceptible)[[1, 0]], 3.0);
        assert!(CompartmentField::from_cells((2, 2), &cells).is_err());
    }

    #[test]
    fn test_field_linear_combination_and_clamp() {
        let base = CompartmentField::uniform((2, 2), [1.0, 1.0, 1.0, 1.0, 1.0]);
        let rate = CompartmentField::uniform((2, 2), [-3.0, 0.0, 0.0, 0.0, 1.0]);

        let mut next = base.linear_combination(&[(0.5, &rate)]);
        assert_eq!(next.get(Compartment::Susceptible)[[1, 1]], -0.5);
        assert_eq!(next.get(Compartment::Deceased)[[0, 0]], 1.5);

        assert_eq!(next.clamp_non_negative(), 4);
        assert_eq!(next.get(Compartment::Susceptible)[[1, 1]], 0.0);
    }

    #[test]
    fn test_field_cell_access() {
        let mut field = CompartmentField::zeros((3, 3));
        field.set_cell(1, 2, &CompartmentVector::new(1.0, 2.0, 3.0, 4.0, 5.0));

        assert_eq!(field.cell(1, 2).get(Compartment::Infected), 3.0);
        assert_eq!(field.get(Compartment::Deceased)[[1, 2]], 5.0);
    }
}
