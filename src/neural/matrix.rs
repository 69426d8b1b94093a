//! Dense row-major matrix used for weights, biases and activations.

use crate::error::{EvoError, Result};
use ndarray::Array2;
use rand::Rng;

/// A dense 2-D matrix of `f32` values
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    data: Array2<f32>,
}

impl Matrix {
    /// Create a zero-filled matrix
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(EvoError::InvalidShape { rows, cols });
        }
        Ok(Self {
            data: Array2::zeros((rows, cols)),
        })
    }

    /// Create a matrix filled with uniform values in [-1, 1)
    pub fn random<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> Result<Self> {
        let mut matrix = Self::new(rows, cols)?;
        matrix.randomize(rng);
        Ok(matrix)
    }

    /// Build a column vector (n x 1) from a slice, in order
    pub fn from_vector(values: &[f32]) -> Result<Self> {
        if values.is_empty() {
            return Err(EvoError::InvalidShape { rows: 0, cols: 1 });
        }
        let data = Array2::from_shape_fn((values.len(), 1), |(r, _)| values[r]);
        Ok(Self { data })
    }

    /// Build a matrix from row-major values
    pub fn from_row_major(rows: usize, cols: usize, values: Vec<f32>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(EvoError::InvalidShape { rows, cols });
        }
        let len = values.len();
        let data = Array2::from_shape_vec((rows, cols), values).map_err(|_| EvoError::ShapeMismatch {
            op: "from_row_major",
            left: (rows, cols),
            right: (len, 1),
        })?;
        Ok(Self { data })
    }

    /// Flatten in row order
    pub fn to_vector(&self) -> Vec<f32> {
        self.data.iter().copied().collect()
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Number of cells
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value at (row, col), `None` when out of range
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        self.data.get((row, col)).copied()
    }

    /// Overwrite the value at (row, col)
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f32) -> Result<()> {
        let (rows, cols) = self.shape();
        let cell = self
            .data
            .get_mut((row, col))
            .ok_or(EvoError::OutOfRange { row, col, rows, cols })?;
        *cell = value;
        Ok(())
    }

    /// Cells in row order
    pub fn iter(&self) -> impl Iterator<Item = &f32> {
        self.data.iter()
    }

    /// Mutable cells in row order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut f32> {
        self.data.iter_mut()
    }

    /// Refill every cell with an independent uniform draw in [-1, 1)
    pub fn randomize<R: Rng>(&mut self, rng: &mut R) {
        self.data.mapv_inplace(|_| rng.gen_range(-1.0..1.0));
    }

    /// Elementwise in-place sum. Leaves `self` untouched on mismatch.
    pub fn add(&mut self, other: &Matrix) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(EvoError::ShapeMismatch {
                op: "add",
                left: self.shape(),
                right: other.shape(),
            });
        }
        self.data += &other.data;
        Ok(())
    }

    /// Standard matrix product `a · b`
    pub fn multiply(a: &Matrix, b: &Matrix) -> Result<Matrix> {
        if a.cols() != b.rows() {
            return Err(EvoError::ShapeMismatch {
                op: "multiply",
                left: a.shape(),
                right: b.shape(),
            });
        }
        Ok(Matrix {
            data: a.data.dot(&b.data),
        })
    }

    /// In-place logistic activation
    pub fn sigmoid(&mut self) {
        self.data.mapv_inplace(sigmoid);
    }
}

/// Largest f32 below 1.0
const BELOW_ONE: f32 = 1.0 - f32::EPSILON / 2.0;

/// `1 / (1 + e^-x)`, kept strictly inside (0, 1) for every finite `x`.
///
/// f32 rounds the plain formula to exactly 1.0 from about x = 17, and to 0.0
/// far below zero, so the result is clamped to the nearest representable
/// values inside the interval.
#[inline]
pub fn sigmoid(x: f32) -> f32 {
    let y = if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    };
    y.clamp(f32::MIN_POSITIVE, BELOW_ONE)
}
