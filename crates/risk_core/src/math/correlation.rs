//! Correlation matrices with Cholesky decomposition.
//!
//! ## Mathematical Background
//!
//! Given `k` independent standard normal variables `Z = [Z1, ..., Zk]`, the
//! correlated normals `W = L * Z` have correlation `C` when `L` is the lower
//! triangular Cholesky factor of `C`:
//!
//! ```text
//! C = L * L^T
//! ```
//!
//! Risk factor correlation matrices supplied by users are frequently
//! positive semi-definite rather than strictly positive definite (for
//! example two perfectly correlated factors). The factorisation here
//! accepts zero pivots within [`PSD_TOLERANCE`] and rejects anything with a
//! genuinely negative pivot.
//!
//! ## Usage
//!
//! ```
//! use risk_core::math::correlation::CorrelationMatrix;
//!
//! let corr = CorrelationMatrix::from_rows(&[
//!     vec![1.0, 0.5],
//!     vec![0.5, 1.0],
//! ]).unwrap();
//!
//! let cholesky = corr.cholesky().unwrap();
//! let mut w = [0.0; 2];
//! cholesky.transform_into(&[0.5, 0.8], &mut w);
//! assert_eq!(w[0], 0.5);
//! ```

use thiserror::Error;

/// Tolerance for the unit diagonal and symmetry checks.
const ENTRY_TOLERANCE: f64 = 1e-10;

/// Tolerance below which a Cholesky pivot is treated as zero.
pub const PSD_TOLERANCE: f64 = 1e-10;

/// Residual allowed under a zero pivot before the matrix is declared indefinite.
const RESIDUAL_TOLERANCE: f64 = 1e-8;

/// Error types for correlation operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CorrelationError {
    /// Matrix has no rows.
    #[error("Correlation matrix is empty")]
    Empty,

    /// Flat data length does not match the requested dimension.
    #[error("Invalid matrix dimensions: expected {expected} elements, got {got}")]
    InvalidDimensions {
        /// Expected number of elements.
        expected: usize,
        /// Actual number of elements.
        got: usize,
    },

    /// A row has the wrong number of columns.
    #[error("Row {row} has {got} columns, expected {expected}")]
    NotSquare {
        /// Offending row index.
        row: usize,
        /// Expected number of columns.
        expected: usize,
        /// Actual number of columns.
        got: usize,
    },

    /// Matrix contains NaN or infinity.
    #[error("Correlation at ({i}, {j}) is not finite")]
    NonFinite {
        /// Row index.
        i: usize,
        /// Column index.
        j: usize,
    },

    /// Diagonal elements are not 1.0.
    #[error("Diagonal element at index {index} is {value}, expected 1.0")]
    InvalidDiagonal {
        /// Diagonal index.
        index: usize,
        /// Actual value.
        value: f64,
    },

    /// Matrix is not symmetric.
    #[error("Matrix is not symmetric at ({i}, {j})")]
    NotSymmetric {
        /// Row index.
        i: usize,
        /// Column index.
        j: usize,
    },

    /// Correlation value out of range [-1, 1].
    #[error("Correlation at ({i}, {j}) is {value}, must be in [-1, 1]")]
    OutOfRange {
        /// Row index.
        i: usize,
        /// Column index.
        j: usize,
        /// Actual value.
        value: f64,
    },

    /// Matrix is not positive semi-definite.
    #[error("Correlation matrix is not positive semi-definite (pivot {index})")]
    NotPositiveSemiDefinite {
        /// Pivot at which the factorisation failed.
        index: usize,
    },
}

/// Correlation matrix with validation and Cholesky decomposition.
///
/// A correlation matrix must satisfy:
/// - Square and symmetric
/// - Diagonal elements equal to 1.0
/// - Off-diagonal elements in [-1, 1]
/// - Positive semi-definite (checked by [`CorrelationMatrix::cholesky`])
#[derive(Clone, Debug, PartialEq)]
pub struct CorrelationMatrix {
    /// Matrix elements in row-major order
    data: Vec<f64>,
    /// Matrix dimension (n x n)
    dim: usize,
}

impl CorrelationMatrix {
    /// Create a new correlation matrix from a flat row-major array.
    ///
    /// # Errors
    ///
    /// Returns `CorrelationError` if the element count is not `dim * dim`,
    /// or if any entry is non-finite, off-range, asymmetric or a diagonal
    /// element differs from 1.0.
    pub fn new(data: &[f64], dim: usize) -> Result<Self, CorrelationError> {
        if dim == 0 {
            return Err(CorrelationError::Empty);
        }
        let expected = dim * dim;
        if data.len() != expected {
            return Err(CorrelationError::InvalidDimensions {
                expected,
                got: data.len(),
            });
        }

        for i in 0..dim {
            for j in 0..dim {
                if !data[i * dim + j].is_finite() {
                    return Err(CorrelationError::NonFinite { i, j });
                }
            }
        }

        for i in 0..dim {
            let diag = data[i * dim + i];
            if (diag - 1.0).abs() > ENTRY_TOLERANCE {
                return Err(CorrelationError::InvalidDiagonal {
                    index: i,
                    value: diag,
                });
            }
        }

        for i in 0..dim {
            for j in (i + 1)..dim {
                let val_ij = data[i * dim + j];
                let val_ji = data[j * dim + i];

                if (val_ij - val_ji).abs() > ENTRY_TOLERANCE {
                    return Err(CorrelationError::NotSymmetric { i, j });
                }
                if !(-1.0..=1.0).contains(&val_ij) {
                    return Err(CorrelationError::OutOfRange {
                        i,
                        j,
                        value: val_ij,
                    });
                }
            }
        }

        Ok(Self {
            data: data.to_vec(),
            dim,
        })
    }

    /// Create a correlation matrix from nested rows, as received on the wire.
    ///
    /// # Errors
    ///
    /// Returns [`CorrelationError::NotSquare`] for ragged input, otherwise
    /// the same errors as [`CorrelationMatrix::new`].
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, CorrelationError> {
        let dim = rows.len();
        let mut data = Vec::with_capacity(dim * dim);
        for (row, values) in rows.iter().enumerate() {
            if values.len() != dim {
                return Err(CorrelationError::NotSquare {
                    row,
                    expected: dim,
                    got: values.len(),
                });
            }
            data.extend_from_slice(values);
        }
        Self::new(&data, dim)
    }

    /// Create an identity correlation matrix (no correlation).
    pub fn identity(dim: usize) -> Self {
        let mut data = vec![0.0; dim * dim];
        for i in 0..dim {
            data[i * dim + i] = 1.0;
        }
        Self { data, dim }
    }

    /// Get matrix dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Get element at (i, j).
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.dim + j]
    }

    /// Compute the Cholesky decomposition (lower triangular L where C = L * L^T).
    ///
    /// Zero pivots (within [`PSD_TOLERANCE`]) are allowed so that positive
    /// semi-definite matrices factorise; the corresponding column of `L`
    /// is zero.
    ///
    /// # Errors
    ///
    /// [`CorrelationError::NotPositiveSemiDefinite`] if a pivot is
    /// negative, or if a zero pivot leaves a non-zero residual below it.
    pub fn cholesky(&self) -> Result<CholeskyFactor, CorrelationError> {
        let n = self.dim;
        let mut lower = vec![0.0; n * n];

        for i in 0..n {
            for j in 0..=i {
                let mut sum = 0.0;
                for k in 0..j {
                    sum += lower[i * n + k] * lower[j * n + k];
                }

                if j == i {
                    let diag = self.get(i, i) - sum;
                    if diag < -PSD_TOLERANCE {
                        return Err(CorrelationError::NotPositiveSemiDefinite { index: i });
                    }
                    lower[i * n + i] = diag.max(0.0).sqrt();
                } else {
                    let residual = self.get(i, j) - sum;
                    let l_jj = lower[j * n + j];
                    if l_jj <= PSD_TOLERANCE.sqrt() {
                        if residual.abs() > RESIDUAL_TOLERANCE {
                            return Err(CorrelationError::NotPositiveSemiDefinite { index: j });
                        }
                        lower[i * n + j] = 0.0;
                    } else {
                        lower[i * n + j] = residual / l_jj;
                    }
                }
            }
        }

        Ok(CholeskyFactor { data: lower, dim: n })
    }
}

/// Lower triangular Cholesky factor of a correlation matrix.
///
/// Used to transform independent standard normals into correlated normals.
#[derive(Clone, Debug, PartialEq)]
pub struct CholeskyFactor {
    /// Lower triangular matrix elements (row-major)
    data: Vec<f64>,
    /// Matrix dimension
    dim: usize,
}

impl CholeskyFactor {
    /// Factor of the identity matrix.
    pub fn identity(dim: usize) -> Self {
        let CorrelationMatrix { data, dim } = CorrelationMatrix::identity(dim);
        Self { data, dim }
    }

    /// Get matrix dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Get element at (i, j).
    ///
    /// Returns zero for upper triangular elements (j > i).
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if j > i {
            0.0
        } else {
            self.data[i * self.dim + j]
        }
    }

    /// Transform independent standard normals to correlated normals.
    ///
    /// Computes W = L * Z into `out`. For a row vector of scores this is the
    /// same as `z * L^T`.
    ///
    /// # Panics
    ///
    /// Panics if either slice is shorter than `self.dim()`.
    pub fn transform_into(&self, z: &[f64], out: &mut [f64]) {
        assert!(
            z.len() >= self.dim && out.len() >= self.dim,
            "Input length {} / output length {} is less than matrix dimension {}",
            z.len(),
            out.len(),
            self.dim
        );

        let n = self.dim;
        for i in 0..n {
            let row = &self.data[i * n..i * n + i + 1];
            out[i] = row.iter().zip(z).map(|(l, z)| l * z).sum();
        }
    }
}
