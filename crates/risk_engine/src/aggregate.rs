//! Sample matrices and per-iteration aggregation.
//!
//! A [`SampleMatrix`] stores one column per risk factor (in request order)
//! and one row per iteration. [`AggregationMethod`] collapses each row into
//! a single loss figure.

use crate::error::RiskError;
use serde::{Deserialize, Serialize};

/// Column-major matrix of per-factor samples.
///
/// Invariant: every column has exactly `n_rows` entries.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleMatrix {
    n_rows: usize,
    columns: Vec<Vec<f64>>,
}

impl SampleMatrix {
    /// Stacks factor columns into a matrix.
    ///
    /// # Errors
    ///
    /// `RiskError::Internal` if the columns have different lengths or
    /// there are none.
    pub fn from_columns(columns: Vec<Vec<f64>>) -> Result<Self, RiskError> {
        let n_rows = columns
            .first()
            .map(Vec::len)
            .ok_or_else(|| RiskError::internal("sample matrix has no columns"))?;
        if let Some((index, column)) = columns
            .iter()
            .enumerate()
            .find(|(_, column)| column.len() != n_rows)
        {
            return Err(RiskError::internal(format!(
                "column {} has {} samples, expected {}",
                index,
                column.len(),
                n_rows
            )));
        }
        Ok(Self { n_rows, columns })
    }

    /// Number of iterations.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of risk factors.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Column for factor `index`.
    pub fn column(&self, index: usize) -> &[f64] {
        &self.columns[index]
    }

    /// All columns.
    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }
}

/// How factor samples are combined into one loss per iteration.
///
/// # Examples
///
/// ```rust
/// use risk_engine::aggregate::{AggregationMethod, SampleMatrix};
///
/// let matrix = SampleMatrix::from_columns(vec![vec![1.0, 2.0], vec![10.0, 20.0]]).unwrap();
/// assert_eq!(AggregationMethod::Sum.aggregate(&matrix), vec![11.0, 22.0]);
/// assert_eq!(AggregationMethod::Product.aggregate(&matrix), vec![10.0, 40.0]);
/// assert_eq!(AggregationMethod::Max.aggregate(&matrix), vec![10.0, 20.0]);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMethod {
    /// Sum of all factors (total loss).
    #[default]
    Sum,
    /// Product of all factors (frequency × magnitude compounding).
    Product,
    /// Largest single factor.
    Max,
}

impl AggregationMethod {
    /// Get the name of this aggregation method.
    pub fn name(&self) -> &'static str {
        match self {
            AggregationMethod::Sum => "sum",
            AggregationMethod::Product => "product",
            AggregationMethod::Max => "max",
        }
    }

    /// Collapses each row of `matrix` into one value.
    pub fn aggregate(&self, matrix: &SampleMatrix) -> Vec<f64> {
        let (init, combine): (f64, fn(f64, f64) -> f64) = match self {
            AggregationMethod::Sum => (0.0, |acc, x| acc + x),
            AggregationMethod::Product => (1.0, |acc, x| acc * x),
            AggregationMethod::Max => (f64::NEG_INFINITY, f64::max),
        };

        let mut out = vec![init; matrix.n_rows()];
        for column in matrix.columns() {
            for (acc, &x) in out.iter_mut().zip(column) {
                *acc = combine(*acc, x);
            }
        }
        out
    }
}
