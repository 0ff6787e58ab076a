//! Rank-based correlation transform (Iman–Conover).
//!
//! Imposes a target correlation structure on independently sampled factor
//! columns by reordering each column's own values. Marginals are preserved
//! exactly: every output column is a permutation of its input column.
//!
//! ## Algorithm
//!
//! ```text
//! 1. rank each column, score rank r (1-based) as Φ⁻¹((r - 0.5) / n)
//! 2. factor the target matrix C = L Lᵀ
//! 3. correlated scores S' = S Lᵀ          (row-wise: w = L z)
//! 4. uniforms U = Φ(S')
//! 5. column j ← sort(original_j) permuted by the ranks of U_j
//! ```
//!
//! Ties in `U` (possible once Φ saturates in the far tails) are broken by
//! the correlated score and then by row index, so the result is always a
//! well-defined permutation.

use crate::aggregate::SampleMatrix;
use crate::error::RiskError;
use rayon::prelude::*;
use risk_core::{norm_cdf, norm_inv_cdf, CholeskyFactor};
use std::cmp::Ordering;
use tracing::debug;

/// Row indices of `values` in ascending order (stable for ties).
pub fn rank_order(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    order
}

/// Rank-based normal scores of a column.
///
/// The element of rank `r` (1-based) maps to `Φ⁻¹((r - 0.5) / n)`.
///
/// ```rust
/// use risk_engine::correlation::normal_scores;
///
/// let scores = normal_scores(&[30.0, 10.0, 20.0]);
/// assert!(scores[1] < scores[2] && scores[2] < scores[0]);
/// assert!(scores[2].abs() < 1e-12);
/// ```
pub fn normal_scores(column: &[f64]) -> Vec<f64> {
    let quantiles = score_quantiles(column.len());
    scores_with(column, &quantiles)
}

fn score_quantiles(n: usize) -> Vec<f64> {
    let n_f = n as f64;
    (0..n)
        .map(|r| norm_inv_cdf((r as f64 + 0.5) / n_f))
        .collect()
}

fn scores_with(column: &[f64], quantiles: &[f64]) -> Vec<f64> {
    let mut scores = vec![0.0; column.len()];
    for (rank, idx) in rank_order(column).into_iter().enumerate() {
        scores[idx] = quantiles[rank];
    }
    scores
}

/// Reorders `original` so its ranks follow `uniforms` (ties broken by `scores`).
fn reorder_by_ranks(original: &[f64], uniforms: &[f64], scores: &[f64]) -> Vec<f64> {
    let mut sorted = original.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut order: Vec<usize> = (0..uniforms.len()).collect();
    order.sort_by(|&a, &b| match uniforms[a].total_cmp(&uniforms[b]) {
        Ordering::Equal => scores[a].total_cmp(&scores[b]),
        other => other,
    });

    let mut out = vec![0.0; original.len()];
    for (rank, idx) in order.into_iter().enumerate() {
        out[idx] = sorted[rank];
    }
    out
}

/// Applies the rank correlation transform described by `cholesky`.
///
/// A missing factor or a single-column matrix is returned unchanged.
///
/// # Errors
///
/// `RiskError::Configuration` if the factor dimension differs from the
/// number of columns.
///
/// # Examples
///
/// ```rust
/// use risk_core::CorrelationMatrix;
/// use risk_engine::aggregate::SampleMatrix;
/// use risk_engine::correlation::induce_correlation;
///
/// let matrix = SampleMatrix::from_columns(vec![
///     vec![1.0, 2.0, 3.0, 4.0],
///     vec![40.0, 10.0, 30.0, 20.0],
/// ]).unwrap();
/// let chol = CorrelationMatrix::from_rows(&[vec![1.0, 0.99], vec![0.99, 1.0]])
///     .unwrap()
///     .cholesky()
///     .unwrap();
///
/// let out = induce_correlation(matrix, Some(&chol)).unwrap();
/// // Strong positive correlation: second column now rises with the first
/// assert_eq!(out.column(1), &[10.0, 20.0, 30.0, 40.0]);
/// ```
pub fn induce_correlation(
    matrix: SampleMatrix,
    cholesky: Option<&CholeskyFactor>,
) -> Result<SampleMatrix, RiskError> {
    let cholesky = match cholesky {
        Some(chol) if matrix.n_cols() > 1 => chol,
        _ => return Ok(matrix),
    };

    let k = matrix.n_cols();
    let n = matrix.n_rows();
    if cholesky.dim() != k {
        return Err(RiskError::configuration(
            "correlation_matrix",
            format!("dimension {} does not match {} risk factors", cholesky.dim(), k),
        ));
    }
    debug!(factors = k, iterations = n, "inducing rank correlation");

    // Step 1: rank-based normal scores, one column per factor
    let quantiles = score_quantiles(n);
    let scores: Vec<Vec<f64>> = matrix
        .columns()
        .par_iter()
        .map(|column| scores_with(column, &quantiles))
        .collect();

    // Steps 2-3: correlate each row of scores, w = L z
    let mut correlated = vec![vec![0.0; n]; k];
    let mut z = vec![0.0; k];
    let mut w = vec![0.0; k];
    for row in 0..n {
        for (j, column) in scores.iter().enumerate() {
            z[j] = column[row];
        }
        cholesky.transform_into(&z, &mut w);
        for (j, column) in correlated.iter_mut().enumerate() {
            column[row] = w[j];
        }
    }

    // Steps 4-5: uniforms, then reorder each column's own sorted values
    let columns: Vec<Vec<f64>> = matrix
        .columns()
        .par_iter()
        .zip(correlated.par_iter())
        .map(|(original, scores)| {
            let uniforms: Vec<f64> = scores.iter().map(|&s| norm_cdf(s)).collect();
            reorder_by_ranks(original, &uniforms, scores)
        })
        .collect();

    SampleMatrix::from_columns(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::pearson_correlation;
    use proptest::prelude::*;
    use risk_core::CorrelationMatrix;

    fn sorted(values: &[f64]) -> Vec<f64> {
        let mut v = values.to_vec();
        v.sort_by(f64::total_cmp);
        v
    }

    #[test]
    fn test_rank_order_is_stable() {
        assert_eq!(rank_order(&[2.0, 1.0, 2.0, 0.0]), vec![3, 1, 0, 2]);
    }

    #[test]
    fn test_normal_scores_are_symmetric() {
        let scores = normal_scores(&[5.0, 1.0, 3.0, 4.0, 2.0]);
        let mut s = sorted(&scores);
        for i in 0..s.len() / 2 {
            let j = s.len() - 1 - i;
            assert!((s[i] + s[j]).abs() < 1e-9);
        }
        s.dedup();
        assert_eq!(s.len(), 5);
    }

    #[test]
    fn test_no_matrix_is_noop() {
        let matrix = SampleMatrix::from_columns(vec![vec![3.0, 1.0], vec![2.0, 4.0]]).unwrap();
        let out = induce_correlation(matrix.clone(), None).unwrap();
        assert_eq!(out, matrix);
    }

    #[test]
    fn test_single_factor_is_noop() {
        let matrix = SampleMatrix::from_columns(vec![vec![3.0, 1.0, 2.0]]).unwrap();
        let chol = CholeskyFactor::identity(1);
        let out = induce_correlation(matrix.clone(), Some(&chol)).unwrap();
        assert_eq!(out, matrix);
    }

    #[test]
    fn test_identity_preserves_original_order() {
        let matrix = SampleMatrix::from_columns(vec![
            vec![0.3, -1.2, 4.5, 2.2, 0.0],
            vec![10.0, 7.0, 8.0, 9.0, 11.0],
        ])
        .unwrap();
        let chol = CholeskyFactor::identity(2);
        let out = induce_correlation(matrix.clone(), Some(&chol)).unwrap();
        assert_eq!(out, matrix);
    }

    #[test]
    fn test_dimension_mismatch_is_configuration_error() {
        let matrix = SampleMatrix::from_columns(vec![vec![1.0], vec![2.0]]).unwrap();
        let chol = CholeskyFactor::identity(3);
        let err = induce_correlation(matrix, Some(&chol)).unwrap_err();
        assert_eq!(err.field(), Some("correlation_matrix"));
    }

    #[test]
    fn test_negative_correlation_reverses_ranks() {
        let matrix = SampleMatrix::from_columns(vec![
            (0..200).map(f64::from).collect(),
            (0..200).map(|i| f64::from(i) * 3.0).collect(),
        ])
        .unwrap();
        let chol = CorrelationMatrix::from_rows(&[vec![1.0, -1.0], vec![-1.0, 1.0]])
            .unwrap()
            .cholesky()
            .unwrap();
        let out = induce_correlation(matrix, Some(&chol)).unwrap();
        let rho = pearson_correlation(out.column(0), out.column(1));
        assert!((rho + 1.0).abs() < 1e-9, "rho = {}", rho);
    }

    proptest! {
        #[test]
        fn prop_columns_are_permutations(
            a in proptest::collection::vec(-1e6f64..1e6, 2..80),
            rho in -0.95f64..0.95,
        ) {
            let b: Vec<f64> = a.iter().rev().map(|x| x * 0.5 + 1.0).collect();
            let matrix = SampleMatrix::from_columns(vec![a.clone(), b.clone()]).unwrap();
            let chol = CorrelationMatrix::from_rows(&[vec![1.0, rho], vec![rho, 1.0]])
                .unwrap()
                .cholesky()
                .unwrap();
            let out = induce_correlation(matrix, Some(&chol)).unwrap();
            prop_assert_eq!(sorted(out.column(0)), sorted(&a));
            prop_assert_eq!(sorted(out.column(1)), sorted(&b));
        }
    }
}
