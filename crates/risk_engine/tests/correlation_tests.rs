//! Integration tests for the rank correlation transform on sampled data.

use risk_core::{CholeskyFactor, CorrelationMatrix};
use risk_engine::aggregate::SampleMatrix;
use risk_engine::correlation::induce_correlation;
use risk_engine::distribution::DistributionSpec;
use risk_engine::sampler::DistributionSampler;
use risk_engine::stats::pearson_correlation;

const N: usize = 10_000;

fn sample(spec: &DistributionSpec, seed: u64) -> Vec<f64> {
    DistributionSampler.sample_seeded(spec, N, seed).unwrap()
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v = values.to_vec();
    v.sort_by(f64::total_cmp);
    v
}

fn two_factor_cholesky(rho: f64) -> CholeskyFactor {
    CorrelationMatrix::from_rows(&[vec![1.0, rho], vec![rho, 1.0]])
        .unwrap()
        .cholesky()
        .unwrap()
}

/// Target correlations between two normal factors are reached within 0.05.
#[test]
fn test_target_correlation_reached() {
    let spec = DistributionSpec::Normal {
        mean: 0.0,
        std: 1.0,
    };
    for rho in [0.0, 0.5, 0.9] {
        let matrix = SampleMatrix::from_columns(vec![sample(&spec, 1), sample(&spec, 2)]).unwrap();
        let out = induce_correlation(matrix, Some(&two_factor_cholesky(rho))).unwrap();
        let empirical = pearson_correlation(out.column(0), out.column(1));
        assert!(
            (empirical - rho).abs() < 0.05,
            "target {} got {}",
            rho,
            empirical
        );
    }
}

/// Marginals survive the transform exactly, whatever their family.
#[test]
fn test_marginals_preserved_for_skewed_factors() {
    let gamma = sample(&DistributionSpec::Gamma { shape: 2.0, scale: 3.0 }, 5);
    let lognormal = sample(&DistributionSpec::Lognormal { mu: 10.0, sigma: 1.0 }, 6);
    let uniform = sample(&DistributionSpec::Uniform { min: 0.0, max: 1.0 }, 7);

    let chol = CorrelationMatrix::from_rows(&[
        vec![1.0, 0.6, 0.3],
        vec![0.6, 1.0, 0.2],
        vec![0.3, 0.2, 1.0],
    ])
    .unwrap()
    .cholesky()
    .unwrap();

    let matrix =
        SampleMatrix::from_columns(vec![gamma.clone(), lognormal.clone(), uniform.clone()])
            .unwrap();
    let out = induce_correlation(matrix, Some(&chol)).unwrap();

    assert_eq!(sorted(out.column(0)), sorted(&gamma));
    assert_eq!(sorted(out.column(1)), sorted(&lognormal));
    assert_eq!(sorted(out.column(2)), sorted(&uniform));

    // Rank correlation follows the target ordering.
    let ranks = |column: &[f64]| risk_engine::correlation::normal_scores(column);
    let r01 = pearson_correlation(&ranks(out.column(0)), &ranks(out.column(1)));
    let r12 = pearson_correlation(&ranks(out.column(1)), &ranks(out.column(2)));
    assert!((r01 - 0.6).abs() < 0.05, "{}", r01);
    assert!((r12 - 0.2).abs() < 0.05, "{}", r12);
}

/// Identity correlation keeps every value set unchanged.
#[test]
fn test_identity_matrix_keeps_value_sets() {
    let spec = DistributionSpec::Triangular {
        min: 0.0,
        mode: 1.0,
        max: 4.0,
    };
    let a = sample(&spec, 21);
    let b = sample(&spec, 22);
    let matrix = SampleMatrix::from_columns(vec![a.clone(), b.clone()]).unwrap();
    let out = induce_correlation(matrix, Some(&CholeskyFactor::identity(2))).unwrap();

    assert_eq!(sorted(out.column(0)), sorted(&a));
    assert_eq!(sorted(out.column(1)), sorted(&b));
}

/// Perfect correlation is accepted and produces comonotone columns.
#[test]
fn test_perfect_correlation_is_comonotone() {
    let a = sample(&DistributionSpec::Normal { mean: 5.0, std: 2.0 }, 31);
    let b = sample(&DistributionSpec::Gamma { shape: 1.5, scale: 2.0 }, 32);
    let matrix = SampleMatrix::from_columns(vec![a, b]).unwrap();
    let out = induce_correlation(matrix, Some(&two_factor_cholesky(1.0))).unwrap();

    let order_a = risk_engine::correlation::rank_order(out.column(0));
    let order_b = risk_engine::correlation::rank_order(out.column(1));
    assert_eq!(order_a, order_b);
}
