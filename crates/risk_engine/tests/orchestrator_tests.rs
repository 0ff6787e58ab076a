//! Integration tests for the simulation orchestrator.
//!
//! Exercise the full async path: validation, seeding, the worker pool,
//! timeouts and error surfacing, using instrumented samplers where the
//! number or duration of sampler calls matters.

use approx::assert_relative_eq;
use risk_engine::distribution::DistributionSpec;
use risk_engine::mc::{RiskFactors, SimulationOrchestrator, SimulationRequest, SimulationResult};
use risk_engine::rng::RiskRng;
use risk_engine::sampler::{DistributionSampler, Sampler};
use risk_engine::{ErrorKind, RiskError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Counts calls, then delegates to the production sampler.
#[derive(Clone, Default)]
struct CountingSampler {
    calls: Arc<AtomicUsize>,
}

impl Sampler for CountingSampler {
    fn sample(
        &self,
        spec: &DistributionSpec,
        n: usize,
        rng: &mut RiskRng,
    ) -> Result<Vec<f64>, RiskError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        DistributionSampler.sample(spec, n, rng)
    }
}

/// Sleeps before every draw batch.
struct SlowSampler {
    delay: Duration,
}

impl Sampler for SlowSampler {
    fn sample(
        &self,
        spec: &DistributionSpec,
        n: usize,
        rng: &mut RiskRng,
    ) -> Result<Vec<f64>, RiskError> {
        std::thread::sleep(self.delay);
        DistributionSampler.sample(spec, n, rng)
    }
}

struct PanickingSampler;

impl Sampler for PanickingSampler {
    fn sample(
        &self,
        _spec: &DistributionSpec,
        _n: usize,
        _rng: &mut RiskRng,
    ) -> Result<Vec<f64>, RiskError> {
        panic!("sampler blew up")
    }
}

fn normal(mean: f64, std: f64) -> DistributionSpec {
    DistributionSpec::Normal { mean, std }
}

fn test_request() -> SimulationRequest {
    let factors = RiskFactors::from_pairs([("loss", normal(1_000_000.0, 200_000.0))]).unwrap();
    let mut request = SimulationRequest::new("test", factors);
    request.iterations = 10_000;
    request.confidence_levels = vec![0.95];
    request
}

fn counting_engine() -> (SimulationOrchestrator<CountingSampler>, Arc<AtomicUsize>) {
    let sampler = CountingSampler::default();
    let calls = Arc::clone(&sampler.calls);
    let engine = SimulationOrchestrator::builder()
        .worker_threads(2)
        .sampler(sampler)
        .build()
        .unwrap();
    (engine, calls)
}

/// Everything except wall time.
fn assert_same_numbers(a: &SimulationResult, b: &SimulationResult) {
    assert_eq!(a.seed, b.seed);
    assert_eq!(a.statistics, b.statistics);
    assert_eq!(a.percentiles, b.percentiles);
    assert_eq!(a.confidence_intervals, b.confidence_intervals);
    assert_eq!(a.risk_metrics, b.risk_metrics);
    assert_eq!(a.annual_loss_expectancy, b.annual_loss_expectancy);
}

/// Single normal factor: ALE and VaR95 match the closed form.
#[tokio::test]
async fn test_end_to_end_normal_loss() {
    let engine = SimulationOrchestrator::builder().worker_threads(2).build().unwrap();
    let result = engine.simulate(test_request()).await.unwrap();

    assert_eq!(result.scenario_name, "test");
    assert_eq!(result.iterations, 10_000);
    assert_relative_eq!(result.annual_loss_expectancy, 1_000_000.0, max_relative = 0.01);
    assert_relative_eq!(
        result.risk_metrics.value_at_risk_95,
        1_329_000.0,
        max_relative = 0.05
    );
    assert_relative_eq!(
        result.single_loss_expectancy,
        result.annual_loss_expectancy / 365.0,
        max_relative = 1e-12
    );
    assert!(result.risk_metrics.conditional_value_at_risk_95 > result.risk_metrics.value_at_risk_95);
    assert_eq!(result.risk_metrics.probability_of_loss, 1.0);

    let ci = result.confidence_intervals["95.0%"];
    assert!(ci.lower < result.statistics.mean && result.statistics.mean < ci.upper);
}

/// Out-of-range iteration counts never reach the sampler.
#[tokio::test]
async fn test_bad_iterations_rejected_before_sampling() {
    let (engine, calls) = counting_engine();
    for iterations in [999, 100_001] {
        let mut request = test_request();
        request.iterations = iterations;
        let err = engine.simulate(request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.field(), Some("iterations"));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

/// Confidence levels outside (0, 1) never reach the sampler.
#[tokio::test]
async fn test_bad_confidence_levels_rejected_before_sampling() {
    let (engine, calls) = counting_engine();
    for level in [0.0, 1.0, 1.2] {
        let mut request = test_request();
        request.confidence_levels = vec![0.95, level];
        let err = engine.simulate(request).await.unwrap_err();
        assert!(err.is_client_error());
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

/// An indefinite correlation matrix never reaches the sampler.
#[tokio::test]
async fn test_non_psd_matrix_rejected_before_sampling() {
    let (engine, calls) = counting_engine();
    let factors = RiskFactors::from_pairs([
        ("a", normal(0.0, 1.0)),
        ("b", normal(0.0, 1.0)),
        ("c", normal(0.0, 1.0)),
    ])
    .unwrap();
    let mut request = SimulationRequest::new("indefinite", factors);
    request.correlation_matrix = Some(vec![
        vec![1.0, 0.9, -0.9],
        vec![0.9, 1.0, 0.9],
        vec![-0.9, 0.9, 1.0],
    ]);

    let err = engine.simulate(request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(err.field(), Some("correlation_matrix"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

/// A valid request calls the sampler once per factor.
#[tokio::test]
async fn test_sampler_called_once_per_factor() {
    let (engine, calls) = counting_engine();
    let factors = RiskFactors::from_pairs([
        ("a", normal(10.0, 1.0)),
        ("b", DistributionSpec::Gamma { shape: 2.0, scale: 3.0 }),
    ])
    .unwrap();
    engine
        .simulate(SimulationRequest::new("two", factors))
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

/// A sampler slower than the timeout yields Timeout, not a result.
#[tokio::test]
async fn test_slow_sampler_times_out() {
    let engine = SimulationOrchestrator::builder()
        .worker_threads(1)
        .timeout(Duration::from_millis(50))
        .sampler(SlowSampler {
            delay: Duration::from_millis(500),
        })
        .build()
        .unwrap();

    let err = engine.simulate(test_request()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(!err.is_client_error());
    match err {
        RiskError::Timeout { scenario, timeout } => {
            assert_eq!(scenario, "test");
            assert_eq!(timeout, Duration::from_millis(50));
        }
        other => panic!("expected timeout, got {:?}", other),
    }
}

/// A panicking worker surfaces as an internal error.
#[tokio::test]
async fn test_worker_panic_is_internal_error() {
    let engine = SimulationOrchestrator::builder()
        .worker_threads(1)
        .sampler(PanickingSampler)
        .build()
        .unwrap();

    let err = engine.simulate(test_request()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(err.to_string().contains("sampler blew up"));
}

/// The same explicit seed reproduces every number.
#[tokio::test]
async fn test_explicit_seed_is_reproducible() {
    let engine = SimulationOrchestrator::builder().worker_threads(2).build().unwrap();
    let mut request = test_request();
    request.seed = Some(2024);

    let a = engine.simulate(request.clone()).await.unwrap();
    let b = engine.simulate(request).await.unwrap();
    assert_eq!(a.seed, 2024);
    assert_same_numbers(&a, &b);
}

/// Derived seeds depend on the request id and the base seed only.
#[tokio::test]
async fn test_derived_seeds() {
    let first = SimulationOrchestrator::builder().worker_threads(2).build().unwrap();
    let second = SimulationOrchestrator::builder().worker_threads(3).build().unwrap();

    let a1 = first.simulate(test_request()).await.unwrap();
    let a2 = first.simulate(test_request()).await.unwrap();
    let b1 = second.simulate(test_request()).await.unwrap();

    assert_ne!(a1.seed, a2.seed);
    assert_ne!(a1.statistics.mean, a2.statistics.mean);
    // Same base seed and request id on another pool size.
    assert_same_numbers(&a1, &b1);

    let other_base = SimulationOrchestrator::builder()
        .worker_threads(2)
        .base_seed(7)
        .build()
        .unwrap();
    let c1 = other_base.simulate(test_request()).await.unwrap();
    assert_ne!(a1.seed, c1.seed);
}

/// Concurrent requests with explicit seeds are independent.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_requests_are_independent() {
    let engine = Arc::new(SimulationOrchestrator::builder().worker_threads(2).build().unwrap());

    let seeded = |seed| {
        let mut request = test_request();
        request.seed = Some(seed);
        request
    };
    let (a, b, c) = tokio::join!(
        engine.simulate(seeded(1)),
        engine.simulate(seeded(2)),
        engine.simulate(seeded(1)),
    );
    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());

    assert_same_numbers(&a, &c);
    assert_ne!(a.statistics.mean, b.statistics.mean);
}

/// Correlation between two unit normals shows up in the spread of their sum.
#[tokio::test]
async fn test_correlation_changes_aggregate_spread() {
    let engine = SimulationOrchestrator::builder().worker_threads(2).build().unwrap();
    for rho in [0.0, 0.5, 0.9] {
        let factors =
            RiskFactors::from_pairs([("a", normal(0.0, 1.0)), ("b", normal(0.0, 1.0))]).unwrap();
        let mut request = SimulationRequest::new("pair", factors);
        request.correlation_matrix = Some(vec![vec![1.0, rho], vec![rho, 1.0]]);
        request.seed = Some(11);

        let result = engine.simulate(request).await.unwrap();
        let expected = (2.0 * (1.0 + rho)).sqrt();
        assert_relative_eq!(result.statistics.std, expected, max_relative = 0.05);
    }
}

/// JSON entry point parses, validates and runs.
#[tokio::test]
async fn test_simulate_json() {
    let engine = SimulationOrchestrator::builder().worker_threads(2).build().unwrap();
    let result = engine
        .simulate_json(
            r#"{
                "scenario_name": "mixed",
                "iterations": 5000,
                "risk_factors": {
                    "incidents": {"distribution": "triangular", "min": 0, "mode": 2, "max": 10},
                    "cost": {"distribution": "uniform", "min": 1000, "max": 2000}
                },
                "aggregation": "product",
                "seed": 3
            }"#,
        )
        .await
        .unwrap();

    assert_eq!(result.iterations, 5_000);
    assert_eq!(result.confidence_intervals.len(), 3);
    assert!(result.confidence_intervals.contains_key("99.9%"));
    // E[incidents] · E[cost] = 4 · 1500
    assert_relative_eq!(result.annual_loss_expectancy, 6_000.0, max_relative = 0.05);
    assert!(result.statistics.min >= 0.0);
}

/// Very wide but finite factors still produce finite moments.
#[tokio::test]
async fn test_wide_spread_factor_has_finite_moments() {
    let factors = RiskFactors::from_pairs([("loss", normal(0.0, 1e80))]).unwrap();
    let mut request = SimulationRequest::new("wide", factors);
    request.seed = Some(3);

    let engine = SimulationOrchestrator::builder().worker_threads(1).build().unwrap();
    let result = engine.simulate(request).await.unwrap();

    assert!(result.statistics.kurtosis.is_finite());
    assert!(result.statistics.skewness.is_finite());
    assert!(result.statistics.kurtosis.abs() < 0.5);

    let json = serde_json::to_value(&result).unwrap();
    assert!(json["statistics"]["kurtosis"].is_number());
}

/// Levels that round to the same reported key are rejected.
#[tokio::test]
async fn test_levels_sharing_a_key_are_rejected() {
    let (engine, calls) = counting_engine();
    let mut request = test_request();
    request.confidence_levels = vec![0.9501, 0.9504];

    let err = engine.simulate(request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(err.field(), Some("confidence_levels[1]"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
