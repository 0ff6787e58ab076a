//! Fixed-scenario performance benchmark.

use super::orchestrator::SimulationOrchestrator;
use super::request::{RiskFactors, SimulationRequest};
use super::result::BenchmarkReport;
use crate::distribution::DistributionSpec;
use crate::error::RiskError;
use crate::sampler::Sampler;
use tracing::info;

/// Wall-time target for the benchmark scenario.
pub const BENCHMARK_TARGET_SECONDS: f64 = 30.0;

/// The three-factor benchmark scenario at 10,000 iterations.
pub fn benchmark_request() -> Result<SimulationRequest, RiskError> {
    let factors = RiskFactors::from_pairs([
        (
            "factor1",
            DistributionSpec::Normal {
                mean: 1_000_000.0,
                std: 200_000.0,
            },
        ),
        (
            "factor2",
            DistributionSpec::Lognormal {
                mu: 10.0,
                sigma: 1.0,
            },
        ),
        (
            "factor3",
            DistributionSpec::Uniform {
                min: 50_000.0,
                max: 500_000.0,
            },
        ),
    ])?;
    Ok(SimulationRequest::new("Performance Benchmark", factors))
}

impl<S: Sampler + 'static> SimulationOrchestrator<S> {
    /// Runs the benchmark scenario and rates its throughput.
    ///
    /// # Errors
    ///
    /// Any error from [`SimulationOrchestrator::simulate`].
    pub async fn performance_benchmark(&self) -> Result<BenchmarkReport, RiskError> {
        let result = self.simulate(benchmark_request()?).await?;
        let report = BenchmarkReport::from_result(&result, BENCHMARK_TARGET_SECONDS);
        info!(
            iterations = report.iterations,
            elapsed_secs = report.execution_time_seconds,
            iterations_per_second = report.iterations_per_second,
            target_met = report.target_met,
            "performance benchmark finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mc::result::PerformanceRating;

    #[test]
    fn test_benchmark_request_shape() {
        let request = benchmark_request().unwrap();
        assert_eq!(request.iterations, 10_000);
        let names: Vec<&str> = request.risk_factors.names().collect();
        assert_eq!(names, vec!["factor1", "factor2", "factor3"]);
        assert!(request.validate().is_ok());
    }

    #[tokio::test]
    async fn test_benchmark_meets_target() {
        let engine = SimulationOrchestrator::builder().worker_threads(2).build().unwrap();
        let report = engine.performance_benchmark().await.unwrap();
        assert_eq!(report.iterations, 10_000);
        assert!(report.target_met);
        assert_eq!(report.performance_rating, PerformanceRating::Excellent);
        assert!(report.iterations_per_second > 0.0);
    }
}
