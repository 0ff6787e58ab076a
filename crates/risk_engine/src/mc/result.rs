//! Simulation output types.

use crate::stats::{ConfidenceInterval, Percentiles, RiskMetrics, SampleSummary, Statistics};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result of one Monte Carlo simulation.
///
/// Only complete results are ever returned; a failed or timed-out run
/// yields an error instead.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Scenario identity from the request.
    pub scenario_name: String,
    /// Iterations simulated.
    pub iterations: usize,
    /// Seed actually used; replaying it reproduces the result.
    pub seed: u64,
    /// Wall time of the pipeline on the worker.
    pub execution_time_seconds: f64,
    /// Descriptive statistics of the aggregate loss.
    pub statistics: Statistics,
    /// Percentile table.
    pub percentiles: Percentiles,
    /// Intervals keyed by level (`"95.0%"`).
    pub confidence_intervals: BTreeMap<String, ConfidenceInterval>,
    /// VaR, CVaR, expected shortfall and probability of loss.
    pub risk_metrics: RiskMetrics,
    /// Mean aggregate loss.
    pub annual_loss_expectancy: f64,
    /// ALE per day, or 0 when ALE is not positive.
    pub single_loss_expectancy: f64,
}

impl SimulationResult {
    /// Assembles a result from a statistics summary.
    pub fn from_summary(
        scenario_name: impl Into<String>,
        iterations: usize,
        seed: u64,
        execution_time_seconds: f64,
        summary: SampleSummary,
    ) -> Self {
        Self {
            scenario_name: scenario_name.into(),
            iterations,
            seed,
            execution_time_seconds,
            statistics: summary.statistics,
            percentiles: summary.percentiles,
            confidence_intervals: summary.confidence_intervals,
            risk_metrics: summary.risk_metrics,
            annual_loss_expectancy: summary.annual_loss_expectancy,
            single_loss_expectancy: summary.single_loss_expectancy,
        }
    }
}

/// Throughput rating of a benchmark run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PerformanceRating {
    /// Finished inside the target.
    Excellent,
    /// Missed the target.
    NeedsOptimization,
}

/// Outcome of the fixed performance benchmark scenario.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Iterations simulated.
    pub iterations: usize,
    /// Pipeline wall time.
    pub execution_time_seconds: f64,
    /// Throughput.
    pub iterations_per_second: f64,
    /// Rating against the target.
    pub performance_rating: PerformanceRating,
    /// True when the run finished inside the target.
    pub target_met: bool,
}

impl BenchmarkReport {
    /// Rates `result` against a wall-time target in seconds.
    pub fn from_result(result: &SimulationResult, target_seconds: f64) -> Self {
        let elapsed = result.execution_time_seconds;
        let target_met = elapsed < target_seconds;
        Self {
            iterations: result.iterations,
            execution_time_seconds: elapsed,
            iterations_per_second: result.iterations as f64 / elapsed.max(f64::EPSILON),
            performance_rating: if target_met {
                PerformanceRating::Excellent
            } else {
                PerformanceRating::NeedsOptimization
            },
            target_met,
        }
    }
}
