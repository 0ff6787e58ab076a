//! Async simulation orchestrator.
//!
//! [`SimulationOrchestrator`] validates requests, assigns seeds and hands
//! the CPU-bound pipeline to its [`WorkerPool`]. It keeps no per-request
//! state beyond an atomic request counter.

use super::config::{EngineConfig, DEFAULT_BASE_SEED, DEFAULT_TIMEOUT_SECS};
use super::pipeline::run_pipeline;
use super::pool::WorkerPool;
use super::request::SimulationRequest;
use super::result::SimulationResult;
use crate::error::RiskError;
use crate::rng::derive_seed;
use crate::sampler::{DistributionSampler, Sampler};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Monte Carlo orchestrator.
///
/// Generic over the [`Sampler`] so tests can inject instrumented
/// samplers; production code uses the default [`DistributionSampler`].
///
/// # Examples
///
/// ```rust
/// use risk_engine::distribution::DistributionSpec;
/// use risk_engine::mc::{RiskFactors, SimulationOrchestrator, SimulationRequest};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let engine = SimulationOrchestrator::builder().worker_threads(2).build().unwrap();
///
/// let factors = RiskFactors::from_pairs([(
///     "breach_cost",
///     DistributionSpec::Lognormal { mu: 12.0, sigma: 0.5 },
/// )]).unwrap();
/// let result = engine
///     .simulate(SimulationRequest::new("breach", factors))
///     .await
///     .unwrap();
///
/// assert_eq!(result.iterations, 10_000);
/// assert!(result.annual_loss_expectancy > 0.0);
/// # });
/// ```
#[derive(Debug)]
pub struct SimulationOrchestrator<S = DistributionSampler> {
    pool: WorkerPool,
    sampler: Arc<S>,
    timeout: Duration,
    base_seed: u64,
    next_request_id: AtomicU64,
}

impl SimulationOrchestrator<DistributionSampler> {
    /// Orchestrator with default settings.
    pub fn new() -> Result<Self, RiskError> {
        Self::builder().build()
    }

    /// Orchestrator configured from an [`EngineConfig`].
    pub fn from_config(config: &EngineConfig) -> Result<Self, RiskError> {
        Self::builder().config(config).build()
    }

    /// Starts a builder with default settings.
    pub fn builder() -> SimulationOrchestratorBuilder<DistributionSampler> {
        SimulationOrchestratorBuilder::default()
    }
}

impl<S: Sampler + 'static> SimulationOrchestrator<S> {
    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Base seed from which request seeds are derived.
    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Worker pool size.
    pub fn worker_threads(&self) -> usize {
        self.pool.threads()
    }

    /// Validates and runs one simulation.
    ///
    /// # Errors
    ///
    /// - `RiskError::Configuration` for an invalid request, before any
    ///   sampling.
    /// - `RiskError::Timeout` if the pipeline does not finish in time.
    /// - `RiskError::Internal` for worker panics or numerical failures.
    pub async fn simulate(&self, request: SimulationRequest) -> Result<SimulationResult, RiskError> {
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        info!(
            request_id,
            scenario = %request.scenario_name,
            iterations = request.iterations,
            factors = request.risk_factors.len(),
            "simulation request accepted"
        );

        let validated = request.validate().map_err(|err| {
            warn!(request_id, error = %err, "simulation request rejected");
            err
        })?;

        let seed = validated
            .seed()
            .unwrap_or_else(|| derive_seed(self.base_seed, request_id));
        let scenario = validated.scenario_name().to_string();
        let sampler = Arc::clone(&self.sampler);

        let outcome = self
            .pool
            .run(&scenario, self.timeout, move || {
                run_pipeline(sampler.as_ref(), validated, seed)
            })
            .await;

        match &outcome {
            Ok(result) => info!(
                request_id,
                scenario = %result.scenario_name,
                iterations = result.iterations,
                seed = result.seed,
                elapsed_secs = result.execution_time_seconds,
                "simulation completed"
            ),
            Err(err @ RiskError::Timeout { .. }) => {
                warn!(request_id, scenario = %scenario, error = %err, "simulation timed out")
            }
            Err(err) => error!(request_id, scenario = %scenario, error = %err, "simulation failed"),
        }
        outcome
    }

    /// Parses a JSON request and runs it.
    pub async fn simulate_json(&self, json: &str) -> Result<SimulationResult, RiskError> {
        let request = SimulationRequest::from_json(json).map_err(|err| {
            warn!(error = %err, "malformed simulation request");
            err
        })?;
        self.simulate(request).await
    }
}

/// Builder for [`SimulationOrchestrator`].
#[derive(Debug)]
pub struct SimulationOrchestratorBuilder<S> {
    worker_threads: usize,
    timeout: Duration,
    base_seed: u64,
    sampler: S,
}

impl Default for SimulationOrchestratorBuilder<DistributionSampler> {
    fn default() -> Self {
        Self {
            worker_threads: num_cpus::get(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            base_seed: DEFAULT_BASE_SEED,
            sampler: DistributionSampler,
        }
    }
}

impl<S: Sampler + 'static> SimulationOrchestratorBuilder<S> {
    /// Takes worker count, timeout and seed from `config`.
    pub fn config(mut self, config: &EngineConfig) -> Self {
        self.worker_threads = config.worker_threads;
        self.timeout = config.timeout();
        self.base_seed = config.base_seed;
        self
    }

    /// Worker pool size.
    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    /// Per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base seed.
    pub fn base_seed(mut self, seed: u64) -> Self {
        self.base_seed = seed;
        self
    }

    /// Replaces the sampler.
    pub fn sampler<T: Sampler + 'static>(self, sampler: T) -> SimulationOrchestratorBuilder<T> {
        SimulationOrchestratorBuilder {
            worker_threads: self.worker_threads,
            timeout: self.timeout,
            base_seed: self.base_seed,
            sampler,
        }
    }

    /// Builds the orchestrator and its worker pool.
    ///
    /// # Errors
    ///
    /// `RiskError::Configuration` for zero workers or a zero timeout,
    /// `RiskError::Internal` if the pool cannot be built.
    pub fn build(self) -> Result<SimulationOrchestrator<S>, RiskError> {
        if self.worker_threads == 0 {
            return Err(RiskError::configuration("worker_threads", "must be at least 1"));
        }
        if self.timeout.is_zero() {
            return Err(RiskError::configuration("timeout", "must be greater than 0"));
        }
        let pool = WorkerPool::new(self.worker_threads)?;
        info!(
            workers = pool.threads(),
            timeout_ms = self.timeout.as_millis() as u64,
            base_seed = self.base_seed,
            "simulation orchestrator ready"
        );
        Ok(SimulationOrchestrator {
            pool,
            sampler: Arc::new(self.sampler),
            timeout: self.timeout,
            base_seed: self.base_seed,
            next_request_id: AtomicU64::new(1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mc::config::LogLevel;

    #[test]
    fn test_builder_defaults() {
        let engine = SimulationOrchestrator::builder().worker_threads(1).build().unwrap();
        assert_eq!(engine.timeout(), Duration::from_secs(30));
        assert_eq!(engine.base_seed(), 42);
        assert_eq!(engine.worker_threads(), 1);
    }

    #[test]
    fn test_from_config() {
        let config = EngineConfig {
            worker_threads: 2,
            timeout_secs: 5,
            base_seed: 99,
            log_level: LogLevel::Debug,
        };
        let engine = SimulationOrchestrator::from_config(&config).unwrap();
        assert_eq!(engine.worker_threads(), 2);
        assert_eq!(engine.timeout(), Duration::from_secs(5));
        assert_eq!(engine.base_seed(), 99);
    }

    #[test]
    fn test_builder_rejects_bad_settings() {
        let err = SimulationOrchestrator::builder().worker_threads(0).build().unwrap_err();
        assert_eq!(err.field(), Some("worker_threads"));

        let err = SimulationOrchestrator::builder()
            .timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert_eq!(err.field(), Some("timeout"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_configuration_error() {
        let engine = SimulationOrchestrator::builder().worker_threads(1).build().unwrap();
        let err = engine.simulate_json("{\"scenario_name\": 5}").await.unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(err.field(), Some("request"));
    }
}
