//! Monte Carlo simulation orchestration.
//!
//! - [`request`]: wire request, ordered factor map, validation
//! - [`pipeline`]: the synchronous sample → correlate → aggregate → summarise chain
//! - [`pool`]: bounded rayon worker pool with timeout
//! - [`orchestrator`]: async entry point, seeding and logging
//! - [`config`]: engine configuration from file, environment and CLI
//! - [`benchmark`]: fixed-scenario throughput benchmark

pub mod benchmark;
pub mod config;
pub mod orchestrator;
pub mod pipeline;
pub mod pool;
pub mod request;
pub mod result;

pub use benchmark::{benchmark_request, BENCHMARK_TARGET_SECONDS};
pub use config::{build_config, CliArgs, EngineConfig, EngineConfigError, LogLevel};
pub use orchestrator::{SimulationOrchestrator, SimulationOrchestratorBuilder};
pub use pipeline::run_pipeline;
pub use pool::WorkerPool;
pub use request::{
    RiskFactors, SimulationRequest, ValidatedRequest, DEFAULT_CONFIDENCE_LEVELS,
    DEFAULT_ITERATIONS, MAX_ITERATIONS, MIN_ITERATIONS,
};
pub use result::{BenchmarkReport, PerformanceRating, SimulationResult};
