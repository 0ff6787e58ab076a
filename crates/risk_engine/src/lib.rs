//! # Risk Engine (L3: Monte Carlo Risk Quantification)
//!
//! Converts uncertain risk-factor descriptions into an aggregate loss
//! distribution and derived risk metrics.
//!
//! This crate provides:
//! - Seeded random streams (`rng`) and a distribution sampler (`sampler`)
//! - Rank-based correlation transform preserving marginals (`correlation`)
//! - Per-iteration aggregation (`aggregate`) and summary statistics (`stats`)
//! - An async orchestrator over a bounded worker pool with timeout (`mc`)
//! - A FAIR model adapter (`fair`)
//!
//! ## Pipeline
//!
//! ```text
//! SimulationRequest ──validate──▶ ValidatedRequest
//!        │
//!        ▼ (worker pool, under timeout)
//! sample per factor → correlate → aggregate → summarise ──▶ SimulationResult
//! ```
//!
//! ## Example
//!
//! ```rust
//! use risk_engine::mc::SimulationOrchestrator;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let engine = SimulationOrchestrator::builder().worker_threads(2).build().unwrap();
//! let result = engine.simulate_json(r#"{
//!     "scenario_name": "test",
//!     "iterations": 10000,
//!     "risk_factors": {"loss": {"distribution": "normal", "mean": 1000000, "std": 200000}},
//!     "confidence_levels": [0.95],
//!     "seed": 7
//! }"#).await.unwrap();
//!
//! assert_eq!(result.seed, 7);
//! assert!(result.confidence_intervals.contains_key("95.0%"));
//! # });
//! ```
//!
//! The library never installs a tracing subscriber; the `risk_benchmark`
//! binary does.

#![warn(missing_docs)]

pub mod aggregate;
pub mod correlation;
pub mod distribution;
pub mod error;
pub mod fair;
pub mod mc;
pub mod rng;
pub mod sampler;
pub mod stats;

pub use error::{ErrorKind, RiskError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
