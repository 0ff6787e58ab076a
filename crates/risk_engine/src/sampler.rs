//! Distribution sampler.
//!
//! The [`Sampler`] trait is the seam between the orchestrator and the
//! random draws. [`DistributionSampler`] is the production implementation,
//! built on `rand_distr`; tests substitute instrumented samplers.
//!
//! # Examples
//!
//! ```rust
//! use risk_engine::distribution::DistributionSpec;
//! use risk_engine::rng::RiskRng;
//! use risk_engine::sampler::{DistributionSampler, Sampler};
//!
//! let spec = DistributionSpec::Triangular { min: 0.0, mode: 2.0, max: 10.0 };
//! let mut rng = RiskRng::from_seed(42);
//! let draws = DistributionSampler.sample(&spec, 1_000, &mut rng).unwrap();
//!
//! assert_eq!(draws.len(), 1_000);
//! assert!(draws.iter().all(|&x| (0.0..=10.0).contains(&x)));
//! ```

use crate::distribution::DistributionSpec;
use crate::error::RiskError;
use crate::rng::RiskRng;
use rand_distr::{Beta, Gamma, LogNormal, Normal, Triangular, Uniform};

/// Draws independent samples for one risk factor.
///
/// Implementations must be deterministic in `(spec, n, rng state)` and
/// return exactly `n` values.
pub trait Sampler: Send + Sync {
    /// Draws `n` samples from `spec` using `rng`.
    ///
    /// # Errors
    ///
    /// `RiskError::Configuration` if the parameters cannot be sampled.
    fn sample(
        &self,
        spec: &DistributionSpec,
        n: usize,
        rng: &mut RiskRng,
    ) -> Result<Vec<f64>, RiskError>;
}

/// Production sampler backed by `rand_distr`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DistributionSampler;

impl DistributionSampler {
    /// Draws `n` samples with a fresh generator seeded by `seed`.
    pub fn sample_seeded(
        &self,
        spec: &DistributionSpec,
        n: usize,
        seed: u64,
    ) -> Result<Vec<f64>, RiskError> {
        self.sample(spec, n, &mut RiskRng::from_seed(seed))
    }
}

fn invalid(spec: &DistributionSpec, err: impl std::fmt::Display) -> RiskError {
    RiskError::configuration(spec.family(), err.to_string())
}

impl Sampler for DistributionSampler {
    fn sample(
        &self,
        spec: &DistributionSpec,
        n: usize,
        rng: &mut RiskRng,
    ) -> Result<Vec<f64>, RiskError> {
        let mut buffer = vec![0.0; n];

        match *spec {
            DistributionSpec::Normal { mean, std } => {
                let dist = Normal::new(mean, std).map_err(|e| invalid(spec, e))?;
                rng.fill_from(&dist, &mut buffer);
            }
            DistributionSpec::Lognormal { mu, sigma } => {
                let dist = LogNormal::new(mu, sigma).map_err(|e| invalid(spec, e))?;
                rng.fill_from(&dist, &mut buffer);
            }
            DistributionSpec::Uniform { min, max } => {
                // Uniform::new panics rather than erroring on a bad range.
                if !(min < max && (max - min).is_finite()) {
                    return Err(invalid(spec, format!("invalid range [{}, {})", min, max)));
                }
                rng.fill_from(&Uniform::new(min, max), &mut buffer);
            }
            DistributionSpec::Triangular { min, mode, max } => {
                let dist = Triangular::new(min, max, mode).map_err(|e| invalid(spec, e))?;
                rng.fill_from(&dist, &mut buffer);
            }
            DistributionSpec::Beta { alpha, beta, .. } => {
                let dist = Beta::new(alpha, beta).map_err(|e| invalid(spec, e))?;
                let (min, max) = spec.beta_bounds().unwrap_or((0.0, 1.0));
                rng.fill_from(&dist, &mut buffer);
                let width = max - min;
                for value in buffer.iter_mut() {
                    *value = *value * width + min;
                }
            }
            DistributionSpec::Gamma { shape, scale } => {
                let dist = Gamma::new(shape, scale).map_err(|e| invalid(spec, e))?;
                rng.fill_from(&dist, &mut buffer);
            }
        }

        Ok(buffer)
    }
}
