//! Distribution families supported for risk factors.
//!
//! [`DistributionSpec`] is a closed tagged union: each family carries its
//! own strongly typed parameters, and the sampler matches it exhaustively.
//! On the wire the family is selected by a `"distribution"` tag:
//!
//! ```rust
//! use risk_engine::distribution::DistributionSpec;
//!
//! let spec: DistributionSpec =
//!     serde_json::from_str(r#"{"distribution":"normal","mean":100.0,"std":15.0}"#).unwrap();
//! assert_eq!(spec, DistributionSpec::Normal { mean: 100.0, std: 15.0 });
//! assert_eq!(spec.family(), "normal");
//! ```

use crate::error::RiskError;
use serde::{Deserialize, Serialize};

/// Probability distribution of a single risk factor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "distribution", rename_all = "lowercase")]
pub enum DistributionSpec {
    /// Normal distribution N(mean, std²).
    Normal {
        /// Mean.
        mean: f64,
        /// Standard deviation (≥ 0).
        std: f64,
    },
    /// Log-normal distribution: exp(N(mu, sigma²)).
    Lognormal {
        /// Mean of the underlying normal.
        mu: f64,
        /// Standard deviation of the underlying normal (≥ 0).
        sigma: f64,
    },
    /// Continuous uniform distribution on [min, max).
    Uniform {
        /// Lower bound.
        min: f64,
        /// Upper bound (> min).
        max: f64,
    },
    /// Triangular distribution on [min, max] with peak at mode.
    Triangular {
        /// Lower bound.
        min: f64,
        /// Most likely value.
        mode: f64,
        /// Upper bound.
        max: f64,
    },
    /// Beta(alpha, beta) rescaled from [0, 1] onto [min, max].
    Beta {
        /// First shape parameter (> 0).
        alpha: f64,
        /// Second shape parameter (> 0).
        beta: f64,
        /// Lower bound of the rescaled support (default 0).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        /// Upper bound of the rescaled support (default 1).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    /// Gamma distribution with shape k and scale θ.
    Gamma {
        /// Shape parameter (> 0).
        shape: f64,
        /// Scale parameter (> 0).
        scale: f64,
    },
}

impl DistributionSpec {
    /// Wire name of the family.
    pub fn family(&self) -> &'static str {
        match self {
            Self::Normal { .. } => "normal",
            Self::Lognormal { .. } => "lognormal",
            Self::Uniform { .. } => "uniform",
            Self::Triangular { .. } => "triangular",
            Self::Beta { .. } => "beta",
            Self::Gamma { .. } => "gamma",
        }
    }

    /// Rescaling bounds of a beta distribution, with defaults applied.
    ///
    /// Returns `None` for every other family.
    pub fn beta_bounds(&self) -> Option<(f64, f64)> {
        match self {
            Self::Beta { min, max, .. } => Some((min.unwrap_or(0.0), max.unwrap_or(1.0))),
            _ => None,
        }
    }

    /// Checks parameter values for the factor named `factor`.
    ///
    /// # Errors
    ///
    /// `RiskError::Configuration` naming `risk_factors.<factor>.<param>`.
    pub fn validate(&self, factor: &str) -> Result<(), RiskError> {
        let field = |param: &str| format!("risk_factors.{}.{}", factor, param);
        let finite = |param: &str, value: f64| -> Result<(), RiskError> {
            if value.is_finite() {
                Ok(())
            } else {
                Err(RiskError::configuration(
                    field(param),
                    format!("must be finite, got {}", value),
                ))
            }
        };
        let positive = |param: &str, value: f64| -> Result<(), RiskError> {
            finite(param, value)?;
            if value > 0.0 {
                Ok(())
            } else {
                Err(RiskError::configuration(
                    field(param),
                    format!("must be positive, got {}", value),
                ))
            }
        };
        let non_negative = |param: &str, value: f64| -> Result<(), RiskError> {
            finite(param, value)?;
            if value >= 0.0 {
                Ok(())
            } else {
                Err(RiskError::configuration(
                    field(param),
                    format!("must be non-negative, got {}", value),
                ))
            }
        };
        let ordered = |min: f64, max: f64| -> Result<(), RiskError> {
            finite("min", min)?;
            finite("max", max)?;
            if min < max {
                Ok(())
            } else {
                Err(RiskError::configuration(
                    field("max"),
                    format!("must be greater than min ({}), got {}", min, max),
                ))
            }
        };

        match *self {
            Self::Normal { mean, std } => {
                finite("mean", mean)?;
                non_negative("std", std)
            }
            Self::Lognormal { mu, sigma } => {
                finite("mu", mu)?;
                non_negative("sigma", sigma)
            }
            Self::Uniform { min, max } => ordered(min, max),
            Self::Triangular { min, mode, max } => {
                ordered(min, max)?;
                finite("mode", mode)?;
                if (min..=max).contains(&mode) {
                    Ok(())
                } else {
                    Err(RiskError::configuration(
                        field("mode"),
                        format!("must lie in [{}, {}], got {}", min, max, mode),
                    ))
                }
            }
            Self::Beta { alpha, beta, .. } => {
                positive("alpha", alpha)?;
                positive("beta", beta)?;
                let (min, max) = self.beta_bounds().unwrap_or((0.0, 1.0));
                ordered(min, max)
            }
            Self::Gamma { shape, scale } => {
                positive("shape", shape)?;
                positive("scale", scale)
            }
        }
    }
}
