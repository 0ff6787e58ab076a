//! Mathematical building blocks for risk simulation.
//!
//! - [`distributions`]: standard normal cdf and quantile
//! - [`correlation`]: correlation matrices and their Cholesky factors

pub mod correlation;
pub mod distributions;
