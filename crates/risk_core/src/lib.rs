//! # risk_core: Mathematical Foundation for the Risk Quantification Engine
//!
//! ## Layer 1 (Foundation) Role
//!
//! risk_core is the bottom layer of the workspace, providing:
//! - Standard normal distribution and quantile functions (`math::distributions`)
//! - Correlation matrix validation and Cholesky factorisation (`math::correlation`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other risk_* crates, with minimal external dependencies:
//! - num-traits: Traits for generic numerical computation
//! - thiserror: Structured error types
//!
//! ## Usage Examples
//!
//! ```rust
//! use risk_core::math::correlation::CorrelationMatrix;
//! use risk_core::math::distributions::{norm_cdf, norm_inv_cdf};
//!
//! // Quantile and CDF are inverses of each other
//! let z = norm_inv_cdf(0.975);
//! assert!((z - 1.959964).abs() < 1e-5);
//! assert!((norm_cdf(z) - 0.975).abs() < 1e-6);
//!
//! // Two-factor correlation with rho = 0.5
//! let corr = CorrelationMatrix::from_rows(&[vec![1.0, 0.5], vec![0.5, 1.0]]).unwrap();
//! let chol = corr.cholesky().unwrap();
//! assert_eq!(chol.dim(), 2);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;

pub use math::correlation::{CholeskyFactor, CorrelationError, CorrelationMatrix};
pub use math::distributions::{norm_cdf, norm_inv_cdf};
