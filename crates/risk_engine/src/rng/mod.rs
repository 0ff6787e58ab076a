//! # Random Number Generation
//!
//! Seeded pseudo-random number generation for risk simulations.
//!
//! ## Seeding Discipline
//!
//! The engine never shares a generator between requests. Each
//! orchestrator owns a base seed; every request derives its own seed from
//! `(base_seed, request_id)` and every risk factor derives an independent
//! stream from `(request_seed, factor_index)` via [`derive_seed`]. Factors
//! can therefore be sampled in parallel and still reproduce bit-for-bit.
//!
//! ## Usage Example
//!
//! ```rust
//! use rand_distr::Uniform;
//! use risk_engine::rng::{derive_seed, RiskRng};
//!
//! let request_seed = derive_seed(42, 7);
//! let mut factor_rng = RiskRng::from_seed(derive_seed(request_seed, 0));
//!
//! let mut buffer = vec![0.0; 1000];
//! factor_rng.fill_from(&Uniform::new(0.0, 1.0), &mut buffer);
//! assert!(buffer.iter().all(|&u| (0.0..1.0).contains(&u)));
//! ```

mod prng;

pub use prng::{derive_seed, RiskRng};
