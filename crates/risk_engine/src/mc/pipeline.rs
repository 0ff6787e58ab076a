//! Synchronous simulation pipeline.
//!
//! ```text
//! sample (per factor) → stack → correlate → aggregate → summarise
//! ```
//!
//! Runs entirely on the calling thread's rayon pool. Factor `i` draws from
//! its own generator seeded with `derive_seed(seed, i)`, so the output
//! depends only on the request and the seed, never on scheduling.

use super::request::ValidatedRequest;
use super::result::SimulationResult;
use crate::aggregate::SampleMatrix;
use crate::correlation::induce_correlation;
use crate::error::RiskError;
use crate::rng::{derive_seed, RiskRng};
use crate::sampler::Sampler;
use crate::stats::summarise;
use rayon::prelude::*;
use std::time::Instant;

/// Runs one validated request to completion.
///
/// # Errors
///
/// Sampler errors, or `RiskError::Internal` for a sampler returning the
/// wrong number of draws or a non-finite aggregate.
pub fn run_pipeline<S>(
    sampler: &S,
    request: ValidatedRequest,
    seed: u64,
) -> Result<SimulationResult, RiskError>
where
    S: Sampler + ?Sized,
{
    let start = Instant::now();
    let n = request.iterations();

    let columns = request
        .factors()
        .par_iter()
        .enumerate()
        .map(|(index, (name, spec))| {
            let mut rng = RiskRng::from_seed(derive_seed(seed, index as u64));
            let column = sampler.sample(spec, n, &mut rng)?;
            if column.len() != n {
                return Err(RiskError::internal(format!(
                    "sampler returned {} draws for '{}', expected {}",
                    column.len(),
                    name,
                    n
                )));
            }
            Ok(column)
        })
        .collect::<Result<Vec<_>, RiskError>>()?;

    let matrix = SampleMatrix::from_columns(columns)?;
    let matrix = induce_correlation(matrix, request.cholesky())?;
    let losses = request.aggregation().aggregate(&matrix);
    let summary = summarise(&losses, request.confidence_levels())?;

    Ok(SimulationResult::from_summary(
        request.scenario_name(),
        n,
        seed,
        start.elapsed().as_secs_f64(),
        summary,
    ))
}
