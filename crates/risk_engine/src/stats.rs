//! Statistics engine for aggregated loss samples.
//!
//! Percentiles use linear interpolation between order statistics:
//!
//! ```text
//! h = (n - 1) · p / 100
//! q = x[⌊h⌋] + (h - ⌊h⌋) · (x[⌊h⌋ + 1] - x[⌊h⌋])
//! ```
//!
//! Standard deviation, skewness and kurtosis are population (biased)
//! estimators; kurtosis is reported as excess kurtosis.

use crate::error::RiskError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Days per year used to derive single loss expectancy.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Fixed tail level for VaR and CVaR.
pub const TAIL_PERCENTILE: f64 = 95.0;

/// Descriptive statistics of the aggregate loss distribution.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Arithmetic mean.
    pub mean: f64,
    /// 50th percentile.
    pub median: f64,
    /// Population standard deviation.
    pub std: f64,
    /// Smallest sample.
    pub min: f64,
    /// Largest sample.
    pub max: f64,
    /// Biased sample skewness `m3 / m2^1.5`.
    pub skewness: f64,
    /// Biased excess kurtosis `m4 / m2² - 3`.
    pub kurtosis: f64,
}

/// Percentile table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct Percentiles {
    pub p1: f64,
    pub p5: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

impl Percentiles {
    /// Percentile values in ascending order of `p`.
    pub fn as_array(&self) -> [f64; 9] {
        [
            self.p1, self.p5, self.p10, self.p25, self.p50, self.p75, self.p90, self.p95, self.p99,
        ]
    }
}

/// Two-sided interval from the percentile table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    /// Lower bound.
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
}

/// Tail risk metrics at the fixed 95% level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// 95th percentile of aggregate loss.
    pub value_at_risk_95: f64,
    /// Mean of losses at or beyond VaR95.
    pub conditional_value_at_risk_95: f64,
    /// Fraction of iterations with a strictly positive loss.
    pub probability_of_loss: f64,
    /// Same quantity as `conditional_value_at_risk_95`.
    pub expected_shortfall: f64,
}

/// Everything the statistics engine derives from one sample vector.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleSummary {
    /// Descriptive statistics.
    pub statistics: Statistics,
    /// Percentile table.
    pub percentiles: Percentiles,
    /// Interval per requested level, keyed by [`level_key`].
    pub confidence_intervals: BTreeMap<String, ConfidenceInterval>,
    /// Tail risk metrics.
    pub risk_metrics: RiskMetrics,
    /// Mean aggregate loss.
    pub annual_loss_expectancy: f64,
    /// ALE per day, or 0 when ALE is not positive.
    pub single_loss_expectancy: f64,
}

/// Key of a confidence level in the interval table (`0.95` → `"95.0%"`).
///
/// ```rust
/// use risk_engine::stats::level_key;
///
/// assert_eq!(level_key(0.95), "95.0%");
/// assert_eq!(level_key(0.999), "99.9%");
/// ```
pub fn level_key(level: f64) -> String {
    format!("{:.1}%", level * 100.0)
}

/// Percentile `p` (0..=100) of an ascending, non-empty slice.
///
/// # Examples
///
/// ```rust
/// use risk_engine::stats::percentile_sorted;
///
/// let sorted = [1.0, 2.0, 3.0, 4.0];
/// assert_eq!(percentile_sorted(&sorted, 50.0), 2.5);
/// assert_eq!(percentile_sorted(&sorted, 100.0), 4.0);
/// ```
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let h = (n - 1) as f64 * p.clamp(0.0, 100.0) / 100.0;
    let lo = h.floor() as usize;
    if lo + 1 >= n {
        return sorted[n - 1];
    }
    let frac = h - lo as f64;
    (sorted[lo] + frac * (sorted[lo + 1] - sorted[lo])).min(sorted[lo + 1])
}

/// Pearson correlation coefficient of two equal-length slices.
///
/// Returns 0 when either slice has zero variance.
pub fn pearson_correlation(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let n_f = n as f64;
    let mean_a = a[..n].iter().sum::<f64>() / n_f;
    let mean_b = b[..n].iter().sum::<f64>() / n_f;

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (&x, &y) in a[..n].iter().zip(&b[..n]) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    if var_a == 0.0 || var_b == 0.0 {
        return 0.0;
    }
    cov / (var_a * var_b).sqrt()
}

/// Computes the full summary for `samples`.
///
/// # Errors
///
/// `RiskError::Internal` if `samples` is empty, contains a non-finite
/// value, or yields a statistic that overflows.
///
/// # Examples
///
/// ```rust
/// use risk_engine::stats::summarise;
///
/// let summary = summarise(&[1.0, 2.0, 3.0, 4.0, 5.0], &[0.9]).unwrap();
/// assert_eq!(summary.statistics.median, 3.0);
/// assert!((summary.confidence_intervals["90.0%"].lower - 1.2).abs() < 1e-12);
/// ```
pub fn summarise(samples: &[f64], confidence_levels: &[f64]) -> Result<SampleSummary, RiskError> {
    if samples.is_empty() {
        return Err(RiskError::internal("no samples to summarise"));
    }
    if let Some(index) = samples.iter().position(|x| !x.is_finite()) {
        return Err(RiskError::internal(format!(
            "non-finite aggregate sample {} at iteration {}",
            samples[index], index
        )));
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    let q = |p: f64| percentile_sorted(&sorted, p);

    let statistics = moments(samples, &sorted);

    let percentiles = Percentiles {
        p1: q(1.0),
        p5: q(5.0),
        p10: q(10.0),
        p25: q(25.0),
        p50: q(50.0),
        p75: q(75.0),
        p90: q(90.0),
        p95: q(95.0),
        p99: q(99.0),
    };

    let confidence_intervals = confidence_levels
        .iter()
        .map(|&level| {
            let alpha = (1.0 - level) / 2.0;
            let interval = ConfidenceInterval {
                lower: q(alpha * 100.0),
                upper: q((1.0 - alpha) * 100.0),
            };
            (level_key(level), interval)
        })
        .collect();

    let var_95 = q(TAIL_PERCENTILE);
    let tail_start = sorted.partition_point(|&x| x < var_95);
    let tail = &sorted[tail_start..];
    // Interpolated VaR never exceeds the maximum, so the tail is non-empty.
    let cvar_95 = if tail.is_empty() {
        var_95
    } else {
        tail.iter().sum::<f64>() / tail.len() as f64
    };
    let losses = samples.iter().filter(|&&x| x > 0.0).count();

    let risk_metrics = RiskMetrics {
        value_at_risk_95: var_95,
        conditional_value_at_risk_95: cvar_95,
        probability_of_loss: losses as f64 / samples.len() as f64,
        expected_shortfall: cvar_95,
    };

    let ale = statistics.mean;
    let sle = if ale > 0.0 { ale / DAYS_PER_YEAR } else { 0.0 };

    let summary = SampleSummary {
        statistics,
        percentiles,
        confidence_intervals,
        risk_metrics,
        annual_loss_expectancy: ale,
        single_loss_expectancy: sle,
    };
    ensure_finite(&summary)?;
    Ok(summary)
}

fn moments(samples: &[f64], sorted: &[f64]) -> Statistics {
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|&x| (x - mean) * (x - mean)).sum::<f64>() / n;
    let std = variance.sqrt();

    // Higher moments on standardised deviations so wide spreads cannot overflow.
    let (skewness, kurtosis) = if std > 0.0 && std.is_finite() {
        let (mut m3, mut m4) = (0.0, 0.0);
        for &x in samples {
            let z = (x - mean) / std;
            let z2 = z * z;
            m3 += z2 * z;
            m4 += z2 * z2;
        }
        (m3 / n, m4 / n - 3.0)
    } else {
        (0.0, 0.0)
    };

    Statistics {
        mean,
        median: percentile_sorted(sorted, 50.0),
        std,
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        skewness,
        kurtosis,
    }
}

fn ensure_finite(summary: &SampleSummary) -> Result<(), RiskError> {
    let s = &summary.statistics;
    let m = &summary.risk_metrics;
    let named = [
        ("mean", s.mean),
        ("std", s.std),
        ("skewness", s.skewness),
        ("kurtosis", s.kurtosis),
        ("conditional_value_at_risk_95", m.conditional_value_at_risk_95),
        ("annual_loss_expectancy", summary.annual_loss_expectancy),
    ];
    match named.iter().find(|(_, value)| !value.is_finite()) {
        Some((name, value)) => Err(RiskError::internal(format!(
            "statistic {} is not finite ({})",
            name, value
        ))),
        None => Ok(()),
    }
}
