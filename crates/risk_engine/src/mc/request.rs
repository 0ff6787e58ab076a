//! Simulation requests and their validated form.
//!
//! A [`SimulationRequest`] is the wire shape supplied by callers. It is
//! turned into a [`ValidatedRequest`] before any sampling; the pipeline only
//! ever sees validated requests.

use crate::aggregate::AggregationMethod;
use crate::distribution::DistributionSpec;
use crate::error::RiskError;
use crate::stats::level_key;
use risk_core::{CholeskyFactor, CorrelationMatrix};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Smallest accepted iteration count.
pub const MIN_ITERATIONS: usize = 1_000;
/// Largest accepted iteration count.
pub const MAX_ITERATIONS: usize = 100_000;
/// Iteration count used when a request omits it.
pub const DEFAULT_ITERATIONS: usize = 10_000;
/// Confidence levels used when a request omits them.
pub const DEFAULT_CONFIDENCE_LEVELS: [f64; 3] = [0.95, 0.99, 0.999];

fn default_iterations() -> usize {
    DEFAULT_ITERATIONS
}

fn default_confidence_levels() -> Vec<f64> {
    DEFAULT_CONFIDENCE_LEVELS.to_vec()
}

/// Ordered collection of named risk factors.
///
/// Insertion order fixes the column order of the sample matrix and of the
/// correlation matrix. Names are unique.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RiskFactors {
    entries: Vec<(String, DistributionSpec)>,
}

impl RiskFactors {
    /// Empty factor list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a factor.
    ///
    /// # Errors
    ///
    /// `RiskError::Configuration` if `name` is already present.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        spec: DistributionSpec,
    ) -> Result<(), RiskError> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(RiskError::configuration(
                format!("risk_factors.{}", name),
                "duplicate risk factor name",
            ));
        }
        self.entries.push((name, spec));
        Ok(())
    }

    /// Builds a factor list from `(name, spec)` pairs, in order.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, RiskError>
    where
        I: IntoIterator<Item = (S, DistributionSpec)>,
        S: Into<String>,
    {
        let mut factors = Self::new();
        for (name, spec) in pairs {
            factors.insert(name, spec)?;
        }
        Ok(factors)
    }

    /// Looks a factor up by name.
    pub fn get(&self, name: &str) -> Option<&DistributionSpec> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, spec)| spec)
    }

    /// Number of factors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no factors are present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Factor names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// `(name, spec)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DistributionSpec)> {
        self.entries.iter().map(|(name, spec)| (name.as_str(), spec))
    }
}

impl Serialize for RiskFactors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, spec) in &self.entries {
            map.serialize_entry(name, spec)?;
        }
        map.end()
    }
}

struct RiskFactorsVisitor;

impl<'de> Visitor<'de> for RiskFactorsVisitor {
    type Value = RiskFactors;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of risk factor names to distributions")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RiskFactors, A::Error> {
        let mut factors = RiskFactors::new();
        while let Some(name) = map.next_key::<String>()? {
            let spec = map
                .next_value::<DistributionSpec>()
                .map_err(|e| {
                    <A::Error as de::Error>::custom(format!("risk_factors.{}: {}", name, e))
                })?;
            if factors.get(&name).is_some() {
                return Err(de::Error::custom(format!(
                    "duplicate risk factor '{}'",
                    name
                )));
            }
            factors.entries.push((name, spec));
        }
        Ok(factors)
    }
}

impl<'de> Deserialize<'de> for RiskFactors {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RiskFactorsVisitor)
    }
}

/// Monte Carlo simulation request.
///
/// # Examples
///
/// ```rust
/// use risk_engine::mc::SimulationRequest;
///
/// let request = SimulationRequest::from_json(r#"{
///     "scenario_name": "test",
///     "risk_factors": {"loss": {"distribution": "normal", "mean": 1e6, "std": 2e5}},
///     "confidence_levels": [0.95]
/// }"#).unwrap();
///
/// assert_eq!(request.iterations, 10_000);
/// assert!(request.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    /// Scenario identity, echoed in the result.
    pub scenario_name: String,
    /// Number of iterations, in `[MIN_ITERATIONS, MAX_ITERATIONS]`.
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Named factors in column order.
    pub risk_factors: RiskFactors,
    /// Optional k×k target correlation matrix, rows in factor order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_matrix: Option<Vec<Vec<f64>>>,
    /// Distinct levels in (0, 1).
    #[serde(default = "default_confidence_levels")]
    pub confidence_levels: Vec<f64>,
    /// How factors combine per iteration.
    #[serde(default)]
    pub aggregation: AggregationMethod,
    /// Explicit seed; derived from the engine's base seed when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl SimulationRequest {
    /// Request with default iterations, levels and aggregation.
    pub fn new(scenario_name: impl Into<String>, risk_factors: RiskFactors) -> Self {
        Self {
            scenario_name: scenario_name.into(),
            iterations: DEFAULT_ITERATIONS,
            risk_factors,
            correlation_matrix: None,
            confidence_levels: default_confidence_levels(),
            aggregation: AggregationMethod::default(),
            seed: None,
        }
    }

    /// Parses a request from JSON.
    ///
    /// # Errors
    ///
    /// `RiskError::Configuration` carrying serde's message for malformed
    /// input, unknown distribution families or missing parameters.
    pub fn from_json(json: &str) -> Result<Self, RiskError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Checks every constraint and prepares the correlation factor.
    ///
    /// Fails on the first violation, before any sampling.
    ///
    /// # Errors
    ///
    /// `RiskError::Configuration` naming the offending field.
    pub fn validate(&self) -> Result<ValidatedRequest, RiskError> {
        if !(MIN_ITERATIONS..=MAX_ITERATIONS).contains(&self.iterations) {
            return Err(RiskError::configuration(
                "iterations",
                format!(
                    "must be in range [{}, {}], got {}",
                    MIN_ITERATIONS, MAX_ITERATIONS, self.iterations
                ),
            ));
        }

        if self.risk_factors.is_empty() {
            return Err(RiskError::configuration(
                "risk_factors",
                "at least one risk factor is required",
            ));
        }
        for (name, spec) in self.risk_factors.iter() {
            spec.validate(name)?;
        }

        let mut keys: Vec<String> = Vec::with_capacity(self.confidence_levels.len());
        for (index, &level) in self.confidence_levels.iter().enumerate() {
            if !(level > 0.0 && level < 1.0) {
                return Err(RiskError::configuration(
                    format!("confidence_levels[{}]", index),
                    format!("must be strictly between 0 and 1, got {}", level),
                ));
            }
            // Levels are reported under their rounded key, which must stay unique.
            let key = level_key(level);
            if keys.contains(&key) {
                return Err(RiskError::configuration(
                    format!("confidence_levels[{}]", index),
                    format!("duplicate confidence level {} (reported as {})", level, key),
                ));
            }
            keys.push(key);
        }

        let cholesky = match &self.correlation_matrix {
            Some(rows) => {
                let k = self.risk_factors.len();
                if rows.len() != k {
                    return Err(RiskError::configuration(
                        "correlation_matrix",
                        format!(
                            "expected {}x{} matrix for {} risk factors, got {} rows",
                            k,
                            k,
                            k,
                            rows.len()
                        ),
                    ));
                }
                Some(CorrelationMatrix::from_rows(rows)?.cholesky()?)
            }
            None => None,
        };

        Ok(ValidatedRequest {
            scenario_name: self.scenario_name.clone(),
            iterations: self.iterations,
            factors: self
                .risk_factors
                .iter()
                .map(|(name, spec)| (name.to_string(), spec.clone()))
                .collect(),
            cholesky,
            confidence_levels: self.confidence_levels.clone(),
            aggregation: self.aggregation,
            seed: self.seed,
        })
    }
}

/// A request that passed validation, ready for the pipeline.
///
/// Only [`SimulationRequest::validate`] constructs one.
#[derive(Debug)]
pub struct ValidatedRequest {
    scenario_name: String,
    iterations: usize,
    factors: Vec<(String, DistributionSpec)>,
    cholesky: Option<CholeskyFactor>,
    confidence_levels: Vec<f64>,
    aggregation: AggregationMethod,
    seed: Option<u64>,
}

impl ValidatedRequest {
    /// Scenario name.
    pub fn scenario_name(&self) -> &str {
        &self.scenario_name
    }

    /// Iteration count.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Factors in column order.
    pub fn factors(&self) -> &[(String, DistributionSpec)] {
        &self.factors
    }

    /// Cholesky factor of the target correlation, if any.
    pub fn cholesky(&self) -> Option<&CholeskyFactor> {
        self.cholesky.as_ref()
    }

    /// Requested confidence levels.
    pub fn confidence_levels(&self) -> &[f64] {
        &self.confidence_levels
    }

    /// Aggregation method.
    pub fn aggregation(&self) -> AggregationMethod {
        self.aggregation
    }

    /// Explicit seed from the request.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}
