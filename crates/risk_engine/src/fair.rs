//! FAIR (Factor Analysis of Information Risk) adapter.
//!
//! Translates a FAIR model into a generic [`SimulationRequest`] and adds an
//! asset-relative exposure metric to the result:
//!
//! ```text
//! risk_exposure = ALE / asset_value × 100
//! ```

use crate::distribution::DistributionSpec;
use crate::error::RiskError;
use crate::mc::{RiskFactors, SimulationOrchestrator, SimulationRequest, SimulationResult};
use crate::sampler::Sampler;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Scenario name used when the model does not set one.
pub const FAIR_SCENARIO_NAME: &str = "FAIR Risk Analysis";

/// FAIR model parameters.
///
/// # Examples
///
/// ```rust
/// use risk_engine::fair::FairRiskModel;
///
/// let model: FairRiskModel = serde_json::from_str(r#"{
///     "threat_event_frequency": {"distribution": "triangular", "min": 1, "mode": 4, "max": 12},
///     "vulnerability": {"distribution": "beta", "alpha": 2, "beta": 5},
///     "loss_magnitude": {"distribution": "lognormal", "mu": 11, "sigma": 0.8},
///     "asset_value": 5000000
/// }"#).unwrap();
///
/// let request = model.to_request().unwrap();
/// assert_eq!(request.scenario_name, "FAIR Risk Analysis");
/// assert_eq!(request.risk_factors.len(), 3);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FairRiskModel {
    /// How often a threat agent acts against the asset.
    pub threat_event_frequency: DistributionSpec,
    /// Probability that a threat event becomes a loss event.
    pub vulnerability: DistributionSpec,
    /// Loss per event.
    pub loss_magnitude: DistributionSpec,
    /// Value of the asset at risk; finite and > 0.
    pub asset_value: f64,
    /// Optional threat capability factor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threat_capability: Option<DistributionSpec>,
    /// Optional control strength factor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_strength: Option<DistributionSpec>,
    /// Overrides the default scenario name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_name: Option<String>,
    /// Overrides the default iteration count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<usize>,
    /// Overrides the default confidence levels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_levels: Option<Vec<f64>>,
}

impl FairRiskModel {
    /// Model with the three required factors and no overrides.
    pub fn new(
        threat_event_frequency: DistributionSpec,
        vulnerability: DistributionSpec,
        loss_magnitude: DistributionSpec,
        asset_value: f64,
    ) -> Self {
        Self {
            threat_event_frequency,
            vulnerability,
            loss_magnitude,
            asset_value,
            threat_capability: None,
            control_strength: None,
            scenario_name: None,
            iterations: None,
            confidence_levels: None,
        }
    }

    fn check_asset_value(&self) -> Result<(), RiskError> {
        if self.asset_value.is_finite() && self.asset_value > 0.0 {
            Ok(())
        } else {
            Err(RiskError::configuration(
                "asset_value",
                format!("must be finite and positive, got {}", self.asset_value),
            ))
        }
    }

    /// Builds the generic simulation request for this model.
    ///
    /// # Errors
    ///
    /// `RiskError::Configuration` for a non-positive or non-finite asset
    /// value.
    pub fn to_request(&self) -> Result<SimulationRequest, RiskError> {
        self.check_asset_value()?;

        let mut factors = RiskFactors::new();
        factors.insert("threat_event_frequency", self.threat_event_frequency.clone())?;
        factors.insert("vulnerability", self.vulnerability.clone())?;
        factors.insert("loss_magnitude", self.loss_magnitude.clone())?;
        if let Some(spec) = &self.threat_capability {
            factors.insert("threat_capability", spec.clone())?;
        }
        if let Some(spec) = &self.control_strength {
            factors.insert("control_strength", spec.clone())?;
        }

        let scenario = self
            .scenario_name
            .clone()
            .unwrap_or_else(|| FAIR_SCENARIO_NAME.to_string());
        let mut request = SimulationRequest::new(scenario, factors);
        if let Some(iterations) = self.iterations {
            request.iterations = iterations;
        }
        if let Some(levels) = &self.confidence_levels {
            request.confidence_levels = levels.clone();
        }
        Ok(request)
    }
}

/// Simulation result augmented with FAIR exposure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FairAnalysisResult {
    /// Underlying simulation result (flattened on the wire).
    #[serde(flatten)]
    pub simulation: SimulationResult,
    /// Asset value from the model.
    pub asset_value: f64,
    /// ALE as a percentage of asset value.
    pub risk_exposure: f64,
}

impl FairAnalysisResult {
    /// Attaches exposure metrics to a simulation result.
    pub fn new(simulation: SimulationResult, asset_value: f64) -> Self {
        let risk_exposure = simulation.annual_loss_expectancy / asset_value * 100.0;
        Self {
            simulation,
            asset_value,
            risk_exposure,
        }
    }
}

impl<S: Sampler + 'static> SimulationOrchestrator<S> {
    /// Runs a FAIR analysis.
    ///
    /// The asset value is checked before any simulation work.
    ///
    /// # Errors
    ///
    /// `RiskError::Configuration` for invalid model input, otherwise any
    /// error from [`SimulationOrchestrator::simulate`].
    pub async fn analyze_fair(&self, model: &FairRiskModel) -> Result<FairAnalysisResult, RiskError> {
        let request = model.to_request().map_err(|err| {
            warn!(error = %err, "FAIR model rejected");
            err
        })?;
        let result = self.simulate(request).await?;
        let analysis = FairAnalysisResult::new(result, model.asset_value);
        info!(
            scenario = %analysis.simulation.scenario_name,
            asset_value = analysis.asset_value,
            risk_exposure = analysis.risk_exposure,
            "FAIR analysis completed"
        );
        Ok(analysis)
    }
}
