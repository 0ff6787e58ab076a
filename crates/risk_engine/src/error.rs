//! Error types for the risk simulation engine.
//!
//! Every failure surfaced to callers is a [`RiskError`]. Configuration
//! problems are always detected before sampling begins; timeouts and
//! internal failures are never retried by the engine.

use risk_core::CorrelationError;
use std::time::Duration;
use thiserror::Error;

/// Coarse error category, used by the service layer to pick a status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid request or model input.
    Configuration,
    /// Simulation exceeded the configured bound.
    Timeout,
    /// Worker crash or unexpected numerical failure.
    Internal,
}

/// Failure of a simulation or FAIR analysis.
///
/// # Examples
/// ```
/// use risk_engine::error::{ErrorKind, RiskError};
///
/// let err = RiskError::configuration("iterations", "must be in range [1000, 100000], got 10");
/// assert_eq!(err.kind(), ErrorKind::Configuration);
/// assert!(err.is_client_error());
/// assert!(err.to_string().contains("iterations"));
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskError {
    /// Bad distribution, correlation matrix, iteration count, confidence
    /// level or asset value.
    #[error("Configuration error in '{field}': {reason}")]
    Configuration {
        /// Offending field, as a dotted path into the request.
        field: String,
        /// Human readable description.
        reason: String,
    },

    /// Simulation did not complete within the configured bound.
    #[error("Simulation '{scenario}' timed out after {timeout:?}")]
    Timeout {
        /// Scenario that timed out.
        scenario: String,
        /// Configured bound.
        timeout: Duration,
    },

    /// Worker crash or unexpected numerical failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RiskError {
    /// Create a configuration error for `field`.
    pub fn configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// True when the caller supplied bad input (maps to a 4xx response).
    pub fn is_client_error(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }

    /// Offending field for configuration errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Configuration { field, .. } => Some(field.as_str()),
            _ => None,
        }
    }
}

impl From<CorrelationError> for RiskError {
    fn from(err: CorrelationError) -> Self {
        Self::configuration("correlation_matrix", err.to_string())
    }
}

impl From<serde_json::Error> for RiskError {
    fn from(err: serde_json::Error) -> Self {
        Self::configuration("request", err.to_string())
    }
}
