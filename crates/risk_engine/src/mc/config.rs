//! Engine configuration management
//!
//! Handles loading configuration from environment variables, TOML files, and CLI arguments.

use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding the worker pool size.
pub const ENV_WORKERS: &str = "RISK_ENGINE_WORKERS";
/// Environment variable overriding the per-request timeout.
pub const ENV_TIMEOUT_SECS: &str = "RISK_ENGINE_TIMEOUT_SECS";
/// Environment variable overriding the base seed.
pub const ENV_SEED: &str = "RISK_ENGINE_SEED";
/// Environment variable overriding the log level.
pub const ENV_LOG_LEVEL: &str = "RISK_LOG_LEVEL";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default base seed.
pub const DEFAULT_BASE_SEED: u64 = 42;

/// Configuration error types
#[derive(Debug, Error, PartialEq)]
pub enum EngineConfigError {
    /// Worker pool must have at least one thread.
    #[error("Invalid worker count: {0}. Must be at least 1")]
    InvalidWorkers(usize),

    /// Timeout must be positive.
    #[error("Invalid timeout: {0}s. Must be greater than 0")]
    InvalidTimeout(u64),

    /// Unknown log level name.
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// Config file could not be read or parsed.
    #[error("Configuration file error: {0}")]
    FileError(String),

    /// Environment variable could not be parsed.
    #[error("Environment variable error: {0}")]
    EnvError(String),
}

/// Log levels supported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = EngineConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(EngineConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// Engine configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Size of the simulation worker pool
    pub worker_threads: usize,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Base seed from which per-request seeds are derived
    pub base_seed: u64,
    /// Log level
    pub log_level: LogLevel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_threads: num_cpus::get(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            base_seed: DEFAULT_BASE_SEED,
            log_level: LogLevel::Info,
        }
    }
}

fn parse_env<T: FromStr>(name: &str, value: &str) -> Result<T, EngineConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| EngineConfigError::EnvError(format!("{}={:?} is not valid", name, value)))
}

impl EngineConfig {
    /// Per-request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Overrides fields for which `lookup` returns a value.
    ///
    /// `lookup` maps a variable name to its value; `std::env::var` in
    /// production, a fixed table in tests.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), EngineConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(workers) = lookup(ENV_WORKERS) {
            self.worker_threads = parse_env(ENV_WORKERS, &workers)?;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = parse_env(ENV_TIMEOUT_SECS, &timeout)?;
        }
        if let Some(seed) = lookup(ENV_SEED) {
            self.base_seed = parse_env(ENV_SEED, &seed)?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = LogLevel::from_str(&level)?;
        }
        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self, EngineConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineConfigError::FileError(format!("Failed to read config file: {}", e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, EngineConfigError> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| EngineConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), EngineConfigError> {
        if self.worker_threads == 0 {
            return Err(EngineConfigError::InvalidWorkers(self.worker_threads));
        }
        if self.timeout_secs == 0 {
            return Err(EngineConfigError::InvalidTimeout(self.timeout_secs));
        }
        Ok(())
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) -> Result<(), EngineConfigError> {
        if let Some(workers) = cli.workers {
            self.worker_threads = workers;
        }
        if let Some(timeout) = cli.timeout_secs {
            self.timeout_secs = timeout;
        }
        if let Some(seed) = cli.seed {
            self.base_seed = seed;
        }
        if let Some(level) = &cli.log_level {
            self.log_level = LogLevel::from_str(level)?;
        }
        Ok(())
    }
}

/// CLI arguments structure
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Worker count override
    pub workers: Option<usize>,
    /// Timeout override in seconds
    pub timeout_secs: Option<u64>,
    /// Base seed override
    pub seed: Option<u64>,
    /// Log level override
    pub log_level: Option<String>,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config(cli: &CliArgs) -> Result<EngineConfig, EngineConfigError> {
    let mut config = if let Some(config_path) = &cli.config_file {
        EngineConfig::from_file(config_path)?
    } else {
        EngineConfig::default()
    };

    config.apply_env(|name| std::env::var(name).ok())?;
    config.merge_with_cli(cli)?;

    config.validate()?;
    Ok(config)
}
