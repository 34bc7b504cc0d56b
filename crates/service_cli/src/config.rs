//! CLI configuration management
//!
//! Priority (highest to lowest):
//! 1. CLI arguments
//! 2. `QUANT_*` environment variables
//! 3. Config file (TOML)
//! 4. Default values

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use quant_core::profile::{GrowthAssumptions, RiskProfile};
use quant_simulation::DriftConvention;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Configuration file error: {0}")]
    FileError(String),

    #[error("Environment variable {name}: cannot parse '{value}'")]
    EnvError { name: &'static str, value: String },

    #[error("Invalid configuration: {}", .0.join("; "))]
    Validation(Vec<String>),
}

/// Log levels supported by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
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

/// CLI configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Log level when `RUST_LOG` is unset
    pub log_level: LogLevel,
    /// Annual risk-free rate for Sharpe maximisation
    pub risk_free_rate: f64,
    /// Default per-asset lower weight bound
    pub min_weight: f64,
    /// Default per-asset upper weight bound
    pub max_weight: f64,
    /// Observations per year in price files
    pub periods_per_year: f64,
    /// Largest accepted path count
    pub max_paths: usize,
    /// Longest accepted horizon in years
    pub max_horizon_years: u32,
    /// Path count when `--paths` is omitted
    pub default_paths: usize,
    /// Seed for reproducible simulations
    pub seed: Option<u64>,
    /// Drift interpretation of `annual_return`
    pub drift_convention: DriftConvention,
    /// Per-profile growth assumption overrides, keyed by profile name
    pub profiles: HashMap<String, GrowthAssumptions>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            risk_free_rate: 0.1175,
            min_weight: 0.05,
            max_weight: 0.40,
            periods_per_year: 252.0,
            max_paths: 1_000_000,
            max_horizon_years: 100,
            default_paths: 1_000,
            seed: None,
            drift_convention: DriftConvention::Arithmetic,
            profiles: HashMap::new(),
        }
    }
}

impl CliConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))
    }

    /// Load from `path` if it exists, otherwise start from defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply `QUANT_*` environment variable overrides
    pub fn with_env_override(self) -> Result<Self, ConfigError> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parse<T: FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::EnvError { name, value })
        }

        if let Some(v) = lookup("QUANT_LOG_LEVEL") {
            self.log_level = LogLevel::from_str(&v)?;
        }
        if let Some(v) = lookup("QUANT_RISK_FREE_RATE") {
            self.risk_free_rate = parse("QUANT_RISK_FREE_RATE", v)?;
        }
        if let Some(v) = lookup("QUANT_MIN_WEIGHT") {
            self.min_weight = parse("QUANT_MIN_WEIGHT", v)?;
        }
        if let Some(v) = lookup("QUANT_MAX_WEIGHT") {
            self.max_weight = parse("QUANT_MAX_WEIGHT", v)?;
        }
        if let Some(v) = lookup("QUANT_PERIODS_PER_YEAR") {
            self.periods_per_year = parse("QUANT_PERIODS_PER_YEAR", v)?;
        }
        if let Some(v) = lookup("QUANT_MAX_PATHS") {
            self.max_paths = parse("QUANT_MAX_PATHS", v)?;
        }
        if let Some(v) = lookup("QUANT_MAX_HORIZON_YEARS") {
            self.max_horizon_years = parse("QUANT_MAX_HORIZON_YEARS", v)?;
        }
        if let Some(v) = lookup("QUANT_DEFAULT_PATHS") {
            self.default_paths = parse("QUANT_DEFAULT_PATHS", v)?;
        }
        if let Some(v) = lookup("QUANT_SEED") {
            self.seed = Some(parse("QUANT_SEED", v)?);
        }
        if let Some(v) = lookup("QUANT_DRIFT_CONVENTION") {
            self.drift_convention = parse("QUANT_DRIFT_CONVENTION", v)?;
        }
        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if !self.risk_free_rate.is_finite() {
            errors.push(format!("risk_free_rate must be finite, got {}", self.risk_free_rate));
        }
        if !(0.0..1.0).contains(&self.min_weight)
            || !(self.min_weight < self.max_weight && self.max_weight <= 1.0)
        {
            errors.push(format!(
                "weight bounds must satisfy 0 <= min < max <= 1, got [{}, {}]",
                self.min_weight, self.max_weight
            ));
        }
        if !(self.periods_per_year.is_finite() && self.periods_per_year > 0.0) {
            errors.push(format!(
                "periods_per_year must be positive, got {}",
                self.periods_per_year
            ));
        }
        if self.max_paths == 0 {
            errors.push("max_paths must be positive".to_string());
        }
        if self.max_horizon_years == 0 {
            errors.push("max_horizon_years must be positive".to_string());
        }
        if self.default_paths == 0 || self.default_paths > self.max_paths {
            errors.push(format!(
                "default_paths must be in 1..={}, got {}",
                self.max_paths, self.default_paths
            ));
        }
        for (name, g) in &self.profiles {
            if let Err(e) = RiskProfile::from_str(name) {
                errors.push(format!("profiles.{}: {}", name, e));
            }
            if let Err(e) = GrowthAssumptions::new(g.annual_return, g.annual_volatility) {
                errors.push(format!("profiles.{}: {}", name, e));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Growth assumptions for `profile`, honouring overrides
    pub fn growth_for(&self, profile: RiskProfile) -> GrowthAssumptions {
        self.profiles
            .iter()
            .find(|(name, _)| RiskProfile::from_str(name).ok() == Some(profile))
            .map(|(_, g)| *g)
            .unwrap_or_else(|| profile.growth_assumptions())
    }
}

/// Global overrides taken from the command line
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Log level override
    pub log_level: Option<String>,
    /// Force debug logging
    pub verbose: bool,
}

/// Build configuration from all sources
pub fn build_config(path: &Path, cli: &CliArgs) -> Result<CliConfig, ConfigError> {
    let mut config = CliConfig::load_or_default(path)?.with_env_override()?;

    if let Some(level) = &cli.log_level {
        config.log_level = LogLevel::from_str(level)?;
    }
    if cli.verbose {
        config.log_level = LogLevel::Debug;
    }

    config.validate()?;
    Ok(config)
}
