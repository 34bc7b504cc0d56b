//! Simulation request value object.

use quant_core::profile::RiskProfile;
use quant_core::types::ValidationError;
use quant_core::validation::{
    ensure_finite, ensure_non_negative, ensure_positive, ensure_positive_count,
};
use quant_core::TRADING_DAYS_PER_YEAR;

/// How `annual_return` enters the per-step log-growth mean.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DriftConvention {
    /// `annual_return` is the arithmetic expected growth rate.
    ///
    /// Log-growth per step has mean `μ_daily - σ_daily² / 2`, so
    /// `E[V(T)] = V(0) · exp(annual_return · T)` and the mean of
    /// `log(V(T) / V(0))` is `(annual_return - annual_volatility² / 2) · T`.
    #[default]
    Arithmetic,

    /// `annual_return` is used directly as the log-growth drift.
    ///
    /// Log-growth per step has mean `μ_daily`.
    Logarithmic,
}

impl std::str::FromStr for DriftConvention {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "arithmetic" | "ito" => Ok(DriftConvention::Arithmetic),
            "logarithmic" | "log" => Ok(DriftConvention::Logarithmic),
            other => Err(ValidationError::OutOfRange(format!(
                "unknown drift convention '{}'",
                other
            ))),
        }
    }
}

/// Inputs to the path simulator.
///
/// Immutable once constructed; two requests with equal fields are
/// interchangeable.
///
/// # Examples
///
/// ```rust
/// use quant_simulation::SimulationRequest;
///
/// let request = SimulationRequest::new(10_000.0, 0.12, 0.0, 1, 1).unwrap();
/// assert_eq!(request.trading_days(), 252);
///
/// assert!(SimulationRequest::new(10_000.0, 0.12, 0.2, 0, 10).is_err());
/// assert!(SimulationRequest::new(-1.0, 0.12, 0.2, 1, 10).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SimulationRequest {
    initial_capital: f64,
    annual_return: f64,
    annual_volatility: f64,
    horizon_years: u32,
    path_count: usize,
    drift_convention: DriftConvention,
}

impl SimulationRequest {
    /// Creates a validated request with the default drift convention.
    ///
    /// # Errors
    ///
    /// `ValidationError` if capital is not positive, return is not finite,
    /// volatility is negative, or horizon/path count is zero.
    pub fn new(
        initial_capital: f64,
        annual_return: f64,
        annual_volatility: f64,
        horizon_years: u32,
        path_count: usize,
    ) -> Result<Self, ValidationError> {
        ensure_positive("initial_capital", initial_capital)?;
        ensure_finite("annual_return", annual_return)?;
        ensure_non_negative("annual_volatility", annual_volatility)?;
        ensure_positive_count("horizon_years", horizon_years as usize)?;
        ensure_positive_count("path_count", path_count)?;

        Ok(Self {
            initial_capital,
            annual_return,
            annual_volatility,
            horizon_years,
            path_count,
            drift_convention: DriftConvention::default(),
        })
    }

    /// Creates a request from a risk profile's default growth assumptions.
    pub fn from_profile(
        initial_capital: f64,
        profile: RiskProfile,
        horizon_years: u32,
        path_count: usize,
    ) -> Result<Self, ValidationError> {
        let assumptions = profile.growth_assumptions();
        Self::new(
            initial_capital,
            assumptions.annual_return,
            assumptions.annual_volatility,
            horizon_years,
            path_count,
        )
    }

    /// Returns a copy using the given drift convention.
    #[must_use]
    pub fn with_drift_convention(mut self, convention: DriftConvention) -> Self {
        self.drift_convention = convention;
        self
    }

    /// Starting capital (value of row 0 on every path).
    #[inline]
    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    /// Arithmetic annualised drift.
    #[inline]
    pub fn annual_return(&self) -> f64 {
        self.annual_return
    }

    /// Annualised volatility.
    #[inline]
    pub fn annual_volatility(&self) -> f64 {
        self.annual_volatility
    }

    /// Projection horizon in whole years.
    #[inline]
    pub fn horizon_years(&self) -> u32 {
        self.horizon_years
    }

    /// Number of independent trajectories.
    #[inline]
    pub fn path_count(&self) -> usize {
        self.path_count
    }

    /// Drift convention in force.
    #[inline]
    pub fn drift_convention(&self) -> DriftConvention {
        self.drift_convention
    }

    /// Total simulated trading days: `horizon_years * 252`.
    #[inline]
    pub fn trading_days(&self) -> usize {
        self.horizon_years as usize * TRADING_DAYS_PER_YEAR
    }

    /// Mean of the per-step log-growth draw.
    pub fn daily_drift(&self) -> f64 {
        let days = TRADING_DAYS_PER_YEAR as f64;
        let mu = self.annual_return / days;
        match self.drift_convention {
            DriftConvention::Arithmetic => mu - 0.5 * self.daily_volatility().powi(2),
            DriftConvention::Logarithmic => mu,
        }
    }

    /// Standard deviation of the per-step log-growth draw.
    #[inline]
    pub fn daily_volatility(&self) -> f64 {
        self.annual_volatility / (TRADING_DAYS_PER_YEAR as f64).sqrt()
    }
}
