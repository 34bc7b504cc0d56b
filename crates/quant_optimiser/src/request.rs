//! Validated optimisation requests.

use quant_core::types::ValidationError;
use quant_core::validation::{ensure_distinct_assets, ensure_feasible_bounds, ensure_finite};

use crate::data::ReturnSeries;

/// Per-asset weight bounds `[min, max]`.
///
/// Defaults to `[0.05, 0.40]`: every asset keeps at least 5% and at most
/// 40% of the portfolio.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightBounds {
    min: f64,
    max: f64,
}

impl Default for WeightBounds {
    fn default() -> Self {
        Self {
            min: 0.05,
            max: 0.40,
        }
    }
}

impl WeightBounds {
    /// Creates bounds with `0 <= min < max <= 1`.
    ///
    /// # Errors
    ///
    /// [`ValidationError::InvalidBounds`] otherwise.
    pub fn new(min: f64, max: f64) -> Result<Self, ValidationError> {
        if !min.is_finite() || !max.is_finite() || min < 0.0 || max > 1.0 || min >= max {
            return Err(ValidationError::InvalidBounds { min, max });
        }
        Ok(Self { min, max })
    }

    /// Lower bound.
    #[inline]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound.
    #[inline]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Checks that `n_assets` fully invested assets fit inside the bounds.
    pub fn check_feasible(&self, n_assets: usize) -> Result<(), ValidationError> {
        ensure_feasible_bounds(self.min, self.max, n_assets)
    }
}

/// A Sharpe-maximisation request.
///
/// Construction validates everything that does not depend on the data
/// content: at least two distinct assets, each present in the return
/// series, a finite risk-free rate and bounds that admit a fully invested
/// portfolio. Data sufficiency is checked when moments are estimated.
#[derive(Clone, Debug, PartialEq)]
pub struct OptimisationRequest {
    assets: Vec<String>,
    returns: ReturnSeries,
    risk_free_rate: f64,
    bounds: WeightBounds,
}

impl OptimisationRequest {
    /// Creates a request for `assets` drawn from `returns`.
    ///
    /// The series may hold more assets than requested; its columns are
    /// reordered to match `assets`.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::TooFewAssets`] for fewer than two assets
    /// - [`ValidationError::DuplicateAsset`] for a repeated identifier
    /// - [`ValidationError::UnknownAsset`] for an asset absent from `returns`
    /// - [`ValidationError::NonFinite`] for a NaN or infinite risk-free rate
    /// - [`ValidationError::InfeasibleBounds`] if `n·min > 1` or `n·max < 1`
    pub fn new<I, S>(
        assets: I,
        returns: &ReturnSeries,
        risk_free_rate: f64,
        bounds: WeightBounds,
    ) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let assets: Vec<String> = assets.into_iter().map(Into::into).collect();
        ensure_distinct_assets(&assets, 2)?;
        let risk_free_rate = ensure_finite("risk_free_rate", risk_free_rate)?;
        bounds.check_feasible(assets.len())?;
        let returns = returns.select(&assets)?;

        Ok(Self {
            assets,
            returns,
            risk_free_rate,
            bounds,
        })
    }

    /// Requested assets, in output order.
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// Return series restricted to the requested assets.
    pub fn returns(&self) -> &ReturnSeries {
        &self.returns
    }

    /// Annual risk-free rate.
    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    /// Weight bounds.
    pub fn bounds(&self) -> WeightBounds {
        self.bounds
    }
}
