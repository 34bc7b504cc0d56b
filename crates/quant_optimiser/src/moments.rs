//! Annualised return moments and portfolio statistics.

use quant_core::math::linalg::{cholesky, dot, mat_vec, scale_matrix};
use quant_core::math::stats::{column_means, sample_covariance};
use quant_core::types::{DataInsufficientError, ValidationError};
use quant_core::validation::ensure_positive;
use tracing::debug;

use crate::data::ReturnSeries;
use crate::error::OptimiserError;

/// Annualised expected returns and covariance of a set of assets.
///
/// The covariance is guaranteed symmetric positive definite.
#[derive(Clone, Debug, PartialEq)]
pub struct MomentEstimate {
    mean: Vec<f64>,
    covariance: Vec<Vec<f64>>,
}

impl MomentEstimate {
    /// Estimates moments from periodic returns.
    ///
    /// Sample mean and sample covariance (denominator `n - 1`) are scaled
    /// by `periods_per_year`.
    ///
    /// # Errors
    ///
    /// - [`OptimiserError::Validation`] if `periods_per_year` is not
    ///   positive and finite
    /// - [`OptimiserError::DataInsufficient`] with fewer than two rows, or
    ///   when the covariance is not positive definite (e.g. a constant or
    ///   perfectly collinear asset)
    ///
    /// # Examples
    ///
    /// ```
    /// use quant_optimiser::{MomentEstimate, ReturnSeries};
    ///
    /// let series = ReturnSeries::from_complete_rows(
    ///     vec!["A".into(), "B".into()],
    ///     vec![vec![0.01, 0.00], vec![-0.01, 0.02], vec![0.03, -0.01]],
    /// )
    /// .unwrap();
    ///
    /// let moments = MomentEstimate::from_returns(&series, 252.0).unwrap();
    /// assert!((moments.mean()[0] - 0.01 * 252.0).abs() < 1e-12);
    /// ```
    pub fn from_returns(
        series: &ReturnSeries,
        periods_per_year: f64,
    ) -> Result<Self, OptimiserError> {
        ensure_positive("periods_per_year", periods_per_year)?;
        let n_assets = series.assets().len();

        let mut covariance = sample_covariance(series.rows(), n_assets)?;
        scale_matrix(&mut covariance, periods_per_year);
        let mean: Vec<f64> = column_means(series.rows(), n_assets)
            .into_iter()
            .map(|m| m * periods_per_year)
            .collect();

        debug!(
            assets = n_assets,
            observations = series.len(),
            periods_per_year,
            "estimated annualised moments"
        );

        Self::new(mean, covariance)
    }

    /// Wraps externally supplied annualised moments.
    ///
    /// # Errors
    ///
    /// - [`OptimiserError::Validation`] for mismatched dimensions or
    ///   non-finite entries
    /// - [`OptimiserError::DataInsufficient`] if the covariance is not
    ///   symmetric positive definite
    pub fn new(mean: Vec<f64>, covariance: Vec<Vec<f64>>) -> Result<Self, OptimiserError> {
        let n = mean.len();
        if covariance.len() != n {
            return Err(ValidationError::ShapeMismatch {
                context: "covariance rows",
                expected: n,
                got: covariance.len(),
            }
            .into());
        }
        if let Some(row) = covariance.iter().find(|r| r.len() != n) {
            return Err(ValidationError::ShapeMismatch {
                context: "covariance columns",
                expected: n,
                got: row.len(),
            }
            .into());
        }
        if mean.iter().chain(covariance.iter().flatten()).any(|x| !x.is_finite()) {
            return Err(DataInsufficientError::DegenerateSeries(
                "non-finite mean or covariance entry".into(),
            )
            .into());
        }
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (covariance[i][j], covariance[j][i]);
                if (a - b).abs() > 1e-12 * (1.0 + a.abs().max(b.abs())) {
                    return Err(DataInsufficientError::DegenerateSeries(format!(
                        "covariance is not symmetric at ({}, {})",
                        i, j
                    ))
                    .into());
                }
            }
        }

        cholesky(&covariance)?;
        Ok(Self { mean, covariance })
    }

    /// Annualised expected returns, in asset order.
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Annualised covariance matrix.
    pub fn covariance(&self) -> &[Vec<f64>] {
        &self.covariance
    }

    /// Number of assets.
    pub fn n_assets(&self) -> usize {
        self.mean.len()
    }

    /// Annualised volatility of each asset.
    pub fn volatilities(&self) -> Vec<f64> {
        (0..self.n_assets())
            .map(|i| self.covariance[i][i].sqrt())
            .collect()
    }
}

/// Expected return, volatility and Sharpe ratio of a weighted portfolio.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PortfolioPerformance {
    /// Annualised expected return `w·μ`.
    pub expected_return: f64,
    /// Annualised volatility `sqrt(wᵀΣw)`.
    pub volatility: f64,
    /// `(w·μ - rf) / volatility`.
    pub sharpe_ratio: f64,
}

/// Evaluates `weights` against annualised `moments`.
///
/// # Examples
///
/// ```
/// use quant_optimiser::{portfolio_performance, MomentEstimate};
///
/// let moments = MomentEstimate::new(
///     vec![0.10, 0.20],
///     vec![vec![0.04, 0.0], vec![0.0, 0.09]],
/// )
/// .unwrap();
///
/// let perf = portfolio_performance(&[1.0, 0.0], &moments, 0.02);
/// assert!((perf.expected_return - 0.10).abs() < 1e-12);
/// assert!((perf.volatility - 0.20).abs() < 1e-12);
/// assert!((perf.sharpe_ratio - 0.40).abs() < 1e-12);
/// ```
pub fn portfolio_performance(
    weights: &[f64],
    moments: &MomentEstimate,
    risk_free_rate: f64,
) -> PortfolioPerformance {
    let expected_return = dot(weights, &moments.mean);
    let variance = dot(weights, &mat_vec(&moments.covariance, weights));
    let volatility = variance.max(0.0).sqrt();
    PortfolioPerformance {
        expected_return,
        volatility,
        sharpe_ratio: (expected_return - risk_free_rate) / volatility,
    }
}
