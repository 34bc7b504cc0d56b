//! Maximum-Sharpe allocation.
//!
//! # Problem
//!
//! ```text
//! maximise   (w·μ - rf) / sqrt(wᵀΣw)
//! subject to Σ w_i = 1,  min ≤ w_i ≤ max
//! ```
//!
//! Solved as minimisation of the negative Sharpe ratio with
//! [`ProjectedGradientSolver`], starting from equal weights. The gradient
//! of the negative Sharpe ratio is
//!
//! ```text
//! ∇ = -μ/σ_p + (w·μ - rf) Σw / σ_p³,    σ_p = sqrt(wᵀΣw)
//! ```
//!
//! Because `Σ` is positive definite, `σ_p > 0` on the whole feasible set
//! and the objective is smooth there.

use quant_core::math::linalg::{dot, mat_vec};
use quant_core::types::ValidationError;
use quant_core::validation::{ensure_distinct_assets, ensure_finite};
use quant_core::TRADING_DAYS_PER_YEAR;
use tracing::{debug, info, warn};

use crate::constraints::{constraint_violation, project_capped_simplex};
use crate::data::ReturnSeries;
use crate::error::{OptimisationFailed, OptimiserError};
use crate::moments::{portfolio_performance, MomentEstimate};
use crate::request::{OptimisationRequest, WeightBounds};
use crate::solver::{ProjectedGradientSolver, SolverConfig, Termination};
use crate::weights::WeightVector;

/// Largest tolerated constraint violation in a returned weight vector.
const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// Estimation and solver settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OptimiserConfig {
    /// Observation periods per year used to annualise moments.
    pub periods_per_year: f64,
    /// Solver settings.
    pub solver: SolverConfig,
}

impl Default for OptimiserConfig {
    fn default() -> Self {
        Self {
            periods_per_year: TRADING_DAYS_PER_YEAR as f64,
            solver: SolverConfig::default(),
        }
    }
}

impl OptimiserConfig {
    /// Daily data with a custom solver configuration.
    pub fn with_solver(solver: SolverConfig) -> Self {
        Self {
            solver,
            ..Self::default()
        }
    }
}

/// Result of a successful optimisation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OptimisedPortfolio {
    /// Optimal weights in request order.
    pub weights: WeightVector,
    /// Annualised expected return of the portfolio.
    pub expected_return: f64,
    /// Annualised volatility of the portfolio.
    pub volatility: f64,
    /// Sharpe ratio at the optimum.
    pub sharpe_ratio: f64,
    /// Solver iterations used.
    pub iterations: usize,
}

/// Maximises the Sharpe ratio for `request` with the default configuration.
///
/// # Errors
///
/// - [`OptimiserError::DataInsufficient`] with fewer than two complete rows
///   or a covariance that is not positive definite
/// - [`OptimiserError::OptimisationFailed`] if the solver does not converge
///
/// # Examples
///
/// ```
/// use quant_optimiser::{optimise, OptimisationRequest, ReturnSeries, WeightBounds};
///
/// let series = ReturnSeries::from_complete_rows(
///     vec!["A".into(), "B".into(), "C".into()],
///     vec![
///         vec![0.010, 0.002, -0.004],
///         vec![-0.006, 0.004, 0.008],
///         vec![0.012, -0.001, 0.002],
///         vec![0.001, 0.003, -0.005],
///         vec![-0.002, 0.000, 0.006],
///     ],
/// )
/// .unwrap();
///
/// let request =
///     OptimisationRequest::new(["A", "B", "C"], &series, 0.02, WeightBounds::default()).unwrap();
/// let portfolio = optimise(&request).unwrap();
///
/// for (_, w) in portfolio.weights.iter() {
///     assert!(w >= 0.05 - 1e-9 && w <= 0.40 + 1e-9);
/// }
/// ```
pub fn optimise(request: &OptimisationRequest) -> Result<OptimisedPortfolio, OptimiserError> {
    optimise_with(request, &OptimiserConfig::default())
}

/// Maximises the Sharpe ratio for `request` with explicit settings.
pub fn optimise_with(
    request: &OptimisationRequest,
    config: &OptimiserConfig,
) -> Result<OptimisedPortfolio, OptimiserError> {
    let moments = MomentEstimate::from_returns(request.returns(), config.periods_per_year)?;
    optimise_moments(
        request.assets(),
        &moments,
        request.risk_free_rate(),
        request.bounds(),
        &config.solver,
    )
}

/// Maximises the Sharpe ratio given annualised moments directly.
///
/// # Errors
///
/// - [`OptimiserError::Validation`] if `assets` does not match the moment
///   dimensions, or the rate or bounds are invalid
/// - [`OptimiserError::OptimisationFailed`] if the solver does not converge
///   or its final point violates the constraints
pub fn optimise_moments(
    assets: &[String],
    moments: &MomentEstimate,
    risk_free_rate: f64,
    bounds: WeightBounds,
    solver: &SolverConfig,
) -> Result<OptimisedPortfolio, OptimiserError> {
    ensure_distinct_assets(assets, 2)?;
    if assets.len() != moments.n_assets() {
        return Err(ValidationError::ShapeMismatch {
            context: "assets vs moments",
            expected: moments.n_assets(),
            got: assets.len(),
        }
        .into());
    }
    let rf = ensure_finite("risk_free_rate", risk_free_rate)?;
    bounds.check_feasible(assets.len())?;

    let (lo, hi) = (bounds.min(), bounds.max());
    let mu = moments.mean();
    let sigma = moments.covariance();
    let n = assets.len();

    let objective = |w: &[f64]| -> f64 {
        let sd = dot(w, &mat_vec(sigma, w)).sqrt();
        -(dot(w, mu) - rf) / sd
    };
    let gradient = |w: &[f64]| -> Vec<f64> {
        let sw = mat_vec(sigma, w);
        let sd = dot(w, &sw).sqrt();
        let excess = dot(w, mu) - rf;
        let sd3 = sd * sd * sd;
        mu.iter()
            .zip(&sw)
            .map(|(m, s)| -m / sd + excess * s / sd3)
            .collect()
    };
    let project = |v: &[f64]| project_capped_simplex(v, lo, hi);

    debug!(assets = n, risk_free_rate = rf, min = lo, max = hi, "maximising Sharpe ratio");

    let result = ProjectedGradientSolver::new(*solver).minimise(
        objective,
        gradient,
        project,
        vec![1.0 / n as f64; n],
    );

    if !result.converged {
        warn!(
            iterations = result.iterations,
            stationarity = result.stationarity,
            termination = %result.termination,
            "Sharpe maximisation did not converge"
        );
        return Err(OptimisationFailed {
            iterations: result.iterations,
            stationarity: result.stationarity,
            termination: result.termination,
        }
        .into());
    }

    let violation = constraint_violation(&result.params, lo, hi);
    if violation > FEASIBILITY_TOLERANCE {
        warn!(violation, "solver returned an infeasible allocation");
        return Err(OptimisationFailed {
            iterations: result.iterations,
            stationarity: result.stationarity,
            termination: Termination::ConstraintViolation,
        }
        .into());
    }

    let perf = portfolio_performance(&result.params, moments, rf);
    info!(
        iterations = result.iterations,
        expected_return = perf.expected_return,
        volatility = perf.volatility,
        sharpe = perf.sharpe_ratio,
        "optimised allocation"
    );

    Ok(OptimisedPortfolio {
        weights: WeightVector::new(assets, &result.params)?,
        expected_return: perf.expected_return,
        volatility: perf.volatility,
        sharpe_ratio: perf.sharpe_ratio,
        iterations: result.iterations,
    })
}

/// Maximum-Sharpe weights for `assets` from daily `returns`.
///
/// Shorthand for building an [`OptimisationRequest`] and calling
/// [`optimise`], keeping only the weights.
pub fn max_sharpe_weights<S: AsRef<str>>(
    assets: &[S],
    returns: &ReturnSeries,
    risk_free_rate: f64,
    bounds: WeightBounds,
) -> Result<WeightVector, OptimiserError> {
    let request = OptimisationRequest::new(
        assets.iter().map(|a| a.as_ref().to_string()),
        returns,
        risk_free_rate,
        bounds,
    )?;
    Ok(optimise(&request)?.weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn diagonal_moments() -> MomentEstimate {
        MomentEstimate::new(
            vec![0.10, 0.12, 0.14],
            vec![
                vec![0.04, 0.0, 0.0],
                vec![0.0, 0.09, 0.0],
                vec![0.0, 0.0, 0.16],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_unconstrained_tangency_portfolio() {
        // Tangency weights ∝ Σ⁻¹(μ - rf) = (2, 10/9, 0.75)
        let raw = [2.0, 10.0 / 9.0, 0.75];
        let total: f64 = raw.iter().sum();

        let result = optimise_moments(
            &ids(&["A", "B", "C"]),
            &diagonal_moments(),
            0.02,
            WeightBounds::new(0.0, 1.0).unwrap(),
            &SolverConfig::default(),
        )
        .unwrap();

        for (w, r) in result.weights.values().iter().zip(raw) {
            assert_relative_eq!(*w, r / total, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_upper_bound_binds() {
        // Tangency weight of A (51.8%) exceeds a 40% cap
        let result = optimise_moments(
            &ids(&["A", "B", "C"]),
            &diagonal_moments(),
            0.02,
            WeightBounds::new(0.05, 0.40).unwrap(),
            &SolverConfig::default(),
        )
        .unwrap();

        assert_relative_eq!(result.weights.get("A").unwrap(), 0.40, epsilon = 1e-6);
        assert_relative_eq!(result.weights.total(), 1.0, epsilon = 1e-9);
        assert!(result.weights.get("B").unwrap() > result.weights.get("C").unwrap());
    }

    #[test]
    fn test_optimum_beats_equal_weights() {
        let m = diagonal_moments();
        let result = optimise_moments(
            &ids(&["A", "B", "C"]),
            &m,
            0.02,
            WeightBounds::new(0.05, 0.60).unwrap(),
            &SolverConfig::default(),
        )
        .unwrap();

        let equal = portfolio_performance(&[1.0 / 3.0; 3], &m, 0.02);
        assert!(result.sharpe_ratio > equal.sharpe_ratio);
    }

    #[test]
    fn test_iteration_cap_is_recoverable_failure() {
        let err = optimise_moments(
            &ids(&["A", "B", "C"]),
            &diagonal_moments(),
            0.02,
            WeightBounds::new(0.0, 1.0).unwrap(),
            &SolverConfig::new(1e-12, 1),
        )
        .unwrap_err();

        assert!(err.is_recoverable());
        match err {
            OptimiserError::OptimisationFailed(f) => {
                assert_eq!(f.termination, Termination::MaxIterations)
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = optimise_moments(
            &ids(&["A", "B"]),
            &diagonal_moments(),
            0.02,
            WeightBounds::new(0.0, 1.0).unwrap(),
            &SolverConfig::default(),
        )
        .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_infeasible_bounds() {
        let err = optimise_moments(
            &ids(&["A", "B", "C"]),
            &diagonal_moments(),
            0.02,
            WeightBounds::new(0.0, 0.2).unwrap(),
            &SolverConfig::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            OptimiserError::Validation(ValidationError::InfeasibleBounds {
                min: 0.0,
                max: 0.2,
                assets: 3
            })
        );
    }
}
