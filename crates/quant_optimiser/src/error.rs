//! Optimiser error types.
//!
//! Validation and data failures come from `quant_core`; this module adds the
//! solver failure and the umbrella [`OptimiserError`] returned by every entry
//! point.

use quant_core::types::{DataInsufficientError, ValidationError};
use thiserror::Error;

use crate::solver::Termination;

/// The solver ran but did not reach a stationary point.
///
/// No weights are attached: a non-converged iterate is never returned as if
/// it were optimal.
///
/// # Examples
///
/// ```
/// use quant_optimiser::{OptimisationFailed, Termination};
///
/// let err = OptimisationFailed {
///     iterations: 500,
///     stationarity: 1e-3,
///     termination: Termination::MaxIterations,
/// };
/// assert!(format!("{}", err).contains("500"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[error("optimisation failed after {iterations} iterations ({termination}); stationarity = {stationarity:e}")]
pub struct OptimisationFailed {
    /// Iterations performed before stopping
    pub iterations: usize,
    /// Projected-gradient step norm at the last iterate
    pub stationarity: f64,
    /// Why the solver stopped
    pub termination: Termination,
}

/// Errors returned by the optimiser entry points.
///
/// # Variants
///
/// - `Validation`: malformed request
/// - `DataInsufficient`: history too short or covariance not positive definite
/// - `OptimisationFailed`: solver did not converge
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimiserError {
    /// Malformed request.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Data too short or degenerate to estimate moments from.
    #[error(transparent)]
    DataInsufficient(#[from] DataInsufficientError),

    /// Solver did not converge.
    #[error(transparent)]
    OptimisationFailed(#[from] OptimisationFailed),
}

impl OptimiserError {
    /// Whether a caller may reasonably fall back to a default allocation.
    ///
    /// Only solver failures qualify; invalid requests and unusable data are
    /// reported as-is.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::OptimisationFailed(_))
    }

    /// Check if this is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a data-insufficiency error.
    pub fn is_data_insufficient(&self) -> bool {
        matches!(self, Self::DataInsufficient(_))
    }
}
