//! Error types for structured error handling.
//!
//! This module provides:
//! - `ValidationError`: Rejected request parameters, never retried internally
//! - `DataInsufficientError`: Historical return data too short or degenerate
//!
//! Solver non-convergence lives with the optimiser, since only it can fail
//! that way.

use thiserror::Error;

/// Malformed or out-of-domain request parameters.
///
/// Always surfaced immediately; the engine never retries or repairs the
/// offending request.
///
/// # Examples
/// ```
/// use quant_core::types::ValidationError;
///
/// let err = ValidationError::NonPositive { name: "initial_capital", value: -5.0 };
/// assert_eq!(format!("{}", err), "initial_capital must be positive, got -5");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A parameter that must be strictly positive was zero or negative.
    #[error("{name} must be positive, got {value}")]
    NonPositive {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// A parameter that must be non-negative was negative.
    #[error("{name} must be non-negative, got {value}")]
    Negative {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// A parameter was NaN or infinite.
    #[error("{name} must be finite, got {value}")]
    NonFinite {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// Fewer assets than the optimiser needs.
    #[error("at least {need} assets are required, got {got}")]
    TooFewAssets {
        /// Number of assets supplied
        got: usize,
        /// Minimum number of assets required
        need: usize,
    },

    /// The same asset identifier appeared twice.
    #[error("duplicate asset identifier: {0}")]
    DuplicateAsset(String),

    /// An asset was requested that the supplied data does not cover.
    #[error("asset {0} is not covered by the supplied data")]
    UnknownAsset(String),

    /// Weight bounds violate `0 <= min < max <= 1`.
    #[error("invalid weight bounds [{min}, {max}]: require 0 <= min < max <= 1")]
    InvalidBounds {
        /// Lower bound per asset
        min: f64,
        /// Upper bound per asset
        max: f64,
    },

    /// Weight bounds cannot be satisfied together with full investment.
    #[error("bounds [{min}, {max}] cannot sum to 1 across {assets} assets")]
    InfeasibleBounds {
        /// Lower bound per asset
        min: f64,
        /// Upper bound per asset
        max: f64,
        /// Number of assets
        assets: usize,
    },

    /// Tabular input whose dimensions do not line up.
    #[error("shape mismatch in {context}: expected {expected}, got {got}")]
    ShapeMismatch {
        /// Where the mismatch was found
        context: &'static str,
        /// Expected length
        expected: usize,
        /// Actual length
        got: usize,
    },

    /// Parameters that leave the representable range of the computation.
    #[error("out of range: {0}")]
    OutOfRange(String),
}

/// Historical data too short or degenerate to estimate from.
///
/// The caller decides whether to widen the history window and retry.
///
/// # Examples
/// ```
/// use quant_core::types::DataInsufficientError;
///
/// let err = DataInsufficientError::TooFewObservations { got: 1, need: 2 };
/// assert!(format!("{}", err).contains("got 1"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataInsufficientError {
    /// Not enough complete return rows after dropping missing values.
    #[error("insufficient observations: got {got}, need at least {need}")]
    TooFewObservations {
        /// Usable rows
        got: usize,
        /// Minimum rows required
        need: usize,
    },

    /// Covariance matrix is singular or not positive definite.
    #[error("covariance matrix is not positive definite (pivot {pivot} = {value})")]
    NotPositiveDefinite {
        /// Index of the failing Cholesky pivot
        pivot: usize,
        /// Value of the failing pivot
        value: f64,
    },

    /// A series whose statistics are unusable (for example non-finite).
    #[error("degenerate series: {0}")]
    DegenerateSeries(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::TooFewAssets { got: 1, need: 2 };
        assert_eq!(err.to_string(), "at least 2 assets are required, got 1");

        let err = ValidationError::InfeasibleBounds {
            min: 0.3,
            max: 0.4,
            assets: 4,
        };
        assert!(err.to_string().contains("4 assets"));

        let err = ValidationError::DuplicateAsset("VALE3".to_string());
        assert!(err.to_string().contains("VALE3"));
    }

    #[test]
    fn test_data_insufficient_display() {
        let err = DataInsufficientError::NotPositiveDefinite {
            pivot: 1,
            value: 0.0,
        };
        assert!(err.to_string().contains("not positive definite"));
        assert!(err.to_string().contains("pivot 1"));
    }

    #[test]
    fn test_errors_are_comparable() {
        let a = ValidationError::UnknownAsset("A".to_string());
        let b = ValidationError::UnknownAsset("A".to_string());
        assert_eq!(a, b);
    }
}
