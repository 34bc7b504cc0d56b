//! # quant_optimiser
//!
//! Constrained mean-variance allocation for the portfolio engine.
//!
//! Given historical returns for a candidate asset set, selects the weight
//! vector maximising the annualised Sharpe ratio subject to full investment
//! (`Σ w = 1`) and per-asset box constraints (`min ≤ w_i ≤ max`).
//!
//! ## Architecture Position
//!
//! Layer 2 of the engine. Depends on `quant_core` (L1) only. Market data is
//! injected as a [`ReturnSeries`] or [`PriceTable`] value; this crate never
//! fetches anything.
//!
//! ## Modules
//!
//! - `data`: Price tables and aligned return series
//! - `moments`: Annualised mean/covariance estimation and portfolio statistics
//! - `request`: Validated optimisation requests and weight bounds
//! - `constraints`: Euclidean projection onto the bounded simplex
//! - `solver`: Spectral projected-gradient minimiser with a nonmonotone line search
//! - `optimiser`: Maximum-Sharpe entry points
//! - `weights`: Output weight vectors
//!
//! ## Failure Modes
//!
//! Every failure is a distinct [`OptimiserError`] variant:
//! - `Validation`: malformed request, never retried
//! - `DataInsufficient`: too few rows or a non-positive-definite covariance
//! - `OptimisationFailed`: the solver ran but did not converge (recoverable;
//!   the caller may fall back to [`WeightVector::equal`])
//!
//! ## Example
//!
//! ```rust
//! use quant_optimiser::{optimise, OptimisationRequest, ReturnSeries, WeightBounds};
//!
//! let rows = vec![
//!     vec![Some(0.010), Some(0.002)],
//!     vec![Some(-0.004), Some(0.001)],
//!     vec![Some(0.007), Some(-0.003)],
//!     vec![Some(0.001), Some(0.004)],
//!     vec![None, Some(0.002)], // dropped
//! ];
//! let series = ReturnSeries::from_rows(vec!["A".into(), "B".into()], rows).unwrap();
//! assert_eq!(series.len(), 4);
//!
//! let request = OptimisationRequest::new(
//!     ["A", "B"],
//!     &series,
//!     0.02,
//!     WeightBounds::new(0.05, 0.95).unwrap(),
//! )
//! .unwrap();
//!
//! let portfolio = optimise(&request).unwrap();
//! assert!((portfolio.weights.total() - 1.0).abs() < 1e-6);
//! ```

pub mod constraints;
pub mod data;
pub mod moments;
pub mod optimiser;
pub mod request;
pub mod solver;
pub mod weights;

mod error;

pub use data::{PriceTable, ReturnSeries};
pub use error::{OptimisationFailed, OptimiserError};
pub use moments::{portfolio_performance, MomentEstimate, PortfolioPerformance};
pub use optimiser::{
    max_sharpe_weights, optimise, optimise_moments, optimise_with, OptimisedPortfolio,
    OptimiserConfig,
};
pub use request::{OptimisationRequest, WeightBounds};
pub use solver::{ProjectedGradientSolver, SolverConfig, SolverResult, Termination};
pub use weights::WeightVector;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::data::*;
    pub use crate::moments::*;
    pub use crate::optimiser::*;
    pub use crate::request::*;
    pub use crate::weights::*;
    pub use crate::{OptimisationFailed, OptimiserError};
}
