//! # quant_simulation: Monte Carlo Path Simulator
//!
//! Projects `path_count` independent trajectories of an initial capital
//! amount under a discretised Geometric Brownian Motion and returns the full
//! trajectory grid, so callers can derive arbitrary percentiles or plot
//! sample paths.
//!
//! ## Architecture Position
//!
//! Layer 2 of the engine. Depends on `quant_core` (L1) only; it has no
//! dependency on the optimiser.
//!
//! ## Model
//!
//! ```text
//! dt        = 1 / 252
//! μ_daily   = annual_return / 252
//! σ_daily   = annual_volatility / √252
//! V(t)      = V(t-1) × exp(X_t),   X_t ~ Normal(drift_daily, σ_daily)
//! ```
//!
//! `drift_daily` follows the request's [`DriftConvention`]: Itô-corrected
//! `μ_daily - σ_daily² / 2` by default, or `μ_daily` as-is.
//!
//! Draws are independent across days and across paths. Row 0 of every path
//! is exactly `initial_capital`.
//!
//! ## Example
//!
//! ```rust
//! use quant_simulation::{simulate_seeded, SimulationRequest};
//!
//! let request = SimulationRequest::new(10_000.0, 0.12, 0.15, 5, 100).unwrap();
//! let ensemble = simulate_seeded(&request, 42).unwrap();
//!
//! assert_eq!(ensemble.shape(), (5 * 252 + 1, 100));
//! assert!(ensemble.terminal_values().iter().all(|&v| v > 0.0));
//! ```

pub mod ensemble;
pub mod request;
pub mod rng;
pub mod simulator;

pub use ensemble::{PathEnsemble, ProjectionSummary};
pub use request::{DriftConvention, SimulationRequest};
pub use rng::PathRng;
pub use simulator::{simulate, simulate_seeded, simulate_with_rng};

pub use quant_core::TRADING_DAYS_PER_YEAR;
