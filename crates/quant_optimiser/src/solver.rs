//! Spectral projected-gradient minimiser for smooth objectives over a
//! convex set.
//!
//! # Algorithm
//!
//! ```text
//! d_k     = P(x_k - α_k ∇f(x_k)) - x_k
//! x_{k+1} = x_k + λ_k d_k
//! ```
//!
//! where `P` is the Euclidean projection onto the feasible set. `α_k` is the
//! Barzilai-Borwein step `sᵀs / sᵀy` (`s = x_{k+1} - x_k`,
//! `y = ∇f_{k+1} - ∇f_k`), clamped to `[min_step, max_step]`. `λ_k` is found
//! by backtracking until the nonmonotone Armijo condition
//!
//! ```text
//! f(x_k + λ d_k) ≤ max(f_{k-M+1}, …, f_k) + c · λ · ∇f(x_k)ᵀ d_k
//! ```
//!
//! holds, with `M = memory`. Every iterate is a convex combination of
//! feasible points and is therefore feasible.
//!
//! The condition is relaxed by a few ulps of `|f|`: close to the optimum the
//! true decrease is smaller than the rounding error of `f`, and the gradient
//! still carries the iterate the rest of the way.
//!
//! # Convergence
//!
//! The stationarity measure is the max-norm of the unit projected-gradient
//! step `‖P(x - ∇f(x)) - x‖∞`, which is zero exactly at a first-order
//! stationary point of the constrained problem. The solver converges when
//!
//! ```text
//! ‖P(x - ∇f(x)) - x‖∞ ≤ tolerance · max(1, ‖∇f(x)‖∞)
//! ```
//!
//! so the test scales with the objective.
//!
//! # Example
//!
//! ```
//! use quant_optimiser::{ProjectedGradientSolver, SolverConfig};
//! use quant_optimiser::constraints::project_capped_simplex;
//!
//! // Minimise ‖x - c‖² over the unit simplex
//! let c = [0.6, 0.5, -0.2];
//! let f = |x: &[f64]| x.iter().zip(&c).map(|(a, b)| (a - b).powi(2)).sum::<f64>();
//! let g = |x: &[f64]| x.iter().zip(&c).map(|(a, b)| 2.0 * (a - b)).collect::<Vec<_>>();
//! let p = |v: &[f64]| project_capped_simplex(v, 0.0, 1.0);
//!
//! let solver = ProjectedGradientSolver::new(SolverConfig::default());
//! let result = solver.minimise(f, g, p, vec![1.0 / 3.0; 3]);
//!
//! assert!(result.converged);
//! assert!((result.params[0] - 0.55).abs() < 1e-6);
//! assert!((result.params[1] - 0.45).abs() < 1e-6);
//! assert!(result.params[2].abs() < 1e-6);
//! ```

use std::collections::VecDeque;
use std::fmt;

use quant_core::math::linalg::dot;
use tracing::trace;

/// Rounding slack of the Armijo test, in units of `ε·max(1, |f|)`.
const OBJECTIVE_NOISE_ULPS: f64 = 4.0;

/// Configuration for [`ProjectedGradientSolver`].
///
/// # Fields
///
/// * `tolerance` - Relative stationarity threshold for convergence
/// * `max_iterations` - Maximum number of gradient steps
/// * `min_step` - Lower clamp of the spectral step
/// * `max_step` - Upper clamp of the spectral step
/// * `armijo` - Sufficient-decrease constant `c`
/// * `backtrack` - Shrink factor of `λ` on rejection
/// * `max_backtracks` - Rejections allowed per iteration
/// * `memory` - Objective values kept for the nonmonotone test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Relative stationarity threshold for convergence.
    pub tolerance: f64,
    /// Maximum number of gradient steps.
    pub max_iterations: usize,
    /// Lower clamp of the spectral step.
    pub min_step: f64,
    /// Upper clamp of the spectral step.
    pub max_step: f64,
    /// Sufficient-decrease constant.
    pub armijo: f64,
    /// Shrink factor of the line-search parameter on rejection.
    pub backtrack: f64,
    /// Rejections allowed per iteration.
    pub max_backtracks: usize,
    /// Objective values kept for the nonmonotone test (1 = monotone).
    pub memory: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-9,
            max_iterations: 10_000,
            min_step: 1e-10,
            max_step: 1e10,
            armijo: 1e-4,
            backtrack: 0.5,
            max_backtracks: 60,
            memory: 10,
        }
    }
}

impl SolverConfig {
    /// Create a configuration with the given tolerance and iteration limit.
    ///
    /// # Panics
    ///
    /// Panics if `tolerance <= 0` or `max_iterations == 0`.
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        assert!(tolerance > 0.0, "tolerance must be positive");
        assert!(max_iterations > 0, "max_iterations must be positive");
        Self {
            tolerance,
            max_iterations,
            ..Self::default()
        }
    }

    /// Looser tolerance for interactive use.
    pub fn fast() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 2_000,
            ..Self::default()
        }
    }

    /// Tight tolerance for reference results.
    pub fn high_precision() -> Self {
        Self {
            tolerance: 1e-12,
            max_iterations: 100_000,
            ..Self::default()
        }
    }
}

/// Why the solver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Termination {
    /// Stationarity below tolerance.
    Converged,
    /// Iteration limit reached first.
    MaxIterations,
    /// No step length gave sufficient decrease.
    LineSearchFailed,
    /// Objective or gradient was NaN or infinite.
    NonFinite,
    /// Final iterate left the feasible set.
    ConstraintViolation,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Converged => "converged",
            Self::MaxIterations => "iteration limit reached",
            Self::LineSearchFailed => "line search failed",
            Self::NonFinite => "non-finite objective or gradient",
            Self::ConstraintViolation => "constraint violation",
        };
        f.write_str(text)
    }
}

/// Outcome of a minimisation.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverResult {
    /// Final iterate.
    pub params: Vec<f64>,
    /// Objective at `params`.
    pub objective: f64,
    /// Number of gradient steps taken.
    pub iterations: usize,
    /// Whether the stationarity test passed.
    pub converged: bool,
    /// Stationarity measure at `params`.
    pub stationarity: f64,
    /// Stop reason.
    pub termination: Termination,
}

/// Spectral projected-gradient minimiser.
#[derive(Debug, Clone, Default)]
pub struct ProjectedGradientSolver {
    config: SolverConfig,
}

impl ProjectedGradientSolver {
    /// Create a solver with the given configuration.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Solver configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Minimise `objective` from `initial` over the set projected by `project`.
    ///
    /// `initial` is projected before the first step, so any starting point
    /// is accepted. Every iterate, including a non-converged final one, is
    /// feasible.
    pub fn minimise<F, G, P>(
        &self,
        objective: F,
        gradient: G,
        project: P,
        initial: Vec<f64>,
    ) -> SolverResult
    where
        F: Fn(&[f64]) -> f64,
        G: Fn(&[f64]) -> Vec<f64>,
        P: Fn(&[f64]) -> Vec<f64>,
    {
        let cfg = &self.config;
        let mut x = project(&initial);
        let mut fx = objective(&x);
        let mut stationarity = f64::INFINITY;

        let finish = |x: Vec<f64>, fx: f64, iterations: usize, stationarity: f64, t: Termination| {
            SolverResult {
                params: x,
                objective: fx,
                iterations,
                converged: t == Termination::Converged,
                stationarity,
                termination: t,
            }
        };

        if !fx.is_finite() {
            return finish(x, fx, 0, stationarity, Termination::NonFinite);
        }

        let mut grad = gradient(&x);
        let mut alpha = f64::NAN;
        let mut history = VecDeque::with_capacity(cfg.memory.max(1));
        history.push_back(fx);

        for iteration in 0..cfg.max_iterations {
            if !is_finite(&grad) {
                return finish(x, fx, iteration, stationarity, Termination::NonFinite);
            }

            stationarity = projected_step_norm(&project, &x, &grad);
            if stationarity <= cfg.tolerance * gradient_scale(&grad) {
                return finish(x, fx, iteration, stationarity, Termination::Converged);
            }
            if alpha.is_nan() {
                alpha = (1.0 / stationarity).clamp(cfg.min_step, cfg.max_step);
            }

            let target = project(&descend(&x, &grad, alpha));
            let direction: Vec<f64> = target.iter().zip(&x).map(|(t, xi)| t - xi).collect();
            let slope = dot(&grad, &direction);
            let reference = history.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let slack = OBJECTIVE_NOISE_ULPS * f64::EPSILON * fx.abs().max(1.0);

            let mut lambda = 1.0;
            let mut accepted = None;
            for _ in 0..cfg.max_backtracks {
                let candidate: Vec<f64> = x
                    .iter()
                    .zip(&direction)
                    .map(|(xi, di)| xi + lambda * di)
                    .collect();
                let f_candidate = objective(&candidate);

                if f_candidate.is_finite()
                    && f_candidate <= reference + cfg.armijo * lambda * slope + slack
                {
                    accepted = Some((candidate, f_candidate));
                    break;
                }
                lambda *= cfg.backtrack;
            }

            let Some((candidate, f_candidate)) = accepted else {
                return finish(x, fx, iteration, stationarity, Termination::LineSearchFailed);
            };

            let next_grad = gradient(&candidate);
            let s: Vec<f64> = candidate.iter().zip(&x).map(|(a, b)| a - b).collect();
            let y: Vec<f64> = next_grad.iter().zip(&grad).map(|(a, b)| a - b).collect();
            let curvature = dot(&s, &y);
            alpha = if curvature > 0.0 {
                (dot(&s, &s) / curvature).clamp(cfg.min_step, cfg.max_step)
            } else {
                cfg.max_step
            };

            x = candidate;
            fx = f_candidate;
            grad = next_grad;
            history.push_back(fx);
            if history.len() > cfg.memory.max(1) {
                history.pop_front();
            }

            trace!(
                iteration,
                objective = fx,
                stationarity,
                alpha,
                lambda,
                "spectral projected gradient step"
            );
        }

        // Stationarity of the last accepted iterate
        if is_finite(&grad) {
            stationarity = projected_step_norm(&project, &x, &grad);
            if stationarity <= cfg.tolerance * gradient_scale(&grad) {
                return finish(x, fx, cfg.max_iterations, stationarity, Termination::Converged);
            }
        }
        finish(x, fx, cfg.max_iterations, stationarity, Termination::MaxIterations)
    }
}

fn is_finite(v: &[f64]) -> bool {
    v.iter().all(|g| g.is_finite())
}

fn gradient_scale(grad: &[f64]) -> f64 {
    grad.iter().fold(1.0_f64, |m, g| m.max(g.abs()))
}

fn projected_step_norm<P>(project: &P, x: &[f64], grad: &[f64]) -> f64
where
    P: Fn(&[f64]) -> Vec<f64>,
{
    max_abs_diff(&project(&descend(x, grad, 1.0)), x)
}

fn descend(x: &[f64], grad: &[f64], step: f64) -> Vec<f64> {
    x.iter().zip(grad).map(|(xi, gi)| xi - step * gi).collect()
}

fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::project_capped_simplex;
    use approx::assert_relative_eq;

    fn box_simplex(lo: f64, hi: f64) -> impl Fn(&[f64]) -> Vec<f64> {
        move |v: &[f64]| project_capped_simplex(v, lo, hi)
    }

    #[test]
    fn test_config_presets() {
        let default = SolverConfig::default();
        assert!(SolverConfig::fast().tolerance > default.tolerance);
        assert!(SolverConfig::high_precision().tolerance < default.tolerance);
        assert!(SolverConfig::high_precision().max_iterations > default.max_iterations);

        let custom = SolverConfig::new(1e-7, 50);
        assert_eq!(custom.max_iterations, 50);
        assert_eq!(custom.armijo, default.armijo);
    }

    #[test]
    #[should_panic(expected = "tolerance must be positive")]
    fn test_config_rejects_zero_tolerance() {
        SolverConfig::new(0.0, 10);
    }

    #[test]
    fn test_interior_quadratic() {
        // min (x0 - 0.3)^2 + 2 (x1 - 0.7)^2 on the simplex: optimum is feasible
        let f = |x: &[f64]| (x[0] - 0.3).powi(2) + 2.0 * (x[1] - 0.7).powi(2);
        let g = |x: &[f64]| vec![2.0 * (x[0] - 0.3), 4.0 * (x[1] - 0.7)];

        let result = ProjectedGradientSolver::default().minimise(
            f,
            g,
            box_simplex(0.0, 1.0),
            vec![0.5, 0.5],
        );

        assert!(result.converged);
        assert_eq!(result.termination, Termination::Converged);
        assert_relative_eq!(result.params[0], 0.3, epsilon = 1e-7);
        assert_relative_eq!(result.params[1], 0.7, epsilon = 1e-7);
        assert!(result.stationarity < 1e-9);
    }

    #[test]
    fn test_stop_rule_scales_with_gradient() {
        // Same optimum as above with the objective scaled by 1e6
        let f = |x: &[f64]| 1e6 * ((x[0] - 0.3).powi(2) + 2.0 * (x[1] - 0.7).powi(2));
        let g = |x: &[f64]| vec![2e6 * (x[0] - 0.3), 4e6 * (x[1] - 0.7)];

        let result = ProjectedGradientSolver::default().minimise(
            f,
            g,
            box_simplex(0.0, 1.0),
            vec![0.9, 0.1],
        );

        assert!(result.converged);
        assert!(result.iterations < 100);
        assert_relative_eq!(result.params[0], 0.3, epsilon = 1e-7);
        assert_relative_eq!(result.params[1], 0.7, epsilon = 1e-7);
    }

    #[test]
    fn test_active_upper_bound() {
        // Linear objective pushes everything into the first coordinate
        let f = |x: &[f64]| -x[0];
        let g = |_: &[f64]| vec![-1.0, 0.0, 0.0];

        let result = ProjectedGradientSolver::default().minimise(
            f,
            g,
            box_simplex(0.1, 0.6),
            vec![1.0 / 3.0; 3],
        );

        assert!(result.converged);
        assert_relative_eq!(result.params[0], 0.6, epsilon = 1e-9);
        assert_relative_eq!(result.params[1] + result.params[2], 0.4, epsilon = 1e-9);
    }

    #[test]
    fn test_iteration_limit() {
        let f = |x: &[f64]| (x[0] - 0.3).powi(2) + 50.0 * (x[1] - 0.7).powi(2);
        let g = |x: &[f64]| vec![2.0 * (x[0] - 0.3), 100.0 * (x[1] - 0.7)];
        let solver = ProjectedGradientSolver::new(SolverConfig::new(1e-12, 1));

        let result = solver.minimise(f, g, box_simplex(0.0, 1.0), vec![0.9, 0.1]);

        assert!(!result.converged);
        assert_eq!(result.termination, Termination::MaxIterations);
        assert_eq!(result.iterations, 1);
        assert_relative_eq!(result.params.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_non_finite_objective() {
        let f = |_: &[f64]| f64::NAN;
        let g = |_: &[f64]| vec![0.0, 0.0];

        let result =
            ProjectedGradientSolver::default().minimise(f, g, box_simplex(0.0, 1.0), vec![0.5, 0.5]);

        assert!(!result.converged);
        assert_eq!(result.termination, Termination::NonFinite);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn test_termination_display() {
        assert_eq!(Termination::MaxIterations.to_string(), "iteration limit reached");
        assert_eq!(Termination::LineSearchFailed.to_string(), "line search failed");
    }
}
