//! GBM path generation.
//!
//! # Algorithm
//!
//! 1. Precompute `drift_daily` and `σ_daily` from the request
//! 2. For each path, fill days `1..=T` with standard normals in one batch
//! 3. Turn the batch into growth factors `exp(drift_daily + σ_daily·Z)` and
//!    accumulate them as a running product starting from `initial_capital`
//!
//! The running product gives `V(t) = V(0) · Π exp(X_s)` without recomputing
//! any prefix.
//!
//! # Performance
//!
//! One allocation for the whole grid; cost is `O(T × paths)` normal draws
//! plus the same number of multiplications. The computation is synchronous
//! and never yields; callers bound `path_count`/`horizon_years` themselves.

use quant_core::types::ValidationError;
use tracing::debug;

use crate::ensemble::PathEnsemble;
use crate::request::SimulationRequest;
use crate::rng::PathRng;

/// Simulates with a generator seeded from operating-system entropy.
///
/// Results differ between calls; use [`simulate_seeded`] for reproducible
/// output.
pub fn simulate(request: &SimulationRequest) -> Result<PathEnsemble, ValidationError> {
    let mut rng = PathRng::from_entropy();
    simulate_with_rng(request, &mut rng)
}

/// Simulates with a generator seeded from `seed`.
///
/// # Examples
///
/// ```rust
/// use quant_simulation::{simulate_seeded, SimulationRequest};
///
/// let request = SimulationRequest::new(10_000.0, 0.12, 0.0, 1, 1).unwrap();
/// let ensemble = simulate_seeded(&request, 0).unwrap();
///
/// assert_eq!(ensemble.shape(), (253, 1));
/// let last = ensemble.value(252, 0).unwrap();
/// assert!((last - 10_000.0 * 0.12_f64.exp()).abs() < 1e-6);
/// ```
pub fn simulate_seeded(
    request: &SimulationRequest,
    seed: u64,
) -> Result<PathEnsemble, ValidationError> {
    let mut rng = PathRng::from_seed(seed);
    simulate_with_rng(request, &mut rng)
}

/// Simulates drawing shocks from the supplied generator.
///
/// # Errors
///
/// [`ValidationError::OutOfRange`] if the grid size overflows `usize`, or
/// if the parameters are extreme enough that a path overflows or
/// underflows `f64` (a value that is not finite and strictly positive is
/// never returned).
pub fn simulate_with_rng(
    request: &SimulationRequest,
    rng: &mut PathRng,
) -> Result<PathEnsemble, ValidationError> {
    let n_steps = request.trading_days();
    let n_rows = n_steps + 1;
    let n_paths = request.path_count();
    let n_values = n_rows.checked_mul(n_paths).ok_or_else(|| {
        ValidationError::OutOfRange(format!(
            "{} rows x {} paths exceeds addressable memory",
            n_rows, n_paths
        ))
    })?;

    let capital = request.initial_capital();
    let drift = request.daily_drift();
    let vol = request.daily_volatility();

    debug!(
        rows = n_rows,
        paths = n_paths,
        drift_daily = drift,
        vol_daily = vol,
        convention = ?request.drift_convention(),
        seed = ?rng.seed(),
        "simulating GBM paths"
    );

    let mut values = vec![0.0; n_values];
    for path in values.chunks_exact_mut(n_rows) {
        let (anchor, days) = path.split_at_mut(1);
        anchor[0] = capital;

        rng.fill_normal(days);
        let mut level = capital;
        for slot in days.iter_mut() {
            level *= (drift + vol * *slot).exp();
            *slot = level;
        }
    }

    if let Some(bad) = values.iter().find(|v| !(v.is_finite() && **v > 0.0)) {
        return Err(ValidationError::OutOfRange(format!(
            "simulated value {} left the representable range; reduce volatility or horizon",
            bad
        )));
    }

    Ok(PathEnsemble::from_path_major(values, n_rows, n_paths))
}
