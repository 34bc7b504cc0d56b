//! Euclidean projection onto the bounded simplex.
//!
//! The feasible set is
//!
//! ```text
//! S = { w : Σ w_i = 1, lo ≤ w_i ≤ hi }
//! ```
//!
//! Its projection has the closed form `w_i = clamp(v_i - τ, lo, hi)` for the
//! unique shift `τ` making the weights sum to one. The clamped sum is
//! continuous and non-increasing in `τ`, so `τ` is found by bisection on the
//! bracket `[min(v) - hi, max(v) - lo]`, where the sum is `n·hi ≥ 1` and
//! `n·lo ≤ 1` respectively.

/// Bisection steps; the bracket shrinks below `f64` resolution well before.
const MAX_BISECTIONS: usize = 200;

/// Projects `v` onto `{ Σ w = 1, lo ≤ w_i ≤ hi }`.
///
/// The bounds must already be feasible for `v.len()` assets
/// (`n·lo ≤ 1 ≤ n·hi`); callers validate them with
/// [`quant_core::validation::ensure_feasible_bounds`].
///
/// # Examples
///
/// ```
/// use quant_optimiser::constraints::project_capped_simplex;
///
/// let w = project_capped_simplex(&[0.9, 0.9, -0.5], 0.05, 0.60);
/// assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
/// assert!((w[0] - 0.475).abs() < 1e-12);
/// assert!((w[2] - 0.05).abs() < 1e-12);
/// ```
pub fn project_capped_simplex(v: &[f64], lo: f64, hi: f64) -> Vec<f64> {
    if v.is_empty() {
        return Vec::new();
    }

    let clamped_sum = |tau: f64| -> f64 { v.iter().map(|x| (x - tau).clamp(lo, hi)).sum() };

    let v_min = v.iter().copied().fold(f64::INFINITY, f64::min);
    let v_max = v.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut a = v_min - hi;
    let mut b = v_max - lo;

    for _ in 0..MAX_BISECTIONS {
        let mid = 0.5 * (a + b);
        if mid <= a || mid >= b {
            break;
        }
        if clamped_sum(mid) > 1.0 {
            a = mid;
        } else {
            b = mid;
        }
    }

    let tau = 0.5 * (a + b);
    let mut w: Vec<f64> = v.iter().map(|x| (x - tau).clamp(lo, hi)).collect();

    // Spread the rounding residual over coordinates strictly inside the box
    let residual = 1.0 - w.iter().sum::<f64>();
    let free: Vec<usize> = (0..w.len()).filter(|&i| w[i] > lo && w[i] < hi).collect();
    if !free.is_empty() {
        let share = residual / free.len() as f64;
        for i in free {
            w[i] = (w[i] + share).clamp(lo, hi);
        }
    }
    w
}

/// Largest violation of the feasible set by `w`: the sum error or the
/// worst bound excess, whichever is greater.
pub fn constraint_violation(w: &[f64], lo: f64, hi: f64) -> f64 {
    let sum_err = (w.iter().sum::<f64>() - 1.0).abs();
    w.iter()
        .map(|&x| (lo - x).max(x - hi).max(0.0))
        .fold(sum_err, f64::max)
}
