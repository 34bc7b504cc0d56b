//! Sample statistics.
//!
//! Observations are supplied row-major: one row per period, one column per
//! asset. Covariances use the unbiased `n - 1` denominator.

use num_traits::Float;

use crate::types::DataInsufficientError;

/// Arithmetic mean. Returns `None` for an empty slice.
///
/// # Examples
///
/// ```
/// use quant_core::math::stats::mean;
///
/// assert_eq!(mean(&[1.0_f64, 2.0, 3.0]), Some(2.0));
/// assert_eq!(mean::<f64>(&[]), None);
/// ```
pub fn mean<T: Float>(values: &[T]) -> Option<T> {
    if values.is_empty() {
        return None;
    }
    let n = T::from(values.len())?;
    let sum = values.iter().fold(T::zero(), |acc, &x| acc + x);
    Some(sum / n)
}

/// Percentile with linear interpolation between closest ranks.
///
/// `q` is in percent (`0..=100`). Matches the default interpolation used by
/// common array libraries: the rank is `q/100 * (n - 1)`.
///
/// Returns `None` for an empty slice or `q` outside `[0, 100]`.
///
/// # Examples
///
/// ```
/// use quant_core::math::stats::percentile;
///
/// let v = [10.0_f64, 20.0, 30.0, 40.0];
/// assert_eq!(percentile(&v, 0.0), Some(10.0));
/// assert_eq!(percentile(&v, 100.0), Some(40.0));
/// assert!((percentile(&v, 50.0).unwrap() - 25.0).abs() < 1e-12);
/// ```
pub fn percentile<T: Float>(values: &[T], q: T) -> Option<T> {
    let hundred = T::from(100.0)?;
    if values.is_empty() || !(q >= T::zero() && q <= hundred) {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Some(percentile_sorted(&sorted, q / hundred))
}

/// Linear-interpolated quantile of an already sorted, non-empty slice.
///
/// `p` is a fraction in `[0, 1]`.
pub fn percentile_sorted<T: Float>(sorted: &[T], p: T) -> T {
    debug_assert!(!sorted.is_empty());
    let last = sorted.len() - 1;
    let rank = p * T::from(last).unwrap_or_else(T::zero);
    let lower = rank.floor().to_usize().unwrap_or(0).min(last);
    let upper = (lower + 1).min(last);
    let frac = rank - T::from(lower).unwrap_or_else(T::zero);
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Per-column sample means of row-major observations.
pub fn column_means(rows: &[Vec<f64>], n_cols: usize) -> Vec<f64> {
    let mut sums = vec![0.0; n_cols];
    for row in rows {
        for (s, x) in sums.iter_mut().zip(row) {
            *s += x;
        }
    }
    let n = rows.len().max(1) as f64;
    sums.into_iter().map(|s| s / n).collect()
}

/// Sample covariance matrix of row-major observations.
///
/// # Errors
///
/// [`DataInsufficientError::TooFewObservations`] with fewer than two rows.
///
/// # Examples
///
/// ```
/// use quant_core::math::stats::sample_covariance;
///
/// let rows = vec![vec![1.0, 2.0], vec![3.0, 2.0], vec![5.0, 2.0]];
/// let cov = sample_covariance(&rows, 2).unwrap();
/// assert!((cov[0][0] - 4.0).abs() < 1e-12);
/// assert_eq!(cov[1][1], 0.0);
/// ```
pub fn sample_covariance(
    rows: &[Vec<f64>],
    n_cols: usize,
) -> Result<Vec<Vec<f64>>, DataInsufficientError> {
    if rows.len() < 2 {
        return Err(DataInsufficientError::TooFewObservations {
            got: rows.len(),
            need: 2,
        });
    }

    let means = column_means(rows, n_cols);
    let mut cov = vec![vec![0.0; n_cols]; n_cols];
    for row in rows {
        let centred: Vec<f64> = row.iter().zip(&means).map(|(x, m)| x - m).collect();
        for i in 0..n_cols {
            for j in i..n_cols {
                cov[i][j] += centred[i] * centred[j];
            }
        }
    }

    let denom = (rows.len() - 1) as f64;
    for i in 0..n_cols {
        for j in i..n_cols {
            cov[i][j] /= denom;
            cov[j][i] = cov[i][j];
        }
    }
    Ok(cov)
}
