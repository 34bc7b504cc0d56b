//! Dense linear algebra for small symmetric systems.
//!
//! # Cholesky Factorisation
//!
//! A symmetric matrix `A` is positive definite iff it admits `A = L Lᵀ` with
//! a lower-triangular `L` whose diagonal is strictly positive. The engine
//! uses the factorisation as its positive-definiteness test for covariance
//! matrices before they reach the solver.

use crate::types::DataInsufficientError;

/// Smallest pivot (relative to the largest diagonal entry) accepted as
/// positive in [`cholesky`].
const RELATIVE_PIVOT_FLOOR: f64 = 1e-14;

/// Dot product of two equal-length slices.
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Matrix-vector product `M v`.
#[inline]
pub fn mat_vec(m: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    m.iter().map(|row| dot(row, v)).collect()
}

/// Quadratic form `vᵀ M v`.
#[inline]
pub fn quadratic_form(m: &[Vec<f64>], v: &[f64]) -> f64 {
    dot(v, &mat_vec(m, v))
}

/// Scales every entry of a matrix in place.
pub fn scale_matrix(m: &mut [Vec<f64>], factor: f64) {
    m.iter_mut()
        .flat_map(|row| row.iter_mut())
        .for_each(|x| *x *= factor);
}

/// Cholesky factorisation `A = L Lᵀ`.
///
/// Returns the lower-triangular factor, or
/// [`DataInsufficientError::NotPositiveDefinite`] naming the first pivot
/// that is not safely positive.
///
/// # Examples
///
/// ```
/// use quant_core::math::linalg::cholesky;
///
/// let a = vec![vec![4.0, 2.0], vec![2.0, 3.0]];
/// let l = cholesky(&a).unwrap();
/// assert!((l[0][0] - 2.0).abs() < 1e-12);
/// assert!((l[1][0] - 1.0).abs() < 1e-12);
///
/// let singular = vec![vec![1.0, 1.0], vec![1.0, 1.0]];
/// assert!(cholesky(&singular).is_err());
/// ```
pub fn cholesky(a: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, DataInsufficientError> {
    let n = a.len();
    if a.iter().any(|row| row.len() != n) {
        return Err(DataInsufficientError::DegenerateSeries(
            "covariance matrix is not square".to_string(),
        ));
    }

    let scale = (0..n).map(|i| a[i][i].abs()).fold(0.0_f64, f64::max);
    let floor = RELATIVE_PIVOT_FLOOR * scale.max(f64::MIN_POSITIVE);

    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if !sum.is_finite() || sum <= floor {
                    return Err(DataInsufficientError::NotPositiveDefinite {
                        pivot: i,
                        value: sum,
                    });
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    Ok(l)
}
