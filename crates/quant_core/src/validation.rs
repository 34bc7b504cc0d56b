//! Shared parameter checks.
//!
//! Every entry point validates its request with these helpers before any
//! numerical work starts, so both components reject bad input with the same
//! [`ValidationError`] variants.

use std::collections::HashSet;

use crate::types::ValidationError;

/// Slack allowed when checking `n * min <= 1 <= n * max`.
const FEASIBILITY_SLACK: f64 = 1e-12;

/// Rejects NaN and infinite values.
///
/// # Examples
///
/// ```
/// use quant_core::validation::ensure_finite;
///
/// assert!(ensure_finite("annual_return", -0.2).is_ok());
/// assert!(ensure_finite("annual_return", f64::NAN).is_err());
/// ```
#[inline]
pub fn ensure_finite(name: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NonFinite { name, value })
    }
}

/// Requires a finite, strictly positive value.
#[inline]
pub fn ensure_positive(name: &'static str, value: f64) -> Result<f64, ValidationError> {
    ensure_finite(name, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::NonPositive { name, value })
    }
}

/// Requires a finite, non-negative value.
#[inline]
pub fn ensure_non_negative(name: &'static str, value: f64) -> Result<f64, ValidationError> {
    ensure_finite(name, value)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::Negative { name, value })
    }
}

/// Requires a non-zero count.
#[inline]
pub fn ensure_positive_count(name: &'static str, value: usize) -> Result<usize, ValidationError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(ValidationError::NonPositive { name, value: 0.0 })
    }
}

/// Requires at least `need` distinct identifiers.
///
/// # Examples
///
/// ```
/// use quant_core::validation::ensure_distinct_assets;
///
/// let assets = vec!["A".to_string(), "B".to_string()];
/// assert!(ensure_distinct_assets(&assets, 2).is_ok());
///
/// let dup = vec!["A".to_string(), "A".to_string()];
/// assert!(ensure_distinct_assets(&dup, 2).is_err());
/// ```
pub fn ensure_distinct_assets<S: AsRef<str>>(
    assets: &[S],
    need: usize,
) -> Result<(), ValidationError> {
    if assets.len() < need {
        return Err(ValidationError::TooFewAssets {
            got: assets.len(),
            need,
        });
    }

    let mut seen = HashSet::with_capacity(assets.len());
    for asset in assets {
        let id = asset.as_ref();
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateAsset(id.to_string()));
        }
    }
    Ok(())
}

/// Checks per-asset weight bounds for `n_assets` fully invested assets.
///
/// Requires `0 <= min < max <= 1` and `n * min <= 1 <= n * max`.
///
/// # Examples
///
/// ```
/// use quant_core::validation::ensure_feasible_bounds;
///
/// assert!(ensure_feasible_bounds(0.05, 0.40, 5).is_ok());
/// // Five assets capped at 10% cannot be fully invested
/// assert!(ensure_feasible_bounds(0.0, 0.10, 5).is_err());
/// ```
pub fn ensure_feasible_bounds(min: f64, max: f64, n_assets: usize) -> Result<(), ValidationError> {
    if !min.is_finite() || !max.is_finite() || min < 0.0 || max > 1.0 || min >= max {
        return Err(ValidationError::InvalidBounds { min, max });
    }

    let n = n_assets as f64;
    if n * min > 1.0 + FEASIBILITY_SLACK || n * max < 1.0 - FEASIBILITY_SLACK {
        return Err(ValidationError::InfeasibleBounds {
            min,
            max,
            assets: n_assets,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_positive() {
        assert_eq!(ensure_positive("x", 1.5), Ok(1.5));
        assert_eq!(
            ensure_positive("x", 0.0),
            Err(ValidationError::NonPositive {
                name: "x",
                value: 0.0
            })
        );
        assert!(matches!(
            ensure_positive("x", f64::INFINITY),
            Err(ValidationError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_ensure_non_negative() {
        assert!(ensure_non_negative("vol", 0.0).is_ok());
        assert!(matches!(
            ensure_non_negative("vol", -0.01),
            Err(ValidationError::Negative { name: "vol", .. })
        ));
    }

    #[test]
    fn test_ensure_positive_count() {
        assert_eq!(ensure_positive_count("paths", 1), Ok(1));
        assert!(ensure_positive_count("paths", 0).is_err());
    }

    #[test]
    fn test_too_few_assets() {
        let assets = vec!["A"];
        assert_eq!(
            ensure_distinct_assets(&assets, 2),
            Err(ValidationError::TooFewAssets { got: 1, need: 2 })
        );
    }

    #[test]
    fn test_bounds_ordering() {
        assert!(matches!(
            ensure_feasible_bounds(0.4, 0.4, 3),
            Err(ValidationError::InvalidBounds { .. })
        ));
        assert!(matches!(
            ensure_feasible_bounds(-0.1, 0.4, 3),
            Err(ValidationError::InvalidBounds { .. })
        ));
        assert!(matches!(
            ensure_feasible_bounds(0.1, 1.1, 3),
            Err(ValidationError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn test_bounds_feasibility() {
        // Floor too high: 3 * 0.4 > 1
        assert!(matches!(
            ensure_feasible_bounds(0.4, 0.9, 3),
            Err(ValidationError::InfeasibleBounds { .. })
        ));
        // Exactly tight bounds are feasible
        assert!(ensure_feasible_bounds(0.25, 0.5, 4).is_ok());
        assert!(ensure_feasible_bounds(0.0, 0.5, 2).is_ok());
    }
}
