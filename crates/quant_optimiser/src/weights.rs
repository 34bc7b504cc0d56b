//! Portfolio weight vectors.

use std::fmt;

use quant_core::types::ValidationError;
use quant_core::validation::ensure_distinct_assets;

/// Ordered mapping from asset identifier to weight.
///
/// Order follows the request; lookups are linear, asset counts are small.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WeightVector {
    entries: Vec<(String, f64)>,
}

impl WeightVector {
    /// Pairs `assets` with `weights` position by position.
    ///
    /// # Errors
    ///
    /// [`ValidationError::ShapeMismatch`] when the lengths differ,
    /// [`ValidationError::DuplicateAsset`] for a repeated identifier.
    pub fn new(assets: &[String], weights: &[f64]) -> Result<Self, ValidationError> {
        if assets.len() != weights.len() {
            return Err(ValidationError::ShapeMismatch {
                context: "weight vector",
                expected: assets.len(),
                got: weights.len(),
            });
        }
        ensure_distinct_assets(assets, 1)?;
        Ok(Self {
            entries: assets.iter().cloned().zip(weights.iter().copied()).collect(),
        })
    }

    /// `1/n` on every asset.
    ///
    /// The usual fallback when optimisation fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use quant_optimiser::WeightVector;
    ///
    /// let w = WeightVector::equal(&["A".to_string(), "B".to_string()]).unwrap();
    /// assert_eq!(w.get("A"), Some(0.5));
    /// ```
    pub fn equal(assets: &[String]) -> Result<Self, ValidationError> {
        ensure_distinct_assets(assets, 1)?;
        let w = 1.0 / assets.len() as f64;
        Ok(Self {
            entries: assets.iter().map(|a| (a.clone(), w)).collect(),
        })
    }

    /// Weight of `asset`, if present.
    pub fn get(&self, asset: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(id, _)| id == asset)
            .map(|(_, w)| *w)
    }

    /// `(asset, weight)` pairs in request order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries.iter().map(|(id, w)| (id.as_str(), *w))
    }

    /// Weights in request order.
    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, w)| *w).collect()
    }

    /// Asset identifiers in request order.
    pub fn assets(&self) -> Vec<&str> {
        self.entries.iter().map(|(id, _)| id.as_str()).collect()
    }

    /// Number of assets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the vector has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all weights.
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w).sum()
    }
}

impl fmt::Display for WeightVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (id, w)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {:.2}%", id, w * 100.0)?;
        }
        Ok(())
    }
}
