//! Simulated trajectory grid and terminal-value summaries.
//!
//! # Memory Layout
//!
//! Values are stored path-major: `values[path * n_rows + day]`, where
//! `day = 0` holds the initial capital. Each trajectory is therefore a
//! contiguous slice, and the logical grid has shape `(n_rows, n_paths)`
//! with one column per path.

use quant_core::math::stats::{mean, percentile, percentile_sorted};

/// Ensemble of simulated portfolio-value trajectories.
///
/// Logical shape is `(horizon_years * 252 + 1) × path_count`. Row 0 equals
/// the initial capital on every path and every value is strictly positive.
#[derive(Clone, Debug, PartialEq)]
pub struct PathEnsemble {
    values: Vec<f64>,
    n_rows: usize,
    n_paths: usize,
}

impl PathEnsemble {
    /// Wraps path-major values produced by the simulator.
    pub(crate) fn from_path_major(values: Vec<f64>, n_rows: usize, n_paths: usize) -> Self {
        debug_assert_eq!(values.len(), n_rows * n_paths);
        Self {
            values,
            n_rows,
            n_paths,
        }
    }

    /// Number of rows (trading days plus the anchor row).
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of paths (columns).
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    /// `(rows, paths)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_paths)
    }

    /// Value on `day` of trajectory `path`, if in range.
    #[inline]
    pub fn value(&self, day: usize, path: usize) -> Option<f64> {
        if day < self.n_rows && path < self.n_paths {
            Some(self.values[path * self.n_rows + day])
        } else {
            None
        }
    }

    /// Full trajectory of one path, if in range.
    #[inline]
    pub fn path(&self, path: usize) -> Option<&[f64]> {
        if path < self.n_paths {
            let start = path * self.n_rows;
            Some(&self.values[start..start + self.n_rows])
        } else {
            None
        }
    }

    /// Iterates over all trajectories.
    pub fn paths(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.values.chunks_exact(self.n_rows)
    }

    /// Values of every path on `day`, if in range.
    pub fn row(&self, day: usize) -> Option<Vec<f64>> {
        if day < self.n_rows {
            Some(self.paths().map(|p| p[day]).collect())
        } else {
            None
        }
    }

    /// Values of every path on the last simulated day.
    pub fn terminal_values(&self) -> Vec<f64> {
        self.paths().map(|p| p[self.n_rows - 1]).collect()
    }

    /// The first `k` trajectories (fewer if the ensemble is smaller).
    pub fn sample_paths(&self, k: usize) -> Vec<&[f64]> {
        self.paths().take(k).collect()
    }

    /// Terminal-value percentile (`q` in percent), `None` if `q` is out of
    /// `[0, 100]`.
    pub fn terminal_percentile(&self, q: f64) -> Option<f64> {
        percentile(&self.terminal_values(), q)
    }

    /// Summary statistics of the terminal values, `None` for an ensemble
    /// without paths.
    pub fn summary(&self) -> Option<ProjectionSummary> {
        ProjectionSummary::from_terminal_values(&self.terminal_values())
    }

    /// Row-major copy of the grid, one inner `Vec` per day.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.n_rows)
            .map(|day| self.paths().map(|p| p[day]).collect())
            .collect()
    }
}

/// Distribution of terminal portfolio values.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ProjectionSummary {
    /// Pessimistic scenario (10th percentile).
    pub p10: f64,
    /// Median scenario.
    pub p50: f64,
    /// Optimistic scenario (90th percentile).
    pub p90: f64,
    /// Mean terminal value.
    pub mean: f64,
    /// Smallest terminal value.
    pub min: f64,
    /// Largest terminal value.
    pub max: f64,
}

impl ProjectionSummary {
    /// Summarises a set of terminal values, `None` if `values` is empty.
    pub fn from_terminal_values(values: &[f64]) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let (&min, &max) = (sorted.first()?, sorted.last()?);

        Some(Self {
            p10: percentile_sorted(&sorted, 0.10),
            p50: percentile_sorted(&sorted, 0.50),
            p90: percentile_sorted(&sorted, 0.90),
            mean: mean(&sorted)?,
            min,
            max,
        })
    }
}
