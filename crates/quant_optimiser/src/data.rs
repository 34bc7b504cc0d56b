//! Historical market data inputs.
//!
//! - [`PriceTable`]: dated close prices, one column per asset, possibly
//!   with gaps
//! - [`ReturnSeries`]: aligned simple returns with incomplete rows removed
//!
//! Rows are aligned across assets; a row with any missing or non-finite
//! value is dropped as a whole rather than filled.

use chrono::NaiveDate;
use quant_core::types::ValidationError;
use quant_core::validation::ensure_distinct_assets;
use tracing::debug;

/// Dated price history for a set of assets.
///
/// Dates are strictly increasing after construction. A `None` cell means
/// the asset did not trade on that date.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceTable {
    assets: Vec<String>,
    dates: Vec<NaiveDate>,
    prices: Vec<Vec<Option<f64>>>,
}

impl PriceTable {
    /// Builds a table from unordered dated rows.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::TooFewAssets`] / [`ValidationError::DuplicateAsset`]
    ///   for an empty or repeated asset list
    /// - [`ValidationError::ShapeMismatch`] if a row's width differs from
    ///   the asset count
    /// - [`ValidationError::OutOfRange`] for a repeated date
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use quant_optimiser::PriceTable;
    ///
    /// let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
    /// let table = PriceTable::new(
    ///     vec!["A".into(), "B".into()],
    ///     vec![
    ///         (d(3), vec![Some(11.0), Some(20.0)]),
    ///         (d(2), vec![Some(10.0), Some(21.0)]),
    ///     ],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(table.dates()[0], d(2));
    /// let returns = table.to_returns();
    /// assert!((returns.rows()[0][0] - 0.1).abs() < 1e-12);
    /// ```
    pub fn new(
        assets: Vec<String>,
        mut rows: Vec<(NaiveDate, Vec<Option<f64>>)>,
    ) -> Result<Self, ValidationError> {
        ensure_distinct_assets(&assets, 1)?;
        for (_, row) in &rows {
            if row.len() != assets.len() {
                return Err(ValidationError::ShapeMismatch {
                    context: "price row",
                    expected: assets.len(),
                    got: row.len(),
                });
            }
        }

        rows.sort_by_key(|(date, _)| *date);
        if let Some(pair) = rows.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(ValidationError::OutOfRange(format!(
                "duplicate price date {}",
                pair[0].0
            )));
        }

        let (dates, prices): (Vec<NaiveDate>, Vec<Vec<Option<f64>>>) = rows.into_iter().unzip();
        Ok(Self {
            assets,
            dates,
            prices,
        })
    }

    /// Asset identifiers in column order.
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// Observation dates, ascending.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Price rows aligned with [`dates`](Self::dates).
    pub fn prices(&self) -> &[Vec<Option<f64>>] {
        &self.prices
    }

    /// Number of dated rows.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Restricts the table to `assets`, in that order.
    ///
    /// Select before [`to_returns`](Self::to_returns): gaps in columns left
    /// out here no longer drop rows.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::UnknownAsset`] for an identifier not in the table
    /// - [`ValidationError::TooFewAssets`] / [`ValidationError::DuplicateAsset`]
    ///   for an empty or repeated selection
    pub fn select<S: AsRef<str>>(&self, assets: &[S]) -> Result<PriceTable, ValidationError> {
        let selected: Vec<String> = assets.iter().map(|a| a.as_ref().to_string()).collect();
        ensure_distinct_assets(&selected, 1)?;
        let indices = column_indices(&self.assets, &selected)?;

        Ok(Self {
            assets: selected,
            dates: self.dates.clone(),
            prices: self
                .prices
                .iter()
                .map(|r| indices.iter().map(|&i| r[i]).collect())
                .collect(),
        })
    }

    /// Simple returns `p_t / p_{t-1} - 1` between consecutive dates.
    ///
    /// A return is missing when either price is missing, non-finite or not
    /// strictly positive; rows with any missing return are dropped.
    pub fn to_returns(&self) -> ReturnSeries {
        let rows = self
            .prices
            .windows(2)
            .map(|w| {
                w[0].iter()
                    .zip(&w[1])
                    .map(|(prev, cur)| match (prev, cur) {
                        (Some(p), Some(c)) if p.is_finite() && *p > 0.0 && c.is_finite() => {
                            Some(c / p - 1.0)
                        }
                        _ => None,
                    })
                    .collect()
            })
            .collect();

        ReturnSeries::aligned(self.assets.clone(), rows)
    }
}

/// Aligned periodic returns, one column per asset.
///
/// Every stored row is complete and finite.
#[derive(Clone, Debug, PartialEq)]
pub struct ReturnSeries {
    assets: Vec<String>,
    rows: Vec<Vec<f64>>,
    dropped: usize,
}

impl ReturnSeries {
    /// Builds a series from rows with possibly missing values.
    ///
    /// Rows containing `None` or a non-finite value are dropped; the count
    /// is available from [`dropped_rows`](Self::dropped_rows).
    ///
    /// # Errors
    ///
    /// - [`ValidationError::TooFewAssets`] / [`ValidationError::DuplicateAsset`]
    ///   for an empty or repeated asset list
    /// - [`ValidationError::ShapeMismatch`] if a row's width differs from
    ///   the asset count
    pub fn from_rows(
        assets: Vec<String>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Result<Self, ValidationError> {
        ensure_distinct_assets(&assets, 1)?;
        if let Some(row) = rows.iter().find(|r| r.len() != assets.len()) {
            return Err(ValidationError::ShapeMismatch {
                context: "return row",
                expected: assets.len(),
                got: row.len(),
            });
        }
        Ok(Self::aligned(assets, rows))
    }

    /// Builds a series from fully populated rows.
    ///
    /// Non-finite rows are still dropped.
    pub fn from_complete_rows(
        assets: Vec<String>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self, ValidationError> {
        let rows = rows
            .into_iter()
            .map(|r| r.into_iter().map(Some).collect())
            .collect();
        Self::from_rows(assets, rows)
    }

    fn aligned(assets: Vec<String>, rows: Vec<Vec<Option<f64>>>) -> Self {
        let total = rows.len();
        let kept: Vec<Vec<f64>> = rows
            .into_iter()
            .filter_map(|row| {
                row.into_iter()
                    .map(|v| v.filter(|x| x.is_finite()))
                    .collect::<Option<Vec<f64>>>()
            })
            .collect();

        let dropped = total - kept.len();
        if dropped > 0 {
            debug!(dropped, kept = kept.len(), "dropped incomplete return rows");
        }
        Self {
            assets,
            rows: kept,
            dropped,
        }
    }

    /// Asset identifiers in column order.
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// Complete return rows.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Number of complete rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no complete row survived.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows removed for missing or non-finite values.
    pub fn dropped_rows(&self) -> usize {
        self.dropped
    }

    /// Column of returns for one asset.
    pub fn column(&self, asset: &str) -> Option<Vec<f64>> {
        let idx = self.assets.iter().position(|a| a == asset)?;
        Some(self.rows.iter().map(|r| r[idx]).collect())
    }

    /// Restricts the series to `assets`, in that order.
    ///
    /// # Errors
    ///
    /// [`ValidationError::UnknownAsset`] for an identifier not in the series.
    pub fn select<S: AsRef<str>>(&self, assets: &[S]) -> Result<ReturnSeries, ValidationError> {
        let indices = column_indices(&self.assets, assets)?;

        Ok(Self {
            assets: assets.iter().map(|a| a.as_ref().to_string()).collect(),
            rows: self
                .rows
                .iter()
                .map(|r| indices.iter().map(|&i| r[i]).collect())
                .collect(),
            dropped: self.dropped,
        })
    }
}

/// Positions of `wanted` within `known`.
fn column_indices<S: AsRef<str>>(
    known: &[String],
    wanted: &[S],
) -> Result<Vec<usize>, ValidationError> {
    wanted
        .iter()
        .map(|a| {
            let id = a.as_ref();
            known
                .iter()
                .position(|k| k == id)
                .ok_or_else(|| ValidationError::UnknownAsset(id.to_string()))
        })
        .collect()
}
