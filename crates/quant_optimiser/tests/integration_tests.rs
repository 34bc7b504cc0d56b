//! Integration tests for Sharpe-ratio allocation.
//!
//! These tests run the full flow from historical data through moment
//! estimation to constrained optimisation.

use approx::assert_relative_eq;
use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use quant_core::types::DataInsufficientError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use quant_optimiser::{
    max_sharpe_weights, optimise, optimise_moments, optimise_with, portfolio_performance,
    MomentEstimate, OptimisationRequest, OptimiserConfig, OptimiserError, PriceTable,
    ReturnSeries, SolverConfig, WeightBounds, WeightVector,
};

fn ids(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Two uncorrelated assets with equal volatility (20% p.a.) and expected
/// returns of 20% and 5% p.a.
///
/// Zero-mean shock patterns `[1, -1, 1, -1]` and `[1, 1, -1, -1]` are
/// orthogonal, so the sample correlation is exactly zero.
fn dominant_pair() -> ReturnSeries {
    let blocks = 63;
    let n = 4 * blocks;
    let scale = (0.04 * (n - 1) as f64 / (n as f64 * 252.0)).sqrt();

    let a = [1.0, -1.0, 1.0, -1.0];
    let b = [1.0, 1.0, -1.0, -1.0];
    let rows = (0..n)
        .map(|t| vec![0.20 / 252.0 + scale * a[t % 4], 0.05 / 252.0 + scale * b[t % 4]])
        .collect();

    ReturnSeries::from_complete_rows(ids(&["A", "B"]), rows).unwrap()
}

/// Deterministic, weakly correlated daily returns for `n_assets` assets.
fn synthetic_returns(n_assets: usize, n_days: usize) -> Vec<Vec<f64>> {
    (0..n_days)
        .map(|t| {
            (0..n_assets)
                .map(|i| {
                    let k = (i + 1) as f64;
                    0.0004 * k + 0.01 * ((t as f64) * (0.3 + 0.45 * k) + k).sin()
                })
                .collect()
        })
        .collect()
}

/// Daily returns driven by one market factor plus idiosyncratic noise.
fn factor_panel(rng: &mut StdRng, n_assets: usize, n_days: usize) -> Vec<Vec<f64>> {
    let means: Vec<f64> = (0..n_assets).map(|_| rng.gen_range(-0.0005..0.0015)).collect();
    let noise: Vec<Normal<f64>> = (0..n_assets)
        .map(|_| Normal::new(0.0, rng.gen_range(0.01..0.03)).unwrap())
        .collect();
    let market = Normal::new(0.0, 0.01).unwrap();

    (0..n_days)
        .map(|_| {
            let m = market.sample(rng);
            means
                .iter()
                .zip(&noise)
                .map(|(mu, eps)| mu + 0.7 * m + eps.sample(rng))
                .collect()
        })
        .collect()
}

fn two_asset_bounds() -> WeightBounds {
    WeightBounds::new(0.05, 0.95).unwrap()
}

// ============================================================================
// End-to-End Allocation
// ============================================================================

#[test]
fn test_dominant_asset_gets_majority_weight() {
    let series = dominant_pair();
    let request = OptimisationRequest::new(
        ["A", "B"],
        &series,
        0.02,
        WeightBounds::new(0.05, 0.95).unwrap(),
    )
    .unwrap();

    let portfolio = optimise(&request).unwrap();
    let w_a = portfolio.weights.get("A").unwrap();
    let w_b = portfolio.weights.get("B").unwrap();

    // Tangency weights are proportional to excess returns: 0.18 : 0.03
    assert!(w_a > 0.5);
    assert_relative_eq!(w_a, 0.18 / 0.21, epsilon = 1e-4);
    assert_relative_eq!(w_a + w_b, 1.0, epsilon = 1e-6);
    assert_relative_eq!(portfolio.expected_return, 0.20 * w_a + 0.05 * w_b, epsilon = 1e-6);
}

#[test]
fn test_dominant_asset_at_upper_bound() {
    // Excess returns 0.15 : 0.00, so the unconstrained tangency is all A
    let series = dominant_pair();
    let request =
        OptimisationRequest::new(["A", "B"], &series, 0.05, two_asset_bounds()).unwrap();

    let portfolio = optimise(&request).unwrap();

    assert_relative_eq!(portfolio.weights.get("A").unwrap(), 0.95, epsilon = 1e-6);
    assert_relative_eq!(portfolio.weights.get("B").unwrap(), 0.05, epsilon = 1e-6);
    assert!(portfolio.sharpe_ratio > 0.0);
}

#[test]
fn test_dominant_asset_respects_cap() {
    let series = dominant_pair();
    let weights = max_sharpe_weights(
        &["A", "B"],
        &series,
        0.02,
        WeightBounds::new(0.05, 0.70).unwrap(),
    )
    .unwrap();

    assert_relative_eq!(weights.get("A").unwrap(), 0.70, epsilon = 1e-6);
    assert_relative_eq!(weights.get("B").unwrap(), 0.30, epsilon = 1e-6);
}

#[test]
fn test_price_table_to_allocation() {
    let assets = ids(&["FI", "RE", "EQ", "INTL", "CRYPTO"]);
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();

    let mut level = vec![100.0; assets.len()];
    let mut rows = vec![(start, level.iter().map(|&p| Some(p)).collect::<Vec<_>>())];
    for (t, r) in synthetic_returns(assets.len(), 400).into_iter().enumerate() {
        for (p, x) in level.iter_mut().zip(&r) {
            *p *= 1.0 + x;
        }
        let mut row: Vec<Option<f64>> = level.iter().map(|&p| Some(p)).collect();
        if t % 50 == 7 {
            row[2] = None;
        }
        rows.push((start + Duration::days(t as i64 + 1), row));
    }

    let table = PriceTable::new(assets.clone(), rows).unwrap();
    let series = table.to_returns();
    assert!(series.dropped_rows() > 0);

    let request = OptimisationRequest::new(
        assets.clone(),
        &series,
        0.1175,
        WeightBounds::default(),
    )
    .unwrap();
    let portfolio = optimise(&request).unwrap();

    assert_eq!(portfolio.weights.assets(), vec!["FI", "RE", "EQ", "INTL", "CRYPTO"]);
    assert_relative_eq!(portfolio.weights.total(), 1.0, epsilon = 1e-6);
    for (_, w) in portfolio.weights.iter() {
        assert!((0.05 - 1e-9..=0.40 + 1e-9).contains(&w));
    }
}

#[test]
fn test_converges_on_random_factor_panels() {
    let mut rng = StdRng::seed_from_u64(20_240_601);

    for n in (2..=10).flat_map(|n| [n, n, n]) {
        let names: Vec<String> = (0..n).map(|i| format!("A{}", i)).collect();
        let series =
            ReturnSeries::from_complete_rows(names.clone(), factor_panel(&mut rng, n, 500)).unwrap();
        let bounds = if n == 2 {
            two_asset_bounds()
        } else {
            WeightBounds::default()
        };
        let moments = MomentEstimate::from_returns(&series, 252.0).unwrap();
        let equal = vec![1.0 / n as f64; n];

        for rf in [0.0, 0.1175, 0.5] {
            let request = OptimisationRequest::new(names.clone(), &series, rf, bounds).unwrap();
            let portfolio = optimise(&request)
                .unwrap_or_else(|e| panic!("{} assets, rf {}: {:?}", n, rf, e));

            assert_relative_eq!(portfolio.weights.total(), 1.0, epsilon = 1e-6);
            for (_, w) in portfolio.weights.iter() {
                assert!(w >= bounds.min() - 1e-9 && w <= bounds.max() + 1e-9);
            }
            let baseline = portfolio_performance(&equal, &moments, rf);
            assert!(portfolio.sharpe_ratio >= baseline.sharpe_ratio - 1e-9);
        }
    }
}

#[test]
fn test_missing_rows_do_not_change_result() {
    let clean = synthetic_returns(3, 120);
    let mut gappy: Vec<Vec<Option<f64>>> = clean
        .iter()
        .map(|r| r.iter().map(|&x| Some(x)).collect())
        .collect();
    gappy.insert(10, vec![Some(0.5), None, Some(0.1)]);
    gappy.insert(50, vec![None, None, None]);

    let a = ReturnSeries::from_complete_rows(ids(&["X", "Y", "Z"]), clean).unwrap();
    let b = ReturnSeries::from_rows(ids(&["X", "Y", "Z"]), gappy).unwrap();
    assert_eq!(b.dropped_rows(), 2);

    let bounds = WeightBounds::new(0.0, 1.0).unwrap();
    let wa = max_sharpe_weights(&["X", "Y", "Z"], &a, 0.01, bounds).unwrap();
    let wb = max_sharpe_weights(&["X", "Y", "Z"], &b, 0.01, bounds).unwrap();
    assert_eq!(wa, wb);
}

// ============================================================================
// Failure Modes
// ============================================================================

#[test]
fn test_single_row_is_data_insufficient() {
    let series =
        ReturnSeries::from_rows(ids(&["A", "B"]), vec![vec![Some(0.01), Some(0.02)], vec![None, Some(0.0)]])
            .unwrap();
    let request =
        OptimisationRequest::new(["A", "B"], &series, 0.02, two_asset_bounds()).unwrap();

    let err = optimise(&request).unwrap_err();
    assert_eq!(
        err,
        OptimiserError::DataInsufficient(DataInsufficientError::TooFewObservations {
            got: 1,
            need: 2
        })
    );
    assert!(!err.is_recoverable());
}

#[test]
fn test_collinear_assets_rejected() {
    let base = synthetic_returns(1, 60);
    let rows = base.iter().map(|r| vec![r[0], 3.0 * r[0]]).collect();
    let series = ReturnSeries::from_complete_rows(ids(&["A", "B"]), rows).unwrap();
    let request =
        OptimisationRequest::new(["A", "B"], &series, 0.02, two_asset_bounds()).unwrap();

    assert!(matches!(
        optimise(&request),
        Err(OptimiserError::DataInsufficient(
            DataInsufficientError::NotPositiveDefinite { .. }
        ))
    ));
}

#[test]
fn test_non_convergence_allows_equal_weight_fallback() {
    let series = ReturnSeries::from_complete_rows(ids(&["A", "B", "C"]), synthetic_returns(3, 200))
        .unwrap();
    let request = OptimisationRequest::new(
        ["A", "B", "C"],
        &series,
        0.02,
        WeightBounds::new(0.0, 1.0).unwrap(),
    )
    .unwrap();

    let config = OptimiserConfig::with_solver(SolverConfig::new(1e-14, 1));
    let err = optimise_with(&request, &config).unwrap_err();
    assert!(err.is_recoverable());

    let fallback = WeightVector::equal(request.assets()).unwrap();
    assert_relative_eq!(fallback.total(), 1.0, epsilon = 1e-12);
}

#[test]
fn test_custom_periods_per_year() {
    let series = dominant_pair();
    let request = OptimisationRequest::new(
        ["A", "B"],
        &series,
        0.0,
        WeightBounds::new(0.05, 0.95).unwrap(),
    )
    .unwrap();
    let config = OptimiserConfig {
        periods_per_year: 12.0,
        ..OptimiserConfig::default()
    };

    // With a zero risk-free rate the annualisation factor only rescales the
    // Sharpe ratio, so the argmax is unchanged
    let monthly = optimise_with(&request, &config).unwrap();
    let daily = optimise(&request).unwrap();
    assert_relative_eq!(
        monthly.weights.get("A").unwrap(),
        daily.weights.get("A").unwrap(),
        epsilon = 1e-4
    );
}

// ============================================================================
// Property-Based Invariants
// ============================================================================

fn covariance_from_factors(f: &[f64], n: usize) -> Vec<Vec<f64>> {
    (0..n)
        .map(|i| {
            (0..n)
                .map(|j| {
                    let cross: f64 = (0..n).map(|k| f[i * n + k] * f[j * n + k]).sum();
                    cross + if i == j { 0.01 } else { 0.0 }
                })
                .collect()
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_weights_feasible_and_no_worse_than_equal(
        factors in proptest::collection::vec(-0.3_f64..0.3, 16),
        mu in proptest::collection::vec(-0.05_f64..0.30, 4),
        rf in 0.0_f64..0.12,
        lo_frac in 0.0_f64..0.9,
        hi_frac in 0.1_f64..1.0,
    ) {
        let n = 4;
        let lo = lo_frac / n as f64;
        let hi = 1.0 / n as f64 + hi_frac * (1.0 - 1.0 / n as f64);
        let moments = MomentEstimate::new(mu, covariance_from_factors(&factors, n)).unwrap();
        let bounds = WeightBounds::new(lo, hi).unwrap();
        let assets = ids(&["A", "B", "C", "D"]);

        let portfolio = optimise_moments(&assets, &moments, rf, bounds, &SolverConfig::default())
            .map_err(|e| TestCaseError::fail(format!("optimisation failed: {:?}", e)))?;

        prop_assert!((portfolio.weights.total() - 1.0).abs() < 1e-6);
        for (_, w) in portfolio.weights.iter() {
            prop_assert!(w >= lo - 1e-9 && w <= hi + 1e-9);
        }
        let equal = portfolio_performance(&[0.25; 4], &moments, rf);
        prop_assert!(portfolio.sharpe_ratio >= equal.sharpe_ratio - 1e-9);
    }
}
