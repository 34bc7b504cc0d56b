//! Optimise command implementation
//!
//! Loads a price history, estimates annualised moments and prints the
//! maximum-Sharpe allocation.

use std::io::Write;
use std::path::PathBuf;

use quant_optimiser::{
    optimise_with, portfolio_performance, MomentEstimate, OptimisationRequest, OptimiserConfig,
    OptimiserError, PriceTable, ReturnSeries, WeightBounds, WeightVector,
};
use serde::Serialize;
use tracing::{info, warn};

use super::OutputFormat;
use crate::config::CliConfig;
use crate::prices::load_price_table;
use crate::Result;

/// Options of `quant optimise`
#[derive(Debug, Clone)]
pub struct OptimiseOptions {
    pub prices: PathBuf,
    pub assets: Option<Vec<String>>,
    pub risk_free: Option<f64>,
    pub min_weight: Option<f64>,
    pub max_weight: Option<f64>,
    pub fallback_equal: bool,
    pub format: String,
}

/// How the reported weights were obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Method {
    MaxSharpe,
    EqualWeightFallback,
}

#[derive(Debug, Serialize)]
struct AllocationRow {
    asset: String,
    weight: f64,
}

/// Serialisable allocation report
#[derive(Debug, Serialize)]
struct AllocationReport {
    method: Method,
    risk_free_rate: f64,
    min_weight: f64,
    max_weight: f64,
    observations: usize,
    dropped_rows: usize,
    expected_return: f64,
    volatility: f64,
    sharpe_ratio: f64,
    weights: Vec<AllocationRow>,
}

/// Run the optimise command
pub fn run(config: &CliConfig, opts: &OptimiseOptions) -> Result<()> {
    let format: OutputFormat = opts.format.parse()?;

    info!("Loading prices from {}", opts.prices.display());
    let table = load_price_table(&opts.prices)?;
    let (assets, returns) = returns_for(&table, opts.assets.as_deref())?;
    info!(
        "  {} assets, {} complete return rows ({} dropped)",
        assets.len(),
        returns.len(),
        returns.dropped_rows()
    );

    let bounds = WeightBounds::new(
        opts.min_weight.unwrap_or(config.min_weight),
        opts.max_weight.unwrap_or(config.max_weight),
    )?;
    let risk_free = opts.risk_free.unwrap_or(config.risk_free_rate);
    let request = OptimisationRequest::new(assets, &returns, risk_free, bounds)?;

    let optimiser = OptimiserConfig {
        periods_per_year: config.periods_per_year,
        ..OptimiserConfig::default()
    };
    let report = allocate(&request, &optimiser, opts.fallback_equal)?;

    let stdout = std::io::stdout();
    render(&report, format, &mut stdout.lock())?;

    info!("Optimisation complete");
    Ok(())
}

/// Returns of the requested columns, or of every column
///
/// Columns are selected on the price table so that gaps in assets left out
/// of the request do not drop rows.
fn returns_for(
    table: &PriceTable,
    assets: Option<&[String]>,
) -> Result<(Vec<String>, ReturnSeries)> {
    match assets {
        Some(assets) => Ok((assets.to_vec(), table.select(assets)?.to_returns())),
        None => Ok((table.assets().to_vec(), table.to_returns())),
    }
}

/// Solve the request, falling back to equal weights when allowed
fn allocate(
    request: &OptimisationRequest,
    config: &OptimiserConfig,
    fallback_equal: bool,
) -> Result<AllocationReport> {
    let bounds = request.bounds();

    let (method, weights, performance) = match optimise_with(request, config) {
        Ok(portfolio) => {
            info!("  Converged after {} iterations", portfolio.iterations);
            let performance = (
                portfolio.expected_return,
                portfolio.volatility,
                portfolio.sharpe_ratio,
            );
            (Method::MaxSharpe, portfolio.weights, performance)
        }
        Err(OptimiserError::OptimisationFailed(failure)) if fallback_equal => {
            warn!("Optimisation failed ({}); using equal weights", failure);
            let weights = WeightVector::equal(request.assets())?;
            let moments = MomentEstimate::from_returns(request.returns(), config.periods_per_year)?;
            let perf = portfolio_performance(&weights.values(), &moments, request.risk_free_rate());
            (
                Method::EqualWeightFallback,
                weights,
                (perf.expected_return, perf.volatility, perf.sharpe_ratio),
            )
        }
        Err(e) => return Err(e.into()),
    };

    let (expected_return, volatility, sharpe_ratio) = performance;
    Ok(AllocationReport {
        method,
        risk_free_rate: request.risk_free_rate(),
        min_weight: bounds.min(),
        max_weight: bounds.max(),
        observations: request.returns().len(),
        dropped_rows: request.returns().dropped_rows(),
        expected_return,
        volatility,
        sharpe_ratio,
        weights: weights
            .iter()
            .map(|(asset, weight)| AllocationRow {
                asset: asset.to_string(),
                weight,
            })
            .collect(),
    })
}

fn render<W: Write>(report: &AllocationReport, format: OutputFormat, out: &mut W) -> Result<()> {
    match format {
        OutputFormat::Table => {
            let method = match report.method {
                Method::MaxSharpe => "maximum Sharpe",
                Method::EqualWeightFallback => "equal weight (fallback)",
            };
            writeln!(out, "\nAllocation: {}", method)?;
            writeln!(out, "┌──────────────┬──────────┐")?;
            writeln!(out, "│ Asset        │ Weight   │")?;
            writeln!(out, "├──────────────┼──────────┤")?;
            for row in &report.weights {
                writeln!(out, "│ {:<12} │ {:>7.2}% │", row.asset, row.weight * 100.0)?;
            }
            writeln!(out, "└──────────────┴──────────┘")?;
            writeln!(out, "Expected return: {:.2}%", report.expected_return * 100.0)?;
            writeln!(out, "Volatility:      {:.2}%", report.volatility * 100.0)?;
            writeln!(out, "Sharpe ratio:    {:.3}", report.sharpe_ratio)?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(&mut *out);
            writer.write_record(["asset", "weight"])?;
            for row in &report.weights {
                writer.write_record([row.asset.clone(), format!("{:.6}", row.weight)])?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}
