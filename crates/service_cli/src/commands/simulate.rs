//! Simulate command implementation
//!
//! Projects portfolio value with the Monte Carlo path simulator and reports
//! terminal-value percentiles.

use std::io::Write;

use quant_core::profile::RiskProfile;
use quant_simulation::{
    simulate, simulate_seeded, DriftConvention, PathEnsemble, ProjectionSummary,
    SimulationRequest,
};
use serde::Serialize;
use tracing::info;

use super::OutputFormat;
use crate::config::CliConfig;
use crate::{CliError, Result};

/// Options of `quant simulate`
#[derive(Debug, Clone)]
pub struct SimulateOptions {
    pub capital: f64,
    pub profile: String,
    pub annual_return: Option<f64>,
    pub annual_volatility: Option<f64>,
    pub years: u32,
    pub paths: Option<usize>,
    pub seed: Option<u64>,
    pub drift: Option<String>,
    pub samples: usize,
    pub format: String,
}

/// Serialisable projection report
#[derive(Debug, Serialize)]
struct ProjectionReport<'a> {
    request: SimulationRequest,
    profile: RiskProfile,
    seed: Option<u64>,
    summary: ProjectionSummary,
    sample_paths: Vec<&'a [f64]>,
}

/// Run the simulate command
pub fn run(config: &CliConfig, opts: &SimulateOptions) -> Result<()> {
    let format: OutputFormat = opts.format.parse()?;
    let (request, profile) = build_request(config, opts)?;
    let seed = opts.seed.or(config.seed);

    info!("Starting simulation...");
    info!("  Profile: {}", profile);
    info!(
        "  Return/volatility: {:.2}% / {:.2}%",
        request.annual_return() * 100.0,
        request.annual_volatility() * 100.0
    );
    info!("  Horizon: {} years", request.horizon_years());
    info!("  Paths: {}", request.path_count());

    let ensemble = match seed {
        Some(seed) => simulate_seeded(&request, seed)?,
        None => simulate(&request)?,
    };

    let stdout = std::io::stdout();
    render(&ensemble, &request, profile, seed, opts.samples, format, &mut stdout.lock())?;

    info!("Simulation complete");
    Ok(())
}

/// Resolve options and config into a validated request
fn build_request(
    config: &CliConfig,
    opts: &SimulateOptions,
) -> Result<(SimulationRequest, RiskProfile)> {
    let profile: RiskProfile = opts.profile.parse()?;
    let growth = config.growth_for(profile);

    let paths = opts.paths.unwrap_or(config.default_paths);
    if paths > config.max_paths {
        return Err(CliError::invalid_argument(format!(
            "--paths {} exceeds the configured maximum of {}",
            paths, config.max_paths
        )));
    }
    if opts.years > config.max_horizon_years {
        return Err(CliError::invalid_argument(format!(
            "--years {} exceeds the configured maximum of {}",
            opts.years, config.max_horizon_years
        )));
    }

    let drift = match &opts.drift {
        Some(name) => name.parse::<DriftConvention>()?,
        None => config.drift_convention,
    };

    let request = SimulationRequest::new(
        opts.capital,
        opts.annual_return.unwrap_or(growth.annual_return),
        opts.annual_volatility.unwrap_or(growth.annual_volatility),
        opts.years,
        paths,
    )?
    .with_drift_convention(drift);

    Ok((request, profile))
}

fn render<W: Write>(
    ensemble: &PathEnsemble,
    request: &SimulationRequest,
    profile: RiskProfile,
    seed: Option<u64>,
    samples: usize,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    let summary = ensemble
        .summary()
        .ok_or_else(|| CliError::invalid_argument("simulation produced no paths"))?;

    match format {
        OutputFormat::Table => {
            let capital = request.initial_capital();
            writeln!(
                out,
                "\nProjection after {} years ({} paths)",
                request.horizon_years(),
                ensemble.n_paths()
            )?;
            writeln!(out, "┌──────────────┬──────────────────┬──────────┐")?;
            writeln!(out, "│ Scenario     │ Value            │ Growth   │")?;
            writeln!(out, "├──────────────┼──────────────────┼──────────┤")?;
            for (label, value) in [
                ("Pessimistic", summary.p10),
                ("Median", summary.p50),
                ("Optimistic", summary.p90),
                ("Mean", summary.mean),
            ] {
                writeln!(
                    out,
                    "│ {:<12} │ {:>16.2} │ {:>7.1}% │",
                    label,
                    value,
                    (value / capital - 1.0) * 100.0
                )?;
            }
            writeln!(out, "└──────────────┴──────────────────┴──────────┘")?;
        }
        OutputFormat::Json => {
            let report = ProjectionReport {
                request: *request,
                profile,
                seed,
                summary,
                sample_paths: ensemble.sample_paths(samples),
            };
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            // One row per day, one column per sample path
            let paths = ensemble.sample_paths(samples);
            let mut writer = csv::Writer::from_writer(&mut *out);

            let mut header = vec!["day".to_string()];
            header.extend((0..paths.len()).map(|i| format!("path_{}", i)));
            writer.write_record(&header)?;

            for day in 0..ensemble.n_rows() {
                let mut record = vec![day.to_string()];
                record.extend(paths.iter().map(|p| format!("{:.2}", p[day])));
                writer.write_record(&record)?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}
