//! Rebalance command implementation
//!
//! Computes the trades that bring current holdings plus a new contribution
//! back to the strategic allocation of a risk profile.

use std::io::Write;

use quant_core::profile::{rebalance, AssetClass, RebalanceTrade, RiskProfile};
use serde::Serialize;
use tracing::info;

use super::OutputFormat;
use crate::{CliError, Result};

/// Options of `quant rebalance`
#[derive(Debug, Clone)]
pub struct RebalanceOptions {
    pub profile: String,
    /// Holdings as `class=amount`
    pub holdings: Vec<String>,
    pub contribution: f64,
    pub format: String,
}

#[derive(Debug, Serialize)]
struct RebalanceReport {
    profile: RiskProfile,
    contribution: f64,
    total: f64,
    trades: Vec<RebalanceTrade>,
}

/// Run the rebalance command
pub fn run(opts: &RebalanceOptions) -> Result<()> {
    let format: OutputFormat = opts.format.parse()?;
    let profile: RiskProfile = opts.profile.parse()?;
    let holdings = parse_holdings(&opts.holdings)?;

    info!("Rebalancing {} holdings to the {} allocation", holdings.len(), profile);
    let trades = rebalance(&profile.strategic_allocation(), &holdings, opts.contribution)?;

    let report = RebalanceReport {
        profile,
        contribution: opts.contribution,
        total: holdings.iter().map(|(_, a)| a).sum::<f64>() + opts.contribution,
        trades,
    };

    let stdout = std::io::stdout();
    render(&report, format, &mut stdout.lock())
}

/// Parse `class=amount` pairs
fn parse_holdings(raw: &[String]) -> Result<Vec<(AssetClass, f64)>> {
    raw.iter()
        .map(|entry| {
            let (class, amount) = entry.split_once('=').ok_or_else(|| {
                CliError::invalid_argument(format!(
                    "holding '{}' must look like class=amount",
                    entry
                ))
            })?;
            let class: AssetClass = class.parse()?;
            let amount: f64 = amount.trim().parse().map_err(|_| {
                CliError::invalid_argument(format!("holding '{}': invalid amount", entry))
            })?;
            Ok((class, amount))
        })
        .collect()
}

fn render<W: Write>(report: &RebalanceReport, format: OutputFormat, out: &mut W) -> Result<()> {
    match format {
        OutputFormat::Table => {
            writeln!(
                out,
                "\nRebalance to {} allocation (total {:.2})",
                report.profile, report.total
            )?;
            writeln!(out, "┌────────────────────┬─────────┬──────────────┬──────────────┐")?;
            writeln!(out, "│ Class              │ Target  │ Current      │ Trade        │")?;
            writeln!(out, "├────────────────────┼─────────┼──────────────┼──────────────┤")?;
            for trade in &report.trades {
                writeln!(
                    out,
                    "│ {:<18} │ {:>6.1}% │ {:>12.2} │ {:>12.2} │",
                    trade.class.name(),
                    trade.target_weight * 100.0,
                    trade.current_amount,
                    trade.amount
                )?;
            }
            writeln!(out, "└────────────────────┴─────────┴──────────────┴──────────────┘")?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(&mut *out);
            for trade in &report.trades {
                writer.serialize(trade)?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}
