//! Quant CLI - Command Line Operations for the Portfolio Engine
//!
//! This is the operational entry point for the portfolio engine.
//!
//! # Commands
//!
//! - `quant simulate --capital <amount> --profile <profile> --years <n>` - Project portfolio value
//! - `quant optimise --prices <csv>` - Maximum-Sharpe allocation from a price history
//! - `quant rebalance --profile <profile> --holding class=amount` - Trades to the strategic mix
//! - `quant check` - Print the effective configuration
//!
//! # Architecture
//!
//! As part of the **S**ervice layer, this crate wires the foundation crate,
//! the path simulator and the allocation optimiser behind one command-line
//! interface. Library crates never install a subscriber; this binary does.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod prices;

pub use error::{CliError, Result};

use commands::optimise::OptimiseOptions;
use commands::rebalance::RebalanceOptions;
use commands::simulate::SimulateOptions;
use config::{build_config, CliArgs};

/// Portfolio projection and allocation CLI
#[derive(Parser)]
#[command(name = "quant")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "quant.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project portfolio value with Monte Carlo paths
    Simulate {
        /// Initial capital
        #[arg(long)]
        capital: f64,

        /// Risk profile (conservative, moderate, aggressive)
        #[arg(short, long, default_value = "moderate")]
        profile: String,

        /// Annual expected return, overriding the profile
        #[arg(long = "return", alias = "annual-return")]
        annual_return: Option<f64>,

        /// Annual volatility, overriding the profile
        #[arg(long = "volatility", alias = "annual-volatility")]
        annual_volatility: Option<f64>,

        /// Horizon in years
        #[arg(short, long)]
        years: u32,

        /// Number of Monte Carlo paths
        #[arg(short = 'n', long)]
        paths: Option<usize>,

        /// Seed for a reproducible run
        #[arg(short, long)]
        seed: Option<u64>,

        /// Drift convention (arithmetic, logarithmic)
        #[arg(long)]
        drift: Option<String>,

        /// Sample paths included in json/csv output
        #[arg(long, default_value = "10")]
        samples: usize,

        /// Output format (json, csv, table)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Compute the maximum-Sharpe allocation from a price history
    Optimise {
        /// Price history CSV (date column followed by one column per asset)
        #[arg(long)]
        prices: PathBuf,

        /// Assets to allocate across (default: every column)
        #[arg(short, long, value_delimiter = ',')]
        assets: Option<Vec<String>>,

        /// Annual risk-free rate
        #[arg(long)]
        risk_free: Option<f64>,

        /// Lower weight bound per asset
        #[arg(long)]
        min_weight: Option<f64>,

        /// Upper weight bound per asset
        #[arg(long)]
        max_weight: Option<f64>,

        /// Report equal weights when the solver does not converge
        #[arg(long)]
        fallback_equal: bool,

        /// Output format (json, csv, table)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Compute trades that restore a profile's strategic allocation
    Rebalance {
        /// Risk profile (conservative, moderate, aggressive)
        #[arg(short, long, default_value = "moderate")]
        profile: String,

        /// Current holding as class=amount (repeatable)
        #[arg(long = "holding")]
        holdings: Vec<String>,

        /// New money to invest
        #[arg(long, default_value = "0")]
        contribution: f64,

        /// Output format (json, csv, table)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Print the effective configuration
    Check,
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        log_level: cli.log_level.clone(),
        verbose: cli.verbose,
    };
    let config = build_config(Path::new(&cli.config), &args)?;

    init_tracing(config.log_level.as_filter_str());
    debug!("Effective configuration: {:?}", config);

    match cli.command {
        Commands::Simulate {
            capital,
            profile,
            annual_return,
            annual_volatility,
            years,
            paths,
            seed,
            drift,
            samples,
            format,
        } => commands::simulate::run(
            &config,
            &SimulateOptions {
                capital,
                profile,
                annual_return,
                annual_volatility,
                years,
                paths,
                seed,
                drift,
                samples,
                format,
            },
        ),
        Commands::Optimise {
            prices,
            assets,
            risk_free,
            min_weight,
            max_weight,
            fallback_equal,
            format,
        } => commands::optimise::run(
            &config,
            &OptimiseOptions {
                prices,
                assets,
                risk_free,
                min_weight,
                max_weight,
                fallback_equal,
                format,
            },
        ),
        Commands::Rebalance {
            profile,
            holdings,
            contribution,
            format,
        } => commands::rebalance::run(&RebalanceOptions {
            profile,
            holdings,
            contribution,
            format,
        }),
        Commands::Check => commands::check::run(&config),
    }
}
