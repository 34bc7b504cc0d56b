//! Check command implementation
//!
//! Prints the effective configuration after file, environment and
//! command-line overrides, followed by the growth assumptions in force for
//! each risk profile.

use std::io::Write;

use quant_core::profile::RiskProfile;
use tracing::info;

use crate::config::{CliConfig, ConfigError};
use crate::Result;

/// Run the check command
pub fn run(config: &CliConfig) -> Result<()> {
    info!("Checking configuration...");
    let stdout = std::io::stdout();
    render(config, &mut stdout.lock())?;
    info!("Configuration OK");
    Ok(())
}

fn render<W: Write>(config: &CliConfig, out: &mut W) -> Result<()> {
    let text = toml::to_string_pretty(config)
        .map_err(|e| ConfigError::FileError(format!("Failed to serialise config: {}", e)))?;

    writeln!(out, "# Effective configuration")?;
    writeln!(out, "{}", text.trim_end())?;
    writeln!(out)?;
    writeln!(out, "# Growth assumptions")?;
    for profile in RiskProfile::ALL {
        let growth = config.growth_for(profile);
        writeln!(
            out,
            "{:<13} return {:>6.2}%  volatility {:>6.2}%",
            profile.name(),
            growth.annual_return * 100.0,
            growth.annual_volatility * 100.0
        )?;
    }
    Ok(())
}
