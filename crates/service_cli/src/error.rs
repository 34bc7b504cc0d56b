//! CLI error types.

use quant_core::types::ValidationError;
use quant_optimiser::OptimiserError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced to the command line.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Request parameters rejected by the engine
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Allocation could not be computed
    #[error("Optimisation error: {0}")]
    Optimiser(#[from] OptimiserError),

    /// Input file missing
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Malformed command-line argument or input record
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// CSV reading or writing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON encoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Create an invalid-argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Result alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use quant_core::types::DataInsufficientError;

    #[test]
    fn test_error_display() {
        let err = CliError::FileNotFound("prices.csv".into());
        assert_eq!(err.to_string(), "File not found: prices.csv");

        let err = CliError::invalid_argument("bad holding");
        assert_eq!(err.to_string(), "Invalid argument: bad holding");
    }

    #[test]
    fn test_library_errors_convert() {
        let err: CliError = ValidationError::TooFewAssets { got: 1, need: 2 }.into();
        assert!(matches!(err, CliError::Validation(_)));

        let err: CliError = OptimiserError::from(DataInsufficientError::TooFewObservations {
            got: 0,
            need: 2,
        })
        .into();
        assert!(err.to_string().contains("insufficient observations"));
    }
}
