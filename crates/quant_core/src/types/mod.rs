//! Core types for the portfolio engine.
//!
//! This module provides:
//! - [`ValidationError`]: malformed or out-of-domain request parameters
//! - [`DataInsufficientError`]: historical data too short or degenerate

pub mod error;

pub use error::{DataInsufficientError, ValidationError};
