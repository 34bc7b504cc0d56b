//! # quant_core: Foundation for the Portfolio Engine
//!
//! ## Layer 1 (Foundation) Role
//!
//! quant_core is the bottom layer of the engine, providing:
//! - Error types: `ValidationError`, `DataInsufficientError` (`types::error`)
//! - Shared parameter checks used by every entry point (`validation`)
//! - Dense linear algebra and sample statistics (`math`)
//! - Risk profiles, growth assumptions and rebalancing (`profile`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other quant_* crates, with minimal external dependencies:
//! - num-traits: Traits for generic numerical computation
//! - thiserror: Structured error enums
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use quant_core::math::stats::percentile;
//! use quant_core::profile::RiskProfile;
//!
//! let profile: RiskProfile = "moderate".parse().unwrap();
//! let assumptions = profile.growth_assumptions();
//! assert!((assumptions.annual_return - 0.14).abs() < 1e-12);
//!
//! let median = percentile(&[1.0_f64, 2.0, 3.0], 50.0).unwrap();
//! assert!((median - 2.0).abs() < 1e-12);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for profiles, allocations and trades

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;
pub mod profile;
pub mod types;
pub mod validation;

/// Trading days per year used for every annualisation in the engine.
///
/// Per-step drift and volatility scale with this value, so changing it
/// changes every simulated path and every annualised moment.
pub const TRADING_DAYS_PER_YEAR: usize = 252;
