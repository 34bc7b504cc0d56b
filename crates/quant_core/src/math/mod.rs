//! Numerical kernels shared by the simulator and the optimiser.
//!
//! ## Available Modules
//!
//! - [`linalg`]: Dense vector/matrix products and Cholesky factorisation
//! - [`stats`]: Sample mean, sample covariance and percentiles
//!
//! Matrices are square `Vec<Vec<f64>>` in row-major order; dimensions are
//! small (one row per asset), so no external BLAS is involved.

pub mod linalg;
pub mod stats;
