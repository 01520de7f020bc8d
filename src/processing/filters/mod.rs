// src/processing/filters/mod.rs
//! Digital filters for EOG signal conditioning

pub mod iir;

pub use iir::*;

use thiserror::Error;

/// Common filter error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// Band edges, order or sample rate out of range
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
    /// A designed section is unstable or not finite
    #[error("Invalid coefficients: {0}")]
    InvalidCoefficients(String),
}
