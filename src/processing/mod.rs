// src/processing/mod.rs
//! Per-block signal path: ingestion, filtering, display buffering, detection

pub mod detector;
pub mod filters;
pub mod ingestion;
pub mod rolling_buffer;

pub use detector::*;
pub use filters::{FilterError, FilterSpec, FilterState, StreamingFilter};
pub use ingestion::*;
pub use rolling_buffer::*;
