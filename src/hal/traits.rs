// src/hal/traits.rs
//! Acquisition boundary consumed by the blink session

use ndarray::Array2;

use crate::hal::types::SourceInfo;

/// A device or feed that buffers multi-channel samples until they are read.
///
/// Matrices are `channels x samples`. Reads never block: when nothing new is
/// buffered they return a matrix with zero columns, which is not an error.
pub trait AcquisitionSource {
    /// Source-specific failure type
    type Error: std::error::Error + Send + Sync + 'static;

    /// Prepare the session and start streaming
    fn start_session(&mut self) -> Result<(), Self::Error>;

    /// Stop streaming and release the session
    fn stop_session(&mut self) -> Result<(), Self::Error>;

    /// Drain every sample buffered since the previous read
    fn read_available(&mut self) -> Result<Array2<f64>, Self::Error>;

    /// Drain up to `n` buffered samples; fewer come back when fewer are buffered
    fn read_exact(&mut self, n: usize) -> Result<Array2<f64>, Self::Error>;

    /// Sampling rate in Hz, known before the session starts
    fn sample_rate(&self) -> u32;

    /// Rows in every batch
    fn channel_count(&self) -> usize;

    /// Static description for logging
    fn info(&self) -> SourceInfo;
}
