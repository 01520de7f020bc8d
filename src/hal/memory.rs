// src/hal/memory.rs
//! Scripted in-memory acquisition source

use ndarray::{Array2, ArrayView2};

use crate::hal::queue::SampleQueue;
use crate::hal::traits::AcquisitionSource;
use crate::hal::types::{SourceError, SourceInfo};

/// Source whose samples are pushed by the caller, for replay and tests.
///
/// Samples can be fed at any time; they only become readable while the
/// session is running.
#[derive(Debug, Clone)]
pub struct MemorySource {
    info: SourceInfo,
    queue: SampleQueue,
    running: bool,
    start_failure: Option<String>,
}

impl MemorySource {
    /// Empty source with the given layout
    pub fn new(channel_count: usize, sample_rate_hz: u32) -> Self {
        Self {
            info: SourceInfo {
                name: "Memory Source".to_string(),
                address: "memory".to_string(),
                channel_count,
                sample_rate_hz,
            },
            queue: SampleQueue::new(channel_count),
            running: false,
            start_failure: None,
        }
    }

    /// Make `start_session` fail as if `address` could not be reached
    pub fn failing_start(mut self, address: &str) -> Self {
        self.start_failure = Some(address.to_string());
        self
    }

    /// Queue a `channels x samples` batch
    pub fn feed(&mut self, batch: ArrayView2<'_, f64>) -> Result<(), SourceError> {
        self.queue.push(batch)
    }

    /// Queue samples on one channel, zero-filling the others
    pub fn feed_channel(&mut self, channel: usize, samples: &[f64]) -> Result<(), SourceError> {
        if channel >= self.info.channel_count {
            return Err(SourceError::ChannelMismatch {
                expected: self.info.channel_count,
                actual: channel + 1,
            });
        }

        let mut batch = Array2::zeros((self.info.channel_count, samples.len()));
        for (dst, &src) in batch.row_mut(channel).iter_mut().zip(samples) {
            *dst = src;
        }
        self.queue.push(batch.view())
    }

    /// Samples queued per channel
    pub fn buffered(&self) -> usize {
        self.queue.len()
    }

    /// True between start and stop
    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl AcquisitionSource for MemorySource {
    type Error = SourceError;

    fn start_session(&mut self) -> Result<(), Self::Error> {
        if let Some(address) = &self.start_failure {
            return Err(SourceError::ConnectionFailed(address.clone()));
        }
        if self.running {
            return Err(SourceError::AlreadyStarted);
        }
        self.running = true;
        Ok(())
    }

    fn stop_session(&mut self) -> Result<(), Self::Error> {
        if !self.running {
            return Err(SourceError::NotStarted);
        }
        self.running = false;
        Ok(())
    }

    fn read_available(&mut self) -> Result<Array2<f64>, Self::Error> {
        if !self.running {
            return Err(SourceError::NotStarted);
        }
        let n = self.queue.len();
        Ok(self.queue.take(n))
    }

    fn read_exact(&mut self, n: usize) -> Result<Array2<f64>, Self::Error> {
        if !self.running {
            return Err(SourceError::NotStarted);
        }
        Ok(self.queue.take(n))
    }

    fn sample_rate(&self) -> u32 {
        self.info.sample_rate_hz
    }

    fn channel_count(&self) -> usize {
        self.info.channel_count
    }

    fn info(&self) -> SourceInfo {
        self.info.clone()
    }
}
