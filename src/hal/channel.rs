// src/hal/channel.rs
//! Acquisition source fed by a producer thread over a crossbeam channel

use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use ndarray::Array2;

use crate::hal::queue::SampleQueue;
use crate::hal::traits::AcquisitionSource;
use crate::hal::types::{SourceError, SourceInfo};

/// Producer half: hands `channels x samples` batches to a [`ChannelSource`]
#[derive(Debug, Clone)]
pub struct ChannelFeeder {
    tx: Sender<Array2<f64>>,
}

impl ChannelFeeder {
    /// Hand one batch to the source. Fails once the source is dropped.
    pub fn send(&self, batch: Array2<f64>) -> Result<(), SourceError> {
        self.tx.send(batch).map_err(|_| SourceError::Disconnected)
    }
}

/// Consumer half, drained without blocking on every read
#[derive(Debug)]
pub struct ChannelSource {
    info: SourceInfo,
    rx: Receiver<Array2<f64>>,
    queue: SampleQueue,
    running: bool,
}

impl ChannelSource {
    /// Create a connected feeder/source pair with an unbounded queue
    pub fn new(info: SourceInfo) -> (ChannelFeeder, Self) {
        let (tx, rx) = channel::unbounded();
        let queue = SampleQueue::new(info.channel_count);
        (
            ChannelFeeder { tx },
            Self {
                info,
                rx,
                queue,
                running: false,
            },
        )
    }

    /// Move every batch received so far into the local queue
    fn pull_pending(&mut self) -> Result<(), SourceError> {
        loop {
            match self.rx.try_recv() {
                Ok(batch) => self.queue.push(batch.view())?,
                Err(TryRecvError::Empty) => return Ok(()),
                Err(TryRecvError::Disconnected) => {
                    // Whatever arrived before the hang-up is still served
                    if self.queue.len() == 0 {
                        return Err(SourceError::Disconnected);
                    }
                    return Ok(());
                }
            }
        }
    }
}

impl AcquisitionSource for ChannelSource {
    type Error = SourceError;

    fn start_session(&mut self) -> Result<(), Self::Error> {
        if self.running {
            return Err(SourceError::AlreadyStarted);
        }
        // Samples sent before the stream started are not part of the session
        while self.rx.try_recv().is_ok() {}
        self.queue.clear();
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
        self.pull_pending()?;
        let n = self.queue.len();
        Ok(self.queue.take(n))
    }

    fn read_exact(&mut self, n: usize) -> Result<Array2<f64>, Self::Error> {
        if !self.running {
            return Err(SourceError::NotStarted);
        }
        self.pull_pending()?;
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
