// src/processing/detector.rs
//! Blink event detection: per-block peak with warm-up and refractory gating
//!
//! Each filtered block yields at most one event. Two genuine blinks whose peaks
//! land inside the same block are reported once; the effective maximum event
//! rate is one per block duration.

use serde::{Deserialize, Serialize};

/// Sample-domain detection thresholds, fixed for the lifetime of a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorParams {
    /// Absolute amplitude a block peak must exceed, in microvolts
    pub threshold_uv: f64,
    /// Minimum spacing between accepted events, in samples (strictly exceeded)
    pub refractory_samples: u64,
    /// Blocks starting before this sample index never fire
    pub warmup_samples: u64,
}

/// Mutable detector bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DetectorState {
    /// Samples fully processed since session start
    pub global_sample_counter: u64,
    /// Session sample index of the last accepted event; `None` before the first
    pub last_blink_sample: Option<u64>,
    /// Events accepted so far
    pub blink_count: u64,
}

/// Largest absolute value within a block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockPeak {
    /// Offset within the block
    pub index: usize,
    /// Absolute value at `index`
    pub magnitude: f64,
}

/// First-occurrence argmax of `|x|`. Ties keep the lowest index.
pub fn find_peak(block: &[f64]) -> Option<BlockPeak> {
    let mut iter = block.iter().enumerate();
    let (_, first) = iter.next()?;
    let mut peak = BlockPeak {
        index: 0,
        magnitude: first.abs(),
    };

    for (index, value) in iter {
        let magnitude = value.abs();
        if magnitude > peak.magnitude {
            peak = BlockPeak { index, magnitude };
        }
    }
    Some(peak)
}

/// Threshold detector with warm-up suppression and refractory debounce
#[derive(Debug, Clone)]
pub struct EventDetector {
    params: DetectorParams,
    state: DetectorState,
}

impl EventDetector {
    /// Fresh detector with no events and a zero sample counter
    pub fn new(params: DetectorParams) -> Self {
        Self {
            params,
            state: DetectorState::default(),
        }
    }

    /// Decide whether `block` carries a blink, then advance the sample counter.
    ///
    /// The counter advances by the block length whether or not an event fires,
    /// including during warm-up.
    pub fn process_block(&mut self, block: &[f64]) -> bool {
        let block_start = self.state.global_sample_counter;
        let detected = match find_peak(block) {
            Some(peak) => self.accept(block_start, peak),
            None => false,
        };

        self.state.global_sample_counter += block.len() as u64;
        detected
    }

    fn accept(&mut self, block_start: u64, peak: BlockPeak) -> bool {
        if block_start < self.params.warmup_samples {
            return false;
        }
        if peak.magnitude <= self.params.threshold_uv {
            return false;
        }

        let candidate = block_start + peak.index as u64;
        let spaced = match self.state.last_blink_sample {
            Some(last) => candidate.saturating_sub(last) > self.params.refractory_samples,
            None => true,
        };
        if !spaced {
            return false;
        }

        self.state.last_blink_sample = Some(candidate);
        self.state.blink_count += 1;
        true
    }

    /// Current bookkeeping
    pub fn state(&self) -> &DetectorState {
        &self.state
    }

    /// Gating parameters in samples
    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    /// True once blocks are allowed to fire
    pub fn is_warmed_up(&self) -> bool {
        self.state.global_sample_counter >= self.params.warmup_samples
    }
}
