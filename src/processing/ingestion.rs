// src/processing/ingestion.rs
//! Block assembly: turns irregular acquisition batches into fixed-size blocks

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::{BlinkError, BlinkResult};

/// How the session pulls raw samples from the acquisition boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IngestionMode {
    /// Read everything buffered and slice every complete block in one call
    #[default]
    AccumulateAndSlice,
    /// Request at most one block's worth per call
    FixedPull,
}

/// Pending-sample queue sliced into fixed-size blocks from the head.
///
/// Blocks come out in arrival order; no sample is dropped or repeated. After
/// [`BlockAssembler::ingest`] returns, fewer than `block_size` samples remain
/// pending.
#[derive(Debug, Clone)]
pub struct BlockAssembler {
    block_size: usize,
    mode: IngestionMode,
    pending: VecDeque<f64>,
}

impl BlockAssembler {
    /// Fails when `block_size` is zero
    pub fn new(block_size: usize, mode: IngestionMode) -> BlinkResult<Self> {
        if block_size == 0 {
            return Err(BlinkError::configuration(
                "block_assembler",
                "block size must be at least one sample",
            ));
        }

        Ok(Self {
            block_size,
            mode,
            pending: VecDeque::with_capacity(block_size * 2),
        })
    }

    /// Number of samples to request from the boundary in fixed-pull mode.
    /// A partial read left over from an earlier call counts toward the block.
    pub fn pull_size(&self) -> usize {
        self.block_size.saturating_sub(self.pending.len())
    }

    /// Append fresh samples and return every block that is now complete
    pub fn ingest<I>(&mut self, samples: I) -> Vec<Vec<f64>>
    where
        I: IntoIterator<Item = f64>,
    {
        self.pending.extend(samples);

        let ready = self.pending.len() / self.block_size;
        let mut blocks: Vec<Vec<f64>> = Vec::with_capacity(ready);
        for _ in 0..ready {
            blocks.push(self.pending.drain(..self.block_size).collect());
        }
        blocks
    }

    /// Samples waiting for a complete block
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Samples per emitted block
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Strategy selected at construction
    pub fn mode(&self) -> IngestionMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(start: usize, len: usize) -> Vec<f64> {
        (start..start + len).map(|n| n as f64).collect()
    }

    #[test]
    fn test_zero_block_size_rejected() {
        assert!(BlockAssembler::new(0, IngestionMode::AccumulateAndSlice).is_err());
    }

    #[test]
    fn test_partial_batch_is_held() {
        let mut assembler = BlockAssembler::new(25, IngestionMode::AccumulateAndSlice).unwrap();

        assert!(assembler.ingest(ramp(0, 10)).is_empty());
        assert_eq!(assembler.pending_len(), 10);

        let blocks = assembler.ingest(ramp(10, 15));
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0], ramp(0, 25));
        assert_eq!(assembler.pending_len(), 0);
    }

    #[test]
    fn test_backlog_drained_in_order() {
        let mut assembler = BlockAssembler::new(25, IngestionMode::AccumulateAndSlice).unwrap();

        let blocks = assembler.ingest(ramp(0, 110));
        assert_eq!(blocks.len(), 4);
        for (i, block) in blocks.iter().enumerate() {
            assert_eq!(*block, ramp(i * 25, 25));
        }
        assert_eq!(assembler.pending_len(), 10);

        let blocks = assembler.ingest(ramp(110, 15));
        assert_eq!(blocks, vec![ramp(100, 25)]);
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let mut assembler = BlockAssembler::new(25, IngestionMode::FixedPull).unwrap();
        assembler.ingest(ramp(0, 5));

        assert!(assembler.ingest(Vec::new()).is_empty());
        assert_eq!(assembler.pending_len(), 5);
    }

    #[test]
    fn test_pull_size_accounts_for_partial_read() {
        let mut assembler = BlockAssembler::new(25, IngestionMode::FixedPull).unwrap();
        assert_eq!(assembler.pull_size(), 25);

        assembler.ingest(ramp(0, 7));
        assert_eq!(assembler.pull_size(), 18);

        let blocks = assembler.ingest(ramp(7, 18));
        assert_eq!(blocks, vec![ramp(0, 25)]);
        assert_eq!(assembler.pull_size(), 25);
    }
}
