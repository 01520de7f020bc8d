// src/hal/queue.rs
//! Per-channel sample queue shared by the buffered sources

use std::collections::VecDeque;

use ndarray::{Array2, ArrayView2};

use crate::hal::types::SourceError;

/// FIFO of samples for every channel, always the same length across channels
#[derive(Debug, Clone)]
pub(crate) struct SampleQueue {
    channels: Vec<VecDeque<f64>>,
}

impl SampleQueue {
    pub(crate) fn new(channel_count: usize) -> Self {
        Self {
            channels: vec![VecDeque::new(); channel_count],
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.channels.first().map_or(0, VecDeque::len)
    }

    /// Append a `channels x samples` batch
    pub(crate) fn push(&mut self, batch: ArrayView2<'_, f64>) -> Result<(), SourceError> {
        if batch.nrows() != self.channels.len() {
            return Err(SourceError::ChannelMismatch {
                expected: self.channels.len(),
                actual: batch.nrows(),
            });
        }

        for (queue, row) in self.channels.iter_mut().zip(batch.rows()) {
            queue.extend(row.iter().copied());
        }
        Ok(())
    }

    /// Remove up to `n` samples per channel from the head
    pub(crate) fn take(&mut self, n: usize) -> Array2<f64> {
        let n = n.min(self.len());
        let mut out = Array2::zeros((self.channels.len(), n));
        for (mut row, queue) in out.rows_mut().into_iter().zip(self.channels.iter_mut()) {
            for (dst, src) in row.iter_mut().zip(queue.drain(..n)) {
                *dst = src;
            }
        }
        out
    }

    pub(crate) fn clear(&mut self) {
        for queue in &mut self.channels {
            queue.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_push_and_take_preserve_order() {
        let mut queue = SampleQueue::new(2);
        queue.push(array![[1.0, 2.0, 3.0], [10.0, 20.0, 30.0]].view()).unwrap();
        queue.push(array![[4.0], [40.0]].view()).unwrap();
        assert_eq!(queue.len(), 4);

        let head = queue.take(3);
        assert_eq!(head, array![[1.0, 2.0, 3.0], [10.0, 20.0, 30.0]]);

        let rest = queue.take(10);
        assert_eq!(rest, array![[4.0], [40.0]]);
        assert_eq!(queue.take(5).ncols(), 0);
    }

    #[test]
    fn test_channel_mismatch_rejected() {
        let mut queue = SampleQueue::new(3);
        let err = queue.push(array![[1.0], [2.0]].view()).unwrap_err();
        assert_eq!(err, SourceError::ChannelMismatch { expected: 3, actual: 2 });
        assert_eq!(queue.len(), 0);
    }
}
