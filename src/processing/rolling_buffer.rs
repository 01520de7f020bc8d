// src/processing/rolling_buffer.rs
//! Fixed-window display buffer of the most recent filtered samples

/// Index-based ring holding the newest `capacity` filtered samples.
///
/// Observable behaviour matches shifting a zero-initialized array left by the
/// block length and writing the block into the tail: [`RollingBuffer::snapshot`]
/// is always ordered oldest to newest. Nothing in detection reads from it.
#[derive(Debug, Clone)]
pub struct RollingBuffer {
    data: Vec<f64>,
    // Slot holding the oldest sample
    head: usize,
}

impl RollingBuffer {
    /// Zero-filled window of `capacity` samples
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0.0; capacity],
            head: 0,
        }
    }

    /// Evict the oldest `block.len()` samples and append `block` at the tail
    pub fn push_block(&mut self, block: &[f64]) {
        let capacity = self.data.len();
        if capacity == 0 {
            return;
        }

        if block.len() >= capacity {
            self.data.copy_from_slice(&block[block.len() - capacity..]);
            self.head = 0;
            return;
        }

        // Two contiguous writes at most: up to the end of storage, then wrap
        let first = block.len().min(capacity - self.head);
        self.data[self.head..self.head + first].copy_from_slice(&block[..first]);
        self.data[..block.len() - first].copy_from_slice(&block[first..]);
        self.head = (self.head + block.len()) % capacity;
    }

    /// Copy of the window, oldest sample first
    pub fn snapshot(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.data.len());
        out.extend_from_slice(&self.data[self.head..]);
        out.extend_from_slice(&self.data[..self.head]);
        out
    }

    /// Window length in samples
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Most recent sample, if the window has any slots
    pub fn latest(&self) -> Option<f64> {
        if self.data.is_empty() {
            return None;
        }
        let idx = (self.head + self.data.len() - 1) % self.data.len();
        Some(self.data[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reference behaviour: shift left, write block into the tail
    fn shifted(window: &[f64], block: &[f64]) -> Vec<f64> {
        let mut out = window.to_vec();
        let n = block.len().min(out.len());
        out.rotate_left(n);
        let len = out.len();
        out[len - n..].copy_from_slice(&block[block.len() - n..]);
        out
    }

    #[test]
    fn test_starts_zeroed() {
        let buffer = RollingBuffer::new(6);
        assert_eq!(buffer.snapshot(), vec![0.0; 6]);
        assert_eq!(buffer.capacity(), 6);
    }

    #[test]
    fn test_matches_shift_semantics() {
        let mut buffer = RollingBuffer::new(10);
        let mut reference = vec![0.0; 10];

        let blocks: Vec<Vec<f64>> = vec![
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0, 7.0],
            vec![8.0, 9.0, 10.0],
            vec![11.0, 12.0, 13.0],
            vec![14.0],
        ];

        for block in &blocks {
            buffer.push_block(block);
            reference = shifted(&reference, block);
            assert_eq!(buffer.snapshot(), reference);
        }
        assert_eq!(buffer.latest(), Some(14.0));
    }

    #[test]
    fn test_block_larger_than_window() {
        let mut buffer = RollingBuffer::new(4);
        buffer.push_block(&[1.0, 2.0]);
        buffer.push_block(&[3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);

        assert_eq!(buffer.snapshot(), vec![5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_zero_capacity() {
        let mut buffer = RollingBuffer::new(0);
        buffer.push_block(&[1.0, 2.0]);

        assert!(buffer.snapshot().is_empty());
        assert_eq!(buffer.latest(), None);
    }
}
