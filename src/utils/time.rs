//! Clock abstraction used by time-driven acquisition sources

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Time provider trait for dependency injection and testing
pub trait TimeProvider: Send + Sync {
    /// Nanoseconds since the provider's epoch
    fn now_nanos(&self) -> u64;
    /// Microseconds since the provider's epoch
    fn now_micros(&self) -> u64 {
        self.now_nanos() / 1000
    }
}

/// Monotonic clock measured from construction; immune to wall-clock jumps
pub struct MonotonicTimeProvider {
    origin: Instant,
}

impl MonotonicTimeProvider {
    /// Clock anchored at construction
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeProvider for MonotonicTimeProvider {
    fn now_nanos(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }
}

/// Mock time provider for deterministic testing
pub struct MockTimeProvider {
    current_time: AtomicU64,
}

impl MockTimeProvider {
    /// Mock clock starting at `initial_time_nanos`
    pub fn new(initial_time_nanos: u64) -> Self {
        Self {
            current_time: AtomicU64::new(initial_time_nanos),
        }
    }

    /// Move the clock forward
    pub fn advance_by(&self, nanos: u64) {
        self.current_time.fetch_add(nanos, Ordering::Relaxed);
    }

    /// Move the clock forward by whole milliseconds
    pub fn advance_by_millis(&self, millis: u64) {
        self.advance_by(millis * 1_000_000);
    }

    /// Jump to an absolute time
    pub fn set_time(&self, nanos: u64) {
        self.current_time.store(nanos, Ordering::Relaxed);
    }
}

impl TimeProvider for MockTimeProvider {
    fn now_nanos(&self) -> u64 {
        self.current_time.load(Ordering::Relaxed)
    }
}
