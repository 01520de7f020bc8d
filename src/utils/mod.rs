//! Common utilities for the blink detection core
//!
//! - Time sources with an injectable clock for deterministic tests

pub mod time;

pub use time::{
    MockTimeProvider,
    MonotonicTimeProvider,
    TimeProvider,
};
