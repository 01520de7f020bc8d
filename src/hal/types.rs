// src/hal/types.rs
//! Core types for the acquisition boundary

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Static description of an acquisition source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Human-readable source kind
    pub name: String,
    /// Serial port, device address or other acquisition target
    pub address: String,
    /// Channels per sample
    pub channel_count: usize,
    /// Samples per second per channel
    pub sample_rate_hz: u32,
}

/// Errors raised by acquisition sources
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    /// The acquisition target could not be opened
    #[error("Could not connect to {0}")]
    ConnectionFailed(String),
    /// `start_session` on a running source
    #[error("Session is already running")]
    AlreadyStarted,
    /// Read or stop before `start_session`
    #[error("Session has not been started")]
    NotStarted,
    /// The producer side of a channel source went away
    #[error("Sample producer disconnected")]
    Disconnected,
    /// A batch whose row count differs from the source's layout
    #[error("Malformed batch: expected {expected} channels, got {actual}")]
    ChannelMismatch {
        /// Channels the source reports
        expected: usize,
        /// Rows in the offending batch
        actual: usize,
    },
    /// Settings the source cannot run with
    #[error("Invalid source configuration: {0}")]
    InvalidConfig(String),
}
