// src/error.rs
//! Unified error handling for the blink detection core
//!
//! Component errors (`FilterError`, `ConfigError`, `SourceError`) stay close to the
//! code that raises them and convert into [`BlinkError`] at the session boundary,
//! so callers only ever match on one type.

use std::error::Error as StdError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::processing::filters::FilterError;

/// Unified error type for the blink detection core
#[derive(Debug, Error)]
pub enum BlinkError {
    /// The acquisition boundary failed (connection, stream start/stop, reads)
    #[error("[DEVICE] {operation} failed: {source}")]
    Device {
        /// Source call that failed
        operation: &'static str,
        /// Error reported by the source
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// Settings that cannot produce a working session
    #[error("[CONFIG] Configuration error in {component}: {reason}")]
    Configuration {
        /// Section or stage that rejected the settings
        component: String,
        /// What is wrong
        reason: String,
    },

    /// Invalid band-pass design parameters
    #[error("[FILTER] {0}")]
    Filter(#[from] FilterError),

    /// Loading or validating a configuration file failed
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Data from the acquisition boundary has an unexpected shape
    #[error("[DATA] Invalid {data_type}: {reason} (expected: {expected}, got: {actual})")]
    InvalidData {
        /// Kind of data inspected
        data_type: String,
        /// What is wrong
        reason: String,
        /// Shape the session expected
        expected: String,
        /// Shape that arrived
        actual: String,
    },

    /// The session was already stopped
    #[error("[SESSION] Session is not running")]
    NotRunning,
}

impl BlinkError {
    /// Wrap an acquisition-layer error together with the operation that raised it
    pub fn device<E>(operation: &'static str, err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        BlinkError::Device {
            operation,
            source: Box::new(err),
        }
    }

    /// Build a `Configuration` error
    pub fn configuration(component: &str, reason: impl Into<String>) -> Self {
        BlinkError::Configuration {
            component: component.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors raised by the acquisition boundary
    pub fn is_device_error(&self) -> bool {
        matches!(self, BlinkError::Device { .. })
    }
}

/// Result type alias for blink core operations
pub type BlinkResult<T> = Result<T, BlinkError>;
