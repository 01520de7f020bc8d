// src/config/mod.rs
//! Configuration for a blink detection session
//!
//! Every duration is expressed in seconds here and converted to sample counts
//! by [`SessionTiming::derive`] once the acquisition source reports its rate.

pub mod constants;
pub mod loader;
pub mod timing;

pub use constants::*;
pub use loader::{ConfigError, ConfigLoader};
pub use timing::SessionTiming;

use serde::{Deserialize, Serialize};

use crate::processing::IngestionMode;

/// Complete session configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct BlinkConfig {
    /// Acquisition target and channel
    #[serde(default)]
    pub device: DeviceConfig,
    /// Band-pass design
    #[serde(default)]
    pub filter: FilterConfig,
    /// Detection thresholds
    #[serde(default)]
    pub detection: DetectionConfig,
    /// Display window
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Acquisition target and channel selection
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DeviceConfig {
    /// Serial port or address handed to the acquisition source
    #[serde(default = "defaults::serial_port")]
    pub serial_port: String,

    /// Row of the sample matrix carrying EOG
    #[serde(default = "defaults::channel_index")]
    pub channel_index: usize,

    /// How raw batches are cut into blocks
    #[serde(default)]
    pub ingestion: IngestionMode,
}

/// Band-pass design parameters
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FilterConfig {
    /// Lower band edge in Hz
    #[serde(default = "defaults::low_cutoff_hz")]
    pub low_cutoff_hz: f64,

    /// Upper band edge in Hz, below Nyquist
    #[serde(default = "defaults::high_cutoff_hz")]
    pub high_cutoff_hz: f64,

    /// Butterworth prototype order; the band-pass has twice as many poles
    #[serde(default = "defaults::filter_order")]
    pub order: usize,
}

/// Event detection thresholds
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DetectionConfig {
    /// Block duration in seconds
    #[serde(default = "defaults::block_sec")]
    pub block_sec: f64,

    /// Peak amplitude a blink must exceed, in microvolts
    #[serde(default = "defaults::threshold_uv")]
    pub threshold_uv: f64,

    /// Minimum spacing between blinks in seconds
    #[serde(default = "defaults::refractory_sec")]
    pub refractory_sec: f64,

    /// Time after start during which no blink is reported
    #[serde(default = "defaults::warmup_sec")]
    pub warmup_sec: f64,
}

/// Rolling display window
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DisplayConfig {
    /// Length of the rolling display window in seconds
    #[serde(default = "defaults::window_sec")]
    pub window_sec: f64,
}

/// Default value providers using constants
mod defaults {
    use crate::config::constants::*;

    pub fn serial_port() -> String { device::DEFAULT_SERIAL_PORT.to_string() }
    pub fn channel_index() -> usize { device::DEFAULT_CHANNEL_INDEX }

    pub fn low_cutoff_hz() -> f64 { filter::DEFAULT_LOW_CUTOFF_HZ }
    pub fn high_cutoff_hz() -> f64 { filter::DEFAULT_HIGH_CUTOFF_HZ }
    pub fn filter_order() -> usize { filter::DEFAULT_ORDER }

    pub fn block_sec() -> f64 { detection::DEFAULT_BLOCK_SEC }
    pub fn threshold_uv() -> f64 { detection::DEFAULT_THRESHOLD_UV }
    pub fn refractory_sec() -> f64 { detection::DEFAULT_REFRACTORY_SEC }
    pub fn warmup_sec() -> f64 { detection::DEFAULT_WARMUP_SEC }

    pub fn window_sec() -> f64 { display::DEFAULT_WINDOW_SEC }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            serial_port: defaults::serial_port(),
            channel_index: defaults::channel_index(),
            ingestion: IngestionMode::default(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            low_cutoff_hz: defaults::low_cutoff_hz(),
            high_cutoff_hz: defaults::high_cutoff_hz(),
            order: defaults::filter_order(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            block_sec: defaults::block_sec(),
            threshold_uv: defaults::threshold_uv(),
            refractory_sec: defaults::refractory_sec(),
            warmup_sec: defaults::warmup_sec(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_sec: defaults::window_sec(),
        }
    }
}

impl BlinkConfig {
    /// Rate-independent consistency checks.
    ///
    /// Passband limits against Nyquist are checked when the session knows its
    /// sample rate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        let numeric = [
            ("filter.low_cutoff_hz", self.filter.low_cutoff_hz),
            ("filter.high_cutoff_hz", self.filter.high_cutoff_hz),
            ("detection.block_sec", self.detection.block_sec),
            ("detection.threshold_uv", self.detection.threshold_uv),
            ("detection.refractory_sec", self.detection.refractory_sec),
            ("detection.warmup_sec", self.detection.warmup_sec),
            ("display.window_sec", self.display.window_sec),
        ];
        for (name, value) in numeric {
            if !value.is_finite() {
                errors.push(format!("{} must be finite, got {}", name, value));
            }
        }
        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors));
        }

        if self.filter.low_cutoff_hz <= 0.0 {
            errors.push(format!(
                "Low cutoff ({} Hz) must be positive",
                self.filter.low_cutoff_hz
            ));
        }
        if self.filter.high_cutoff_hz <= self.filter.low_cutoff_hz {
            errors.push(format!(
                "High cutoff ({} Hz) must be above low cutoff ({} Hz)",
                self.filter.high_cutoff_hz, self.filter.low_cutoff_hz
            ));
        }
        if self.filter.order == 0 || self.filter.order > filter::MAX_ORDER {
            errors.push(format!(
                "Filter order must be 1-{}, got {}",
                filter::MAX_ORDER,
                self.filter.order
            ));
        }

        if !(self.detection.block_sec > 0.0) {
            errors.push("Block duration must be positive".to_string());
        }
        if !(self.detection.threshold_uv >= 0.0) {
            errors.push("Amplitude threshold cannot be negative".to_string());
        }
        if !(self.detection.refractory_sec >= 0.0) {
            errors.push("Refractory duration cannot be negative".to_string());
        }
        if !(self.detection.warmup_sec >= 0.0) {
            errors.push("Warm-up duration cannot be negative".to_string());
        }
        if !(self.display.window_sec >= self.detection.block_sec) {
            errors.push(format!(
                "Display window ({} s) must hold at least one block ({} s)",
                self.display.window_sec, self.detection.block_sec
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_creation() {
        let config = BlinkConfig::default();
        assert_eq!(config.device.channel_index, device::DEFAULT_CHANNEL_INDEX);
        assert_eq!(config.filter.order, 4);
        assert_eq!(config.detection.threshold_uv, 300.0);
        assert_eq!(config.device.ingestion, IngestionMode::AccumulateAndSlice);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = BlinkConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: BlinkConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: BlinkConfig = toml::from_str(
            r#"
[device]
channel_index = 0
ingestion = "fixed_pull"

[detection]
threshold_uv = 250.0
"#,
        )
        .unwrap();

        assert_eq!(config.device.channel_index, 0);
        assert_eq!(config.device.ingestion, IngestionMode::FixedPull);
        assert_eq!(config.detection.threshold_uv, 250.0);
        assert_eq!(config.detection.block_sec, detection::DEFAULT_BLOCK_SEC);
        assert_eq!(config.filter, FilterConfig::default());
    }

    #[test]
    fn test_config_validation() {
        let mut config = BlinkConfig::default();
        config.filter.low_cutoff_hz = 12.0;
        config.detection.block_sec = 0.0;

        match config.validate() {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("Expected validation errors, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let mut config = BlinkConfig::default();
        config.display.window_sec = f64::INFINITY;
        config.filter.low_cutoff_hz = f64::NAN;

        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 2);
                assert!(errors[0].contains("filter.low_cutoff_hz"));
                assert!(errors[1].contains("display.window_sec"));
            }
            other => panic!("Expected validation errors, got {:?}", other),
        }
    }

    #[test]
    fn test_window_must_hold_a_block() {
        let mut config = BlinkConfig::default();
        config.display.window_sec = 0.05;
        assert!(config.validate().is_err());
    }
}
