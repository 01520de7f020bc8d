// src/config/timing.rs
//! Sample-domain durations derived from a configuration and a sample rate

use serde::Serialize;

use crate::config::constants::detection::MAX_DURATION_SAMPLES;
use crate::config::BlinkConfig;
use crate::error::{BlinkError, BlinkResult};
use crate::processing::DetectorParams;

/// Durations converted to sample counts, fixed for one session.
///
/// Conversion truncates `seconds * rate` toward zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionTiming {
    /// Rate reported by the acquisition source
    pub sample_rate_hz: u32,
    /// Samples per processed block
    pub block_size: usize,
    /// Length of the rolling display window
    pub window_samples: usize,
    /// Minimum spacing between accepted blinks
    pub refractory_samples: u64,
    /// Samples during which detection is suppressed
    pub warmup_samples: u64,
    /// Amplitude threshold in microvolts
    pub threshold_uv: f64,
}

/// Truncating conversion, rejecting counts that are negative, non-finite or
/// beyond `MAX_DURATION_SAMPLES`
fn to_samples(name: &str, seconds: f64, sample_rate_hz: u32) -> BlinkResult<u64> {
    let samples = seconds * sample_rate_hz as f64;
    if !samples.is_finite() || samples < 0.0 || samples > MAX_DURATION_SAMPLES as f64 {
        return Err(BlinkError::configuration(
            "session_timing",
            format!(
                "{} of {} s at {} Hz must convert to 0..={} samples",
                name, seconds, sample_rate_hz, MAX_DURATION_SAMPLES
            ),
        ));
    }
    Ok(samples as u64)
}

impl SessionTiming {
    /// Convert the configured durations at `sample_rate_hz`
    pub fn derive(config: &BlinkConfig, sample_rate_hz: u32) -> BlinkResult<Self> {
        if sample_rate_hz == 0 {
            return Err(BlinkError::configuration(
                "session_timing",
                "acquisition source reported a zero sample rate",
            ));
        }

        let block_size = to_samples("block", config.detection.block_sec, sample_rate_hz)? as usize;
        if block_size == 0 {
            return Err(BlinkError::configuration(
                "session_timing",
                format!(
                    "block of {} s is shorter than one sample at {} Hz",
                    config.detection.block_sec, sample_rate_hz
                ),
            ));
        }

        Ok(Self {
            sample_rate_hz,
            block_size,
            window_samples: to_samples("window", config.display.window_sec, sample_rate_hz)?
                as usize,
            refractory_samples: to_samples(
                "refractory period",
                config.detection.refractory_sec,
                sample_rate_hz,
            )?,
            warmup_samples: to_samples("warm-up", config.detection.warmup_sec, sample_rate_hz)?,
            threshold_uv: config.detection.threshold_uv,
        })
    }

    /// Thresholds handed to the event detector
    pub fn detector_params(&self) -> DetectorParams {
        DetectorParams {
            threshold_uv: self.threshold_uv,
            refractory_samples: self.refractory_samples,
            warmup_samples: self.warmup_samples,
        }
    }

    /// Wall-clock length of one block in seconds
    pub fn block_duration_sec(&self) -> f64 {
        self.block_size as f64 / self.sample_rate_hz as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_timing_at_250_hz() {
        let timing = SessionTiming::derive(&BlinkConfig::default(), 250).unwrap();

        assert_eq!(timing.block_size, 25);
        assert_eq!(timing.window_samples, 1500);
        assert_eq!(timing.refractory_samples, 125);
        assert_eq!(timing.warmup_samples, 1250);
        assert_eq!(timing.threshold_uv, 300.0);
        assert!((timing.block_duration_sec() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_truncating_conversion() {
        let timing = SessionTiming::derive(&BlinkConfig::default(), 125).unwrap();

        // 0.1 s * 125 Hz = 12.5 samples
        assert_eq!(timing.block_size, 12);
        assert_eq!(timing.refractory_samples, 62);
    }

    #[test]
    fn test_oversized_durations_rejected() {
        let mut config = BlinkConfig::default();
        config.display.window_sec = 1.0e9;
        match SessionTiming::derive(&config, 250) {
            Err(BlinkError::Configuration { reason, .. }) => assert!(reason.contains("window")),
            other => panic!("Expected configuration error, got {:?}", other),
        }

        let mut config = BlinkConfig::default();
        config.detection.warmup_sec = f64::INFINITY;
        assert!(SessionTiming::derive(&config, 250).is_err());

        // Largest window still accepted
        let mut config = BlinkConfig::default();
        config.display.window_sec = (MAX_DURATION_SAMPLES / 256) as f64;
        let timing = SessionTiming::derive(&config, 256).unwrap();
        assert_eq!(timing.window_samples as u64, MAX_DURATION_SAMPLES);
    }

    #[test]
    fn test_degenerate_rates_rejected() {
        assert!(SessionTiming::derive(&BlinkConfig::default(), 0).is_err());
        assert!(SessionTiming::derive(&BlinkConfig::default(), 5).is_err());
    }
}
