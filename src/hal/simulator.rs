//! Synthetic EOG acquisition source
//!
//! Samples become readable as the injected clock advances, so a session driven
//! by a [`MockTimeProvider`](crate::utils::MockTimeProvider) is fully
//! deterministic while the monitor binary runs against the monotonic clock.

use std::sync::Arc;

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::constants::{device, simulation};
use crate::hal::traits::AcquisitionSource;
use crate::hal::types::{SourceError, SourceInfo};
use crate::utils::time::{MonotonicTimeProvider, TimeProvider};

/// When simulated blinks occur, relative to session start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum BlinkSchedule {
    /// No blinks, noise and drift only
    Never,
    /// Periodic blinks
    Interval {
        /// Centre of the first blink
        first_ms: u64,
        /// Spacing between blink centres
        every_ms: u64,
    },
    /// Blinks centred at the listed offsets
    At {
        /// Blink centres, in milliseconds
        times_ms: Vec<u64>,
    },
}

/// Simulator configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulatorConfig {
    /// Samples per second per channel
    pub sample_rate_hz: u32,
    /// Rows of every batch
    pub channel_count: usize,
    /// Channel carrying the EOG waveform; the others carry noise only
    pub eog_channel: usize,
    /// Reported as the source address
    pub address: String,
    /// Standard deviation of additive Gaussian noise, in microvolts
    pub noise_uv: f64,
    /// Amplitude of a slow baseline wander, in microvolts
    pub drift_uv: f64,
    /// Baseline wander frequency in Hz
    pub drift_hz: f64,
    /// Peak of a blink in microvolts
    pub blink_amplitude_uv: f64,
    /// Gaussian width (sigma) of a blink, in milliseconds
    pub blink_width_ms: f64,
    /// When blinks occur
    pub schedule: BlinkSchedule,
    /// Noise generator seed
    pub seed: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: device::DEFAULT_SAMPLE_RATE_HZ,
            channel_count: device::DEFAULT_CHANNEL_COUNT,
            eog_channel: device::DEFAULT_CHANNEL_INDEX,
            address: device::DEFAULT_SERIAL_PORT.to_string(),
            noise_uv: simulation::DEFAULT_NOISE_UV,
            drift_uv: simulation::DEFAULT_DRIFT_UV,
            drift_hz: simulation::DEFAULT_DRIFT_HZ,
            blink_amplitude_uv: simulation::DEFAULT_BLINK_AMPLITUDE_UV,
            blink_width_ms: simulation::DEFAULT_BLINK_WIDTH_MS,
            schedule: BlinkSchedule::Interval {
                first_ms: simulation::DEFAULT_FIRST_BLINK_MS,
                every_ms: simulation::DEFAULT_BLINK_INTERVAL_MS,
            },
            seed: simulation::DEFAULT_SEED,
        }
    }
}

impl SimulatorConfig {
    /// Reject layouts and waveform parameters the generator cannot produce
    pub fn validate(&self) -> Result<(), SourceError> {
        if self.sample_rate_hz == 0 {
            return Err(SourceError::InvalidConfig("sample_rate_hz must be positive".to_string()));
        }
        if self.eog_channel >= self.channel_count {
            return Err(SourceError::InvalidConfig(format!(
                "eog_channel {} out of range for {} channels",
                self.eog_channel, self.channel_count
            )));
        }
        if self.noise_uv < 0.0 || self.blink_width_ms <= 0.0 {
            return Err(SourceError::InvalidConfig(
                "noise_uv must be non-negative and blink_width_ms positive".to_string(),
            ));
        }
        if let BlinkSchedule::Interval { every_ms: 0, .. } = self.schedule {
            return Err(SourceError::InvalidConfig("blink interval must be positive".to_string()));
        }
        Ok(())
    }
}

/// Time-driven EOG generator
pub struct SimulatedEogSource {
    config: SimulatorConfig,
    clock: Arc<dyn TimeProvider>,
    rng: StdRng,
    running: bool,
    started_at_nanos: u64,
    // Samples handed out since session start
    produced: u64,
}

impl SimulatedEogSource {
    /// Build a simulator driven by `clock`
    pub fn new(config: SimulatorConfig, clock: Arc<dyn TimeProvider>) -> Result<Self, SourceError> {
        config.validate()?;
        let rng = StdRng::seed_from_u64(config.seed);

        Ok(Self {
            config,
            clock,
            rng,
            running: false,
            started_at_nanos: 0,
            produced: 0,
        })
    }

    /// Simulator paced by the monotonic system clock
    pub fn realtime(config: SimulatorConfig) -> Result<Self, SourceError> {
        Self::new(config, Arc::new(MonotonicTimeProvider::new()))
    }

    /// Active configuration
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Samples due by now that have not been read yet
    fn available(&self) -> u64 {
        let elapsed = self.clock.now_nanos().saturating_sub(self.started_at_nanos) as u128;
        let due = elapsed * self.config.sample_rate_hz as u128 / 1_000_000_000;
        (due as u64).saturating_sub(self.produced)
    }

    /// Noise-free EOG value at a session sample index
    pub fn clean_sample(&self, index: u64) -> f64 {
        let t_ms = index as f64 * 1000.0 / self.config.sample_rate_hz as f64;
        let drift = self.config.drift_uv
            * (2.0 * std::f64::consts::PI * self.config.drift_hz * t_ms / 1000.0).sin();
        drift + self.blink_component(t_ms)
    }

    fn blink_component(&self, t_ms: f64) -> f64 {
        let sigma = self.config.blink_width_ms;
        let reach = simulation::BLINK_SUPPORT_SIGMAS * sigma;
        let pulse = |center_ms: f64| {
            let dt = t_ms - center_ms;
            if dt.abs() > reach {
                0.0
            } else {
                self.config.blink_amplitude_uv * (-(dt * dt) / (2.0 * sigma * sigma)).exp()
            }
        };

        match &self.config.schedule {
            BlinkSchedule::Never => 0.0,
            BlinkSchedule::At { times_ms } => times_ms.iter().map(|&c| pulse(c as f64)).sum(),
            BlinkSchedule::Interval { first_ms, every_ms } => {
                let first = *first_ms as f64;
                let every = *every_ms as f64;
                if t_ms < first - reach {
                    return 0.0;
                }
                let nearest = ((t_ms - first) / every).round().max(0.0);
                let mut total = 0.0;
                for k in [nearest - 1.0, nearest, nearest + 1.0] {
                    if k >= 0.0 {
                        total += pulse(first + k * every);
                    }
                }
                total
            }
        }
    }

    /// Gaussian noise via Box-Muller
    fn noise(&mut self) -> f64 {
        if self.config.noise_uv == 0.0 {
            return 0.0;
        }
        let u1: f64 = self.rng.gen_range(f64::EPSILON..1.0);
        let u2: f64 = self.rng.gen::<f64>();
        self.config.noise_uv * (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    fn generate(&mut self, n: usize) -> Array2<f64> {
        let channels = self.config.channel_count;
        let mut out = Array2::zeros((channels, n));
        for i in 0..n {
            let index = self.produced + i as u64;
            let clean = self.clean_sample(index);
            for c in 0..channels {
                let base = if c == self.config.eog_channel { clean } else { 0.0 };
                out[[c, i]] = base + self.noise();
            }
        }
        self.produced += n as u64;
        out
    }
}

impl AcquisitionSource for SimulatedEogSource {
    type Error = SourceError;

    fn start_session(&mut self) -> Result<(), Self::Error> {
        if self.running {
            return Err(SourceError::AlreadyStarted);
        }
        self.started_at_nanos = self.clock.now_nanos();
        self.produced = 0;
        self.rng = StdRng::seed_from_u64(self.config.seed);
        self.running = true;
        debug!(address = %self.config.address, "simulated stream started");
        Ok(())
    }

    fn stop_session(&mut self) -> Result<(), Self::Error> {
        if !self.running {
            return Err(SourceError::NotStarted);
        }
        self.running = false;
        debug!(samples = self.produced, "simulated stream stopped");
        Ok(())
    }

    fn read_available(&mut self) -> Result<Array2<f64>, Self::Error> {
        if !self.running {
            return Err(SourceError::NotStarted);
        }
        let n = self.available() as usize;
        Ok(self.generate(n))
    }

    fn read_exact(&mut self, n: usize) -> Result<Array2<f64>, Self::Error> {
        if !self.running {
            return Err(SourceError::NotStarted);
        }
        let n = n.min(self.available() as usize);
        Ok(self.generate(n))
    }

    fn sample_rate(&self) -> u32 {
        self.config.sample_rate_hz
    }

    fn channel_count(&self) -> usize {
        self.config.channel_count
    }

    fn info(&self) -> SourceInfo {
        SourceInfo {
            name: "Simulated EOG".to_string(),
            address: self.config.address.clone(),
            channel_count: self.config.channel_count,
            sample_rate_hz: self.config.sample_rate_hz,
        }
    }
}
