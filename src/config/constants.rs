// src/config/constants.rs
//! System-wide configuration constants

/// Acquisition defaults (OpenBCI Cyton-class board over a serial dongle)
pub mod device {
    /// Acquisition target when none is configured
    pub const DEFAULT_SERIAL_PORT: &str = "/dev/ttyUSB0";
    /// Board sampling rate
    pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 250;
    /// Channels delivered per sample
    pub const DEFAULT_CHANNEL_COUNT: usize = 8;
    /// Channel wired to the EOG electrodes
    pub const DEFAULT_CHANNEL_INDEX: usize = 2;
}

/// Band-pass design defaults
pub mod filter {
    /// Lower band edge, removes electrode drift
    pub const DEFAULT_LOW_CUTOFF_HZ: f64 = 0.5;
    /// Upper band edge, removes EMG and mains noise
    pub const DEFAULT_HIGH_CUTOFF_HZ: f64 = 10.0;
    /// Butterworth prototype order
    pub const DEFAULT_ORDER: usize = 4;
    /// Highest prototype order accepted
    pub const MAX_ORDER: usize = 8;
}

/// Detection defaults
pub mod detection {
    /// Block duration
    pub const DEFAULT_BLOCK_SEC: f64 = 0.1;
    /// Amplitude a block peak must exceed
    pub const DEFAULT_THRESHOLD_UV: f64 = 300.0;
    /// Minimum spacing between blinks
    pub const DEFAULT_REFRACTORY_SEC: f64 = 0.5;
    /// Detection is suppressed while the filter settles
    pub const DEFAULT_WARMUP_SEC: f64 = 5.0;
    /// Upper bound on any duration once converted to samples
    pub const MAX_DURATION_SAMPLES: u64 = 1 << 24;
}

/// Display window defaults
pub mod display {
    /// Length of the rolling display window
    pub const DEFAULT_WINDOW_SEC: f64 = 6.0;
}

/// Simulated source defaults
pub mod simulation {
    /// Standard deviation of the additive noise
    pub const DEFAULT_NOISE_UV: f64 = 8.0;
    /// Baseline wander amplitude
    pub const DEFAULT_DRIFT_UV: f64 = 40.0;
    /// Baseline wander frequency
    pub const DEFAULT_DRIFT_HZ: f64 = 0.05;
    /// Peak of a simulated blink
    pub const DEFAULT_BLINK_AMPLITUDE_UV: f64 = 800.0;
    /// Gaussian sigma of a simulated blink
    pub const DEFAULT_BLINK_WIDTH_MS: f64 = 60.0;
    /// First scheduled blink, after the default warm-up
    pub const DEFAULT_FIRST_BLINK_MS: u64 = 6000;
    /// Spacing of scheduled blinks
    pub const DEFAULT_BLINK_INTERVAL_MS: u64 = 3000;
    /// Noise generator seed
    pub const DEFAULT_SEED: u64 = 0x5EED_B11C;
    /// Blink pulses are truncated beyond this many standard deviations
    pub const BLINK_SUPPORT_SIGMAS: f64 = 4.0;
}

/// Configuration file locations
pub mod paths {
    /// Project-wide configuration file
    pub const DEFAULT_CONFIG_FILE: &str = "config/blink.toml";
    /// Local overrides, merged last
    pub const LOCAL_CONFIG_FILE: &str = "blink.toml";
    /// Prefix of environment overrides
    pub const ENV_PREFIX: &str = "BLINK__";
}
