//! Blink-Core: streaming eye-blink detection from EOG signals
//!
//! The library reads one electrooculogram channel from an acquisition source,
//! band-passes it with a stateful Butterworth filter and reports a blink when
//! a block of filtered signal exceeds an amplitude threshold outside the
//! warm-up and refractory periods. It provides:
//!
//! - An acquisition trait with simulated, in-memory and channel-fed sources
//! - Block assembly with two ingestion strategies
//! - A rolling window of filtered signal for display
//! - Layered TOML and environment configuration
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use blink_core::{BlinkConfig, BlinkDetector, SimulatedEogSource, SimulatorConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = SimulatedEogSource::realtime(SimulatorConfig::default())?;
//!     let mut detector = BlinkDetector::start(source, &BlinkConfig::default())?;
//!
//!     for _ in 0..100 {
//!         if detector.update()? {
//!             println!("blink #{}", detector.blink_count());
//!         }
//!         std::thread::sleep(std::time::Duration::from_millis(50));
//!     }
//!
//!     detector.stop()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod error;
pub mod hal;
pub mod processing;
pub mod session;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{BlinkConfig, ConfigError, ConfigLoader, SessionTiming};
pub use error::{BlinkError, BlinkResult};
pub use hal::{
    AcquisitionSource, BlinkSchedule, ChannelFeeder, ChannelSource, MemorySource,
    SimulatedEogSource, SimulatorConfig, SourceError, SourceInfo,
};
pub use processing::{FilterSpec, IngestionMode, StreamingFilter};
pub use session::{BlinkDetector, SessionStats};
pub use utils::{MockTimeProvider, MonotonicTimeProvider, TimeProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "blink-core");
    }
}
