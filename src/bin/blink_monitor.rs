//! Blink monitor
//!
//! Runs a blink session against the real-time EOG simulator and logs every
//! detected blink.
//!
//! # Usage
//!
//! ```bash
//! # Defaults, 30 seconds
//! blink-monitor
//!
//! # Custom configuration, 20 polls per second, run for two minutes
//! blink-monitor --config blink.toml --fps 20 --duration 120
//! ```

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blink_core::{
    BlinkConfig, BlinkDetector, ConfigLoader, SimulatedEogSource, SimulatorConfig,
};

/// Streaming EOG blink monitor
#[derive(Parser, Debug)]
#[command(name = "blink-monitor")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file; the default locations are searched when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Polls per second
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Seconds to run before stopping
    #[arg(short, long, default_value_t = 30)]
    duration: u64,

    /// Simulated noise level in microvolts
    #[arg(long)]
    noise_uv: Option<f64>,
}

fn load_config(path: Option<PathBuf>) -> Result<BlinkConfig, blink_core::ConfigError> {
    match path {
        Some(path) => ConfigLoader::load_file(path),
        None => ConfigLoader::new().load(),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blink_core=info,blink_monitor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config)?;

    let mut sim_config = SimulatorConfig {
        eog_channel: config.device.channel_index,
        address: config.device.serial_port.clone(),
        ..SimulatorConfig::default()
    };
    if let Some(noise_uv) = cli.noise_uv {
        sim_config.noise_uv = noise_uv;
    }
    let source = SimulatedEogSource::realtime(sim_config)?;

    let mut detector = BlinkDetector::start(source, &config)?;
    let frame = Duration::from_secs_f64(1.0 / cli.fps.max(1) as f64);
    let deadline = Instant::now() + Duration::from_secs(cli.duration);
    info!(fps = cli.fps, duration_sec = cli.duration, "monitoring");

    while Instant::now() < deadline {
        match detector.update() {
            Ok(true) => {
                let stats = detector.stats();
                info!(
                    count = stats.blink_count,
                    sample = stats.last_blink_sample,
                    "BLINK"
                );
            }
            Ok(false) => {}
            Err(e) => {
                warn!(error = %e, "update failed, stopping");
                break;
            }
        }
        thread::sleep(frame);
    }

    let stats = detector.stats();
    detector.stop()?;
    info!(
        blinks = stats.blink_count,
        samples = stats.samples_processed,
        "monitor finished"
    );
    Ok(())
}
