// src/session.rs
//! Blink detection session: owns one acquisition session and the signal path
//!
//! Each [`BlinkDetector::update`] call reads whatever the source has buffered,
//! cuts it into fixed-size blocks and runs every complete block through
//! filter -> rolling buffer -> event detector, in order. The call never waits:
//! with less than one block available it returns `Ok(false)` immediately.

use ndarray::Array2;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{BlinkConfig, SessionTiming};
use crate::error::{BlinkError, BlinkResult};
use crate::hal::AcquisitionSource;
use crate::processing::{
    BlockAssembler, EventDetector, FilterSpec, IngestionMode, RollingBuffer, StreamingFilter,
};

/// Point-in-time view of session progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionStats {
    /// Samples that went through the filter and detector
    pub samples_processed: u64,
    /// Complete blocks processed
    pub blocks_processed: u64,
    /// Samples waiting for their block to complete
    pub pending_samples: usize,
    /// Blinks accepted so far
    pub blink_count: u64,
    /// Session sample index of the most recent blink
    pub last_blink_sample: Option<u64>,
    /// True once the warm-up period has elapsed
    pub warmed_up: bool,
}

/// Streaming blink detector bound to a running acquisition session
pub struct BlinkDetector<S: AcquisitionSource> {
    source: S,
    channel_count: usize,
    channel_index: usize,
    timing: SessionTiming,
    assembler: BlockAssembler,
    filter: StreamingFilter,
    display: RollingBuffer,
    detector: EventDetector,
    blocks_processed: u64,
    running: bool,
}

impl<S: AcquisitionSource> BlinkDetector<S> {
    /// Validate `config`, design the filter and start the acquisition session.
    ///
    /// Configuration and filter errors are reported before the source is
    /// touched; a source that fails to start is surfaced as a device error.
    pub fn start(mut source: S, config: &BlinkConfig) -> BlinkResult<Self> {
        config.validate()?;

        let sample_rate = source.sample_rate();
        let channel_count = source.channel_count();
        let channel_index = config.device.channel_index;
        if channel_index >= channel_count {
            return Err(BlinkError::configuration(
                "device",
                format!(
                    "channel index {} out of range for a {}-channel source",
                    channel_index, channel_count
                ),
            ));
        }

        let timing = SessionTiming::derive(config, sample_rate)?;
        let spec = FilterSpec::butterworth_bandpass(
            sample_rate as f64,
            config.filter.low_cutoff_hz,
            config.filter.high_cutoff_hz,
            config.filter.order,
        )?;
        let assembler = BlockAssembler::new(timing.block_size, config.device.ingestion)?;

        let source_info = source.info();
        info!(
            source = %source_info.name,
            address = %source_info.address,
            "preparing acquisition session"
        );
        source
            .start_session()
            .map_err(|e| BlinkError::device("start_session", e))?;

        info!(
            sample_rate_hz = sample_rate,
            channel = channel_index,
            block_size = timing.block_size,
            window_samples = timing.window_samples,
            refractory_samples = timing.refractory_samples,
            warmup_samples = timing.warmup_samples,
            ingestion = ?config.device.ingestion,
            "blink session started"
        );

        Ok(Self {
            source,
            channel_count,
            channel_index,
            assembler,
            filter: StreamingFilter::new(spec),
            display: RollingBuffer::new(timing.window_samples),
            detector: EventDetector::new(timing.detector_params()),
            timing,
            blocks_processed: 0,
            running: true,
        })
    }

    /// Process every block that became complete since the last call.
    ///
    /// Returns `true` if at least one block fired a blink event.
    pub fn update(&mut self) -> BlinkResult<bool> {
        if !self.running {
            return Err(BlinkError::NotRunning);
        }

        let batch = self.read_batch()?;
        if batch.ncols() == 0 {
            return Ok(false);
        }
        // Every batch must match the channel layout reported at start
        if batch.nrows() != self.channel_count {
            return Err(BlinkError::InvalidData {
                data_type: "sample matrix".to_string(),
                reason: "acquisition batch has the wrong channel count".to_string(),
                expected: format!("{} channels", self.channel_count),
                actual: format!("{} channels", batch.nrows()),
            });
        }

        let blocks = self
            .assembler
            .ingest(batch.row(self.channel_index).iter().copied());
        if blocks.len() > 1 {
            debug!(
                blocks = blocks.len(),
                pending = self.assembler.pending_len(),
                "draining backlog"
            );
        }

        let mut detected = false;
        for block in &blocks {
            detected |= self.process_block(block);
        }
        Ok(detected)
    }

    fn read_batch(&mut self) -> BlinkResult<Array2<f64>> {
        match self.assembler.mode() {
            IngestionMode::AccumulateAndSlice => self
                .source
                .read_available()
                .map_err(|e| BlinkError::device("read_available", e)),
            IngestionMode::FixedPull => {
                let n = self.assembler.pull_size();
                self.source
                    .read_exact(n)
                    .map_err(|e| BlinkError::device("read_exact", e))
            }
        }
    }

    fn process_block(&mut self, raw: &[f64]) -> bool {
        let filtered = self.filter.process_block(raw);
        self.display.push_block(&filtered);
        self.blocks_processed += 1;

        let detected = self.detector.process_block(&filtered);
        if detected {
            let state = self.detector.state();
            info!(
                sample = state.last_blink_sample,
                count = state.blink_count,
                "blink detected"
            );
        }
        detected
    }

    /// Release the acquisition session. Stopping twice is a no-op.
    ///
    /// If the source fails to release, the session stays running so a later
    /// `stop` (or the drop of the detector) retries the release.
    pub fn stop(&mut self) -> BlinkResult<()> {
        if !self.running {
            debug!("stop requested on a session that is not running");
            return Ok(());
        }

        self.source
            .stop_session()
            .map_err(|e| BlinkError::device("stop_session", e))?;
        self.running = false;

        info!(
            samples = self.detector.state().global_sample_counter,
            blinks = self.detector.state().blink_count,
            "blink session closed"
        );
        Ok(())
    }

    /// Most recent window of filtered signal, oldest sample first
    pub fn rolling_buffer(&self) -> Vec<f64> {
        self.display.snapshot()
    }

    /// Blinks accepted since the session started
    pub fn blink_count(&self) -> u64 {
        self.detector.state().blink_count
    }

    /// False once the acquisition session has been released
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Snapshot of counters and detector state
    pub fn stats(&self) -> SessionStats {
        let state = self.detector.state();
        SessionStats {
            samples_processed: state.global_sample_counter,
            blocks_processed: self.blocks_processed,
            pending_samples: self.assembler.pending_len(),
            blink_count: state.blink_count,
            last_blink_sample: state.last_blink_sample,
            warmed_up: self.detector.is_warmed_up(),
        }
    }

    /// Sample-domain durations derived at start
    pub fn timing(&self) -> &SessionTiming {
        &self.timing
    }

    /// Band-pass design in use
    pub fn filter_spec(&self) -> &FilterSpec {
        self.filter.spec()
    }

    /// The owned acquisition source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the source, e.g. to feed a scripted source
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

impl<S: AcquisitionSource> Drop for BlinkDetector<S> {
    fn drop(&mut self) {
        if self.running {
            if let Err(e) = self.stop() {
                warn!(error = %e, "failed to release acquisition session on drop");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{MemorySource, SourceError};

    fn config() -> BlinkConfig {
        BlinkConfig::default()
    }

    #[test]
    fn test_start_and_stop() {
        let mut session = BlinkDetector::start(MemorySource::new(8, 250), &config()).unwrap();
        assert!(session.is_running());
        assert!(session.source().is_running());
        assert_eq!(session.rolling_buffer().len(), 1500);

        session.stop().unwrap();
        assert!(!session.source().is_running());
        session.stop().unwrap();
        assert!(matches!(session.update(), Err(BlinkError::NotRunning)));
    }

    #[test]
    fn test_connection_failure_is_surfaced() {
        let source = MemorySource::new(8, 250).failing_start("/dev/ttyUSB0");
        match BlinkDetector::start(source, &config()) {
            Err(BlinkError::Device { operation, .. }) => assert_eq!(operation, "start_session"),
            Err(other) => panic!("Expected device error, got {}", other),
            Ok(_) => panic!("Expected device error"),
        }
    }

    #[test]
    fn test_invalid_filter_rejected_before_start() {
        let mut config = config();
        config.filter.high_cutoff_hz = 200.0;

        // Would fail to connect, but the filter check comes first
        let source = MemorySource::new(8, 250).failing_start("/dev/ttyUSB0");
        assert!(matches!(
            BlinkDetector::start(source, &config),
            Err(BlinkError::Filter(_))
        ));
    }

    #[test]
    fn test_channel_out_of_range() {
        let mut config = config();
        config.device.channel_index = 4;
        assert!(matches!(
            BlinkDetector::start(MemorySource::new(4, 250), &config),
            Err(BlinkError::Configuration { .. })
        ));
    }

    #[test]
    fn test_update_without_data() {
        let mut session = BlinkDetector::start(MemorySource::new(8, 250), &config()).unwrap();
        assert!(!session.update().unwrap());

        session.source_mut().feed_channel(2, &[1.0; 10]).unwrap();
        assert!(!session.update().unwrap());
        assert_eq!(session.stats().pending_samples, 10);
        assert_eq!(session.stats().samples_processed, 0);
    }

    #[test]
    fn test_stats_track_blocks() {
        let mut session = BlinkDetector::start(MemorySource::new(8, 250), &config()).unwrap();
        session.source_mut().feed_channel(2, &[0.0; 110]).unwrap();
        session.update().unwrap();

        let stats = session.stats();
        assert_eq!(stats.blocks_processed, 4);
        assert_eq!(stats.samples_processed, 100);
        assert_eq!(stats.pending_samples, 10);
        assert!(!stats.warmed_up);
    }

    #[test]
    fn test_failed_release_keeps_session_running() {
        let mut session = BlinkDetector::start(MemorySource::new(8, 250), &config()).unwrap();
        session.source_mut().stop_session().unwrap();

        match session.stop() {
            Err(BlinkError::Device { operation, .. }) => assert_eq!(operation, "stop_session"),
            other => panic!("Expected device error, got {:?}", other),
        }
        assert!(session.is_running());

        // Once the source can release again, a second stop succeeds
        session.source_mut().start_session().unwrap();
        session.stop().unwrap();
        assert!(!session.is_running());
        assert!(!session.source().is_running());
    }

    #[test]
    fn test_source_error_propagates() {
        let mut session = BlinkDetector::start(MemorySource::new(8, 250), &config()).unwrap();
        // Stopping the source behind the session's back makes reads fail
        session.source_mut().stop_session().unwrap();

        match session.update() {
            Err(BlinkError::Device { operation, source }) => {
                assert_eq!(operation, "read_available");
                assert_eq!(source.to_string(), SourceError::NotStarted.to_string());
            }
            other => panic!("Expected device error, got {:?}", other.map(|_| ())),
        }
    }
}
