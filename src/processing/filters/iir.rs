// src/processing/filters/iir.rs
//! IIR (Infinite Impulse Response) band-pass filter with streaming state
//!
//! The Butterworth band-pass is designed as a cascade of second-order sections:
//! analog low-pass prototype poles are mapped through the low-pass to band-pass
//! transform, then through the bilinear transform with pre-warped band edges.
//! Each section carries its own transposed Direct Form II delay line, so a
//! [`StreamingFilter`] fed block by block produces exactly the output of one
//! pass over the concatenated signal.

use std::f64::consts::PI;

use rustfft::num_complex::Complex64;

use super::FilterError;
use crate::config::constants::filter::MAX_ORDER;

const REAL_POLE_EPSILON: f64 = 1e-12;

/// Second-order section coefficients, normalized so that `a[0] == 1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    /// Numerator
    pub b: [f64; 3],
    /// Denominator, `a[0] == 1.0`
    pub a: [f64; 3],
}

impl Biquad {
    /// Complex response at normalized angular frequency `omega` (rad/sample)
    fn response(&self, omega: f64) -> Complex64 {
        let z_inv = Complex64::from_polar(1.0, -omega);
        let z_inv2 = z_inv * z_inv;
        let num = Complex64::new(self.b[0], 0.0) + z_inv * self.b[1] + z_inv2 * self.b[2];
        let den = Complex64::new(self.a[0], 0.0) + z_inv * self.a[1] + z_inv2 * self.a[2];
        num / den
    }

    /// Bilinear-transformed section with one zero at DC and one at Nyquist.
    /// Gain is left at unity and normalized by the caller.
    fn from_analog_poles(p1: Complex64, p2: Complex64, sample_rate: f64) -> Self {
        let k = Complex64::new(2.0 * sample_rate, 0.0);
        let z1 = (k + p1) / (k - p1);
        let z2 = (k + p2) / (k - p2);

        Self {
            b: [1.0, 0.0, -1.0],
            a: [1.0, -(z1 + z2).re, (z1 * z2).re],
        }
    }
}

/// Immutable band-pass design derived once per session
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    sample_rate: f64,
    low_cutoff_hz: f64,
    high_cutoff_hz: f64,
    order: usize,
    sections: Vec<Biquad>,
}

impl FilterSpec {
    /// Design a Butterworth band-pass of the given prototype order.
    ///
    /// The resulting transfer function has `2 * order` poles, matching the
    /// convention of classic band-pass design tools. Requires
    /// `0 < low_cutoff_hz < high_cutoff_hz < sample_rate / 2` and `1 <= order <= 8`.
    pub fn butterworth_bandpass(
        sample_rate: f64,
        low_cutoff_hz: f64,
        high_cutoff_hz: f64,
        order: usize,
    ) -> Result<Self, FilterError> {
        if order == 0 || order > MAX_ORDER {
            return Err(FilterError::InvalidParameters(format!(
                "Order must be 1-{}, got {}",
                MAX_ORDER, order
            )));
        }
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(FilterError::InvalidParameters(format!(
                "Sample rate must be positive, got {}",
                sample_rate
            )));
        }
        let nyquist = sample_rate / 2.0;
        if !(low_cutoff_hz > 0.0 && low_cutoff_hz < nyquist) {
            return Err(FilterError::InvalidParameters(format!(
                "Low cutoff {} Hz must lie in (0, {}) Hz",
                low_cutoff_hz, nyquist
            )));
        }
        if !(high_cutoff_hz > 0.0 && high_cutoff_hz < nyquist) {
            return Err(FilterError::InvalidParameters(format!(
                "High cutoff {} Hz must lie in (0, {}) Hz",
                high_cutoff_hz, nyquist
            )));
        }
        if low_cutoff_hz >= high_cutoff_hz {
            return Err(FilterError::InvalidParameters(format!(
                "Low cutoff ({} Hz) must be below high cutoff ({} Hz)",
                low_cutoff_hz, high_cutoff_hz
            )));
        }

        let sections = Self::design_sections(sample_rate, low_cutoff_hz, high_cutoff_hz, order)?;

        Ok(Self {
            sample_rate,
            low_cutoff_hz,
            high_cutoff_hz,
            order,
            sections,
        })
    }

    fn design_sections(
        sample_rate: f64,
        low_cutoff_hz: f64,
        high_cutoff_hz: f64,
        order: usize,
    ) -> Result<Vec<Biquad>, FilterError> {
        // Pre-warp band edges for the bilinear transform
        let warp = |hz: f64| 2.0 * sample_rate * (PI * hz / sample_rate).tan();
        let w_low = warp(low_cutoff_hz);
        let w_high = warp(high_cutoff_hz);
        let w0 = (w_low * w_high).sqrt();
        let bandwidth = w_high - w_low;

        let mut sections = Vec::with_capacity(order);
        for k in 0..order {
            let theta = PI * (2 * k + order + 1) as f64 / (2 * order) as f64;
            let prototype = Complex64::from_polar(1.0, theta);

            // Lower half-plane poles are covered by their conjugates
            if prototype.im < -REAL_POLE_EPSILON {
                continue;
            }

            // s^2 - p*bw*s + w0^2 = 0 for each prototype pole p
            let pb = prototype * bandwidth;
            let disc = (pb * pb - 4.0 * w0 * w0).sqrt();
            let r1 = (pb + disc) / 2.0;
            let r2 = (pb - disc) / 2.0;

            if prototype.im.abs() <= REAL_POLE_EPSILON {
                sections.push(Biquad::from_analog_poles(r1, r2, sample_rate));
            } else {
                sections.push(Biquad::from_analog_poles(r1, r1.conj(), sample_rate));
                sections.push(Biquad::from_analog_poles(r2, r2.conj(), sample_rate));
            }
        }

        // Unity gain at the (digital) geometric center frequency
        let omega_center = 2.0 * (w0 / (2.0 * sample_rate)).atan();
        for section in &mut sections {
            let magnitude = section.response(omega_center).norm();
            if !magnitude.is_finite() || magnitude <= 0.0 {
                return Err(FilterError::InvalidCoefficients(
                    "Section gain at center frequency is degenerate".to_string(),
                ));
            }
            for b in &mut section.b {
                *b /= magnitude;
            }
        }

        Ok(sections)
    }

    /// Cascade of second-order sections used for processing
    pub fn sections(&self) -> &[Biquad] {
        &self.sections
    }

    /// Expanded numerator of the overall transfer function
    pub fn b(&self) -> Vec<f64> {
        self.sections
            .iter()
            .fold(vec![1.0], |acc, section| convolve(&acc, &section.b))
    }

    /// Expanded denominator of the overall transfer function (`a[0] == 1.0`)
    pub fn a(&self) -> Vec<f64> {
        self.sections
            .iter()
            .fold(vec![1.0], |acc, section| convolve(&acc, &section.a))
    }

    /// Magnitude response at `frequency_hz`
    pub fn frequency_response(&self, frequency_hz: f64) -> f64 {
        let omega = 2.0 * PI * frequency_hz / self.sample_rate;
        self.sections
            .iter()
            .map(|section| section.response(omega).norm())
            .product()
    }

    /// Design sample rate in Hz
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Band edges `(low, high)` in Hz
    pub fn passband(&self) -> (f64, f64) {
        (self.low_cutoff_hz, self.high_cutoff_hz)
    }

    /// Prototype order requested at design time
    pub fn order(&self) -> usize {
        self.order
    }
}

fn convolve(x: &[f64], h: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; x.len() + h.len() - 1];
    for (i, &xi) in x.iter().enumerate() {
        for (j, &hj) in h.iter().enumerate() {
            out[i + j] += xi * hj;
        }
    }
    out
}

/// Delay-line state of every section, zero at session start
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    delays: Vec<[f64; 2]>,
}

impl FilterState {
    fn zeroed(sections: usize) -> Self {
        Self {
            delays: vec![[0.0; 2]; sections],
        }
    }

    /// True until the filter has seen a non-zero input
    pub fn is_zero(&self) -> bool {
        self.delays.iter().all(|d| d[0] == 0.0 && d[1] == 0.0)
    }
}

/// Causal band-pass filter whose state persists across processed blocks
#[derive(Debug, Clone)]
pub struct StreamingFilter {
    spec: FilterSpec,
    state: FilterState,
}

impl StreamingFilter {
    /// Zeroed state, as if preceded by silence
    pub fn new(spec: FilterSpec) -> Self {
        let state = FilterState::zeroed(spec.sections.len());
        Self { spec, state }
    }

    /// Process a single sample through every section (transposed Direct Form II)
    #[inline]
    pub fn process_sample(&mut self, input: f64) -> f64 {
        let mut x = input;
        for (section, delay) in self.spec.sections.iter().zip(self.state.delays.iter_mut()) {
            let y = section.b[0] * x + delay[0];
            delay[0] = section.b[1] * x - section.a[1] * y + delay[1];
            delay[1] = section.b[2] * x - section.a[2] * y;
            x = y;
        }
        x
    }

    /// Filter one block, continuing from the state left by the previous block
    pub fn process_block(&mut self, block: &[f64]) -> Vec<f64> {
        block.iter().map(|&x| self.process_sample(x)).collect()
    }

    /// Design in use
    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    /// Per-section delay state
    pub fn state(&self) -> &FilterState {
        &self.state
    }
}
