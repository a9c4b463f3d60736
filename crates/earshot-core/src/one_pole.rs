//! One-pole lowpass used to colour noise and damp reflections.
//!
//! ```text
//! y[n] = x[n] + coeff * (y[n-1] - x[n])
//! ```
//!
//! where `coeff = exp(-2π * freq / sample_rate)`.
//!
//! 6 dB/octave, zero latency, one multiply per sample.
//!
//! # Usage
//!
//! ```rust
//! use earshot_core::OnePole;
//!
//! let mut lp = OnePole::new(48000.0, 400.0);
//! let filtered = lp.process(1.0);
//! assert!(filtered < 1.0);
//! ```

use crate::flush_denormal;
use libm::expf;

/// One-pole (6 dB/oct) lowpass filter.
///
/// # Invariants
///
/// - `coeff` stays in `[0, 1)` for any positive cutoff
/// - `state` is flushed to zero when it decays into the denormal range
#[derive(Debug, Clone)]
pub struct OnePole {
    state: f32,
    coeff: f32,
    sample_rate: f32,
    freq: f32,
}

impl OnePole {
    /// Create a new one-pole lowpass filter.
    ///
    /// # Arguments
    ///
    /// * `sample_rate` - Sample rate in Hz
    /// * `freq_hz` - Cutoff frequency in Hz
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        let mut filter = Self {
            state: 0.0,
            coeff: 0.0,
            sample_rate,
            freq: freq_hz,
        };
        filter.recalculate_coeff();
        filter
    }

    /// Set the cutoff frequency and recalculate the coefficient.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.freq = freq_hz;
        self.recalculate_coeff();
    }

    /// Current cutoff in Hz.
    pub fn frequency(&self) -> f32 {
        self.freq
    }

    /// Update sample rate and recalculate the coefficient.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coeff();
    }

    /// Process one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.state = flush_denormal(input + self.coeff * (self.state - input));
        self.state
    }

    /// Reset filter state to zero.
    pub fn reset(&mut self) {
        self.state = 0.0;
    }

    fn recalculate_coeff(&mut self) {
        self.coeff = expf(-core::f32::consts::TAU * self.freq.max(0.0) / self.sample_rate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_dc() {
        let mut lp = OnePole::new(48000.0, 400.0);
        let mut out = 0.0;
        for _ in 0..48000 {
            out = lp.process(1.0);
        }
        assert!((out - 1.0).abs() < 1e-3, "DC should settle at 1.0, got {out}");
    }

    #[test]
    fn attenuates_nyquist() {
        let mut lp = OnePole::new(48000.0, 400.0);
        let mut peak = 0.0_f32;
        for i in 0..4800 {
            let x = if i % 2 == 0 { 1.0 } else { -1.0 };
            let y = lp.process(x);
            if i > 2400 {
                peak = peak.max(y.abs());
            }
        }
        assert!(peak < 0.05, "Nyquist should be heavily attenuated, got {peak}");
    }

    #[test]
    fn reset_clears_state() {
        let mut lp = OnePole::new(44100.0, 2000.0);
        lp.process(1.0);
        lp.reset();
        let first = lp.process(0.0);
        assert_eq!(first, 0.0);
    }

    #[test]
    fn frequency_round_trip() {
        let mut lp = OnePole::new(44100.0, 180.0);
        lp.set_frequency(80.0);
        assert_eq!(lp.frequency(), 80.0);
    }
}
