//! Fixed-capacity biquad cascade.
//!
//! Section order is fixed: high-pass, low-pass, then each peak band in the
//! order the profile declares them. Each section runs over the whole block
//! before the next one starts.
//!
//! Reconfiguring installs fresh coefficients and clears every section's
//! memory. There is no crossfade, so switching profiles mid-signal produces
//! an audible transient.

use earshot_core::{
    BiquadCoefficients, BiquadState, MAX_CHANNELS, ProcessSpec, Stage, biquad::BUTTERWORTH_Q,
};

use crate::profile::{EnvironmentProfile, MAX_FILTER_SECTIONS};

/// Lowest cutoff or center frequency the chain designs for.
pub const MIN_FREQUENCY_HZ: f32 = 10.0;

/// Highest cutoff, as a fraction of the sample rate.
pub const MAX_FREQUENCY_RATIO: f32 = 0.49;

/// One slot of the chain: shared coefficients, per-channel state.
#[derive(Debug, Clone, Copy, Default)]
struct FilterSection {
    coeffs: BiquadCoefficients,
    state: [BiquadState; MAX_CHANNELS],
}

impl FilterSection {
    fn install(&mut self, coeffs: BiquadCoefficients) {
        self.coeffs = coeffs;
        self.clear();
    }

    fn clear(&mut self) {
        for state in &mut self.state {
            state.clear();
        }
    }
}

/// High-pass, low-pass and peaking sections in series.
#[derive(Debug, Clone)]
pub struct FilterChain {
    sections: [FilterSection; MAX_FILTER_SECTIONS],
    active: usize,
    sample_rate: f32,
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterChain {
    /// Create an empty chain at 44.1 kHz.
    pub fn new() -> Self {
        Self {
            sections: [FilterSection::default(); MAX_FILTER_SECTIONS],
            active: 0,
            sample_rate: 44100.0,
        }
    }

    /// Design the sections for `profile` at the prepared sample rate.
    ///
    /// With `windows_down` the high-pass is raised to the windows-down floor.
    /// All previous filter memory is discarded.
    pub fn configure(&mut self, profile: &EnvironmentProfile, windows_down: bool) {
        let sr = self.sample_rate;
        let highpass = clamp_to_rate(profile.effective_highpass(windows_down), sr);
        let lowpass = clamp_to_rate(profile.lowpass_hz, sr);

        self.sections[0].install(BiquadCoefficients::highpass(highpass, BUTTERWORTH_Q, sr));
        self.sections[1].install(BiquadCoefficients::lowpass(lowpass, BUTTERWORTH_Q, sr));

        let bands = profile.active_bands();
        for (section, band) in self.sections[2..].iter_mut().zip(bands) {
            let freq = clamp_to_rate(band.frequency, sr);
            section.install(BiquadCoefficients::peaking(freq, band.q, band.gain_db, sr));
        }
        for section in &mut self.sections[2 + bands.len()..] {
            section.install(BiquadCoefficients::IDENTITY);
        }
        self.active = 2 + bands.len();
    }

    /// Disable every section.
    pub fn clear_sections(&mut self) {
        for section in &mut self.sections {
            section.install(BiquadCoefficients::IDENTITY);
        }
        self.active = 0;
    }

    /// Number of sections that run per block.
    pub fn active_sections(&self) -> usize {
        self.active
    }

    /// Coefficients of section `index`, if active.
    pub fn coefficients(&self, index: usize) -> Option<&BiquadCoefficients> {
        (index < self.active).then(|| &self.sections[index].coeffs)
    }
}

/// Clamp a cutoff or center frequency into `[MIN_FREQUENCY_HZ, 0.49 * sr]`.
fn clamp_to_rate(freq: f32, sample_rate: f32) -> f32 {
    let upper = (sample_rate * MAX_FREQUENCY_RATIO).max(MIN_FREQUENCY_HZ);
    freq.clamp(MIN_FREQUENCY_HZ, upper)
}

impl Stage for FilterChain {
    fn prepare(&mut self, spec: &ProcessSpec) {
        self.sample_rate = spec.sample_rate;
        self.clear_sections();
    }

    fn reset(&mut self) {
        for section in &mut self.sections {
            section.clear();
        }
    }

    fn process(&mut self, channels: &mut [&mut [f32]]) {
        for section in &mut self.sections[..self.active] {
            for (state, channel) in section.state.iter_mut().zip(channels.iter_mut()) {
                state.process_block(&section.coeffs, channel);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::PROFILES;

    fn prepared(sample_rate: f32) -> FilterChain {
        let mut chain = FilterChain::new();
        chain.prepare(&ProcessSpec::new(sample_rate, 512, 2));
        chain
    }

    #[test]
    fn section_count_follows_profile() {
        let mut chain = prepared(44100.0);
        chain.configure(&PROFILES[1], false);
        assert_eq!(chain.active_sections(), 8);
        chain.configure(&PROFILES[2], false);
        assert_eq!(chain.active_sections(), 7);
        assert!(chain.coefficients(7).is_none());
    }

    #[test]
    fn unconfigured_chain_is_transparent() {
        let mut chain = prepared(44100.0);
        let mut left = [0.25, -0.5, 1.0];
        chain.process(&mut [&mut left[..]]);
        assert_eq!(left, [0.25, -0.5, 1.0]);
    }

    #[test]
    fn cutoffs_above_nyquist_stay_stable() {
        // 20 kHz low-pass at 32 kHz would sit above Nyquist unclamped
        let mut chain = prepared(32000.0);
        let wide = EnvironmentProfile {
            lowpass_hz: 20000.0,
            ..PROFILES[3]
        };
        chain.configure(&wide, false);
        for i in 0..chain.active_sections() {
            assert!(chain.coefficients(i).is_some_and(|c| c.is_finite()));
        }

        let mut signal: Vec<f32> = (0..4096).map(|i| if i % 3 == 0 { 1.0 } else { -0.5 }).collect();
        chain.process(&mut [&mut signal[..]]);
        assert!(signal.iter().all(|s| s.is_finite() && s.abs() < 10.0));
    }

    #[test]
    fn reconfigure_clears_memory() {
        let mut chain = prepared(44100.0);
        chain.configure(&PROFILES[1], false);
        let mut burst = vec![1.0; 256];
        chain.process(&mut [&mut burst[..]]);

        chain.configure(&PROFILES[1], false);
        let mut silence = vec![0.0; 64];
        chain.process(&mut [&mut silence[..]]);
        assert!(silence.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn channels_run_independently() {
        let mut chain = prepared(44100.0);
        chain.configure(&PROFILES[3], false);
        let mut left: Vec<f32> = (0..128).map(|i| (i as f32 * 0.1).sin()).collect();
        let mut right = vec![0.0; 128];
        chain.process(&mut [&mut left[..], &mut right[..]]);
        assert!(right.iter().all(|&s| s == 0.0));
    }
}
