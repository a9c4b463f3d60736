//! Feed-forward peak compressor for compressed profiles.
//!
//! # Signal Flow
//!
//! ```text
//! max |x| over channels → Envelope Follower → Gain Computer → × every channel
//! ```
//!
//! The detector is linked across channels so the stereo image does not
//! shift under gain reduction. The knee is hard and there is no makeup gain:
//! below threshold the gain is exactly 1.0, above it every dB of overshoot
//! comes out as `1 / ratio` dB.

use earshot_core::{EnvelopeFollower, ProcessSpec, Stage, db_to_linear, linear_to_db};

use crate::profile::{COMPRESSOR_ATTACK_MS, COMPRESSOR_RELEASE_MS, CompressorSettings};

/// Hard-knee gain computer.
#[derive(Debug, Clone, Copy)]
struct GainComputer {
    threshold_db: f32,
    threshold_linear: f32,
    slope: f32,
}

impl GainComputer {
    fn new(settings: CompressorSettings) -> Self {
        let ratio = settings.ratio.max(1.0);
        Self {
            threshold_db: settings.threshold_db,
            threshold_linear: db_to_linear(settings.threshold_db),
            slope: 1.0 - 1.0 / ratio,
        }
    }

    /// Linear gain for a detector level.
    #[inline]
    fn gain(&self, level: f32) -> f32 {
        if level <= self.threshold_linear {
            return 1.0;
        }
        let overshoot = linear_to_db(level) - self.threshold_db;
        db_to_linear(-overshoot * self.slope)
    }
}

/// Linked-stereo compressor with fixed attack and release.
#[derive(Debug, Clone)]
pub struct Compressor {
    computer: Option<GainComputer>,
    envelope: EnvelopeFollower,
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new(44100.0)
    }
}

impl Compressor {
    /// Create a disabled compressor.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            computer: None,
            envelope: EnvelopeFollower::with_times(
                sample_rate,
                COMPRESSOR_ATTACK_MS,
                COMPRESSOR_RELEASE_MS,
            ),
        }
    }

    /// Install settings, or disable with `None`. Clears the envelope.
    pub fn configure(&mut self, settings: Option<CompressorSettings>) {
        self.computer = settings.map(GainComputer::new);
        self.envelope.reset();
    }

    /// True when settings are installed.
    pub fn is_enabled(&self) -> bool {
        self.computer.is_some()
    }

    /// Current envelope level (linear).
    pub fn envelope_level(&self) -> f32 {
        self.envelope.level()
    }
}

impl Stage for Compressor {
    fn prepare(&mut self, spec: &ProcessSpec) {
        self.envelope.set_sample_rate(spec.sample_rate);
        self.envelope.reset();
    }

    fn reset(&mut self) {
        self.envelope.reset();
    }

    fn process(&mut self, channels: &mut [&mut [f32]]) {
        let Some(computer) = self.computer else {
            return;
        };
        let len = channels.iter().map(|ch| ch.len()).min().unwrap_or(0);

        for i in 0..len {
            let level = channels.iter().fold(0.0_f32, |acc, ch| acc.max(ch[i].abs()));
            let envelope = self.envelope.process(level);
            let gain = computer.gain(envelope);
            if gain != 1.0 {
                for channel in channels.iter_mut() {
                    channel[i] *= gain;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    fn compressor(threshold_db: f32, ratio: f32) -> Compressor {
        let mut comp = Compressor::new(SR);
        comp.prepare(&ProcessSpec::new(SR, 512, 2));
        comp.configure(Some(CompressorSettings {
            threshold_db,
            ratio,
        }));
        comp
    }

    /// Run a constant level for one second; return the last output sample.
    fn settled_output(comp: &mut Compressor, level: f32) -> f32 {
        let mut out = 0.0;
        for _ in 0..(SR as usize / 512) {
            let mut block = vec![level; 512];
            comp.process(&mut [&mut block[..]]);
            out = block[511];
        }
        out
    }

    #[test]
    fn below_threshold_is_untouched() {
        let mut comp = compressor(-12.0, 4.0);
        let input: Vec<f32> = (0..4096)
            .map(|i| 0.2 * libm::sinf(i as f32 * 0.05))
            .collect();
        let mut left = input.clone();
        let mut right = input.clone();
        comp.process(&mut [&mut left[..], &mut right[..]]);
        assert_eq!(left, input);
        assert_eq!(right, input);
    }

    #[test]
    fn overshoot_is_divided_by_ratio() {
        let mut comp = compressor(-12.0, 4.0);
        // 12 dB over threshold should come out 3 dB over
        let out = settled_output(&mut comp, db_to_linear(0.0));
        let out_db = linear_to_db(out);
        assert!((out_db - -9.0).abs() < 0.1, "expected -9 dB, got {out_db:.2}");
    }

    #[test]
    fn unity_ratio_is_transparent() {
        let mut comp = compressor(-20.0, 1.0);
        let out = settled_output(&mut comp, 0.9);
        assert!((out - 0.9).abs() < 1e-5, "got {out}");
    }

    #[test]
    fn channels_share_gain() {
        let mut comp = compressor(-12.0, 4.0);
        let mut left = vec![1.0; 2048];
        let mut right = vec![0.1; 2048];
        comp.process(&mut [&mut left[..], &mut right[..]]);
        for (l, r) in left.iter().zip(&right) {
            assert!((l / r - 10.0).abs() < 1e-3);
        }
        assert!(right[2047] < 0.1);
    }

    #[test]
    fn disabled_passes_through() {
        let mut comp = Compressor::new(SR);
        comp.configure(None);
        let mut block = vec![1.0; 64];
        comp.process(&mut [&mut block[..]]);
        assert!(block.iter().all(|&s| s == 1.0));
        assert!(!comp.is_enabled());
    }
}
