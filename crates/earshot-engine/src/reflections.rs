//! Early-reflection network.
//!
//! Five fixed taps model the first bounces inside a car cabin. Every input
//! sample is written into a per-channel ring buffer, the five taps are read
//! back and summed into a reflection scratch buffer, and once the block is
//! done that buffer is low-passed at 6 kHz (surface absorption) and added
//! onto the signal. The direct signal is never replaced.
//!
//! | Tap | Delay | Gain | Surface |
//! |-----|-------|------|---------|
//! | 1 | 1.2 ms | 0.35 | windshield |
//! | 2 | 2.1 ms | 0.25 | dashboard |
//! | 3 | 3.0 ms | 0.18 | side windows |
//! | 4 | 4.3 ms | 0.12 | rear window |
//! | 5 | 5.5 ms | 0.08 | rear shelf |

use earshot_core::{
    BiquadCoefficients, BiquadState, MAX_CHANNELS, ProcessSpec, Stage, TapDelay,
    biquad::BUTTERWORTH_Q, ms_to_samples,
};

/// One delayed, attenuated copy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReflectionTap {
    /// Delay in milliseconds
    pub delay_ms: f32,
    /// Linear gain
    pub gain: f32,
}

/// The fixed tap set, delays ascending and gains descending.
pub const REFLECTION_TAPS: [ReflectionTap; 5] = [
    ReflectionTap {
        delay_ms: 1.2,
        gain: 0.35,
    },
    ReflectionTap {
        delay_ms: 2.1,
        gain: 0.25,
    },
    ReflectionTap {
        delay_ms: 3.0,
        gain: 0.18,
    },
    ReflectionTap {
        delay_ms: 4.3,
        gain: 0.12,
    },
    ReflectionTap {
        delay_ms: 5.5,
        gain: 0.08,
    },
];

/// Ring buffer length, comfortably past the longest tap.
pub const DELAY_BUFFER_MS: f32 = 15.0;

/// Absorption low-pass cutoff.
pub const ABSORPTION_HZ: f32 = 6000.0;

/// Multi-tap early reflections with shared absorption filtering.
#[derive(Debug, Clone)]
pub struct EarlyReflections {
    delays: [usize; REFLECTION_TAPS.len()],
    lines: [TapDelay; MAX_CHANNELS],
    scratch: Vec<f32>,
    absorption: BiquadCoefficients,
    absorption_state: [BiquadState; MAX_CHANNELS],
}

impl Default for EarlyReflections {
    fn default() -> Self {
        Self::new()
    }
}

impl EarlyReflections {
    /// Create a network prepared for 44.1 kHz and 512-sample blocks.
    pub fn new() -> Self {
        let mut network = Self {
            delays: [0; REFLECTION_TAPS.len()],
            lines: Default::default(),
            scratch: Vec::new(),
            absorption: BiquadCoefficients::IDENTITY,
            absorption_state: [BiquadState::default(); MAX_CHANNELS],
        };
        network.prepare(&ProcessSpec::default());
        network
    }

    /// Tap delays in samples at the prepared rate.
    pub fn tap_delays(&self) -> &[usize; REFLECTION_TAPS.len()] {
        &self.delays
    }

    fn render_channel(
        line: &mut TapDelay,
        delays: &[usize; REFLECTION_TAPS.len()],
        input: &[f32],
        out: &mut [f32],
    ) {
        for (&x, y) in input.iter().zip(out.iter_mut()) {
            line.write(x);
            *y = delays
                .iter()
                .zip(&REFLECTION_TAPS)
                .map(|(&d, tap)| line.read(d) * tap.gain)
                .sum();
            line.advance();
        }
    }
}

impl Stage for EarlyReflections {
    fn prepare(&mut self, spec: &ProcessSpec) {
        let sr = spec.sample_rate;
        for (delay, tap) in self.delays.iter_mut().zip(&REFLECTION_TAPS) {
            *delay = ms_to_samples(tap.delay_ms, sr).max(1);
        }
        let longest = self.delays.iter().copied().max().unwrap_or(1);
        let capacity = ms_to_samples(DELAY_BUFFER_MS, sr).max(longest + 1);
        for line in &mut self.lines {
            line.resize(capacity);
        }

        let cutoff = ABSORPTION_HZ.min(spec.sample_rate * 0.49);
        self.absorption = BiquadCoefficients::lowpass(cutoff, BUTTERWORTH_Q, sr);
        self.scratch = vec![0.0; spec.max_block_size];
        self.reset();
    }

    fn reset(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
        for state in &mut self.absorption_state {
            state.clear();
        }
    }

    fn process(&mut self, channels: &mut [&mut [f32]]) {
        let chunk = self.scratch.len();
        if chunk == 0 {
            return;
        }

        for ((line, state), channel) in self
            .lines
            .iter_mut()
            .zip(self.absorption_state.iter_mut())
            .zip(channels.iter_mut())
        {
            for block in channel.chunks_mut(chunk) {
                let reflections = &mut self.scratch[..block.len()];
                Self::render_channel(line, &self.delays, block, reflections);
                state.process_block(&self.absorption, reflections);
                for (sample, &r) in block.iter_mut().zip(reflections.iter()) {
                    *sample += r;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepared(sample_rate: f32) -> EarlyReflections {
        let mut er = EarlyReflections::new();
        er.prepare(&ProcessSpec::new(sample_rate, 512, 2));
        er
    }

    #[test]
    fn tap_table_is_ordered() {
        for pair in REFLECTION_TAPS.windows(2) {
            assert!(pair[0].delay_ms <= pair[1].delay_ms);
            assert!(pair[0].gain >= pair[1].gain);
        }
    }

    #[test]
    fn delays_scale_with_rate() {
        assert_eq!(prepared(48000.0).tap_delays(), &[58, 101, 144, 206, 264]);
        assert_eq!(prepared(44100.0).tap_delays(), &[53, 93, 132, 190, 243]);
    }

    #[test]
    fn silence_stays_silent() {
        let mut er = prepared(44100.0);
        let mut left = vec![0.0; 512];
        let mut right = vec![0.0; 512];
        er.process(&mut [&mut left[..], &mut right[..]]);
        assert!(left.iter().chain(&right).all(|&s| s == 0.0));
    }

    #[test]
    fn direct_signal_survives_and_echoes_follow() {
        let mut er = prepared(48000.0);
        let mut buffer = vec![0.0; 512];
        buffer[0] = 1.0;
        er.process(&mut [&mut buffer[..]]);

        // no tap is shorter than one sample, so the impulse itself is untouched
        assert_eq!(buffer[0], 1.0);
        let early: f32 = buffer[1..50].iter().map(|s| s.abs()).sum();
        assert!(early < 1e-3, "energy before the first tap: {early}");
        let echoes: f32 = buffer[50..300].iter().map(|s| s.abs()).sum();
        assert!(echoes > 0.5, "reflections missing, got {echoes}");
    }

    #[test]
    fn output_independent_of_block_split() {
        let input: Vec<f32> = (0..1500).map(|i| ((i * 13 % 29) as f32 / 29.0) - 0.5).collect();

        let mut whole = input.clone();
        let mut er = prepared(44100.0);
        for block in whole.chunks_mut(512) {
            er.process(&mut [block]);
        }

        let mut pieces = input.clone();
        let mut er = prepared(44100.0);
        for block in pieces.chunks_mut(77) {
            er.process(&mut [block]);
        }

        for (a, b) in whole.iter().zip(&pieces) {
            assert!((a - b).abs() < 1e-6);
        }
    }
}
