//! Seeded noise sources.
//!
//! Both generators are deterministic for a given seed, so a rendered noise
//! bed is reproducible and tests can compare exact sequences.
//!
//! - [`WhiteNoise`] - xorshift32, uniform in `[-1, 1]`
//! - [`PinkNoise`] - Paul Kellet's economy filter bank over white noise,
//!   roughly -3 dB/octave across the audio band
//!
//! # Reference
//!
//! Paul Kellet, "Filter to make pink noise from white", music-dsp archive
//! (refined method, seven accumulators).

/// Default xorshift seed.
pub const DEFAULT_SEED: u32 = 0x1234_5678;

/// Output normalization for the Kellet sum.
const PINK_GAIN: f32 = 0.11;

/// Xorshift32 white noise generator.
#[derive(Debug, Clone)]
pub struct WhiteNoise {
    state: u32,
    seed: u32,
}

impl WhiteNoise {
    /// Create a generator. A zero seed is replaced by [`DEFAULT_SEED`]
    /// since xorshift never leaves the all-zero state.
    pub fn new(seed: u32) -> Self {
        let seed = if seed == 0 { DEFAULT_SEED } else { seed };
        Self { state: seed, seed }
    }

    /// Restart the sequence from the original seed.
    pub fn reset(&mut self) {
        self.state = self.seed;
    }

    /// Restart from a new seed.
    pub fn reseed(&mut self, seed: u32) {
        *self = Self::new(seed);
    }

    /// Next sample in `[-1, 1]`.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;

        (x as i32 as f32) / (i32::MAX as f32)
    }
}

impl Default for WhiteNoise {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

/// Kellet pink noise: seven one-pole accumulators summed over white input.
#[derive(Debug, Clone, Default)]
pub struct PinkNoise {
    b: [f32; 7],
}

impl PinkNoise {
    /// Create a filter bank with cleared accumulators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter one white sample into one pink sample.
    #[inline]
    pub fn process(&mut self, white: f32) -> f32 {
        let b = &mut self.b;
        b[0] = 0.998_86 * b[0] + white * 0.055_517_9;
        b[1] = 0.993_32 * b[1] + white * 0.075_075_9;
        b[2] = 0.969_00 * b[2] + white * 0.153_852_0;
        b[3] = 0.866_50 * b[3] + white * 0.310_485_6;
        b[4] = 0.550_00 * b[4] + white * 0.532_952_2;
        b[5] = -0.7616 * b[5] - white * 0.016_898_0;
        let pink = b[0] + b[1] + b[2] + b[3] + b[4] + b[5] + b[6] + white * 0.5362;
        b[6] = white * 0.115_926;
        pink * PINK_GAIN
    }

    /// Zero all accumulators.
    pub fn reset(&mut self) {
        self.b = [0.0; 7];
    }
}
