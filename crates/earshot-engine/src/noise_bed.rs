//! Ambient noise bed: road rumble, hum and city ambience.
//!
//! Each sample draws one white value and one pink value (Kellet filter over
//! a second, independent white stream) and shapes three layers from them:
//!
//! | Layer | Source | Shaping | Mix |
//! |-------|--------|---------|-----|
//! | road | pink | one-pole low-pass 400 Hz | 0.45 |
//! | hum | white | low-pass 180 Hz minus its own low-pass 80 Hz | 0.30 |
//! | ambience | ½ pink + ½ white | one-pole low-pass 2 kHz | 0.25 |
//!
//! The mixed layer is scaled by `amount² × 0.25` and added to every channel.
//! At amounts at or below [`SILENCE_AMOUNT`] nothing is generated.

use earshot_core::{OnePole, PinkNoise, ProcessSpec, Stage, WhiteNoise, noise::DEFAULT_SEED};

/// Road layer low-pass cutoff.
pub const ROAD_HZ: f32 = 400.0;
/// Upper edge of the hum band.
pub const HUM_HIGH_HZ: f32 = 180.0;
/// Lower edge of the hum band.
pub const HUM_LOW_HZ: f32 = 80.0;
/// Ambience layer low-pass cutoff.
pub const AMBIENCE_HZ: f32 = 2000.0;

/// Road layer weight.
pub const ROAD_MIX: f32 = 0.45;
/// Hum layer weight.
pub const HUM_MIX: f32 = 0.30;
/// Ambience layer weight.
pub const AMBIENCE_MIX: f32 = 0.25;

/// Output scale at full amount.
pub const NOISE_CEILING: f32 = 0.25;

/// Amounts at or below this skip generation entirely.
pub const SILENCE_AMOUNT: f32 = 0.0001;

/// Linear gain for a noise amount: quadratic taper up to [`NOISE_CEILING`].
#[inline]
pub fn noise_gain(amount: f32) -> f32 {
    let amount = amount.clamp(0.0, 1.0);
    amount * amount * NOISE_CEILING
}

/// Seed for the pink layer's white source, decorrelated from the hum source.
pub fn pink_seed(seed: u32) -> u32 {
    seed.rotate_left(16) ^ 0x9E37_79B9
}

/// Correlated noise generator shared by all output channels.
#[derive(Debug, Clone)]
pub struct NoiseSynth {
    amount: f32,
    seed: u32,
    white: WhiteNoise,
    pink_source: WhiteNoise,
    pink: PinkNoise,
    road: OnePole,
    hum_high: OnePole,
    hum_low: OnePole,
    ambience: OnePole,
    scratch: Vec<f32>,
}

impl Default for NoiseSynth {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl NoiseSynth {
    /// Create a silent generator at 44.1 kHz with the given seed.
    pub fn new(seed: u32) -> Self {
        let sr = 44100.0;
        Self {
            amount: 0.0,
            seed,
            white: WhiteNoise::new(seed),
            pink_source: WhiteNoise::new(pink_seed(seed)),
            pink: PinkNoise::new(),
            road: OnePole::new(sr, ROAD_HZ),
            hum_high: OnePole::new(sr, HUM_HIGH_HZ),
            hum_low: OnePole::new(sr, HUM_LOW_HZ),
            ambience: OnePole::new(sr, AMBIENCE_HZ),
            scratch: Vec::new(),
        }
    }

    /// Set the amount in `[0, 1]`.
    pub fn set_amount(&mut self, amount: f32) {
        self.amount = amount.clamp(0.0, 1.0);
    }

    /// Current amount.
    pub fn amount(&self) -> f32 {
        self.amount
    }

    /// True when the current amount produces output.
    pub fn is_audible(&self) -> bool {
        self.amount > SILENCE_AMOUNT
    }

    /// Next sample of the unscaled layer mix.
    #[inline]
    pub fn next_mix(&mut self) -> f32 {
        let white = self.white.next_sample();
        let pink = self.pink.process(self.pink_source.next_sample());

        let road = self.road.process(pink);
        let hum_band = self.hum_high.process(white);
        let hum = hum_band - self.hum_low.process(hum_band);
        let ambience = self.ambience.process(0.5 * pink + 0.5 * white);

        ROAD_MIX * road + HUM_MIX * hum + AMBIENCE_MIX * ambience
    }

    /// Fill `out` with scaled noise at the current amount.
    pub fn render(&mut self, out: &mut [f32]) {
        let gain = noise_gain(self.amount);
        for sample in out.iter_mut() {
            *sample = self.next_mix() * gain;
        }
    }

    /// The last `len` samples added by [`Stage::process`], at most one
    /// prepared block. Only meaningful while [`is_audible`](Self::is_audible).
    pub fn last_rendered(&self, len: usize) -> &[f32] {
        &self.scratch[..len.min(self.scratch.len())]
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.road.set_sample_rate(sample_rate);
        self.hum_high.set_sample_rate(sample_rate);
        self.hum_low.set_sample_rate(sample_rate);
        self.ambience.set_sample_rate(sample_rate);
    }
}

impl Stage for NoiseSynth {
    fn prepare(&mut self, spec: &ProcessSpec) {
        self.set_sample_rate(spec.sample_rate);
        self.scratch = vec![0.0; spec.max_block_size];
        self.reset();
    }

    fn reset(&mut self) {
        self.white.reseed(self.seed);
        self.pink_source.reseed(pink_seed(self.seed));
        self.pink.reset();
        self.road.reset();
        self.hum_high.reset();
        self.hum_low.reset();
        self.ambience.reset();
    }

    /// Add the same noise to every channel.
    fn process(&mut self, channels: &mut [&mut [f32]]) {
        if !self.is_audible() || self.scratch.is_empty() {
            return;
        }
        let len = channels.iter().map(|ch| ch.len()).min().unwrap_or(0);
        let chunk = self.scratch.len();

        let mut start = 0;
        while start < len {
            let end = (start + chunk).min(len);
            let mut noise = std::mem::take(&mut self.scratch);
            self.render(&mut noise[..end - start]);
            for channel in channels.iter_mut() {
                for (sample, &n) in channel[start..end].iter_mut().zip(&noise) {
                    *sample += n;
                }
            }
            self.scratch = noise;
            start = end;
        }
    }
}
