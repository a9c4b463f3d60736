//! The environment engine: owns every stage and drives them per block.
//!
//! # Signal Flow
//!
//! ```text
//!            ┌──────────────────────── dry copy (mix < 1) ───────────────────────┐
//!            │                                                                   ▼
//! input ──► Filters ──► Convolution ──► Reflections ──► Width ──► Compressor ──► Trim ──► Mix ──► + Noise ──► output
//! ```
//!
//! Profile index 0 is bypass: no stage runs and, with the noise off, the
//! buffer is returned untouched. Any other index rebuilds the whole chain
//! from that profile before the next block. Rebuilding happens on the audio
//! thread and allocates nothing.

use std::sync::Arc;

use earshot_core::{MAX_CHANNELS, ProcessSpec, Stage, wet_dry_mix};

use crate::compressor::Compressor;
use crate::convolution::ConvolutionStage;
use crate::filter_chain::FilterChain;
use crate::impulse::{ImpulseLibrary, ImpulseResponse, decode_impulse};
use crate::noise_bed::{NoiseSynth, SILENCE_AMOUNT};
use crate::params::{ControlSnapshot, EngineParams};
use crate::profile::{self, BYPASS_INDEX, EnvironmentProfile, PROFILES};
use crate::reflections::EarlyReflections;
use crate::trim::OutputTrim;
use crate::width::StereoWidth;

/// What the chain is currently built for.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ActiveChain {
    index: usize,
    windows_down: bool,
    reflections: bool,
}

/// Listening-environment simulator.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use earshot_core::ProcessSpec;
/// use earshot_engine::{EngineParams, EnvironmentEngine, ImpulseLibrary};
///
/// let params = Arc::new(EngineParams::new());
/// let mut engine = EnvironmentEngine::new(Arc::clone(&params));
/// engine.prepare(ProcessSpec::new(44100.0, 512, 2), &ImpulseLibrary::new());
///
/// params.set_profile(2); // The Phone
/// let mut left = vec![0.1_f32; 512];
/// let mut right = vec![-0.1_f32; 512];
/// engine.process(&mut [&mut left[..], &mut right[..]]);
/// assert_eq!(left, right); // the phone is mono
/// ```
#[derive(Debug)]
pub struct EnvironmentEngine {
    params: Arc<EngineParams>,
    spec: ProcessSpec,
    prepared: bool,
    active: ActiveChain,
    filters: FilterChain,
    convolution: ConvolutionStage,
    reflections: EarlyReflections,
    width: StereoWidth,
    compressor: Compressor,
    trim: OutputTrim,
    noise: NoiseSynth,
    /// Pre-chain copy for the global mix, one per channel
    dry: [Vec<f32>; MAX_CHANNELS],
}

impl EnvironmentEngine {
    /// Create an engine reading its controls from `params`.
    ///
    /// Call [`prepare`](Self::prepare) before processing; until then
    /// `process` leaves buffers untouched.
    pub fn new(params: Arc<EngineParams>) -> Self {
        Self::with_noise_seed(params, earshot_core::noise::DEFAULT_SEED)
    }

    /// Create an engine whose noise bed starts from `seed`.
    pub fn with_noise_seed(params: Arc<EngineParams>, seed: u32) -> Self {
        let spec = ProcessSpec::default();
        Self {
            params,
            spec,
            prepared: false,
            active: ActiveChain {
                index: BYPASS_INDEX,
                windows_down: false,
                reflections: false,
            },
            filters: FilterChain::new(),
            convolution: ConvolutionStage::new(),
            reflections: EarlyReflections::new(),
            width: StereoWidth::default(),
            compressor: Compressor::new(spec.sample_rate),
            trim: OutputTrim::default(),
            noise: NoiseSynth::new(seed),
            dry: Default::default(),
        }
    }

    /// Shared controls.
    pub fn params(&self) -> &Arc<EngineParams> {
        &self.params
    }

    /// Sample rate, block size and channel count from the last `prepare`.
    pub fn spec(&self) -> ProcessSpec {
        self.spec
    }

    /// Profile index the chain is currently built for.
    pub fn active_profile(&self) -> usize {
        self.active.index
    }

    /// True when profile `index` has a usable impulse response.
    pub fn has_impulse(&self, index: usize) -> bool {
        self.convolution.has_kernel(index)
    }

    /// Processing latency in samples. The whole chain is zero-latency.
    pub fn latency_samples(&self) -> usize {
        0
    }

    /// Size every buffer for `spec`, decode impulse responses from
    /// `library`, and build the chain for the current controls.
    ///
    /// Allocates. Call once at setup and again whenever the host
    /// reconfigures.
    pub fn prepare(&mut self, spec: ProcessSpec, library: &ImpulseLibrary) {
        self.spec = spec;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            sample_rate = spec.sample_rate,
            max_block_size = spec.max_block_size,
            channels = spec.channels,
            impulses = library.len(),
            "preparing environment engine"
        );

        let impulses: Vec<Option<ImpulseResponse>> = PROFILES
            .iter()
            .map(|p| load_profile_impulse(p, library, spec.sample_rate))
            .collect();
        self.convolution.set_impulses(&impulses);

        self.filters.prepare(&spec);
        self.convolution.prepare(&spec);
        self.reflections.prepare(&spec);
        self.width.prepare(&spec);
        self.compressor.prepare(&spec);
        self.trim.prepare(&spec);
        self.noise.prepare(&spec);
        self.dry = std::array::from_fn(|_| vec![0.0; spec.max_block_size]);
        self.prepared = true;

        let controls = self.params.snapshot();
        self.rebuild(profile::clamp_index(controls.profile), controls.windows_down);
    }

    /// Zero all running state without reallocating.
    pub fn reset(&mut self) {
        self.filters.reset();
        self.convolution.reset();
        self.reflections.reset();
        self.compressor.reset();
        self.noise.reset();
    }

    /// Transform one block in place.
    ///
    /// `channels` is planar: one slice per channel, all the same length. The
    /// first two channels run through the profile; any further channels pass
    /// through dry but still receive the noise bed. Blocks longer than the
    /// prepared maximum are split internally.
    pub fn process<C: AsMut<[f32]>>(&mut self, channels: &mut [C]) {
        if !self.prepared {
            return;
        }

        let controls = self.params.snapshot();
        let index = profile::clamp_index(controls.profile);
        if index != self.active.index || controls.windows_down != self.active.windows_down {
            self.rebuild(index, controls.windows_down);
        }

        self.noise.set_amount(controls.noise_amount);
        if index == BYPASS_INDEX && controls.noise_amount <= SILENCE_AMOUNT {
            return;
        }

        let max = self.spec.max_block_size;
        match channels {
            [] => {}
            [mono] => {
                for block in mono.as_mut().chunks_mut(max) {
                    self.process_block(&mut [block], &controls);
                }
            }
            [left, right, rest @ ..] => {
                let (left, right) = (left.as_mut(), right.as_mut());
                let len = left.len().min(right.len());
                let mut start = 0;
                while start < len {
                    let end = (start + max).min(len);
                    self.process_block(
                        &mut [&mut left[start..end], &mut right[start..end]],
                        &controls,
                    );
                    if self.noise.is_audible() {
                        let noise = self.noise.last_rendered(end - start);
                        for extra in rest.iter_mut() {
                            let extra = extra.as_mut();
                            let stop = end.min(extra.len());
                            if start < stop {
                                for (sample, &n) in extra[start..stop].iter_mut().zip(noise) {
                                    *sample += n;
                                }
                            }
                        }
                    }
                    start = end;
                }
            }
        }
    }

    fn process_block(&mut self, block: &mut [&mut [f32]], controls: &ControlSnapshot) {
        if self.active.index != BYPASS_INDEX {
            let mix = controls.mix;
            let blend = mix < 1.0;
            if blend {
                for (dry, channel) in self.dry.iter_mut().zip(block.iter()) {
                    dry[..channel.len()].copy_from_slice(channel);
                }
            }

            self.filters.process(block);
            self.convolution.process(block);
            if self.active.reflections {
                self.reflections.process(block);
            }
            self.width.process(block);
            self.compressor.process(block);
            self.trim.process(block);

            if blend {
                for (dry, channel) in self.dry.iter().zip(block.iter_mut()) {
                    for (sample, &d) in channel.iter_mut().zip(dry.iter()) {
                        *sample = wet_dry_mix(d, *sample, mix);
                    }
                }
            }
        }

        self.noise.process(block);
    }

    /// Rebuild every stage for profile `index`. Allocation-free.
    fn rebuild(&mut self, index: usize, windows_down: bool) {
        let profile = profile::profile(index);
        let bypass = index == BYPASS_INDEX;

        if bypass {
            self.filters.clear_sections();
            self.convolution.deselect();
            self.width.set_width(1.0);
            self.compressor.configure(None);
            self.trim.set_trim_db(0.0);
        } else {
            self.filters.configure(profile, windows_down);
            self.convolution.select(index, profile.impulse_wet_mix());
            self.width.set_width(profile.width);
            self.compressor.configure(profile.compressor);
            self.trim.set_trim_db(profile.trim_db);
        }
        self.reflections.reset();

        self.active = ActiveChain {
            index,
            windows_down,
            reflections: !bypass && profile.early_reflections,
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            profile = profile.name,
            windows_down,
            convolution = self.convolution.is_active(),
            "rebuilt environment chain"
        );
    }
}

fn load_profile_impulse(
    profile: &EnvironmentProfile,
    library: &ImpulseLibrary,
    sample_rate: f32,
) -> Option<ImpulseResponse> {
    let reference = profile.impulse?;
    let bytes = library.get(reference.key)?;

    match decode_impulse(bytes, sample_rate) {
        Ok(ir) => {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                key = reference.key,
                samples = ir.len(),
                channels = ir.channel_count(),
                "decoded impulse response"
            );
            Some(ir)
        }
        Err(_err) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(key = reference.key, error = %_err, "ignoring impulse response");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(profile: usize) -> (Arc<EngineParams>, EnvironmentEngine) {
        let params = Arc::new(EngineParams::new());
        params.set_profile(profile);
        let mut engine = EnvironmentEngine::new(Arc::clone(&params));
        engine.prepare(ProcessSpec::new(44100.0, 256, 2), &ImpulseLibrary::new());
        (params, engine)
    }

    fn ramp(len: usize) -> Vec<f32> {
        (0..len).map(|i| ((i % 50) as f32 / 50.0) - 0.5).collect()
    }

    #[test]
    fn unprepared_engine_is_inert() {
        let params = Arc::new(EngineParams::new());
        params.set_profile(2);
        let mut engine = EnvironmentEngine::new(params);
        let mut buf = ramp(64);
        engine.process(&mut [&mut buf[..]]);
        assert_eq!(buf, ramp(64));
    }

    #[test]
    fn profile_change_is_picked_up_next_block() {
        let (params, mut engine) = engine(0);
        assert_eq!(engine.active_profile(), 0);
        params.set_profile(3);
        let mut buf = ramp(64);
        engine.process(&mut [&mut buf[..]]);
        assert_eq!(engine.active_profile(), 3);
    }

    #[test]
    fn out_of_range_profile_is_bypass() {
        let (params, mut engine) = engine(1);
        params.set_profile(42);
        let mut buf = ramp(300);
        engine.process(&mut [&mut buf[..]]);
        assert_eq!(engine.active_profile(), BYPASS_INDEX);
        assert_eq!(buf, ramp(300));
    }

    #[test]
    fn oversized_blocks_are_split() {
        let (_params, mut engine) = engine(1);
        let mut left = ramp(1000);
        let mut right = ramp(1000);
        engine.process(&mut [&mut left[..], &mut right[..]]);
        assert_eq!(left.len(), 1000);
        assert!(left.iter().chain(&right).all(|s| s.is_finite()));
    }

    #[test]
    fn extra_channels_skip_the_profile() {
        let (_params, mut engine) = engine(2);
        let mut buffers = vec![ramp(128), ramp(128), ramp(128)];
        engine.process(&mut buffers);
        assert_eq!(buffers[2], ramp(128));
        assert_ne!(buffers[0], ramp(128));
    }

    #[test]
    fn extra_channels_receive_the_noise_bed() {
        let (params, mut engine) = engine(0);
        params.set_noise_amount(1.0);
        let mut buffers = vec![vec![0.0; 600], vec![0.0; 600], vec![0.0; 600]];
        engine.process(&mut buffers);
        assert!(buffers[0].iter().any(|&s| s != 0.0));
        assert_eq!(buffers[2], buffers[0]);
        assert_eq!(buffers[1], buffers[0]);
    }

    #[test]
    fn global_mix_zero_returns_input() {
        let (params, mut engine) = engine(4);
        params.set_mix(0.0);
        let input = ramp(700);
        let mut left = input.clone();
        let mut right = input.clone();
        engine.process(&mut [&mut left[..], &mut right[..]]);
        assert_eq!(left, input);
        assert_eq!(right, input);
    }

    #[test]
    fn windows_down_triggers_rebuild() {
        let (params, mut engine) = engine(1);
        params.set_windows_down(true);
        let mut buf = ramp(64);
        engine.process(&mut [&mut buf[..]]);
        assert!(engine.active.windows_down);
    }

    #[test]
    fn missing_impulses_disable_convolution() {
        let (_params, engine) = engine(1);
        for index in 0..PROFILES.len() {
            assert!(!engine.has_impulse(index));
        }
    }
}
