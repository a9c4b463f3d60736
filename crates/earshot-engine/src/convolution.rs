//! Zero-latency uniformly partitioned convolution.
//!
//! The impulse response is cut into partitions of [`PARTITION_SIZE`] taps.
//!
//! - **Head** (partition 0) runs as a direct-form FIR, so the first output
//!   sample already carries the IR onset.
//! - **Tail** (partitions 1..) runs as overlap-save FFT convolution of size
//!   [`FFT_SIZE`]. Each time a full input segment is collected it is
//!   transformed once and pushed into a frequency-domain delay line; the
//!   tail contribution for the *next* segment is the inverse transform of
//!   `Σ H_k · X_(s+1-k)`.
//!
//! ```text
//! segment s:  y = FIR_head(x) + tail_out[s]
//! boundary:   X_s = FFT([x_(s-1), x_s])
//!             tail_out[s+1] = last half of IFFT(Σ_k≥1 H_k · X_(s+1-k)) / N
//! ```
//!
//! Every buffer, plan and spectrum is allocated when kernels are installed
//! or the stage is prepared. Selecting a profile only swaps which kernel is
//! active and zeros the running state.

use std::sync::Arc;

use earshot_core::{MAX_CHANNELS, ProcessSpec, Stage, wet_dry_mix};
use rustfft::num_complex::Complex32;
use rustfft::{Fft, FftPlanner};

use crate::impulse::ImpulseResponse;

/// Taps per partition, also the FFT hop.
pub const PARTITION_SIZE: usize = 128;

/// Transform length for the tail partitions.
pub const FFT_SIZE: usize = 2 * PARTITION_SIZE;

/// Forward/inverse plans and the work buffers they share.
struct FftWorkspace {
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex32>,
    frame: Vec<Complex32>,
    accum: Vec<Complex32>,
}

impl FftWorkspace {
    fn new() -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(FFT_SIZE);
        let inverse = planner.plan_fft_inverse(FFT_SIZE);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        Self {
            forward,
            inverse,
            scratch: vec![Complex32::default(); scratch_len],
            frame: vec![Complex32::default(); FFT_SIZE],
            accum: vec![Complex32::default(); FFT_SIZE],
        }
    }
}

impl std::fmt::Debug for FftWorkspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FftWorkspace")
            .field("fft_size", &FFT_SIZE)
            .finish_non_exhaustive()
    }
}

/// One IR channel split into a direct head and tail spectra.
#[derive(Debug, Clone)]
struct ChannelKernel {
    /// Head taps in reverse order, zero-padded to the partition size
    head_reversed: Vec<f32>,
    /// Spectrum of each tail partition, `[h_k, 0...]` transformed
    tail: Vec<Vec<Complex32>>,
}

impl ChannelKernel {
    fn new(taps: &[f32], fft: &mut FftWorkspace) -> Self {
        let mut head_reversed = vec![0.0; PARTITION_SIZE];
        for (dst, &src) in head_reversed.iter_mut().rev().zip(taps) {
            *dst = src;
        }

        let tail = taps
            .chunks(PARTITION_SIZE)
            .skip(1)
            .map(|part| {
                fft.frame.fill(Complex32::default());
                for (dst, &src) in fft.frame.iter_mut().zip(part) {
                    dst.re = src;
                }
                fft.forward
                    .process_with_scratch(&mut fft.frame, &mut fft.scratch);
                fft.frame.clone()
            })
            .collect();

        Self {
            head_reversed,
            tail,
        }
    }
}

/// Kernels for every channel of one impulse response.
#[derive(Debug, Clone)]
struct Kernel {
    channels: Vec<ChannelKernel>,
}

impl Kernel {
    fn channel(&self, index: usize) -> &ChannelKernel {
        &self.channels[index.min(self.channels.len() - 1)]
    }

    fn tail_partitions(&self) -> usize {
        self.channels.iter().map(|ch| ch.tail.len()).max().unwrap_or(0)
    }
}

/// Running state of one channel.
#[derive(Debug, Clone, Default)]
struct ChannelState {
    /// Input history, written twice so any `PARTITION_SIZE` window is contiguous
    history: Vec<f32>,
    history_pos: usize,
    previous: Vec<f32>,
    current: Vec<f32>,
    fill: usize,
    tail_out: Vec<f32>,
    /// Frequency-domain delay line of input segment spectra
    spectra: Vec<Vec<Complex32>>,
    spectra_head: usize,
}

impl ChannelState {
    fn allocate(&mut self, delay_slots: usize) {
        self.history = vec![0.0; 2 * PARTITION_SIZE];
        self.previous = vec![0.0; PARTITION_SIZE];
        self.current = vec![0.0; PARTITION_SIZE];
        self.tail_out = vec![0.0; PARTITION_SIZE];
        self.spectra = vec![vec![Complex32::default(); FFT_SIZE]; delay_slots.max(1)];
        self.clear();
    }

    fn clear(&mut self) {
        self.history.fill(0.0);
        self.previous.fill(0.0);
        self.current.fill(0.0);
        self.tail_out.fill(0.0);
        for slot in &mut self.spectra {
            slot.fill(Complex32::default());
        }
        self.history_pos = 0;
        self.fill = 0;
        self.spectra_head = 0;
    }

    #[inline]
    fn process(&mut self, input: f32, kernel: &ChannelKernel, fft: &mut FftWorkspace) -> f32 {
        let pos = self.history_pos;
        self.history[pos] = input;
        self.history[pos + PARTITION_SIZE] = input;
        let window = &self.history[pos + 1..=pos + PARTITION_SIZE];
        let head: f32 = kernel
            .head_reversed
            .iter()
            .zip(window)
            .map(|(h, x)| h * x)
            .sum();
        self.history_pos = (pos + 1) % PARTITION_SIZE;

        let output = head + self.tail_out[self.fill];
        self.current[self.fill] = input;
        self.fill += 1;
        if self.fill == PARTITION_SIZE {
            self.segment_boundary(kernel, fft);
        }
        output
    }

    fn segment_boundary(&mut self, kernel: &ChannelKernel, fft: &mut FftWorkspace) {
        self.fill = 0;
        if kernel.tail.is_empty() {
            std::mem::swap(&mut self.previous, &mut self.current);
            return;
        }

        let slots = self.spectra.len();
        let head = self.spectra_head;
        {
            let (prev_half, cur_half) = fft.frame.split_at_mut(PARTITION_SIZE);
            for (dst, &src) in prev_half.iter_mut().zip(&self.previous) {
                *dst = Complex32::new(src, 0.0);
            }
            for (dst, &src) in cur_half.iter_mut().zip(&self.current) {
                *dst = Complex32::new(src, 0.0);
            }
        }
        fft.forward
            .process_with_scratch(&mut fft.frame, &mut fft.scratch);
        self.spectra[head].copy_from_slice(&fft.frame);

        fft.accum.fill(Complex32::default());
        for (k, spectrum) in kernel.tail.iter().enumerate() {
            // tail partition k + 1 pairs with the segment k slots back
            let slot = &self.spectra[(head + slots - k) % slots];
            for ((acc, &h), &x) in fft.accum.iter_mut().zip(spectrum).zip(slot) {
                *acc += h * x;
            }
        }
        fft.inverse
            .process_with_scratch(&mut fft.accum, &mut fft.scratch);

        let norm = 1.0 / FFT_SIZE as f32;
        for (dst, src) in self.tail_out.iter_mut().zip(&fft.accum[PARTITION_SIZE..]) {
            *dst = src.re * norm;
        }

        self.spectra_head = (head + 1) % slots;
        std::mem::swap(&mut self.previous, &mut self.current);
    }
}

/// Convolution stage holding one kernel per catalog slot.
#[derive(Debug)]
pub struct ConvolutionStage {
    kernels: Vec<Option<Kernel>>,
    active: Option<usize>,
    wet_mix: f32,
    states: [ChannelState; MAX_CHANNELS],
    fft: FftWorkspace,
    delay_slots: usize,
}

impl Default for ConvolutionStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ConvolutionStage {
    /// Create a stage with no kernels installed.
    pub fn new() -> Self {
        let mut stage = Self {
            kernels: Vec::new(),
            active: None,
            wet_mix: 0.0,
            states: Default::default(),
            fft: FftWorkspace::new(),
            delay_slots: 1,
        };
        stage.allocate_states();
        stage
    }

    /// Replace every kernel. Slot `i` of `impulses` becomes selectable as `i`.
    ///
    /// Allocates; call outside the audio path. Deselects the active kernel.
    pub fn set_impulses(&mut self, impulses: &[Option<ImpulseResponse>]) {
        let fft = &mut self.fft;
        self.kernels = impulses
            .iter()
            .map(|slot| {
                slot.as_ref().map(|ir| Kernel {
                    channels: (0..ir.channel_count())
                        .map(|c| ChannelKernel::new(ir.channel(c), fft))
                        .collect(),
                })
            })
            .collect();
        self.delay_slots = self
            .kernels
            .iter()
            .flatten()
            .map(Kernel::tail_partitions)
            .max()
            .unwrap_or(0)
            .max(1);
        self.active = None;
        self.wet_mix = 0.0;
        self.allocate_states();
    }

    /// Activate the kernel in `slot` at `wet_mix`, clearing running state.
    ///
    /// A slot with no kernel, or a wet mix of zero, disables the stage.
    pub fn select(&mut self, slot: usize, wet_mix: f32) {
        let has_kernel = self.kernels.get(slot).is_some_and(Option::is_some);
        let wet_mix = wet_mix.clamp(0.0, 1.0);
        self.active = (has_kernel && wet_mix > 0.0).then_some(slot);
        self.wet_mix = if self.active.is_some() { wet_mix } else { 0.0 };
        self.reset();
    }

    /// Turn the stage off.
    pub fn deselect(&mut self) {
        self.active = None;
        self.wet_mix = 0.0;
    }

    /// True when a kernel is active.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// True when `slot` holds a kernel.
    pub fn has_kernel(&self, slot: usize) -> bool {
        self.kernels.get(slot).is_some_and(Option::is_some)
    }

    /// Current wet mix (0 when inactive).
    pub fn wet_mix(&self) -> f32 {
        self.wet_mix
    }

    fn allocate_states(&mut self) {
        for state in &mut self.states {
            state.allocate(self.delay_slots);
        }
    }
}

impl Stage for ConvolutionStage {
    fn prepare(&mut self, _spec: &ProcessSpec) {
        self.allocate_states();
    }

    fn reset(&mut self) {
        for state in &mut self.states {
            state.clear();
        }
    }

    fn process(&mut self, channels: &mut [&mut [f32]]) {
        let Self {
            kernels,
            active,
            wet_mix,
            states,
            fft,
            ..
        } = self;
        let Some(slot) = *active else {
            return;
        };
        let Some(Some(kernel)) = kernels.get(slot) else {
            return;
        };
        let wet = *wet_mix;

        for (c, (state, channel)) in states.iter_mut().zip(channels.iter_mut()).enumerate() {
            let taps = kernel.channel(c);
            for sample in channel.iter_mut() {
                let convolved = state.process(*sample, taps, fft);
                *sample = wet_dry_mix(*sample, convolved, wet);
            }
        }
    }
}
