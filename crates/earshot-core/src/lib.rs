//! Earshot Core - DSP primitives for listening-environment simulation
//!
//! This crate provides the building blocks the earshot engine assembles into
//! its per-block pipeline. Everything here is allocation-free once
//! constructed, so it can run inside a real-time audio callback.
//!
//! # Core Abstractions
//!
//! - [`ProcessSpec`] - Sample rate, maximum block size and channel count
//!   handed to every stage at setup time
//! - [`Stage`] - Object-safe trait for planar, in-place block processors
//!
//! ## Filters
//!
//! - [`BiquadCoefficients`] / [`BiquadState`] - Second-order IIR section with
//!   RBJ cookbook designs; coefficients and per-channel state are separate so
//!   one design can drive several channels
//! - [`OnePole`] - 6 dB/oct lowpass used to colour noise
//!
//! ## Delay & Dynamics
//!
//! - [`TapDelay`] - Circular buffer read at integer tap offsets
//! - [`EnvelopeFollower`] - Attack/release peak envelope
//!
//! ## Noise
//!
//! - [`WhiteNoise`] - Seeded xorshift32 generator
//! - [`PinkNoise`] - Kellet economy pink filter bank
//!
//! ## Utilities
//!
//! - Math functions: [`db_to_linear`], [`linear_to_db`], [`wet_dry_mix`],
//!   [`rms`], [`peak`]
//!
//! # Example
//!
//! ```rust
//! use earshot_core::{BiquadCoefficients, BiquadState};
//!
//! let coeffs = BiquadCoefficients::highpass(300.0, 0.707, 44100.0);
//! let mut state = BiquadState::default();
//! let out = state.process(&coeffs, 1.0);
//! assert!(out.is_finite());
//! ```

pub mod biquad;
pub mod delay;
pub mod envelope;
pub mod math;
pub mod noise;
pub mod one_pole;
pub mod spec;
pub mod stage;

// Re-export main types at crate root
pub use biquad::{BiquadCoefficients, BiquadState};
pub use delay::TapDelay;
pub use envelope::EnvelopeFollower;
pub use math::{
    db_to_linear, flush_denormal, linear_to_db, ms_to_samples, peak, rms, wet_dry_mix,
};
pub use noise::{PinkNoise, WhiteNoise};
pub use one_pole::OnePole;
pub use spec::{MAX_CHANNELS, ProcessSpec};
pub use stage::Stage;
