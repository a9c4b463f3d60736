//! Earshot Engine - listening-environment simulation
//!
//! Runs audio through a fixed catalog of playback environments (a car cabin,
//! a phone, a laptop, a Bluetooth speaker) and can lay synthetic ambient
//! noise over the result.
//!
//! # Pipeline
//!
//! | Stage | Module | Active when |
//! |-------|--------|-------------|
//! | High-pass, low-pass, peaking EQ | [`filter_chain`] | any non-bypass profile |
//! | Impulse-response convolution | [`convolution`] | profile has an IR with wet mix > 0 |
//! | Early reflections | [`reflections`] | profile enables them |
//! | Stereo width | [`width`] | stereo input and width < 1 |
//! | Compressor | [`compressor`] | profile declares one |
//! | Output trim | [`trim`] | any non-bypass profile |
//! | Noise bed | [`noise_bed`] | noise amount > 0.0001 |
//!
//! [`EnvironmentEngine`] owns every stage and reads its controls from a
//! shared [`EngineParams`] at the start of each block.
//!
//! # Features
//!
//! - `tracing` - debug logs for prepare and chain rebuilds, warnings for
//!   impulse responses that fail to decode

pub mod compressor;
pub mod convolution;
pub mod engine;
pub mod filter_chain;
pub mod impulse;
pub mod noise_bed;
pub mod params;
pub mod profile;
pub mod reflections;
pub mod trim;
pub mod width;

pub use compressor::Compressor;
pub use convolution::ConvolutionStage;
pub use engine::EnvironmentEngine;
pub use filter_chain::FilterChain;
pub use impulse::{ImpulseError, ImpulseLibrary, ImpulseResponse, decode_impulse};
pub use noise_bed::NoiseSynth;
pub use params::{AtomicParam, ControlSnapshot, EngineParams};
pub use profile::{
    BYPASS_INDEX, CompressorSettings, EnvironmentProfile, ImpulseRef, PROFILES, PeakBand,
    find_profile,
};
pub use reflections::EarlyReflections;
pub use trim::OutputTrim;
pub use width::StereoWidth;
