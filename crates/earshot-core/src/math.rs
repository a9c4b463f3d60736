//! Mathematical utility functions for DSP.
//!
//! # Level Conversions
//!
//! - [`db_to_linear`] / [`linear_to_db`] - Convert between dB and linear gain
//!
//! # Block Measurements
//!
//! - [`rms`] / [`peak`] - Level of a block of samples
//!
//! # Utilities
//!
//! - [`wet_dry_mix`] - Linear crossfade
//! - [`ms_to_samples`] - Time conversion
//! - [`flush_denormal`] - Zero out values in the denormal range

use libm::{expf, log10f, sqrtf};

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use earshot_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels.
///
/// Values at or below `1e-10` clamp to -200 dB instead of returning `-inf`.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    20.0 * log10f(linear.max(1e-10))
}

/// Convert milliseconds to a whole number of samples (rounded).
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> usize {
    let samples = ms * sample_rate / 1000.0;
    if samples.is_finite() && samples > 0.0 {
        (samples + 0.5) as usize
    } else {
        0
    }
}

/// Flush values in the denormal range to zero.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Crossfade between a dry and a wet sample.
///
/// `mix = 0.0` returns `dry` exactly and `mix = 1.0` returns `wet` exactly.
#[inline]
pub fn wet_dry_mix(dry: f32, wet: f32, mix: f32) -> f32 {
    dry * (1.0 - mix) + wet * mix
}

/// Root-mean-square level of a block. Empty blocks measure 0.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    sqrtf((sum / samples.len() as f64) as f32)
}

/// Absolute peak of a block. Empty blocks measure 0.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0_f32, |acc, &s| acc.max(s.abs()))
}
