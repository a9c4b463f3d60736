//! Biquad (bi-quadratic) filter sections.
//!
//! A section is split into two parts:
//!
//! - [`BiquadCoefficients`] - five normalized coefficients, designed once per
//!   profile rebuild from cutoff/Q/gain and the prepared sample rate
//! - [`BiquadState`] - the two delay taps one channel needs to run them
//!
//! Keeping them apart lets a stereo filter share one coefficient set across
//! both channels, and lets a rebuild swap coefficients while clearing state
//! in a single pass.
//!
//! Coefficient design uses the RBJ Audio EQ Cookbook formulas.

use core::f32::consts::PI;
use libm::{cosf, powf, sinf};

/// Q for a maximally flat (Butterworth) second-order response.
pub const BUTTERWORTH_Q: f32 = 0.707;

/// Normalized biquad coefficients (`a0` divided out).
///
/// The transfer function is:
///
/// ```text
///         b0 + b1*z^-1 + b2*z^-2
/// H(z) = ------------------------
///          1 + a1*z^-1 + a2*z^-2
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    /// Feedforward coefficients
    pub b0: f32,
    /// Feedforward, one sample back
    pub b1: f32,
    /// Feedforward, two samples back
    pub b2: f32,
    /// Feedback, one sample back
    pub a1: f32,
    /// Feedback, two samples back
    pub a2: f32,
}

impl BiquadCoefficients {
    /// Passthrough section: `y[n] = x[n]`.
    pub const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Build from raw cookbook terms, normalizing by `a0`.
    pub fn from_raw(b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) -> Self {
        let a0_inv = 1.0 / a0;
        Self {
            b0: b0 * a0_inv,
            b1: b1 * a0_inv,
            b2: b2 * a0_inv,
            a1: a1 * a0_inv,
            a2: a2 * a0_inv,
        }
    }

    /// Second-order low-pass.
    ///
    /// # Arguments
    ///
    /// * `frequency` - Cutoff frequency in Hz
    /// * `q` - Q factor ([`BUTTERWORTH_Q`] for a flat passband)
    /// * `sample_rate` - Sample rate in Hz
    pub fn lowpass(frequency: f32, q: f32, sample_rate: f32) -> Self {
        let (cos_omega, alpha) = omega_terms(frequency, q, sample_rate);

        Self::from_raw(
            (1.0 - cos_omega) / 2.0,
            1.0 - cos_omega,
            (1.0 - cos_omega) / 2.0,
            1.0 + alpha,
            -2.0 * cos_omega,
            1.0 - alpha,
        )
    }

    /// Second-order high-pass.
    ///
    /// # Arguments
    ///
    /// * `frequency` - Cutoff frequency in Hz
    /// * `q` - Q factor ([`BUTTERWORTH_Q`] for a flat passband)
    /// * `sample_rate` - Sample rate in Hz
    pub fn highpass(frequency: f32, q: f32, sample_rate: f32) -> Self {
        let (cos_omega, alpha) = omega_terms(frequency, q, sample_rate);

        Self::from_raw(
            (1.0 + cos_omega) / 2.0,
            -(1.0 + cos_omega),
            (1.0 + cos_omega) / 2.0,
            1.0 + alpha,
            -2.0 * cos_omega,
            1.0 - alpha,
        )
    }

    /// Peaking (bell) EQ.
    ///
    /// Boosts or cuts around `frequency` with bandwidth `frequency / q`.
    /// At 0 dB the section is an exact passthrough.
    ///
    /// # Arguments
    ///
    /// * `frequency` - Center frequency in Hz
    /// * `q` - Q factor
    /// * `gain_db` - Gain in decibels (positive = boost, negative = cut)
    /// * `sample_rate` - Sample rate in Hz
    pub fn peaking(frequency: f32, q: f32, gain_db: f32, sample_rate: f32) -> Self {
        let a = powf(10.0, gain_db / 40.0); // sqrt(10^(dB/20))
        let (cos_omega, alpha) = omega_terms(frequency, q, sample_rate);

        Self::from_raw(
            1.0 + alpha * a,
            -2.0 * cos_omega,
            1.0 - alpha * a,
            1.0 + alpha / a,
            -2.0 * cos_omega,
            1.0 - alpha / a,
        )
    }

    /// Returns true if every coefficient is finite.
    pub fn is_finite(&self) -> bool {
        self.b0.is_finite()
            && self.b1.is_finite()
            && self.b2.is_finite()
            && self.a1.is_finite()
            && self.a2.is_finite()
    }
}

impl Default for BiquadCoefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[inline]
fn omega_terms(frequency: f32, q: f32, sample_rate: f32) -> (f32, f32) {
    let omega = 2.0 * PI * frequency / sample_rate;
    let alpha = sinf(omega) / (2.0 * q.max(1e-3));
    (cosf(omega), alpha)
}

/// Running state of one channel through one section.
///
/// Transposed Direct Form II: two delay taps per channel, good float
/// behaviour for the low cutoffs the environment profiles use.
///
/// ```text
/// y[n]  = b0*x[n] + s1
/// s1'   = b1*x[n] - a1*y[n] + s2
/// s2'   = b2*x[n] - a2*y[n]
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BiquadState {
    s1: f32,
    s2: f32,
}

impl BiquadState {
    /// Run one sample through `coeffs`.
    #[inline]
    pub fn process(&mut self, coeffs: &BiquadCoefficients, input: f32) -> f32 {
        let output = coeffs.b0 * input + self.s1;
        self.s1 = coeffs.b1 * input - coeffs.a1 * output + self.s2;
        self.s2 = coeffs.b2 * input - coeffs.a2 * output;
        output
    }

    /// Run a whole block through `coeffs`, in place.
    #[inline]
    pub fn process_block(&mut self, coeffs: &BiquadCoefficients, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(coeffs, *sample);
        }
    }

    /// Zero both delay taps.
    pub fn clear(&mut self) {
        self.s1 = 0.0;
        self.s2 = 0.0;
    }

    /// Returns true if both delay taps are zero.
    pub fn is_clear(&self) -> bool {
        self.s1 == 0.0 && self.s2 == 0.0
    }
}
