//! Lock-free control values shared between a control thread and the audio
//! thread.
//!
//! The control side writes through the setters at any time. The engine takes
//! one [`ControlSnapshot`] at the start of every block, one atomic load per
//! value, so a value never changes halfway through a block.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

use crate::profile::BYPASS_INDEX;

/// Step granularity of the noise amount and mix controls.
pub const CONTROL_STEP: f32 = 0.01;

/// Snap `value` to the nearest [`CONTROL_STEP`] inside `[0, 1]`.
pub fn snap_to_step(value: f32) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    let steps = (1.0 / CONTROL_STEP).round();
    (value.clamp(0.0, 1.0) * steps).round() / steps
}

/// A thread-safe atomic parameter using bit-cast f32.
///
/// Control thread writes, audio thread reads. No locks, no allocations.
#[derive(Debug)]
pub struct AtomicParam {
    value: AtomicU32,
    min: f32,
    max: f32,
    default: f32,
}

impl AtomicParam {
    /// Create a new atomic parameter with range and default.
    pub fn new(default: f32, min: f32, max: f32) -> Self {
        Self {
            value: AtomicU32::new(default.to_bits()),
            min,
            max,
            default,
        }
    }

    /// Set the value, clamped to range.
    #[inline]
    pub fn set(&self, v: f32) {
        let clamped = if v.is_finite() {
            v.clamp(self.min, self.max)
        } else {
            self.default
        };
        self.value.store(clamped.to_bits(), Ordering::Release);
    }

    /// Read the value.
    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.value.load(Ordering::Acquire))
    }

    /// Restore the default.
    pub fn reset(&self) {
        self.set(self.default);
    }

    /// Default value.
    pub fn default_value(&self) -> f32 {
        self.default
    }
}

/// The values the engine reads once per block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSnapshot {
    /// Requested profile index (not yet clamped)
    pub profile: usize,
    /// Noise amount in `[0, 1]`
    pub noise_amount: f32,
    /// Global dry/wet mix in `[0, 1]`
    pub mix: f32,
    /// Windows-down mode
    pub windows_down: bool,
}

/// Shared engine controls.
///
/// Wrap in an `Arc` and hand one clone to the engine and one to whatever
/// drives it.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use earshot_engine::EngineParams;
///
/// let params = Arc::new(EngineParams::new());
/// params.set_profile(2);
/// params.set_noise_amount(0.354);
/// assert_eq!(params.profile(), 2);
/// assert!((params.noise_amount() - 0.35).abs() < 1e-6);
/// ```
#[derive(Debug)]
pub struct EngineParams {
    profile: AtomicUsize,
    noise_amount: AtomicParam,
    mix: AtomicParam,
    windows_down: AtomicBool,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineParams {
    /// Bypass, no noise, full mix, windows up.
    pub fn new() -> Self {
        Self {
            profile: AtomicUsize::new(BYPASS_INDEX),
            noise_amount: AtomicParam::new(0.0, 0.0, 1.0),
            mix: AtomicParam::new(1.0, 0.0, 1.0),
            windows_down: AtomicBool::new(false),
        }
    }

    /// Select a profile. Out-of-range indices are stored as given and
    /// treated as bypass by the engine.
    pub fn set_profile(&self, index: usize) {
        self.profile.store(index, Ordering::Release);
    }

    /// Selected profile index.
    pub fn profile(&self) -> usize {
        self.profile.load(Ordering::Acquire)
    }

    /// Set the noise amount, snapped to 0.01 steps in `[0, 1]`.
    pub fn set_noise_amount(&self, amount: f32) {
        self.noise_amount.set(snap_to_step(amount));
    }

    /// Noise amount.
    pub fn noise_amount(&self) -> f32 {
        self.noise_amount.get()
    }

    /// Set the global dry/wet mix, snapped to 0.01 steps in `[0, 1]`.
    pub fn set_mix(&self, mix: f32) {
        self.mix.set(snap_to_step(mix));
    }

    /// Global dry/wet mix.
    pub fn mix(&self) -> f32 {
        self.mix.get()
    }

    /// Enable or disable windows-down mode.
    pub fn set_windows_down(&self, on: bool) {
        self.windows_down.store(on, Ordering::Release);
    }

    /// Windows-down mode.
    pub fn windows_down(&self) -> bool {
        self.windows_down.load(Ordering::Acquire)
    }

    /// Read every control once.
    #[inline]
    pub fn snapshot(&self) -> ControlSnapshot {
        ControlSnapshot {
            profile: self.profile(),
            noise_amount: self.noise_amount(),
            mix: self.mix(),
            windows_down: self.windows_down(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn defaults() {
        let params = EngineParams::new();
        assert_eq!(
            params.snapshot(),
            ControlSnapshot {
                profile: BYPASS_INDEX,
                noise_amount: 0.0,
                mix: 1.0,
                windows_down: false,
            }
        );
    }

    #[test]
    fn snapping() {
        assert!((snap_to_step(0.456) - 0.46).abs() < 1e-6);
        assert_eq!(snap_to_step(-3.0), 0.0);
        assert_eq!(snap_to_step(7.0), 1.0);
        assert_eq!(snap_to_step(f32::NAN), 0.0);
    }

    #[test]
    fn atomic_param_clamps_and_resets() {
        let p = AtomicParam::new(0.5, 0.0, 1.0);
        p.set(2.0);
        assert_eq!(p.get(), 1.0);
        p.set(f32::INFINITY);
        assert_eq!(p.get(), 0.5);
        p.set(0.25);
        p.reset();
        assert_eq!(p.get(), p.default_value());
    }

    #[test]
    fn writes_are_visible_across_threads() {
        let params = Arc::new(EngineParams::new());
        let writer = Arc::clone(&params);
        thread::spawn(move || {
            writer.set_profile(3);
            writer.set_noise_amount(0.5);
            writer.set_windows_down(true);
            writer.set_mix(0.25);
        })
        .join()
        .unwrap();

        let snap = params.snapshot();
        assert_eq!(snap.profile, 3);
        assert_eq!(snap.noise_amount, 0.5);
        assert_eq!(snap.mix, 0.25);
        assert!(snap.windows_down);
    }
}
