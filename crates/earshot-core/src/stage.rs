//! The [`Stage`] trait shared by every pipeline stage.
//!
//! ## Design Decisions
//!
//! - **Planar, in-place**: Hosts deliver one slice per channel and expect the
//!   same slices back transformed. Stages never change the channel count or
//!   the block length.
//!
//! - **Prepare, then process**: All buffers are sized in [`Stage::prepare`].
//!   [`Stage::process`] must not allocate, block, or fail.
//!
//! - **Object-safe**: `dyn Stage` works, although the engine drives its
//!   stages through concrete fields in a fixed order.

use crate::ProcessSpec;

/// A block processor in the environment pipeline.
///
/// # Example
///
/// ```rust
/// use earshot_core::{ProcessSpec, Stage};
///
/// struct Invert;
///
/// impl Stage for Invert {
///     fn prepare(&mut self, _spec: &ProcessSpec) {}
///
///     fn reset(&mut self) {}
///
///     fn process(&mut self, channels: &mut [&mut [f32]]) {
///         for channel in channels.iter_mut() {
///             for sample in channel.iter_mut() {
///                 *sample = -*sample;
///             }
///         }
///     }
/// }
///
/// let mut left = [0.5, -0.25];
/// let mut stage = Invert;
/// stage.process(&mut [&mut left[..]]);
/// assert_eq!(left, [-0.5, 0.25]);
/// ```
pub trait Stage {
    /// Size internal buffers and derive sample-rate-dependent values.
    ///
    /// May allocate. Called once at setup and again whenever the host
    /// reconfigures. Leaves the stage in its reset state.
    fn prepare(&mut self, spec: &ProcessSpec);

    /// Zero all running state without reallocating.
    fn reset(&mut self);

    /// Transform `channels` in place.
    ///
    /// Every slice has the same length, at most the prepared
    /// `max_block_size`. Must not allocate.
    fn process(&mut self, channels: &mut [&mut [f32]]);

    /// Report processing latency in samples.
    ///
    /// Every stage in the pipeline is zero-latency, so the default is 0.
    fn latency_samples(&self) -> usize {
        0
    }
}
