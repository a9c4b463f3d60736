//! Setup-time processing specification.

/// Maximum number of channels any stage processes.
///
/// Hosts hand the engine mono or stereo buffers. Extra channels are left to
/// the caller; stages never index past this bound.
pub const MAX_CHANNELS: usize = 2;

/// Sample rate, block size and channel layout fixed at setup time.
///
/// Stages size every buffer they own from this value inside
/// [`Stage::prepare`](crate::Stage::prepare), so nothing is allocated later
/// on the audio thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSpec {
    /// Sample rate in Hz (always > 0)
    pub sample_rate: f32,
    /// Largest block the host will ever pass to `process`
    pub max_block_size: usize,
    /// Channel count, clamped to `1..=MAX_CHANNELS`
    pub channels: usize,
}

impl ProcessSpec {
    /// Create a spec, sanitizing degenerate values.
    ///
    /// Non-positive or non-finite sample rates fall back to 44.1 kHz, a zero
    /// block size becomes 1, and the channel count is clamped to
    /// `1..=MAX_CHANNELS`.
    pub fn new(sample_rate: f32, max_block_size: usize, channels: usize) -> Self {
        let sample_rate = if sample_rate.is_finite() && sample_rate > 0.0 {
            sample_rate
        } else {
            44100.0
        };
        Self {
            sample_rate,
            max_block_size: max_block_size.max(1),
            channels: channels.clamp(1, MAX_CHANNELS),
        }
    }

    /// Nyquist frequency for this spec.
    #[inline]
    pub fn nyquist(&self) -> f32 {
        self.sample_rate * 0.5
    }
}

impl Default for ProcessSpec {
    fn default() -> Self {
        Self::new(44100.0, 512, 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_degenerate_values() {
        let spec = ProcessSpec::new(-1.0, 0, 7);
        assert_eq!(spec.sample_rate, 44100.0);
        assert_eq!(spec.max_block_size, 1);
        assert_eq!(spec.channels, MAX_CHANNELS);

        let spec = ProcessSpec::new(f32::NAN, 64, 0);
        assert_eq!(spec.sample_rate, 44100.0);
        assert_eq!(spec.channels, 1);
    }

    #[test]
    fn keeps_valid_values() {
        let spec = ProcessSpec::new(48000.0, 256, 1);
        assert_eq!(spec.sample_rate, 48000.0);
        assert_eq!(spec.max_block_size, 256);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.nyquist(), 24000.0);
    }
}
