//! Mid/side stereo width.
//!
//! ```text
//! mid  = (L + R) / 2
//! side = (L - R) / 2 * width
//! L'   = mid + side
//! R'   = mid - side
//! ```
//!
//! Width 1.0 is skipped outright; width 0.0 is true mono. Mono buffers pass
//! untouched.

use earshot_core::{ProcessSpec, Stage};

/// Stereo width control.
#[derive(Debug, Clone)]
pub struct StereoWidth {
    width: f32,
}

impl Default for StereoWidth {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl StereoWidth {
    /// Create with `width` in `[0, 1]`.
    pub fn new(width: f32) -> Self {
        Self {
            width: width.clamp(0.0, 1.0),
        }
    }

    /// Set the width, clamped to `[0, 1]`.
    pub fn set_width(&mut self, width: f32) {
        self.width = width.clamp(0.0, 1.0);
    }

    /// Current width.
    pub fn width(&self) -> f32 {
        self.width
    }
}

impl Stage for StereoWidth {
    fn prepare(&mut self, _spec: &ProcessSpec) {}

    fn reset(&mut self) {}

    fn process(&mut self, channels: &mut [&mut [f32]]) {
        if self.width >= 1.0 {
            return;
        }
        let [left, right, ..] = channels else {
            return;
        };
        let width = self.width;
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let mid = (*l + *r) * 0.5;
            let side = (*l - *r) * 0.5 * width;
            *l = mid + side;
            *r = mid - side;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_width_is_mono() {
        let mut stage = StereoWidth::new(0.0);
        let mut left = [1.0, 0.5, -0.25];
        let mut right = [0.0, -0.5, 0.75];
        stage.process(&mut [&mut left[..], &mut right[..]]);
        assert_eq!(left, [0.5, 0.0, 0.25]);
        assert_eq!(left, right);
    }

    #[test]
    fn full_width_is_untouched() {
        let mut stage = StereoWidth::new(1.0);
        let mut left = [0.3, -0.1];
        let mut right = [0.7, 0.2];
        stage.process(&mut [&mut left[..], &mut right[..]]);
        assert_eq!(left, [0.3, -0.1]);
        assert_eq!(right, [0.7, 0.2]);
    }

    #[test]
    fn partial_width_scales_side() {
        let mut stage = StereoWidth::new(0.5);
        let mut left = [1.0];
        let mut right = [0.0];
        stage.process(&mut [&mut left[..], &mut right[..]]);
        assert!((left[0] - 0.75).abs() < 1e-7);
        assert!((right[0] - 0.25).abs() < 1e-7);
    }

    #[test]
    fn mono_buffer_is_ignored() {
        let mut stage = StereoWidth::new(0.0);
        let mut mono = [0.9, -0.9];
        stage.process(&mut [&mut mono[..]]);
        assert_eq!(mono, [0.9, -0.9]);
    }

    #[test]
    fn width_is_clamped() {
        assert_eq!(StereoWidth::new(3.0).width(), 1.0);
        assert_eq!(StereoWidth::new(-1.0).width(), 0.0);
    }
}
