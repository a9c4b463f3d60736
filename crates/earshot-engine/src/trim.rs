//! Output trim: one linear gain over the whole block.

use earshot_core::{ProcessSpec, Stage, db_to_linear};

/// Final gain stage.
#[derive(Debug, Clone)]
pub struct OutputTrim {
    gain: f32,
}

impl Default for OutputTrim {
    fn default() -> Self {
        Self { gain: 1.0 }
    }
}

impl OutputTrim {
    /// Set the trim in dB. 0 dB is exact unity.
    pub fn set_trim_db(&mut self, trim_db: f32) {
        self.gain = if trim_db == 0.0 {
            1.0
        } else {
            db_to_linear(trim_db)
        };
    }

    /// Current linear gain.
    pub fn gain(&self) -> f32 {
        self.gain
    }
}

impl Stage for OutputTrim {
    fn prepare(&mut self, _spec: &ProcessSpec) {}

    fn reset(&mut self) {}

    fn process(&mut self, channels: &mut [&mut [f32]]) {
        if self.gain == 1.0 {
            return;
        }
        for channel in channels.iter_mut() {
            for sample in channel.iter_mut() {
                *sample *= self.gain;
            }
        }
    }
}
