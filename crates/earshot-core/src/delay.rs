//! Circular delay buffer read at integer tap offsets.
//!
//! The write head advances one slot per sample. A tap `d` samples back reads
//! `buffer[(write_pos + len - d) % len]`, so a tap of 0 returns the sample
//! just written and the longest readable tap is `capacity - 1`.

/// Fixed-capacity ring buffer for multi-tap delays.
///
/// Allocates only in [`TapDelay::new`] and [`TapDelay::resize`].
///
/// # Example
///
/// ```rust
/// use earshot_core::TapDelay;
///
/// let mut delay = TapDelay::new(8);
/// delay.write(1.0);
/// delay.advance();
/// delay.write(0.0);
/// assert_eq!(delay.read(1), 1.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TapDelay {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl TapDelay {
    /// Create a zeroed buffer of `capacity` samples (at least 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(1)],
            write_pos: 0,
        }
    }

    /// Reallocate to `capacity` samples and clear.
    pub fn resize(&mut self, capacity: usize) {
        self.buffer.clear();
        self.buffer.resize(capacity.max(1), 0.0);
        self.write_pos = 0;
    }

    /// Number of samples the buffer holds.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Store `sample` at the write head without advancing.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
    }

    /// Read the sample `delay` slots behind the write head.
    ///
    /// Delays at or beyond the capacity wrap around.
    #[inline]
    pub fn read(&self, delay: usize) -> f32 {
        let len = self.buffer.len();
        let delay = delay % len;
        self.buffer[(self.write_pos + len - delay) % len]
    }

    /// Move the write head forward one slot, wrapping.
    #[inline]
    pub fn advance(&mut self) {
        self.write_pos += 1;
        if self.write_pos == self.buffer.len() {
            self.write_pos = 0;
        }
    }

    /// Zero the contents and rewind the write head.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}
