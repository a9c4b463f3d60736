//! Impulse-response blobs and their decoding.
//!
//! Hosts hand the engine opaque byte blobs keyed by name through an
//! [`ImpulseLibrary`]. At prepare time each blob a profile references is
//! decoded into an [`ImpulseResponse`] at the engine's sample rate:
//!
//! ```text
//! WAV bytes → decode (hound) → resample (linear) → trim leading silence
//!           → cap length → normalize to unit energy
//! ```
//!
//! A missing key, an empty blob or a blob that fails to decode simply means
//! "no convolution" for that profile.

use std::collections::HashMap;
use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use thiserror::Error;

/// Samples below this fraction of the IR peak count as leading silence (-80 dB).
pub const SILENCE_THRESHOLD: f32 = 1e-4;

/// Longest impulse response kept after trimming, in seconds.
pub const MAX_IMPULSE_SECONDS: f32 = 4.0;

/// Channels an impulse response may carry; extra channels are ignored.
pub const MAX_IMPULSE_CHANNELS: usize = 2;

/// Errors from decoding an impulse-response blob.
#[derive(Debug, Error)]
pub enum ImpulseError {
    /// The blob is not a readable WAV file.
    #[error("WAV decode error: {0}")]
    Decode(#[from] hound::Error),

    /// The blob decoded to zero samples.
    #[error("impulse response has no samples")]
    Empty,

    /// Every sample is zero.
    #[error("impulse response is silent")]
    Silent,
}

/// Named impulse-response blobs supplied by the host.
#[derive(Debug, Clone, Default)]
pub struct ImpulseLibrary {
    blobs: HashMap<String, Vec<u8>>,
}

impl ImpulseLibrary {
    /// Create an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw WAV blob under `key`, replacing any previous one.
    pub fn insert(&mut self, key: impl Into<String>, bytes: Vec<u8>) {
        self.blobs.insert(key.into(), bytes);
    }

    /// Encode planar samples as a 32-bit float WAV blob and store it.
    pub fn insert_samples(
        &mut self,
        key: impl Into<String>,
        channels: &[Vec<f32>],
        sample_rate: u32,
    ) -> Result<(), ImpulseError> {
        let bytes = encode_wav(channels, sample_rate)?;
        self.insert(key, bytes);
        Ok(())
    }

    /// Blob for `key`. Empty blobs are reported as absent.
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.blobs
            .get(key)
            .map(Vec::as_slice)
            .filter(|bytes| !bytes.is_empty())
    }

    /// Stored keys in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.blobs.keys().map(String::as_str)
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// True when no blob is stored.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

/// A decoded, engine-ready impulse response.
///
/// Holds one or two channels of equal length at the engine sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpulseResponse {
    channels: Vec<Vec<f32>>,
}

impl ImpulseResponse {
    /// Build from planar samples already at the engine rate.
    ///
    /// Applies the same trim, cap and normalization as [`decode_impulse`].
    pub fn from_channels(
        mut channels: Vec<Vec<f32>>,
        sample_rate: f32,
    ) -> Result<Self, ImpulseError> {
        channels.truncate(MAX_IMPULSE_CHANNELS);
        let len = channels.iter().map(Vec::len).min().unwrap_or(0);
        if len == 0 {
            return Err(ImpulseError::Empty);
        }
        for ch in &mut channels {
            ch.truncate(len);
        }

        let peak = channels
            .iter()
            .flat_map(|ch| ch.iter())
            .fold(0.0_f32, |acc, &s| acc.max(s.abs()));
        if peak <= 0.0 || !peak.is_finite() {
            return Err(ImpulseError::Silent);
        }

        let threshold = peak * SILENCE_THRESHOLD;
        let start = (0..len)
            .find(|&i| channels.iter().any(|ch| ch[i].abs() >= threshold))
            .unwrap_or(0);
        let max_len = ((MAX_IMPULSE_SECONDS * sample_rate) as usize).max(1);
        let end = len.min(start + max_len);

        for ch in &mut channels {
            ch.drain(..start);
            ch.truncate(end - start);
        }

        let energy = channels
            .iter()
            .map(|ch| ch.iter().map(|&s| s * s).sum::<f32>())
            .fold(0.0_f32, f32::max);
        let scale = 1.0 / energy.sqrt();
        for ch in &mut channels {
            for s in ch.iter_mut() {
                *s *= scale;
            }
        }

        Ok(Self { channels })
    }

    /// Number of channels (1 or 2).
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Length in samples.
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Always false; empty responses are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Samples for output channel `index`. A mono response serves both
    /// output channels.
    pub fn channel(&self, index: usize) -> &[f32] {
        let index = index.min(self.channels.len() - 1);
        &self.channels[index]
    }
}

/// Decode a WAV blob into an [`ImpulseResponse`] at `target_rate`.
///
/// Accepts 8 to 32-bit integer PCM and 32-bit float at any rate.
pub fn decode_impulse(bytes: &[u8], target_rate: f32) -> Result<ImpulseResponse, ImpulseError> {
    if bytes.is_empty() {
        return Err(ImpulseError::Empty);
    }

    let reader = WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    let channel_count = usize::from(spec.channels.max(1));

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = 1.0 / (1_i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()?
        }
    };

    let kept = channel_count.min(MAX_IMPULSE_CHANNELS);
    let frames = interleaved.len() / channel_count;
    let mut channels: Vec<Vec<f32>> = (0..kept)
        .map(|c| (0..frames).map(|f| interleaved[f * channel_count + c]).collect())
        .collect();

    let source_rate = spec.sample_rate as f32;
    if source_rate > 0.0 && (source_rate - target_rate).abs() > f32::EPSILON {
        for ch in &mut channels {
            *ch = resample_linear(ch, source_rate, target_rate);
        }
    }

    ImpulseResponse::from_channels(channels, target_rate)
}

/// Linear-interpolation resampler.
pub fn resample_linear(input: &[f32], from_rate: f32, to_rate: f32) -> Vec<f32> {
    if input.is_empty() || from_rate <= 0.0 || to_rate <= 0.0 {
        return input.to_vec();
    }
    let ratio = from_rate / to_rate;
    let out_len = ((input.len() as f64) * f64::from(to_rate) / f64::from(from_rate)).ceil() as usize;
    let last = input.len() - 1;

    (0..out_len.max(1))
        .map(|n| {
            let pos = n as f32 * ratio;
            let i = (pos as usize).min(last);
            let frac = pos - i as f32;
            let next = input[(i + 1).min(last)];
            input[i] + (next - input[i]) * frac
        })
        .collect()
}

/// Encode planar samples as a 32-bit float WAV blob.
pub fn encode_wav(channels: &[Vec<f32>], sample_rate: u32) -> Result<Vec<u8>, ImpulseError> {
    let channel_count = channels.len().clamp(1, usize::from(u16::MAX));
    let frames = channels.iter().map(Vec::len).min().unwrap_or(0);
    let spec = WavSpec {
        channels: channel_count as u16,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut bytes = Vec::new();
    {
        let mut writer = WavWriter::new(Cursor::new(&mut bytes), spec)?;
        for f in 0..frames {
            for ch in channels {
                writer.write_sample(ch[f])?;
            }
        }
        writer.finalize()?;
    }
    Ok(bytes)
}
