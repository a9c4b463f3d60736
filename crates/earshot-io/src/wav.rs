//! WAV file reading and writing in planar layout.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

/// Most channels kept on read; the engine processes at most a stereo pair.
const MAX_CHANNELS: usize = 2;

/// WAV audio encoding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Linear PCM (integer samples).
    Pcm,
    /// IEEE 754 floating-point samples.
    IeeeFloat,
}

/// WAV file metadata extracted without loading sample data.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Number of audio channels in the file.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Total number of sample frames (samples per channel).
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Audio encoding format.
    pub format: WavFormat,
}

/// Read WAV metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1);
    let num_frames = u64::from(reader.len()) / u64::from(channels);
    let duration_secs = num_frames as f64 / f64::from(spec.sample_rate);

    let format = match spec.sample_format {
        SampleFormat::Float => WavFormat::IeeeFloat,
        SampleFormat::Int => WavFormat::Pcm,
    };

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs,
        format,
    })
}

/// WAV file specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz (e.g., 44100, 48000).
    pub sample_rate: u32,
    /// Bit depth per sample: 16 or 24 for integer PCM, 32 for float.
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 2,
            sample_rate: 44100,
            bits_per_sample: 24,
        }
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// Full-scale value for an integer bit depth.
fn int_scale(bits: u16) -> f32 {
    (1i64 << (bits.clamp(2, 32) - 1)) as f32
}

/// Read a WAV file into one buffer per channel.
///
/// Mono and stereo files are returned as-is. Files with more than two
/// channels keep only the first two, and the returned spec says so.
/// Integer PCM is normalized to `[-1, 1)`.
///
/// # Example
/// ```ignore
/// let (channels, spec) = read_wav_planar("input.wav")?;
/// println!("{} channels at {} Hz", channels.len(), spec.sample_rate);
/// ```
pub fn read_wav_planar<P: AsRef<Path>>(path: P) -> Result<(Vec<Vec<f32>>, WavSpec)> {
    let path = path.as_ref();
    let reader = WavReader::open(path)?;
    let file_spec = reader.spec();
    let mut spec = WavSpec::from(file_spec);
    if spec.channels == 0 {
        return Err(Error::ChannelCount(0));
    }
    let channels = spec.channels as usize;

    let interleaved: Vec<f32> = match file_spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let scale = int_scale(spec.bits_per_sample);
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let frames = interleaved.len() / channels;
    if frames == 0 {
        return Err(Error::EmptyFile);
    }

    let kept = channels.min(MAX_CHANNELS);
    let mut planar: Vec<Vec<f32>> = (0..kept).map(|_| Vec::with_capacity(frames)).collect();
    for frame in interleaved.chunks_exact(channels) {
        for (buffer, &sample) in planar.iter_mut().zip(frame) {
            buffer.push(sample);
        }
    }
    spec.channels = kept as u16;

    tracing::debug!(
        path = %path.display(),
        channels,
        frames,
        sample_rate = spec.sample_rate,
        "loaded WAV file"
    );

    Ok((planar, spec))
}

/// Write one buffer per channel to a WAV file.
///
/// The channel count comes from `channels.len()` and overrides
/// `spec.channels`. Buffers of unequal length are truncated to the
/// shortest. Bit depth 32 writes float samples; anything else writes
/// clamped integer PCM.
///
/// # Example
/// ```ignore
/// let silence = vec![vec![0.0f32; 44100]; 2];
/// write_wav_planar("output.wav", &silence, WavSpec::default())?;
/// ```
pub fn write_wav_planar<P: AsRef<Path>>(
    path: P,
    channels: &[Vec<f32>],
    spec: WavSpec,
) -> Result<()> {
    if channels.is_empty() || channels.len() > usize::from(u16::MAX) {
        return Err(Error::ChannelCount(channels.len().min(usize::from(u16::MAX)) as u16));
    }

    let spec = WavSpec {
        channels: channels.len() as u16,
        ..spec
    };
    let frames = channels.iter().map(Vec::len).min().unwrap_or(0);
    let mut writer = WavWriter::create(path.as_ref(), hound::WavSpec::from(spec))?;

    if spec.bits_per_sample == 32 {
        for i in 0..frames {
            for channel in channels {
                writer.write_sample(channel[i])?;
            }
        }
    } else {
        let max_val = int_scale(spec.bits_per_sample);
        for i in 0..frames {
            for channel in channels {
                let int_sample = (channel[i] * max_val).clamp(-max_val, max_val - 1.0) as i32;
                writer.write_sample(int_sample)?;
            }
        }
    }

    writer.finalize()?;

    tracing::debug!(
        path = %path.as_ref().display(),
        channels = spec.channels,
        frames,
        bits = spec.bits_per_sample,
        "wrote WAV file"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn spec(channels: u16, bits: u16) -> WavSpec {
        WavSpec {
            channels,
            sample_rate: 48000,
            bits_per_sample: bits,
        }
    }

    #[test]
    fn test_roundtrip_stereo_f32() {
        let left: Vec<f32> = (0..1000).map(|i| (i as f32 / 1000.0).sin()).collect();
        let right: Vec<f32> = (0..1000).map(|i| (i as f32 / 1000.0).cos()).collect();

        let file = NamedTempFile::new().unwrap();
        write_wav_planar(file.path(), &[left.clone(), right.clone()], spec(2, 32)).unwrap();

        let (loaded, loaded_spec) = read_wav_planar(file.path()).unwrap();
        assert_eq!(loaded_spec, spec(2, 32));
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0], left);
        assert_eq!(loaded[1], right);
    }

    #[test]
    fn test_roundtrip_i16() {
        let samples: Vec<f32> = (0..1000).map(|i| (i as f32 / 1000.0).sin() * 0.9).collect();

        let file = NamedTempFile::new().unwrap();
        write_wav_planar(file.path(), &[samples.clone()], spec(1, 16)).unwrap();

        let (loaded, loaded_spec) = read_wav_planar(file.path()).unwrap();
        assert_eq!(loaded_spec.bits_per_sample, 16);
        assert_eq!(loaded.len(), 1);

        // 16-bit has less precision
        for (a, b) in samples.iter().zip(&loaded[0]) {
            assert!((a - b).abs() < 0.001);
        }
    }

    #[test]
    fn test_roundtrip_i24() {
        let samples: Vec<f32> = (0..500).map(|i| (i as f32 * 0.01).sin() * 0.5).collect();

        let file = NamedTempFile::new().unwrap();
        write_wav_planar(file.path(), &[samples.clone()], spec(1, 24)).unwrap();

        let (loaded, _) = read_wav_planar(file.path()).unwrap();
        for (a, b) in samples.iter().zip(&loaded[0]) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn test_integer_writes_clamp() {
        let file = NamedTempFile::new().unwrap();
        write_wav_planar(file.path(), &[vec![2.0, -2.0]], spec(1, 16)).unwrap();

        let (loaded, _) = read_wav_planar(file.path()).unwrap();
        assert!(loaded[0][0] < 1.0 && loaded[0][0] > 0.999);
        assert_eq!(loaded[0][1], -1.0);
    }

    #[test]
    fn test_extra_channels_are_dropped() {
        let file = NamedTempFile::new().unwrap();
        let quad = vec![vec![0.1; 64], vec![0.2; 64], vec![0.3; 64], vec![0.4; 64]];
        write_wav_planar(file.path(), &quad, spec(4, 32)).unwrap();

        let (loaded, loaded_spec) = read_wav_planar(file.path()).unwrap();
        assert_eq!(loaded_spec.channels, 2);
        assert_eq!(loaded, vec![vec![0.1; 64], vec![0.2; 64]]);
    }

    #[test]
    fn test_empty_file_is_rejected() {
        let file = NamedTempFile::new().unwrap();
        write_wav_planar(file.path(), &[Vec::new()], spec(1, 32)).unwrap();
        assert!(matches!(read_wav_planar(file.path()), Err(Error::EmptyFile)));
    }

    #[test]
    fn test_no_channels_is_rejected() {
        let file = NamedTempFile::new().unwrap();
        let result = write_wav_planar(file.path(), &[], spec(2, 32));
        assert!(matches!(result, Err(Error::ChannelCount(0))));
    }

    #[test]
    fn test_info_reports_frames() {
        let file = NamedTempFile::new().unwrap();
        write_wav_planar(file.path(), &[vec![0.0; 4800], vec![0.0; 4800]], spec(2, 24)).unwrap();

        let info = read_wav_info(file.path()).unwrap();
        assert_eq!(info.channels, 2);
        assert_eq!(info.num_frames, 4800);
        assert_eq!(info.format, WavFormat::Pcm);
        assert!((info.duration_secs - 0.1).abs() < 1e-9);
    }
}
