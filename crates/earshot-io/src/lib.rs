//! File I/O for earshot.
//!
//! This crate provides:
//!
//! - **WAV file I/O**: [`read_wav_planar`] and [`write_wav_planar`] for
//!   loading and saving mono or stereo audio as one buffer per channel
//! - **Metadata**: [`read_wav_info`] reads the header without decoding samples
//! - **Impulse responses**: [`load_impulse_library`] collects a directory of
//!   `<key>.wav` files into an [`ImpulseLibrary`](earshot_engine::ImpulseLibrary)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use earshot_io::{read_wav_planar, write_wav_planar};
//!
//! let (mut channels, spec) = read_wav_planar("input.wav")?;
//! // ... run `channels` through an EnvironmentEngine ...
//! write_wav_planar("output.wav", &channels, spec)?;
//! ```

mod impulses;
mod wav;

pub use impulses::load_impulse_library;
pub use wav::{WavFormat, WavInfo, WavSpec, read_wav_info, read_wav_planar, write_wav_planar};

/// Error types for file I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file or buffer set has a channel count the engine cannot use.
    #[error("Unsupported channel count: {0}")]
    ChannelCount(u16),

    /// The file holds no sample frames.
    #[error("WAV file contains no audio")]
    EmptyFile,
}

/// Convenience result type for file I/O.
pub type Result<T> = std::result::Result<T, Error>;
