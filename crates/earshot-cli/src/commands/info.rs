//! WAV metadata and level readout.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use earshot_core::{linear_to_db, peak, rms};
use earshot_io::{WavFormat, WavInfo, read_wav_info, read_wav_planar};

/// Display WAV file information.
#[derive(Args)]
pub struct InfoArgs {
    /// Path to the WAV file
    pub file: PathBuf,

    /// Skip decoding the samples; header fields only
    #[arg(long)]
    pub header_only: bool,
}

fn describe_format(info: &WavInfo) -> String {
    let encoding = match info.format {
        WavFormat::Pcm => "PCM",
        WavFormat::IeeeFloat => "IEEE Float",
    };
    format!("{encoding} {}-bit", info.bits_per_sample)
}

fn describe_layout(channels: u16) -> &'static str {
    match channels {
        1 => "mono, rendered as a single channel",
        2 => "stereo",
        _ => "multichannel, only the first two channels are rendered",
    }
}

/// Run the info command.
pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let info = read_wav_info(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let file_size = std::fs::metadata(&args.file)
        .with_context(|| format!("failed to stat {}", args.file.display()))?
        .len();

    println!("File:        {}", args.file.display());
    println!("Format:      {}", describe_format(&info));
    println!(
        "Channels:    {} ({})",
        info.channels,
        describe_layout(info.channels)
    );
    println!("Sample Rate: {} Hz", info.sample_rate);
    println!(
        "Duration:    {:.3}s ({} frames)",
        info.duration_secs, info.num_frames
    );
    println!("File Size:   {:.1} KiB", file_size as f64 / 1024.0);

    if args.header_only || info.num_frames == 0 {
        return Ok(());
    }

    let (channels, _) = read_wav_planar(&args.file)
        .with_context(|| format!("failed to decode {}", args.file.display()))?;
    println!("\nLevels:");
    for (index, channel) in channels.iter().enumerate() {
        println!(
            "  ch{}  RMS {:.1} dB, Peak {:.1} dB",
            index + 1,
            linear_to_db(rms(channel)),
            linear_to_db(peak(channel))
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts() {
        assert_eq!(describe_layout(2), "stereo");
        assert!(describe_layout(6).contains("first two"));
    }

    #[test]
    fn float_format_label() {
        let info = WavInfo {
            channels: 2,
            sample_rate: 48000,
            bits_per_sample: 32,
            num_frames: 0,
            duration_secs: 0.0,
            format: WavFormat::IeeeFloat,
        };
        assert_eq!(describe_format(&info), "IEEE Float 32-bit");
    }
}
