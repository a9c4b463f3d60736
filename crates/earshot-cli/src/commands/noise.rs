//! Render the ambient noise bed over silence.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use earshot_core::ProcessSpec;
use earshot_core::noise::DEFAULT_SEED;
use earshot_engine::{EngineParams, EnvironmentEngine, ImpulseLibrary};
use earshot_io::{WavSpec, write_wav_planar};

use super::common::{frame_progress, print_levels, render_blocks};

const BLOCK_SIZE: usize = 512;

#[derive(Args)]
pub struct NoiseArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Noise amount, 0 to 1
    #[arg(short, long, default_value = "0.5")]
    amount: f32,

    /// Duration in seconds
    #[arg(short, long, default_value = "5.0")]
    seconds: f32,

    /// Sample rate in Hz
    #[arg(short = 'r', long, default_value = "44100")]
    sample_rate: u32,

    /// Output channels (1 or 2)
    #[arg(long, default_value = "2", value_parser = clap::value_parser!(u16).range(1..=2))]
    channels: u16,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "24")]
    bit_depth: u16,

    /// Noise generator seed
    #[arg(long)]
    seed: Option<u32>,
}

pub fn run(args: NoiseArgs) -> anyhow::Result<()> {
    if !(0.0..=1.0).contains(&args.amount) {
        anyhow::bail!("noise amount {} out of range [0, 1]", args.amount);
    }
    if !args.seconds.is_finite() || args.seconds <= 0.0 {
        anyhow::bail!("duration must be positive, got {}", args.seconds);
    }
    if args.sample_rate == 0 {
        anyhow::bail!("sample rate must be positive");
    }

    let frames = (args.seconds * args.sample_rate as f32).round() as usize;
    let params = Arc::new(EngineParams::new());
    params.set_noise_amount(args.amount);

    let mut engine =
        EnvironmentEngine::with_noise_seed(Arc::clone(&params), args.seed.unwrap_or(DEFAULT_SEED));
    engine.prepare(
        ProcessSpec::new(
            args.sample_rate as f32,
            BLOCK_SIZE,
            usize::from(args.channels),
        ),
        &ImpulseLibrary::new(),
    );

    println!(
        "Rendering {:.2}s of noise at amount {:.2}...",
        args.seconds,
        params.noise_amount()
    );
    let mut channels = vec![vec![0.0; frames]; usize::from(args.channels)];
    let pb = frame_progress(frames)?;
    render_blocks(&mut engine, &mut channels, BLOCK_SIZE, &pb);
    print_levels("Noise:", &channels);

    let spec = WavSpec {
        channels: args.channels,
        sample_rate: args.sample_rate,
        bits_per_sample: args.bit_depth,
    };
    write_wav_planar(&args.output, &channels, spec)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!("Wrote {}", args.output.display());
    Ok(())
}
