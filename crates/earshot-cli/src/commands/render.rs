//! File rendering through a listening environment.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use earshot_config::SessionConfig;
use earshot_core::ProcessSpec;
use earshot_engine::{BYPASS_INDEX, EngineParams, EnvironmentEngine, ImpulseLibrary, PROFILES};
use earshot_io::{WavSpec, load_impulse_library, read_wav_planar, write_wav_planar};

use super::common::{frame_progress, load_session, print_levels, render_blocks};

#[derive(Args)]
pub struct RenderArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file (with --all, the base name for one file per profile)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Profile by slug, name or index (see `earshot profiles`)
    #[arg(short, long)]
    profile: Option<String>,

    /// Ambient noise amount, 0 to 1
    #[arg(short, long)]
    noise: Option<f32>,

    /// Raise the high-pass to simulate open windows
    #[arg(short, long)]
    windows_down: bool,

    /// Global dry/wet mix, 0 to 1
    #[arg(short, long)]
    mix: Option<f32>,

    /// Processing block size
    #[arg(long)]
    block_size: Option<usize>,

    /// Output bit depth (16, 24, or 32)
    #[arg(long)]
    bit_depth: Option<u16>,

    /// Directory of impulse responses named <key>.wav
    #[arg(long, value_name = "DIR")]
    impulses: Option<PathBuf>,

    /// Session file (TOML); flags override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Render every environment, one output file each
    #[arg(long, conflicts_with = "profile")]
    all: bool,
}

impl RenderArgs {
    /// Session file values overridden by any flags given.
    fn session(&self) -> anyhow::Result<SessionConfig> {
        let mut session = load_session(self.config.as_deref())?;
        if let Some(profile) = &self.profile {
            session.profile.clone_from(profile);
        }
        if let Some(noise) = self.noise {
            session.noise_amount = noise;
        }
        if self.windows_down {
            session.windows_down = true;
        }
        if let Some(mix) = self.mix {
            session.mix = mix;
        }
        if let Some(block_size) = self.block_size {
            session.block_size = block_size;
        }
        if let Some(bit_depth) = self.bit_depth {
            session.bit_depth = bit_depth;
        }
        if let Some(dir) = &self.impulses {
            session.impulse_dir = Some(dir.clone());
        }
        session.validate()?;
        Ok(session)
    }
}

/// `input.wav` + `the-phone` -> `input-the-phone.wav`, next to `base`.
fn suffixed_path(base: &Path, slug: &str) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "render".to_string());
    let ext = base
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "wav".to_string());
    base.with_file_name(format!("{stem}-{slug}.{ext}"))
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let session = args.session()?;

    println!("Reading {}...", args.input.display());
    let (input, spec) = read_wav_planar(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let frames = input.first().map_or(0, Vec::len);
    println!(
        "  {} frames, {} channel(s), {} Hz, {:.2}s",
        frames,
        input.len(),
        spec.sample_rate,
        frames as f32 / spec.sample_rate as f32
    );

    let library = match &session.impulse_dir {
        Some(dir) => load_impulse_library(dir)
            .with_context(|| format!("failed to load impulses from {}", dir.display()))?,
        None => ImpulseLibrary::new(),
    };
    if !library.is_empty() {
        println!("  {} impulse response(s) loaded", library.len());
    }

    let targets: Vec<(usize, PathBuf)> = if args.all {
        (0..PROFILES.len())
            .filter(|&index| index != BYPASS_INDEX)
            .map(|index| (index, suffixed_path(&args.output, PROFILES[index].slug)))
            .collect()
    } else {
        vec![(session.resolve_profile()?, args.output.clone())]
    };

    let out_spec = WavSpec {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: session.bit_depth,
    };

    println!("\nStats:");
    print_levels("Input:", &input);

    for (index, output_path) in targets {
        let profile = &PROFILES[index];
        let params = Arc::new(EngineParams::new());
        let target = SessionConfig {
            profile: index.to_string(),
            ..session.clone()
        };
        target.apply_to(&params)?;

        let mut engine = EnvironmentEngine::new(Arc::clone(&params));
        engine.prepare(
            ProcessSpec::new(spec.sample_rate as f32, session.block_size, input.len()),
            &library,
        );
        if profile.impulse.is_some() && !engine.has_impulse(index) {
            tracing::info!(profile = profile.slug, "no impulse response, convolution off");
        }

        println!("\n{}:", profile.name);
        let mut channels = input.clone();
        let pb = frame_progress(frames)?;
        render_blocks(&mut engine, &mut channels, session.block_size, &pb);
        print_levels("Output:", &channels);

        write_wav_planar(&output_path, &channels, out_spec)
            .with_context(|| format!("failed to write {}", output_path.display()))?;
        println!("  Wrote {}", output_path.display());
    }

    println!("Done!");
    Ok(())
}
