//! Shared CLI helpers used across multiple commands.

use std::path::Path;

use anyhow::Context;
use earshot_config::{SessionConfig, default_session_path};
use earshot_core::{linear_to_db, peak, rms};
use earshot_engine::EnvironmentEngine;
use indicatif::{ProgressBar, ProgressStyle};

/// Load the session named by `--config`, else the default session file if
/// one exists, else the built-in defaults.
pub fn load_session(config: Option<&Path>) -> anyhow::Result<SessionConfig> {
    if let Some(path) = config {
        return SessionConfig::load(path)
            .with_context(|| format!("failed to load session {}", path.display()));
    }

    let default_path = default_session_path();
    if default_path.is_file() {
        tracing::info!(path = %default_path.display(), "using default session");
        return SessionConfig::load(&default_path)
            .with_context(|| format!("failed to load session {}", default_path.display()));
    }

    Ok(SessionConfig::default())
}

/// Progress bar counting frames.
pub fn frame_progress(frames: usize) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(frames as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );
    Ok(pb)
}

/// Run planar `channels` through `engine` in blocks of `block_size` frames.
pub fn render_blocks(
    engine: &mut EnvironmentEngine,
    channels: &mut [Vec<f32>],
    block_size: usize,
    pb: &ProgressBar,
) {
    let frames = channels.iter().map(Vec::len).min().unwrap_or(0);
    let block_size = block_size.max(1);
    let mut start = 0;

    while start < frames {
        let end = (start + block_size).min(frames);
        let mut block: Vec<&mut [f32]> = channels
            .iter_mut()
            .map(|channel| &mut channel[start..end])
            .collect();
        engine.process(&mut block);
        start = end;
        pb.set_position(start as u64);
    }

    pb.finish_and_clear();
}

/// Level of the loudest channel as `(rms_db, peak_db)`.
pub fn levels(channels: &[Vec<f32>]) -> (f32, f32) {
    let rms_level = channels.iter().map(|c| rms(c)).fold(0.0, f32::max);
    let peak_level = channels.iter().map(|c| peak(c)).fold(0.0, f32::max);
    (linear_to_db(rms_level), linear_to_db(peak_level))
}

/// Print one line of level statistics.
pub fn print_levels(label: &str, channels: &[Vec<f32>]) {
    let (rms_db, peak_db) = levels(channels);
    println!("  {label:<7} RMS {rms_db:.1} dB, Peak {peak_db:.1} dB");
}
