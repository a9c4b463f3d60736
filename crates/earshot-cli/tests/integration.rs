//! Integration tests for the `earshot` binary.

use std::path::Path;
use std::process::Command;

use earshot_io::{WavSpec, read_wav_info, read_wav_planar, write_wav_planar};
use tempfile::TempDir;

/// Helper to get the path to the `earshot` binary built by cargo.
fn earshot_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_earshot"));
    // Keep any real user session out of the tests.
    cmd.env("XDG_CONFIG_HOME", std::env::temp_dir().join("earshot-cli-tests"));
    cmd.env("HOME", std::env::temp_dir().join("earshot-cli-tests"));
    cmd
}

fn write_sine(path: &Path, channels: u16, frames: usize) {
    let signal: Vec<f32> = (0..frames)
        .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 44100.0).sin() * 0.5)
        .collect();
    let spec = WavSpec {
        channels,
        sample_rate: 44100,
        bits_per_sample: 32,
    };
    write_wav_planar(path, &vec![signal; usize::from(channels)], spec).unwrap();
}

// ---------------------------------------------------------------------------
// earshot profiles
// ---------------------------------------------------------------------------

#[test]
fn cli_profiles_lists_catalog() {
    let output = earshot_bin()
        .arg("profiles")
        .output()
        .expect("failed to run earshot profiles");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for slug in [
        "bypass",
        "the-sedan",
        "the-phone",
        "the-laptop",
        "the-bluetooth-speaker",
    ] {
        assert!(stdout.contains(slug), "listing should contain '{slug}'");
    }
}

// ---------------------------------------------------------------------------
// earshot render
// ---------------------------------------------------------------------------

#[test]
fn cli_render_bypass_is_bit_exact() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    let output = dir.path().join("out.wav");
    write_sine(&input, 2, 9000);

    let status = earshot_bin()
        .args(["render", "--profile", "bypass", "--bit-depth", "32"])
        .arg(&input)
        .arg(&output)
        .status()
        .expect("failed to run earshot render");
    assert!(status.success());

    let (a, _) = read_wav_planar(&input).unwrap();
    let (b, _) = read_wav_planar(&output).unwrap();
    assert_eq!(a, b);
}

#[test]
fn cli_render_phone_writes_requested_format() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    let output = dir.path().join("phone.wav");
    write_sine(&input, 2, 4410);

    let status = earshot_bin()
        .args(["render", "-p", "the-phone", "--noise", "0.2", "--bit-depth", "16"])
        .arg(&input)
        .arg(&output)
        .status()
        .unwrap();
    assert!(status.success());

    let info = read_wav_info(&output).unwrap();
    assert_eq!(info.bits_per_sample, 16);
    assert_eq!(info.channels, 2);
    assert_eq!(info.num_frames, 4410);
}

#[test]
fn cli_render_all_writes_one_file_per_environment() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    write_sine(&input, 1, 2048);

    let status = earshot_bin()
        .args(["render", "--all"])
        .arg(&input)
        .arg(dir.path().join("mix.wav"))
        .status()
        .unwrap();
    assert!(status.success());

    for slug in ["the-sedan", "the-phone", "the-laptop", "the-bluetooth-speaker"] {
        let path = dir.path().join(format!("mix-{slug}.wav"));
        assert!(path.exists(), "missing {}", path.display());
    }
    assert!(!dir.path().join("mix-bypass.wav").exists());
}

#[test]
fn cli_render_reads_session_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    let output = dir.path().join("out.wav");
    let session = dir.path().join("session.toml");
    write_sine(&input, 1, 2048);
    std::fs::write(&session, "profile = \"the-laptop\"\nbit_depth = 32\n").unwrap();

    let status = earshot_bin()
        .arg("render")
        .arg("--config")
        .arg(&session)
        .arg(&input)
        .arg(&output)
        .status()
        .unwrap();
    assert!(status.success());

    let info = read_wav_info(&output).unwrap();
    assert_eq!(info.bits_per_sample, 32);
    let (a, _) = read_wav_planar(&input).unwrap();
    let (b, _) = read_wav_planar(&output).unwrap();
    assert_ne!(a, b, "the laptop profile should change the signal");
}

#[test]
fn cli_render_rejects_unknown_profile() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    write_sine(&input, 1, 512);

    let output = earshot_bin()
        .args(["render", "--profile", "the-submarine"])
        .arg(&input)
        .arg(dir.path().join("out.wav"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown profile"), "stderr: {stderr}");
}

// ---------------------------------------------------------------------------
// earshot noise / info
// ---------------------------------------------------------------------------

#[test]
fn cli_noise_renders_requested_length() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("noise.wav");

    let status = earshot_bin()
        .args(["noise", "--amount", "1.0", "--seconds", "0.5", "--channels", "1"])
        .arg(&output)
        .status()
        .unwrap();
    assert!(status.success());

    let (channels, spec) = read_wav_planar(&output).unwrap();
    assert_eq!(spec.sample_rate, 44100);
    assert_eq!(channels.len(), 1);
    assert_eq!(channels[0].len(), 22050);
    assert!(channels[0].iter().any(|&s| s != 0.0));
}

#[test]
fn cli_info_prints_metadata() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    write_sine(&input, 2, 44100);

    let output = earshot_bin().arg("info").arg(&input).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("44100 Hz"), "stdout: {stdout}");
    assert!(stdout.contains("Channels:    2 (stereo)"), "stdout: {stdout}");
    assert!(stdout.contains("Levels:"), "stdout: {stdout}");
}
