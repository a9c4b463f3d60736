//! Environment catalog listing.

use clap::Args;
use earshot_engine::{EnvironmentProfile, PROFILES};

#[derive(Args)]
pub struct ProfilesArgs {
    /// Also print every peaking band
    #[arg(short, long)]
    bands: bool,
}

fn flags(profile: &EnvironmentProfile) -> String {
    let mut flags = Vec::new();
    if profile.mono_sum() {
        flags.push("mono".to_string());
    }
    if profile.early_reflections {
        flags.push("reflections".to_string());
    }
    if let Some(comp) = profile.compressor {
        flags.push(format!("comp {:.0} dB {:.0}:1", comp.threshold_db, comp.ratio));
    }
    if flags.is_empty() {
        "-".to_string()
    } else {
        flags.join(", ")
    }
}

pub fn run(args: ProfilesArgs) -> anyhow::Result<()> {
    println!("Environments\n");
    println!(
        "  {:<3} {:<22} {:<22} {:>7} {:>8} {:>5} {:<16} {:>5}  Flags",
        "#", "Name", "Slug", "HP Hz", "LP Hz", "Bands", "Impulse", "Width"
    );

    for (index, profile) in PROFILES.iter().enumerate() {
        let impulse = profile
            .impulse
            .map(|ir| format!("{} ({:.0}%)", ir.key, ir.wet_mix * 100.0))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<3} {:<22} {:<22} {:>7.0} {:>8.0} {:>5} {:<16} {:>5.1}  {}",
            index,
            profile.name,
            profile.slug,
            profile.highpass_hz,
            profile.lowpass_hz,
            profile.active_bands().len(),
            impulse,
            profile.width,
            flags(profile)
        );

        if args.bands {
            for band in profile.active_bands() {
                println!(
                    "        {:>7.0} Hz  {:+5.1} dB  Q {:.2}",
                    band.frequency, band.gain_db, band.q
                );
            }
            if profile.trim_db != 0.0 {
                println!("        trim {:+.1} dB", profile.trim_db);
            }
        }
    }

    println!("\nSelect with --profile by index, slug, or name.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bluetooth_flags_show_compressor() {
        let text = flags(&PROFILES[4]);
        assert!(text.contains("mono"), "got {text}");
        assert!(text.contains("comp -12 dB 4:1"), "got {text}");
    }

    #[test]
    fn bypass_has_no_flags() {
        assert_eq!(flags(&PROFILES[0]), "-");
    }
}
