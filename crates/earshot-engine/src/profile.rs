//! The environment profile catalog.
//!
//! Every profile is a plain value record; the engine is driven entirely by
//! the data here. Index 0 is always bypass.
//!
//! | Index | Profile | HP / LP (Hz) | Bands | Trim | IR (wet) | Width | Extras |
//! |-------|---------|--------------|-------|------|----------|-------|--------|
//! | 0 | Bypass | - | 0 | 0 dB | - | 1.0 | - |
//! | 1 | The Sedan | 35 / 12000 | 6 | -2 dB | `sedan_cabin` (0.35) | 0.8 | early reflections |
//! | 2 | The Phone | 300 / 14000 | 5 | -4 dB | `phone_speaker` (0.25) | 0.0 | - |
//! | 3 | The Laptop | 200 / 16000 | 5 | -3 dB | `laptop_speaker` (0.2) | 0.6 | - |
//! | 4 | The Bluetooth Speaker | 60 / 15000 | 5 | -1 dB | `bt_speaker` (0.2) | 0.0 | compressor -12 dB 4:1 |

/// Number of biquad slots in the filter chain.
pub const MAX_FILTER_SECTIONS: usize = 10;

/// Peak bands that fit after the high-pass and low-pass slots.
pub const MAX_PEAK_BANDS: usize = MAX_FILTER_SECTIONS - 2;

/// Catalog index of the bypass profile.
pub const BYPASS_INDEX: usize = 0;

/// High-pass floor applied in windows-down mode.
pub const WINDOWS_DOWN_HIGHPASS_HZ: f32 = 500.0;

/// Compressor attack, identical for every compressed profile.
pub const COMPRESSOR_ATTACK_MS: f32 = 10.0;

/// Compressor release, identical for every compressed profile.
pub const COMPRESSOR_RELEASE_MS: f32 = 100.0;

/// One peaking EQ band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakBand {
    /// Center frequency in Hz
    pub frequency: f32,
    /// Boost (positive) or cut (negative) in dB
    pub gain_db: f32,
    /// Bandwidth as Q
    pub q: f32,
}

impl PeakBand {
    const fn new(frequency: f32, gain_db: f32, q: f32) -> Self {
        Self {
            frequency,
            gain_db,
            q,
        }
    }
}

/// Reference to an impulse response by library key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpulseRef {
    /// Key into the [`ImpulseLibrary`](crate::ImpulseLibrary)
    pub key: &'static str,
    /// Wet fraction of the convolution blend, 0.0 to 1.0
    pub wet_mix: f32,
}

/// Threshold and ratio of a compressed profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressorSettings {
    /// Threshold in dBFS
    pub threshold_db: f32,
    /// Compression ratio (>= 1)
    pub ratio: f32,
}

/// A complete simulated listening environment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentProfile {
    /// Display name
    pub name: &'static str,
    /// Lowercase, hyphenated identifier used on the command line and in config
    pub slug: &'static str,
    /// High-pass cutoff in Hz
    pub highpass_hz: f32,
    /// Low-pass cutoff in Hz
    pub lowpass_hz: f32,
    /// Peaking bands in processing order
    pub bands: &'static [PeakBand],
    /// Output trim in dB, applied last
    pub trim_db: f32,
    /// Optional impulse response and its wet mix
    pub impulse: Option<ImpulseRef>,
    /// Stereo width: 1.0 leaves the image alone, 0.0 collapses to mono
    pub width: f32,
    /// Enables the early-reflection network
    pub early_reflections: bool,
    /// Enables the compressor
    pub compressor: Option<CompressorSettings>,
}

impl EnvironmentProfile {
    /// Peak bands that fit in the chain. Extra bands are dropped.
    pub fn active_bands(&self) -> &'static [PeakBand] {
        &self.bands[..self.bands.len().min(MAX_PEAK_BANDS)]
    }

    /// High-pass cutoff with the windows-down floor applied when requested.
    pub fn effective_highpass(&self, windows_down: bool) -> f32 {
        if windows_down {
            self.highpass_hz.max(WINDOWS_DOWN_HIGHPASS_HZ)
        } else {
            self.highpass_hz
        }
    }

    /// True when the profile sums the stereo image to mono.
    pub fn mono_sum(&self) -> bool {
        self.width <= 0.0
    }

    /// Wet mix of the impulse response, 0 when there is none.
    pub fn impulse_wet_mix(&self) -> f32 {
        self.impulse.map_or(0.0, |ir| ir.wet_mix)
    }
}

const SEDAN_BANDS: &[PeakBand] = &[
    PeakBand::new(80.0, 4.0, 0.8),
    PeakBand::new(250.0, 3.0, 1.0),
    PeakBand::new(500.0, 1.5, 1.2),
    PeakBand::new(2000.0, -2.0, 1.0),
    PeakBand::new(6000.0, -5.0, 0.7),
    PeakBand::new(10000.0, -8.0, 0.7),
];

const PHONE_BANDS: &[PeakBand] = &[
    PeakBand::new(800.0, 2.0, 1.5),
    PeakBand::new(1500.0, 3.0, 1.2),
    PeakBand::new(3500.0, 5.0, 2.0),
    PeakBand::new(5000.0, 2.0, 1.5),
    PeakBand::new(8000.0, -3.0, 1.0),
];

const LAPTOP_BANDS: &[PeakBand] = &[
    PeakBand::new(400.0, -2.0, 1.0),
    PeakBand::new(1000.0, 2.0, 1.5),
    PeakBand::new(2500.0, 3.0, 1.2),
    PeakBand::new(5000.0, 1.0, 1.0),
    PeakBand::new(8000.0, -2.0, 0.8),
];

const BLUETOOTH_BANDS: &[PeakBand] = &[
    PeakBand::new(100.0, 6.0, 0.7),
    PeakBand::new(200.0, 3.0, 1.0),
    PeakBand::new(800.0, -1.0, 1.2),
    PeakBand::new(3000.0, 2.0, 1.0),
    PeakBand::new(7000.0, -4.0, 0.8),
];

/// The profile catalog, indexed by profile number.
pub static PROFILES: [EnvironmentProfile; 5] = [
    EnvironmentProfile {
        name: "Bypass",
        slug: "bypass",
        highpass_hz: 20.0,
        lowpass_hz: 20000.0,
        bands: &[],
        trim_db: 0.0,
        impulse: None,
        width: 1.0,
        early_reflections: false,
        compressor: None,
    },
    EnvironmentProfile {
        name: "The Sedan",
        slug: "the-sedan",
        highpass_hz: 35.0,
        lowpass_hz: 12000.0,
        bands: SEDAN_BANDS,
        trim_db: -2.0,
        impulse: Some(ImpulseRef {
            key: "sedan_cabin",
            wet_mix: 0.35,
        }),
        width: 0.8,
        early_reflections: true,
        compressor: None,
    },
    EnvironmentProfile {
        name: "The Phone",
        slug: "the-phone",
        highpass_hz: 300.0,
        lowpass_hz: 14000.0,
        bands: PHONE_BANDS,
        trim_db: -4.0,
        impulse: Some(ImpulseRef {
            key: "phone_speaker",
            wet_mix: 0.25,
        }),
        width: 0.0,
        early_reflections: false,
        compressor: None,
    },
    EnvironmentProfile {
        name: "The Laptop",
        slug: "the-laptop",
        highpass_hz: 200.0,
        lowpass_hz: 16000.0,
        bands: LAPTOP_BANDS,
        trim_db: -3.0,
        impulse: Some(ImpulseRef {
            key: "laptop_speaker",
            wet_mix: 0.2,
        }),
        width: 0.6,
        early_reflections: false,
        compressor: None,
    },
    EnvironmentProfile {
        name: "The Bluetooth Speaker",
        slug: "the-bluetooth-speaker",
        highpass_hz: 60.0,
        lowpass_hz: 15000.0,
        bands: BLUETOOTH_BANDS,
        trim_db: -1.0,
        impulse: Some(ImpulseRef {
            key: "bt_speaker",
            wet_mix: 0.2,
        }),
        width: 0.0,
        early_reflections: false,
        compressor: Some(CompressorSettings {
            threshold_db: -12.0,
            ratio: 4.0,
        }),
    },
];

/// Number of catalog entries, bypass included.
pub fn profile_count() -> usize {
    PROFILES.len()
}

/// Clamp an index into the catalog; anything out of range becomes bypass.
#[inline]
pub fn clamp_index(index: usize) -> usize {
    if index < PROFILES.len() {
        index
    } else {
        BYPASS_INDEX
    }
}

/// Profile at `index`, or bypass when out of range.
#[inline]
pub fn profile(index: usize) -> &'static EnvironmentProfile {
    &PROFILES[clamp_index(index)]
}

/// Look up a profile by slug, display name (case-insensitive) or index.
///
/// # Example
///
/// ```rust
/// use earshot_engine::profile::find_profile;
///
/// assert_eq!(find_profile("the-phone"), Some(2));
/// assert_eq!(find_profile("The Laptop"), Some(3));
/// assert_eq!(find_profile("4"), Some(4));
/// assert_eq!(find_profile("submarine"), None);
/// ```
pub fn find_profile(query: &str) -> Option<usize> {
    let query = query.trim();
    if let Ok(index) = query.parse::<usize>() {
        return (index < PROFILES.len()).then_some(index);
    }
    PROFILES.iter().position(|p| {
        p.slug.eq_ignore_ascii_case(query)
            || p.name.eq_ignore_ascii_case(query)
            || p.slug.strip_prefix("the-").is_some_and(|s| s.eq_ignore_ascii_case(query))
    })
}
