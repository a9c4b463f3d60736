//! Session file format and operations.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use earshot_engine::params::snap_to_step;
use earshot_engine::{EngineParams, find_profile};

use crate::error::ConfigError;
use crate::validation::validate_session;

/// Render settings and engine controls for one session.
///
/// # TOML Format
///
/// ```toml
/// profile = "the-phone"      # slug, display name, or index
/// noise_amount = 0.35
/// windows_down = false
/// mix = 1.0
/// block_size = 512
/// bit_depth = 24
/// impulse_dir = "irs"
/// ```
///
/// Every field is optional in the file; missing fields take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Profile selector, resolved with [`resolve_profile`](Self::resolve_profile).
    pub profile: String,

    /// Ambient noise amount in `[0, 1]`.
    pub noise_amount: f32,

    /// Windows-down mode.
    pub windows_down: bool,

    /// Global dry/wet mix in `[0, 1]`.
    pub mix: f32,

    /// Frames per engine call when rendering files.
    pub block_size: usize,

    /// Output bit depth: 16, 24 or 32 (float).
    pub bit_depth: u16,

    /// Directory of `<key>.wav` impulse responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impulse_dir: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            profile: "bypass".to_string(),
            noise_amount: 0.0,
            windows_down: false,
            mix: 1.0,
            block_size: 512,
            bit_depth: 24,
            impulse_dir: None,
        }
    }
}

impl SessionConfig {
    /// Load a session from a TOML file.
    ///
    /// The result is validated and its noise amount and mix are snapped to
    /// the 0.01 control step.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse, validate and snap a session from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let mut session: SessionConfig = toml::from_str(toml_str)?;
        session.validate()?;
        session.noise_amount = snap_to_step(session.noise_amount);
        session.mix = snap_to_step(session.mix);
        Ok(session)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save the session to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Check every numeric field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_session(self)?;
        Ok(())
    }

    /// Catalog index for [`profile`](Self::profile).
    ///
    /// Accepts a numeric index, a slug, a display name, or a slug without
    /// its `the-` prefix, case-insensitively.
    pub fn resolve_profile(&self) -> Result<usize, ConfigError> {
        find_profile(&self.profile).ok_or_else(|| ConfigError::UnknownProfile(self.profile.clone()))
    }

    /// Push the session's engine controls into `params`.
    pub fn apply_to(&self, params: &EngineParams) -> Result<(), ConfigError> {
        let index = self.resolve_profile()?;
        params.set_profile(index);
        params.set_noise_amount(self.noise_amount);
        params.set_windows_down(self.windows_down);
        params.set_mix(self.mix);
        Ok(())
    }
}
