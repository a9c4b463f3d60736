//! Platform-specific paths for session configuration.
//!
//! - **User config**: `~/.config/earshot/` (Linux),
//!   `~/Library/Application Support/earshot/` (macOS), `%APPDATA%\earshot\`
//!   (Windows)
//! - **Default session**: `session.toml` inside the user config directory

use std::path::PathBuf;

/// Application name used for directory paths.
const APP_NAME: &str = "earshot";

/// File name of the default session.
const SESSION_FILE: &str = "session.toml";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Path of the session file used when no `--config` is given.
pub fn default_session_path() -> PathBuf {
    user_config_dir().join(SESSION_FILE)
}
