//! Error types for configuration operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, saving or applying a session.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A session file could not be read
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// File that was being read.
        path: PathBuf,
        /// Cause.
        #[source]
        source: std::io::Error,
    },

    /// A session file could not be written
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// File that was being written.
        path: PathBuf,
        /// Cause.
        #[source]
        source: std::io::Error,
    },

    /// A parent directory for a session file could not be created
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        /// Directory that was being created.
        path: PathBuf,
        /// Cause.
        #[source]
        source: std::io::Error,
    },

    /// The session file is not valid TOML for [`SessionConfig`](crate::SessionConfig)
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// The session could not be encoded as TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// The profile string matches no catalog entry
    #[error("unknown profile: {0}")]
    UnknownProfile(String),

    /// One or more fields are out of range
    #[error("validation failed: {0}")]
    Validation(#[from] crate::validation::ValidationError),
}

impl ConfigError {
    /// [`ConfigError::ReadFile`] for `path`.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// [`ConfigError::WriteFile`] for `path`.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// [`ConfigError::CreateDir`] for `path`.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::CreateDir {
            path: path.into(),
            source,
        }
    }
}
