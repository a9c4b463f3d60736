//! Session configuration for earshot.
//!
//! A session file records the listening environment and render settings so a
//! render can be repeated without retyping flags.
//!
//! # Features
//!
//! - **Session files**: load and save [`SessionConfig`] as TOML
//! - **Validation**: range checks for every numeric field
//! - **Paths**: platform-specific config directory via `dirs`
//!
//! # Example
//!
//! ```rust,no_run
//! use earshot_config::{SessionConfig, default_session_path};
//!
//! let session = SessionConfig {
//!     profile: "the-phone".to_string(),
//!     noise_amount: 0.35,
//!     ..Default::default()
//! };
//! session.validate().unwrap();
//! session.save(default_session_path()).unwrap();
//!
//! let loaded = SessionConfig::load(default_session_path()).unwrap();
//! assert_eq!(loaded.resolve_profile().unwrap(), 2);
//! ```

mod error;
mod session;

/// Platform-specific configuration paths.
pub mod paths;

/// Session field validation.
pub mod validation;

pub use error::ConfigError;
pub use paths::{default_session_path, user_config_dir};
pub use session::SessionConfig;
pub use validation::{
    MAX_BLOCK_SIZE, SUPPORTED_BIT_DEPTHS, ValidationError, ValidationResult, validate_session,
};
