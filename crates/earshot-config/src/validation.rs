//! Range checks for session fields.
//!
//! ```rust
//! use earshot_config::{SessionConfig, ValidationError, validate_session};
//!
//! let mut session = SessionConfig::default();
//! session.bit_depth = 20;
//! assert_eq!(validate_session(&session), Err(ValidationError::BitDepth(20)));
//! ```

use thiserror::Error;

use crate::SessionConfig;

/// Largest accepted render block size.
pub const MAX_BLOCK_SIZE: usize = 8192;

/// Output bit depths the WAV writer supports.
pub const SUPPORTED_BIT_DEPTHS: [u16; 3] = [16, 24, 32];

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A unit-range value out of range.
    #[error("'{field}' value {value} out of range [0, 1]")]
    OutOfRange {
        /// Name of the field.
        field: &'static str,
        /// The value that was out of range.
        value: f32,
    },

    /// Block size zero or above [`MAX_BLOCK_SIZE`].
    #[error("block size {0} out of range [1, {MAX_BLOCK_SIZE}]")]
    BlockSize(usize),

    /// Bit depth not in [`SUPPORTED_BIT_DEPTHS`].
    #[error("unsupported bit depth {0} (expected 16, 24 or 32)")]
    BitDepth(u16),

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn check_unit(field: &'static str, value: f32, errors: &mut Vec<ValidationError>) {
    if !(0.0..=1.0).contains(&value) {
        errors.push(ValidationError::OutOfRange { field, value });
    }
}

/// Check every numeric field of `session`.
///
/// Reports a single error directly and several as
/// [`ValidationError::Multiple`]. The profile string is not checked here;
/// see [`SessionConfig::resolve_profile`].
pub fn validate_session(session: &SessionConfig) -> ValidationResult<()> {
    let mut errors = Vec::new();

    check_unit("noise_amount", session.noise_amount, &mut errors);
    check_unit("mix", session.mix, &mut errors);

    if session.block_size == 0 || session.block_size > MAX_BLOCK_SIZE {
        errors.push(ValidationError::BlockSize(session.block_size));
    }
    if !SUPPORTED_BIT_DEPTHS.contains(&session.bit_depth) {
        errors.push(ValidationError::BitDepth(session.bit_depth));
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}
