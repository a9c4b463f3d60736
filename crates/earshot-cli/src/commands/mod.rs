//! CLI command implementations.

pub mod common;
pub mod info;
pub mod noise;
pub mod profiles;
pub mod render;
