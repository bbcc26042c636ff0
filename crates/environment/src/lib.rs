//! Ambient environment: preset radiance maps and their one-shot background load.
//!
//! # Invariants
//! - Loading is the only asynchronous boundary in the viewer.
//! - A failed load degrades to rendering without reflections; it never aborts.

pub mod loader;
pub mod preset;

pub use loader::{EnvironmentLoader, LoadState};
pub use preset::{EnvironmentMap, EnvironmentPreset, MipLevel};

/// Errors from producing an environment map.
#[derive(Debug, thiserror::Error)]
pub enum EnvironmentError {
    #[error("failed to spawn environment loader thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("environment loader exited before delivering a map")]
    Disconnected,
    #[error("environment map {width}x{height} is invalid: {reason}")]
    InvalidMap {
        width: u32,
        height: u32,
        reason: &'static str,
    },
}
