//! wgpu render backend for the façade viewer.
//!
//! Draws the scene's boxes with physically based shading into an HDR
//! target, then tone maps onto the swapchain. Shadow maps and the contact
//! shadow are baked once; the scene never changes after startup.
//!
//! # Invariants
//! - The renderer never mutates the scene.
//! - Glass is drawn after all opaque geometry, farthest first.
//! - The background color bypasses tone mapping.

mod contact;
mod environment;
mod gpu;
mod layout;
mod mesh;
mod shaders;
mod shadow;
mod targets;
mod tonemap;
mod uniforms;

pub use gpu::{FacadeRenderer, FrameContent};
pub use targets::HDR_FORMAT;

/// Errors from GPU resource creation.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("environment map {width}x{height} exceeds the device texture limit of {limit}")]
    EnvironmentTooLarge { width: u32, height: u32, limit: u32 },
    #[error("environment map has no mip levels")]
    EmptyEnvironment,
}
