//! Rendering adapter: renderer-agnostic camera, settings and render interface.
//!
//! # Invariants
//! - Renderers read the scene; they never mutate it.
//! - Camera state is the only thing user input changes, and every change
//!   goes through `OrbitCamera::update`, which enforces the orbit limits.

mod camera;
mod renderer;
mod settings;

pub use camera::{OrbitCamera, OrbitConstraints};
pub use renderer::{DebugTextRenderer, RenderView, Renderer};
pub use settings::{CameraSettings, ContactShadowSettings, ToneMapping, ViewerSettings};

pub fn crate_info() -> &'static str {
    "facade-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
