use facade_scene::{LightSource, Material, Scene};
use glam::Vec3;
use std::fmt::Write;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(15.0, 5.0, 15.0),
            target: Vec3::ZERO,
            fov_degrees: 50.0,
        }
    }
}

/// Renderer-agnostic interface.
///
/// A renderer reads the scene and a view and produces output. It never
/// mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame of `scene` as seen from `view`.
    fn render(&self, scene: &Scene, view: &RenderView) -> Self::Output;
}

/// Renders the scene as a human-readable listing.
///
/// Used by the CLI and by tests that check what a frame would contain
/// without a GPU.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, view: &RenderView) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== {} ===", scene.summary());
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        );

        out.push_str("Lights:\n");
        for light in scene.all_lights() {
            let detail = match light {
                LightSource::Directional(d) => format!(
                    "from=({:.1}, {:.1}, {:.1}) color={}{}",
                    d.position.x,
                    d.position.y,
                    d.position.z,
                    d.color,
                    if d.shadow.is_some() { " shadow" } else { "" }
                ),
                LightSource::Point(p) => format!(
                    "at=({:.2}, {:.2}, {:.2}) distance={:.1}",
                    p.position.x, p.position.y, p.position.z, p.distance
                ),
                LightSource::Ambient(a) => format!("color={}", a.color),
                LightSource::Hemisphere(h) => {
                    format!("sky={} ground={}", h.sky_color, h.ground_color)
                }
            };
            let _ = writeln!(
                out,
                "  {:<11} i={:.2} {detail}",
                light.kind(),
                light.intensity()
            );
        }

        out.push_str("Primitives:\n");
        for p in scene.primitives() {
            let material = match &p.material {
                Material::Opaque(m) => match m.emissive {
                    Some(e) => format!(
                        "opaque {} emissive={}x{:.1}",
                        m.base_color, e.color, e.intensity
                    ),
                    None => format!(
                        "opaque {} r={:.2} m={:.2}",
                        m.base_color, m.roughness, m.metalness
                    ),
                },
                Material::Glass(m) => format!(
                    "glass {} t={:.2} opacity={:.2}",
                    m.base_color, m.transmission, m.opacity
                ),
            };
            let _ = writeln!(
                out,
                "  {:<16} pos=({:.2}, {:.2}, {:.2}) size=({:.2}, {:.2}, {:.2}) {material}",
                p.label,
                p.position.x,
                p.position.y,
                p.position.z,
                p.dimensions.x,
                p.dimensions.y,
                p.dimensions.z
            );
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facade_scene::build_facade;

    #[test]
    fn debug_renderer_empty_scene() {
        let scene = Scene::new(Vec::new(), Vec::new());
        let output = DebugTextRenderer::new().render(&scene, &RenderView::default());
        assert!(output.contains("primitives=0"));
        assert!(output.contains("fov=50"));
    }

    #[test]
    fn debug_renderer_lists_facade() {
        let scene = build_facade();
        let output = DebugTextRenderer::new().render(&scene, &RenderView::default());
        assert!(output.contains("primitives=29"));
        assert!(output.contains("fin-left-7"));
        assert!(output.contains("fin-right-5"));
        assert!(output.contains("glass #87ceeb"));
        assert!(output.contains("directional"));
        assert!(output.contains("hemisphere"));
        assert!(output.contains("eye=(15.0, 5.0, 15.0)"));
    }

    #[test]
    fn render_view_default() {
        let view = RenderView::default();
        assert_eq!(view.fov_degrees, 50.0);
        assert_eq!(view.target, Vec3::ZERO);
    }
}
