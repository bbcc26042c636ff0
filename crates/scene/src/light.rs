use facade_common::Color;
use glam::{Mat4, Vec3};
use serde::Serialize;

/// Shadow-map parameters for a directional light.
///
/// The frustum is orthographic and expressed in the light's view space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShadowConfig {
    pub map_size: u32,
    pub near: f32,
    pub far: f32,
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub bias: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            map_size: 512,
            near: 0.5,
            far: 500.0,
            left: -5.0,
            right: 5.0,
            top: 5.0,
            bottom: -5.0,
            bias: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DirectionalLight {
    pub position: Vec3,
    pub target: Vec3,
    pub intensity: f32,
    pub color: Color,
    pub shadow: Option<ShadowConfig>,
}

impl DirectionalLight {
    pub fn new(position: Vec3, intensity: f32) -> Self {
        Self {
            position,
            target: Vec3::ZERO,
            intensity,
            color: Color::WHITE,
            shadow: None,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn cast_shadow(mut self, shadow: ShadowConfig) -> Self {
        self.shadow = Some(shadow);
        self
    }

    /// Direction the light travels in (from position toward target).
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// View-projection of the shadow camera, or `None` if the light casts no shadow.
    pub fn shadow_view_projection(&self) -> Option<Mat4> {
        let s = self.shadow?;
        let up = if self.direction().cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let view = Mat4::look_at_rh(self.position, self.target, up);
        let proj = Mat4::orthographic_rh(s.left, s.right, s.bottom, s.top, s.near, s.far);
        Some(proj * view)
    }
}

/// Omni light; when attached to a primitive its position is resolved by the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointLight {
    pub position: Vec3,
    pub intensity: f32,
    /// Cutoff distance; zero means unbounded.
    pub distance: f32,
    pub decay: f32,
    pub color: Color,
}

impl PointLight {
    pub fn new(intensity: f32, distance: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            intensity,
            distance,
            decay: 2.0,
            color: Color::WHITE,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Fraction of the light's intensity that reaches `distance` units away.
    pub fn attenuation(&self, distance: f32) -> f32 {
        let falloff = 1.0 / distance.powf(self.decay).max(0.01);
        if self.distance > 0.0 {
            let ratio = distance / self.distance;
            let window = (1.0 - ratio.powi(4)).clamp(0.0, 1.0);
            falloff * window * window
        } else {
            falloff
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AmbientLight {
    pub intensity: f32,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HemisphereLight {
    pub sky_color: Color,
    pub ground_color: Color,
    pub intensity: f32,
}

impl HemisphereLight {
    /// Irradiance reaching a surface with normal `n` (before the intensity scale).
    pub fn blend(&self, n: Vec3) -> Vec3 {
        let t = 0.5 * n.normalize_or_zero().y + 0.5;
        self.ground_color
            .to_linear()
            .lerp(self.sky_color.to_linear(), t)
    }
}

/// A light in the scene rig.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LightSource {
    Directional(DirectionalLight),
    Point(PointLight),
    Ambient(AmbientLight),
    Hemisphere(HemisphereLight),
}

impl LightSource {
    pub fn kind(&self) -> &'static str {
        match self {
            LightSource::Directional(_) => "directional",
            LightSource::Point(_) => "point",
            LightSource::Ambient(_) => "ambient",
            LightSource::Hemisphere(_) => "hemisphere",
        }
    }

    pub fn intensity(&self) -> f32 {
        match self {
            LightSource::Directional(l) => l.intensity,
            LightSource::Point(l) => l.intensity,
            LightSource::Ambient(l) => l.intensity,
            LightSource::Hemisphere(l) => l.intensity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_points_at_target() {
        let l = DirectionalLight::new(Vec3::new(10.0, 20.0, 10.0), 1.5);
        let d = l.direction();
        assert!(d.y < 0.0);
        assert!((d.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn shadow_matrix_maps_origin_inside_depth_range() {
        let l = DirectionalLight::new(Vec3::new(10.0, 20.0, 10.0), 1.5).cast_shadow(ShadowConfig {
            far: 50.0,
            left: -15.0,
            right: 15.0,
            top: 15.0,
            bottom: -15.0,
            ..ShadowConfig::default()
        });
        let m = l.shadow_view_projection().unwrap();
        let p = m.project_point3(Vec3::ZERO);
        assert!(p.x.abs() < 1e-4 && p.y.abs() < 1e-4);
        assert!(p.z > 0.0 && p.z < 1.0);
    }

    #[test]
    fn no_shadow_matrix_without_shadow() {
        let l = DirectionalLight::new(Vec3::new(-10.0, 15.0, -5.0), 0.6);
        assert!(l.shadow_view_projection().is_none());
    }

    #[test]
    fn point_attenuation_reaches_zero_at_cutoff() {
        let l = PointLight::new(1.0, 3.0);
        assert!(l.attenuation(1.0) > 0.0);
        assert_eq!(l.attenuation(3.0), 0.0);
        assert_eq!(l.attenuation(5.0), 0.0);
        assert!(l.attenuation(0.5) > l.attenuation(1.5));
    }

    #[test]
    fn hemisphere_blends_by_normal() {
        let h = HemisphereLight {
            sky_color: Color::WHITE,
            ground_color: Color::BLACK,
            intensity: 1.0,
        };
        assert_eq!(h.blend(Vec3::Y), Vec3::ONE);
        assert_eq!(h.blend(Vec3::NEG_Y), Vec3::ZERO);
    }
}
