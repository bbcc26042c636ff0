use crate::camera::OrbitConstraints;
use facade_common::Color;
use facade_environment::EnvironmentPreset;
use glam::Vec3;
use serde::Serialize;

/// Operator applied when mapping HDR scene radiance to the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneMapping {
    /// Clamp only.
    None,
    /// Filmic ACES fit.
    AcesFilmic,
}

impl ToneMapping {
    /// Shader selector.
    pub fn code(self) -> u32 {
        match self {
            ToneMapping::None => 0,
            ToneMapping::AcesFilmic => 1,
        }
    }
}

/// Soft shadow projected onto a ground plane under the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContactShadowSettings {
    /// Height of the shadow plane.
    pub plane_y: f32,
    pub opacity: f32,
    /// Side length of the square plane, centered on the origin.
    pub scale: f32,
    /// Blur radius, in units of 1/256 of the plane.
    pub blur: f32,
    /// Height above the plane beyond which geometry casts nothing.
    pub far: f32,
    pub resolution: u32,
}

impl Default for ContactShadowSettings {
    fn default() -> Self {
        Self {
            plane_y: 0.1,
            opacity: 0.5,
            scale: 20.0,
            blur: 2.0,
            far: 5.0,
            resolution: 512,
        }
    }
}

/// Initial camera placement and orbit limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraSettings {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub constraints: OrbitConstraints,
    /// Inertia applied to rotate and pan; `None` applies gestures immediately.
    pub damping_factor: Option<f32>,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(15.0, 5.0, 15.0),
            target: Vec3::ZERO,
            fov_degrees: 50.0,
            near: 0.1,
            far: 1000.0,
            constraints: OrbitConstraints::default(),
            damping_factor: Some(0.05),
        }
    }
}

/// Everything the viewer shell configures at startup.
///
/// There is no user-facing configuration file; `Default` is the viewer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewerSettings {
    pub title: String,
    pub window_size: (u32, u32),
    /// Clear color, shown as-is (not tone mapped).
    pub background: Color,
    pub tone_mapping: ToneMapping,
    pub exposure: f32,
    /// MSAA sample count; 1 disables antialiasing.
    pub msaa_samples: u32,
    pub shadows: bool,
    pub contact_shadow: Option<ContactShadowSettings>,
    pub environment: Option<EnvironmentPreset>,
    pub camera: CameraSettings,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            title: "Modern Residential Façade".into(),
            window_size: (1280, 720),
            background: Color::hex(0xe8f4f8),
            tone_mapping: ToneMapping::AcesFilmic,
            exposure: 1.2,
            msaa_samples: 4,
            shadows: true,
            contact_shadow: Some(ContactShadowSettings::default()),
            environment: Some(EnvironmentPreset::City),
            camera: CameraSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_daylight_viewer() {
        let s = ViewerSettings::default();
        assert_eq!(s.background, Color::hex(0xe8f4f8));
        assert_eq!(s.tone_mapping, ToneMapping::AcesFilmic);
        assert_eq!(s.exposure, 1.2);
        assert_eq!(s.camera.position, Vec3::new(15.0, 5.0, 15.0));
        assert_eq!(s.camera.fov_degrees, 50.0);
        assert_eq!(s.environment, Some(EnvironmentPreset::City));
    }

    #[test]
    fn contact_shadow_defaults() {
        let c = ContactShadowSettings::default();
        assert_eq!(
            (c.plane_y, c.opacity, c.scale, c.blur, c.far),
            (0.1, 0.5, 20.0, 2.0, 5.0)
        );
    }

    #[test]
    fn tone_mapping_codes_are_distinct() {
        assert_ne!(ToneMapping::None.code(), ToneMapping::AcesFilmic.code());
    }
}
