use crate::renderer::RenderView;
use crate::settings::CameraSettings;
use facade_input::{Action, InteractionModes};
use glam::{Mat4, Vec2, Vec3};
use serde::Serialize;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// Keeps the polar angle strictly inside (0, π) so the view basis never degenerates.
const POLAR_EPSILON: f32 = 1e-6;
/// Pending motion below this is treated as settled.
const SETTLE_EPSILON: f32 = 1e-6;

/// Limits on orbit motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrbitConstraints {
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar: f32,
    /// π/2 keeps the camera at or above the horizon.
    pub max_polar: f32,
    pub rotate_enabled: bool,
    pub zoom_enabled: bool,
    pub pan_enabled: bool,
}

impl Default for OrbitConstraints {
    fn default() -> Self {
        Self {
            min_distance: 5.0,
            max_distance: 50.0,
            min_polar: 0.0,
            max_polar: FRAC_PI_2,
            rotate_enabled: true,
            zoom_enabled: true,
            pan_enabled: true,
        }
    }
}

impl OrbitConstraints {
    pub fn modes(&self) -> InteractionModes {
        InteractionModes {
            rotate: self.rotate_enabled,
            pan: self.pan_enabled,
            zoom: self.zoom_enabled,
        }
    }
}

/// Camera orbiting a target point on a sphere.
///
/// Position is kept in spherical coordinates around `target`: `radius`,
/// azimuth `theta` (around +Y, zero toward +Z) and polar angle `phi`
/// (from +Y). Gestures accumulate into pending deltas which [`update`]
/// folds in, applying damping and every clamp.
///
/// [`update`]: OrbitCamera::update
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    radius: f32,
    theta: f32,
    phi: f32,
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub constraints: OrbitConstraints,
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
    pub damping_factor: Option<f32>,
    pending_theta: f32,
    pending_phi: f32,
    pending_pan: Vec3,
    pending_scale: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_settings(&CameraSettings::default())
    }
}

impl OrbitCamera {
    pub fn from_settings(settings: &CameraSettings) -> Self {
        let offset = settings.position - settings.target;
        let radius = offset.length();
        let phi = if radius > 0.0 {
            (offset.y / radius).clamp(-1.0, 1.0).acos()
        } else {
            FRAC_PI_2
        };
        let mut camera = Self {
            target: settings.target,
            radius,
            theta: offset.x.atan2(offset.z),
            phi,
            fov_degrees: settings.fov_degrees,
            aspect: 16.0 / 9.0,
            near: settings.near,
            far: settings.far,
            constraints: settings.constraints,
            rotate_speed: 1.0,
            pan_speed: 1.0,
            zoom_speed: 1.0,
            damping_factor: settings.damping_factor,
            pending_theta: 0.0,
            pending_phi: 0.0,
            pending_pan: Vec3::ZERO,
            pending_scale: 1.0,
        };
        camera.update();
        camera
    }

    pub fn position(&self) -> Vec3 {
        let ring = self.radius * self.phi.sin();
        self.target
            + Vec3::new(
                ring * self.theta.sin(),
                self.radius * self.phi.cos(),
                ring * self.theta.cos(),
            )
    }

    /// Distance from the camera to its target.
    pub fn distance(&self) -> f32 {
        self.radius
    }

    /// Angle from straight up, in radians.
    pub fn polar_angle(&self) -> f32 {
        self.phi
    }

    pub fn azimuth(&self) -> f32 {
        self.theta
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position()).normalize_or_zero()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize_or_zero()
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward())
    }

    /// True while damped motion is still settling.
    pub fn is_moving(&self) -> bool {
        self.pending_theta != 0.0 || self.pending_phi != 0.0 || self.pending_pan != Vec3::ZERO
    }

    /// Queue a gesture and immediately fold it in. `viewport` is in physical pixels.
    pub fn apply(&mut self, action: Action, viewport: Vec2) -> bool {
        let height = viewport.y.max(1.0);
        match action {
            Action::Rotate(delta) => {
                if !self.constraints.rotate_enabled {
                    return false;
                }
                self.pending_theta -= TAU * delta.x / height * self.rotate_speed;
                self.pending_phi -= TAU * delta.y / height * self.rotate_speed;
            }
            Action::Pan(delta) => {
                if !self.constraints.pan_enabled {
                    return false;
                }
                let delta = delta * self.pan_speed;
                let target_distance = (self.position() - self.target).length()
                    * (self.fov_degrees.to_radians() * 0.5).tan();
                let left = 2.0 * delta.x * target_distance / height;
                let up = 2.0 * delta.y * target_distance / height;
                self.pending_pan += -self.right() * left + self.up() * up;
            }
            Action::Zoom(notches) => {
                if !self.constraints.zoom_enabled || notches == 0.0 {
                    return false;
                }
                let scale = 0.95_f32.powf(self.zoom_speed * notches.abs());
                if notches > 0.0 {
                    self.pending_scale *= scale;
                } else {
                    self.pending_scale /= scale;
                }
            }
        }
        self.update()
    }

    /// Fold pending motion into the camera and enforce all limits.
    ///
    /// Call once per frame so damped motion settles. Returns whether the
    /// camera moved.
    pub fn update(&mut self) -> bool {
        let before = (self.position(), self.target);
        let factor = self.damping_factor.unwrap_or(1.0).clamp(0.0, 1.0);

        self.theta = wrap_angle(self.theta + self.pending_theta * factor);
        self.phi = (self.phi + self.pending_phi * factor)
            .clamp(self.constraints.min_polar, self.constraints.max_polar)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        self.target += self.pending_pan * factor;
        self.radius = (self.radius * self.pending_scale)
            .clamp(self.constraints.min_distance, self.constraints.max_distance);
        self.pending_scale = 1.0;

        if self.damping_factor.is_some() {
            let keep = 1.0 - factor;
            self.pending_theta = settle(self.pending_theta * keep);
            self.pending_phi = settle(self.pending_phi * keep);
            self.pending_pan *= keep;
            if self.pending_pan.length() < SETTLE_EPSILON {
                self.pending_pan = Vec3::ZERO;
            }
        } else {
            self.pending_theta = 0.0;
            self.pending_phi = 0.0;
            self.pending_pan = Vec3::ZERO;
        }

        let moved = before.0.distance(self.position()) > SETTLE_EPSILON
            || before.1.distance(self.target) > SETTLE_EPSILON;
        if moved {
            tracing::trace!(
                distance = self.radius,
                polar = self.phi,
                azimuth = self.theta,
                "camera updated"
            );
        }
        moved
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        )
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn render_view(&self) -> RenderView {
        RenderView {
            eye: self.position(),
            target: self.target,
            fov_degrees: self.fov_degrees,
        }
    }
}

fn wrap_angle(a: f32) -> f32 {
    (a + PI).rem_euclid(TAU) - PI
}

fn settle(v: f32) -> f32 {
    if v.abs() < SETTLE_EPSILON { 0.0 } else { v }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

    fn undamped() -> OrbitCamera {
        OrbitCamera::from_settings(&CameraSettings {
            damping_factor: None,
            ..CameraSettings::default()
        })
    }

    #[test]
    fn initial_camera_sits_at_start_position() {
        let cam = OrbitCamera::default();
        assert!(cam.position().distance(Vec3::new(15.0, 5.0, 15.0)) < 1e-4);
        assert_eq!(cam.fov_degrees, 50.0);
        assert_eq!(cam.target, Vec3::ZERO);
        assert!((cam.distance() - 475.0_f32.sqrt()).abs() < 1e-4);
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn zoom_in_past_minimum_clamps_exactly() {
        let mut cam = undamped();
        for _ in 0..200 {
            cam.apply(Action::Zoom(5.0), VIEWPORT);
        }
        assert_eq!(cam.distance(), cam.constraints.min_distance);
    }

    #[test]
    fn zoom_out_past_maximum_clamps() {
        let mut cam = undamped();
        for _ in 0..200 {
            cam.apply(Action::Zoom(-5.0), VIEWPORT);
        }
        assert_eq!(cam.distance(), cam.constraints.max_distance);
    }

    #[test]
    fn distance_stays_in_range_for_mixed_zoom() {
        let mut cam = OrbitCamera::default();
        let steps = [3.0, -7.5, 12.0, 0.25, -40.0, 90.0, -1.0, 8.0];
        for (i, n) in steps.iter().cycle().take(400).enumerate() {
            let sign = if i % 3 == 0 { -1.0 } else { 1.0 };
            cam.apply(Action::Zoom(*n * sign), VIEWPORT);
            cam.update();
            let range = cam.constraints.min_distance..=cam.constraints.max_distance;
            assert!(range.contains(&cam.distance()));
        }
    }

    #[test]
    fn zoom_one_notch_scales_radius() {
        let mut cam = undamped();
        let start = cam.distance();
        cam.apply(Action::Zoom(1.0), VIEWPORT);
        assert!((cam.distance() - start * 0.95).abs() < 1e-4);
        cam.apply(Action::Zoom(-1.0), VIEWPORT);
        assert!((cam.distance() - start).abs() < 1e-4);
    }

    #[test]
    fn rotation_never_dips_below_horizon() {
        let mut cam = OrbitCamera::default();
        for i in 0..300 {
            let dy = if i % 5 == 0 { 80.0 } else { -250.0 };
            cam.apply(Action::Rotate(Vec2::new(37.0, dy)), VIEWPORT);
            cam.update();
            assert!(cam.polar_angle() <= cam.constraints.max_polar);
            assert!(cam.position().y >= cam.target.y - 1e-3);
        }
    }

    #[test]
    fn rotation_stops_at_top() {
        let mut cam = undamped();
        cam.apply(Action::Rotate(Vec2::new(0.0, 100_000.0)), VIEWPORT);
        assert!(cam.polar_angle() > 0.0);
        assert!(cam.polar_angle() < 1e-3);
        assert!(!cam.view_matrix().col(0).x.is_nan());
    }

    #[test]
    fn horizontal_drag_orbits_at_constant_distance() {
        let mut cam = undamped();
        let d = cam.distance();
        let y = cam.position().y;
        cam.apply(Action::Rotate(Vec2::new(200.0, 0.0)), VIEWPORT);
        assert!((cam.distance() - d).abs() < 1e-4);
        assert!((cam.position().y - y).abs() < 1e-4);
        let expected = TAU * 200.0 / VIEWPORT.y;
        let turned = (cam.azimuth() - std::f32::consts::FRAC_PI_4).abs();
        let error = (turned - expected).abs();
        let wrapped_error = (TAU - turned - expected).abs();
        assert!(error.min(wrapped_error) < 1e-3);
    }

    #[test]
    fn pan_moves_target_and_eye_together() {
        let mut cam = undamped();
        let offset = cam.position() - cam.target;
        cam.apply(Action::Pan(Vec2::new(100.0, 0.0)), VIEWPORT);
        assert_ne!(cam.target, Vec3::ZERO);
        assert!((cam.position() - cam.target - offset).length() < 1e-3);
        // Dragging right slides the target to the camera's left.
        assert!(cam.target.dot(cam.right()) < 0.0);
    }

    #[test]
    fn disabled_modes_ignore_actions() {
        let mut cam = OrbitCamera::from_settings(&CameraSettings {
            constraints: OrbitConstraints {
                rotate_enabled: false,
                zoom_enabled: false,
                pan_enabled: false,
                ..OrbitConstraints::default()
            },
            ..CameraSettings::default()
        });
        let before = cam.clone();
        assert!(!cam.apply(Action::Rotate(Vec2::splat(50.0)), VIEWPORT));
        assert!(!cam.apply(Action::Pan(Vec2::splat(50.0)), VIEWPORT));
        assert!(!cam.apply(Action::Zoom(3.0), VIEWPORT));
        assert_eq!(cam, before);
    }

    #[test]
    fn damping_settles_to_full_gesture() {
        let mut damped = OrbitCamera::default();
        let mut direct = undamped();
        let gesture = Action::Rotate(Vec2::new(120.0, 0.0));
        damped.apply(gesture, VIEWPORT);
        direct.apply(gesture, VIEWPORT);
        assert!(damped.is_moving());
        for _ in 0..2000 {
            damped.update();
        }
        assert!(!damped.is_moving());
        assert!(damped.position().distance(direct.position()) < 1e-2);
    }

    #[test]
    fn render_view_mirrors_camera() {
        let cam = OrbitCamera::default();
        let view = cam.render_view();
        assert_eq!(view.eye, cam.position());
        assert_eq!(view.target, cam.target);
        assert_eq!(view.fov_degrees, 50.0);
    }
}
