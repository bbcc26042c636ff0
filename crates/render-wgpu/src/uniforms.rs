use bytemuck::{Pod, Zeroable};
use facade_render::{OrbitCamera, ViewerSettings};
use facade_scene::{DirectionalLight, LightSource, Scene};
use glam::{Mat4, Vec3};

pub const MAX_DIRECTIONAL_LIGHTS: usize = 2;
pub const MAX_POINT_LIGHTS: usize = 4;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct DirectionalUniform {
    /// Direction the light travels; `w` is 1 for the shadowed light.
    pub direction: [f32; 4],
    /// Linear color times intensity.
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PointUniform {
    /// World position, cutoff distance in `w` (0 = unbounded).
    pub position: [f32; 4],
    /// Linear color times intensity, decay exponent in `w`.
    pub color: [f32; 4],
}

/// What the scene shader knows about the frame.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub light_view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub ambient: [f32; 4],
    pub hemi_sky: [f32; 4],
    pub hemi_ground: [f32; 4],
    pub directional: [DirectionalUniform; MAX_DIRECTIONAL_LIGHTS],
    pub points: [PointUniform; MAX_POINT_LIGHTS],
    /// Directional count, point count, environment bound, shadows enabled.
    pub counts: [u32; 4],
    /// Environment intensity, environment mip count, shadow bias, shadow texel size.
    pub environment: [f32; 4],
}

/// Lighting inputs derived from the scene's light rig. Built once; only the
/// camera half of [`FrameUniforms`] changes per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LightRig {
    pub light_view_proj: Mat4,
    pub ambient: Vec3,
    pub hemi_sky: Vec3,
    pub hemi_ground: Vec3,
    pub directional: Vec<DirectionalUniform>,
    pub points: Vec<PointUniform>,
    pub shadow_bias: f32,
    pub shadow_map_size: u32,
}

impl LightRig {
    /// Collect the scene's lights. Lights past the shader's fixed slots are
    /// dropped with a warning; the shadowed light always takes slot 0.
    pub fn from_scene(scene: &Scene, shadows: bool) -> Self {
        let mut rig = Self {
            light_view_proj: Mat4::IDENTITY,
            ambient: Vec3::ZERO,
            hemi_sky: Vec3::ZERO,
            hemi_ground: Vec3::ZERO,
            directional: Vec::new(),
            points: Vec::new(),
            shadow_bias: 0.0,
            shadow_map_size: 1,
        };

        let shadow_light = if shadows { scene.shadow_light() } else { None };
        if let Some(light) = shadow_light
            && let (Some(vp), Some(cfg)) = (light.shadow_view_projection(), light.shadow)
        {
            rig.light_view_proj = vp;
            rig.shadow_bias = cfg.bias;
            rig.shadow_map_size = cfg.map_size.max(1);
        }

        let mut directional: Vec<_> = scene.directional_lights().collect();
        directional.sort_by_key(|d| !is_same(shadow_light, d));
        let mut hemisphere_seen = false;

        for light in scene.all_lights() {
            match light {
                LightSource::Ambient(a) => rig.ambient += a.color.to_linear() * a.intensity,
                LightSource::Hemisphere(h) => {
                    if hemisphere_seen {
                        tracing::warn!("only the first hemisphere light is used");
                        continue;
                    }
                    hemisphere_seen = true;
                    rig.hemi_sky = h.sky_color.to_linear() * h.intensity;
                    rig.hemi_ground = h.ground_color.to_linear() * h.intensity;
                }
                LightSource::Point(p) => {
                    if rig.points.len() == MAX_POINT_LIGHTS {
                        tracing::warn!(max = MAX_POINT_LIGHTS, "point light dropped");
                        continue;
                    }
                    let c = p.color.to_linear() * p.intensity;
                    rig.points.push(PointUniform {
                        position: [p.position.x, p.position.y, p.position.z, p.distance],
                        color: [c.x, c.y, c.z, p.decay],
                    });
                }
                LightSource::Directional(_) => {}
            }
        }

        for d in directional {
            if rig.directional.len() == MAX_DIRECTIONAL_LIGHTS {
                tracing::warn!(max = MAX_DIRECTIONAL_LIGHTS, "directional light dropped");
                break;
            }
            let dir = d.direction();
            let c = d.color.to_linear() * d.intensity;
            let shadowed = is_same(shadow_light, d);
            rig.directional.push(DirectionalUniform {
                direction: [dir.x, dir.y, dir.z, if shadowed { 1.0 } else { 0.0 }],
                color: [c.x, c.y, c.z, 0.0],
            });
        }

        rig
    }

    pub fn has_shadow(&self) -> bool {
        self.directional
            .first()
            .is_some_and(|d| d.direction[3] > 0.5)
    }

    /// Combine the rig with the current camera and environment binding.
    pub fn frame(&self, camera: &OrbitCamera, environment: Option<(f32, u32)>) -> FrameUniforms {
        let eye = camera.position();
        let mut directional = [DirectionalUniform::default(); MAX_DIRECTIONAL_LIGHTS];
        directional[..self.directional.len()].copy_from_slice(&self.directional);
        let mut points = [PointUniform::default(); MAX_POINT_LIGHTS];
        points[..self.points.len()].copy_from_slice(&self.points);
        let (env_intensity, env_mips) = environment.unwrap_or((0.0, 1));

        FrameUniforms {
            view_proj: camera.view_projection().to_cols_array_2d(),
            light_view_proj: self.light_view_proj.to_cols_array_2d(),
            camera_position: [eye.x, eye.y, eye.z, 1.0],
            ambient: self.ambient.extend(0.0).to_array(),
            hemi_sky: self.hemi_sky.extend(0.0).to_array(),
            hemi_ground: self.hemi_ground.extend(0.0).to_array(),
            directional,
            points,
            counts: [
                self.directional.len() as u32,
                self.points.len() as u32,
                environment.is_some() as u32,
                self.has_shadow() as u32,
            ],
            environment: [
                env_intensity,
                env_mips as f32,
                self.shadow_bias,
                1.0 / self.shadow_map_size as f32,
            ],
        }
    }
}

fn is_same(a: Option<&DirectionalLight>, b: &DirectionalLight) -> bool {
    a.is_some_and(|a| std::ptr::eq(a, b))
}

/// Parameters of the final HDR-to-display pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct TonemapUniforms {
    /// Linear background color, shown without tone mapping.
    pub background: [f32; 4],
    /// exposure, operator code, encode-to-sRGB flag, unused.
    pub params: [f32; 4],
}

impl TonemapUniforms {
    pub fn new(settings: &ViewerSettings, surface_is_srgb: bool) -> Self {
        let bg = settings.background.to_linear();
        Self {
            background: [bg.x, bg.y, bg.z, 1.0],
            params: [
                settings.exposure,
                settings.tone_mapping.code() as f32,
                if surface_is_srgb { 0.0 } else { 1.0 },
                0.0,
            ],
        }
    }
}
