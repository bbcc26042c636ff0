//! The residential façade: the one scene this viewer shows.
//!
//! Every value here is a constant. `build_facade` takes no inputs and returns
//! the same scene on every call.

use crate::light::{
    AmbientLight, DirectionalLight, HemisphereLight, LightSource, PointLight, ShadowConfig,
};
use crate::material::{GlassMaterial, Material, OpaqueMaterial};
use crate::primitive::Primitive;
use crate::scene::Scene;
use facade_common::Color;
use glam::Vec3;

/// A row of identical boxes, each shifted from the previous one by `step`.
#[derive(Debug, Clone, PartialEq)]
pub struct FinRow {
    pub label: &'static str,
    pub count: usize,
    pub origin: Vec3,
    pub step: Vec3,
    pub dimensions: Vec3,
    pub material: Material,
    pub casts_shadow: bool,
}

impl FinRow {
    /// Position of the `index`-th fin: `origin + index * step`.
    pub fn position(&self, index: usize) -> Vec3 {
        self.origin + self.step * index as f32
    }

    /// Expand the row into `count` primitives sharing a copy of the material.
    pub fn generate(&self) -> Vec<Primitive> {
        (0..self.count)
            .map(|i| {
                let fin = Primitive::cuboid(
                    format!("{}-{i}", self.label),
                    self.position(i),
                    self.dimensions,
                    self.material,
                );
                if self.casts_shadow {
                    fin.casts_shadow()
                } else {
                    fin
                }
            })
            .collect()
    }
}

/// Left-hand metal fins in front of the glass.
pub fn left_fins() -> FinRow {
    FinRow {
        label: "fin-left",
        count: 8,
        origin: Vec3::new(-6.0, 2.5, 1.0),
        step: Vec3::new(0.4, 0.0, 0.0),
        dimensions: Vec3::new(0.08, 4.5, 0.15),
        material: OpaqueMaterial::new(Color::hex(0x505050))
            .roughness(0.3)
            .metalness(0.9)
            .into(),
        casts_shadow: true,
    }
}

/// Right-hand metal fins over the protruding volume.
pub fn right_fins() -> FinRow {
    FinRow {
        label: "fin-right",
        count: 6,
        origin: Vec3::new(3.0, 3.0, 1.6),
        step: Vec3::new(0.5, 0.0, 0.0),
        dimensions: Vec3::new(0.1, 3.5, 0.15),
        material: OpaqueMaterial::new(Color::hex(0x404040))
            .roughness(0.25)
            .metalness(0.95)
            .into(),
        casts_shadow: true,
    }
}

fn standard(hex: u32, roughness: f32, metalness: f32) -> OpaqueMaterial {
    OpaqueMaterial::new(Color::hex(hex))
        .roughness(roughness)
        .metalness(metalness)
}

fn sky_glass() -> GlassMaterial {
    GlassMaterial::new(Color::hex(0x87ceeb))
        .transmission(0.95)
        .thickness(0.5)
        .roughness(0.05)
        .metalness(0.1)
        .opacity(0.4)
}

fn led(emissive: u32, intensity: f32) -> OpaqueMaterial {
    OpaqueMaterial::new(Color::WHITE).emissive(Color::hex(emissive), intensity)
}

fn frame_metal() -> OpaqueMaterial {
    OpaqueMaterial::new(Color::hex(0x303030))
        .roughness(0.2)
        .metalness(1.0)
}

/// Every primitive of the façade, in declaration order.
pub fn facade_primitives() -> Vec<Primitive> {
    let v = Vec3::new;
    let mut out = vec![
        Primitive::cuboid(
            "base-wall",
            v(0.0, 2.5, 0.0),
            v(12.0, 5.0, 1.0),
            standard(0xb8b8b8, 0.8, 0.1),
        )
        .casts_shadow()
        .receives_shadow(),
        Primitive::cuboid(
            "left-wall",
            v(-5.0, 2.5, 0.5),
            v(2.0, 5.0, 0.8),
            standard(0xa0a0a0, 0.9, 0.05),
        )
        .casts_shadow()
        .receives_shadow(),
        Primitive::cuboid(
            "right-box",
            v(5.0, 3.0, 0.8),
            v(2.0, 3.0, 1.5),
            standard(0x9a9a9a, 0.85, 0.1),
        )
        .casts_shadow()
        .receives_shadow(),
        Primitive::cuboid(
            "glass-center",
            v(0.0, 2.5, 0.55),
            v(6.0, 4.0, 0.05),
            sky_glass(),
        ),
        Primitive::cuboid(
            "glass-left",
            v(-4.0, 2.5, 1.0),
            v(1.5, 4.0, 0.05),
            sky_glass(),
        ),
    ];

    out.extend(left_fins().generate());
    out.extend(right_fins().generate());

    out.extend([
        Primitive::cuboid(
            "wood-lower",
            v(2.0, 1.0, 1.2),
            v(4.0, 1.5, 0.2),
            standard(0x8b4513, 0.7, 0.0),
        )
        .casts_shadow()
        .receives_shadow(),
        Primitive::cuboid(
            "wood-upper",
            v(-2.0, 4.0, 1.0),
            v(3.0, 0.8, 0.15),
            standard(0xa0522d, 0.65, 0.0),
        )
        .casts_shadow()
        .receives_shadow(),
        Primitive::cuboid(
            "protrusion-low",
            v(3.5, 1.5, 1.5),
            v(1.5, 1.5, 1.0),
            standard(0x707070, 0.6, 0.3),
        )
        .casts_shadow()
        .receives_shadow(),
        Primitive::cuboid(
            "protrusion-high",
            v(-3.0, 4.2, 1.3),
            v(1.2, 1.0, 1.2),
            standard(0x808080, 0.65, 0.25),
        )
        .casts_shadow()
        .receives_shadow(),
        Primitive::cuboid(
            "led-horizontal",
            v(0.0, 0.3, 1.2),
            v(8.0, 0.05, 0.05),
            led(0xffffff, 2.0),
        )
        .with_light(PointLight::new(1.0, 3.0)),
        Primitive::cuboid(
            "led-left",
            v(-6.0, 2.5, 1.1),
            v(0.03, 4.5, 0.05),
            led(0xe0e0e0, 1.5),
        )
        .with_light(PointLight::new(0.5, 2.0)),
        Primitive::cuboid(
            "led-right",
            v(6.0, 2.8, 1.7),
            v(0.03, 3.5, 0.05),
            led(0xe0e0e0, 1.5),
        )
        .with_light(PointLight::new(0.5, 2.0)),
        Primitive::cuboid(
            "frame-top",
            v(0.0, 4.8, 0.6),
            v(12.0, 0.2, 0.3),
            frame_metal(),
        )
        .casts_shadow(),
        Primitive::cuboid(
            "frame-bottom",
            v(0.0, 0.2, 0.6),
            v(12.0, 0.2, 0.3),
            frame_metal(),
        )
        .casts_shadow(),
        Primitive::cuboid(
            "ground",
            v(0.0, 0.0, 0.0),
            v(14.0, 0.2, 3.0),
            standard(0x404040, 0.9, 0.1),
        )
        .receives_shadow(),
    ]);

    out
}

/// Daylight: ambient fill, a shadow-casting key, a cool fill and a sky dome.
pub fn daylight_rig() -> Vec<LightSource> {
    vec![
        LightSource::Ambient(AmbientLight {
            intensity: 0.5,
            color: Color::WHITE,
        }),
        LightSource::Directional(
            DirectionalLight::new(Vec3::new(10.0, 20.0, 10.0), 1.5).cast_shadow(ShadowConfig {
                map_size: 2048,
                far: 50.0,
                left: -15.0,
                right: 15.0,
                top: 15.0,
                bottom: -15.0,
                ..ShadowConfig::default()
            }),
        ),
        LightSource::Directional(
            DirectionalLight::new(Vec3::new(-10.0, 15.0, -5.0), 0.6).color(Color::hex(0xb8d4e8)),
        ),
        LightSource::Hemisphere(HemisphereLight {
            sky_color: Color::WHITE,
            ground_color: Color::hex(0xb8d4e8),
            intensity: 0.4,
        }),
    ]
}

/// Build the façade scene.
pub fn build_facade() -> Scene {
    let scene = Scene::new(facade_primitives(), daylight_rig());
    tracing::debug!(primitives = scene.primitives().len(), "facade scene built");
    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::ShapeKind;

    #[test]
    fn build_is_deterministic() {
        let a = build_facade();
        let b = build_facade();
        assert_eq!(a, b);
        for (pa, pb) in a.primitives().iter().zip(b.primitives()) {
            assert_eq!(pa.shape, pb.shape);
            assert_eq!(pa.dimensions, pb.dimensions);
            assert_eq!(pa.position, pb.position);
            assert_eq!(pa.material, pb.material);
        }
    }

    #[test]
    fn primitive_count_includes_fins() {
        let scene = build_facade();
        assert_eq!(scene.primitives().len(), 15 + 8 + 6);
        let left = scene
            .primitives()
            .iter()
            .filter(|p| p.label.starts_with("fin-left"))
            .count();
        let right = scene
            .primitives()
            .iter()
            .filter(|p| p.label.starts_with("fin-right"))
            .count();
        assert_eq!((left, right), (8, 6));
        assert!(scene.primitives().iter().all(|p| p.shape == ShapeKind::Box));
    }

    #[test]
    fn fin_positions_follow_step() {
        for row in [left_fins(), right_fins()] {
            let fins = row.generate();
            assert_eq!(fins.len(), row.count);
            for (i, fin) in fins.iter().enumerate() {
                assert_eq!(fin.position, row.origin + row.step * i as f32);
                assert_eq!(fin.material, row.material);
                assert_eq!(fin.dimensions, row.dimensions);
                assert!(fin.casts_shadow);
                assert!(!fin.receives_shadow);
            }
        }
        let left = left_fins().generate();
        assert!((left[7].position.x - (-3.2)).abs() < 1e-5);
    }

    #[test]
    fn rig_matches_daylight_setup() {
        let scene = build_facade();
        let summary = scene.summary();
        assert_eq!(summary.directional_lights, 2);
        assert_eq!(summary.ambient_lights, 1);
        assert_eq!(summary.hemisphere_lights, 1);
        assert_eq!(summary.point_lights, 3);

        let key = scene.shadow_light().unwrap();
        assert_eq!(key.position, Vec3::new(10.0, 20.0, 10.0));
        assert_eq!(key.intensity, 1.5);
        let shadow = key.shadow.unwrap();
        assert_eq!(shadow.map_size, 2048);
        assert_eq!(
            (shadow.left, shadow.right, shadow.top, shadow.bottom),
            (-15.0, 15.0, 15.0, -15.0)
        );
        assert_eq!(shadow.far, 50.0);
    }

    #[test]
    fn material_parameters_stay_in_unit_range() {
        for p in build_facade().primitives() {
            let m = &p.material;
            assert!((0.0..=1.0).contains(&m.roughness()), "{}", p.label);
            assert!((0.0..=1.0).contains(&m.metalness()), "{}", p.label);
            assert!((0.0..=1.0).contains(&m.opacity()), "{}", p.label);
            assert!((0.0..=1.0).contains(&m.transmission()), "{}", p.label);
        }
    }

    #[test]
    fn glass_and_leds_do_not_cast_shadows() {
        let scene = build_facade();
        assert_eq!(scene.transparent().count(), 2);
        for p in scene.transparent() {
            assert!(!p.casts_shadow && !p.receives_shadow);
        }
        for p in scene
            .primitives()
            .iter()
            .filter(|p| p.attached_light.is_some())
        {
            assert!(!p.casts_shadow);
            assert!(p.material.emissive().is_some());
        }
        let ground = scene.primitives().last().unwrap();
        assert_eq!(ground.label, "ground");
        assert!(ground.receives_shadow && !ground.casts_shadow);
    }

    #[test]
    fn geometry_fits_inside_key_shadow_frustum() {
        let scene = build_facade();
        let key = scene.shadow_light().unwrap();
        let m = key.shadow_view_projection().unwrap();
        for corner in scene.bounds().unwrap().corners() {
            let p = m.project_point3(corner);
            assert!(p.x.abs() <= 1.0 && p.y.abs() <= 1.0, "{corner:?}");
            assert!((0.0..=1.0).contains(&p.z), "{corner:?}");
        }
    }

    #[test]
    fn scene_serializes_with_material_tags() {
        let json = serde_json::to_value(build_facade()).unwrap();
        let prims = json["primitives"].as_array().unwrap();
        assert_eq!(prims.len(), 29);
        assert_eq!(prims[3]["material"]["kind"], "glass");
        assert_eq!(prims[0]["material"]["kind"], "opaque");
    }
}
