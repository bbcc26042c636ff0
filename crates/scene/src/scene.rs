use crate::light::{DirectionalLight, LightSource, PointLight};
use crate::primitive::Primitive;
use facade_common::Aabb;
use serde::Serialize;
use std::fmt;

/// The immutable scene: an ordered list of primitives and the light rig.
///
/// Built once by a pure function and never mutated afterwards. Renderers walk
/// it; nothing writes back into it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    primitives: Vec<Primitive>,
    lights: Vec<LightSource>,
}

impl Scene {
    pub fn new(primitives: Vec<Primitive>, lights: Vec<LightSource>) -> Self {
        Self { primitives, lights }
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// The free-standing rig lights (not attached to any primitive).
    pub fn lights(&self) -> &[LightSource] {
        &self.lights
    }

    /// Lights carried by primitives, resolved to world positions.
    pub fn point_lights(&self) -> impl Iterator<Item = PointLight> + '_ {
        self.primitives.iter().filter_map(Primitive::world_light)
    }

    /// Rig lights followed by attached point lights.
    pub fn all_lights(&self) -> Vec<LightSource> {
        self.lights
            .iter()
            .copied()
            .chain(self.point_lights().map(LightSource::Point))
            .collect()
    }

    pub fn directional_lights(&self) -> impl Iterator<Item = &DirectionalLight> {
        self.lights.iter().filter_map(|l| match l {
            LightSource::Directional(d) => Some(d),
            _ => None,
        })
    }

    /// The first directional light that casts a shadow.
    pub fn shadow_light(&self) -> Option<&DirectionalLight> {
        self.directional_lights().find(|d| d.shadow.is_some())
    }

    pub fn shadow_casters(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives.iter().filter(|p| p.casts_shadow)
    }

    pub fn opaque(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives
            .iter()
            .filter(|p| !p.material.is_transparent())
    }

    pub fn transparent(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives
            .iter()
            .filter(|p| p.material.is_transparent())
    }

    /// Bounds of all primitives, or `None` for an empty scene.
    pub fn bounds(&self) -> Option<Aabb> {
        self.primitives
            .iter()
            .map(Primitive::bounds)
            .reduce(|a, b| a.union(&b))
    }

    pub fn summary(&self) -> SceneSummary {
        let lights = self.all_lights();
        let count = |kind: &str| lights.iter().filter(|l| l.kind() == kind).count();
        SceneSummary {
            primitive_count: self.primitives.len(),
            transparent_count: self.transparent().count(),
            shadow_caster_count: self.shadow_casters().count(),
            directional_lights: count("directional"),
            point_lights: count("point"),
            ambient_lights: count("ambient"),
            hemisphere_lights: count("hemisphere"),
            bounds: self.bounds(),
        }
    }
}

/// Counts describing a scene, for logs and tooling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSummary {
    pub primitive_count: usize,
    pub transparent_count: usize,
    pub shadow_caster_count: usize,
    pub directional_lights: usize,
    pub point_lights: usize,
    pub ambient_lights: usize,
    pub hemisphere_lights: usize,
    pub bounds: Option<Aabb>,
}

impl fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scene: primitives={} transparent={} casters={} lights=[directional={} point={} ambient={} hemisphere={}]",
            self.primitive_count,
            self.transparent_count,
            self.shadow_caster_count,
            self.directional_lights,
            self.point_lights,
            self.ambient_lights,
            self.hemisphere_lights
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scene_has_no_bounds() {
        let scene = Scene::new(Vec::new(), Vec::new());
        assert!(scene.bounds().is_none());
        assert!(scene.shadow_light().is_none());
        assert_eq!(scene.summary().primitive_count, 0);
    }
}
