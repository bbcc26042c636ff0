use crate::light::PointLight;
use crate::material::Material;
use facade_common::Aabb;
use glam::{Mat4, Vec3};
use serde::Serialize;

/// Geometric shape of a primitive. The façade only uses boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Box,
}

/// A single placed, axis-aligned shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Primitive {
    pub label: String,
    pub shape: ShapeKind,
    /// Full extents (width, height, depth).
    pub dimensions: Vec3,
    /// Center of the shape.
    pub position: Vec3,
    pub material: Material,
    pub casts_shadow: bool,
    pub receives_shadow: bool,
    /// Light carried by the primitive, positioned at its center.
    pub attached_light: Option<PointLight>,
}

impl Primitive {
    /// A box that neither casts nor receives shadows.
    pub fn cuboid(
        label: impl Into<String>,
        position: Vec3,
        dimensions: Vec3,
        material: impl Into<Material>,
    ) -> Self {
        Self {
            label: label.into(),
            shape: ShapeKind::Box,
            dimensions,
            position,
            material: material.into(),
            casts_shadow: false,
            receives_shadow: false,
            attached_light: None,
        }
    }

    pub fn casts_shadow(mut self) -> Self {
        self.casts_shadow = true;
        self
    }

    pub fn receives_shadow(mut self) -> Self {
        self.receives_shadow = true;
        self
    }

    pub fn with_light(mut self, light: PointLight) -> Self {
        self.attached_light = Some(light);
        self
    }

    /// Model matrix mapping the unit cube onto this primitive.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.dimensions, glam::Quat::IDENTITY, self.position)
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_size(self.position, self.dimensions)
    }

    /// Attached light resolved to world space.
    pub fn world_light(&self) -> Option<PointLight> {
        self.attached_light.map(|l| PointLight {
            position: self.position + l.position,
            ..l
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::OpaqueMaterial;
    use facade_common::Color;

    #[test]
    fn cuboid_has_no_shadow_flags_by_default() {
        let p = Primitive::cuboid(
            "p",
            Vec3::ZERO,
            Vec3::ONE,
            OpaqueMaterial::new(Color::WHITE),
        );
        assert!(!p.casts_shadow);
        assert!(!p.receives_shadow);
        assert_eq!(p.shape, ShapeKind::Box);
    }

    #[test]
    fn model_matrix_scales_unit_cube() {
        let p = Primitive::cuboid(
            "p",
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(4.0, 6.0, 8.0),
            OpaqueMaterial::new(Color::WHITE),
        );
        let corner = p.model_matrix().transform_point3(Vec3::splat(0.5));
        assert_eq!(corner, Vec3::new(3.0, 5.0, 7.0));
        assert_eq!(p.bounds().max, corner);
    }

    #[test]
    fn attached_light_follows_primitive() {
        let p = Primitive::cuboid(
            "led",
            Vec3::new(0.0, 0.3, 1.2),
            Vec3::new(8.0, 0.05, 0.05),
            OpaqueMaterial::new(Color::WHITE),
        )
        .with_light(PointLight::new(1.0, 3.0));
        assert_eq!(p.world_light().unwrap().position, Vec3::new(0.0, 0.3, 1.2));
    }
}
