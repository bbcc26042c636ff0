use facade_common::Color;
use serde::Serialize;

/// Emissive term of an opaque surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Emissive {
    pub color: Color,
    pub intensity: f32,
}

/// Metal/rough surface with an optional self-lit term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OpaqueMaterial {
    pub base_color: Color,
    pub roughness: f32,
    pub metalness: f32,
    pub emissive: Option<Emissive>,
}

impl OpaqueMaterial {
    /// Fully rough dielectric, matching the usual standard-material defaults.
    pub fn new(base_color: Color) -> Self {
        Self {
            base_color,
            roughness: 1.0,
            metalness: 0.0,
            emissive: None,
        }
    }

    pub fn roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    pub fn metalness(mut self, metalness: f32) -> Self {
        self.metalness = metalness.clamp(0.0, 1.0);
        self
    }

    pub fn emissive(mut self, color: Color, intensity: f32) -> Self {
        self.emissive = Some(Emissive {
            color,
            intensity: intensity.max(0.0),
        });
        self
    }
}

/// Thin transmissive panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GlassMaterial {
    pub base_color: Color,
    pub roughness: f32,
    pub metalness: f32,
    pub transmission: f32,
    pub thickness: f32,
    pub opacity: f32,
    pub ior: f32,
}

impl GlassMaterial {
    pub fn new(base_color: Color) -> Self {
        Self {
            base_color,
            roughness: 1.0,
            metalness: 0.0,
            transmission: 0.0,
            thickness: 0.0,
            opacity: 1.0,
            ior: 1.5,
        }
    }

    pub fn roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    pub fn metalness(mut self, metalness: f32) -> Self {
        self.metalness = metalness.clamp(0.0, 1.0);
        self
    }

    pub fn transmission(mut self, transmission: f32) -> Self {
        self.transmission = transmission.clamp(0.0, 1.0);
        self
    }

    pub fn thickness(mut self, thickness: f32) -> Self {
        self.thickness = thickness.max(0.0);
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }
}

/// Surface appearance of a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Material {
    Opaque(OpaqueMaterial),
    Glass(GlassMaterial),
}

impl Material {
    pub fn base_color(&self) -> Color {
        match self {
            Material::Opaque(m) => m.base_color,
            Material::Glass(m) => m.base_color,
        }
    }

    pub fn roughness(&self) -> f32 {
        match self {
            Material::Opaque(m) => m.roughness,
            Material::Glass(m) => m.roughness,
        }
    }

    pub fn metalness(&self) -> f32 {
        match self {
            Material::Opaque(m) => m.metalness,
            Material::Glass(m) => m.metalness,
        }
    }

    /// Coverage written by the surface; opaque surfaces always cover fully.
    pub fn opacity(&self) -> f32 {
        match self {
            Material::Opaque(_) => 1.0,
            Material::Glass(m) => m.opacity,
        }
    }

    pub fn transmission(&self) -> f32 {
        match self {
            Material::Opaque(_) => 0.0,
            Material::Glass(m) => m.transmission,
        }
    }

    pub fn emissive(&self) -> Option<Emissive> {
        match self {
            Material::Opaque(m) => m.emissive,
            Material::Glass(_) => None,
        }
    }

    pub fn is_transparent(&self) -> bool {
        matches!(self, Material::Glass(_))
    }
}

impl From<OpaqueMaterial> for Material {
    fn from(m: OpaqueMaterial) -> Self {
        Material::Opaque(m)
    }
}

impl From<GlassMaterial> for Material {
    fn from(m: GlassMaterial) -> Self {
        Material::Glass(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_defaults() {
        let m = OpaqueMaterial::new(Color::WHITE);
        assert_eq!(m.roughness, 1.0);
        assert_eq!(m.metalness, 0.0);
        assert!(m.emissive.is_none());
    }

    #[test]
    fn builders_clamp_unit_parameters() {
        let m = OpaqueMaterial::new(Color::WHITE)
            .roughness(1.7)
            .metalness(-0.3);
        assert_eq!(m.roughness, 1.0);
        assert_eq!(m.metalness, 0.0);

        let g = GlassMaterial::new(Color::WHITE)
            .transmission(2.0)
            .opacity(-1.0);
        assert_eq!(g.transmission, 1.0);
        assert_eq!(g.opacity, 0.0);
    }

    #[test]
    fn glass_is_the_only_transparent_variant() {
        let glass: Material = GlassMaterial::new(Color::hex(0x87ceeb)).opacity(0.4).into();
        let concrete: Material = OpaqueMaterial::new(Color::hex(0xb8b8b8)).into();
        assert!(glass.is_transparent());
        assert!(!concrete.is_transparent());
        assert_eq!(glass.opacity(), 0.4);
        assert_eq!(concrete.opacity(), 1.0);
    }

    #[test]
    fn emissive_only_on_opaque() {
        let led: Material = OpaqueMaterial::new(Color::WHITE)
            .emissive(Color::hex(0xe0e0e0), 1.5)
            .into();
        let e = led.emissive().unwrap();
        assert_eq!(e.color, Color::hex(0xe0e0e0));
        assert_eq!(e.intensity, 1.5);
    }
}
