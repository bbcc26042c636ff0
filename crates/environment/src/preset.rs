use crate::EnvironmentError;
use facade_common::{linear_to_srgb, srgb_to_linear};
use glam::Vec3;
use serde::Serialize;
use std::f32::consts::{FRAC_PI_2, PI, TAU};
use std::fmt;

/// Named ambient environment used for reflections and image-based light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentPreset {
    /// Hazy daylight over a low city skyline.
    #[default]
    City,
}

impl EnvironmentPreset {
    /// Base resolution (width, height) of the equirectangular map.
    pub fn resolution(self) -> (u32, u32) {
        match self {
            EnvironmentPreset::City => (256, 128),
        }
    }

    /// Radiance arriving from direction `dir` (unit vector, +Y up), linear RGB.
    pub fn radiance(self, dir: Vec3) -> Vec3 {
        match self {
            EnvironmentPreset::City => city_radiance(dir),
        }
    }
}

impl fmt::Display for EnvironmentPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvironmentPreset::City => f.write_str("city"),
        }
    }
}

/// One level of the mip chain, sRGB-encoded RGBA8 texels in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub texels: Vec<[u8; 4]>,
}

impl MipLevel {
    fn texel_linear(&self, x: u32, y: u32) -> Vec3 {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        let [r, g, b, _] = self.texels[(y * self.width + x) as usize];
        Vec3::new(
            srgb_to_linear(r as f32 / 255.0),
            srgb_to_linear(g as f32 / 255.0),
            srgb_to_linear(b as f32 / 255.0),
        )
    }

    /// Half-resolution copy, box-filtered in linear space.
    fn downsample(&self) -> MipLevel {
        let width = (self.width / 2).max(1);
        let height = (self.height / 2).max(1);
        let mut texels = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                let sum = self.texel_linear(2 * x, 2 * y)
                    + self.texel_linear(2 * x + 1, 2 * y)
                    + self.texel_linear(2 * x, 2 * y + 1)
                    + self.texel_linear(2 * x + 1, 2 * y + 1);
                texels.push(encode(sum * 0.25));
            }
        }
        MipLevel {
            width,
            height,
            texels,
        }
    }
}

/// An equirectangular radiance map with a full mip chain.
///
/// Rougher surfaces sample coarser levels, which stands in for a
/// prefiltered specular map.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentMap {
    pub preset: EnvironmentPreset,
    /// Scale applied to sampled radiance.
    pub intensity: f32,
    levels: Vec<MipLevel>,
}

impl EnvironmentMap {
    /// Render `preset` into a map and build its mip chain.
    pub fn generate(preset: EnvironmentPreset) -> Result<Self, EnvironmentError> {
        let _span = tracing::info_span!("environment_generate", %preset).entered();
        let (width, height) = preset.resolution();

        let mut texels = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            let v = (y as f32 + 0.5) / height as f32;
            let polar = v * PI;
            for x in 0..width {
                let u = (x as f32 + 0.5) / width as f32;
                let azimuth = u * TAU - PI;
                let dir = Vec3::new(
                    polar.sin() * azimuth.cos(),
                    polar.cos(),
                    polar.sin() * azimuth.sin(),
                );
                texels.push(encode(preset.radiance(dir)));
            }
        }

        let mut levels = vec![MipLevel {
            width,
            height,
            texels,
        }];
        while let Some(last) = levels.last() {
            if last.width == 1 && last.height == 1 {
                break;
            }
            let next = last.downsample();
            levels.push(next);
        }

        let map = Self {
            preset,
            intensity: 1.0,
            levels,
        };
        map.validate()?;
        tracing::debug!(
            width,
            height,
            mips = map.mip_count(),
            "environment generated"
        );
        Ok(map)
    }

    pub fn width(&self) -> u32 {
        self.levels[0].width
    }

    pub fn height(&self) -> u32 {
        self.levels[0].height
    }

    pub fn mip_count(&self) -> u32 {
        self.levels.len() as u32
    }

    pub fn levels(&self) -> &[MipLevel] {
        &self.levels
    }

    /// All levels concatenated, largest first, as raw RGBA8 bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.levels
            .iter()
            .flat_map(|l| l.texels.iter().flatten().copied())
            .collect()
    }

    /// Linear radiance of the texel nearest to `dir` at `level`.
    pub fn sample(&self, dir: Vec3, level: usize) -> Vec3 {
        let level = &self.levels[level.min(self.levels.len() - 1)];
        let dir = dir.normalize_or_zero();
        let u = dir.z.atan2(dir.x) / TAU + 0.5;
        let v = dir.y.clamp(-1.0, 1.0).acos() / PI;
        let x = ((u * level.width as f32) as u32).min(level.width - 1);
        let y = ((v * level.height as f32) as u32).min(level.height - 1);
        level.texel_linear(x, y) * self.intensity
    }

    fn validate(&self) -> Result<(), EnvironmentError> {
        let Some(base) = self.levels.first() else {
            return Err(EnvironmentError::InvalidMap {
                width: 0,
                height: 0,
                reason: "no mip levels",
            });
        };
        let invalid = |reason| EnvironmentError::InvalidMap {
            width: base.width,
            height: base.height,
            reason,
        };
        if base.width == 0 || base.height == 0 {
            return Err(invalid("zero-sized base level"));
        }
        for (i, level) in self.levels.iter().enumerate() {
            let expected_w = (base.width >> i).max(1);
            let expected_h = (base.height >> i).max(1);
            if level.width != expected_w || level.height != expected_h {
                return Err(invalid("mip chain does not halve"));
            }
            if level.texels.len() != (level.width * level.height) as usize {
                return Err(invalid("texel count does not match level size"));
            }
        }
        Ok(())
    }
}

fn encode(c: Vec3) -> [u8; 4] {
    let q = |v: f32| (linear_to_srgb(v) * 255.0 + 0.5) as u8;
    [q(c.x), q(c.y), q(c.z), 255]
}

/// Deterministic integer hash mapped to `[0, 1)`.
fn hash(n: u32) -> f32 {
    let mut x = n.wrapping_mul(0x9e37_79b1);
    x ^= x >> 16;
    x = x.wrapping_mul(0x85eb_ca6b);
    x ^= x >> 13;
    (x & 0x00ff_ffff) as f32 / 16_777_216.0
}

const BUILDINGS: u32 = 48;
const HAZE: Vec3 = Vec3::new(0.86, 0.84, 0.80);
const ZENITH: Vec3 = Vec3::new(0.32, 0.50, 0.82);
const ASPHALT: Vec3 = Vec3::new(0.09, 0.09, 0.10);
const WINDOW_LIGHT: Vec3 = Vec3::new(1.0, 0.82, 0.55);

fn city_radiance(dir: Vec3) -> Vec3 {
    let elevation = dir.y.clamp(-1.0, 1.0).asin();
    let azimuth = dir.z.atan2(dir.x);
    let u = (azimuth + PI) / TAU;

    if elevation < 0.0 {
        // Ground fades into haze toward the horizon.
        let t = (elevation * 10.0).exp();
        return ASPHALT.lerp(HAZE * 0.6, t);
    }

    let building = ((u * BUILDINGS as f32) as u32).min(BUILDINGS - 1);
    let roof = 0.04 + 0.22 * hash(building);
    if elevation < roof {
        let shade = 0.14 + 0.18 * hash(building + 101);
        let column = (u * BUILDINGS as f32 * 6.0) as u32;
        let row = (elevation * 60.0) as u32;
        let lit = hash(column.wrapping_mul(131) ^ row.wrapping_mul(7919)) > 0.72;
        let in_window =
            (u * BUILDINGS as f32 * 6.0).fract() > 0.3 && (elevation * 60.0).fract() > 0.35;
        let wall = Vec3::splat(shade).lerp(HAZE, 0.35 * (1.0 - elevation / roof));
        return if in_window && lit {
            WINDOW_LIGHT * 1.2
        } else if in_window {
            wall.lerp(sky(dir, elevation), 0.4)
        } else {
            wall
        };
    }

    sky(dir, elevation)
}

fn sky(dir: Vec3, elevation: f32) -> Vec3 {
    let t = (elevation / FRAC_PI_2).clamp(0.0, 1.0).sqrt();
    let base = HAZE.lerp(ZENITH, t);
    let sun = Vec3::new(10.0, 20.0, 10.0).normalize();
    let cos = dir.dot(sun).max(0.0);
    base + Vec3::new(1.0, 0.95, 0.85) * (cos.powi(8) * 0.25 + cos.powi(256) * 4.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_chain_halves_down_to_one_texel() {
        let map = EnvironmentMap::generate(EnvironmentPreset::City).unwrap();
        assert_eq!((map.width(), map.height()), (256, 128));
        assert_eq!(map.mip_count(), 9);
        let last = map.levels().last().unwrap();
        assert_eq!((last.width, last.height), (1, 1));
        let bytes: usize = map
            .levels()
            .iter()
            .map(|l| (l.width * l.height * 4) as usize)
            .sum();
        assert_eq!(map.to_bytes().len(), bytes);
    }

    #[test]
    fn generation_is_deterministic() {
        let a = EnvironmentMap::generate(EnvironmentPreset::City).unwrap();
        let b = EnvironmentMap::generate(EnvironmentPreset::City).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn sky_is_brighter_than_ground() {
        let map = EnvironmentMap::generate(EnvironmentPreset::City).unwrap();
        let up = map.sample(Vec3::Y, 0);
        let down = map.sample(Vec3::NEG_Y, 0);
        assert!(up.length() > down.length());
        // Zenith reads blue.
        assert!(up.z > up.x);
    }

    #[test]
    fn hash_stays_in_unit_interval() {
        for n in 0..1000 {
            let h = hash(n);
            assert!((0.0..1.0).contains(&h));
        }
    }

    #[test]
    fn preset_names() {
        assert_eq!(EnvironmentPreset::City.to_string(), "city");
        assert_eq!(EnvironmentPreset::default(), EnvironmentPreset::City);
    }
}
