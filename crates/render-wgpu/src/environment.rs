use crate::RenderError;
use facade_environment::EnvironmentMap;
use wgpu::util::DeviceExt;

const ENV_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Environment map resident on the GPU.
pub struct EnvironmentTexture {
    pub view: wgpu::TextureView,
    pub mip_count: u32,
    pub intensity: f32,
}

/// Reject maps the device cannot hold.
pub fn check_fits(map: &EnvironmentMap, max_dimension: u32) -> Result<(), RenderError> {
    if map.mip_count() == 0 {
        return Err(RenderError::EmptyEnvironment);
    }
    if map.width() > max_dimension || map.height() > max_dimension {
        return Err(RenderError::EnvironmentTooLarge {
            width: map.width(),
            height: map.height(),
            limit: max_dimension,
        });
    }
    Ok(())
}

impl EnvironmentTexture {
    /// 1x1 stand-in bound until a map arrives. Never sampled: the shader
    /// checks the environment flag first.
    pub fn placeholder(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let texture = device.create_texture_with_data(
            queue,
            &descriptor("environment_placeholder", 1, 1, 1),
            wgpu::util::TextureDataOrder::LayerMajor,
            &[0, 0, 0, 255],
        );
        Self {
            view: texture.create_view(&Default::default()),
            mip_count: 1,
            intensity: 0.0,
        }
    }

    /// Upload every mip level of `map`.
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        map: &EnvironmentMap,
    ) -> Result<Self, RenderError> {
        check_fits(map, device.limits().max_texture_dimension_2d)?;
        let texture = device.create_texture_with_data(
            queue,
            &descriptor(
                "environment_map",
                map.width(),
                map.height(),
                map.mip_count(),
            ),
            wgpu::util::TextureDataOrder::LayerMajor,
            &map.to_bytes(),
        );
        tracing::info!(
            preset = %map.preset,
            width = map.width(),
            height = map.height(),
            mips = map.mip_count(),
            "environment uploaded"
        );
        Ok(Self {
            view: texture.create_view(&Default::default()),
            mip_count: map.mip_count(),
            intensity: map.intensity,
        })
    }
}

/// Wraps around the horizon, clamps at the poles.
pub fn sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("environment_sampler"),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

fn descriptor(label: &str, width: u32, height: u32, mips: u32) -> wgpu::TextureDescriptor<'_> {
    wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: mips,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: ENV_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facade_environment::EnvironmentPreset;

    #[test]
    fn city_map_fits_default_limits() {
        let map = EnvironmentMap::generate(EnvironmentPreset::City).unwrap();
        let limit = wgpu::Limits::downlevel_webgl2_defaults().max_texture_dimension_2d;
        assert!(check_fits(&map, limit).is_ok());
    }

    #[test]
    fn oversized_map_is_rejected() {
        let map = EnvironmentMap::generate(EnvironmentPreset::City).unwrap();
        let err = check_fits(&map, 64).unwrap_err();
        assert!(matches!(
            err,
            RenderError::EnvironmentTooLarge {
                width: 256,
                limit: 64,
                ..
            }
        ));
    }

    #[test]
    fn upload_size_covers_full_mip_chain() {
        let map = EnvironmentMap::generate(EnvironmentPreset::City).unwrap();
        let texels: u32 = (0..map.mip_count())
            .map(|i| (map.width() >> i).max(1) * (map.height() >> i).max(1))
            .sum();
        assert_eq!(map.to_bytes().len(), texels as usize * 4);
    }
}
