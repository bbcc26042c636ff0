pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Offscreen HDR color and depth the scene pass renders into.
///
/// With MSAA the pass draws into `multisampled` and resolves into
/// `resolved`; without it `resolved` is drawn directly.
pub struct HdrTargets {
    multisampled: Option<wgpu::TextureView>,
    pub resolved: wgpu::TextureView,
    pub depth: wgpu::TextureView,
    pub samples: u32,
}

impl HdrTargets {
    pub fn new(device: &wgpu::Device, width: u32, height: u32, samples: u32) -> Self {
        let samples = samples.max(1);
        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };
        let create = |label: &str, format, samples, usage| {
            device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some(label),
                    size,
                    mip_level_count: 1,
                    sample_count: samples,
                    dimension: wgpu::TextureDimension::D2,
                    format,
                    usage,
                    view_formats: &[],
                })
                .create_view(&Default::default())
        };

        let resolved = create(
            "hdr_resolved",
            HDR_FORMAT,
            1,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        let multisampled = (samples > 1).then(|| {
            create(
                "hdr_multisampled",
                HDR_FORMAT,
                samples,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
            )
        });
        let depth = create(
            "scene_depth",
            DEPTH_FORMAT,
            samples,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );

        Self {
            multisampled,
            resolved,
            depth,
            samples,
        }
    }

    /// Cleared to transparent black: alpha is geometry coverage, which the
    /// tonemap pass uses to composite the background.
    pub fn color_attachment(&self) -> wgpu::RenderPassColorAttachment<'_> {
        let (view, resolve_target) = match &self.multisampled {
            Some(ms) => (ms, Some(&self.resolved)),
            None => (&self.resolved, None),
        };
        wgpu::RenderPassColorAttachment {
            view,
            resolve_target,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                store: wgpu::StoreOp::Store,
            },
        }
    }

    pub fn depth_attachment(&self) -> wgpu::RenderPassDepthStencilAttachment<'_> {
        wgpu::RenderPassDepthStencilAttachment {
            view: &self.depth,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Discard,
            }),
            stencil_ops: None,
        }
    }
}
