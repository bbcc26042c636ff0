use crate::layout;
use crate::mesh::{self, CubeBuffers};
use crate::shaders;
use crate::targets::{DEPTH_FORMAT, HDR_FORMAT};
use facade_render::ContactShadowSettings;
use wgpu::util::DeviceExt;

const CONTACT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R8Unorm;

/// Raise the plane above coplanar ground so it wins the depth test.
const PLANE_LIFT: f32 = 0.002;

/// Uniform for the top-down occlusion pass: plane y, half extent, far.
pub fn occlusion_params(settings: &ContactShadowSettings) -> [f32; 4] {
    [
        settings.plane_y,
        settings.scale * 0.5,
        settings.far.max(1e-3),
        0.0,
    ]
}

/// Uniform for the visible plane: lifted y, half extent, opacity.
pub fn plane_params(settings: &ContactShadowSettings) -> [f32; 4] {
    [
        settings.plane_y + PLANE_LIFT,
        settings.scale * 0.5,
        settings.opacity,
        0.0,
    ]
}

/// One blur unit in UV space.
const BLUR_UNIT: f32 = 1.0 / 256.0;

/// Strength of the second, finer blur pair relative to the first.
const REFINE_BLUR: f32 = 0.4;

/// Per-tap UV offsets for the four blur passes: a horizontal and vertical
/// pair at full strength, then a second pair at `REFINE_BLUR` of it.
pub fn blur_steps(settings: &ContactShadowSettings) -> [[f32; 4]; 4] {
    let coarse = settings.blur * BLUR_UNIT;
    let fine = coarse * REFINE_BLUR;
    [
        [coarse, 0.0, 0.0, 0.0],
        [0.0, coarse, 0.0, 0.0],
        [fine, 0.0, 0.0, 0.0],
        [0.0, fine, 0.0, 0.0],
    ]
}

/// Soft shadow on a ground plane, baked once from the shadow casters.
///
/// Casters are rendered top-down into an occlusion texture, blurred along
/// each axis, then drawn every frame as a black quad whose alpha is the
/// blurred occlusion.
pub struct ContactShadow {
    occlusion_view: wgpu::TextureView,
    occlusion_pipeline: wgpu::RenderPipeline,
    occlusion_bind_group: wgpu::BindGroup,
    scratch_view: wgpu::TextureView,
    blur_pipeline: wgpu::RenderPipeline,
    /// Horizontal passes read occlusion into scratch; vertical passes read
    /// scratch back.
    blur_bind_groups: [wgpu::BindGroup; 4],
    plane_pipeline: wgpu::RenderPipeline,
    plane_bind_group: wgpu::BindGroup,
}

impl ContactShadow {
    pub fn new(
        device: &wgpu::Device,
        settings: &ContactShadowSettings,
        frame_layout: &wgpu::BindGroupLayout,
        samples: u32,
    ) -> Self {
        let resolution = settings.resolution.max(1);
        let create_target = |label: &str| {
            device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some(label),
                    size: wgpu::Extent3d {
                        width: resolution,
                        height: resolution,
                        depth_or_array_layers: 1,
                    },
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format: CONTACT_FORMAT,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                        | wgpu::TextureUsages::TEXTURE_BINDING,
                    view_formats: &[],
                })
                .create_view(&Default::default())
        };
        let occlusion_view = create_target("contact_occlusion");
        let scratch_view = create_target("contact_scratch");
        let sampler = layout::linear_sampler(device, "contact_sampler");
        let filterable = wgpu::TextureSampleType::Float { filterable: true };

        // Occlusion pass
        let occlusion_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("contact_occlusion_layout"),
            entries: &[layout::uniform(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            )],
        });
        let occlusion_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("contact_occlusion_uniforms"),
            contents: bytemuck::cast_slice(&occlusion_params(settings)),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let occlusion_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("contact_occlusion_bind_group"),
            layout: &occlusion_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: occlusion_buffer.as_entire_binding(),
            }],
        });
        let occlusion_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("contact_occlusion_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::contact_shader().into()),
        });
        let occlusion_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("contact_occlusion_pipeline_layout"),
                bind_group_layouts: &[&occlusion_layout],
                push_constant_ranges: &[],
            });
        let max_blend = wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Max,
        };
        let occlusion_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("contact_occlusion_pipeline"),
            layout: Some(&occlusion_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &occlusion_shader,
                entry_point: Some("vs_contact"),
                compilation_options: Default::default(),
                buffers: &mesh::buffer_layouts(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &occlusion_shader,
                entry_point: Some("fs_contact"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: CONTACT_FORMAT,
                    blend: Some(wgpu::BlendState {
                        color: max_blend,
                        alpha: max_blend,
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        // Blur passes
        let blur_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("contact_blur_layout"),
            entries: &[
                layout::texture(0, filterable),
                layout::sampler(1, wgpu::SamplerBindingType::Filtering),
                layout::uniform(2, wgpu::ShaderStages::FRAGMENT),
            ],
        });
        let blur_bind_group = |source: &wgpu::TextureView, step: [f32; 4]| {
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("contact_blur_uniforms"),
                contents: bytemuck::cast_slice(&step),
                usage: wgpu::BufferUsages::UNIFORM,
            });
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("contact_blur_bind_group"),
                layout: &blur_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(source),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: buffer.as_entire_binding(),
                    },
                ],
            })
        };
        let steps = blur_steps(settings);
        let sources = [&occlusion_view, &scratch_view];
        let blur_bind_groups: [wgpu::BindGroup; 4] =
            std::array::from_fn(|i| blur_bind_group(sources[i % 2], steps[i]));
        let blur_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("contact_blur_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::blur_shader().into()),
        });
        let blur_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("contact_blur_pipeline_layout"),
            bind_group_layouts: &[&blur_layout],
            push_constant_ranges: &[],
        });
        let blur_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("contact_blur_pipeline"),
            layout: Some(&blur_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &blur_shader,
                entry_point: Some("vs_fullscreen"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &blur_shader,
                entry_point: Some("fs_blur"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: CONTACT_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: Default::default(),
            depth_stencil: None,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        // Visible plane
        let plane_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("contact_plane_layout"),
            entries: &[
                layout::texture(0, filterable),
                layout::sampler(1, wgpu::SamplerBindingType::Filtering),
                layout::uniform(2, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
            ],
        });
        let plane_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("contact_plane_uniforms"),
            contents: bytemuck::cast_slice(&plane_params(settings)),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let plane_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("contact_plane_bind_group"),
            layout: &plane_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&occlusion_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: plane_buffer.as_entire_binding(),
                },
            ],
        });
        let plane_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("contact_plane_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::plane_shader().into()),
        });
        let plane_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("contact_plane_pipeline_layout"),
            bind_group_layouts: &[frame_layout, &plane_layout],
            push_constant_ranges: &[],
        });
        let plane_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("contact_plane_pipeline"),
            layout: Some(&plane_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &plane_shader,
                entry_point: Some("vs_plane"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &plane_shader,
                entry_point: Some("fs_plane"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: HDR_FORMAT,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: samples,
                ..Default::default()
            },
            multiview: None,
            cache: None,
        });

        tracing::debug!(resolution, blur = settings.blur, "contact shadow created");
        Self {
            occlusion_view,
            occlusion_pipeline,
            occlusion_bind_group,
            scratch_view,
            blur_pipeline,
            blur_bind_groups,
            plane_pipeline,
            plane_bind_group,
        }
    }

    /// Render the occlusion texture and blur it in place, ping-ponging
    /// through the scratch target.
    pub fn record(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        cube: &CubeBuffers,
        casters: &wgpu::Buffer,
        count: u32,
    ) {
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("contact_occlusion_pass"),
                color_attachments: &[Some(clear_attachment(&self.occlusion_view))],
                ..Default::default()
            });
            pass.set_pipeline(&self.occlusion_pipeline);
            pass.set_bind_group(0, &self.occlusion_bind_group, &[]);
            cube.draw(&mut pass, casters, count);
        }

        let targets = [
            &self.scratch_view,
            &self.occlusion_view,
            &self.scratch_view,
            &self.occlusion_view,
        ];
        for (bind_group, target) in self.blur_bind_groups.iter().zip(targets) {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("contact_blur_pass"),
                color_attachments: &[Some(clear_attachment(target))],
                ..Default::default()
            });
            pass.set_pipeline(&self.blur_pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
    }

    /// Draw the shadow plane. Expects the frame bind group at slot 0.
    pub fn draw_plane(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.plane_pipeline);
        pass.set_bind_group(1, &self.plane_bind_group, &[]);
        pass.draw(0..6, 0..1);
    }
}

fn clear_attachment(view: &wgpu::TextureView) -> wgpu::RenderPassColorAttachment<'_> {
    wgpu::RenderPassColorAttachment {
        view,
        resolve_target: None,
        ops: wgpu::Operations {
            load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
            store: wgpu::StoreOp::Store,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occlusion_maps_plane_extent_to_clip_space() {
        let params = occlusion_params(&ContactShadowSettings::default());
        assert_eq!(params[0], 0.1);
        // A point at the plane's edge lands on the clip-space border.
        assert_eq!(10.0 / params[1], 1.0);
        assert_eq!(params[2], 5.0);
    }

    #[test]
    fn plane_sits_just_above_ground() {
        let s = ContactShadowSettings::default();
        let params = plane_params(&s);
        assert!(params[0] > s.plane_y);
        assert!(params[0] - s.plane_y < 0.01);
        assert_eq!(params[2], 0.5);
    }

    #[test]
    fn blur_steps_are_axis_aligned() {
        let s = ContactShadowSettings::default();
        let [h, v, fine_h, fine_v] = blur_steps(&s);
        assert_eq!(h[1], 0.0);
        assert_eq!(v[0], 0.0);
        assert_eq!(fine_h[1], 0.0);
        assert_eq!(fine_v[0], 0.0);
        assert_eq!(h[0], v[1]);
        assert_eq!(fine_h[0], fine_v[1]);
    }

    #[test]
    fn blur_is_measured_in_uv_units() {
        let s = ContactShadowSettings::default();
        let [h, _, fine_h, _] = blur_steps(&s);
        assert!((h[0] - 2.0 / 256.0).abs() < 1e-9);
        assert!((fine_h[0] - 0.8 / 256.0).abs() < 1e-9);

        // Independent of the texture resolution.
        let sharp = ContactShadowSettings {
            resolution: 2048,
            ..s
        };
        assert_eq!(blur_steps(&sharp), blur_steps(&s));
    }

    #[test]
    fn zero_far_does_not_divide_by_zero() {
        let s = ContactShadowSettings {
            far: 0.0,
            ..Default::default()
        };
        assert!(occlusion_params(&s)[2] > 0.0);
    }
}
