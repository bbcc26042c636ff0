use crate::RenderError;
use crate::contact::ContactShadow;
use crate::environment::{self, EnvironmentTexture};
use crate::layout;
use crate::mesh::{self, CubeBuffers, InstanceData, SceneInstances};
use crate::shaders;
use crate::shadow::ShadowMap;
use crate::targets::{DEPTH_FORMAT, HDR_FORMAT, HdrTargets};
use crate::tonemap::TonemapPass;
use crate::uniforms::{FrameUniforms, LightRig, TonemapUniforms};
use bytemuck::Zeroable;
use facade_environment::EnvironmentMap;
use facade_render::{OrbitCamera, ViewerSettings};
use facade_scene::Scene;
use wgpu::util::DeviceExt;

/// What a frame should contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameContent {
    /// Background only, while the environment is still loading.
    Background,
    /// The full scene.
    Scene,
}

/// wgpu renderer for the façade scene.
///
/// Owns every GPU resource. The scene is uploaded once at construction;
/// per frame only the camera uniforms and the glass draw order change.
pub struct FacadeRenderer {
    cube: CubeBuffers,
    instances: SceneInstances,
    opaque_buffer: wgpu::Buffer,
    caster_buffer: wgpu::Buffer,
    glass_buffer: wgpu::Buffer,
    rig: LightRig,
    frame_buffer: wgpu::Buffer,
    frame_layout: wgpu::BindGroupLayout,
    frame_bind_group: wgpu::BindGroup,
    opaque_pipeline: wgpu::RenderPipeline,
    glass_pipeline: wgpu::RenderPipeline,
    shadow: ShadowMap,
    contact: Option<ContactShadow>,
    environment: EnvironmentTexture,
    environment_bound: bool,
    environment_sampler: wgpu::Sampler,
    targets: HdrTargets,
    tonemap: TonemapPass,
    baked: bool,
}

impl FacadeRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        size: (u32, u32),
        scene: &Scene,
        settings: &ViewerSettings,
        samples: u32,
    ) -> Self {
        let instances = SceneInstances::from_scene(scene);
        let rig = LightRig::from_scene(scene, settings.shadows);

        let instance_buffer = |label: &str, data: &[InstanceData], usage| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(data),
                usage,
            })
        };
        let opaque_buffer = instance_buffer(
            "opaque_instances",
            &instances.opaque[..],
            wgpu::BufferUsages::VERTEX,
        );
        let caster_buffer = instance_buffer(
            "caster_instances",
            &instances.casters[..],
            wgpu::BufferUsages::VERTEX,
        );
        let glass_buffer = instance_buffer(
            "glass_instances",
            &vec![InstanceData::zeroed(); instances.glass_count()][..],
            wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        );

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame_uniform_buffer"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
            entries: &[
                layout::uniform(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
                layout::texture(1, wgpu::TextureSampleType::Depth),
                layout::sampler(2, wgpu::SamplerBindingType::Comparison),
                layout::texture(3, wgpu::TextureSampleType::Float { filterable: true }),
                layout::sampler(4, wgpu::SamplerBindingType::Filtering),
            ],
        });

        let shadow = ShadowMap::new(device, &rig);
        let environment = EnvironmentTexture::placeholder(device, queue);
        let environment_sampler = environment::sampler(device);
        let frame_bind_group = frame_bind_group(
            device,
            &frame_layout,
            &frame_buffer,
            &shadow,
            &environment.view,
            &environment_sampler,
        );

        let samples = samples.max(1);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::scene_shader().into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&frame_layout],
            push_constant_ranges: &[],
        });
        let opaque_pipeline = scene_pipeline(
            device,
            &pipeline_layout,
            &shader,
            ScenePass::Opaque,
            samples,
        );
        let glass_pipeline =
            scene_pipeline(device, &pipeline_layout, &shader, ScenePass::Glass, samples);

        let contact = settings
            .contact_shadow
            .map(|c| ContactShadow::new(device, &c, &frame_layout, samples));

        let targets = HdrTargets::new(device, size.0, size.1, samples);
        let tonemap = TonemapPass::new(
            device,
            surface_format,
            &targets.resolved,
            TonemapUniforms::new(settings, surface_format.is_srgb()),
        );

        tracing::info!(
            opaque = instances.opaque.len(),
            glass = instances.glass_count(),
            casters = instances.casters.len(),
            samples,
            ?surface_format,
            "renderer initialized"
        );

        Self {
            cube: CubeBuffers::new(device),
            instances,
            opaque_buffer,
            caster_buffer,
            glass_buffer,
            rig,
            frame_buffer,
            frame_layout,
            frame_bind_group,
            opaque_pipeline,
            glass_pipeline,
            shadow,
            contact,
            environment,
            environment_bound: false,
            environment_sampler,
            targets,
            tonemap,
            baked: false,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.targets = HdrTargets::new(device, width, height, self.targets.samples);
        self.tonemap.rebind(device, &self.targets.resolved);
    }

    /// Bind a loaded environment map for reflections and image-based light.
    pub fn set_environment(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        map: &EnvironmentMap,
    ) -> Result<(), RenderError> {
        self.environment = EnvironmentTexture::upload(device, queue, map)?;
        self.frame_bind_group = frame_bind_group(
            device,
            &self.frame_layout,
            &self.frame_buffer,
            &self.shadow,
            &self.environment.view,
            &self.environment_sampler,
        );
        self.environment_bound = true;
        Ok(())
    }

    /// Render one frame into `target`.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        camera: &OrbitCamera,
        content: FrameContent,
    ) {
        let environment = self
            .environment_bound
            .then_some((self.environment.intensity, self.environment.mip_count));
        queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&self.rig.frame(camera, environment)),
        );

        let glass = self.instances.glass_back_to_front(camera.position());
        if !glass.is_empty() {
            queue.write_buffer(&self.glass_buffer, 0, bytemuck::cast_slice(&glass));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        let draw_scene = content == FrameContent::Scene;
        if draw_scene && !self.baked {
            self.bake(&mut encoder);
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(self.targets.color_attachment())],
                depth_stencil_attachment: Some(self.targets.depth_attachment()),
                ..Default::default()
            });

            if draw_scene {
                pass.set_bind_group(0, &self.frame_bind_group, &[]);

                let opaque = self.instances.opaque.len() as u32;
                pass.set_pipeline(&self.opaque_pipeline);
                self.cube.draw(&mut pass, &self.opaque_buffer, opaque);

                if let Some(contact) = &self.contact {
                    contact.draw_plane(&mut pass);
                }

                pass.set_pipeline(&self.glass_pipeline);
                let glass_count = glass.len() as u32;
                self.cube.draw(&mut pass, &self.glass_buffer, glass_count);
            }
        }

        self.tonemap.record(&mut encoder, target);
        queue.submit(std::iter::once(encoder.finish()));
    }

    /// Record the passes that depend only on the static scene.
    fn bake(&mut self, encoder: &mut wgpu::CommandEncoder) {
        let _span = tracing::info_span!("bake_shadows").entered();
        let casters = self.instances.casters.len() as u32;
        self.shadow
            .record(encoder, &self.cube, &self.caster_buffer, casters);
        if let Some(contact) = &self.contact {
            contact.record(encoder, &self.cube, &self.caster_buffer, casters);
        }
        self.baked = true;
        tracing::debug!(casters, "static shadow passes recorded");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScenePass {
    Opaque,
    Glass,
}

fn scene_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    kind: ScenePass,
    samples: u32,
) -> wgpu::RenderPipeline {
    let (label, entry_point, blend, depth_write) = match kind {
        ScenePass::Opaque => (
            "opaque_pipeline",
            "fs_opaque",
            wgpu::BlendState::REPLACE,
            true,
        ),
        ScenePass::Glass => (
            "glass_pipeline",
            "fs_glass",
            wgpu::BlendState::ALPHA_BLENDING,
            false,
        ),
    };
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &mesh::buffer_layouts(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(entry_point),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: HDR_FORMAT,
                blend: Some(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: samples,
            ..Default::default()
        },
        multiview: None,
        cache: None,
    })
}

fn frame_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    uniforms: &wgpu::Buffer,
    shadow: &ShadowMap,
    environment: &wgpu::TextureView,
    environment_sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("frame_bind_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&shadow.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&shadow.sampler),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(environment),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: wgpu::BindingResource::Sampler(environment_sampler),
            },
        ],
    })
}
