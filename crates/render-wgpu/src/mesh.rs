use bytemuck::{Pod, Zeroable};
use facade_scene::{Primitive, Scene};
use glam::Vec3;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Per-primitive data streamed as a second vertex buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    pub model_0: [f32; 4],
    pub model_1: [f32; 4],
    pub model_2: [f32; 4],
    pub model_3: [f32; 4],
    /// Linear base color, opacity in `w`.
    pub base_color: [f32; 4],
    /// roughness, metalness, transmission, receives-shadow flag.
    pub surface: [f32; 4],
    /// Linear emissive radiance, index of refraction in `w`.
    pub emissive: [f32; 4],
}

impl InstanceData {
    pub fn from_primitive(p: &Primitive) -> Self {
        let cols = p.model_matrix().to_cols_array_2d();
        let m = &p.material;
        let base = m.base_color().to_linear();
        let emissive = m
            .emissive()
            .map(|e| e.color.to_linear() * e.intensity)
            .unwrap_or(Vec3::ZERO);
        let ior = match m {
            facade_scene::Material::Glass(g) => g.ior,
            facade_scene::Material::Opaque(_) => 1.5,
        };
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            base_color: [base.x, base.y, base.z, m.opacity()],
            surface: [
                m.roughness(),
                m.metalness(),
                m.transmission(),
                if p.receives_shadow { 1.0 } else { 0.0 },
            ],
            emissive: [emissive.x, emissive.y, emissive.z, ior],
        }
    }
}

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
    0 => Float32x3,
    1 => Float32x3,
];

const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 7] = wgpu::vertex_attr_array![
    2 => Float32x4,
    3 => Float32x4,
    4 => Float32x4,
    5 => Float32x4,
    6 => Float32x4,
    7 => Float32x4,
    8 => Float32x4,
];

/// Cube vertices in slot 0, instances in slot 1.
pub fn buffer_layouts() -> [wgpu::VertexBufferLayout<'static>; 2] {
    [
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &VERTEX_ATTRIBUTES,
        },
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceData>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &INSTANCE_ATTRIBUTES,
        },
    ]
}

/// Generate unit cube vertices and indices.
pub fn cube_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let p = 0.5_f32;
    #[rustfmt::skip]
    let vertices = vec![
        // +Z face
        Vertex { position: [-p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [-p,  p,  p], normal: [0.0, 0.0, 1.0] },
        // -Z face
        Vertex { position: [ p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 0.0, -1.0] },
        // +X face
        Vertex { position: [ p, -p,  p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [1.0, 0.0, 0.0] },
        // -X face
        Vertex { position: [-p, -p, -p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [-1.0, 0.0, 0.0] },
        // +Y face
        Vertex { position: [-p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 1.0, 0.0] },
        // -Y face
        Vertex { position: [-p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [0.0, -1.0, 0.0] },
    ];
    #[rustfmt::skip]
    let indices: Vec<u16> = vec![
        0,1,2, 2,3,0,       // +Z
        4,5,6, 6,7,4,       // -Z
        8,9,10, 10,11,8,    // +X
        12,13,14, 14,15,12, // -X
        16,17,18, 18,19,16, // +Y
        20,21,22, 22,23,20, // -Y
    ];
    (vertices, indices)
}

/// The unit cube uploaded once and shared by every pass.
pub struct CubeBuffers {
    pub vertices: wgpu::Buffer,
    pub indices: wgpu::Buffer,
    pub index_count: u32,
}

impl CubeBuffers {
    pub fn new(device: &wgpu::Device) -> Self {
        let (verts, indices) = cube_mesh();
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_vertex_buffer"),
            contents: bytemuck::cast_slice(&verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_index_buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertices,
            indices: index_buffer,
            index_count: indices.len() as u32,
        }
    }

    /// Bind the cube and `instances`, then draw `count` instances.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, instances: &wgpu::Buffer, count: u32) {
        if count == 0 {
            return;
        }
        pass.set_vertex_buffer(0, self.vertices.slice(..));
        pass.set_vertex_buffer(1, instances.slice(..));
        pass.set_index_buffer(self.indices.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..self.index_count, 0, 0..count);
    }
}

/// A glass instance and the point its draw order is sorted by.
#[derive(Debug, Clone, Copy, PartialEq)]
struct GlassInstance {
    center: Vec3,
    data: InstanceData,
}

/// The scene flattened into GPU instance lists.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneInstances {
    pub opaque: Vec<InstanceData>,
    pub casters: Vec<InstanceData>,
    glass: Vec<GlassInstance>,
}

impl SceneInstances {
    pub fn from_scene(scene: &Scene) -> Self {
        Self {
            opaque: scene.opaque().map(InstanceData::from_primitive).collect(),
            casters: scene
                .shadow_casters()
                .map(InstanceData::from_primitive)
                .collect(),
            glass: scene
                .transparent()
                .map(|p| GlassInstance {
                    center: p.position,
                    data: InstanceData::from_primitive(p),
                })
                .collect(),
        }
    }

    pub fn glass_count(&self) -> usize {
        self.glass.len()
    }

    /// Glass instances ordered farthest-first from `eye`.
    pub fn glass_back_to_front(&self, eye: Vec3) -> Vec<InstanceData> {
        let mut sorted = self.glass.clone();
        sorted.sort_by(|a, b| {
            b.center
                .distance_squared(eye)
                .total_cmp(&a.center.distance_squared(eye))
        });
        sorted.into_iter().map(|g| g.data).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facade_scene::build_facade;

    #[test]
    fn cube_normals_are_unit_and_outward() {
        let (verts, indices) = cube_mesh();
        assert_eq!(verts.len(), 24);
        assert_eq!(indices.len(), 36);
        for v in &verts {
            let n = Vec3::from(v.normal);
            let p = Vec3::from(v.position);
            assert!((n.length() - 1.0).abs() < 1e-6);
            assert!(n.dot(p) > 0.0);
        }
    }

    #[test]
    fn cube_triangles_wind_counter_clockwise_from_outside() {
        let (verts, indices) = cube_mesh();
        for tri in indices.chunks(3) {
            let a = Vec3::from(verts[tri[0] as usize].position);
            let b = Vec3::from(verts[tri[1] as usize].position);
            let c = Vec3::from(verts[tri[2] as usize].position);
            let n = Vec3::from(verts[tri[0] as usize].normal);
            assert!((b - a).cross(c - a).dot(n) > 0.0);
        }
    }

    #[test]
    fn instances_partition_the_scene() {
        let scene = build_facade();
        let inst = SceneInstances::from_scene(&scene);
        assert_eq!(
            inst.opaque.len() + inst.glass_count(),
            scene.primitives().len()
        );
        assert_eq!(inst.glass_count(), 2);
        assert_eq!(inst.casters.len(), scene.shadow_casters().count());
    }

    #[test]
    fn instance_packs_material() {
        let scene = build_facade();
        let glass = scene.transparent().next().unwrap();
        let data = InstanceData::from_primitive(glass);
        assert_eq!(data.base_color[3], 0.4);
        assert_eq!(data.surface[2], 0.95);
        assert_eq!(data.surface[3], 0.0);
        assert_eq!(data.emissive[3], 1.5);
        assert_eq!(data.model_3[..3], [0.0, 2.5, 0.55]);
        assert_eq!(data.model_0[0], 6.0);

        let led = scene
            .primitives()
            .iter()
            .find(|p| p.label == "led-horizontal")
            .unwrap();
        let data = InstanceData::from_primitive(led);
        assert!((data.emissive[0] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn glass_sorts_far_to_near() {
        let scene = build_facade();
        let inst = SceneInstances::from_scene(&scene);
        // Center panel sits at z=0.55, left panel at x=-4, z=1.
        let from_left = inst.glass_back_to_front(Vec3::new(-20.0, 2.5, 5.0));
        assert_eq!(from_left[0].model_3[0], 0.0);
        let from_right = inst.glass_back_to_front(Vec3::new(20.0, 2.5, 5.0));
        assert_eq!(from_right[0].model_3[0], -4.0);
    }

    #[test]
    fn instance_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<InstanceData>(), 7 * 16);
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
    }
}
