/// Frame uniforms and bindings shared by the scene and contact-plane shaders.
const FRAME_BINDINGS: &str = r#"
struct DirectionalLight {
    direction: vec4<f32>,
    color: vec4<f32>,
};

struct PointLight {
    position: vec4<f32>,
    color: vec4<f32>,
};

struct Frame {
    view_proj: mat4x4<f32>,
    light_view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    ambient: vec4<f32>,
    hemi_sky: vec4<f32>,
    hemi_ground: vec4<f32>,
    directional: array<DirectionalLight, 2>,
    points: array<PointLight, 4>,
    counts: vec4<u32>,
    environment: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> frame: Frame;
@group(0) @binding(1)
var shadow_map: texture_depth_2d;
@group(0) @binding(2)
var shadow_sampler: sampler_comparison;
@group(0) @binding(3)
var env_map: texture_2d<f32>;
@group(0) @binding(4)
var env_sampler: sampler;
"#;

/// Cube vertex and instance inputs.
const INSTANCE_INPUTS: &str = r#"
struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) base_color: vec4<f32>,
    @location(7) surface: vec4<f32>,
    @location(8) emissive: vec4<f32>,
};

fn instance_model(instance: InstanceInput) -> mat4x4<f32> {
    return mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
}
"#;

/// Physically based shading of instanced boxes. `fs_opaque` writes alpha 1,
/// `fs_glass` writes the material opacity for blending.
const SCENE_BODY: &str = r#"
const PI: f32 = 3.14159265;
const MIN_ROUGHNESS: f32 = 0.0525;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) base_color: vec4<f32>,
    @location(3) surface: vec4<f32>,
    @location(4) emissive: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = instance_model(instance);
    let world = model * vec4<f32>(vertex.position, 1.0);
    // Boxes are axis aligned, so the normal matrix is the inverse scale.
    let scale = vec3<f32>(
        length(instance.model_0.xyz),
        length(instance.model_1.xyz),
        length(instance.model_2.xyz),
    );

    var out: VertexOutput;
    out.clip_position = frame.view_proj * world;
    out.world_position = world.xyz;
    out.world_normal = normalize(vertex.normal / scale);
    out.base_color = instance.base_color;
    out.surface = instance.surface;
    out.emissive = instance.emissive;
    return out;
}

fn d_ggx(n_dot_h: f32, alpha: f32) -> f32 {
    let a2 = alpha * alpha;
    let d = n_dot_h * n_dot_h * (a2 - 1.0) + 1.0;
    return a2 / (PI * d * d);
}

fn v_smith_correlated(n_dot_v: f32, n_dot_l: f32, alpha: f32) -> f32 {
    let a2 = alpha * alpha;
    let gv = n_dot_l * sqrt(n_dot_v * n_dot_v * (1.0 - a2) + a2);
    let gl = n_dot_v * sqrt(n_dot_l * n_dot_l * (1.0 - a2) + a2);
    return 0.5 / max(gv + gl, 1e-5);
}

fn f_schlick(f0: vec3<f32>, v_dot_h: f32) -> vec3<f32> {
    return f0 + (vec3<f32>(1.0) - f0) * pow(1.0 - v_dot_h, 5.0);
}

fn direct_brdf(n: vec3<f32>, v: vec3<f32>, l: vec3<f32>, diffuse: vec3<f32>, f0: vec3<f32>, roughness: f32) -> vec3<f32> {
    let h = normalize(l + v);
    let n_dot_l = max(dot(n, l), 0.0);
    let n_dot_v = max(dot(n, v), 1e-4);
    let n_dot_h = max(dot(n, h), 0.0);
    let v_dot_h = max(dot(v, h), 0.0);
    let alpha = roughness * roughness;
    let specular = f_schlick(f0, v_dot_h) * v_smith_correlated(n_dot_v, n_dot_l, alpha) * d_ggx(n_dot_h, alpha);
    return diffuse / PI + specular;
}

// Analytic fit of the split-sum environment BRDF.
fn env_brdf(n_dot_v: f32, roughness: f32) -> vec2<f32> {
    let c0 = vec4<f32>(-1.0, -0.0275, -0.572, 0.022);
    let c1 = vec4<f32>(1.0, 0.0425, 1.04, -0.04);
    let r = roughness * c0 + c1;
    let a004 = min(r.x * r.x, exp2(-9.28 * n_dot_v)) * r.x + r.y;
    return vec2<f32>(-1.04, 1.04) * a004 + r.zw;
}

fn point_attenuation(distance: f32, cutoff: f32, decay: f32) -> f32 {
    let falloff = 1.0 / max(pow(distance, decay), 0.01);
    if (cutoff <= 0.0) {
        return falloff;
    }
    let ratio = distance / cutoff;
    let window = clamp(1.0 - ratio * ratio * ratio * ratio, 0.0, 1.0);
    return falloff * window * window;
}

fn shadow_visibility(world_position: vec3<f32>, normal: vec3<f32>) -> f32 {
    let biased = world_position + normal * 0.02;
    let clip = frame.light_view_proj * vec4<f32>(biased, 1.0);
    let ndc = clip.xyz / clip.w;
    let uv = ndc.xy * vec2<f32>(0.5, -0.5) + vec2<f32>(0.5);
    let depth = ndc.z + frame.environment.z;
    let texel = frame.environment.w;

    var lit = 0.0;
    for (var x = -1; x <= 1; x = x + 1) {
        for (var y = -1; y <= 1; y = y + 1) {
            let offset = vec2<f32>(f32(x), f32(y)) * texel;
            lit = lit + textureSampleCompareLevel(shadow_map, shadow_sampler, uv + offset, depth);
        }
    }
    lit = lit / 9.0;

    let outside = any(uv < vec2<f32>(0.0)) || any(uv > vec2<f32>(1.0)) || depth > 1.0;
    return select(lit, 1.0, outside);
}

fn env_uv(dir: vec3<f32>) -> vec2<f32> {
    let u = atan2(dir.z, dir.x) / (2.0 * PI) + 0.5;
    let v = acos(clamp(dir.y, -1.0, 1.0)) / PI;
    return vec2<f32>(u, v);
}

fn sample_env(dir: vec3<f32>, lod: f32) -> vec3<f32> {
    return textureSampleLevel(env_map, env_sampler, env_uv(dir), lod).rgb * frame.environment.x;
}

fn shade(in: VertexOutput) -> vec3<f32> {
    let n = normalize(in.world_normal);
    let v = normalize(frame.camera_position.xyz - in.world_position);
    let base = in.base_color.rgb;
    let roughness = clamp(in.surface.x, MIN_ROUGHNESS, 1.0);
    let metalness = in.surface.y;
    let transmission = in.surface.z;
    let receives_shadow = in.surface.w;
    let ior = in.emissive.w;

    let diffuse = base * (1.0 - metalness);
    let f0 = mix(vec3<f32>(0.04), base, metalness);

    var visibility = 1.0;
    if (frame.counts.w == 1u) {
        visibility = mix(1.0, shadow_visibility(in.world_position, n), receives_shadow);
    }

    var direct = vec3<f32>(0.0);
    for (var i = 0u; i < frame.counts.x; i = i + 1u) {
        let light = frame.directional[i];
        let l = -normalize(light.direction.xyz);
        let n_dot_l = max(dot(n, l), 0.0);
        let shadow = select(1.0, visibility, light.direction.w > 0.5);
        direct = direct + direct_brdf(n, v, l, diffuse, f0, roughness) * light.color.rgb * n_dot_l * shadow;
    }
    for (var i = 0u; i < frame.counts.y; i = i + 1u) {
        let light = frame.points[i];
        let to_light = light.position.xyz - in.world_position;
        let distance = length(to_light);
        let l = to_light / max(distance, 1e-4);
        let n_dot_l = max(dot(n, l), 0.0);
        let attenuation = point_attenuation(distance, light.position.w, light.color.w);
        direct = direct + direct_brdf(n, v, l, diffuse, f0, roughness) * light.color.rgb * n_dot_l * attenuation;
    }

    let hemi = mix(frame.hemi_ground.rgb, frame.hemi_sky.rgb, 0.5 * n.y + 0.5);
    var indirect_diffuse = diffuse * (frame.ambient.rgb + hemi) / PI;
    var indirect_specular = vec3<f32>(0.0);
    var transmitted = indirect_diffuse;

    if (frame.counts.z == 1u) {
        let top_lod = frame.environment.y - 1.0;
        let n_dot_v = max(dot(n, v), 1e-4);
        let ab = env_brdf(n_dot_v, roughness);
        let specular_weight = f0 * ab.x + ab.y;
        indirect_diffuse = indirect_diffuse + diffuse * sample_env(n, top_lod) * (vec3<f32>(1.0) - specular_weight);
        indirect_specular = sample_env(reflect(-v, n), roughness * top_lod) * specular_weight;
        transmitted = sample_env(refract(-v, n, 1.0 / ior), roughness * top_lod) * base;
    }

    let diffuse_total = mix(direct + indirect_diffuse, transmitted, transmission);
    return diffuse_total + indirect_specular + in.emissive.rgb;
}

@fragment
fn fs_opaque(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(shade(in), 1.0);
}

@fragment
fn fs_glass(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(shade(in), in.base_color.a);
}
"#;

/// Depth-only pass from the key light.
const SHADOW_BODY: &str = r#"
struct ShadowPass {
    light_view_proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> shadow_pass: ShadowPass;

@vertex
fn vs_shadow(vertex: VertexInput, instance: InstanceInput) -> @builtin(position) vec4<f32> {
    let world = instance_model(instance) * vec4<f32>(vertex.position, 1.0);
    return shadow_pass.light_view_proj * world;
}
"#;

/// Top-down occlusion of shadow casters above the contact plane. Closer
/// geometry is darker; max blending keeps the darkest contribution.
const CONTACT_BODY: &str = r#"
struct ContactPass {
    // plane y, half extent, far, unused
    plane: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> contact: ContactPass;

struct ContactOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) height: f32,
};

@vertex
fn vs_contact(vertex: VertexInput, instance: InstanceInput) -> ContactOutput {
    let world = instance_model(instance) * vec4<f32>(vertex.position, 1.0);
    let height = world.y - contact.plane.x;
    var out: ContactOutput;
    out.clip_position = vec4<f32>(
        world.x / contact.plane.y,
        -world.z / contact.plane.y,
        height / contact.plane.z,
        1.0,
    );
    out.height = height;
    return out;
}

@fragment
fn fs_contact(in: ContactOutput) -> @location(0) vec4<f32> {
    let darkness = 1.0 - clamp(in.height / contact.plane.z, 0.0, 1.0);
    return vec4<f32>(darkness, 0.0, 0.0, 1.0);
}
"#;

/// Full-screen triangle shared by the blur and tonemap passes.
const FULLSCREEN: &str = r#"
struct FullscreenOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_fullscreen(@builtin(vertex_index) index: u32) -> FullscreenOutput {
    let x = f32(i32(index & 1u) * 4 - 1);
    let y = f32(i32(index >> 1u) * 4 - 1);
    var out: FullscreenOutput;
    out.position = vec4<f32>(x, y, 0.0, 1.0);
    out.uv = vec2<f32>(x * 0.5 + 0.5, 0.5 - y * 0.5);
    return out;
}
"#;

/// One axis of a separable 9-tap gaussian.
const BLUR_BODY: &str = r#"
struct BlurPass {
    // texel step along the blur axis, scaled by the blur radius
    step: vec4<f32>,
};

@group(0) @binding(0)
var source: texture_2d<f32>;
@group(0) @binding(1)
var source_sampler: sampler;
@group(0) @binding(2)
var<uniform> blur: BlurPass;

@fragment
fn fs_blur(in: FullscreenOutput) -> @location(0) vec4<f32> {
    var weights = array<f32, 5>(0.2270270, 0.1945946, 0.1216216, 0.0540540, 0.0162162);
    var sum = textureSample(source, source_sampler, in.uv).r * weights[0];
    for (var i = 1; i < 5; i = i + 1) {
        let offset = blur.step.xy * f32(i);
        sum = sum + textureSample(source, source_sampler, in.uv + offset).r * weights[i];
        sum = sum + textureSample(source, source_sampler, in.uv - offset).r * weights[i];
    }
    return vec4<f32>(sum, 0.0, 0.0, 1.0);
}
"#;

/// Blurred contact shadow drawn as a black, alpha-blended ground quad.
const PLANE_BODY: &str = r#"
struct PlanePass {
    // plane y, half extent, opacity, unused
    plane: vec4<f32>,
};

@group(1) @binding(0)
var contact_map: texture_2d<f32>;
@group(1) @binding(1)
var contact_sampler: sampler;
@group(1) @binding(2)
var<uniform> plane: PlanePass;

struct PlaneOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_plane(@builtin(vertex_index) index: u32) -> PlaneOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(-1.0, 1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(-1.0, -1.0),
    );
    let c = corners[index];
    let world = vec3<f32>(c.x * plane.plane.y, plane.plane.x, c.y * plane.plane.y);
    var out: PlaneOutput;
    out.clip_position = frame.view_proj * vec4<f32>(world, 1.0);
    out.uv = c * 0.5 + vec2<f32>(0.5);
    return out;
}

@fragment
fn fs_plane(in: PlaneOutput) -> @location(0) vec4<f32> {
    let shadow = textureSample(contact_map, contact_sampler, in.uv).r;
    return vec4<f32>(0.0, 0.0, 0.0, shadow * plane.plane.z);
}
"#;

/// HDR resolve to the swapchain: ACES filmic tone mapping over geometry,
/// background composited by coverage without tone mapping.
const TONEMAP_BODY: &str = r#"
struct Tonemap {
    background: vec4<f32>,
    // exposure, operator, encode to sRGB, unused
    params: vec4<f32>,
};

@group(0) @binding(0)
var hdr: texture_2d<f32>;
@group(0) @binding(1)
var<uniform> tonemap: Tonemap;

fn rrt_and_odt_fit(v: vec3<f32>) -> vec3<f32> {
    let a = v * (v + 0.0245786) - 0.000090537;
    let b = v * (0.983729 * v + 0.4329510) + 0.238081;
    return a / b;
}

fn aces_filmic(color: vec3<f32>, exposure: f32) -> vec3<f32> {
    let input_mat = mat3x3<f32>(
        0.59719, 0.07600, 0.02840,
        0.35458, 0.90834, 0.13383,
        0.04823, 0.01566, 0.83777,
    );
    let output_mat = mat3x3<f32>(
        1.60475, -0.10208, -0.00327,
        -0.53108, 1.10813, -0.07276,
        -0.07367, -0.00605, 1.07602,
    );
    var c = color * exposure / 0.6;
    c = input_mat * c;
    c = rrt_and_odt_fit(c);
    c = output_mat * c;
    return clamp(c, vec3<f32>(0.0), vec3<f32>(1.0));
}

fn linear_to_srgb(c: vec3<f32>) -> vec3<f32> {
    let low = c * 12.92;
    let high = 1.055 * pow(c, vec3<f32>(1.0 / 2.4)) - 0.055;
    return select(high, low, c <= vec3<f32>(0.0031308));
}

@fragment
fn fs_tonemap(in: FullscreenOutput) -> @location(0) vec4<f32> {
    let texel = textureLoad(hdr, vec2<i32>(in.position.xy), 0);
    let coverage = clamp(texel.a, 0.0, 1.0);
    let radiance = texel.rgb / max(coverage, 1e-4);

    var mapped = clamp(radiance * tonemap.params.x, vec3<f32>(0.0), vec3<f32>(1.0));
    if (tonemap.params.y > 0.5) {
        mapped = aces_filmic(radiance, tonemap.params.x);
    }

    var color = mix(tonemap.background.rgb, mapped, coverage);
    if (tonemap.params.z > 0.5) {
        color = linear_to_srgb(color);
    }
    return vec4<f32>(color, 1.0);
}
"#;

pub fn scene_shader() -> String {
    [FRAME_BINDINGS, INSTANCE_INPUTS, SCENE_BODY].concat()
}

pub fn shadow_shader() -> String {
    [INSTANCE_INPUTS, SHADOW_BODY].concat()
}

pub fn contact_shader() -> String {
    [INSTANCE_INPUTS, CONTACT_BODY].concat()
}

pub fn blur_shader() -> String {
    [FULLSCREEN, BLUR_BODY].concat()
}

pub fn plane_shader() -> String {
    [FRAME_BINDINGS, PLANE_BODY].concat()
}

pub fn tonemap_shader() -> String {
    [FULLSCREEN, TONEMAP_BODY].concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_shader_has_both_fragment_entry_points() {
        let src = scene_shader();
        assert!(src.contains("fn vs_main"));
        assert!(src.contains("fn fs_opaque"));
        assert!(src.contains("fn fs_glass"));
        assert_eq!(src.matches("struct Frame {").count(), 1);
    }

    #[test]
    fn frame_struct_matches_uniform_layout() {
        // Field order must mirror FrameUniforms.
        let order = [
            "view_proj:",
            "light_view_proj:",
            "camera_position:",
            "ambient:",
            "hemi_sky:",
            "hemi_ground:",
            "directional: array<DirectionalLight, 2>",
            "points: array<PointLight, 4>",
            "counts:",
            "environment:",
        ];
        let mut last = 0;
        for field in order {
            let at = FRAME_BINDINGS[last..]
                .find(field)
                .map(|i| i + last)
                .unwrap_or_else(|| panic!("missing {field}"));
            last = at;
        }
    }

    #[test]
    fn every_shader_is_self_contained() {
        for src in [
            shadow_shader(),
            contact_shader(),
            blur_shader(),
            plane_shader(),
            tonemap_shader(),
        ] {
            assert!(src.contains("@vertex") || src.contains("fn vs_fullscreen"));
        }
        assert!(tonemap_shader().contains("fn aces_filmic"));
    }
}
