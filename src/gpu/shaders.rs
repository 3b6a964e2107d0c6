//! WGSL sources for the particle and photo pipelines.
//!
//! Both shaders share the [`Uniforms`](super::Uniforms) block at group 0 and
//! a texture/sampler pair at group 1. Positions arrive in tree-local space;
//! the shader applies the tree's rotation so the CPU never rewrites them
//! just because the tree turned.

/// Shared uniform block and fog helper, prepended to both shaders.
const COMMON: &str = r#"
struct Uniforms {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    tree: mat4x4<f32>,
    time: f32,
    particle_size: f32,
    fog_density: f32,
    _padding: f32,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

@group(1) @binding(0)
var color_texture: texture_2d<f32>;
@group(1) @binding(1)
var color_sampler: sampler;

// Exponential-squared fog toward black. 1.0 means no fog.
fn fog_factor(view_pos: vec3<f32>) -> f32 {
    let d = uniforms.fog_density * length(view_pos);
    return clamp(exp(-d * d), 0.0, 1.0);
}

fn quad_corner(vertex_index: u32) -> vec2<f32> {
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );
    return quad_vertices[vertex_index];
}
"#;

const PARTICLE_BODY: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) fog: f32,
};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) particle_pos: vec3<f32>,
    @location(1) particle_color: vec3<f32>,
) -> VertexOutput {
    let quad_pos = quad_corner(vertex_index);

    // Billboard in view space so sprites keep a constant world size.
    let view_pos = uniforms.view * uniforms.tree * vec4<f32>(particle_pos, 1.0);
    let corner = view_pos.xyz + vec3<f32>(quad_pos * uniforms.particle_size * 0.5, 0.0);

    var out: VertexOutput;
    out.clip_position = uniforms.proj * vec4<f32>(corner, 1.0);
    out.color = particle_color;
    out.uv = quad_pos * 0.5 + vec2<f32>(0.5, 0.5);
    out.fog = fog_factor(view_pos.xyz);
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let sprite = textureSample(color_texture, color_sampler, in.uv);
    return vec4<f32>(in.color * sprite.rgb * in.fog, sprite.a);
}
"#;

const PHOTO_BODY: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) tint: vec4<f32>,
    @location(2) fog: f32,
};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) model_0: vec4<f32>,
    @location(1) model_1: vec4<f32>,
    @location(2) model_2: vec4<f32>,
    @location(3) model_3: vec4<f32>,
    @location(4) tint: vec4<f32>,
) -> VertexOutput {
    let quad_pos = quad_corner(vertex_index);
    let model = mat4x4<f32>(model_0, model_1, model_2, model_3);
    let view_pos = uniforms.view * uniforms.tree * model * vec4<f32>(quad_pos, 0.0, 1.0);

    var out: VertexOutput;
    out.clip_position = uniforms.proj * view_pos;
    out.uv = vec2<f32>(quad_pos.x * 0.5 + 0.5, 0.5 - quad_pos.y * 0.5);
    out.tint = tint;
    out.fog = fog_factor(view_pos.xyz);
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let color = textureSample(color_texture, color_sampler, in.uv) * in.tint;
    return vec4<f32>(color.rgb * in.fog, color.a);
}
"#;

/// Instanced billboard sprites, one instance per particle.
pub fn particle_shader() -> String {
    format!("{COMMON}{PARTICLE_BODY}")
}

/// Instanced textured quads, one instance per frame or picture plane.
pub fn photo_shader() -> String {
    format!("{COMMON}{PHOTO_BODY}")
}
