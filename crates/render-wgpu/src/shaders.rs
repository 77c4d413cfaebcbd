/// Per-eye uniform block shared by the skybox and model shaders.
///
/// Must match `EyeUniforms` in `scene.rs`.
pub const EYE_UNIFORMS: &str = r#"
struct EyeUniforms {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    skybox_view: mat4x4<f32>,
    eye_position: vec4<f32>,
    light_position: vec4<f32>,
    light_ambient: vec4<f32>,
    light_diffuse: vec4<f32>,
    light_specular: vec4<f32>,
    // x: seconds since start, y: material shininess
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> eye: EyeUniforms;
"#;

/// WGSL shader for the skybox cube. Output depth is pinned to the far plane.
pub const SKYBOX_SHADER: &str = r#"
@group(1) @binding(0)
var sky_texture: texture_cube<f32>;
@group(1) @binding(1)
var sky_sampler: sampler;

struct SkyOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) direction: vec3<f32>,
};

@vertex
fn vs_sky(@location(0) position: vec3<f32>) -> SkyOutput {
    let clip = eye.projection * eye.skybox_view * vec4<f32>(position, 1.0);
    var out: SkyOutput;
    out.clip_position = clip.xyww;
    out.direction = position;
    return out;
}

@fragment
fn fs_sky(in: SkyOutput) -> @location(0) vec4<f32> {
    return textureSample(sky_texture, sky_sampler, in.direction);
}
"#;

/// WGSL shader for the instanced, animated model with Phong point lighting.
pub const MODEL_SHADER: &str = r#"
@group(1) @binding(0)
var diffuse_map: texture_2d<f32>;
@group(1) @binding(1)
var specular_map: texture_2d<f32>;
@group(1) @binding(2)
var material_sampler: sampler;

const SWAY_AMPLITUDE: f32 = 0.1;
const SWAY_FREQUENCY: f32 = 2.0;
const SWAY_SPEED: f32 = 3.0;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct InstanceInput {
    @location(3) model_0: vec4<f32>,
    @location(4) model_1: vec4<f32>,
    @location(5) model_2: vec4<f32>,
    @location(6) model_3: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_model(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );

    // Side-to-side swimming sway travelling along the body.
    var swayed = vertex.position;
    swayed.x += sin(eye.params.x * SWAY_SPEED + swayed.z * SWAY_FREQUENCY) * SWAY_AMPLITUDE;

    let world = model * vec4<f32>(swayed, 1.0);
    var out: VertexOutput;
    out.clip_position = eye.projection * eye.view * world;
    out.world_position = world.xyz;
    out.world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;
    out.uv = vertex.uv;
    return out;
}

@fragment
fn fs_model(in: VertexOutput) -> @location(0) vec4<f32> {
    let base = textureSample(diffuse_map, material_sampler, in.uv).rgb;
    let spec_mask = textureSample(specular_map, material_sampler, in.uv).rgb;

    let normal = normalize(in.world_normal);
    let light_dir = normalize(eye.light_position.xyz - in.world_position);
    let view_dir = normalize(eye.eye_position.xyz - in.world_position);
    let reflect_dir = reflect(-light_dir, normal);

    let ambient = eye.light_ambient.rgb * base;
    let diffuse = eye.light_diffuse.rgb * max(dot(normal, light_dir), 0.0) * base;
    let shine = pow(max(dot(view_dir, reflect_dir), 0.0), eye.params.y);
    let specular = eye.light_specular.rgb * shine * spec_mask;

    return vec4<f32>(ambient + diffuse + specular, 1.0);
}
"#;

/// WGSL shader for the compositor: one textured quad per eye.
pub const COMPOSITE_SHADER: &str = r#"
@group(0) @binding(0)
var eye_image: texture_2d<f32>;
@group(0) @binding(1)
var eye_sampler: sampler;

struct QuadOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_quad(@location(0) position: vec2<f32>, @location(1) uv: vec2<f32>) -> QuadOutput {
    var out: QuadOutput;
    out.clip_position = vec4<f32>(position, 0.0, 1.0);
    out.uv = uv;
    return out;
}

@fragment
fn fs_quad(in: QuadOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(textureSample(eye_image, eye_sampler, in.uv).rgb, 1.0);
}
"#;

/// Full skybox shader source with the uniform block prepended.
pub fn skybox_source() -> String {
    format!("{EYE_UNIFORMS}{SKYBOX_SHADER}")
}

/// Full model shader source with the uniform block prepended.
pub fn model_source() -> String {
    format!("{EYE_UNIFORMS}{MODEL_SHADER}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_carry_uniform_block() {
        for source in [skybox_source(), model_source()] {
            assert!(source.contains("struct EyeUniforms"));
            assert!(source.contains("var<uniform> eye: EyeUniforms"));
        }
    }

    #[test]
    fn entry_points_present() {
        assert!(SKYBOX_SHADER.contains("fn vs_sky") && SKYBOX_SHADER.contains("fn fs_sky"));
        assert!(MODEL_SHADER.contains("fn vs_model") && MODEL_SHADER.contains("fn fs_model"));
        assert!(COMPOSITE_SHADER.contains("fn vs_quad") && COMPOSITE_SHADER.contains("fn fs_quad"));
    }
}
