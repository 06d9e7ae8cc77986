lazy_static::lazy_static! {
    static ref VERTEX: String =
    "
#version 450

layout(location=0) in vec3 a_position;
layout(location=1) in vec3 a_normal;

layout(set=0, binding=0)
uniform Uniforms {
    mat4 u_view_proj;
};
layout(set=1, binding=0)
uniform Model {
    mat4 u_model;
};

layout(location=0) out vec3 v_normal;

void main() {
    v_normal = a_normal;
    gl_Position = u_view_proj * u_model * vec4(a_position, 1.0);
}
    ".to_string();

    static ref FRAGMENT: String =
    "
#version 450

layout(location=0) in vec3 v_normal;

layout(location=0) out vec4 f_color;

void main() {
    // Color writes are masked off in the pipeline; only depth lands.
    f_color = vec4(normalize(v_normal) * 0.5 + 0.5, 1.0);
}
    ".to_string();
}

pub fn compile_shaders(
    compiler: &mut shaderc::Compiler,
    device: &wgpu::Device,
) -> (wgpu::ShaderModule, wgpu::ShaderModule) {
    let vert = super::compile_shader(
        &VERTEX,
        "occluder.vert",
        shaderc::ShaderKind::Vertex,
        compiler,
        device,
    );
    let frag = super::compile_shader(
        &FRAGMENT,
        "occluder.frag",
        shaderc::ShaderKind::Fragment,
        compiler,
        device,
    );
    (vert, frag)
}
