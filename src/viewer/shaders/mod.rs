pub mod hand;
pub mod occluder;

fn compile_shader(
    source_text: &str,
    tag: &str,
    shader_kind: shaderc::ShaderKind,
    compiler: &mut shaderc::Compiler,
    device: &wgpu::Device,
) -> wgpu::ShaderModule {
    let spirv = compiler
        .compile_into_spirv(source_text, shader_kind, tag, "main", None)
        .unwrap();
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(tag),
        source: wgpu::ShaderSource::SpirV(std::borrow::Cow::Borrowed(spirv.as_binary())),
    })
}
