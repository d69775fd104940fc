//! Unit tests for the mock graphics device

use super::*;

const VERTEX: &str = "#version 330 core
layout (location = 0) in vec3 vPosition;
layout (location = 4) in mat4 iModel;
uniform mat4 uModel;
void main() { gl_Position = uModel * vec4(vPosition, 1.0); }
";

const FRAGMENT: &str = "#version 330 core
uniform sampler2D tDiffuse;
uniform int tTextureValid[4];
layout (std140) uniform Material {
    float shininess;
} uMaterial;
out vec4 color;
void main() { color = texture(tDiffuse, vec2(0.0)); }
";

// ============================================================================
// REFLECTION TESTS
// ============================================================================

#[test]
fn test_reflection_finds_plain_uniforms() {
    let reflection = reflect_sources(&[VERTEX, FRAGMENT]);
    assert!(reflection.uniform("uModel").is_some());
    assert!(reflection.uniform("tDiffuse").is_some());
    assert!(reflection.uniform("uMissing").is_none());
}

#[test]
fn test_reflection_expands_arrays() {
    let reflection = reflect_sources(&[FRAGMENT]);
    for i in 0..4 {
        assert!(reflection.uniform(&format!("tTextureValid[{}]", i)).is_some());
    }
    assert!(reflection.uniform("tTextureValid[4]").is_none());
}

#[test]
fn test_reflection_finds_blocks_and_attributes() {
    let reflection = reflect_sources(&[VERTEX, FRAGMENT]);
    assert_eq!(reflection.uniform_block("Material"), Some(0));
    assert!(reflection.uniform("shininess").is_none());
    assert_eq!(reflection.attribute("vPosition"), Some(0));
    assert_eq!(reflection.attribute("iModel"), Some(4));
}

#[test]
fn test_reflection_reverse_lookup() {
    let reflection = reflect_sources(&[VERTEX]);
    let location = reflection.uniform("uModel").unwrap();
    assert_eq!(reflection.uniform_name(location), Some("uModel"));
}

// ============================================================================
// DEVICE TESTS
// ============================================================================

#[test]
fn test_failing_program_reports_shader_compilation() {
    let mut device = MockGraphicsDevice::new().fail_program("broken");
    let result = device.create_shader_program(&ShaderProgramDesc::new("broken", VERTEX, FRAGMENT));
    assert!(matches!(result, Err(Error::ShaderCompilation { .. })));
}

#[test]
fn test_unexpanded_template_fails_to_compile() {
    let mut device = MockGraphicsDevice::new();
    let result = device.create_shader_program(&ShaderProgramDesc::new("filter", VERTEX, "[filter_code]"));
    assert!(result.is_err());
}

#[test]
fn test_empty_framebuffer_is_incomplete() {
    let mut device = MockGraphicsDevice::new();
    let desc = FramebufferDesc {
        label: "empty".to_string(),
        width: 64,
        height: 64,
        color_attachments: vec![],
        depth_attachment: None,
    };
    assert_eq!(
        device.create_framebuffer(&desc).err(),
        Some(Error::IncompleteFramebuffer("empty".to_string()))
    );
}

#[test]
fn test_depth_renderbuffer_is_not_sampleable() {
    let mut device = MockGraphicsDevice::new();
    let desc = FramebufferDesc {
        label: "gbuffer".to_string(),
        width: 64,
        height: 64,
        color_attachments: vec![crate::graphics_device::ColorAttachmentDesc::new(TextureFormat::RGBA32F)],
        depth_attachment: Some(DepthAttachmentDesc::RenderBuffer {
            format: TextureFormat::Depth24Stencil8,
            samples: 1,
        }),
    };
    let framebuffer = device.create_framebuffer(&desc).unwrap();
    assert!(framebuffer.depth_attachment().is_none());
    assert_eq!(framebuffer.color_attachment(0).unwrap().label(), "gbuffer.color0");
}

#[test]
fn test_command_list_rejects_commands_outside_begin() {
    let device = MockGraphicsDevice::new();
    let mut cmd = device.create_command_list().unwrap();
    assert!(cmd.set_depth_test(true).is_err());
    cmd.begin().unwrap();
    assert!(cmd.set_depth_test(true).is_ok());
    cmd.end().unwrap();
}

#[test]
fn test_set_named_uniform_miss_is_not_an_error() {
    let mut device = MockGraphicsDevice::new();
    let log = device.command_log();
    let program = device.create_shader_program(&ShaderProgramDesc::new("p", VERTEX, FRAGMENT)).unwrap();
    let mut cmd = device.create_command_list().unwrap();
    cmd.begin().unwrap();
    cmd.bind_program(&program).unwrap();
    assert!(!cmd.set_named_uniform(&program, "uNothing", UniformValue::Float(1.0)).unwrap());
    assert!(cmd.set_named_uniform(&program, "uModel", UniformValue::Mat4(glam::Mat4::IDENTITY)).unwrap());
    cmd.end().unwrap();

    let uniforms = commands_with_prefix(&log, "set_uniform");
    assert_eq!(uniforms.len(), 1);
    assert!(uniforms[0].starts_with("set_uniform uModel"));
}
