/// Tests for Material
///
/// Programs come from the mock device, so uniform names are resolved against
/// the real G-buffer shader declarations.

use super::*;
use crate::graphics_device::mock_graphics_device::{
    commands_with_prefix, CommandLog, MockGraphicsDevice,
};
use crate::graphics_device::{
    BufferDesc, BufferKind, BufferUsage, GraphicsDevice, ShaderProgramDesc, TextureDesc,
    TextureFormat,
};
use crate::renderer::shaders::{GBUFFER_FRAGMENT, GEOMETRY_VERTEX};

// ============================================================================
// Helper Functions
// ============================================================================

struct Fixture {
    device: MockGraphicsDevice,
    log: CommandLog,
    program: Arc<dyn ShaderProgram>,
    parameters: Arc<dyn Buffer>,
}

fn fixture() -> Fixture {
    let mut device = MockGraphicsDevice::new();
    let log = device.command_log();
    let program = device
        .create_shader_program(&ShaderProgramDesc::new("gbuffer", GEOMETRY_VERTEX, GBUFFER_FRAGMENT))
        .unwrap();
    let parameters = device
        .create_buffer(BufferDesc {
            label: "material.parameters".to_string(),
            kind: BufferKind::Uniform,
            usage: BufferUsage::Dynamic,
            data: vec![0; std::mem::size_of::<MaterialParameters>()],
        })
        .unwrap();
    Fixture { device, log, program, parameters }
}

fn texture(device: &mut MockGraphicsDevice, label: &str) -> Arc<dyn Texture> {
    device
        .create_texture(TextureDesc::attachment(label, 4, 4, TextureFormat::RGBA8))
        .unwrap()
}

fn bind(fixture: &Fixture, material: &Material) {
    let mut cmd = fixture.device.create_command_list().unwrap();
    cmd.begin().unwrap();
    cmd.bind_program(&fixture.program).unwrap();
    material.bind(cmd.as_mut(), &fixture.program, &fixture.parameters).unwrap();
    cmd.end().unwrap();
}

// ============================================================================
// Defaults
// ============================================================================

#[test]
fn test_material_defaults() {
    let material = Material::default();
    assert_eq!(material.shininess, 0.2);
    assert_eq!(material.emission, 0.0);
    assert_eq!(material.diffuse, Vec4::ONE);
    assert_eq!(material.texture_valid_flags(), [false; 4]);
}

#[test]
fn test_parameters_block_is_std140_sized() {
    assert_eq!(std::mem::size_of::<MaterialParameters>(), 32);
    let block = MaterialParameters::from(&Material::default().with_shininess(0.5));
    assert_eq!(block.shininess, 0.5);
    assert_eq!(block.diffuse, [1.0; 4]);
}

#[test]
fn test_slot_names() {
    assert_eq!(MaterialSlot::Normals.index(), 2);
    assert_eq!(MaterialSlot::Normals.sampler_name(), "tNormals");
    assert_eq!(MaterialSlot::Emission.valid_flag_name(), "tTextureValid[3]");
}

// ============================================================================
// Binding
// ============================================================================

#[test]
fn test_empty_material_sets_all_flags_false_and_binds_no_texture() {
    let fixture = fixture();
    bind(&fixture, &Material::default());

    let uniforms = commands_with_prefix(&fixture.log, "set_uniform tTextureValid");
    assert_eq!(uniforms.len(), 4);
    assert!(uniforms.iter().all(|line| line.ends_with("Int(0)")));
    assert!(commands_with_prefix(&fixture.log, "bind_texture").is_empty());
}

#[test]
fn test_texture_bound_to_its_slot_unit() {
    let mut fixture = fixture();
    let normals = texture(&mut fixture.device, "brick.normals");
    let material = Material::default().with_texture(MaterialSlot::Normals, normals);
    bind(&fixture, &material);

    assert_eq!(
        commands_with_prefix(&fixture.log, "bind_texture"),
        vec!["bind_texture 2 brick.normals".to_string()]
    );
    assert!(commands_with_prefix(&fixture.log, "set_uniform tNormals")[0].ends_with("Int(2)"));
    assert!(commands_with_prefix(&fixture.log, "set_uniform tTextureValid[2]")[0].ends_with("Int(1)"));
    assert!(commands_with_prefix(&fixture.log, "set_uniform tTextureValid[0]")[0].ends_with("Int(0)"));
}

#[test]
fn test_parameters_written_then_block_bound() {
    let fixture = fixture();
    bind(&fixture, &Material::default());

    let write = commands_with_prefix(&fixture.log, "write_buffer material.parameters");
    assert_eq!(write, vec!["write_buffer material.parameters offset=0 bytes=32".to_string()]);
    let block = commands_with_prefix(&fixture.log, "bind_uniform_block");
    assert_eq!(block.len(), 1);
    assert!(block[0].contains("binding=2"));
}

#[test]
fn test_clone_shares_textures() {
    let mut fixture = fixture();
    let diffuse = texture(&mut fixture.device, "diffuse");
    let material = Material::default().with_texture(MaterialSlot::Diffuse, Arc::clone(&diffuse));
    let copy = material.clone();
    assert!(Arc::ptr_eq(copy.texture(MaterialSlot::Diffuse).unwrap(), &diffuse));
}
