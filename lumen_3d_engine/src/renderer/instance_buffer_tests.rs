use super::*;
use crate::graphics_device::mock_graphics_device::{commands_with_prefix, MockGraphicsDevice};

const RECORD: u64 = std::mem::size_of::<Instance>() as u64;

#[test]
fn test_instance_buffer_grows_and_never_shrinks() {
    let mut device = MockGraphicsDevice::new();
    let log = device.command_log();
    let mut instances = InstanceBuffer::new(&mut device).unwrap();
    assert_eq!(instances.allocated(), 0);

    let mut cmd = device.create_command_list().unwrap();
    cmd.begin().unwrap();
    instances.upload(cmd.as_mut(), &[Instance::default(); 4]).unwrap();
    assert_eq!(instances.allocated(), 4 * RECORD);

    instances.upload(cmd.as_mut(), &[Instance::default(); 2]).unwrap();
    assert_eq!(instances.allocated(), 4 * RECORD);

    instances.upload(cmd.as_mut(), &[Instance::default(); 10]).unwrap();
    assert_eq!(instances.allocated(), 10 * RECORD);
    cmd.end().unwrap();

    assert_eq!(commands_with_prefix(&log, "reallocate_buffer").len(), 2);
    assert_eq!(
        commands_with_prefix(&log, "write_buffer"),
        vec![format!("write_buffer renderer.instances offset=0 bytes={}", 2 * RECORD)]
    );
    assert_eq!(instances.buffer().size(), 10 * RECORD);
}

#[test]
fn test_instance_defaults() {
    let instance = Instance::default();
    assert_eq!(instance.tex_coord_transform, [0.0, 0.0, 1.0, 1.0]);
    assert_eq!(instance.color, [1.0; 4]);
    assert_eq!(instance.emission, 0.0);
    assert_eq!(instance.model_matrix(), glam::Mat4::IDENTITY);
}
