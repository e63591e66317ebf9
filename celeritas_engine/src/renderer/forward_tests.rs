//! Unit tests for the lit forward pass against the mock backend

use super::*;
use crate::camera::Camera;
use crate::ral::mock_backend::MockBackend;
use crate::ral::{run_frame, RenderpassDesc, TextureDesc};
use crate::resource::{Geometry, Mesh};

#[test]
fn test_uniform_block_is_std140_sized() {
    assert_eq!(std::mem::size_of::<ForwardUniforms>(), 160);
}

#[test]
fn test_layout_pairs_uniforms_with_shadow_map() {
    let layout = ForwardData::layout(None);
    let labels: Vec<&str> = layout.bindings.iter().map(|b| b.label).collect();
    assert_eq!(labels, vec!["ForwardUniforms", "shadowMap"]);
    assert!(!layout.stores_data());
}

#[test]
fn test_draw_binds_camera_once_and_each_entity() {
    let mut backend = MockBackend::new().unwrap();
    let main = backend
        .renderpass_create(&RenderpassDesc::default_framebuffer("main"))
        .unwrap();
    let shadow_map = backend
        .texture_create(&TextureDesc::depth("shadow map", 64, 64), false, None)
        .unwrap();
    let forward = ForwardPass::new(&mut backend, main).unwrap();
    let cube = Mesh::upload(&mut backend, &Geometry::cuboid(Vec3::ONE)).unwrap();
    let camera = CameraBinding::from_camera(&Camera::looking_at(Vec3::splat(4.0), Vec3::ZERO, 1.0), 800.0, 600.0);

    let entities = [
        RenderEnt::new(&cube, Mat4::IDENTITY),
        RenderEnt::new(&cube, Mat4::from_translation(Vec3::X)).with_shadows(false),
    ];
    let mut drawn = 0;
    run_frame(&mut backend, |encoder| {
        encoder.begin_render(main)?;
        drawn = forward.draw(encoder, &camera, Mat4::IDENTITY, Vec3::NEG_Y, shadow_map, &entities)?;
        encoder.end_render()
    })
    .unwrap();

    // shadow casting only matters to the shadow pass
    assert_eq!(drawn, 2);
    let count = |prefix: &str| backend.commands.iter().filter(|c| c.starts_with(prefix)).count();
    assert_eq!(count("upload_uniform Camera"), 1);
    assert_eq!(count("upload_uniform ForwardUniforms 160"), 2);
    assert_eq!(count("bind_texture shadowMap 1"), 2);
    assert_eq!(count("draw_indexed 36"), 2);
}

#[test]
fn test_no_entities_records_nothing() {
    let mut backend = MockBackend::new().unwrap();
    let main = backend
        .renderpass_create(&RenderpassDesc::default_framebuffer("main"))
        .unwrap();
    let forward = ForwardPass::new(&mut backend, main).unwrap();
    let camera = CameraBinding::from_camera(&Camera::looking_at(Vec3::Z, Vec3::ZERO, 1.0), 1.0, 1.0);

    run_frame(&mut backend, |encoder| {
        encoder.begin_render(main)?;
        forward.draw(encoder, &camera, Mat4::IDENTITY, Vec3::NEG_Y, TextureHandle::default(), &[])?;
        encoder.end_render()
    })
    .unwrap();

    assert_eq!(backend.commands.len(), 3);
    assert_eq!(backend.stats().pipeline_binds, 0);
}
