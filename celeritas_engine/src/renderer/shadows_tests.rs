//! Unit tests for the shadow map pass against the mock backend

use super::*;
use crate::error::Error;
use crate::ral::mock_backend::MockBackend;
use crate::ral::{run_frame, BackendConfig, TextureFormat};
use crate::resource::{Geometry, Mesh};
use glam::{Vec2, Vec3};

/// Take the only pipeline slot of a `max_pipelines: 1` backend
fn fill_pipeline_pool(backend: &mut MockBackend) {
    let main = backend
        .renderpass_create(&RenderpassDesc::default_framebuffer("main"))
        .unwrap();
    let desc = GraphicsPipelineDesc::new(
        "filler",
        VertexDescription::static_3d(),
        ShaderDesc::glsl("vs", "void main() {}"),
        ShaderDesc::glsl("fs", "void main() {}"),
    );
    backend.graphics_pipeline_create(&desc, main).unwrap();
}

fn commands_matching(backend: &MockBackend, prefix: &str) -> usize {
    backend.commands.iter().filter(|c| c.starts_with(prefix)).count()
}

// ============================================================================
// Creation
// ============================================================================

#[test]
fn test_shadow_pass_creates_depth_target_and_pipeline() {
    let mut backend = MockBackend::new().unwrap();
    let shadows = ShadowPass::new(&mut backend, UVec2::new(1024, 512)).unwrap();

    let depth = &backend.textures.get(shadows.shadow_map()).unwrap().desc;
    assert_eq!(depth.format, TextureFormat::DepthDefault);
    assert_eq!(depth.extents, UVec2::new(1024, 512));
    assert_eq!(shadows.extents(), UVec2::new(1024, 512));

    let pass = &backend.renderpasses.get(shadows.renderpass()).unwrap().desc;
    assert!(pass.depth_only());
    assert_eq!(pass.depth_stencil, Some(shadows.shadow_map()));

    let pipeline = backend.pipelines.iter().next().unwrap().1;
    assert_eq!(pipeline.uniforms, vec![("ShadowUniforms".to_string(), 128)]);
}

#[test]
fn test_shadow_pass_rolls_back_when_pipeline_fails() {
    let config = BackendConfig { max_pipelines: 1, ..Default::default() };
    let mut backend = MockBackend::with_config(config).unwrap();
    fill_pipeline_pool(&mut backend);

    let result = ShadowPass::new(&mut backend, UVec2::splat(256));

    assert!(matches!(result, Err(Error::PoolExhausted(_))));
    assert!(backend.textures.is_empty());
    assert_eq!(backend.renderpasses.len(), 1);
}

#[test]
fn test_destroy_releases_everything() {
    let mut backend = MockBackend::new().unwrap();
    let shadows = ShadowPass::new(&mut backend, UVec2::splat(256)).unwrap();
    shadows.destroy(&mut backend).unwrap();
    assert!(backend.textures.is_empty());
    assert!(backend.renderpasses.is_empty());
    assert!(backend.pipelines.is_empty());
}

// ============================================================================
// Recording
// ============================================================================

#[test]
fn test_run_draws_only_shadow_casters() {
    let mut backend = MockBackend::new().unwrap();
    let shadows = ShadowPass::new(&mut backend, UVec2::splat(256)).unwrap();
    let floor = Mesh::upload(&mut backend, &Geometry::plane(Vec2::splat(10.0))).unwrap();
    let cube = Mesh::upload(&mut backend, &Geometry::cuboid(Vec3::ONE)).unwrap();

    let entities = [
        RenderEnt::new(&floor, Mat4::IDENTITY).with_shadows(false),
        RenderEnt::new(&cube, Mat4::from_translation(Vec3::Y)),
        RenderEnt::new(&cube, Mat4::from_translation(Vec3::X)),
    ];
    let mut drawn = 0;
    run_frame(&mut backend, |encoder| {
        drawn = shadows.run(encoder, Mat4::IDENTITY, &entities)?;
        Ok(())
    })
    .unwrap();

    assert_eq!(drawn, 2);
    assert_eq!(backend.commands[0], format!("begin_render {}", shadows.renderpass()));
    assert_eq!(commands_matching(&backend, "upload_uniform ShadowUniforms 128"), 2);
    assert_eq!(commands_matching(&backend, "draw_indexed 36"), 2);
    assert_eq!(commands_matching(&backend, "draw_indexed 6"), 0);
    assert_eq!(backend.stats().draw_calls, 2);
}

#[test]
fn test_run_inside_an_open_renderpass_is_rejected() {
    let mut backend = MockBackend::new().unwrap();
    let shadows = ShadowPass::new(&mut backend, UVec2::splat(256)).unwrap();
    let result = run_frame(&mut backend, |encoder| {
        encoder.begin_render(shadows.renderpass())?;
        // nested renderpass
        shadows.run(encoder, Mat4::IDENTITY, &[]).map(|_| ())
    });
    assert!(matches!(result, Err(Error::InvalidState(_))));
}

#[test]
fn test_uniforms_carry_light_space_and_model() {
    let light_space = Mat4::from_scale(Vec3::splat(2.0));
    let model = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
    let uniforms = ShadowUniforms { light_space, model };
    let layout = uniforms.shader_data();
    assert_eq!(layout.bindings.len(), 1);
    assert_eq!(layout.bindings[0].label, "ShadowUniforms");
    let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&uniforms));
    assert_eq!(floats[0], 2.0);
    assert_eq!(&floats[28..31], &[1.0, 2.0, 3.0]);
}
