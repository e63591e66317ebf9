//! Unit tests for the built-in uniform blocks

use super::*;
use crate::ral::BindingKind;

#[test]
fn test_block_sizes_match_std140() {
    assert_eq!(std::mem::size_of::<CameraBinding>(), 144);
    assert_eq!(std::mem::size_of::<ModelBinding>(), 64);
    assert_eq!(std::mem::size_of::<PointLight>(), 32);
    assert_eq!(std::mem::size_of::<PointLightsBinding>(), 144);
}

#[test]
fn test_labels() {
    assert_eq!(CameraBinding::layout(None).bindings[0].label, "Camera");
    assert_eq!(ModelBinding::layout(None).bindings[0].label, "Model");
    assert_eq!(PointLightsBinding::layout(None).bindings[0].label, "Lights");
}

#[test]
fn test_model_payload_is_matrix_bytes() {
    let model = ModelBinding { model: Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)) };
    let layout = model.shader_data();
    match &layout.bindings[0].kind {
        BindingKind::Bytes { size: 64, data: Some(bytes) } => {
            let floats: &[f32] = bytemuck::cast_slice(bytes.as_ref());
            assert_eq!(&floats[12..15], &[1.0, 2.0, 3.0]);
        }
        other => panic!("unexpected binding {:?}", other),
    }
}

#[test]
fn test_point_light_padding_is_zero() {
    let light = PointLight::new(Vec3::ONE, Vec3::splat(300.0));
    let words: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&light));
    assert_eq!(words[3], 0.0);
    assert_eq!(words[7], 0.0);
    assert_eq!(words[4], 300.0);
}
